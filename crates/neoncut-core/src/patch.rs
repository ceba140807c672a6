// crates/neoncut-core/src/patch.rs
//
// Partial clip updates. Every field is optional; nested property groups are
// merged field-by-field so a patch that only sets `visual.opacity` leaves
// the rest of `visual` (and `visual.text`) intact.
//
// The property panel sends these as JSON, hence serde with all-default fields.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::{AudioProperties, BlendMode, Clip, TextStyle, VisualProperties};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipPatch {
    pub track_id:          Option<Uuid>,
    pub display_name:      Option<String>,
    pub timeline_start:    Option<f64>,
    pub timeline_duration: Option<f64>,
    pub source_offset:     Option<f64>,
    pub visual:            Option<VisualPatch>,
    pub audio:             Option<AudioPatch>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualPatch {
    pub opacity:    Option<f32>,
    pub scale:      Option<f32>,
    pub rotation:   Option<f32>,
    pub x:          Option<f32>,
    pub y:          Option<f32>,
    pub brightness: Option<f32>,
    pub contrast:   Option<f32>,
    pub saturation: Option<f32>,
    pub hue:        Option<f32>,
    pub blur:       Option<f32>,
    pub blend_mode: Option<BlendMode>,
    pub fade_in:    Option<f64>,
    pub fade_out:   Option<f64>,
    pub speed:      Option<f64>,
    pub text:       Option<TextStylePatch>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStylePatch {
    pub content:     Option<String>,
    pub font_size:   Option<f32>,
    pub color:       Option<[u8; 4]>,
    pub font_family: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioPatch {
    pub volume: Option<f32>,
}

// ── Shorthand constructors used by the manipulation engine ───────────────────

impl ClipPatch {
    pub fn start(start: f64) -> Self {
        Self { timeline_start: Some(start), ..Self::default() }
    }

    pub fn duration(duration: f64) -> Self {
        Self { timeline_duration: Some(duration), ..Self::default() }
    }

    /// Trim-start writes all three placement fields at once.
    pub fn placement(start: f64, duration: f64, offset: f64) -> Self {
        Self {
            timeline_start:    Some(start),
            timeline_duration: Some(duration),
            source_offset:     Some(offset),
            ..Self::default()
        }
    }

    pub fn visual(visual: VisualPatch) -> Self {
        Self { visual: Some(visual), ..Self::default() }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge into `clip`. Placement values that would break the clip
    /// invariants are clamped (start, offset) or dropped (duration).
    /// `track_id` is left to the caller, which knows which tracks exist.
    pub fn apply_to(&self, clip: &mut Clip) {
        if let Some(name) = &self.display_name {
            clip.display_name = name.clone();
        }
        if let Some(start) = self.timeline_start.filter(|v| v.is_finite()) {
            clip.timeline_start = start.max(0.0);
        }
        if let Some(dur) = self.timeline_duration.filter(|v| v.is_finite() && *v > 0.0) {
            clip.timeline_duration = dur;
        }
        if let Some(off) = self.source_offset.filter(|v| v.is_finite()) {
            clip.source_offset = off.max(0.0);
        }
        if let Some(v) = &self.visual {
            v.apply_to(&mut clip.visual);
        }
        if let Some(a) = &self.audio {
            a.apply_to(&mut clip.audio);
        }
    }
}

impl VisualPatch {
    pub fn apply_to(&self, v: &mut VisualProperties) {
        if let Some(o) = self.opacity    { v.opacity    = o.clamp(0.0, 1.0); }
        if let Some(s) = self.scale      { v.scale      = s.max(0.0); }
        if let Some(r) = self.rotation   { v.rotation   = r; }
        if let Some(x) = self.x          { v.x          = x; }
        if let Some(y) = self.y          { v.y          = y; }
        if let Some(b) = self.brightness { v.brightness = b.max(0.0); }
        if let Some(c) = self.contrast   { v.contrast   = c.max(0.0); }
        if let Some(s) = self.saturation { v.saturation = s.max(0.0); }
        if let Some(h) = self.hue        { v.hue        = h; }
        if let Some(b) = self.blur       { v.blur       = b.max(0.0); }
        if let Some(m) = self.blend_mode { v.blend_mode = m; }
        if let Some(f) = self.fade_in    { v.fade_in    = f.max(0.0); }
        if let Some(f) = self.fade_out   { v.fade_out   = f.max(0.0); }
        if let Some(s) = self.speed.filter(|s| s.is_finite() && *s > 0.0) {
            v.speed = s;
        }
        if let Some(t) = &self.text {
            t.apply_to(&mut v.text);
        }
    }
}

impl TextStylePatch {
    pub fn apply_to(&self, t: &mut TextStyle) {
        if let Some(c) = &self.content     { t.content     = Some(c.clone()); }
        if let Some(s) = self.font_size    { t.font_size   = s.max(1.0); }
        if let Some(c) = self.color        { t.color       = c; }
        if let Some(f) = &self.font_family { t.font_family = f.clone(); }
    }
}

impl AudioPatch {
    pub fn apply_to(&self, a: &mut AudioProperties) {
        if let Some(v) = self.volume {
            a.volume = v.clamp(0.0, 2.0);
        }
    }
}
