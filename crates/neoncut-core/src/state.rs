// crates/neoncut-core/src/state.rs
// Pure editor data. No pixels, no recorder handles, no pointer state.
// Serializable via serde so snapshots can be dumped and compared.
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::EditorConfig;

/// Seconds assigned to stills (images, text) when the asset reports no length.
pub const DEFAULT_STILL_DURATION: f64 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    Video,
    Audio,
    Text,
    Image,
}

impl MediaKind {
    /// True for kinds the compositor draws. Audio clips have no visual.
    pub fn is_visual(self) -> bool {
        !matches!(self, MediaKind::Audio)
    }

    /// Video and audio clips are windows into a source with a finite length;
    /// images and text can be stretched indefinitely.
    pub fn has_finite_source(self) -> bool {
        matches!(self, MediaKind::Video | MediaKind::Audio)
    }

    /// Whether a clip of this kind may be placed on a track of `track_kind`.
    /// Images share the video lane.
    pub fn fits_track(self, track_kind: MediaKind) -> bool {
        self == track_kind || (self == MediaKind::Image && track_kind == MediaKind::Video)
    }
}

/// Opaque handle to a media asset owned by the import collaborator
/// (blob URL, file path, library id). The core never dereferences it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRef(pub String);

impl SourceRef {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Asset descriptor handed over by the import / upload flow.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MediaAsset {
    pub source_ref:       SourceRef,
    pub media_kind:       MediaKind,
    pub display_name:     String,
    /// Natural length in seconds. `<= 0` means unknown.
    pub natural_duration: f64,
    #[serde(default)]
    pub thumbnail:        Option<String>,
}

// ── Tracks ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id:           Uuid,
    pub media_kind:   MediaKind,
    pub display_name: String,
    pub muted:        bool,
    pub locked:       bool,
    pub hidden:       bool,
}

impl Track {
    pub fn new(media_kind: MediaKind, display_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            media_kind,
            display_name: display_name.into(),
            muted:  false,
            locked: false,
            hidden: false,
        }
    }

    pub fn accepts(&self, kind: MediaKind) -> bool {
        kind.fits_track(self.media_kind)
    }
}

/// The lanes every editor session starts with, in display order (top lane
/// first). The compositor draws them bottom lane first.
pub fn default_tracks() -> Vec<Track> {
    vec![
        Track::new(MediaKind::Text,  "Text"),
        Track::new(MediaKind::Video, "Main Video"),
        Track::new(MediaKind::Audio, "Audio"),
    ]
}

// ── Clip properties ───────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    Add,
    Difference,
}

impl BlendMode {
    /// Parse the canvas composite-operation names the property panel sends.
    pub fn from_css(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "normal" | "source-over" => Some(BlendMode::Normal),
            "multiply"               => Some(BlendMode::Multiply),
            "screen"                 => Some(BlendMode::Screen),
            "overlay"                => Some(BlendMode::Overlay),
            "darken"                 => Some(BlendMode::Darken),
            "lighten"                => Some(BlendMode::Lighten),
            "lighter" | "add"        => Some(BlendMode::Add),
            "difference"             => Some(BlendMode::Difference),
            _                        => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Text to draw. `None` falls back to the clip's display name.
    #[serde(default)]
    pub content:     Option<String>,
    pub font_size:   f32,
    /// Straight (non-premultiplied) RGBA.
    pub color:       [u8; 4],
    pub font_family: String,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            content:     None,
            font_size:   120.0,
            color:       [255, 255, 255, 255],
            font_family: "Arial".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualProperties {
    pub opacity:    f32,
    pub scale:      f32,
    /// Degrees, clockwise.
    pub rotation:   f32,
    /// Pixel offset of the clip centre from the canvas centre.
    pub x:          f32,
    pub y:          f32,
    /// Color adjustments. 1.0 is neutral for the first three, 0.0 for hue/blur.
    pub brightness: f32,
    pub contrast:   f32,
    pub saturation: f32,
    pub hue:        f32,
    pub blur:       f32,
    pub blend_mode: BlendMode,
    /// Linear opacity ramps at the clip edges, in seconds.
    pub fade_in:    f64,
    pub fade_out:   f64,
    /// Source playback rate. Affects which source frame is sampled, not the
    /// clip's timeline length.
    pub speed:      f64,
    pub text:       TextStyle,
}

impl Default for VisualProperties {
    fn default() -> Self {
        Self {
            opacity:    1.0,
            scale:      1.0,
            rotation:   0.0,
            x:          0.0,
            y:          0.0,
            brightness: 1.0,
            contrast:   1.0,
            saturation: 1.0,
            hue:        0.0,
            blur:       0.0,
            blend_mode: BlendMode::Normal,
            fade_in:    0.0,
            fade_out:   0.0,
            speed:      1.0,
            text:       TextStyle::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioProperties {
    /// Per-clip gain (0.0–2.0, default 1.0).
    pub volume: f32,
}

impl Default for AudioProperties {
    fn default() -> Self {
        Self { volume: 1.0 }
    }
}

// ── Clips ─────────────────────────────────────────────────────────────────────

/// A timed window into a media asset, placed on a track.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub id:                Uuid,
    pub track_id:          Uuid,
    pub media_kind:        MediaKind,
    pub display_name:      String,
    pub timeline_start:    f64,
    pub timeline_duration: f64,
    /// Seconds into the source at which the visible window begins.
    pub source_offset:     f64,
    #[serde(default)]
    pub source_ref:        Option<SourceRef>,
    /// Natural length of the source, when known. Bounds trim-end for
    /// video/audio clips.
    #[serde(default)]
    pub source_duration:   Option<f64>,
    #[serde(default)]
    pub visual:            VisualProperties,
    #[serde(default)]
    pub audio:             AudioProperties,
}

impl Clip {
    /// A bare clip with default properties. Used for text presets and tests.
    pub fn new(
        track_id:   Uuid,
        media_kind: MediaKind,
        name:       impl Into<String>,
        start:      f64,
        duration:   f64,
    ) -> Self {
        Self {
            id:                Uuid::new_v4(),
            track_id,
            media_kind,
            display_name:      name.into(),
            timeline_start:    start.max(0.0),
            timeline_duration: duration,
            source_offset:     0.0,
            source_ref:        None,
            source_duration:   None,
            visual:            VisualProperties::default(),
            audio:             AudioProperties::default(),
        }
    }

    /// Place `asset` on `track_id` starting at `at`.
    pub fn from_asset(asset: &MediaAsset, track_id: Uuid, at: f64) -> Self {
        let known = asset.natural_duration.is_finite() && asset.natural_duration > 0.0;
        let duration = if known { asset.natural_duration } else { DEFAULT_STILL_DURATION };

        let mut clip = Clip::new(track_id, asset.media_kind, asset.display_name.clone(), at, duration);
        clip.source_ref = Some(asset.source_ref.clone());
        if asset.media_kind.has_finite_source() && known {
            clip.source_duration = Some(asset.natural_duration);
        }
        clip
    }

    pub fn end(&self) -> f64 {
        self.timeline_start + self.timeline_duration
    }

    /// Half-open containment: `[start, end)`. The compositor's notion of
    /// "active at t".
    pub fn contains(&self, t: f64) -> bool {
        t >= self.timeline_start && t < self.end()
    }

    /// Open containment: `(start, end)`. Split requires this.
    pub fn contains_strictly(&self, t: f64) -> bool {
        t > self.timeline_start && t < self.end()
    }

    /// Source-media time shown when the playhead is at timeline time `t`.
    pub fn source_time_at(&self, t: f64) -> f64 {
        self.source_offset + (t - self.timeline_start) * self.visual.speed
    }

    /// What a text clip draws.
    pub fn text_content(&self) -> &str {
        self.visual.text.content.as_deref().unwrap_or(&self.display_name)
    }

    /// True when the clip's placement fields satisfy the model invariants.
    pub fn is_well_formed(&self) -> bool {
        self.timeline_duration.is_finite()
            && self.timeline_duration > 0.0
            && self.timeline_start.is_finite()
            && self.timeline_start >= 0.0
            && self.source_offset.is_finite()
            && self.source_offset >= 0.0
    }
}

// ── Editor session state ──────────────────────────────────────────────────────

/// Transient per-session state. Never historied.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EditorState {
    pub current_time:     f64,
    pub total_duration:   f64,
    pub is_playing:       bool,
    pub is_exporting:     bool,
    /// Pixels per second.
    pub zoom_level:       f32,
    pub selected_clip_id: Option<Uuid>,
}

impl EditorState {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            current_time:     0.0,
            total_duration:   config.initial_duration,
            is_playing:       false,
            is_exporting:     false,
            zoom_level:       config.clamp_zoom(config.default_zoom),
            selected_clip_id: None,
        }
    }

    /// Grow `total_duration` so `end + margin` fits. Never shrinks.
    pub fn grow_to_fit(&mut self, end: f64, margin: f64) {
        let wanted = end + margin;
        if wanted > self.total_duration {
            self.total_duration = wanted;
        }
    }
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(kind: MediaKind, dur: f64) -> MediaAsset {
        MediaAsset {
            source_ref:       SourceRef::new("blob:clip"),
            media_kind:       kind,
            display_name:     "clip.mp4".into(),
            natural_duration: dur,
            thumbnail:        None,
        }
    }

    #[test]
    fn image_fits_video_lane_but_not_audio() {
        assert!(MediaKind::Image.fits_track(MediaKind::Video));
        assert!(!MediaKind::Image.fits_track(MediaKind::Audio));
        assert!(MediaKind::Text.fits_track(MediaKind::Text));
    }

    #[test]
    fn from_asset_records_source_length_for_video_only() {
        let track = Uuid::new_v4();
        let v = Clip::from_asset(&asset(MediaKind::Video, 12.0), track, 3.0);
        assert_eq!(v.timeline_start, 3.0);
        assert_eq!(v.timeline_duration, 12.0);
        assert_eq!(v.source_duration, Some(12.0));

        let i = Clip::from_asset(&asset(MediaKind::Image, 0.0), track, 0.0);
        assert_eq!(i.timeline_duration, DEFAULT_STILL_DURATION);
        assert_eq!(i.source_duration, None);
    }

    #[test]
    fn containment_is_half_open() {
        let c = Clip::new(Uuid::new_v4(), MediaKind::Video, "a", 2.0, 3.0);
        assert!(c.contains(2.0));
        assert!(!c.contains(5.0));
        assert!(!c.contains_strictly(2.0));
        assert!(c.contains_strictly(4.999));
    }

    #[test]
    fn source_time_follows_speed() {
        let mut c = Clip::new(Uuid::new_v4(), MediaKind::Video, "a", 2.0, 8.0);
        c.source_offset = 1.0;
        c.visual.speed  = 2.0;
        assert!((c.source_time_at(4.0) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn duration_grows_but_never_shrinks() {
        let mut s = EditorState::default();
        assert_eq!(s.total_duration, 30.0);
        s.grow_to_fit(40.0, 5.0);
        assert_eq!(s.total_duration, 45.0);
        s.grow_to_fit(1.0, 5.0);
        assert_eq!(s.total_duration, 45.0);
    }

    #[test]
    fn blend_mode_parses_canvas_names() {
        assert_eq!(BlendMode::from_css("lighter"), Some(BlendMode::Add));
        assert_eq!(BlendMode::from_css(" Screen "), Some(BlendMode::Screen));
        assert_eq!(BlendMode::from_css("hard-light"), None);
    }
}
