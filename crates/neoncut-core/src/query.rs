// crates/neoncut-core/src/query.rs
//
// Read-only lookups over the clip list that every consumer needs: the
// selected clip, what is under the playhead, the draw order for the
// compositor, fade and gain at a given time, and picking on the preview.
//
// All functions borrow immutably and return references tied to the input,
// so callers can keep reading the store in the same expression.

use uuid::Uuid;

use crate::state::{Clip, EditorState, MediaKind, Track};

// ── Lookups ───────────────────────────────────────────────────────────────────

#[inline]
pub fn clip_by_id(clips: &[Clip], id: Uuid) -> Option<&Clip> {
    clips.iter().find(|c| c.id == id)
}

#[inline]
pub fn selected_clip<'c>(clips: &'c [Clip], state: &EditorState) -> Option<&'c Clip> {
    state.selected_clip_id.and_then(|id| clip_by_id(clips, id))
}

/// Every clip active at `t` (half-open), in store order.
pub fn clips_at_time(clips: &[Clip], t: f64) -> impl Iterator<Item = &Clip> {
    clips.iter().filter(move |c| c.contains(t))
}

/// Visual clips to draw at `t`, back to front.
///
/// Lanes are walked bottom to top (the last display lane is the background);
/// hidden lanes are skipped. Within a lane, store order decides, so a later
/// clip covers an earlier overlapping one.
pub fn render_order<'c>(clips: &'c [Clip], tracks: &[Track], t: f64) -> Vec<&'c Clip> {
    tracks.iter()
        .rev()
        .filter(|track| !track.hidden)
        .flat_map(|track| {
            clips.iter().filter(move |c| {
                c.track_id == track.id && c.media_kind.is_visual() && c.contains(t)
            })
        })
        .collect()
}

/// Audio-bearing clips at `t` with their effective gain.
pub fn audible_at<'c>(clips: &'c [Clip], tracks: &[Track], t: f64) -> Vec<(&'c Clip, f32)> {
    clips_at_time(clips, t)
        .filter(|c| matches!(c.media_kind, MediaKind::Video | MediaKind::Audio))
        .filter_map(|c| {
            let track = tracks.iter().find(|tr| tr.id == c.track_id)?;
            Some((c, effective_gain(c, track, t)))
        })
        .collect()
}

// ── Per-clip time functions ───────────────────────────────────────────────────

/// Opacity multiplier from the fade-in / fade-out ramps at timeline time `t`.
/// 1.0 outside both ramps; linear inside.
pub fn fade_factor(clip: &Clip, t: f64) -> f32 {
    let into   = t - clip.timeline_start;
    let remain = clip.end() - t;
    let mut f = 1.0_f64;
    if clip.visual.fade_in > 0.0 && into < clip.visual.fade_in {
        f *= into / clip.visual.fade_in;
    }
    if clip.visual.fade_out > 0.0 && remain < clip.visual.fade_out {
        f *= remain / clip.visual.fade_out;
    }
    f.clamp(0.0, 1.0) as f32
}

/// Clip gain after track mute and fades. Volume follows the opacity ramp.
pub fn effective_gain(clip: &Clip, track: &Track, t: f64) -> f32 {
    if track.muted {
        return 0.0;
    }
    clip.audio.volume * fade_factor(clip, t)
}

/// Source timestamp to sample for `clip` at `t`, clamped inside the source
/// when its length is known.
pub fn source_time(clip: &Clip, t: f64) -> f64 {
    let raw = clip.source_time_at(t).max(0.0);
    match clip.source_duration {
        Some(len) => raw.min(len),
        None      => raw,
    }
}

// ── Preview picking ───────────────────────────────────────────────────────────

/// Hit box used for preview picking when the real drawn size is unknown.
pub fn default_extent(clip: &Clip) -> (f32, f32) {
    match clip.media_kind {
        MediaKind::Text => (600.0, 200.0),
        _               => (400.0, 400.0),
    }
}

/// Topmost visual clip under canvas point `(px, py)`.
///
/// `draw_order` is the back-to-front list from `render_order`. The point is
/// mapped into each clip's local space (undoing position, rotation, and
/// scale) and tested against the extent that `extent_of` reports.
pub fn pick_on_canvas(
    draw_order: &[&Clip],
    canvas:     (u32, u32),
    point:      (f32, f32),
    extent_of:  impl Fn(&Clip) -> (f32, f32),
) -> Option<Uuid> {
    let (cx, cy) = (canvas.0 as f32 / 2.0, canvas.1 as f32 / 2.0);
    draw_order.iter().rev().find_map(|clip| {
        let v = &clip.visual;
        if v.scale <= 0.0 {
            return None;
        }
        let (dx, dy) = (point.0 - cx - v.x, point.1 - cy - v.y);
        let (sin, cos) = (-v.rotation.to_radians()).sin_cos();
        let lx = (dx * cos - dy * sin) / v.scale;
        let ly = (dx * sin + dy * cos) / v.scale;
        let (w, h) = extent_of(clip);
        (lx.abs() <= w / 2.0 && ly.abs() <= h / 2.0).then_some(clip.id)
    })
}
