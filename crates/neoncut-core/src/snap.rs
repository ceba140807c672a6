// crates/neoncut-core/src/snap.rs
//
// Magnetic snapping for clip moves.
//
// Guides are the timeline origin, the playhead, and both edges of every other
// clip on any track, in that order. The clip's start edge is tested against
// every guide first; only if nothing catches it is the end edge tested.
// First match wins in both passes.

use uuid::Uuid;

use crate::state::Clip;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SnapResult {
    pub start: f64,
    /// Timeline time of the guide that caught the clip, for drawing the
    /// dashed indicator line.
    pub guide: Option<f64>,
}

/// Catch radius in seconds for an on-screen radius at `zoom` px/s.
#[inline]
pub fn snap_threshold(radius_px: f32, zoom: f32) -> f64 {
    radius_px as f64 / zoom.max(f32::EPSILON) as f64
}

pub fn snap_guides<'a>(
    clips:        impl IntoIterator<Item = &'a Clip>,
    exclude:      Uuid,
    current_time: f64,
) -> Vec<f64> {
    let mut guides = vec![0.0, current_time];
    guides.extend(
        clips.into_iter()
            .filter(|c| c.id != exclude)
            .flat_map(|c| [c.timeline_start, c.end()]),
    );
    guides
}

/// Snap a clip of `duration` whose unsnapped start is `start` (already ≥ 0).
pub fn snap_move(start: f64, duration: f64, guides: &[f64], threshold: f64) -> SnapResult {
    if let Some(&g) = guides.iter().find(|&&g| (g - start).abs() < threshold) {
        return SnapResult { start: g, guide: Some(g) };
    }
    let end = start + duration;
    for &g in guides {
        if (g - end).abs() < threshold {
            let snapped = g - duration;
            // An end snap that would push the start before 0 is not a snap.
            if snapped >= 0.0 {
                return SnapResult { start: snapped, guide: Some(g) };
            }
        }
    }
    SnapResult { start, guide: None }
}
