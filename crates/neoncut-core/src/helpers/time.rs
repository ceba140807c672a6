// crates/neoncut-core/src/helpers/time.rs
//
// Timecode strings for the preview overlay and the timeline ruler.
// Frame-level fields assume the export frame rate passed in by the caller.

/// Format `s` seconds as `HH:MM:SS:FF`, frames counted at `fps`.
///
/// Shown under the preview surface.
///
/// ```
/// use neoncut_core::helpers::time::format_timecode;
/// assert_eq!(format_timecode(0.0, 30),    "00:00:00:00");
/// assert_eq!(format_timecode(61.5, 30),   "00:01:01:15");
/// assert_eq!(format_timecode(3725.1, 30), "01:02:05:03");
/// ```
pub fn format_timecode(s: f64, fps: u32) -> String {
    let s  = s.max(0.0);
    let h  = (s / 3600.0) as u32;
    let m  = ((s % 3600.0) / 60.0) as u32;
    let sc = (s % 60.0) as u32;
    let fr = ((s.fract()) * fps as f64) as u32;
    format!("{h:02}:{m:02}:{sc:02}:{fr:02}")
}

/// Ruler tick label: `MM:SS`.
///
/// ```
/// use neoncut_core::helpers::time::ruler_label;
/// assert_eq!(ruler_label(0.0),  "00:00");
/// assert_eq!(ruler_label(95.9), "01:35");
/// ```
pub fn ruler_label(s: f64) -> String {
    let s = s.max(0.0);
    format!("{:02}:{:02}", (s / 60.0) as u32, (s % 60.0) as u32)
}

/// Seconds between ruler ticks at `zoom` px/s. Keeps labels from colliding
/// when zoomed out and adds density when zoomed in.
pub fn ruler_step(zoom: f32) -> f64 {
    if zoom >= 150.0      { 0.5 }
    else if zoom >= 80.0  { 1.0 }
    else if zoom >= 30.0  { 2.0 }
    else if zoom >= 15.0  { 5.0 }
    else                  { 10.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_time_clamps_to_zero() {
        assert_eq!(format_timecode(-3.0, 30), "00:00:00:00");
        assert_eq!(ruler_label(-1.0), "00:00");
    }

    #[test]
    fn frames_follow_rate() {
        assert_eq!(format_timecode(1.5, 24), "00:00:01:12");
    }

    #[test]
    fn ruler_step_grows_as_zoom_drops() {
        assert!(ruler_step(10.0) > ruler_step(50.0));
        assert!(ruler_step(50.0) > ruler_step(200.0));
    }
}
