// crates/neoncut-core/src/helpers/scale.rs
//
// Seconds ⇄ pixels for the timeline view.
//
// A TimeScale is built fresh from EditorState every time it is needed and
// never cached, so a zoom change is visible to the very next query.

use crate::state::EditorState;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeScale {
    /// Pixels per second.
    pub zoom:           f32,
    pub total_duration: f64,
    /// Screen x of timeline time 0 (negative once the view scrolls right).
    pub origin_x:       f32,
}

impl TimeScale {
    pub fn new(zoom: f32, total_duration: f64) -> Self {
        Self { zoom, total_duration, origin_x: 0.0 }
    }

    pub fn from_state(state: &EditorState) -> Self {
        Self::new(state.zoom_level, state.total_duration)
    }

    pub fn with_origin(mut self, origin_x: f32) -> Self {
        self.origin_x = origin_x;
        self
    }

    pub fn to_pixels(&self, seconds: f64) -> f32 {
        self.origin_x + (seconds * self.zoom as f64) as f32
    }

    pub fn to_seconds(&self, x: f32) -> f64 {
        (x - self.origin_x) as f64 / self.zoom as f64
    }

    /// Width of the whole timeline strip.
    pub fn content_width(&self) -> f32 {
        (self.total_duration * self.zoom as f64) as f32
    }

    pub fn seconds_per_pixel(&self) -> f64 {
        1.0 / self.zoom as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_within_float_tolerance() {
        for zoom in [10.0_f32, 37.5, 50.0, 200.0] {
            let scale = TimeScale::new(zoom, 120.0).with_origin(-33.0);
            for t in [0.0, 0.1, 4.25, 59.999, 120.0] {
                let back = scale.to_seconds(scale.to_pixels(t));
                assert!((back - t).abs() < 1e-3, "zoom {zoom} t {t} -> {back}");
            }
        }
    }

    #[test]
    fn content_width_is_duration_times_zoom() {
        assert_eq!(TimeScale::new(50.0, 30.0).content_width(), 1500.0);
    }

    #[test]
    fn built_live_from_state() {
        let mut state = EditorState::default();
        state.zoom_level = 100.0;
        assert_eq!(TimeScale::from_state(&state).to_pixels(2.0), 200.0);
    }
}
