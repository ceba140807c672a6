// crates/neoncut-core/src/config.rs
//
// Tunables for one editor session. Every field has a default so a host can
// ship a partial JSON document (or none at all).
//
//   let cfg = EditorConfig::from_json_str(r#"{ "history_depth": 50 }"#)?;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Zoom range in pixels per second.
    pub zoom_min:          f32,
    pub zoom_max:          f32,
    pub default_zoom:      f32,
    /// Multiplier applied by ZoomIn / divisor applied by ZoomOut.
    pub zoom_step:         f32,
    /// On-screen snap catch radius. Converted to seconds per zoom level.
    pub snap_radius_px:    f32,
    /// Trim never shrinks a clip below this many seconds.
    pub min_clip_duration: f64,
    /// Undo depth. Oldest snapshots are evicted first.
    pub history_depth:     usize,
    /// Timeline length of a fresh session, seconds.
    pub initial_duration:  f64,
    /// Head-room added past the furthest clip end when the timeline grows.
    pub duration_margin:   f64,
    /// Upper bound on one playback tick. `None` disables the clamp.
    pub max_frame_delta:   Option<f64>,
    /// Width of the trim grab zones at each clip edge.
    pub trim_handle_px:    f32,
    /// Height of one track lane in the timeline view.
    pub lane_height:       f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            zoom_min:          10.0,
            zoom_max:          200.0,
            default_zoom:      50.0,
            zoom_step:         1.25,
            snap_radius_px:    15.0,
            min_clip_duration: 0.1,
            history_depth:     20,
            initial_duration:  30.0,
            duration_margin:   5.0,
            max_frame_delta:   Some(0.1),
            trim_handle_px:    7.0,
            lane_height:       40.0,
        }
    }
}

impl EditorConfig {
    /// Parse a (possibly partial) JSON config and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: EditorConfig = serde_json::from_str(json)
            .context("parse editor config JSON")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.zoom_min > 0.0, "zoom_min must be positive (got {})", self.zoom_min);
        ensure!(
            self.zoom_min <= self.zoom_max,
            "zoom_min {} exceeds zoom_max {}", self.zoom_min, self.zoom_max,
        );
        ensure!(self.zoom_step > 1.0, "zoom_step must be > 1.0 (got {})", self.zoom_step);
        ensure!(self.min_clip_duration > 0.0, "min_clip_duration must be positive");
        ensure!(self.history_depth >= 1, "history_depth must be at least 1");
        ensure!(self.initial_duration > 0.0, "initial_duration must be positive");
        ensure!(self.duration_margin >= 0.0, "duration_margin must not be negative");
        if let Some(max) = self.max_frame_delta {
            ensure!(max > 0.0, "max_frame_delta must be positive when set (got {max})");
        }
        Ok(())
    }

    pub fn clamp_zoom(&self, zoom: f32) -> f32 {
        if zoom.is_finite() {
            zoom.clamp(self.zoom_min, self.zoom_max)
        } else {
            self.default_zoom.clamp(self.zoom_min, self.zoom_max)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(EditorConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let cfg = EditorConfig::from_json_str(r#"{ "history_depth": 50 }"#).unwrap();
        assert_eq!(cfg.history_depth, 50);
        assert_eq!(cfg.snap_radius_px, 15.0);
        assert_eq!(cfg.max_frame_delta, Some(0.1));
    }

    #[test]
    fn null_disables_frame_delta_clamp() {
        let cfg = EditorConfig::from_json_str(r#"{ "max_frame_delta": null }"#).unwrap();
        assert_eq!(cfg.max_frame_delta, None);
    }

    #[test]
    fn inverted_zoom_range_is_rejected() {
        let err = EditorConfig::from_json_str(r#"{ "zoom_min": 300, "zoom_max": 200 }"#)
            .unwrap_err();
        assert!(err.to_string().contains("zoom_min"));
    }

    #[test]
    fn malformed_json_reports_context() {
        let err = EditorConfig::from_json_str("{ nope").unwrap_err();
        assert!(format!("{err:#}").contains("parse editor config JSON"));
    }

    #[test]
    fn clamp_zoom_handles_nan() {
        let cfg = EditorConfig::default();
        assert_eq!(cfg.clamp_zoom(f32::NAN), 50.0);
        assert_eq!(cfg.clamp_zoom(5000.0), 200.0);
        assert_eq!(cfg.clamp_zoom(1.0), 10.0);
    }
}
