// crates/neoncut-core/src/layout.rs
//
// Geometry of the timeline view: lane rows, clip rectangles, trim handles,
// ruler ticks. Pure functions of (clips, tracks, scale), so a host can draw
// with any toolkit and feed pointer coordinates back through `hit_test`.
//
//   y = 0            ┌──────────── ruler ────────────┐
//   y = RULER_HEIGHT │ lane 0 (Text)                  │
//                    │ lane 1 (Main Video)            │
//                    │ lane 2 (Audio)                 │
//                    └────────────────────────────────┘

use uuid::Uuid;

use crate::config::EditorConfig;
use crate::gesture::GestureKind;
use crate::helpers::scale::TimeScale;
use crate::helpers::time::{ruler_label, ruler_step};
use crate::state::{Clip, Track};

pub const RULER_HEIGHT: f32 = 28.0;
/// Narrowest a clip is ever drawn, so zero-ish clips stay grabbable.
pub const MIN_CLIP_WIDTH: f32 = 4.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn right(&self)  -> f32 { self.x + self.w }
    pub fn bottom(&self) -> f32 { self.y + self.h }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitZone {
    Body,
    StartHandle,
    EndHandle,
}

impl HitZone {
    pub fn gesture(self) -> GestureKind {
        match self {
            HitZone::Body        => GestureKind::Move,
            HitZone::StartHandle => GestureKind::TrimStart,
            HitZone::EndHandle   => GestureKind::TrimEnd,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub clip_id: Uuid,
    pub zone:    HitZone,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClipRect {
    pub clip_id:     Uuid,
    pub track_index: usize,
    pub rect:        Rect,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RulerTick {
    pub time:  f64,
    pub x:     f32,
    pub label: String,
}

#[derive(Clone, Copy, Debug)]
pub struct TimelineLayout {
    pub scale:       TimeScale,
    pub lane_height: f32,
    pub handle_px:   f32,
}

impl TimelineLayout {
    pub fn new(scale: TimeScale, config: &EditorConfig) -> Self {
        Self { scale, lane_height: config.lane_height, handle_px: config.trim_handle_px }
    }

    pub fn lane_y(&self, track_index: usize) -> f32 {
        RULER_HEIGHT + track_index as f32 * self.lane_height
    }

    /// Lane under screen y, if any.
    pub fn lane_at(&self, y: f32, lanes: usize) -> Option<usize> {
        if y < RULER_HEIGHT {
            return None;
        }
        let idx = ((y - RULER_HEIGHT) / self.lane_height) as usize;
        (idx < lanes).then_some(idx)
    }

    pub fn total_height(&self, lanes: usize) -> f32 {
        self.lane_y(lanes)
    }

    pub fn clip_rect(&self, clip: &Clip, track_index: usize) -> Rect {
        let x = self.scale.to_pixels(clip.timeline_start);
        let w = (self.scale.to_pixels(clip.end()) - x).max(MIN_CLIP_WIDTH);
        Rect { x, y: self.lane_y(track_index), w, h: self.lane_height }
    }

    /// Rectangles for every clip whose track is known, in store order.
    pub fn clip_rects(&self, clips: &[Clip], tracks: &[Track]) -> Vec<ClipRect> {
        clips.iter()
            .filter_map(|c| {
                let track_index = tracks.iter().position(|t| t.id == c.track_id)?;
                Some(ClipRect { clip_id: c.id, track_index, rect: self.clip_rect(c, track_index) })
            })
            .collect()
    }

    /// Which part of `rect` the pointer x falls in. Handles win over the body.
    pub fn zone_at(&self, rect: &Rect, x: f32) -> HitZone {
        if x < rect.x + self.handle_px {
            HitZone::StartHandle
        } else if x >= rect.right() - self.handle_px {
            HitZone::EndHandle
        } else {
            HitZone::Body
        }
    }

    /// Topmost clip under the pointer. Later clips in store order draw over
    /// earlier ones, so the search runs back to front.
    pub fn hit_test(&self, clips: &[Clip], tracks: &[Track], x: f32, y: f32) -> Option<Hit> {
        self.clip_rects(clips, tracks)
            .iter()
            .rev()
            .find(|cr| cr.rect.contains(x, y))
            .map(|cr| Hit { clip_id: cr.clip_id, zone: self.zone_at(&cr.rect, x) })
    }

    pub fn playhead_x(&self, t: f64) -> f32 {
        self.scale.to_pixels(t)
    }

    pub fn ruler_ticks(&self) -> Vec<RulerTick> {
        let step = ruler_step(self.scale.zoom);
        let count = (self.scale.total_duration / step).floor() as usize;
        (0..=count)
            .map(|i| {
                let time = i as f64 * step;
                RulerTick { time, x: self.scale.to_pixels(time), label: ruler_label(time) }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{default_tracks, MediaKind};

    fn layout() -> TimelineLayout {
        TimelineLayout::new(TimeScale::new(50.0, 30.0), &EditorConfig::default())
    }

    #[test]
    fn clip_rect_sits_in_its_lane() {
        let tracks = default_tracks();
        let c = Clip::new(tracks[1].id, MediaKind::Video, "v", 2.0, 4.0);
        let r = layout().clip_rects(std::slice::from_ref(&c), &tracks)[0].rect;
        assert_eq!(r, Rect { x: 100.0, y: RULER_HEIGHT + 40.0, w: 200.0, h: 40.0 });
    }

    #[test]
    fn tiny_clips_keep_min_width() {
        let tracks = default_tracks();
        let c = Clip::new(tracks[1].id, MediaKind::Video, "v", 0.0, 0.01);
        assert_eq!(layout().clip_rect(&c, 1).w, MIN_CLIP_WIDTH);
    }

    #[test]
    fn hit_zones_map_to_gestures() {
        let tracks = default_tracks();
        let c = Clip::new(tracks[1].id, MediaKind::Video, "v", 2.0, 4.0);
        let clips = [c.clone()];
        let l = layout();
        let y = RULER_HEIGHT + 50.0;

        let hit = |x| l.hit_test(&clips, &tracks, x, y).map(|h| h.zone.gesture());
        assert_eq!(hit(102.0), Some(GestureKind::TrimStart));
        assert_eq!(hit(200.0), Some(GestureKind::Move));
        assert_eq!(hit(296.0), Some(GestureKind::TrimEnd));
        assert_eq!(hit(310.0), None);
        assert_eq!(l.hit_test(&clips, &tracks, 200.0, 5.0), None);
    }

    #[test]
    fn topmost_overlapping_clip_wins() {
        let tracks = default_tracks();
        let a = Clip::new(tracks[1].id, MediaKind::Video, "a", 0.0, 6.0);
        let b = Clip::new(tracks[1].id, MediaKind::Video, "b", 2.0, 6.0);
        let bid = b.id;
        let hit = layout().hit_test(&[a, b], &tracks, 200.0, RULER_HEIGHT + 60.0).unwrap();
        assert_eq!(hit.clip_id, bid);
    }

    #[test]
    fn ruler_covers_whole_duration() {
        let ticks = layout().ruler_ticks();
        assert_eq!(ticks.first().unwrap().label, "00:00");
        assert_eq!(ticks.last().unwrap().time, 30.0);
        assert_eq!(ticks[1].x - ticks[0].x, 100.0);
    }

    #[test]
    fn lane_lookup() {
        let l = layout();
        assert_eq!(l.lane_at(10.0, 3), None);
        assert_eq!(l.lane_at(RULER_HEIGHT + 85.0, 3), Some(2));
        assert_eq!(l.lane_at(RULER_HEIGHT + 125.0, 3), None);
    }
}
