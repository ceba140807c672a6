// crates/neoncut-core/src/gesture.rs
//
// Direct-manipulation state machine for one pointer drag on a clip.
//
//   Idle ──pointer_down──▶ Dragging ──pointer_up──▶ Committed
//                             │
//                             └──cancel──────────▶ Cancelled
//
// While dragging, only the proposed placement in `Gesture::preview` changes.
// The store is written once, on commit, by the Editor.
//
// `CanvasDrag` is the same idea on the preview surface: dragging a visible
// element changes its `visual.x` / `visual.y`.

use uuid::Uuid;

use crate::helpers::scale::TimeScale;
use crate::patch::{ClipPatch, VisualPatch};
use crate::snap::{snap_move, SnapResult};
use crate::state::Clip;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureKind {
    Move,
    TrimStart,
    TrimEnd,
}

/// The three placement fields a gesture can touch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub start:    f64,
    pub duration: f64,
    pub offset:   f64,
}

impl Placement {
    pub fn of(clip: &Clip) -> Self {
        Self {
            start:    clip.timeline_start,
            duration: clip.timeline_duration,
            offset:   clip.source_offset,
        }
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    pub fn write_to(&self, clip: &mut Clip) {
        clip.timeline_start    = self.start;
        clip.timeline_duration = self.duration;
        clip.source_offset     = self.offset;
    }
}

/// Per-move inputs the gesture cannot derive from the clip alone.
#[derive(Clone, Debug)]
pub struct DragContext<'a> {
    pub scale:          TimeScale,
    /// Snap guides (see `snap::snap_guides`). Only Move uses them.
    pub guides:         &'a [f64],
    pub snap_threshold: f64,
    pub min_duration:   f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Gesture {
    pub clip_id:  Uuid,
    pub kind:     GestureKind,
    anchor_x:     f32,
    pub original: Placement,
    pub preview:  Placement,
    /// Guide the preview is currently snapped to, if any.
    pub guide:    Option<f64>,
    /// Upper bound on `duration` for trim-end: the remaining source length.
    max_duration: Option<f64>,
}

impl Gesture {
    pub fn begin(clip: &Clip, kind: GestureKind, pointer_x: f32) -> Self {
        let original = Placement::of(clip);
        let max_duration = clip.source_duration
            .filter(|_| clip.media_kind.has_finite_source())
            .map(|src| src - clip.source_offset);
        Self {
            clip_id: clip.id,
            kind,
            anchor_x: pointer_x,
            original,
            preview: original,
            guide: None,
            max_duration,
        }
    }

    /// Recompute the preview for the pointer now at `pointer_x`.
    pub fn update(&mut self, pointer_x: f32, ctx: &DragContext<'_>) {
        let o  = self.original;
        // Pointer travel in seconds, applied to the grabbed edge without a
        // round trip through f32 pixels: zero travel leaves the edge exact.
        let delta = (pointer_x - self.anchor_x) as f64 * ctx.scale.seconds_per_pixel();
        let edge_at = |t: f64| t + delta;

        match self.kind {
            GestureKind::Move => {
                let candidate = edge_at(o.start).max(0.0);
                let SnapResult { start, guide } =
                    snap_move(candidate, o.duration, ctx.guides, ctx.snap_threshold);
                self.preview = Placement { start, ..o };
                self.guide = guide;
            }
            GestureKind::TrimStart => {
                let upper = o.end() - ctx.min_duration;
                let lower = (o.start - o.offset).max(0.0);
                let clamped = edge_at(o.start).max(lower).min(upper.max(lower));
                let shift = clamped - o.start;
                self.preview = Placement {
                    start:    clamped,
                    duration: o.duration - shift,
                    offset:   o.offset + shift,
                };
            }
            GestureKind::TrimEnd => {
                let mut duration = (o.duration + delta).max(ctx.min_duration);
                if let Some(max) = self.max_duration {
                    duration = duration.min(max.max(ctx.min_duration));
                }
                self.preview = Placement { duration, ..o };
            }
        }
    }

    /// Screen x of the active snap guide.
    pub fn guide_x(&self, scale: &TimeScale) -> Option<f32> {
        self.guide.map(|g| scale.to_pixels(g))
    }

    /// Patch to commit, or `None` when the drag ended where it began.
    pub fn finish(&self) -> Option<ClipPatch> {
        let (o, p) = (self.original, self.preview);
        match self.kind {
            GestureKind::Move if p.start != o.start => Some(ClipPatch::start(p.start)),
            GestureKind::TrimStart if p != o => Some(ClipPatch::placement(p.start, p.duration, p.offset)),
            GestureKind::TrimEnd if p.duration != o.duration => Some(ClipPatch::duration(p.duration)),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self.kind {
            GestureKind::Move      => "Move clip",
            GestureKind::TrimStart => "Trim start",
            GestureKind::TrimEnd   => "Trim end",
        }
    }
}

/// Position drag on the preview surface, in canvas pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct CanvasDrag {
    pub clip_id: Uuid,
    anchor:      (f32, f32),
    original:    (f32, f32),
    pub preview: (f32, f32),
}

impl CanvasDrag {
    pub fn begin(clip: &Clip, pointer: (f32, f32)) -> Self {
        let original = (clip.visual.x, clip.visual.y);
        Self { clip_id: clip.id, anchor: pointer, original, preview: original }
    }

    pub fn update(&mut self, pointer: (f32, f32)) {
        self.preview = (
            self.original.0 + pointer.0 - self.anchor.0,
            self.original.1 + pointer.1 - self.anchor.1,
        );
    }

    pub fn write_to(&self, clip: &mut Clip) {
        clip.visual.x = self.preview.0;
        clip.visual.y = self.preview.1;
    }

    pub fn finish(&self) -> Option<ClipPatch> {
        (self.preview != self.original).then(|| {
            ClipPatch::visual(VisualPatch {
                x: Some(self.preview.0),
                y: Some(self.preview.1),
                ..VisualPatch::default()
            })
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum GestureState {
    #[default]
    Idle,
    /// Timeline drag: move or trim.
    Dragging(Gesture),
    /// Preview-surface drag: reposition.
    Positioning(CanvasDrag),
}

impl GestureState {
    pub fn active(&self) -> Option<&Gesture> {
        match self {
            GestureState::Dragging(g) => Some(g),
            _                         => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        !matches!(self, GestureState::Idle)
    }

    pub fn clip_id(&self) -> Option<Uuid> {
        match self {
            GestureState::Dragging(g)    => Some(g.clip_id),
            GestureState::Positioning(d) => Some(d.clip_id),
            GestureState::Idle           => None,
        }
    }

    /// `clip` as it should be drawn while this gesture is in flight.
    pub fn preview_of(&self, clip: &Clip) -> Option<Clip> {
        match self {
            GestureState::Dragging(g) if g.clip_id == clip.id => {
                let mut c = clip.clone();
                g.preview.write_to(&mut c);
                Some(c)
            }
            GestureState::Positioning(d) if d.clip_id == clip.id => {
                let mut c = clip.clone();
                d.write_to(&mut c);
                Some(c)
            }
            _ => None,
        }
    }
}

/// How a gesture ended.
#[derive(Clone, Debug, PartialEq)]
pub enum GestureOutcome {
    Committed { clip_id: Uuid, patch: ClipPatch },
    /// Released without a net change. Nothing is written or historied.
    Unchanged,
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MediaKind;

    const ZOOM: f32 = 50.0;

    fn ctx(guides: &[f64]) -> DragContext<'_> {
        DragContext {
            scale:          TimeScale::new(ZOOM, 60.0),
            guides,
            snap_threshold: 15.0 / ZOOM as f64,
            min_duration:   0.1,
        }
    }

    fn video(start: f64, dur: f64, offset: f64) -> Clip {
        let mut c = Clip::new(Uuid::new_v4(), MediaKind::Video, "v", start, dur);
        c.source_offset = offset;
        c
    }

    #[test]
    fn move_follows_pointer_and_clamps_at_zero() {
        let c = video(2.0, 3.0, 0.0);
        let mut g = Gesture::begin(&c, GestureKind::Move, 100.0);
        g.update(150.0, &ctx(&[]));
        assert!((g.preview.start - 3.0).abs() < 1e-6);
        g.update(-400.0, &ctx(&[]));
        assert_eq!(g.preview.start, 0.0);
    }

    #[test]
    fn zero_travel_keeps_fractional_edges_exact() {
        let c = video(1.0 / 3.0, 7.0 / 3.0, 0.1);
        for kind in [GestureKind::Move, GestureKind::TrimStart, GestureKind::TrimEnd] {
            let mut g = Gesture::begin(&c, kind, 100.0);
            g.update(137.0, &ctx(&[]));
            g.update(100.0, &ctx(&[]));
            assert_eq!(g.preview, g.original, "{kind:?}");
            assert_eq!(g.finish(), None, "{kind:?}");
        }
    }

    #[test]
    fn move_snaps_to_guide_and_exposes_it() {
        let c = video(2.0, 3.0, 0.0);
        let mut g = Gesture::begin(&c, GestureKind::Move, 100.0);
        // 2.0 + 195/50 = 5.9, within 0.3 of guide 6.0
        g.update(295.0, &ctx(&[0.0, 6.0]));
        assert_eq!(g.preview.start, 6.0);
        assert_eq!(g.guide, Some(6.0));
        assert_eq!(g.guide_x(&TimeScale::new(ZOOM, 60.0)), Some(300.0));
    }

    #[test]
    fn trim_start_moves_offset_in_lockstep() {
        let c = video(2.0, 6.0, 1.0);
        let mut g = Gesture::begin(&c, GestureKind::TrimStart, 100.0);
        g.update(150.0, &ctx(&[]));
        let p = g.preview;
        assert!((p.start - 3.0).abs() < 1e-6);
        assert!((p.duration - 5.0).abs() < 1e-6);
        assert!((p.offset - 2.0).abs() < 1e-6);
        assert!(((p.start - 2.0) - (p.offset - 1.0)).abs() < 1e-9);
        assert!((p.end() - c.end()).abs() < 1e-9);
    }

    #[test]
    fn trim_start_never_exposes_negative_offset() {
        let c = video(4.0, 2.0, 1.5);
        let mut g = Gesture::begin(&c, GestureKind::TrimStart, 200.0);
        g.update(0.0, &ctx(&[]));
        assert!((g.preview.start - 2.5).abs() < 1e-9);
        assert!(g.preview.offset.abs() < 1e-9);
        assert!((g.preview.duration - 3.5).abs() < 1e-9);
    }

    #[test]
    fn trim_start_keeps_minimum_duration() {
        let c = video(0.0, 2.0, 0.0);
        let mut g = Gesture::begin(&c, GestureKind::TrimStart, 0.0);
        g.update(5000.0, &ctx(&[]));
        assert!((g.preview.duration - 0.1).abs() < 1e-9);
        assert!((g.preview.start - 1.9).abs() < 1e-9);
    }

    #[test]
    fn trim_end_respects_min_and_source_length() {
        let mut c = video(0.0, 4.0, 1.0);
        c.source_duration = Some(8.0);
        let mut g = Gesture::begin(&c, GestureKind::TrimEnd, 200.0);
        g.update(-1000.0, &ctx(&[]));
        assert!((g.preview.duration - 0.1).abs() < 1e-9);
        g.update(5000.0, &ctx(&[]));
        assert!((g.preview.duration - 7.0).abs() < 1e-9);
        assert_eq!(g.preview.offset, 1.0);
    }

    #[test]
    fn images_extend_without_limit() {
        let mut c = Clip::new(Uuid::new_v4(), MediaKind::Image, "still", 0.0, 5.0);
        c.source_duration = Some(5.0);
        let mut g = Gesture::begin(&c, GestureKind::TrimEnd, 250.0);
        g.update(750.0, &ctx(&[]));
        assert!((g.preview.duration - 15.0).abs() < 1e-6);
    }

    #[test]
    fn release_in_place_is_unchanged() {
        let c = video(2.0, 3.0, 0.0);
        let mut g = Gesture::begin(&c, GestureKind::Move, 100.0);
        g.update(180.0, &ctx(&[]));
        g.update(100.0, &ctx(&[]));
        assert_eq!(g.finish(), None);
    }

    #[test]
    fn canvas_drag_offsets_from_original_position() {
        let mut c = video(0.0, 5.0, 0.0);
        c.visual.x = 10.0;
        let mut d = CanvasDrag::begin(&c, (960.0, 540.0));
        d.update((1000.0, 500.0));
        assert_eq!(d.preview, (50.0, -40.0));
        let patch = d.finish().unwrap().visual.unwrap();
        assert_eq!((patch.x, patch.y, patch.opacity), (Some(50.0), Some(-40.0), None));

        d.update((960.0, 540.0));
        assert_eq!(d.finish(), None);
    }

    #[test]
    fn preview_only_touches_dragged_clip() {
        let a = video(2.0, 3.0, 0.0);
        let b = video(8.0, 1.0, 0.0);
        let mut g = Gesture::begin(&a, GestureKind::Move, 100.0);
        g.update(200.0, &ctx(&[]));
        let state = GestureState::Dragging(g);
        assert!((state.preview_of(&a).unwrap().timeline_start - 4.0).abs() < 1e-6);
        assert_eq!(state.preview_of(&b), None);
    }

    #[test]
    fn trim_end_commits_duration_only() {
        let c = video(0.0, 10.0, 0.0);
        let mut g = Gesture::begin(&c, GestureKind::TrimEnd, 500.0);
        g.update(350.0, &ctx(&[]));
        let patch = g.finish().unwrap();
        assert_eq!(patch.timeline_start, None);
        assert!((patch.timeline_duration.unwrap() - 7.0).abs() < 1e-6);
    }
}
