// crates/neoncut-core/src/editor.rs
//
// The editor session: store, history, clock, gesture and notifier wired
// together behind one command processor.
//
// Every clip mutation funnels through `commit_with`:
//
//   1. run the edit against a scratch copy of the store
//   2. if the clip set changed, push the *current* clips onto history
//      (this also clears redo)
//   3. swap the scratch clips in and grow total_duration to fit
//
// so the history entry always exists before the new state is observable,
// and an edit that changes nothing leaves no undo step.

use std::borrow::Cow;

use tracing::debug;
use uuid::Uuid;

use crate::commands::EditorCommand;
use crate::config::EditorConfig;
use crate::edit;
use crate::gesture::{CanvasDrag, DragContext, Gesture, GestureKind, GestureOutcome, GestureState};
use crate::helpers::scale::TimeScale;
use crate::history::History;
use crate::layout::{Hit, TimelineLayout, RULER_HEIGHT};
use crate::notify::{NoticeLevel, Notifier, TracingNotifier};
use crate::patch::ClipPatch;
use crate::playback::{ClockEvent, PlaybackClock};
use crate::query;
use crate::snap::{snap_guides, snap_threshold};
use crate::state::{Clip, EditorState, MediaAsset, Track, DEFAULT_STILL_DURATION};
use crate::store::ClipStore;

pub struct Editor {
    config:    EditorConfig,
    state:     EditorState,
    store:     ClipStore,
    history:   History,
    clock:     PlaybackClock,
    gesture:   GestureState,
    scrubbing: bool,
    notifier:  Box<dyn Notifier>,
}

impl Editor {
    pub fn new(config: EditorConfig, notifier: Box<dyn Notifier>) -> Self {
        Self {
            state:     EditorState::new(&config),
            store:     ClipStore::with_default_tracks(),
            history:   History::new(config.history_depth),
            clock:     PlaybackClock::new(config.max_frame_delta),
            gesture:   GestureState::Idle,
            scrubbing: false,
            notifier,
            config,
        }
    }

    // ── Reads ────────────────────────────────────────────────────────────────

    pub fn config(&self)  -> &EditorConfig { &self.config }
    pub fn state(&self)   -> &EditorState  { &self.state }
    pub fn store(&self)   -> &ClipStore    { &self.store }
    pub fn clips(&self)   -> &[Clip]       { self.store.clips() }
    pub fn tracks(&self)  -> &[Track]      { self.store.tracks() }
    pub fn history(&self) -> &History      { &self.history }
    pub fn gesture(&self) -> &GestureState { &self.gesture }

    pub fn scale(&self) -> TimeScale {
        TimeScale::from_state(&self.state)
    }

    pub fn layout(&self) -> TimelineLayout {
        TimelineLayout::new(self.scale(), &self.config)
    }

    pub fn selected_clip(&self) -> Option<&Clip> {
        query::selected_clip(self.store.clips(), &self.state)
    }

    /// Clips as they should be drawn right now: the store with any in-flight
    /// gesture's proposed geometry applied. Both the timeline view and the
    /// compositor read this, so they never disagree.
    pub fn render_clips(&self) -> Cow<'_, [Clip]> {
        let clips = self.store.clips();
        if !self.gesture.is_dragging() {
            return Cow::Borrowed(clips);
        }
        Cow::Owned(
            clips.iter()
                .map(|c| self.gesture.preview_of(c).unwrap_or_else(|| c.clone()))
                .collect(),
        )
    }

    /// Screen x of the snap indicator while a move is snapped.
    pub fn snap_guide_x(&self) -> Option<f32> {
        self.gesture.active().and_then(|g| g.guide_x(&self.scale()))
    }

    pub fn notify(&mut self, level: NoticeLevel, message: &str) {
        self.notifier.notify(level, message);
    }

    // ── Commands ─────────────────────────────────────────────────────────────

    pub fn process_command(&mut self, cmd: EditorCommand) {
        if self.state.is_exporting && !Self::allowed_while_exporting(&cmd) {
            debug!(?cmd, "command ignored during export");
            return;
        }

        match cmd {
            // ── Playback ─────────────────────────────────────────────────────
            EditorCommand::Play           => if !self.state.is_playing { self.clock.start(&mut self.state) },
            EditorCommand::Pause          => if self.state.is_playing { self.clock.stop(&mut self.state) },
            EditorCommand::TogglePlayback => self.clock.toggle(&mut self.state),
            EditorCommand::SetPlayhead(t) => self.clock.seek(&mut self.state, t),

            // ── Timeline ─────────────────────────────────────────────────────
            EditorCommand::AddAsset(asset) => {
                self.add_asset(&asset);
            }
            EditorCommand::AddPresetClip { kind, name, visual, duration } => {
                let Some(track) = self.store.track_for_kind(kind) else {
                    debug!(?kind, "no lane accepts preset clip");
                    return;
                };
                let duration = if duration.is_finite() && duration > 0.0 { duration } else { DEFAULT_STILL_DURATION };
                let mut clip = Clip::new(track.id, kind, name, self.state.current_time, duration);
                visual.apply_to(&mut clip.visual);
                self.commit_with("Add clip", |s| s.add_clip(clip));
            }
            EditorCommand::SelectClip(id) => {
                self.state.selected_clip_id = id.filter(|id| self.store.clip(*id).is_some());
            }
            EditorCommand::UpdateClip { id, patch } => {
                self.commit_with("Edit clip", |s| s.update_clip(id, &patch));
            }
            EditorCommand::UpdateSelected(visual) => {
                if let Some(id) = self.state.selected_clip_id {
                    let patch = ClipPatch::visual(visual);
                    self.commit_with("Edit clip", |s| s.update_clip(id, &patch));
                }
            }
            EditorCommand::SplitSelected        => self.split_selected(),
            EditorCommand::DeleteSelected       => self.delete_selected(false),
            EditorCommand::RippleDeleteSelected => self.delete_selected(true),

            // ── Tracks ───────────────────────────────────────────────────────
            EditorCommand::AddTrack { kind, name } => {
                self.store.add_track(Track::new(kind, name));
            }
            EditorCommand::SetTrackFlags { id, flags } => {
                self.store.set_track_flags(id, flags);
            }

            // ── Undo / Redo ──────────────────────────────────────────────────
            EditorCommand::Undo => self.undo(),
            EditorCommand::Redo => self.redo(),

            // ── View ─────────────────────────────────────────────────────────
            EditorCommand::SetZoom(z) => self.state.zoom_level = self.config.clamp_zoom(z),
            EditorCommand::ZoomIn     => self.state.zoom_level = self.config.clamp_zoom(self.state.zoom_level * self.config.zoom_step),
            EditorCommand::ZoomOut    => self.state.zoom_level = self.config.clamp_zoom(self.state.zoom_level / self.config.zoom_step),
        }
    }

    /// Only commands that cannot change the rendered output run mid-export.
    fn allowed_while_exporting(cmd: &EditorCommand) -> bool {
        matches!(
            cmd,
            EditorCommand::SelectClip(_)
                | EditorCommand::SetZoom(_)
                | EditorCommand::ZoomIn
                | EditorCommand::ZoomOut
        )
    }

    /// Place `asset` at the playhead on the first lane that accepts its kind.
    /// Returns the new clip id.
    pub fn add_asset(&mut self, asset: &MediaAsset) -> Option<Uuid> {
        let track = self.store.track_for_kind(asset.media_kind)?;
        let clip = Clip::from_asset(asset, track.id, self.state.current_time);
        let id = clip.id;
        self.commit_with("Add clip", |s| s.add_clip(clip)).then_some(id)
    }

    fn split_selected(&mut self) {
        let Some(id) = self.state.selected_clip_id else { return };
        let playhead = self.state.current_time;
        let Some((next, right)) = edit::split(self.store.clips(), id, playhead) else {
            debug!(clip = %id, playhead, "split: playhead not inside clip");
            return;
        };
        if self.commit_with("Split", |s| { s.replace_clips(next); true }) {
            debug!(left = %id, %right, at = playhead, "clip split");
        }
    }

    fn delete_selected(&mut self, ripple: bool) {
        let Some(id) = self.state.selected_clip_id else { return };
        let next = if ripple {
            edit::ripple_delete(self.store.clips(), id)
        } else {
            edit::delete(self.store.clips(), id)
        };
        let Some(next) = next else { return };
        let label = if ripple { "Ripple delete" } else { "Delete" };
        self.commit_with(label, |s| { s.replace_clips(next); true });
        self.state.selected_clip_id = None;
    }

    // ── Commit path ──────────────────────────────────────────────────────────

    /// Apply `edit` through history. Returns true if the clip set changed.
    fn commit_with(&mut self, label: &str, edit: impl FnOnce(&mut ClipStore) -> bool) -> bool {
        let mut scratch = self.store.clone();
        if !edit(&mut scratch) || scratch.clips() == self.store.clips() {
            return false;
        }
        self.history.push(label, self.store.clips().to_vec());
        self.store.replace_clips(scratch.into_clips());
        self.state.grow_to_fit(self.store.furthest_end(), self.config.duration_margin);
        debug!(label, clips = self.store.clips().len(), "committed");
        true
    }

    fn undo(&mut self) {
        if let Some(prev) = self.history.undo(self.store.clips().to_vec()) {
            self.restore(prev);
        }
    }

    fn redo(&mut self) {
        if let Some(next) = self.history.redo(self.store.clips().to_vec()) {
            self.restore(next);
        }
    }

    fn restore(&mut self, clips: Vec<Clip>) {
        self.gesture = GestureState::Idle;
        self.store.replace_clips(clips);
        if let Some(id) = self.state.selected_clip_id {
            if self.store.clip(id).is_none() {
                self.state.selected_clip_id = None;
            }
        }
        self.state.grow_to_fit(self.store.furthest_end(), self.config.duration_margin);
    }

    // ── Timeline pointer ─────────────────────────────────────────────────────

    /// Press on the timeline. A clip under the pointer is selected and, unless
    /// its lane is locked, a move/trim gesture starts. A press on the ruler
    /// starts scrubbing; a press on empty lane space clears the selection.
    pub fn pointer_down(&mut self, x: f32, y: f32) -> Option<Hit> {
        if self.state.is_exporting {
            return None;
        }
        if y < RULER_HEIGHT {
            self.scrubbing = true;
            let t = self.scale().to_seconds(x);
            self.clock.seek(&mut self.state, t);
            return None;
        }
        let Some(hit) = self.layout().hit_test(self.store.clips(), self.store.tracks(), x, y) else {
            self.state.selected_clip_id = None;
            return None;
        };
        self.state.selected_clip_id = Some(hit.clip_id);
        self.begin_gesture(hit.clip_id, hit.zone.gesture(), x);
        Some(hit)
    }

    /// Start a gesture on `clip_id` directly (hosts with their own hit-testing).
    /// Refused for unknown clips and locked lanes.
    pub fn begin_gesture(&mut self, clip_id: Uuid, kind: GestureKind, pointer_x: f32) -> bool {
        let Some(clip) = self.store.clip(clip_id) else { return false };
        if self.store.track(clip.track_id).is_some_and(|t| t.locked) {
            debug!(clip = %clip_id, "gesture refused: lane locked");
            return false;
        }
        self.gesture = GestureState::Dragging(Gesture::begin(clip, kind, pointer_x));
        true
    }

    pub fn pointer_move(&mut self, x: f32, _y: f32) {
        if self.scrubbing {
            let t = self.scale().to_seconds(x);
            self.clock.seek(&mut self.state, t);
            return;
        }
        let GestureState::Dragging(g) = &mut self.gesture else { return };
        let guides = snap_guides(self.store.clips(), g.clip_id, self.state.current_time);
        let ctx = DragContext {
            scale:          TimeScale::from_state(&self.state),
            guides:         &guides,
            snap_threshold: snap_threshold(self.config.snap_radius_px, self.state.zoom_level),
            min_duration:   self.config.min_clip_duration,
        };
        g.update(x, &ctx);
    }

    /// Release. Commits the gesture's net change, if any, as one history step.
    pub fn pointer_up(&mut self) -> GestureOutcome {
        self.scrubbing = false;
        let (clip_id, label, patch) = match std::mem::take(&mut self.gesture) {
            GestureState::Idle           => return GestureOutcome::Unchanged,
            GestureState::Dragging(g)    => (g.clip_id, g.label(), g.finish()),
            GestureState::Positioning(d) => (d.clip_id, "Move element", d.finish()),
        };
        let Some(patch) = patch else { return GestureOutcome::Unchanged };
        if self.commit_with(label, |s| s.update_clip(clip_id, &patch)) {
            GestureOutcome::Committed { clip_id, patch }
        } else {
            GestureOutcome::Unchanged
        }
    }

    /// Abandon the in-flight gesture. Nothing is written or historied.
    pub fn cancel_gesture(&mut self) -> GestureOutcome {
        self.scrubbing = false;
        match std::mem::take(&mut self.gesture) {
            GestureState::Idle => GestureOutcome::Unchanged,
            _                  => GestureOutcome::Cancelled,
        }
    }

    // ── Preview-surface pointer ──────────────────────────────────────────────

    /// Press on the preview surface at canvas pixel `point`. Picks the topmost
    /// visible element (sized by `extent_of`), selects it and starts a
    /// reposition drag. Empty space clears the selection.
    pub fn canvas_pointer_down(
        &mut self,
        canvas:    (u32, u32),
        point:     (f32, f32),
        extent_of: impl Fn(&Clip) -> (f32, f32),
    ) -> Option<Uuid> {
        if self.state.is_exporting {
            return None;
        }
        let t = self.state.current_time;
        let order = query::render_order(self.store.clips(), self.store.tracks(), t);
        let picked = query::pick_on_canvas(&order, canvas, point, extent_of);
        self.state.selected_clip_id = picked;

        let clip = picked.and_then(|id| self.store.clip(id))?;
        if self.store.track(clip.track_id).is_some_and(|t| t.locked) {
            return picked;
        }
        self.gesture = GestureState::Positioning(CanvasDrag::begin(clip, point));
        picked
    }

    pub fn canvas_pointer_move(&mut self, point: (f32, f32)) {
        if let GestureState::Positioning(d) = &mut self.gesture {
            d.update(point);
        }
    }

    // ── Clock ────────────────────────────────────────────────────────────────

    pub fn tick(&mut self, now: f64) -> ClockEvent {
        self.clock.tick(&mut self.state, now)
    }

    pub fn advance(&mut self, delta: f64) -> ClockEvent {
        self.clock.advance(&mut self.state, delta)
    }

    // ── Export hooks ─────────────────────────────────────────────────────────

    /// Enter export mode: drop any gesture, rewind, and play from 0.
    /// Refused if an export is already running.
    pub fn begin_export(&mut self) -> bool {
        if self.state.is_exporting {
            return false;
        }
        self.gesture = GestureState::Idle;
        self.scrubbing = false;
        self.state.is_exporting = true;
        self.state.current_time = 0.0;
        self.clock.start(&mut self.state);
        true
    }

    /// Leave export mode. Safe to call on any path, including failures.
    pub fn end_export(&mut self) {
        self.state.is_exporting = false;
        if self.state.is_playing {
            self.clock.stop(&mut self.state);
        }
    }

    pub fn has_visual_content(&self) -> bool {
        self.store.clips().iter().any(|c| c.media_kind.is_visual())
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default(), Box::new(TracingNotifier))
    }
}
