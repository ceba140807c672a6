// crates/neoncut-core/src/store.rs
//
// Authoritative clip and track collections.
//
// Reads are public. Writes are `pub(crate)` so that only the Editor's commit
// path (and history restore) can change clips; every other caller goes
// through an EditorCommand.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::patch::ClipPatch;
use crate::state::{default_tracks, Clip, MediaKind, Track};

/// Partial update for the per-track toggles. Not historied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackFlags {
    pub muted:  Option<bool>,
    pub locked: Option<bool>,
    pub hidden: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClipStore {
    tracks: Vec<Track>,
    clips:  Vec<Clip>,
}

impl ClipStore {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks, clips: Vec::new() }
    }

    pub fn with_default_tracks() -> Self {
        Self::new(default_tracks())
    }

    // ── Reads ────────────────────────────────────────────────────────────────

    /// All clips in store order. Within one track, later clips draw on top.
    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    /// All tracks in display order (top lane first).
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn clip(&self, id: Uuid) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id == id)
    }

    pub fn track(&self, id: Uuid) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    /// Display row of a track, 0 = top lane.
    pub fn track_index(&self, id: Uuid) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    /// First track (in display order) that accepts `kind`.
    pub fn track_for_kind(&self, kind: MediaKind) -> Option<&Track> {
        self.tracks.iter().find(|t| t.accepts(kind))
    }

    pub fn clips_on_track(&self, track_id: Uuid) -> impl Iterator<Item = &Clip> + '_ {
        self.clips.iter().filter(move |c| c.track_id == track_id)
    }

    /// Latest clip end across all tracks; 0 for an empty timeline.
    pub fn furthest_end(&self) -> f64 {
        self.clips.iter().map(Clip::end).fold(0.0, f64::max)
    }

    /// Pairs of clips on `track_id` whose ranges intersect. Overlap is allowed;
    /// this lets a view flag it.
    pub fn overlaps_on_track(&self, track_id: Uuid) -> Vec<(Uuid, Uuid)> {
        let on_track: Vec<&Clip> = self.clips_on_track(track_id).collect();
        let mut pairs = Vec::new();
        for (i, a) in on_track.iter().enumerate() {
            for b in &on_track[i + 1..] {
                if a.timeline_start < b.end() && b.timeline_start < a.end() {
                    pairs.push((a.id, b.id));
                }
            }
        }
        pairs
    }

    // ── Writes (commit path only) ────────────────────────────────────────────

    /// Append `clip`. Refused when its track is unknown, rejects its kind,
    /// or the clip is malformed.
    pub(crate) fn add_clip(&mut self, clip: Clip) -> bool {
        let Some(track) = self.track(clip.track_id) else {
            warn!(clip = %clip.id, track = %clip.track_id, "add_clip: unknown track");
            return false;
        };
        if !track.accepts(clip.media_kind) {
            warn!(clip = %clip.id, kind = ?clip.media_kind, lane = ?track.media_kind,
                  "add_clip: track does not accept clip kind");
            return false;
        }
        if !clip.is_well_formed() {
            warn!(clip = %clip.id, "add_clip: malformed placement");
            return false;
        }
        debug!(clip = %clip.id, start = clip.timeline_start, dur = clip.timeline_duration, "clip added");
        self.clips.push(clip);
        true
    }

    /// Shallow-merge `patch` into clip `id`. Unknown id is a no-op.
    pub(crate) fn update_clip(&mut self, id: Uuid, patch: &ClipPatch) -> bool {
        let Some(kind) = self.clip(id).map(|c| c.media_kind) else {
            debug!(clip = %id, "update_clip: unknown clip");
            return false;
        };
        let new_track = patch.track_id.filter(|tid| self.track(*tid).is_some_and(|t| t.accepts(kind)));
        if let Some(tid) = patch.track_id {
            if new_track.is_none() {
                debug!(clip = %id, track = %tid, ?kind, "update_clip: ignoring unknown or incompatible track");
            }
        }
        let Some(clip) = self.clips.iter_mut().find(|c| c.id == id) else {
            return false;
        };
        patch.apply_to(clip);
        if let Some(tid) = new_track {
            clip.track_id = tid;
        }
        true
    }

    /// Swap in a whole clip collection (history restore, batch edits).
    pub(crate) fn replace_clips(&mut self, clips: Vec<Clip>) {
        self.clips = clips;
    }

    pub(crate) fn into_clips(self) -> Vec<Clip> {
        self.clips
    }

    pub(crate) fn add_track(&mut self, track: Track) -> Uuid {
        let id = track.id;
        debug!(track = %id, kind = ?track.media_kind, "track added");
        self.tracks.push(track);
        id
    }

    pub(crate) fn set_track_flags(&mut self, id: Uuid, flags: TrackFlags) -> bool {
        let Some(track) = self.tracks.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        if let Some(m) = flags.muted  { track.muted  = m; }
        if let Some(l) = flags.locked { track.locked = l; }
        if let Some(h) = flags.hidden { track.hidden = h; }
        true
    }
}
