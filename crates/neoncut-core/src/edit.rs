// crates/neoncut-core/src/edit.rs
//
// Discrete timeline edits as pure functions over the clip list.
// Each returns the complete new clip set (or None when the edit does not
// apply) so the Editor can hand it to the commit path unchanged.

use uuid::Uuid;

use crate::state::Clip;

/// Cut clip `id` at `playhead`. The left half keeps the id; the right half
/// gets a fresh id and is inserted right after it. Returns the new clip set
/// and the right half's id.
///
/// No-op unless `playhead` lies strictly inside the clip.
pub fn split(clips: &[Clip], id: Uuid, playhead: f64) -> Option<(Vec<Clip>, Uuid)> {
    let idx = clips.iter().position(|c| c.id == id)?;
    let original = &clips[idx];
    if !original.contains_strictly(playhead) {
        return None;
    }

    let left_len = playhead - original.timeline_start;
    let mut left = original.clone();
    left.timeline_duration = left_len;

    let mut right = original.clone();
    right.id                = Uuid::new_v4();
    right.timeline_start    = playhead;
    right.timeline_duration = original.timeline_duration - left_len;
    right.source_offset     = original.source_offset + left_len;
    let right_id = right.id;

    let mut out = Vec::with_capacity(clips.len() + 1);
    out.extend_from_slice(&clips[..idx]);
    out.push(left);
    out.push(right);
    out.extend_from_slice(&clips[idx + 1..]);
    Some((out, right_id))
}

/// Remove clip `id`. Everything else is untouched.
pub fn delete(clips: &[Clip], id: Uuid) -> Option<Vec<Clip>> {
    clips.iter().any(|c| c.id == id).then(|| {
        clips.iter().filter(|c| c.id != id).cloned().collect()
    })
}

/// Remove clip `id` and pull every later clip on the same track left by its
/// duration. Clips on other tracks, and earlier clips, do not move.
pub fn ripple_delete(clips: &[Clip], id: Uuid) -> Option<Vec<Clip>> {
    let gone = clips.iter().find(|c| c.id == id)?;
    let (track, start, dur) = (gone.track_id, gone.timeline_start, gone.timeline_duration);

    Some(
        clips.iter()
            .filter(|c| c.id != id)
            .map(|c| {
                let mut c = c.clone();
                if c.track_id == track && c.timeline_start > start {
                    c.timeline_start = (c.timeline_start - dur).max(0.0);
                }
                c
            })
            .collect(),
    )
}
