// crates/neoncut-core/src/commands.rs
//
// Every discrete user action is an EditorCommand. Views and the keymap emit
// them; Editor::process_command applies them. Continuous pointer drags are
// not commands: they go through the gesture API and commit once on release.

use uuid::Uuid;

use crate::patch::{ClipPatch, VisualPatch};
use crate::state::{MediaAsset, MediaKind};
use crate::store::TrackFlags;

#[derive(Debug, Clone, PartialEq)]
pub enum EditorCommand {
    // ── Playback ─────────────────────────────────────────────────────────────
    Play,
    Pause,
    TogglePlayback,
    SetPlayhead(f64),

    // ── Timeline ─────────────────────────────────────────────────────────────
    /// Drop an imported asset at the playhead on the first lane that takes it.
    AddAsset(MediaAsset),
    /// Source-less clip (title card, placeholder audio) at the playhead.
    AddPresetClip { kind: MediaKind, name: String, visual: VisualPatch, duration: f64 },
    SelectClip(Option<Uuid>),
    UpdateClip { id: Uuid, patch: ClipPatch },
    /// Property edit on whatever is selected (filter / fade / effect presets).
    UpdateSelected(VisualPatch),
    SplitSelected,
    DeleteSelected,
    RippleDeleteSelected,

    // ── Tracks ───────────────────────────────────────────────────────────────
    AddTrack { kind: MediaKind, name: String },
    SetTrackFlags { id: Uuid, flags: TrackFlags },

    // ── Undo / Redo ──────────────────────────────────────────────────────────
    Undo,
    Redo,

    // ── View ─────────────────────────────────────────────────────────────────
    SetZoom(f32),
    ZoomIn,
    ZoomOut,
}
