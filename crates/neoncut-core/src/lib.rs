// crates/neoncut-core/src/lib.rs
//
// Timeline editing engine: clip/track model, direct manipulation, history,
// playback clock. No pixels and no I/O; neoncut-media renders and records
// from what this crate exposes.
//
// To add a new editing action:
//   1. Add a variant to `commands::EditorCommand`
//   2. Add one match arm in `Editor::process_command`
//   3. If it mutates clips, route it through `commit_with`

pub mod commands;
pub mod config;
pub mod edit;
pub mod editor;
pub mod gesture;
pub mod helpers;
pub mod history;
pub mod keymap;
pub mod layout;
pub mod notify;
pub mod patch;
pub mod playback;
pub mod presets;
pub mod query;
pub mod snap;
pub mod state;
pub mod store;

pub use commands::EditorCommand;
pub use config::EditorConfig;
pub use editor::Editor;
pub use notify::{NoticeLevel, Notifier};
pub use playback::ClockEvent;
pub use state::{Clip, EditorState, MediaAsset, MediaKind, Track};
