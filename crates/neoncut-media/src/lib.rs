// crates/neoncut-media/src/lib.rs
//
// Pixels and files. Reads the editor through neoncut-core's public API and
// never mutates clips.
//
// To add a new recorder backend:
//   1. Implement `recorder::MediaRecorder`
//   2. Start it with `ExportSession::start_with` / `FrameLoop::start_export_with`

pub mod blend;
pub mod capture;
pub mod compositor;
pub mod error;
pub mod export;
pub mod frame_loop;
pub mod recorder;
pub mod sources;
pub mod surface;

pub use compositor::Compositor;
pub use error::ExportError;
pub use export::{ExportArtifact, ExportConfig, ExportPhase, ExportSession};
pub use frame_loop::{FrameLoop, FrameOutcome};
pub use recorder::{ApngRecorder, MediaRecorder};
pub use sources::{FontdueRasterizer, FrameSource, ImageLibrary, TextRasterizer};
pub use surface::Surface;
