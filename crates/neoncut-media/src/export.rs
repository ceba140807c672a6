// crates/neoncut-media/src/export.rs
//
// One export run: Idle → Capturing → Finalizing → Idle | Failed.
//
//   ExportSession::start   validate, start the recorder, put the editor in
//                          export mode (rewind + play from 0)
//   ExportSession::capture called once per rendered frame; pushes as many
//                          copies of the surface as the fixed-rate gate asks
//   ExportSession::finish  called when the clock reaches the end; stops the
//                          recorder and concatenates every emitted chunk
//   ExportSession::fail    any error path; aborts the recorder, drops the
//                          partial chunks, resets editor flags, notifies
//
// Export replays playback in real time. There is no faster-than-real-time
// path: the frame loop drives capture from the same clock the preview uses.

use std::path::{Path, PathBuf};

use crossbeam_channel::{unbounded, Receiver};
use neoncut_core::{Editor, NoticeLevel};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::capture::{frame_count_for, CaptureStream};
use crate::error::ExportError;
use crate::recorder::{ApngRecorder, MediaRecorder, RecordSpec, RecorderEvent};
use crate::surface::Surface;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub width:      u32,
    pub height:     u32,
    pub fps:        u32,
    pub file_name:  String,
    /// Bytes per recorder data chunk.
    pub chunk_size: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            width:      1920,
            height:     1080,
            fps:        30,
            file_name:  "neoncut-export.png".into(),
            chunk_size: 64 * 1024,
        }
    }
}

impl ExportConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ExportError> {
        let cfg: ExportConfig = serde_json::from_str(json)
            .map_err(|e| ExportError::InvalidConfig(format!("parse export config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ExportError> {
        let bad = |msg: String| Err(ExportError::InvalidConfig(msg));
        if self.width == 0 || self.height == 0 {
            return bad(format!("frame size {}x{} is empty", self.width, self.height));
        }
        if !(1..=240).contains(&self.fps) {
            return bad(format!("fps {} outside 1..=240", self.fps));
        }
        if self.chunk_size == 0 {
            return bad("chunk_size must be positive".into());
        }
        if self.file_name.trim().is_empty() {
            return bad("file_name is empty".into());
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportPhase {
    Idle,
    Capturing,
    Finalizing,
    Failed,
}

/// The finished file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportArtifact {
    pub bytes:     Vec<u8>,
    pub mime_type: &'static str,
    pub file_name: String,
}

impl ExportArtifact {
    /// Write the artifact into `dir` under its file name.
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        info!(path = %path.display(), bytes = self.bytes.len(), "export saved");
        Ok(path)
    }
}

pub struct ExportSession {
    config:   ExportConfig,
    recorder: Box<dyn MediaRecorder>,
    rx:       Receiver<RecorderEvent>,
    chunks:   Vec<Vec<u8>>,
    stopped:  bool,
    capture:  CaptureStream,
    phase:    ExportPhase,
}

impl ExportSession {
    /// Start an APNG export.
    pub fn start(editor: &mut Editor, config: ExportConfig) -> Result<Self, ExportError> {
        let recorder = Box::new(ApngRecorder::new(config.chunk_size));
        Self::start_with(editor, config, recorder)
    }

    pub fn start_with(
        editor:       &mut Editor,
        config:       ExportConfig,
        mut recorder: Box<dyn MediaRecorder>,
    ) -> Result<Self, ExportError> {
        let refuse = |editor: &mut Editor, err: ExportError| -> Result<Self, ExportError> {
            warn!(error = %err, "export refused");
            editor.notify(NoticeLevel::Warning, &err.user_message());
            Err(err)
        };

        if let Err(e) = config.validate() {
            return refuse(editor, e);
        }
        if editor.state().is_exporting {
            return refuse(editor, ExportError::AlreadyExporting);
        }
        if editor.clips().is_empty() {
            return refuse(editor, ExportError::EmptyTimeline);
        }
        if !editor.has_visual_content() {
            warn!("export of an audio-only timeline renders blank frames");
            editor.notify(NoticeLevel::Warning, "Nothing visible on the timeline; the export will be blank");
        }

        let frame_count = frame_count_for(editor.state().total_duration, config.fps);
        let spec = RecordSpec { width: config.width, height: config.height, fps: config.fps, frame_count };
        let (tx, rx) = unbounded();
        if let Err(e) = recorder.start(spec, tx) {
            return refuse(editor, ExportError::Recorder(e));
        }
        if !editor.begin_export() {
            recorder.abort();
            return refuse(editor, ExportError::AlreadyExporting);
        }

        info!(
            w = config.width, h = config.height, fps = config.fps, frames = frame_count,
            duration = editor.state().total_duration, mime = recorder.mime_type(),
            "export started",
        );
        Ok(Self {
            capture: CaptureStream::new(config.fps, frame_count),
            config,
            recorder,
            rx,
            chunks: Vec::new(),
            stopped: false,
            phase: ExportPhase::Capturing,
        })
    }

    pub fn phase(&self) -> ExportPhase {
        self.phase
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Fraction of the frame budget captured so far.
    pub fn progress(&self) -> f32 {
        let total = self.capture.emitted() + self.capture.remaining();
        if total == 0 { 1.0 } else { self.capture.emitted() as f32 / total as f32 }
    }

    /// Feed the surface rendered for the editor's current playhead. Returns
    /// how many frames were recorded from it.
    pub fn capture(&mut self, editor: &Editor, surface: &Surface) -> Result<u32, ExportError> {
        let due = self.capture.frames_due(editor.state().current_time);
        for _ in 0..due {
            self.recorder.push_frame(surface).map_err(ExportError::Recorder)?;
        }
        self.drain();
        Ok(due)
    }

    /// Stop recording and assemble the artifact. On error the session is
    /// failed (flags reset, user notified) and the error returned.
    pub fn finish(mut self, editor: &mut Editor) -> Result<ExportArtifact, ExportError> {
        self.phase = ExportPhase::Finalizing;
        if let Err(e) = self.recorder.stop() {
            return Err(self.fail(editor, ExportError::Recorder(e)));
        }
        self.drain();
        if !self.stopped {
            let err = ExportError::Recorder(anyhow::anyhow!("recorder ended without a stop event"));
            return Err(self.fail(editor, err));
        }

        editor.end_export();
        self.phase = ExportPhase::Idle;
        let bytes = self.chunks.concat();
        info!(bytes = bytes.len(), frames = self.capture.emitted(), "export finished");
        editor.notify(NoticeLevel::Info, &format!("Export ready: {}", self.config.file_name));
        Ok(ExportArtifact {
            bytes,
            mime_type: self.recorder.mime_type(),
            file_name: self.config.file_name.clone(),
        })
    }

    /// Abort the run. Releases the recorder and partial data, leaves the
    /// editor out of export mode, and reports `err` to the user.
    pub fn fail(&mut self, editor: &mut Editor, err: ExportError) -> ExportError {
        self.recorder.abort();
        self.chunks.clear();
        self.rx.try_iter().for_each(drop);
        self.phase = ExportPhase::Failed;
        editor.end_export();
        warn!(error = %err, "export failed");
        editor.notify(NoticeLevel::Error, &err.user_message());
        err
    }

    fn drain(&mut self) {
        for ev in self.rx.try_iter() {
            match ev {
                RecorderEvent::Data(chunk) => {
                    debug!(bytes = chunk.len(), "export chunk");
                    self.chunks.push(chunk);
                }
                RecorderEvent::Stopped => self.stopped = true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use crossbeam_channel::Sender;
    use neoncut_core::notify::MemoryNotifier;
    use neoncut_core::state::{MediaAsset, MediaKind, SourceRef};
    use neoncut_core::EditorConfig;

    fn small() -> ExportConfig {
        ExportConfig { width: 4, height: 2, fps: 10, ..ExportConfig::default() }
    }

    fn editor_with_clip() -> (Editor, MemoryNotifier) {
        let notes = MemoryNotifier::new();
        let mut ed = Editor::new(EditorConfig::default(), Box::new(notes.clone()));
        ed.add_asset(&MediaAsset {
            source_ref:       SourceRef::new("blob:still"),
            media_kind:       MediaKind::Image,
            display_name:     "still.png".into(),
            natural_duration: 0.0,
            thumbnail:        None,
        });
        (ed, notes)
    }

    /// Records nothing and fails on the second frame.
    struct Flaky {
        pushed: u32,
    }

    impl MediaRecorder for Flaky {
        fn mime_type(&self) -> &'static str { "application/octet-stream" }
        fn file_extension(&self) -> &'static str { "bin" }
        fn start(&mut self, _spec: RecordSpec, tx: Sender<RecorderEvent>) -> anyhow::Result<()> {
            tx.send(RecorderEvent::Data(vec![1, 2, 3]))?;
            Ok(())
        }
        fn push_frame(&mut self, _frame: &Surface) -> anyhow::Result<()> {
            self.pushed += 1;
            if self.pushed > 1 {
                bail!("disk full");
            }
            Ok(())
        }
        fn stop(&mut self) -> anyhow::Result<()> { Ok(()) }
        fn abort(&mut self) {}
    }

    #[test]
    fn config_defaults_and_validation() {
        let cfg = ExportConfig::default();
        assert_eq!((cfg.width, cfg.height, cfg.fps), (1920, 1080, 30));
        assert_eq!(cfg.file_name, "neoncut-export.png");
        assert!(cfg.validate().is_ok());

        let err = ExportConfig::from_json_str(r#"{ "fps": 0 }"#).unwrap_err();
        assert!(matches!(err, ExportError::InvalidConfig(ref m) if m.contains("fps 0")));
        let partial = ExportConfig::from_json_str(r#"{ "width": 640, "height": 360 }"#).unwrap();
        assert_eq!((partial.width, partial.fps), (640, 30));
    }

    #[test]
    fn empty_timeline_is_refused_and_reported() {
        let notes = MemoryNotifier::new();
        let mut ed = Editor::new(EditorConfig::default(), Box::new(notes.clone()));
        let err = ExportSession::start(&mut ed, small()).err().unwrap();
        assert!(matches!(err, ExportError::EmptyTimeline));
        assert!(!ed.state().is_exporting);
        assert_eq!(notes.last().unwrap().level, NoticeLevel::Warning);
    }

    #[test]
    fn audio_only_timeline_warns_but_exports() {
        let notes = MemoryNotifier::new();
        let mut ed = Editor::new(EditorConfig::default(), Box::new(notes.clone()));
        ed.add_asset(&MediaAsset {
            source_ref:       SourceRef::new("blob:voice"),
            media_kind:       MediaKind::Audio,
            display_name:     "voice.wav".into(),
            natural_duration: 3.0,
            thumbnail:        None,
        });
        assert!(!ed.has_visual_content());

        let session = ExportSession::start(&mut ed, small()).unwrap();
        assert_eq!(session.phase(), ExportPhase::Capturing);
        let last = notes.last().unwrap();
        assert_eq!(last.level, NoticeLevel::Warning);
        assert!(last.message.contains("blank"));
    }

    #[test]
    fn second_start_is_refused() {
        let (mut ed, _notes) = editor_with_clip();
        let _first = ExportSession::start(&mut ed, small()).unwrap();
        let err = ExportSession::start(&mut ed, small()).err().unwrap();
        assert!(matches!(err, ExportError::AlreadyExporting));
        assert!(ed.state().is_exporting, "first run keeps going");
    }

    #[test]
    fn full_run_produces_apng() {
        let (mut ed, notes) = editor_with_clip();
        let mut session = ExportSession::start(&mut ed, small()).unwrap();
        assert!(ed.state().is_exporting && ed.state().is_playing);
        assert_eq!(ed.state().current_time, 0.0);

        let frame = Surface::filled(4, 2, [0, 255, 0, 255]);
        assert_eq!(session.capture(&ed, &frame).unwrap(), 1);
        ed.advance(0.25);
        assert_eq!(session.capture(&ed, &frame).unwrap(), 2);
        assert!(session.progress() > 0.0);

        let art = session.finish(&mut ed).unwrap();
        assert_eq!(art.mime_type, "image/apng");
        assert_eq!(&art.bytes[1..4], b"PNG");
        assert!(!ed.state().is_exporting && !ed.state().is_playing);
        assert_eq!(notes.last().unwrap().level, NoticeLevel::Info);

        let dir = tempfile::tempdir().unwrap();
        let path = art.save_to(dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "neoncut-export.png");
        assert_eq!(std::fs::read(path).unwrap(), art.bytes);
    }

    #[test]
    fn recorder_failure_resets_flags_and_notifies() {
        let (mut ed, notes) = editor_with_clip();
        let mut session =
            ExportSession::start_with(&mut ed, small(), Box::new(Flaky { pushed: 0 })).unwrap();

        let frame = Surface::new(4, 2);
        session.capture(&ed, &frame).unwrap();
        ed.advance(1.0);
        let err = session.capture(&ed, &frame).unwrap_err();
        let err = session.fail(&mut ed, err);

        assert_eq!(session.phase(), ExportPhase::Failed);
        assert!(!ed.state().is_exporting && !ed.state().is_playing);
        let last = notes.last().unwrap();
        assert_eq!(last.level, NoticeLevel::Error);
        assert!(last.message.contains("disk full"), "{}", last.message);
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn finish_without_stop_event_fails() {
        let (mut ed, notes) = editor_with_clip();
        let session =
            ExportSession::start_with(&mut ed, small(), Box::new(Flaky { pushed: 0 })).unwrap();
        let err = session.finish(&mut ed).unwrap_err();
        assert!(matches!(err, ExportError::Recorder(_)));
        assert!(!ed.state().is_exporting);
        assert_eq!(notes.last().unwrap().level, NoticeLevel::Error);
    }
}
