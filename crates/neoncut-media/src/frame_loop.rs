// crates/neoncut-media/src/frame_loop.rs
//
// The single per-frame callback: advance the clock, redraw, and feed the
// export capture when one is running. Hosts call `frame` from their display
// refresh with a monotonic timestamp in seconds.

use neoncut_core::{ClockEvent, Editor, NoticeLevel};
use tracing::warn;

use crate::compositor::Compositor;
use crate::error::ExportError;
use crate::export::{ExportArtifact, ExportConfig, ExportSession};
use crate::recorder::MediaRecorder;
use crate::sources::{FrameSource, TextRasterizer};
use crate::surface::Surface;

#[derive(Debug)]
pub enum FrameOutcome {
    Rendered,
    /// The clock reached the end of an export run.
    Exported(ExportArtifact),
    /// The export run failed; the message was already sent to the notifier.
    ExportFailed(String),
}

pub struct FrameLoop {
    compositor: Compositor,
    surface:    Surface,
    export:     Option<ExportSession>,
}

impl FrameLoop {
    pub fn new(width: u32, height: u32) -> Self {
        let compositor = Compositor::new(width, height);
        let surface = compositor.surface();
        Self { compositor, surface, export: None }
    }

    pub fn with_compositor(compositor: Compositor) -> Self {
        let surface = compositor.surface();
        Self { compositor, surface, export: None }
    }

    pub fn compositor(&self) -> &Compositor { &self.compositor }
    pub fn surface(&self)    -> &Surface    { &self.surface }

    pub fn export(&self) -> Option<&ExportSession> {
        self.export.as_ref()
    }

    pub fn start_export(&mut self, editor: &mut Editor, config: ExportConfig) -> Result<(), ExportError> {
        self.check_size(editor, &config)?;
        self.export = Some(ExportSession::start(editor, config)?);
        Ok(())
    }

    pub fn start_export_with(
        &mut self,
        editor:   &mut Editor,
        config:   ExportConfig,
        recorder: Box<dyn MediaRecorder>,
    ) -> Result<(), ExportError> {
        self.check_size(editor, &config)?;
        self.export = Some(ExportSession::start_with(editor, config, recorder)?);
        Ok(())
    }

    fn check_size(&self, editor: &mut Editor, config: &ExportConfig) -> Result<(), ExportError> {
        let (w, h) = (self.compositor.width, self.compositor.height);
        if config.width == w && config.height == h {
            return Ok(());
        }
        let err = ExportError::InvalidConfig(format!(
            "export size {}x{} does not match canvas {w}x{h}", config.width, config.height,
        ));
        warn!(error = %err, "export refused");
        editor.notify(NoticeLevel::Warning, &err.user_message());
        Err(err)
    }

    pub fn frame(
        &mut self,
        editor:  &mut Editor,
        now:     f64,
        sources: &dyn FrameSource,
        text:    &dyn TextRasterizer,
    ) -> FrameOutcome {
        let event = editor.tick(now);

        // The clock has already rewound to 0; that frame is not part of the
        // export.
        if event == ClockEvent::ReachedEnd {
            if let Some(session) = self.export.take() {
                return match session.finish(editor) {
                    Ok(artifact) => FrameOutcome::Exported(artifact),
                    Err(e)       => FrameOutcome::ExportFailed(e.user_message()),
                };
            }
        }

        let clips = editor.render_clips();
        self.compositor.render(
            &mut self.surface,
            &clips,
            editor.tracks(),
            editor.state().current_time,
            sources,
            text,
        );
        drop(clips);

        if let Some(session) = self.export.as_mut() {
            if let Err(e) = session.capture(editor, &self.surface) {
                let err = session.fail(editor, e);
                self.export = None;
                return FrameOutcome::ExportFailed(err.user_message());
            }
        }
        FrameOutcome::Rendered
    }
}
