// crates/neoncut-media/src/error.rs
//
// Export failures. Everything below the session boundary (recorder
// backends, image loading) reports `anyhow::Error` with context; the session
// folds those into `ExportError::Recorder` / `ExportError::Io` so the host
// matches on one closed set.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("an export is already running")]
    AlreadyExporting,

    #[error("nothing to export: the timeline is empty")]
    EmptyTimeline,

    #[error("recorder failed: {0:#}")]
    Recorder(anyhow::Error),

    #[error("invalid export settings: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExportError {
    /// Short text for the user-facing notice.
    pub fn user_message(&self) -> String {
        format!("Export failed: {self}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn display_already_exporting() {
        assert_eq!(ExportError::AlreadyExporting.to_string(), "an export is already running");
    }

    #[test]
    fn recorder_error_shows_context_chain() {
        let inner: anyhow::Result<()> = Err(anyhow::anyhow!("zlib stream ended early"));
        let err = ExportError::Recorder(inner.context("write APNG frame 12").unwrap_err());
        assert_eq!(
            err.to_string(),
            "recorder failed: write APNG frame 12: zlib stream ended early",
        );
    }

    #[test]
    fn io_converts_with_question_mark() {
        fn open() -> Result<(), ExportError> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"))?;
            Ok(())
        }
        assert!(matches!(open(), Err(ExportError::Io(_))));
    }

    #[test]
    fn user_message_prefixes() {
        let msg = ExportError::EmptyTimeline.user_message();
        assert!(msg.starts_with("Export failed: nothing to export"));
    }
}
