// crates/neoncut-core/src/notify.rs
//
// User-facing notices (export failed, nothing to export, …).
//
// The editor owns a `Box<dyn Notifier>` handed in by the host. Nothing in
// the core reaches for a global alert. Hosts that only want logs use
// `TracingNotifier`; tests use `MemoryNotifier` and inspect what was sent.

use std::sync::{Arc, Mutex};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level:   NoticeLevel,
    pub message: String,
}

pub trait Notifier: Send {
    fn notify(&mut self, level: NoticeLevel, message: &str);
}

/// Routes notices into the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&mut self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Info    => tracing::info!(notice = message),
            NoticeLevel::Warning => tracing::warn!(notice = message),
            NoticeLevel::Error   => tracing::error!(notice = message),
        }
    }
}

/// Keeps every notice in a shared list. Clone the notifier before boxing it
/// to keep a handle for reading.
#[derive(Clone, Debug, Default)]
pub struct MemoryNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices.lock().ok().and_then(|v| v.last().cloned())
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&mut self, level: NoticeLevel, message: &str) {
        if let Ok(mut v) = self.notices.lock() {
            v.push(Notice { level, message: message.to_string() });
        }
    }
}
