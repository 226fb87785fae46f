//! In-memory diagnostic log carried by the session.
//!
//! Reportable errors are shown to the user AND recorded here with a
//! timestamp; transient placeholder messages are shown but not recorded.

use crate::ui::messages;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct DiagEvent {
    pub at: DateTime<Utc>,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct DiagnosticLog {
    events: Vec<DiagEvent>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show an error to the user and record it.
    pub fn report(&mut self, message: impl Into<String>) {
        let message = message.into();
        messages::error(&message);
        self.events.push(DiagEvent {
            at: Utc::now(),
            message,
        });
    }

    /// Show a transient status line without recording it.
    pub fn notice(&self, message: impl AsRef<str>) {
        messages::warning(message.as_ref());
    }

    pub fn events(&self) -> &[DiagEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
