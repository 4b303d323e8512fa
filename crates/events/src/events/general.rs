use serde::{Deserialize, Serialize};

use crate::EventLevel;

/// Events not tied to a single pipeline stage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeneralEvent {
    /// Warning message with optional context
    Warning {
        message: String,
        context: Option<String>,
    },
}

impl GeneralEvent {
    pub fn warning_with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Warning {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    #[must_use]
    pub fn log_level(&self) -> EventLevel {
        match self {
            Self::Warning { .. } => EventLevel::Warn,
        }
    }
}
