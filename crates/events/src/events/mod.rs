use serde::{Deserialize, Serialize};

use crate::{EventLevel, EventSource};
use nbs_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self::new(
            error.user_code(),
            error.user_message().into_owned(),
            error.user_hint(),
            error.is_retryable(),
        )
    }
}

pub mod download;
pub mod general;
pub mod probe;
pub mod resolution;

pub use download::*;
pub use general::*;
pub use probe::*;
pub use resolution::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// Warnings not tied to a stage
    General(GeneralEvent),

    /// Task building and metadata probing
    Probe(ProbeEvent),

    /// Candidate selection and artifact downloads
    Download(DownloadEvent),

    /// Package-level lifecycle
    Resolution(ResolutionEvent),
}

impl AppEvent {
    /// Identify the source domain for this event.
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::GENERAL,
            Self::Probe(_) => EventSource::PROBE,
            Self::Download(_) => EventSource::DOWNLOAD,
            Self::Resolution(_) => EventSource::RESOLUTION,
        }
    }

    /// Default severity for this event.
    #[must_use]
    pub fn log_level(&self) -> EventLevel {
        match self {
            Self::General(event) => event.log_level(),
            Self::Probe(event) => event.log_level(),
            Self::Download(event) => event.log_level(),
            Self::Resolution(event) => event.log_level(),
        }
    }

    /// Package the event concerns, when there is one.
    #[must_use]
    pub fn package(&self) -> Option<&str> {
        match self {
            Self::General(_) => None,
            Self::Probe(event) => Some(event.package()),
            Self::Download(event) => Some(event.package()),
            Self::Resolution(event) => event.package(),
        }
    }
}
