use nbs_errors::FailureKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::EventLevel;

/// Candidate selection and artifact download events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DownloadEvent {
    /// Best candidate chosen, downloading is about to start
    CandidateSelected {
        package: String,
        version: String,
        source: String,
        url: String,
        candidates: usize,
    },

    /// A single download attempt started
    Started {
        package: String,
        url: String,
        pass: u8,
    },

    /// A download attempt failed; the next candidate will be tried
    AttemptFailed {
        package: String,
        url: String,
        pass: u8,
        kind: FailureKind,
    },

    /// Primary pass exhausted, starting over with the same list
    RetryPassStarted { package: String, candidates: usize },

    /// Artifact written to disk
    Completed {
        package: String,
        url: String,
        path: PathBuf,
        bytes: u64,
    },
}

impl DownloadEvent {
    #[must_use]
    pub fn package(&self) -> &str {
        match self {
            Self::CandidateSelected { package, .. }
            | Self::Started { package, .. }
            | Self::AttemptFailed { package, .. }
            | Self::RetryPassStarted { package, .. }
            | Self::Completed { package, .. } => package,
        }
    }

    #[must_use]
    pub fn log_level(&self) -> EventLevel {
        match self {
            Self::CandidateSelected { .. } | Self::Completed { .. } => EventLevel::Info,
            Self::Started { .. } => EventLevel::Debug,
            Self::AttemptFailed { .. } | Self::RetryPassStarted { .. } => EventLevel::Warn,
        }
    }
}
