use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::FailureContext;
use crate::EventLevel;

/// Package-level lifecycle events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ResolutionEvent {
    /// Resolution of one package started
    Started {
        package: String,
        repositories: usize,
    },

    /// Package downloaded and handed off
    Succeeded { package: String, path: PathBuf },

    /// No repository applied to the package
    Skipped { package: String },

    /// Package resolution failed
    Failed {
        package: String,
        failure: FailureContext,
    },

    /// Whole package list processed
    BatchCompleted {
        success: usize,
        failed: usize,
        skipped: usize,
    },
}

impl ResolutionEvent {
    #[must_use]
    pub fn package(&self) -> Option<&str> {
        match self {
            Self::Started { package, .. }
            | Self::Succeeded { package, .. }
            | Self::Skipped { package }
            | Self::Failed { package, .. } => Some(package),
            Self::BatchCompleted { .. } => None,
        }
    }

    #[must_use]
    pub fn log_level(&self) -> EventLevel {
        match self {
            Self::Started { .. } | Self::Succeeded { .. } | Self::BatchCompleted { .. } => {
                EventLevel::Info
            }
            Self::Skipped { .. } => EventLevel::Warn,
            Self::Failed { .. } => EventLevel::Error,
        }
    }
}
