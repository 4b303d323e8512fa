use nbs_errors::FailureKind;
use serde::{Deserialize, Serialize};

use crate::EventLevel;

/// Task building and metadata probing events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProbeEvent {
    /// A repository descriptor produced no tasks
    RepositorySkipped { package: String, reason: String },

    /// Probe tasks were built for a package
    TasksPlanned {
        package: String,
        tasks: usize,
        ppa_lookups: usize,
    },

    /// Index could not be fetched after every attempt
    MetadataUnavailable {
        package: String,
        host: String,
        kind: FailureKind,
        attempts: u32,
        message: String,
    },

    /// Index was fetched but could not be decompressed
    DecompressFailed {
        package: String,
        url: String,
        message: String,
    },

    /// Index was read but does not list the package
    NoMetadata {
        package: String,
        source: String,
        message: String,
    },

    /// A probe worker ended without reporting
    WorkerFailed { package: String, message: String },

    /// Every probe for a package has finished
    Completed {
        package: String,
        probes: usize,
        hits: usize,
    },
}

impl ProbeEvent {
    #[must_use]
    pub fn package(&self) -> &str {
        match self {
            Self::RepositorySkipped { package, .. }
            | Self::TasksPlanned { package, .. }
            | Self::MetadataUnavailable { package, .. }
            | Self::DecompressFailed { package, .. }
            | Self::NoMetadata { package, .. }
            | Self::WorkerFailed { package, .. }
            | Self::Completed { package, .. } => package,
        }
    }

    #[must_use]
    pub fn log_level(&self) -> EventLevel {
        match self {
            Self::RepositorySkipped { .. } | Self::MetadataUnavailable { .. } => EventLevel::Warn,
            Self::DecompressFailed { .. } | Self::WorkerFailed { .. } => EventLevel::Error,
            Self::NoMetadata { .. } | Self::TasksPlanned { .. } | Self::Completed { .. } => {
                EventLevel::Debug
            }
        }
    }
}
