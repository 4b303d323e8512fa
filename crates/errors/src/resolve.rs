//! Package resolution error types
//!
//! These are the package-level exhaustion failures. Everything below this
//! level (single probes, single download attempts) is absorbed into
//! diagnostics and never surfaces as an `Err`.

use std::borrow::Cow;
use std::fmt;

use crate::{FailureKind, UserFacingError};
use thiserror::Error;

/// One failed download attempt, kept for the final failure report.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DownloadAttempt {
    pub url: String,
    /// 1 for the primary pass, 2 for the retry pass.
    pub pass: u8,
    pub kind: FailureKind,
}

impl fmt::Display for DownloadAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pass > 1 {
            write!(f, "{} (retry): {}", self.url, self.kind)
        } else {
            write!(f, "{}: {}", self.url, self.kind)
        }
    }
}

fn render_attempts(attempts: &[DownloadAttempt]) -> String {
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum ResolveError {
    #[error("no valid repositories provided for {package}")]
    NoRepositories { package: String },

    #[error("unable to find '{package}' in any repository after probing {probes} mirror/component pairs")]
    PackageNotFound { package: String, probes: usize },

    #[error("all mirrors failed to download {package}: {}", render_attempts(.attempts))]
    AllMirrorsFailed {
        package: String,
        attempts: Vec<DownloadAttempt>,
    },

    #[error("failed to hand off {package}: {message}")]
    SinkFailed { package: String, message: String },
}

impl UserFacingError for ResolveError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NoRepositories { .. } => Some("Declare at least one repository in the build plan."),
            Self::PackageNotFound { .. } => {
                Some("Check the package name and that the release/component actually ship it.")
            }
            Self::AllMirrorsFailed { .. } => Some("Mirrors may be temporarily unavailable; retry later."),
            Self::SinkFailed { .. } => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::AllMirrorsFailed { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::NoRepositories { .. } => "resolve.no_repositories",
            Self::PackageNotFound { .. } => "resolve.package_not_found",
            Self::AllMirrorsFailed { .. } => "resolve.all_mirrors_failed",
            Self::SinkFailed { .. } => "resolve.sink_failed",
        };
        Some(code)
    }
}
