//! Batch resolution summary

use serde::{Deserialize, Serialize};

/// Final state of one requested package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageStatus {
    Success,
    Failed,
    Skipped,
}

/// Requested packages partitioned by outcome, in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionSummary {
    pub success: Vec<String>,
    pub failed: Vec<String>,
    pub skipped: Vec<String>,
}

impl ResolutionSummary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, package: impl Into<String>, status: PackageStatus) {
        let package = package.into();
        match status {
            PackageStatus::Success => self.success.push(package),
            PackageStatus::Failed => self.failed.push(package),
            PackageStatus::Skipped => self.skipped.push(package),
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.success.len() + self.failed.len() + self.skipped.len()
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}
