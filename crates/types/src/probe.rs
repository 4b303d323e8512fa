//! Probe tasks and their results

use nbs_errors::FailureKind;
use serde::{Deserialize, Serialize};

/// One unit of concurrent work: read one mirror's index for one package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProbeTask {
    pub mirror_url: String,
    pub release: String,
    pub arch: String,
    pub package_name: String,
    pub component: String,
}

impl ProbeTask {
    /// Key under which this task's index is cached
    #[must_use]
    pub fn cache_key(&self) -> MetadataKey {
        MetadataKey {
            mirror_url: self.mirror_url.clone(),
            release: self.release.clone(),
            arch: self.arch.clone(),
            component: self.component.clone(),
        }
    }

    /// `Packages.gz` location for this task
    #[must_use]
    pub fn index_url(&self) -> String {
        format!(
            "{}/dists/{}/{}/binary-{}/Packages.gz",
            self.mirror_url.trim_end_matches('/'),
            self.release,
            self.component,
            self.arch
        )
    }

    /// Human label naming mirror and component, e.g. `https://deb.example [main]`
    #[must_use]
    pub fn source_label(&self) -> String {
        format!("{} [{}]", self.mirror_url, self.component)
    }
}

/// Identity of one index: `(mirror, release, arch, component)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MetadataKey {
    pub mirror_url: String,
    pub release: String,
    pub arch: String,
    pub component: String,
}

/// The fields an index record contributes to a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Artifact path relative to the mirror root
    pub filename: String,
    pub version: String,
}

/// Outcome of probing one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProbeResult {
    Found(IndexEntry),
    NotFound,
    /// The index could not be decompressed; never retried
    DecompressFailed { message: String },
    /// Network failure after all attempts
    Failed { kind: FailureKind, attempts: u32 },
}

impl ProbeResult {
    #[must_use]
    pub fn entry(&self) -> Option<&IndexEntry> {
        match self {
            Self::Found(entry) => Some(entry),
            _ => None,
        }
    }
}

/// A probe result together with the task that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeReport {
    pub task: ProbeTask,
    pub result: ProbeResult,
    /// Index host, used when rendering failures
    pub host: String,
}

impl ProbeReport {
    /// Human-readable status line; `None` for successful probes.
    #[must_use]
    pub fn status_message(&self) -> Option<String> {
        let task = &self.task;
        match &self.result {
            ProbeResult::Found(_) => None,
            ProbeResult::NotFound => Some(format!(
                "No metadata for: {} from: {}",
                task.package_name,
                task.source_label()
            )),
            ProbeResult::DecompressFailed { message } => Some(format!(
                "Failed to decompress metadata from {}: {message}",
                task.index_url()
            )),
            ProbeResult::Failed { kind, attempts } => Some(format!(
                "Unable to fetch metadata from: {}: {kind} (after {attempts} attempts)",
                self.host
            )),
        }
    }
}
