//! Download candidates and the ranked resolution outcome

use crate::DebVersion;
use serde::Serialize;
use std::path::PathBuf;

/// One concrete place a package can be downloaded from.
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub version: DebVersion,
    pub version_string: String,
    pub url: String,
    pub destination: PathBuf,
    /// Mirror and component the candidate came from, e.g. `https://m [main]`
    pub source: String,
}

/// Candidates ranked newest version first.
///
/// Built once by the selector and only read afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionOutcome {
    candidates: Vec<Candidate>,
}

impl ResolutionOutcome {
    #[must_use]
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }

    #[must_use]
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// The candidate that will be tried first
    #[must_use]
    pub fn best(&self) -> Option<&Candidate> {
        self.candidates.first()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// A successfully downloaded artifact, ready for extraction.
#[derive(Debug, Clone, Serialize)]
pub struct FetchedArtifact {
    pub package: String,
    pub path: PathBuf,
    pub version: String,
    pub url: String,
    pub source: String,
    pub size: u64,
    /// 1 if the primary pass succeeded, 2 for the retry pass
    pub pass: u8,
}
