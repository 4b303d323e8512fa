#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for nbs
//!
//! This crate provides the data shared by every stage of a resolution:
//! repository descriptors, probe tasks and results, Debian versions,
//! ranked candidates and the batch summary.

pub mod candidate;
pub mod probe;
pub mod repository;
pub mod summary;
pub mod version;

// Re-export commonly used types
pub use candidate::{Candidate, FetchedArtifact, ResolutionOutcome};
pub use probe::{IndexEntry, MetadataKey, ProbeReport, ProbeResult, ProbeTask};
pub use repository::RepositoryDescriptor;
pub use summary::{PackageStatus, ResolutionSummary};
pub use version::DebVersion;
