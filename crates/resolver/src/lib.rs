#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Mirror resolution and package retrieval for nbs
//!
//! For each requested package this crate expands repository descriptors
//! into probe tasks, reads the matching `Packages.gz` indexes concurrently,
//! ranks the hits by Debian version and downloads the best candidate,
//! falling back to the others in order.
//!
//! Flow: [`build_tasks`] → [`MetadataProber`] (bounded pool) →
//! [`select_candidates`] → [`RetrievalEngine`], tied together by
//! [`ResolutionEngine`].

mod engine;
mod orchestrator;
mod pool;
mod ppa;
mod prober;
mod registry;
mod retrieval;
mod selector;
mod tasks;

pub use engine::{EngineSettings, ResolutionEngine};
pub use orchestrator::ArtifactSink;
pub use pool::probe_all;
pub use ppa::{ppa_root, ppa_tasks};
pub use prober::{report_event, MetadataProber};
pub use registry::MirrorRegistry;
pub use retrieval::RetrievalEngine;
pub use selector::{artifact_url, select_candidates, Rejected};
pub use tasks::{build_tasks, TaskPlan};
