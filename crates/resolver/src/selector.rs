//! Ranking of probe hits into an ordered candidate list

use nbs_types::{Candidate, DebVersion, IndexEntry, ProbeTask, ResolutionOutcome};
use rand::seq::SliceRandom;
use std::collections::BTreeMap;
use std::path::Path;

/// A candidate that could not be built from its index entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected {
    pub source: String,
    pub version: String,
    pub reason: String,
}

/// Download URL for an index entry found on `mirror`
#[must_use]
pub fn artifact_url(mirror: &str, filename: &str) -> String {
    format!(
        "{}/{}",
        mirror.trim_end_matches('/'),
        filename.trim_start_matches('/')
    )
}

/// Order hits newest version first, shuffling mirrors within each version.
///
/// Arrival order of `hits` does not matter. Every candidate targets
/// `destination`. Entries whose version does not parse are returned as
/// rejections instead of failing the whole selection.
pub fn select_candidates<I>(hits: I, destination: &Path) -> (ResolutionOutcome, Vec<Rejected>)
where
    I: IntoIterator<Item = (ProbeTask, IndexEntry)>,
{
    let mut groups: BTreeMap<DebVersion, Vec<Candidate>> = BTreeMap::new();
    let mut rejected = Vec::new();

    for (task, entry) in hits {
        let source = task.source_label();
        match DebVersion::parse(&entry.version) {
            Ok(version) => groups.entry(version.clone()).or_default().push(Candidate {
                version,
                version_string: entry.version,
                url: artifact_url(&task.mirror_url, &entry.filename),
                destination: destination.to_path_buf(),
                source,
            }),
            Err(e) => rejected.push(Rejected {
                source,
                version: entry.version,
                reason: e.to_string(),
            }),
        }
    }

    let mut rng = rand::rng();
    let mut ordered = Vec::new();
    for (_, mut group) in groups.into_iter().rev() {
        group.shuffle(&mut rng);
        ordered.extend(group);
    }

    (ResolutionOutcome::new(ordered), rejected)
}
