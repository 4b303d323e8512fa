//! Sequential artifact download over ranked candidates

use nbs_errors::{DownloadAttempt, Error, ResolveError};
use nbs_events::{DownloadEvent, EventEmitter};
use nbs_net::{download_to_path, failure_kind, NetClient};
use nbs_types::{FetchedArtifact, ResolutionOutcome};

/// Downloads the first candidate that succeeds, one at a time.
#[derive(Debug, Clone)]
pub struct RetrievalEngine {
    client: NetClient,
    passes: u8,
}

impl RetrievalEngine {
    /// `passes` full sweeps over the candidate list; at least one
    #[must_use]
    pub fn new(client: NetClient, passes: u8) -> Self {
        Self {
            client,
            passes: passes.max(1),
        }
    }

    /// Try candidates in order, sweeping the whole list again after a
    /// complete miss until the pass budget is spent.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::AllMirrorsFailed` listing every attempt when no
    /// candidate could be downloaded in any pass.
    pub async fn retrieve<E: EventEmitter + ?Sized>(
        &self,
        package: &str,
        outcome: &ResolutionOutcome,
        report: &E,
    ) -> Result<FetchedArtifact, Error> {
        let mut attempts = Vec::new();

        for pass in 1..=self.passes {
            if pass > 1 {
                report.emit_download(DownloadEvent::RetryPassStarted {
                    package: package.to_string(),
                    candidates: outcome.len(),
                });
            }

            for candidate in outcome.candidates() {
                report.emit_download(DownloadEvent::Started {
                    package: package.to_string(),
                    url: candidate.url.clone(),
                    pass,
                });

                match download_to_path(&self.client, &candidate.url, &candidate.destination).await
                {
                    Ok(size) => {
                        report.emit_download(DownloadEvent::Completed {
                            package: package.to_string(),
                            url: candidate.url.clone(),
                            path: candidate.destination.clone(),
                            bytes: size,
                        });
                        return Ok(FetchedArtifact {
                            package: package.to_string(),
                            path: candidate.destination.clone(),
                            version: candidate.version_string.clone(),
                            url: candidate.url.clone(),
                            source: candidate.source.clone(),
                            size,
                            pass,
                        });
                    }
                    Err(error) => {
                        let kind = failure_kind(&error);
                        report.emit_download(DownloadEvent::AttemptFailed {
                            package: package.to_string(),
                            url: candidate.url.clone(),
                            pass,
                            kind,
                        });
                        attempts.push(DownloadAttempt {
                            url: candidate.url.clone(),
                            pass,
                            kind,
                        });
                    }
                }
            }
        }

        Err(ResolveError::AllMirrorsFailed {
            package: package.to_string(),
            attempts,
        }
        .into())
    }
}
