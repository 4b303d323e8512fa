//! Batch resolution over a package list

use async_trait::async_trait;
use nbs_errors::{Error, ResolveError};
use nbs_events::{EventEmitter, FailureContext, ResolutionEvent};
use nbs_types::{FetchedArtifact, PackageStatus, RepositoryDescriptor, ResolutionSummary};

use crate::engine::ResolutionEngine;

/// Receives each downloaded artifact, e.g. to unpack it.
#[async_trait]
pub trait ArtifactSink: Send {
    /// # Errors
    ///
    /// Any error marks the package as failed.
    async fn accept(&mut self, artifact: &FetchedArtifact) -> Result<(), Error>;
}

/// Collects artifacts without touching them
#[async_trait]
impl ArtifactSink for Vec<FetchedArtifact> {
    async fn accept(&mut self, artifact: &FetchedArtifact) -> Result<(), Error> {
        self.push(artifact.clone());
        Ok(())
    }
}

impl ResolutionEngine {
    /// Fetch every package in order into the `cache_name` namespace.
    ///
    /// One package failing never stops the batch. Each input package lands in
    /// exactly one summary bucket.
    pub async fn fetch_packages<S>(
        &self,
        packages: &[String],
        repos: &[RepositoryDescriptor],
        cache_name: &str,
        sink: &mut S,
    ) -> ResolutionSummary
    where
        S: ArtifactSink + ?Sized,
    {
        let dest_dir = self.debs_dir(cache_name);
        let mut summary = ResolutionSummary::new();

        for package in packages {
            self.emit_resolution(ResolutionEvent::Started {
                package: package.clone(),
                repositories: repos.len(),
            });

            let status = match self.fetch(package, repos, &dest_dir).await {
                Ok(Some(artifact)) => match sink.accept(&artifact).await {
                    Ok(()) => {
                        self.emit_resolution(ResolutionEvent::Succeeded {
                            package: package.clone(),
                            path: artifact.path.clone(),
                        });
                        PackageStatus::Success
                    }
                    Err(e) => {
                        let error: Error = ResolveError::SinkFailed {
                            package: package.clone(),
                            message: e.to_string(),
                        }
                        .into();
                        self.report_failure(package, &error);
                        PackageStatus::Failed
                    }
                },
                Ok(None) => {
                    self.emit_resolution(ResolutionEvent::Skipped {
                        package: package.clone(),
                    });
                    PackageStatus::Skipped
                }
                Err(e) => {
                    self.report_failure(package, &e);
                    PackageStatus::Failed
                }
            };
            summary.record(package.clone(), status);
        }

        self.emit_resolution(ResolutionEvent::BatchCompleted {
            success: summary.success.len(),
            failed: summary.failed.len(),
            skipped: summary.skipped.len(),
        });

        summary
    }

    fn report_failure(&self, package: &str, error: &Error) {
        self.emit_resolution(ResolutionEvent::Failed {
            package: package.to_string(),
            failure: FailureContext::from_error(error),
        });
    }
}
