//! Per-package resolution: tasks, probes, selection, download

use nbs_config::Config;
use nbs_errors::{Error, ResolveError};
use nbs_events::{AppEvent, DownloadEvent, EventBuffer, EventEmitter, EventSender, ProbeEvent};
use nbs_index::MetadataCache;
use nbs_net::{NetClient, NetConfig, RetryPolicy};
use nbs_types::{
    FetchedArtifact, IndexEntry, ProbeTask, RepositoryDescriptor, ResolutionOutcome,
};
use std::path::{Path, PathBuf};

use crate::pool::probe_all;
use crate::ppa::ppa_tasks;
use crate::prober::{report_event, MetadataProber};
use crate::registry::MirrorRegistry;
use crate::retrieval::RetrievalEngine;
use crate::selector::select_candidates;
use crate::tasks::{build_tasks, TaskPlan};

/// Engine knobs taken from `Config`
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub workers: usize,
    pub mirrors_per_component: usize,
    pub ppa_base: String,
    pub quiet: bool,
    pub cache_dir: PathBuf,
}

impl From<&Config> for EngineSettings {
    fn from(config: &Config) -> Self {
        Self {
            workers: config.probe.workers,
            mirrors_per_component: config.probe.mirrors_per_component,
            ppa_base: config.probe.ppa_base.clone(),
            quiet: config.general.quiet,
            cache_dir: config.cache_dir(),
        }
    }
}

/// Resolves packages against repository descriptors and downloads them.
///
/// One engine owns the HTTP client and the metadata cache for a whole run,
/// so an index probed for one package is reused for the next.
#[derive(Debug, Clone)]
pub struct ResolutionEngine {
    registry: MirrorRegistry,
    prober: MetadataProber,
    retrieval: RetrievalEngine,
    settings: EngineSettings,
    event_sender: Option<EventSender>,
}

impl ResolutionEngine {
    /// Build an engine from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &Config) -> Result<Self, Error> {
        let client = NetClient::new(NetConfig::from(config))?;
        let registry = MirrorRegistry::with_overrides(&config.mirrors);
        Ok(Self::with_client(client, registry, config))
    }

    /// Build an engine around an existing client and registry
    #[must_use]
    pub fn with_client(client: NetClient, registry: MirrorRegistry, config: &Config) -> Self {
        let prober = MetadataProber::new(
            client.clone(),
            MetadataCache::new(),
            RetryPolicy::from(&config.probe),
        );
        Self {
            registry,
            prober,
            retrieval: RetrievalEngine::new(client, config.download.passes),
            settings: EngineSettings::from(config),
            event_sender: None,
        }
    }

    #[must_use]
    pub fn with_event_sender(mut self, sender: EventSender) -> Self {
        self.event_sender = Some(sender);
        self
    }

    #[must_use]
    pub fn registry(&self) -> &MirrorRegistry {
        &self.registry
    }

    #[must_use]
    pub fn cache(&self) -> &MetadataCache {
        self.prober.cache()
    }

    #[must_use]
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Directory receiving artifacts for a cache namespace
    #[must_use]
    pub fn debs_dir(&self, cache_name: &str) -> PathBuf {
        self.settings
            .cache_dir
            .join(cache_name)
            .join(nbs_config::constants::DEBS_DIR)
    }

    /// Expand descriptors into probe tasks for `package`
    #[must_use]
    pub fn plan_tasks(&self, package: &str, repos: &[RepositoryDescriptor]) -> TaskPlan {
        build_tasks(
            package,
            repos,
            &self.registry,
            self.settings.mirrors_per_component,
        )
    }

    /// Probe every applicable index and rank what was found.
    ///
    /// Returns `Ok(None)` when no descriptor produced a probe (all were
    /// skipped for configuration problems). Diagnostics are held until every
    /// probe has finished and then released grouped by kind.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::NoRepositories` for an empty descriptor list and
    /// `ResolveError::PackageNotFound` when probes ran but found nothing usable.
    pub async fn resolve(
        &self,
        package: &str,
        repos: &[RepositoryDescriptor],
        dest_dir: &Path,
    ) -> Result<Option<ResolutionOutcome>, Error> {
        if repos.is_empty() {
            return Err(ResolveError::NoRepositories {
                package: package.to_string(),
            }
            .into());
        }

        let mut buffer = EventBuffer::new();
        let plan = self.plan_tasks(package, repos);
        for diagnostic in plan.diagnostics {
            buffer.emit_probe(diagnostic);
        }

        let (mut hits, ppa_probes) = self.probe_ppas(package, repos, &buffer).await;
        let pool_probes = plan.tasks.len();
        let probes = pool_probes + ppa_probes;

        if probes == 0 {
            self.release(&mut buffer);
            return Ok(None);
        }

        buffer.emit_probe(ProbeEvent::TasksPlanned {
            package: package.to_string(),
            tasks: pool_probes,
            ppa_lookups: ppa_probes,
        });

        let reports = probe_all(
            &self.prober,
            plan.tasks,
            self.settings.workers,
            &buffer.sender(),
        )
        .await?;
        hits.extend(reports.into_iter().filter_map(|report| {
            let entry = report.result.entry().cloned()?;
            Some((report.task, entry))
        }));

        buffer.emit_probe(ProbeEvent::Completed {
            package: package.to_string(),
            probes,
            hits: hits.len(),
        });

        let destination = dest_dir.join(format!("{package}.deb"));
        let (outcome, rejected) = select_candidates(hits, &destination);
        for reject in rejected {
            buffer.emit_warning_with_context(
                format!(
                    "Ignoring {package} {} from {}: unparseable version",
                    reject.version, reject.source
                ),
                reject.reason,
            );
        }

        self.release(&mut buffer);

        if outcome.is_empty() {
            return Err(ResolveError::PackageNotFound {
                package: package.to_string(),
                probes,
            }
            .into());
        }
        Ok(Some(outcome))
    }

    /// Resolve `package` and download the best available candidate.
    ///
    /// Returns `Ok(None)` when the package was skipped (see [`Self::resolve`]).
    ///
    /// # Errors
    ///
    /// Returns an error if `dest_dir` cannot be created, resolution fails, or
    /// every candidate fails in every download pass.
    pub async fn fetch(
        &self,
        package: &str,
        repos: &[RepositoryDescriptor],
        dest_dir: &Path,
    ) -> Result<Option<FetchedArtifact>, Error> {
        tokio::fs::create_dir_all(dest_dir)
            .await
            .map_err(|e| Error::io_with_path(&e, dest_dir))?;

        let Some(outcome) = self.resolve(package, repos, dest_dir).await? else {
            return Ok(None);
        };

        let report = self.reporter();
        if let Some(best) = outcome.best() {
            report.emit_download(DownloadEvent::CandidateSelected {
                package: package.to_string(),
                version: best.version_string.clone(),
                source: best.source.clone(),
                url: best.url.clone(),
                candidates: outcome.len(),
            });
        }

        self.retrieval
            .retrieve(package, &outcome, &report)
            .await
            .map(Some)
    }

    /// Probe PPA descriptors one after another, before the pool runs
    async fn probe_ppas(
        &self,
        package: &str,
        repos: &[RepositoryDescriptor],
        buffer: &EventBuffer,
    ) -> (Vec<(ProbeTask, IndexEntry)>, usize) {
        let mut hits = Vec::new();
        let mut probes = 0;

        for repo in repos.iter().filter(|repo| repo.is_ppa()) {
            let tasks = match ppa_tasks(package, repo, &self.settings.ppa_base) {
                Ok(tasks) => tasks,
                Err(reason) => {
                    buffer.emit_probe(ProbeEvent::RepositorySkipped {
                        package: package.to_string(),
                        reason,
                    });
                    continue;
                }
            };

            for task in tasks {
                probes += 1;
                let report = self.prober.probe(&task).await;
                if let Some(entry) = report.result.entry().cloned() {
                    hits.push((report.task, entry));
                } else if let Some(event) = report_event(&report) {
                    buffer.emit_probe(event);
                }
            }
        }

        (hits, probes)
    }

    /// Flush held diagnostics, or drop them when quiet
    fn release(&self, buffer: &mut EventBuffer) {
        if self.settings.quiet {
            buffer.discard();
        } else {
            buffer.flush_into(self, diagnostic_rank);
        }
    }

    /// Sender for progress reports; silent when quiet
    fn reporter(&self) -> Option<EventSender> {
        if self.settings.quiet {
            None
        } else {
            self.event_sender.clone()
        }
    }
}

impl EventEmitter for ResolutionEngine {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

/// Flush order: configuration skips, fetch failures, decompression failures,
/// missing metadata, everything else
fn diagnostic_rank(event: &AppEvent) -> u8 {
    match event {
        AppEvent::Probe(ProbeEvent::RepositorySkipped { .. }) => 0,
        AppEvent::Probe(ProbeEvent::MetadataUnavailable { .. }) => 1,
        AppEvent::Probe(ProbeEvent::DecompressFailed { .. }) => 2,
        AppEvent::Probe(ProbeEvent::NoMetadata { .. }) => 3,
        _ => 4,
    }
}
