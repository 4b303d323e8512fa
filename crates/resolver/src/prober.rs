//! Metadata probing: fetch, decode and scan one index

use nbs_errors::{Error, IndexError};
use nbs_events::ProbeEvent;
use nbs_index::{decode_index, find_package, MetadataCache};
use nbs_net::{
    failure_kind, fetch_bytes_streamed, is_network_error, url_host, NetClient, RetryPolicy,
};
use nbs_types::{ProbeReport, ProbeResult, ProbeTask};
use std::sync::Arc;

/// Probes a single task against its mirror, consulting the shared cache.
///
/// Clones share the HTTP pool and the cache, so one prober can be handed to
/// every worker.
#[derive(Debug, Clone)]
pub struct MetadataProber {
    client: NetClient,
    cache: MetadataCache,
    retry: RetryPolicy,
}

impl MetadataProber {
    #[must_use]
    pub fn new(client: NetClient, cache: MetadataCache, retry: RetryPolicy) -> Self {
        Self {
            client,
            cache,
            retry,
        }
    }

    #[must_use]
    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }

    /// Probe one task. Expected failures are folded into the report.
    ///
    /// Network failures are retried up to the policy's attempt budget with a
    /// jittered pause in between; decompression failures are reported at once
    /// and leave the cache untouched.
    pub async fn probe(&self, task: &ProbeTask) -> ProbeReport {
        let url = task.index_url();
        let host = url_host(&url);

        let outcome = self
            .retry
            .run(|_| self.load_lines(task, &url), is_network_error)
            .await;

        let result = match outcome.result {
            Ok(lines) => match find_package(&lines[..], &task.package_name) {
                Some(entry) => ProbeResult::Found(entry),
                None => ProbeResult::NotFound,
            },
            Err(Error::Index(IndexError::Decompress { message, .. })) => {
                ProbeResult::DecompressFailed { message }
            }
            Err(error) => ProbeResult::Failed {
                kind: failure_kind(&error),
                attempts: outcome.attempts,
            },
        };

        ProbeReport {
            task: task.clone(),
            result,
            host,
        }
    }

    async fn load_lines(&self, task: &ProbeTask, url: &str) -> Result<Arc<[String]>, Error> {
        let key = task.cache_key();
        if let Some(lines) = self.cache.get(&key) {
            return Ok(lines);
        }

        let body = fetch_bytes_streamed(&self.client, url).await?;
        let url_owned = url.to_string();
        let lines = tokio::task::spawn_blocking(move || decode_index(&body, &url_owned))
            .await
            .map_err(|e| Error::internal(format!("index decode task failed: {e}")))??;

        Ok(self.cache.insert(key, lines))
    }
}

/// Diagnostic event for a finished probe, `None` for hits
#[must_use]
pub fn report_event(report: &ProbeReport) -> Option<ProbeEvent> {
    let message = report.status_message()?;
    let package = report.task.package_name.clone();
    let event = match &report.result {
        ProbeResult::Found(_) => return None,
        ProbeResult::NotFound => ProbeEvent::NoMetadata {
            package,
            source: report.task.source_label(),
            message,
        },
        ProbeResult::DecompressFailed { .. } => ProbeEvent::DecompressFailed {
            package,
            url: report.task.index_url(),
            message,
        },
        ProbeResult::Failed { kind, attempts } => ProbeEvent::MetadataUnavailable {
            package,
            host: report.host.clone(),
            kind: *kind,
            attempts: *attempts,
            message,
        },
    };
    Some(event)
}
