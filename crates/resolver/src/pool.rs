//! Bounded concurrent probing

use nbs_errors::Error;
use nbs_events::{EventEmitter, EventSender, ProbeEvent};
use nbs_types::{ProbeReport, ProbeTask};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::prober::{report_event, MetadataProber};

/// Run every task on at most `workers` concurrent probes.
///
/// Reports come back in completion order. The pool is drained completely
/// before returning; a worker that panics is reported on `diagnostics` and
/// does not affect the others. Each worker sends its own diagnostic to
/// `diagnostics` as soon as it finishes.
///
/// # Errors
///
/// Returns an error only if the worker semaphore is closed.
pub async fn probe_all(
    prober: &MetadataProber,
    tasks: Vec<ProbeTask>,
    workers: usize,
    diagnostics: &EventSender,
) -> Result<Vec<ProbeReport>, Error> {
    let semaphore = Arc::new(Semaphore::new(workers.max(1)));
    let mut set = JoinSet::new();
    let mut package = None;

    for task in tasks {
        package.get_or_insert_with(|| task.package_name.clone());
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| Error::internal("failed to acquire probe worker permit"))?;
        let prober = prober.clone();
        let tx = diagnostics.clone();

        set.spawn(async move {
            let _permit = permit; // Hold permit until the probe completes
            let report = prober.probe(&task).await;
            if let Some(event) = report_event(&report) {
                tx.emit_probe(event);
            }
            report
        });
    }

    let mut reports = Vec::new();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(report) => reports.push(report),
            Err(e) => diagnostics.emit_probe(ProbeEvent::WorkerFailed {
                package: package.clone().unwrap_or_default(),
                message: format!("probe worker ended unexpectedly: {e}"),
            }),
        }
    }

    Ok(reports)
}
