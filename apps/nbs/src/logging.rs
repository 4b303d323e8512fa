//! Structured logging integration for events
//!
//! Library crates never log directly; everything they report arrives here
//! as an `EventMessage` and is turned into a tracing record with structured
//! fields.

use nbs_events::{
    AppEvent, DownloadEvent, EventMessage, GeneralEvent, ProbeEvent, ResolutionEvent,
};
use std::path::Path;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Initialize tracing/logging
///
/// `--debug` writes JSON records to a timestamped file under `log_dir`;
/// otherwise only warnings reach stderr. JSON output mode keeps stderr
/// silent.
pub fn init_tracing(json_mode: bool, debug_enabled_flag: bool, log_dir: &Path) {
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;

    if debug_enabled {
        if let Err(e) = std::fs::create_dir_all(log_dir) {
            if !json_mode {
                eprintln!("Warning: Failed to create log directory: {e}");
            }
        }

        let log_file = log_dir.join(format!(
            "nbs-{}.log",
            chrono::Utc::now().format("%Y%m%d-%H%M%S")
        ));

        match std::fs::File::create(&log_file) {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(file)
                    .with_env_filter(
                        EnvFilter::try_from_default_env()
                            .unwrap_or_else(|_| EnvFilter::new("info,nbs=debug,nbs_resolver=debug")),
                    )
                    .init();

                if !json_mode {
                    eprintln!("Debug logging enabled: {}", log_file.display());
                }
                return;
            }
            Err(e) => {
                if !json_mode {
                    eprintln!("Warning: Failed to create log file: {e}");
                }
            }
        }
    }

    if json_mode {
        // Keep stdout clean for the JSON document
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("warn,nbs=warn")),
            )
            .init();
    }
}

/// Log an `AppEvent` with structured fields at its own level
pub fn log_event_with_tracing(message: &EventMessage) {
    let meta = &message.meta;
    let source = meta.source.as_str();

    match &message.event {
        AppEvent::Probe(probe) => match probe {
            ProbeEvent::RepositorySkipped { package, reason } => {
                warn!(source, event_id = %meta.event_id, package = %package, reason = %reason, "Repository skipped");
            }
            ProbeEvent::TasksPlanned {
                package,
                tasks,
                ppa_lookups,
            } => {
                debug!(source, event_id = %meta.event_id, package = %package, tasks, ppa_lookups, "Probe tasks planned");
            }
            ProbeEvent::MetadataUnavailable {
                package,
                host,
                kind,
                attempts,
                ..
            } => {
                warn!(
                    source,
                    event_id = %meta.event_id,
                    package = %package,
                    host = %host,
                    kind = %kind,
                    attempts,
                    "Metadata unavailable"
                );
            }
            ProbeEvent::DecompressFailed {
                package,
                url,
                message,
            } => {
                error!(source, event_id = %meta.event_id, package = %package, url = %url, message = %message, "Metadata decompression failed");
            }
            ProbeEvent::NoMetadata {
                package,
                source: label,
                ..
            } => {
                debug!(source, event_id = %meta.event_id, package = %package, index = %label, "No metadata");
            }
            ProbeEvent::WorkerFailed { package, message } => {
                error!(source, event_id = %meta.event_id, package = %package, message = %message, "Probe worker failed");
            }
            ProbeEvent::Completed {
                package,
                probes,
                hits,
            } => {
                debug!(source, event_id = %meta.event_id, package = %package, probes, hits, "Probing completed");
            }
        },

        AppEvent::Download(download) => match download {
            DownloadEvent::CandidateSelected {
                package,
                version,
                source: label,
                url,
                candidates,
            } => {
                info!(
                    source,
                    event_id = %meta.event_id,
                    package = %package,
                    version = %version,
                    from = %label,
                    url = %url,
                    candidates,
                    "Candidate selected"
                );
            }
            DownloadEvent::Started { package, url, pass } => {
                debug!(source, event_id = %meta.event_id, package = %package, url = %url, pass, "Download started");
            }
            DownloadEvent::AttemptFailed {
                package,
                url,
                pass,
                kind,
            } => {
                warn!(source, event_id = %meta.event_id, package = %package, url = %url, pass, kind = %kind, "Download attempt failed");
            }
            DownloadEvent::RetryPassStarted {
                package,
                candidates,
            } => {
                warn!(source, event_id = %meta.event_id, package = %package, candidates, "Retrying all candidates");
            }
            DownloadEvent::Completed {
                package,
                url,
                path,
                bytes,
            } => {
                info!(
                    source,
                    event_id = %meta.event_id,
                    package = %package,
                    url = %url,
                    path = %path.display(),
                    bytes,
                    "Download completed"
                );
            }
        },

        AppEvent::Resolution(resolution) => match resolution {
            ResolutionEvent::Started {
                package,
                repositories,
            } => {
                info!(source, event_id = %meta.event_id, package = %package, repositories, "Resolution started");
            }
            ResolutionEvent::Succeeded { package, path } => {
                info!(source, event_id = %meta.event_id, package = %package, path = %path.display(), "Package fetched");
            }
            ResolutionEvent::Skipped { package } => {
                warn!(source, event_id = %meta.event_id, package = %package, "Package skipped");
            }
            ResolutionEvent::Failed { package, failure } => {
                error!(
                    source,
                    event_id = %meta.event_id,
                    package = %package,
                    retryable = failure.retryable,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Package failed"
                );
            }
            ResolutionEvent::BatchCompleted {
                success,
                failed,
                skipped,
            } => {
                info!(source, event_id = %meta.event_id, success, failed, skipped, "Batch completed");
            }
        },

        AppEvent::General(general) => match general {
            GeneralEvent::Warning { message, context } => {
                warn!(source, event_id = %meta.event_id, correlation = ?meta.correlation_id, message = %message, context = ?context, "Warning");
            }
        },
    }
}
