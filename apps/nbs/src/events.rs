//! Event handling and user feedback

use console::{style, Term};
use nbs_events::{
    AppEvent, DownloadEvent, EventMessage, GeneralEvent, ProbeEvent, ResolutionEvent,
};

use crate::logging::log_event_with_tracing;

/// Turns engine events into log records and terminal lines.
///
/// Terminal output goes to stderr so stdout stays reserved for the final
/// result. In JSON mode nothing is printed.
pub struct EventHandler {
    term: Term,
    colors_enabled: bool,
    json_mode: bool,
    debug_enabled: bool,
}

impl EventHandler {
    pub fn new(colors_enabled: bool, json_mode: bool, debug_enabled: bool) -> Self {
        Self {
            term: Term::stderr(),
            colors_enabled,
            json_mode,
            debug_enabled,
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, message: EventMessage) {
        log_event_with_tracing(&message);
        if self.json_mode {
            return;
        }
        if let Some(line) = self.render(&message.event) {
            self.term.write_line(&line).unwrap_or(());
        }
    }

    /// Terminal line for an event, `None` when the event is log-only
    fn render(&self, event: &AppEvent) -> Option<String> {
        match event {
            AppEvent::Probe(probe) => self.render_probe(probe),
            AppEvent::Download(download) => self.render_download(download),
            AppEvent::Resolution(resolution) => self.render_resolution(resolution),
            AppEvent::General(general) => self.render_general(general),
        }
    }

    fn render_probe(&self, event: &ProbeEvent) -> Option<String> {
        match event {
            ProbeEvent::RepositorySkipped { reason, .. } => Some(self.warning(reason)),
            ProbeEvent::MetadataUnavailable { message, .. } => Some(self.warning(message)),
            ProbeEvent::DecompressFailed { message, .. }
            | ProbeEvent::WorkerFailed { message, .. } => Some(self.error(message)),
            ProbeEvent::NoMetadata { message, .. } => Some(self.dim(message)),
            ProbeEvent::TasksPlanned {
                package,
                tasks,
                ppa_lookups,
            } if self.debug_enabled => Some(self.dim(&format!(
                "Probing {tasks} mirror indexes and {ppa_lookups} PPA indexes for {package}"
            ))),
            ProbeEvent::Completed {
                package,
                probes,
                hits,
            } if self.debug_enabled => Some(self.dim(&format!(
                "{package}: {hits} of {probes} indexes list it"
            ))),
            ProbeEvent::TasksPlanned { .. } | ProbeEvent::Completed { .. } => None,
        }
    }

    fn render_download(&self, event: &DownloadEvent) -> Option<String> {
        match event {
            DownloadEvent::CandidateSelected {
                package,
                version,
                source,
                candidates,
                ..
            } => Some(format!(
                "Selected {} {} from {source} ({candidates} candidates)",
                self.bold(package),
                version
            )),
            DownloadEvent::Started { url, pass, .. } if self.debug_enabled => {
                Some(self.dim(&format!("Downloading {url} (pass {pass})")))
            }
            DownloadEvent::Started { .. } => None,
            DownloadEvent::AttemptFailed { url, kind, .. } => {
                Some(self.warning(&format!("Download from {url} failed: {kind}")))
            }
            DownloadEvent::RetryPassStarted {
                package,
                candidates,
            } => Some(self.warning(&format!(
                "Retrying {package} across {candidates} candidates"
            ))),
            DownloadEvent::Completed { path, bytes, .. } => Some(self.success(&format!(
                "Downloaded {} ({bytes} bytes)",
                path.display()
            ))),
        }
    }

    fn render_resolution(&self, event: &ResolutionEvent) -> Option<String> {
        match event {
            ResolutionEvent::Started { package, .. } => {
                Some(format!("Resolving {}", self.bold(package)))
            }
            ResolutionEvent::Skipped { package } => Some(self.warning(&format!(
                "Skipped {package}: no usable repository"
            ))),
            ResolutionEvent::Failed { failure, .. } => {
                let mut line = self.error(&failure.message);
                if let Some(hint) = &failure.hint {
                    line.push_str(&format!("\n  Hint: {hint}"));
                }
                Some(line)
            }
            ResolutionEvent::Succeeded { .. } | ResolutionEvent::BatchCompleted { .. } => None,
        }
    }

    fn render_general(&self, event: &GeneralEvent) -> Option<String> {
        match event {
            GeneralEvent::Warning { message, context } => Some(match context {
                Some(context) => self.warning(&format!("{message} ({context})")),
                None => self.warning(message),
            }),
        }
    }

    fn warning(&self, message: &str) -> String {
        if self.colors_enabled {
            format!("{} {message}", style("warning:").yellow().bold())
        } else {
            format!("warning: {message}")
        }
    }

    fn error(&self, message: &str) -> String {
        if self.colors_enabled {
            format!("{} {message}", style("error:").red().bold())
        } else {
            format!("error: {message}")
        }
    }

    fn success(&self, message: &str) -> String {
        if self.colors_enabled {
            style(message).green().to_string()
        } else {
            message.to_string()
        }
    }

    fn dim(&self, message: &str) -> String {
        if self.colors_enabled {
            style(message).dim().to_string()
        } else {
            message.to_string()
        }
    }

    fn bold(&self, message: &str) -> String {
        if self.colors_enabled {
            style(message).bold().to_string()
        } else {
            message.to_string()
        }
    }
}
