//! Output rendering and formatting

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, ContentArrangement, Table};
use console::style;
use nbs_types::{FetchedArtifact, ResolutionOutcome, ResolutionSummary};
use serde::Serialize;
use std::io;

/// Result of a fetch run
#[derive(Debug, Clone, Serialize)]
pub struct FetchReport {
    pub cache_name: String,
    pub summary: ResolutionSummary,
    pub artifacts: Vec<FetchedArtifact>,
}

/// Ranked candidates for one package; `None` when every descriptor was skipped
#[derive(Debug, Serialize)]
pub struct CandidateReport {
    pub package: String,
    pub outcome: Option<ResolutionOutcome>,
}

#[derive(Debug, Serialize)]
pub struct MirrorList {
    pub distro: String,
    pub mirrors: Vec<String>,
}

/// What a command produced
#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum CommandResult {
    Fetch(FetchReport),
    Candidates(CandidateReport),
    Mirrors(Vec<MirrorList>),
}

impl CommandResult {
    /// Whether the process should exit successfully
    pub fn is_success(&self) -> bool {
        match self {
            CommandResult::Fetch(report) => !report.summary.has_failures(),
            CommandResult::Candidates(_) | CommandResult::Mirrors(_) => true,
        }
    }
}

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    json_output: bool,
    colors_enabled: bool,
}

impl OutputRenderer {
    pub fn new(json_output: bool, colors_enabled: bool) -> Self {
        Self {
            json_output,
            colors_enabled,
        }
    }

    /// Render command result
    pub fn render_result(&self, result: &CommandResult) -> io::Result<()> {
        if self.json_output {
            let json = serde_json::to_string_pretty(result).map_err(io::Error::other)?;
            println!("{json}");
            return Ok(());
        }

        match result {
            CommandResult::Fetch(report) => self.render_fetch_report(report),
            CommandResult::Candidates(report) => self.render_candidates(report),
            CommandResult::Mirrors(lists) => self.render_mirrors(lists),
        }
        Ok(())
    }

    fn render_fetch_report(&self, report: &FetchReport) {
        let summary = &report.summary;
        println!();
        println!("{}", self.heading(&format!("Summary ({})", report.cache_name)));
        self.render_bucket("Success", &summary.success, Bucket::Success);
        self.render_bucket("Failed", &summary.failed, Bucket::Failed);
        self.render_bucket("Skipped", &summary.skipped, Bucket::Skipped);
        println!(
            "{} fetched, {} failed, {} skipped",
            summary.success.len(),
            summary.failed.len(),
            summary.skipped.len()
        );
    }

    fn render_bucket(&self, label: &str, packages: &[String], bucket: Bucket) {
        if packages.is_empty() {
            return;
        }
        let label = format!("{label} ({}):", packages.len());
        let label = if self.colors_enabled {
            match bucket {
                Bucket::Success => style(label).green().bold().to_string(),
                Bucket::Failed => style(label).red().bold().to_string(),
                Bucket::Skipped => style(label).yellow().bold().to_string(),
            }
        } else {
            label
        };
        println!("{label} {}", packages.join(", "));
    }

    fn render_candidates(&self, report: &CandidateReport) {
        let Some(outcome) = &report.outcome else {
            println!("No usable repository for {}.", report.package);
            return;
        };

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("#").add_attribute(Attribute::Bold),
            Cell::new("Version").add_attribute(Attribute::Bold),
            Cell::new("Source").add_attribute(Attribute::Bold),
            Cell::new("URL").add_attribute(Attribute::Bold),
        ]);
        for (rank, candidate) in outcome.candidates().iter().enumerate() {
            table.add_row(vec![
                Cell::new(rank + 1),
                Cell::new(&candidate.version_string),
                Cell::new(&candidate.source),
                Cell::new(&candidate.url),
            ]);
        }

        println!("{}", self.heading(&format!("Candidates for {}", report.package)));
        println!("{table}");
    }

    fn render_mirrors(&self, lists: &[MirrorList]) {
        if lists.is_empty() {
            println!("No mirrors configured.");
            return;
        }
        for list in lists {
            println!("{}", self.heading(&list.distro));
            for mirror in &list.mirrors {
                println!("  {mirror}");
            }
        }
    }

    fn heading(&self, text: &str) -> String {
        if self.colors_enabled {
            style(text).bold().to_string()
        } else {
            text.to_string()
        }
    }
}

#[derive(Clone, Copy)]
enum Bucket {
    Success,
    Failed,
    Skipped,
}
