//! Command line interface definition

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// nbs - resolve and download Debian packages across mirrors
#[derive(Parser)]
#[command(name = "nbs")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Resolve and download Debian packages across mirrors")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Write structured debug logs to the cache directory
    #[arg(long, global = true)]
    pub debug: bool,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress per-probe diagnostics and download progress
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Fetch every package listed in a build plan
    Fetch {
        /// Path to the build plan (TOML)
        plan: PathBuf,

        /// Cache namespace receiving the artifacts (overrides the plan)
        #[arg(long, value_name = "NAME")]
        cache_name: Option<String>,
    },

    /// Show ranked candidates for a package without downloading
    Resolve {
        /// Package name
        package: String,

        /// Distribution whose mirrors are probed
        #[arg(long, required_unless_present = "ppa")]
        distro: Option<String>,

        /// Release codename, e.g. bookworm
        #[arg(long)]
        release: String,

        /// Architecture, e.g. amd64
        #[arg(long)]
        arch: String,

        /// Components to probe (repeatable)
        #[arg(long = "component", value_name = "NAME", default_value = "main")]
        components: Vec<String>,

        /// Probe a personal package archive (owner/name) instead of a distro
        #[arg(long, conflicts_with = "distro")]
        ppa: Option<String>,
    },

    /// List known mirrors
    Mirrors {
        /// Only show this distribution
        distro: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_resolve_components_repeat() {
        let cli = Cli::try_parse_from([
            "nbs",
            "resolve",
            "foo",
            "--distro",
            "debian",
            "--release",
            "bookworm",
            "--arch",
            "amd64",
            "--component",
            "main",
            "--component",
            "contrib",
        ])
        .unwrap();

        let Commands::Resolve { components, .. } = cli.command else {
            panic!("expected resolve");
        };
        assert_eq!(components, vec!["main", "contrib"]);
    }

    #[test]
    fn test_resolve_needs_distro_or_ppa() {
        let result = Cli::try_parse_from([
            "nbs", "resolve", "foo", "--release", "noble", "--arch", "amd64",
        ]);
        assert!(result.is_err());

        let cli = Cli::try_parse_from([
            "nbs",
            "--quiet",
            "resolve",
            "foo",
            "--ppa",
            "nitrux/tools",
            "--release",
            "noble",
            "--arch",
            "amd64",
        ])
        .unwrap();
        assert!(cli.global.quiet);
    }
}
