//! nbs - resolve and download Debian packages across mirrors
//!
//! The CLI loads configuration, builds a `ResolutionEngine` and renders what
//! the engine reports while a command runs.

mod cli;
mod display;
mod error;
mod events;
mod logging;

use crate::cli::{Cli, Commands, GlobalArgs};
use crate::display::{CandidateReport, CommandResult, FetchReport, MirrorList, OutputRenderer};
use crate::error::CliError;
use crate::events::EventHandler;
use clap::Parser;
use nbs_config::constants::LOGS_DIR;
use nbs_config::{BuildPlan, Config};
use nbs_events::EventReceiver;
use nbs_resolver::{MirrorRegistry, ResolutionEngine};
use nbs_types::{FetchedArtifact, RepositoryDescriptor};
use std::process;
use tokio::select;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    let config = match load_config(&cli.global).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    logging::init_tracing(
        json_mode,
        cli.global.debug,
        &config.cache_dir().join(LOGS_DIR),
    );

    match run(cli, config).await {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            error!("Application error: {}", e);
            if !json_mode {
                eprintln!("Error: {e}");
            }
            process::exit(1);
        }
    }
}

/// Load configuration with precedence file < environment < CLI flags
async fn load_config(global: &GlobalArgs) -> Result<Config, CliError> {
    let mut config = Config::load_or_default(global.config.as_deref()).await?;
    config.merge_env()?;
    if global.quiet {
        config.general.quiet = true;
    }
    Ok(config)
}

/// Main application logic; `Ok(false)` when any package failed
async fn run(cli: Cli, config: Config) -> Result<bool, CliError> {
    info!("Starting nbs v{}", env!("CARGO_PKG_VERSION"));

    let colors_enabled =
        !cli.global.json && console::Term::stderr().features().colors_supported();
    let renderer = OutputRenderer::new(cli.global.json, colors_enabled);

    let result = if let Commands::Mirrors { distro } = &cli.command {
        list_mirrors(
            &MirrorRegistry::with_overrides(&config.mirrors),
            distro.as_deref(),
        )
    } else {
        let (event_sender, event_receiver) = nbs_events::channel();
        let engine = ResolutionEngine::new(&config)?.with_event_sender(event_sender);
        let mut event_handler =
            EventHandler::new(colors_enabled, cli.global.json, cli.global.debug);

        execute_command_with_events(cli.command, &engine, event_receiver, &mut event_handler)
            .await?
    };

    renderer.render_result(&result)?;
    info!("Command completed");
    Ok(result.is_success())
}

/// Execute command with concurrent event handling
async fn execute_command_with_events(
    command: Commands,
    engine: &ResolutionEngine,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<CommandResult, CliError> {
    let mut command_future = Box::pin(execute_command(command, engine));

    loop {
        select! {
            result = &mut command_future => {
                // Drain any remaining events
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(event);
                }
                return result;
            }

            event = event_receiver.recv() => {
                if let Some(event) = event {
                    event_handler.handle_event(event);
                }
            }
        }
    }
}

/// Execute the specified command
async fn execute_command(
    command: Commands,
    engine: &ResolutionEngine,
) -> Result<CommandResult, CliError> {
    match command {
        Commands::Fetch { plan, cache_name } => {
            let plan = BuildPlan::load_from_file(&plan).await?;
            let cache_name = cache_name.unwrap_or_else(|| plan.cache_name().to_string());

            let mut artifacts: Vec<FetchedArtifact> = Vec::new();
            let summary = engine
                .fetch_packages(
                    &plan.packages,
                    &plan.repositories,
                    &cache_name,
                    &mut artifacts,
                )
                .await;

            Ok(CommandResult::Fetch(FetchReport {
                cache_name,
                summary,
                artifacts,
            }))
        }

        Commands::Resolve {
            package,
            distro,
            release,
            arch,
            components,
            ppa,
        } => {
            let repo = match ppa {
                Some(id) => RepositoryDescriptor::ppa(id, release, arch),
                None => RepositoryDescriptor::new(distro.unwrap_or_default(), release, arch),
            }
            .with_components(components);

            let dest_dir = engine.debs_dir(nbs_config::constants::DEFAULT_CACHE_NAME);
            let outcome = engine.resolve(&package, &[repo], &dest_dir).await?;
            Ok(CommandResult::Candidates(CandidateReport { package, outcome }))
        }

        Commands::Mirrors { distro } => Ok(list_mirrors(engine.registry(), distro.as_deref())),
    }
}

/// Registry contents, optionally narrowed to one distribution
fn list_mirrors(registry: &MirrorRegistry, distro: Option<&str>) -> CommandResult {
    let lists = registry
        .distros()
        .filter(|(name, _)| distro.is_none_or(|wanted| name.eq_ignore_ascii_case(wanted)))
        .map(|(name, mirrors)| MirrorList {
            distro: name.to_string(),
            mirrors: mirrors.to_vec(),
        })
        .collect();
    CommandResult::Mirrors(lists)
}
