//! Agent Router - Command Line Entry Point
//!
//! Validates router configuration and replays routing scenarios offline.

use agent_router::config::RouterConfig;
use agent_router::observability::{init_logging_from_env, metrics};
use agent_router::simulation::Scenario;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;
use tracing::{error, info, warn};

/// Agent registry and stage routing tool
#[derive(Parser)]
#[command(name = "agent-router")]
#[command(about = "Agent registry and explainable stage routing")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", env = "AGENT_ROUTER_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Replay a routing scenario and print one JSON line per request
    Simulate {
        /// Scenario TOML file
        #[arg(value_name = "SCENARIO")]
        scenario: PathBuf,

        /// Print a metrics snapshot after the replay
        #[arg(long)]
        metrics: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize observability system
    init_logging_from_env(cli.verbose);

    info!("Starting agent-router v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = match load_configuration(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    // Execute command
    let result = match cli.command {
        Commands::Config { show } => handle_config_command(&config, show),
        Commands::Simulate {
            scenario,
            metrics: show_metrics,
        } => handle_simulate_command(&config, &scenario, show_metrics),
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

fn load_configuration(
    config_path: Option<&Path>,
) -> Result<RouterConfig, Box<dyn std::error::Error>> {
    match config_path {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            Ok(RouterConfig::load_from_file(path)?)
        }
        None => {
            // Try default locations
            let default_paths = ["router.toml", "config/router.toml"];

            for path_str in default_paths {
                let path = PathBuf::from(path_str);
                if path.exists() {
                    info!("Loading configuration from: {}", path.display());
                    return Ok(RouterConfig::load_from_file(&path)?);
                }
            }

            warn!("No configuration file found, using built-in defaults");
            Ok(RouterConfig::default())
        }
    }
}

fn handle_config_command(
    config: &RouterConfig,
    show: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;

    if show {
        println!("Current router configuration:");
        println!("{}", toml::to_string_pretty(config)?);
    }

    info!("Configuration validation complete");
    Ok(())
}

fn handle_simulate_command(
    config: &RouterConfig,
    scenario_path: &Path,
    show_metrics: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Loading scenario from: {}", scenario_path.display());
    let scenario = Scenario::load_from_file(scenario_path)?;
    let layer = config.build_layer()?;

    for outcome in scenario.replay(&layer)? {
        println!("{}", serde_json::to_string(&outcome)?);
    }

    if show_metrics {
        println!("{}", serde_json::to_string(&metrics().snapshot())?);
    }

    Ok(())
}
