//! capgate CLI - Main entry point

mod check;

use capgate_foundation::{CapgateConfig, ExecutableLocator, PathLocator};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// capgate - capability-gated plugin function registry
#[derive(Parser, Debug)]
#[command(name = "capgate")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Config file (default: global + project config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a plugin manifest, run the enforcement pass and print the dispatch table
    Check {
        /// Manifest JSON file
        manifest: PathBuf,

        /// Print the enforcement report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check whether an executable can be located
    Which {
        /// Executable name
        name: String,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = match &args.config {
        Some(path) => CapgateConfig::load_from(path)?,
        None => CapgateConfig::load()?,
    };

    match args.command {
        Command::Check { manifest, json } => check::run(&manifest, &config, json),
        Command::Which { name } => {
            let locator = PathLocator::from_config(&config);
            match locator.locate(&name) {
                Some(path) => {
                    println!("{}", path.display());
                    Ok(())
                }
                None => anyhow::bail!(capgate_foundation::Error::CommandNotFound(name)),
            }
        }
    }
}
