//! CLI command dispatch and handlers.

pub mod completions;
pub mod config;
pub mod outline;
pub mod scenarios;
pub mod simulate;
pub mod version;

use std::path::Path;

use tracing::{debug, warn};

use crate::cli::args::{Cli, Commands, ConfigSubcommand};
use crate::config::{ConfigLoader, NavConfig, discover};
use crate::error::Result;

/// Dispatches a parsed CLI invocation to its handler.
///
/// # Errors
///
/// Returns an error if settings cannot be loaded or the handler fails.
pub async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Outline(args) => {
            let settings = load_settings(cli.config.as_deref())?;
            outline::run(&args, &settings)
        }
        Commands::Simulate(args) => {
            let settings = load_settings(cli.config.as_deref())?;
            simulate::run(&args, settings).await
        }
        Commands::Scenarios(args) => scenarios::run(&args),
        Commands::Config(cmd) => match cmd.subcommand {
            ConfigSubcommand::Validate(args) => config::validate(&args),
            ConfigSubcommand::Show(args) => {
                let settings = load_settings(cli.config.as_deref())?;
                config::show(&args, &settings)
            }
        },
        Commands::Completions(args) => {
            completions::run(&args);
            Ok(())
        }
        Commands::Version(args) => {
            version::run(&args);
            Ok(())
        }
    }
}

/// Loads navigation settings, falling back to defaults without a file.
///
/// # Errors
///
/// Returns the loader's error for a missing or invalid file.
pub fn load_settings(explicit: Option<&Path>) -> Result<NavConfig> {
    let Some(path) = discover(explicit) else {
        debug!("no settings file, using defaults");
        return Ok(NavConfig::default());
    };

    let loaded = ConfigLoader::with_defaults().load(&path)?;
    for warning in &loaded.warnings {
        warn!(path = %path.display(), "{warning}");
    }
    debug!(path = %path.display(), "settings loaded");
    Ok(loaded.config)
}
