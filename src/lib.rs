pub mod cli;
pub mod core;
pub mod store;

use crate::core::config::{AppConfig, RateMode};
use crate::store::EntryStore;
use anyhow::Result;
use chrono::NaiveDateTime;
use std::path::PathBuf;
use tracing::{debug, info};

/// Overrides for the configured rate policy, taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct RateOverrides {
    pub mode: Option<RateMode>,
    pub window_hours: Option<f64>,
    pub suppress_hours: Option<f64>,
}

#[derive(Debug, Clone)]
pub enum AppCommand {
    Add {
        amount: f64,
        at: Option<NaiveDateTime>,
    },
    List,
    Rates(RateOverrides),
    Bag,
    Carryover {
        value: Option<f64>,
    },
    Export {
        output: Option<PathBuf>,
    },
    Import {
        input: Option<PathBuf>,
    },
    Clear,
}

pub fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Fluid tracker starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let store = store::open_store(&config)?;
    run_with_store(command, &config, &store)
}

/// Runs a command against an already opened store.
pub fn run_with_store(
    command: AppCommand,
    config: &AppConfig,
    store: &dyn EntryStore,
) -> Result<()> {
    match command {
        AppCommand::Add { amount, at } => {
            let entry = cli::entries::add(store, config, amount, at)?;
            println!("Saved entry: {entry}");
            Ok(())
        }
        AppCommand::List => cli::entries::list(store),
        AppCommand::Rates(overrides) => {
            let mut rate_config = config.rate.clone();
            if let Some(mode) = overrides.mode {
                rate_config.mode = mode;
            }
            if let Some(window_hours) = overrides.window_hours {
                rate_config.window_hours = window_hours;
            }
            if let Some(suppress_hours) = overrides.suppress_hours {
                rate_config.suppress_hours = suppress_hours;
            }
            let policy = rate_config.policy()?;
            cli::rates::run(store, &policy)
        }
        AppCommand::Bag => cli::bag::run(store, config.capacity),
        AppCommand::Carryover { value } => cli::carryover::run(store, config, value),
        AppCommand::Export { output } => cli::transfer::export(store, output.as_deref()),
        AppCommand::Import { input } => cli::transfer::import(store, input.as_deref()).map(|_| ()),
        AppCommand::Clear => cli::entries::clear(store),
    }
}
