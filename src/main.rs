use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use fluidlog::core::config::RateMode;
use fluidlog::core::log::init_logging;
use fluidlog::core::observation::parse_timestamp;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Adjacent,
    AdjacentLag2,
    SlidingWindow,
}

impl From<ModeArg> for RateMode {
    fn from(mode: ModeArg) -> RateMode {
        match mode {
            ModeArg::Adjacent => RateMode::Adjacent,
            ModeArg::AdjacentLag2 => RateMode::AdjacentLag2,
            ModeArg::SlidingWindow => RateMode::SlidingWindow,
        }
    }
}

fn parse_datetime(value: &str) -> Result<chrono::NaiveDateTime, String> {
    parse_timestamp(value).ok_or_else(|| format!("expected YYYY-MM-DDTHH:MM, got '{value}'"))
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Record a fluid amount
    Add {
        /// Amount in ml; the standing carryover is added on top
        amount: f64,
        /// Date and time of the measurement, defaults to now
        #[arg(long, value_parser = parse_datetime)]
        at: Option<chrono::NaiveDateTime>,
    },
    /// Display previous entries
    List,
    /// Display the amount-over-time and intake rate series
    Rates {
        /// Pairing strategy, overrides the configured one
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
        /// Sliding window length in hours
        #[arg(long)]
        window: Option<f64>,
        /// Hide rates this many hours after the first entry (0 disables)
        #[arg(long)]
        suppress: Option<f64>,
    },
    /// Display the current fill level of the bag
    Bag,
    /// Show the standing carryover, or set it for new entries
    Carryover {
        /// New carryover in ml
        value: Option<f64>,
    },
    /// Export all entries as JSON
    Export {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace all entries with JSON data
    Import {
        /// Read from this file instead of stdin
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Clear all entries
    Clear,
}

impl From<Commands> for fluidlog::AppCommand {
    fn from(cmd: Commands) -> fluidlog::AppCommand {
        match cmd {
            Commands::Add { amount, at } => fluidlog::AppCommand::Add { amount, at },
            Commands::List => fluidlog::AppCommand::List,
            Commands::Rates {
                mode,
                window,
                suppress,
            } => fluidlog::AppCommand::Rates(fluidlog::RateOverrides {
                mode: mode.map(Into::into),
                window_hours: window,
                suppress_hours: suppress,
            }),
            Commands::Bag => fluidlog::AppCommand::Bag,
            Commands::Carryover { value } => fluidlog::AppCommand::Carryover { value },
            Commands::Export { output } => fluidlog::AppCommand::Export { output },
            Commands::Import { input } => fluidlog::AppCommand::Import { input },
            Commands::Clear => fluidlog::AppCommand::Clear,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => fluidlog::cli::setup::setup(),
        Some(cmd) => fluidlog::run_command(cmd.into(), cli.config_path.as_deref()),
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
