//! geosearch - map search over a Solr index from the command line
//!
//! Runs the same pipeline as the map view: extent correction, spatial query,
//! document parsing and reduction, and sidebar ordering or CSV export.

use clap::{Parser, Subcommand, ValueEnum};
use geosearch_cli::output::Status;
use geosearch_core::config::Config;
use geosearch_core::{exit_codes, Error as CoreError};
use geosearch_telemetry::{metrics, LogFormat, TelemetryConfig};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;

use commands::{config, extent, search};

/// Map search over a Solr index
#[derive(Parser)]
#[command(name = "geosearch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (searched in the current directory if not given)
    #[arg(short, long, global = true, env = "GEOSEARCH_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Log line format on stderr
    #[arg(long, global = true, value_enum, default_value_t = LogStyle::Compact)]
    log_format: LogStyle,

    /// Also write logs to a daily rotated file in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Print counters and timings of this run as JSON on stderr
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Result output on stdout
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogStyle {
    Compact,
    Pretty,
    Json,
}

impl From<LogStyle> for LogFormat {
    fn from(style: LogStyle) -> Self {
        match style {
            LogStyle::Compact => Self::Compact,
            LogStyle::Pretty => Self::Pretty,
            LogStyle::Json => Self::Json,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Search the index for documents in an extent or the configured map view
    Search(search::SearchArgs),

    /// Extent arithmetic
    Extent {
        #[command(subcommand)]
        command: extent::ExtentCommand,
    },

    /// Inspect the configuration
    Config {
        #[command(subcommand)]
        command: config::ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let telemetry = TelemetryConfig {
        format: cli.log_format.into(),
        log_dir: cli.log_dir.clone(),
        ..TelemetryConfig::default()
    }
    .with_verbosity(cli.verbose);
    let _guard = match geosearch_telemetry::init_with_config(telemetry) {
        Ok(guard) => Some(guard),
        Err(e) => {
            Status::warning(&format!("Logging unavailable: {e}"));
            None
        }
    };

    let print_metrics = cli.metrics;
    let result = run(cli).await;
    if print_metrics {
        eprintln!("{:#}", metrics().export_json());
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            Status::error(&e.to_string());
            let code = e
                .downcast_ref::<CoreError>()
                .map_or(exit_codes::FAILURE, |e| e.code.exit_code());
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    tracing::debug!(path = ?config.path, "Configuration loaded");

    match cli.command {
        Commands::Search(args) => search::run(args, &config, cli.format).await,
        Commands::Extent { command } => extent::run(command, &config, cli.format),
        Commands::Config { command } => config::run(command, &config, cli.format),
    }
}
