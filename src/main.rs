//! CLI entry point for post-processing BEAM simulation runs.
//!
//! Provides subcommands for analyzing a single run, extracting mode VMT,
//! and analyzing a batch of scenario runs described in a config file.

use anyhow::{Context, Result};
use beam_postprocess::analyzers::analyzer::{RunAnalysis, analyze_batch};
use beam_postprocess::analyzers::types::ScenarioModeVmt;
use beam_postprocess::config::BatchConfig;
use beam_postprocess::fetch::{BasicClient, HttpClient, LocalOnly};
use beam_postprocess::output::{OutputDirectory, append_record};
use beam_postprocess::{RunDirectory, RunLayout};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "beam_postprocess")]
#[command(about = "Post-process BEAM simulation outputs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive path traversal columns and write every summary table for a run
    Analyze {
        /// Run root: a local directory or a URL
        #[arg(value_name = "ROOT")]
        root: String,

        /// Iteration to analyze (defaults to the last one found)
        #[arg(short, long)]
        iteration: Option<u32>,

        /// File layout of the run: "beam" or "flat"
        #[arg(short, long, default_value = "beam")]
        layout: RunLayout,

        /// Directory to write results to
        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,
    },
    /// Write vehicle and passenger miles per mode for a run
    ModeVmt {
        #[arg(value_name = "ROOT")]
        root: String,

        #[arg(short, long)]
        iteration: Option<u32>,

        #[arg(short, long, default_value = "beam")]
        layout: RunLayout,

        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,

        /// Optional: CSV file to append the rows to, tagged with the run root
        #[arg(long)]
        append: Option<PathBuf>,
    },
    /// Analyze every run listed in a JSON batch config
    Batch {
        /// Path to the batch config
        #[arg(short, long)]
        config: PathBuf,

        /// Directory receiving one subdirectory per scenario
        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/beam_postprocess.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("beam_postprocess.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            root,
            iteration,
            layout,
            output_dir,
        } => {
            let analysis = load(&root, iteration, layout)?;
            analysis.write_all(&OutputDirectory::new(output_dir))?;
        }
        Commands::ModeVmt {
            root,
            iteration,
            layout,
            output_dir,
            append,
        } => {
            let analysis = load(&root, iteration, layout)?;
            let rows = analysis.mode_vmt();
            OutputDirectory::new(output_dir).write_csv("ModeVMT", &rows)?;

            if let Some(path) = append {
                for row in rows {
                    let tagged = ScenarioModeVmt {
                        scenario: root.clone(),
                        mode: row.mode,
                        vehicle_miles: row.vehicle_miles,
                        passenger_miles: row.passenger_miles,
                    };
                    append_record(&path, &tagged)?;
                }
                info!(path = %path.display(), "Appended mode VMT");
            }
        }
        Commands::Batch { config, output_dir } => {
            let batch = BatchConfig::load(&config)?;
            let client = BasicClient::new()?;
            let rows = analyze_batch(&batch, &OutputDirectory::new(output_dir), &client)?;
            info!(rows = rows.len(), "Batch complete");
        }
    }

    Ok(())
}

/// Opens a run and loads its analysis, using HTTP only for URL roots.
#[tracing::instrument(skip(layout))]
fn load(root: &str, iteration: Option<u32>, layout: RunLayout) -> Result<RunAnalysis> {
    let client: Box<dyn HttpClient> = if root.contains("://") {
        Box::new(BasicClient::new()?)
    } else {
        Box::new(LocalOnly)
    };

    let run = RunDirectory::open(root, iteration, layout, client.as_ref())
        .with_context(|| format!("failed to locate run at {root}"))?;
    let analysis = RunAnalysis::load(&run, client.as_ref())?;
    Ok(analysis)
}
