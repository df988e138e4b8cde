//! Crestron Log Timeline CLI Application
//!
//! This is the command-line interface for the Crestron debug log timeline.
//! It uses the crestron-log-decoder library and adds:
//! - Argument handling and an optional TOML config file
//! - The HTML timeline report (Plotly)
//! - A plain-text per-signal summary
//! - Exit codes that tell "nothing parsed" apart from "everything filtered out"

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use crestron_log_decoder::{Decoder, DecoderError, RenderMode};
use std::path::PathBuf;
use std::process::ExitCode;

mod config;
mod report;

/// Exit code when the input has no parseable lines
const EXIT_NO_ROWS: u8 = 2;

/// Exit code when the filters removed every event
const EXIT_EMPTY_AFTER_FILTERING: u8 = 3;

/// Crestron Log Timeline - Plot Crestron debug output as an interactive timeline
#[derive(Parser, Debug)]
#[command(name = "crestron-log-cli")]
#[command(about = "Render Crestron debug logs as an interactive HTML timeline", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the debug log to plot
    #[arg(value_name = "LOGFILE")]
    logfile: PathBuf,

    /// Output HTML file (default: <logfile>.<mode>.html)
    #[arg(short, long, value_name = "FILE")]
    out: Option<PathBuf>,

    /// Minimum time in ms
    #[arg(long, value_name = "MS")]
    tmin: Option<f64>,

    /// Maximum time in ms
    #[arg(long, value_name = "MS")]
    tmax: Option<f64>,

    /// Regex filter for signal names (keep matches)
    #[arg(long, value_name = "REGEX")]
    only: Option<String>,

    /// Regex exclude filter for signal names
    #[arg(long, value_name = "REGEX")]
    exclude: Option<String>,

    /// Cap the number of signals, after filtering (default: 60)
    #[arg(long, value_name = "COUNT", value_parser = clap::value_parser!(u64).range(1..))]
    max_signals: Option<u64>,

    /// Digital rendering mode (default: edges)
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Keep absolute time (do not normalize to the window start)
    #[arg(long)]
    absolute_time: bool,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print a per-signal summary table
    #[arg(long)]
    summary: bool,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Edges,
    Steps,
}

impl From<ModeArg> for RenderMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Edges => RenderMode::Edges,
            ModeArg::Steps => RenderMode::Steps,
        }
    }
}

fn main() -> ExitCode {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::debug!("Crestron Log Timeline CLI v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("Using decoder library v{}", crestron_log_decoder::VERSION);

    match run(&args) {
        Ok(out) => {
            if !args.quiet {
                println!("Wrote: {}", out.display());
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{:#}", err);
            ExitCode::from(exit_code_for(&err))
        }
    }
}

/// Parse, filter, plan, render, write. Nothing is written unless every step succeeded.
fn run(args: &Args) -> Result<PathBuf> {
    let app_config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => config::AppConfig::default(),
    };

    let overrides = config::Overrides {
        out: args.out.clone(),
        only: args.only.clone(),
        exclude: args.exclude.clone(),
        tmin: args.tmin,
        tmax: args.tmax,
        max_signals: args.max_signals.map(|n| n as usize),
        mode: args.mode.map(RenderMode::from),
        absolute_time: args.absolute_time,
    };
    let settings = config::resolve(&args.logfile, &app_config, overrides)?;
    log::debug!("Resolved settings: {:?}", settings);

    let decoder = Decoder::with_config(settings.table);
    let parsed = decoder
        .parse_file(&args.logfile)
        .with_context(|| format!("Failed to read log file: {:?}", args.logfile))?;
    let table = decoder.build_table(parsed)?;

    if args.summary {
        print!("{}", report::txt::render_summary(&table));
    }

    let plan = decoder.plan(&table, settings.mode);
    let meta = report::ReportMeta::new(args.logfile.display().to_string(), table.time_offset_ms());
    let html = report::html::render_html(&plan, &meta)?;

    std::fs::write(&settings.out, html)
        .with_context(|| format!("Failed to write output file: {:?}", settings.out))?;
    log::info!("Timeline written to {:?}", settings.out);

    Ok(settings.out)
}

/// Map pipeline failures to distinct process exit codes
fn exit_code_for(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<DecoderError>() {
        Some(DecoderError::NoParseableRows) => EXIT_NO_ROWS,
        Some(DecoderError::EmptyAfterFiltering) => EXIT_EMPTY_AFTER_FILTERING,
        _ => 1,
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
