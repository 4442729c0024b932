//! neatvis CLI: inspect and replay timeline/map selection sync

mod replay;

use clap::{Parser, Subcommand};
use neatvis_engine::{compute_window, focus_mode, parse_date, Config, JsonFileStore, Record};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

/// Timeline selection and viewport sync, headless
#[derive(Parser)]
#[command(name = "neatvis")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Widget configuration file (JSON). Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective configuration
    Config,

    /// Compute the focus window for a date or date range
    Window {
        /// Start date (RFC 3339 or YYYY-MM-DD)
        start: String,

        /// End date (RFC 3339 or YYYY-MM-DD)
        end: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replay a scripted event sequence against a headless timeline
    Replay {
        /// Records file (JSON array)
        #[arg(long)]
        records: PathBuf,

        /// Script file (JSON array of steps)
        #[arg(long)]
        script: PathBuf,
    },
}

fn main() {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => fail(&e),
    };

    let result = match cli.command {
        Commands::Config => cmd_config(&config),
        Commands::Window { start, end, json } => cmd_window(&config, &start, end.as_deref(), json),
        Commands::Replay { records, script } => cmd_replay(config, &records, &script),
    };

    if let Err(e) = result {
        fail(&e);
    }
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}

fn load_config(path: Option<&Path>) -> Result<Config, String> {
    match path {
        Some(path) => Config::load(path).map_err(|e| format!("{}: {e}", path.display())),
        None => Ok(Config::default()),
    }
}

fn cmd_config(config: &Config) -> Result<(), String> {
    let json = serde_json::to_string_pretty(config).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

fn cmd_window(config: &Config, start: &str, end: Option<&str>, json: bool) -> Result<(), String> {
    let start_date = parse_date(start).ok_or_else(|| format!("invalid start date: {start}"))?;
    let mut record = Record::new(0, "cli").starting(start_date);
    if let Some(end) = end {
        let end_date = parse_date(end).ok_or_else(|| format!("invalid end date: {end}"))?;
        record = record.ending(end_date);
    }

    let window = compute_window(&record, &config.padding)
        .ok_or_else(|| "window out of range".to_string())?;

    if json {
        let out = serde_json::to_string_pretty(&window).map_err(|e| e.to_string())?;
        println!("{out}");
    } else {
        let mode = focus_mode(&record).map_or("none", |m| match m {
            neatvis_engine::FocusMode::Span => "span",
            neatvis_engine::FocusMode::Point => "point",
        });
        println!("{mode}: {window}");
    }
    Ok(())
}

fn cmd_replay(config: Config, records: &Path, script: &Path) -> Result<(), String> {
    let content = std::fs::read_to_string(script)
        .map_err(|e| format!("{}: {e}", script.display()))?;
    let steps: Vec<replay::Step> =
        serde_json::from_str(&content).map_err(|e| format!("{}: {e}", script.display()))?;

    let store = JsonFileStore::new(records);
    let rt = tokio::runtime::Runtime::new().map_err(|e| e.to_string())?;
    let report = rt
        .block_on(replay::replay(config, &store, steps))
        .map_err(|e| format!("{}: {e}", records.display()))?;

    let out = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
    println!("{out}");
    Ok(())
}
