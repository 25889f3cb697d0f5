use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode};
use tracing::{error, info};
use weather_core::{
    BatchPipeline, BatchSummary, Config, HISTORY_LIMIT, RecordStore, SqliteRecordStore,
    WeatherReport, provider_from_config,
};

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather CLI")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the OpenWeather API key.
    Configure {
        /// Key to store; prompts when absent.
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Fetch current weather for one or more locations, e.g. "Boston, MA" "London, UK".
    Fetch {
        /// Free-text location queries.
        #[arg(required = true)]
        locations: Vec<String>,

        /// Print results as JSON.
        #[arg(long)]
        json: bool,

        /// Do not record successful results in the history.
        #[arg(long)]
        no_store: bool,
    },

    /// Show the most recently recorded results.
    History {
        /// Print records as JSON.
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { api_key } => configure(api_key),
            Command::Fetch { locations, json, no_store } => fetch(&locations, json, no_store).await,
            Command::History { json } => history(json),
        }
    }
}

fn configure(api_key: Option<String>) -> anyhow::Result<()> {
    let mut cfg = Config::load()?;

    let api_key = match api_key {
        Some(key) => key,
        None => Password::new("OpenWeather API key:")
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt()
            .context("Failed to read API key")?,
    };

    let api_key = api_key.trim().to_string();
    if api_key.is_empty() {
        anyhow::bail!("API key must not be empty");
    }

    cfg.set_api_key(api_key);
    let path = cfg.save()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

async fn fetch(locations: &[String], json: bool, no_store: bool) -> anyhow::Result<()> {
    let cfg = Config::load()?;
    // Missing credentials abort the whole batch before any query runs.
    let provider = provider_from_config(&cfg)?;
    let pipeline = BatchPipeline::new(provider);

    let results = pipeline.process_batch(locations).await;

    if json {
        println!("{}", output::results_json(&results)?);
    } else {
        for result in &results {
            println!("{}", output::format_result(result));
        }
        let summary = BatchSummary::from_results(&results);
        println!("{} succeeded, {} failed", summary.succeeded, summary.failed);
    }

    if !no_store {
        let reports: Vec<WeatherReport> =
            results.iter().filter_map(|r| r.as_success()).cloned().collect();
        // Results are already printed; a storage failure is reported, not fatal.
        if let Err(err) = store_reports(&cfg, &reports) {
            error!(error = %err, "failed to store weather records");
            eprintln!("warning: results were not saved to history: {err:#}");
        }
    }

    Ok(())
}

fn store_reports(cfg: &Config, reports: &[WeatherReport]) -> anyhow::Result<()> {
    if reports.is_empty() {
        info!("no valid weather records in this batch to store");
        return Ok(());
    }

    let path = cfg.database_path()?;
    let mut store = SqliteRecordStore::open(&path)
        .with_context(|| format!("Failed to open history database: {}", path.display()))?;
    store.append(reports)?;
    Ok(())
}

fn history(json: bool) -> anyhow::Result<()> {
    let cfg = Config::load()?;
    let path = cfg.database_path()?;
    let store = SqliteRecordStore::open(&path)
        .with_context(|| format!("Failed to open history database: {}", path.display()))?;

    let records = store.recent(HISTORY_LIMIT).context("Failed to retrieve history data")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else if records.is_empty() {
        println!("No weather records yet.");
    } else {
        for record in &records {
            println!("{}", output::format_record(record));
        }
    }

    Ok(())
}
