use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use flow_screener::api::{run_server, AppState};
use flow_screener::data::feed::load_observations;
use flow_screener::services::scheduler;
use flow_screener::{AppConfig, AppResult, FlowPipeline};

#[derive(Parser)]
#[command(name = "flow_screener")]
#[command(version, about = "Options flow screener and daily recommendation report", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Detect signals in an observation file and append them to the log
    Scan {
        /// JSON array or JSON-lines observation file
        #[arg(short, long)]
        input: PathBuf,

        /// Date used to resolve expirations into DTE (default: today)
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },

    /// Build, save and send the report for a day of logged signals
    Analyze {
        /// Trade date, YYYY-MM-DD (default: today)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Save the report without sending it
        #[arg(long)]
        no_notify: bool,
    },

    /// Run the HTTP API and the scheduled analysis job
    Serve,

    /// Print scored signals for an observation file without logging them
    Score {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() -> AppResult<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;
    info!("🚀 Flow Screener starting (config: {})", cli.config.display());

    let pipeline = Arc::new(FlowPipeline::new(config));
    let now = Local::now().naive_local();

    match cli.command {
        Command::Scan { input, as_of } => {
            let feed = load_observations(&input)?;
            let as_of = as_of.unwrap_or_else(|| now.date());
            let summary = pipeline.scan(feed, as_of, now)?;

            println!("Processed: {}", summary.processed);
            println!("Signals:   {}", summary.signals.len());
            println!("Discarded: {}", summary.discarded);
            println!("Errors:    {}", summary.errors.len());
            for signal in &summary.signals {
                println!(
                    "  {} {} {} ${} {}d ({:.0}K) {}",
                    signal.ticker,
                    signal.signal_type,
                    signal.option_type,
                    signal.strike,
                    signal.dte,
                    signal.premium / 1000.0,
                    signal.direction
                );
            }
            for e in &summary.errors {
                warn!("⚠️ [DETECT] {}", e);
            }
        }
        Command::Analyze { date, no_notify } => {
            let date = date.unwrap_or_else(|| now.date());
            let run = pipeline.analyze_day(date, !no_notify).await?;

            println!("{}", run.report.text);
            println!("Saved to {}", run.saved_to.display());
            if run.skipped_lines > 0 {
                println!("Skipped {} unreadable log line(s)", run.skipped_lines);
            }
            for w in &run.warnings {
                println!("Warning: {}", w);
            }
        }
        Command::Serve => {
            let bind_addr = pipeline.config().api.bind_addr.clone();
            scheduler::spawn_if_configured(pipeline.clone()).await?;
            run_server(Arc::new(AppState { pipeline }), &bind_addr).await?;
        }
        Command::Score { input, as_of } => {
            let feed = load_observations(&input)?;
            let as_of = as_of.unwrap_or_else(|| now.date());
            let (scored, errors) = pipeline.score_only(feed, as_of, now);

            for s in &scored {
                println!(
                    "{:>5.1}  {} {} {} ${} {}d ({:.0}K) {}",
                    s.score,
                    s.signal.ticker,
                    s.signal.signal_type,
                    s.signal.option_type,
                    s.signal.strike,
                    s.signal.dte,
                    s.signal.premium / 1000.0,
                    s.signal.direction
                );
            }
            if scored.is_empty() {
                println!("No signals");
            }
            for e in &errors {
                warn!("⚠️ [DETECT] {}", e);
            }
        }
    }

    Ok(())
}
