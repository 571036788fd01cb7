use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

mod config;
mod error;
mod generator;
mod logging;
mod metrics;
mod models;
mod pipeline;
mod records;
mod report;
mod risk;

use config::{DashboardConfig, DEFAULT_COUNT, DEFAULT_R_HIGH, DEFAULT_R_MED, DEFAULT_SEED};
use models::{ImpactMetrics, Metrics, ReductionRates};

#[derive(Parser)]
#[command(name = "nails-no-show-radar")]
#[command(about = "No-show risk radar for nail salon bookings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct RunArgs {
    /// Number of bookings to generate
    #[arg(long, env = "RADAR_COUNT", default_value_t = DEFAULT_COUNT)]
    count: usize,
    /// Seed for the booking generator
    #[arg(long, env = "RADAR_SEED", default_value_t = DEFAULT_SEED)]
    seed: u64,
    /// Assumed no-show reduction for High-risk bookings
    #[arg(long, env = "RADAR_R_HIGH", default_value_t = DEFAULT_R_HIGH)]
    r_high: f64,
    /// Assumed no-show reduction for Medium-risk bookings
    #[arg(long, env = "RADAR_R_MED", default_value_t = DEFAULT_R_MED)]
    r_med: f64,
}

impl RunArgs {
    fn config(&self, only_high: bool) -> DashboardConfig {
        DashboardConfig {
            count: self.count,
            seed: self.seed,
            rates: ReductionRates {
                r_high: self.r_high,
                r_med: self.r_med,
            },
            only_high,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Write synthetic bookings as CSV
    Generate {
        #[command(flatten)]
        run: RunArgs,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Score bookings and list them by start time
    Score {
        #[command(flatten)]
        run: RunArgs,
        /// Score bookings from this CSV instead of generating them
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long)]
        only_high: bool,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Also write the scored bookings as CSV
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print headline and what-if metrics
    Metrics {
        #[command(flatten)]
        run: RunArgs,
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown dashboard report
    Report {
        #[command(flatten)]
        run: RunArgs,
        #[arg(long)]
        only_high: bool,
        #[arg(long, default_value = "dashboard.md")]
        out: PathBuf,
    },
}

#[derive(Serialize)]
struct MetricsOutput<'a> {
    metrics: &'a Metrics,
    impact: &'a ImpactMetrics,
}

fn main() -> anyhow::Result<()> {
    logging::init_logging().context("failed to initialise logging")?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { run, out } => {
            let config = run.config(false);
            config.validate()?;
            let bookings = generator::generate(config.count, config.seed);

            match out {
                Some(path) => {
                    let file = std::fs::File::create(&path)
                        .with_context(|| format!("failed to create {}", path.display()))?;
                    records::write_bookings(file, &bookings)?;
                    println!("Wrote {} bookings to {}.", bookings.len(), path.display());
                }
                None => records::write_bookings(std::io::stdout().lock(), &bookings)?,
            }
        }
        Commands::Score {
            run,
            csv,
            only_high,
            limit,
            out,
        } => {
            let config = run.config(only_high);
            let dashboard = match csv {
                Some(path) => {
                    let bookings = records::import_bookings(&path)?;
                    info!(count = bookings.len(), path = %path.display(), "imported bookings");
                    pipeline::score_and_aggregate(bookings, &config)?
                }
                None => pipeline::run(&config)?,
            };

            if let Some(path) = out {
                let file = std::fs::File::create(&path)
                    .with_context(|| format!("failed to create {}", path.display()))?;
                records::write_scored(file, &dashboard.bookings)?;
                println!("Scored bookings written to {}.", path.display());
            }

            let rows: Vec<_> = dashboard.visible(config.only_high).take(limit).collect();
            if rows.is_empty() {
                println!("No bookings to show.");
                return Ok(());
            }

            println!("Bookings by start time:");
            for scored in rows {
                let b = &scored.booking;
                println!(
                    "- {} {} with {} ({} min, {}) score {} [{}]: {}",
                    b.start_time.format("%H:%M"),
                    b.service,
                    b.tech,
                    b.duration_min,
                    b.price,
                    scored.risk_score,
                    scored.risk,
                    scored.action
                );
            }
        }
        Commands::Metrics { run, json } => {
            let config = run.config(false);
            let dashboard = pipeline::run(&config)?;
            let m = &dashboard.metrics;
            let impact = &dashboard.impact;

            if json {
                let output = MetricsOutput { metrics: m, impact };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("Bookings: {}", m.total_bookings);
                println!("High risk: {}", m.high_risk_count);
                println!("Revenue at risk: {}", m.revenue_at_risk);
                println!("Hours at risk: {:.1}", m.hours_at_risk);
                println!("Expected protected: {}", m.expected_protected);
                println!(
                    "Protected at {:.2}/{:.2}: {} (High {}, Medium {})",
                    impact.rates.r_high,
                    impact.rates.r_med,
                    impact.protected,
                    impact.revenue_high,
                    impact.revenue_med
                );
            }
        }
        Commands::Report { run, only_high, out } => {
            let config = run.config(only_high);
            let dashboard = pipeline::run(&config)?;
            let report = report::build_report(&config, &dashboard);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
