use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

mod config;
mod dates;
mod fetch;
mod filter;
mod models;
mod pipeline;
mod sample;
mod storage;

use config::PipelineConfig;

const DEFAULT_URL: &str = "https://data.lacity.org/resource/63jg-8b9z.json";

#[derive(Parser)]
#[command(name = "incident-sampler")]
#[command(about = "Fetch, filter, and subsample a public incident-report dataset", long_about = None)]
struct Cli {
    /// Directory for checkpoint files
    #[arg(long, default_value = "data")]
    out_dir: PathBuf,

    /// Recompute the stage instead of resuming from its checkpoint
    #[arg(long)]
    force: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download every page of the dataset
    Fetch {
        #[arg(long, default_value = DEFAULT_URL)]
        url: String,
        #[arg(long, default_value_t = 1000)]
        page_size: usize,
        /// Total attempts per page before the fetch is abandoned
        #[arg(long, default_value_t = 3)]
        max_retries: u32,
        /// Seconds to wait between attempts for a failing page
        #[arg(long, default_value_t = 1)]
        retry_delay: u64,
    },
    /// Keep records reported inside a calendar-year window
    Filter {
        #[arg(long, default_value_t = 2013)]
        start_year: i32,
        #[arg(long, default_value_t = 2019)]
        end_year: i32,
        #[arg(long, default_value = "date_rptd")]
        date_field: String,
    },
    /// Draw a seeded random subsample of the filtered records
    Sample {
        #[arg(long, default_value_t = 10_000)]
        sample_size: usize,
        #[arg(long, default_value_t = 1)]
        seed: u64,
    },
    /// Run fetch, filter, and sample in order, resuming from checkpoints
    Run {
        #[arg(long, default_value = DEFAULT_URL)]
        url: String,
        #[arg(long, default_value_t = 1000)]
        page_size: usize,
        #[arg(long, default_value_t = 3)]
        max_retries: u32,
        #[arg(long, default_value_t = 1)]
        retry_delay: u64,
        #[arg(long, default_value_t = 2013)]
        start_year: i32,
        #[arg(long, default_value_t = 2019)]
        end_year: i32,
        #[arg(long, default_value = "date_rptd")]
        date_field: String,
        #[arg(long, default_value_t = 10_000)]
        sample_size: usize,
        #[arg(long, default_value_t = 1)]
        seed: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let directive = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("incident_sampler=info,warn")
    };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(directive)
        .init();

    match cli.command {
        Commands::Fetch {
            url,
            page_size,
            max_retries,
            retry_delay,
        } => {
            let config = PipelineConfig {
                base_url: url,
                out_dir: cli.out_dir,
                page_size,
                max_retries,
                retry_delay: Duration::from_secs(retry_delay),
                ..PipelineConfig::default()
            };
            let records = pipeline::fetch_stage(&config, cli.force)
                .await
                .context("fetch stage failed")?;
            println!(
                "Fetched {} records into {}.",
                records.len(),
                config.raw_path().display()
            );
        }
        Commands::Filter {
            start_year,
            end_year,
            date_field,
        } => {
            let config = PipelineConfig {
                out_dir: cli.out_dir,
                start_year,
                end_year,
                date_field,
                ..PipelineConfig::default()
            };
            let records =
                pipeline::filter_stage(&config, cli.force).context("filter stage failed")?;
            println!(
                "Kept {} records reported in {start_year}-{end_year}, saved to {}.",
                records.len(),
                config.filtered_path().display()
            );
        }
        Commands::Sample { sample_size, seed } => {
            let config = PipelineConfig {
                out_dir: cli.out_dir,
                sample_size,
                seed,
                ..PipelineConfig::default()
            };
            let records =
                pipeline::sample_stage(&config, cli.force).context("sample stage failed")?;
            println!(
                "Sampled {} records (seed {seed}) into {}.",
                records.len(),
                config.sampled_path().display()
            );
        }
        Commands::Run {
            url,
            page_size,
            max_retries,
            retry_delay,
            start_year,
            end_year,
            date_field,
            sample_size,
            seed,
        } => {
            let config = PipelineConfig {
                base_url: url,
                out_dir: cli.out_dir,
                page_size,
                max_retries,
                retry_delay: Duration::from_secs(retry_delay),
                start_year,
                end_year,
                date_field,
                sample_size,
                seed,
                ..PipelineConfig::default()
            };
            let records = pipeline::run(&config, cli.force).await?;
            println!(
                "Pipeline complete: {} records in {}.",
                records.len(),
                config.sampled_path().display()
            );
        }
    }

    Ok(())
}
