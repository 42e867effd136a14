use anyhow::Context;

use crate::config::PipelineConfig;
use crate::fetch::Fetcher;
use crate::filter;
use crate::models::Record;
use crate::sample;
use crate::storage;

/// Runs fetch, filter, and sample in order. Each stage persists its output
/// before the next one starts, so a failed run resumes from the last
/// checkpoint that made it to disk.
pub async fn run(config: &PipelineConfig, force: bool) -> anyhow::Result<Vec<Record>> {
    fetch_stage(config, force).await.context("fetch stage failed")?;
    filter_stage(config, force).context("filter stage failed")?;
    sample_stage(config, force).context("sample stage failed")
}

pub async fn fetch_stage(config: &PipelineConfig, force: bool) -> anyhow::Result<Vec<Record>> {
    let path = config.raw_path();
    if !force {
        if let Some(records) = storage::load_records(&path)? {
            tracing::info!(count = records.len(), path = %path.display(), "reusing raw checkpoint");
            return Ok(records);
        }
    }

    let fetcher = Fetcher::new(config)?;
    let records = fetcher.fetch_all().await?;
    storage::save_records(&path, &records)?;
    Ok(records)
}

pub fn filter_stage(config: &PipelineConfig, force: bool) -> anyhow::Result<Vec<Record>> {
    let path = config.filtered_path();
    if !force {
        if let Some(records) = storage::load_records(&path)? {
            tracing::info!(count = records.len(), path = %path.display(), "reusing filtered checkpoint");
            return Ok(records);
        }
    }

    let raw = storage::load_records(&config.raw_path())?
        .context("no raw checkpoint found, run the fetch stage first")?;
    let filtered =
        filter::filter_by_year(&raw, config.start_year, config.end_year, &config.date_field);
    storage::save_records(&path, &filtered)?;
    Ok(filtered)
}

pub fn sample_stage(config: &PipelineConfig, force: bool) -> anyhow::Result<Vec<Record>> {
    let path = config.sampled_path();
    if !force {
        if let Some(records) = storage::load_records(&path)? {
            tracing::info!(count = records.len(), path = %path.display(), "reusing sampled checkpoint");
            return Ok(records);
        }
    }

    let filtered = storage::load_records(&config.filtered_path())?
        .context("no filtered checkpoint found, run the filter stage first")?;
    let sampled = sample::sample_records(&filtered, config.sample_size, config.seed);
    storage::save_records(&path, &sampled)?;
    Ok(sampled)
}
