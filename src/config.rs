use std::path::PathBuf;
use std::time::Duration;

/// Everything the pipeline stages need, passed explicitly rather than read
/// from ambient state. Defaults match the Los Angeles incident-report feed.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub base_url: String,
    /// Query parameter naming the page size (Socrata uses `$limit`).
    pub limit_param: String,
    /// Query parameter naming the zero-based offset (Socrata uses `$offset`).
    pub offset_param: String,
    pub out_dir: PathBuf,
    pub page_size: usize,
    /// Total attempts per page before the fetch is abandoned.
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub start_year: i32,
    pub end_year: i32,
    pub date_field: String,
    pub sample_size: usize,
    pub seed: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_url: "https://data.lacity.org/resource/63jg-8b9z.json".to_string(),
            limit_param: "$limit".to_string(),
            offset_param: "$offset".to_string(),
            out_dir: PathBuf::from("data"),
            page_size: 1000,
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
            start_year: 2013,
            end_year: 2019,
            date_field: "date_rptd".to_string(),
            sample_size: 10_000,
            seed: 1,
        }
    }
}

impl PipelineConfig {
    pub fn raw_path(&self) -> PathBuf {
        self.out_dir.join("raw_data.json")
    }

    pub fn filtered_path(&self) -> PathBuf {
        self.out_dir.join("filtered_data.json")
    }

    pub fn sampled_path(&self) -> PathBuf {
        self.out_dir.join("sampled_data.json")
    }
}
