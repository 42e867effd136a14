use std::time::Duration;

use reqwest::{Client, StatusCode};
use thiserror::Error;

use crate::config::PipelineConfig;
use crate::models::Record;

// Pause between successful page requests; the endpoint is a shared public
// service.
const PAGE_THROTTLE: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request at offset {offset} failed: {source}")]
    Transport {
        offset: usize,
        #[source]
        source: reqwest::Error,
    },

    #[error("API returned {status} at offset {offset}")]
    Status { offset: usize, status: StatusCode },

    #[error("response at offset {offset} was not a JSON array of records: {source}")]
    Body {
        offset: usize,
        #[source]
        source: reqwest::Error,
    },

    #[error("gave up on offset {offset} after {attempts} attempts: {source}")]
    RetriesExhausted {
        offset: usize,
        attempts: u32,
        #[source]
        source: Box<FetchError>,
    },
}

pub struct Fetcher {
    client: Client,
    base_url: String,
    limit_param: String,
    offset_param: String,
    page_size: usize,
    max_retries: u32,
    retry_delay: Duration,
}

impl Fetcher {
    pub fn new(config: &PipelineConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            limit_param: config.limit_param.clone(),
            offset_param: config.offset_param.clone(),
            page_size: config.page_size,
            max_retries: config.max_retries,
            retry_delay: config.retry_delay,
        })
    }

    /// Walks the collection page by page until a short or empty page marks
    /// the end of the data. Requests are strictly sequential; a page that
    /// exhausts its retries fails the whole fetch, discarding accumulated
    /// pages.
    pub async fn fetch_all(&self) -> Result<Vec<Record>, FetchError> {
        let mut records = Vec::new();
        let mut offset = 0usize;

        loop {
            let page = self.fetch_page_with_retry(offset).await?;
            let page_len = page.len();
            records.extend(page);
            tracing::info!(offset, page_len, total = records.len(), "fetched page");

            if page_len < self.page_size {
                break;
            }
            offset += self.page_size;
            tokio::time::sleep(PAGE_THROTTLE).await;
        }

        tracing::info!(total = records.len(), "fetch complete");
        Ok(records)
    }

    async fn fetch_page_with_retry(&self, offset: usize) -> Result<Vec<Record>, FetchError> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.fetch_page(offset).await {
                Ok(page) => return Ok(page),
                Err(err) if attempt < self.max_retries => {
                    tracing::warn!(offset, attempt, error = %err, "transient page failure, retrying");
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(err) => {
                    tracing::error!(offset, attempt, error = %err, "page failed, aborting fetch");
                    return Err(FetchError::RetriesExhausted {
                        offset,
                        attempts: attempt,
                        source: Box::new(err),
                    });
                }
            }
        }
    }

    async fn fetch_page(&self, offset: usize) -> Result<Vec<Record>, FetchError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                (self.limit_param.as_str(), self.page_size.to_string()),
                (self.offset_param.as_str(), offset.to_string()),
            ])
            .send()
            .await
            .map_err(|source| FetchError::Transport { offset, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { offset, status });
        }

        response
            .json::<Vec<Record>>()
            .await
            .map_err(|source| FetchError::Body { offset, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(server_uri: &str, page_size: usize) -> PipelineConfig {
        PipelineConfig {
            base_url: format!("{server_uri}/resource/incidents.json"),
            page_size,
            max_retries: 3,
            retry_delay: Duration::from_millis(0),
            ..PipelineConfig::default()
        }
    }

    fn page(ids: &[u64]) -> Value {
        json!(ids.iter().map(|id| json!({ "dr_no": id })).collect::<Vec<_>>())
    }

    #[tokio::test]
    async fn stops_after_an_empty_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/resource/incidents.json"))
            .and(query_param("$offset", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(&[1, 2])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/resource/incidents.json"))
            .and(query_param("$offset", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(&[])))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&test_config(&server.uri(), 2)).unwrap();
        let records = fetcher.fetch_all().await.unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn a_short_page_ends_the_walk() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/resource/incidents.json"))
            .and(query_param("$offset", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(&[1, 2])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/resource/incidents.json"))
            .and(query_param("$offset", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(&[3])))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&test_config(&server.uri(), 2)).unwrap();
        let records = fetcher.fetch_all().await.unwrap();

        let ids: Vec<u64> = records
            .iter()
            .map(|record| record["dr_no"].as_u64().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn pages_carry_both_pagination_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/resource/incidents.json"))
            .and(query_param("$limit", "2"))
            .and(query_param("$offset", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(&[])))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&test_config(&server.uri(), 2)).unwrap();
        let records = fetcher.fetch_all().await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn retries_are_exhausted_into_a_fetch_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/resource/incidents.json"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&test_config(&server.uri(), 2)).unwrap();
        let err = fetcher.fetch_all().await.unwrap_err();
        assert!(matches!(
            err,
            FetchError::RetriesExhausted {
                offset: 0,
                attempts: 3,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn a_failing_page_recovers_within_the_retry_budget() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/resource/incidents.json"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/resource/incidents.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(&[7])))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&test_config(&server.uri(), 2)).unwrap();
        let records = fetcher.fetch_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["dr_no"], json!(7));
    }

    #[tokio::test]
    async fn a_non_json_body_is_retried_as_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/resource/incidents.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .expect(3)
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&test_config(&server.uri(), 2)).unwrap();
        let err = fetcher.fetch_all().await.unwrap_err();
        assert!(matches!(err, FetchError::RetriesExhausted { .. }));
    }
}
