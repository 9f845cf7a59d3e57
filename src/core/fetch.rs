use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, COOKIE};
use reqwest::Client;

use crate::config::session::SessionConfig;
use crate::config::RAW_RESPONSE_FILE;
use crate::core::dates::cache_bust_millis;
use crate::domain::model::{IpoRecord, ProviderResponse};
use crate::domain::ports::Storage;
use crate::utils::error::{CalError, Result};

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub endpoint: String,
    pub page_size: u32,
    pub timeout: Duration,
    pub max_retries: u32,
    /// First backoff sleep; doubled after each failed attempt. One second
    /// in production, shrunk in tests.
    pub backoff_base: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            endpoint: "https://www.jisilu.cn/data/new_stock/hkipo/".to_string(),
            page_size: 50,
            timeout: Duration::from_secs(30),
            max_retries: 3,
            backoff_base: Duration::from_secs(1),
        }
    }
}

/// One-shot client for the provider's IPO listing endpoint.
pub struct IpoClient {
    http: Client,
    options: FetchOptions,
}

impl IpoClient {
    pub fn new(options: FetchOptions, session: &SessionConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(options.timeout)
            .default_headers(build_headers(session))
            .build()?;
        Ok(Self { http, options })
    }

    /// Issues the single POST, retrying transient failures (network
    /// errors, non-2xx) with exponential backoff. Exhausted retries
    /// degrade to an empty list. A 2xx body that is not valid JSON is a
    /// data-contract failure and is not retried. The parsed response is
    /// snapshotted pretty-printed for debugging.
    pub async fn fetch_records<S: Storage>(&self, storage: &S) -> Result<Vec<IpoRecord>> {
        let form = [
            ("rp", self.options.page_size.to_string()),
            ("page", "1".to_string()),
        ];

        for attempt in 0..=self.options.max_retries {
            if attempt > 0 {
                let delay = self.options.backoff_base * 2u32.pow(attempt - 1);
                tracing::info!("Retrying... ({}/{})", attempt, self.options.max_retries);
                tokio::time::sleep(delay).await;
            }

            // Cache-busting timestamp keeps intermediaries from replaying
            // a stale listing page.
            let url = format!(
                "{}?___jsl=LST___t={}",
                self.options.endpoint,
                cache_bust_millis()
            );
            tracing::info!("Making request to: {}", url);

            let response = match self.http.post(&url).form(&form).send().await {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!("Request failed: {}", e);
                    continue;
                }
            };

            let status = response.status();
            if !status.is_success() {
                tracing::error!("Request failed with status: {}", status);
                continue;
            }

            let text = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!("Failed to read response body: {}", e);
                    continue;
                }
            };
            tracing::info!(
                "Response status: {}, Content length: {}",
                status,
                text.len()
            );

            return self.parse_body(&text, storage).await;
        }

        tracing::error!(
            "Failed to fetch IPO data after {} retries",
            self.options.max_retries
        );
        Ok(Vec::new())
    }

    async fn parse_body<S: Storage>(&self, text: &str, storage: &S) -> Result<Vec<IpoRecord>> {
        let value: serde_json::Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to parse JSON response: {}", e);
                let head: String = text.chars().take(500).collect();
                tracing::error!("Response text: {}...", head);
                return Err(CalError::DataContractError {
                    message: format!("response body is not valid JSON: {}", e),
                });
            }
        };

        // Debugging snapshot; a failed write degrades the run but must not
        // abort it.
        match serde_json::to_vec_pretty(&value) {
            Ok(pretty) => {
                if let Err(e) = storage.write_file(RAW_RESPONSE_FILE, &pretty).await {
                    tracing::warn!("Failed to save raw response snapshot: {}", e);
                } else {
                    tracing::info!("Response saved to {}", RAW_RESPONSE_FILE);
                }
            }
            Err(e) => tracing::warn!("Failed to serialize raw response snapshot: {}", e),
        }

        let parsed: ProviderResponse =
            serde_json::from_value(value).map_err(|e| CalError::DataContractError {
                message: format!("response shape does not match the rows/cell contract: {}", e),
            })?;

        let records: Vec<IpoRecord> = parsed.rows.into_iter().map(|row| row.cell).collect();
        tracing::info!("Found {} total IPO entries", records.len());
        Ok(records)
    }
}

fn build_headers(session: &SessionConfig) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (key, value) in session.request_headers() {
        match (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => tracing::warn!("Skipping invalid session header: {}", key),
        }
    }
    if let Some(cookie) = session.cookie_header() {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                headers.insert(COOKIE, value);
            }
            Err(_) => tracing::warn!("Session cookies contain invalid header characters"),
        }
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::CalError;
    use httpmock::prelude::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                CalError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    fn options(server: &MockServer) -> FetchOptions {
        FetchOptions {
            endpoint: server.url("/data/new_stock/hkipo/"),
            page_size: 50,
            timeout: Duration::from_secs(5),
            max_retries: 3,
            backoff_base: Duration::from_millis(20),
        }
    }

    fn rows_body() -> serde_json::Value {
        serde_json::json!({
            "rows": [
                {"cell": {"stock_nm": "Acme", "stock_cd": "01234", "list_dt2": "2030-01-10"}},
                {"cell": {"stock_nm": "Beta", "stock_cd": "05678", "apply_dt2": "2030-01-05"}}
            ]
        })
    }

    #[tokio::test]
    async fn test_fetch_parses_rows_and_saves_snapshot() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/data/new_stock/hkipo/")
                .query_param_exists("___jsl")
                .body_contains("rp=50");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(rows_body());
        });

        let storage = MockStorage::default();
        let client = IpoClient::new(options(&server), &SessionConfig::default()).unwrap();
        let records = client.fetch_records(&storage).await.unwrap();

        api_mock.assert();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].company_name, "Acme");
        assert_eq!(records[1].apply_date, "2030-01-05");

        let snapshot = storage.get_file(RAW_RESPONSE_FILE).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&snapshot).unwrap();
        assert_eq!(parsed["rows"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_sends_session_cookies() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/data/new_stock/hkipo/")
                .header("cookie", "kbzw__Session=tok123");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(rows_body());
        });

        let mut session = SessionConfig::default();
        session
            .cookies
            .insert("kbzw__Session".to_string(), "tok123".to_string());

        let storage = MockStorage::default();
        let client = IpoClient::new(options(&server), &session).unwrap();
        client.fetch_records(&storage).await.unwrap();

        api_mock.assert();
    }

    #[tokio::test]
    async fn test_exhausted_retries_degrade_to_empty() {
        // Scenario D schedule: initial attempt plus three retries, with
        // backoff sleeps of base, 2x base and 4x base in between.
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST).path("/data/new_stock/hkipo/");
            then.status(503);
        });

        let storage = MockStorage::default();
        let opts = options(&server);
        let base = opts.backoff_base;
        let client = IpoClient::new(opts, &SessionConfig::default()).unwrap();

        let started = std::time::Instant::now();
        let records = client.fetch_records(&storage).await.unwrap();
        let elapsed = started.elapsed();

        assert!(records.is_empty());
        assert_eq!(api_mock.hits(), 4);
        // 1 + 2 + 4 backoff units slept in total.
        assert!(elapsed >= base * 7, "elapsed {:?} too short", elapsed);
    }

    #[tokio::test]
    async fn test_malformed_body_fails_without_retry() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST).path("/data/new_stock/hkipo/");
            then.status(200).body("<html>session expired</html>");
        });

        let storage = MockStorage::default();
        let client = IpoClient::new(options(&server), &SessionConfig::default()).unwrap();
        let result = client.fetch_records(&storage).await;

        assert!(matches!(
            result,
            Err(CalError::DataContractError { .. })
        ));
        // Data-contract failures are not transient: exactly one request.
        assert_eq!(api_mock.hits(), 1);
        assert!(storage.get_file(RAW_RESPONSE_FILE).await.is_none());
    }

    #[tokio::test]
    async fn test_missing_rows_key_yields_empty_list() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/data/new_stock/hkipo/");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"page": 1}));
        });

        let storage = MockStorage::default();
        let client = IpoClient::new(options(&server), &SessionConfig::default()).unwrap();
        let records = client.fetch_records(&storage).await.unwrap();
        assert!(records.is_empty());
    }
}
