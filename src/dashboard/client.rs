//! HTTP client for the ingest and query endpoints.
use crate::types::{ErrorResponse, IngestRequest, IngestResponse, LogsResponse};
use anyhow::{anyhow, Result};
use std::time::Duration;
use tracing::debug;

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    ingest_url: String,
    query_url: String,
}

impl ApiClient {
    pub fn new(ingest_url: String, query_url: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            ingest_url,
            query_url,
        })
    }

    /// Fetches the most recent log entries.
    pub async fn fetch_logs(&self) -> Result<LogsResponse> {
        debug!("Fetching logs from {}", self.query_url);
        let response = self.http.get(&self.query_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!("Fetch logs error body: {}", body);
            return Err(anyhow!("Failed to fetch logs: {}", status));
        }

        Ok(response.json().await?)
    }

    /// Submits a new log entry.
    ///
    /// On rejection the error carries the server's `error` text when the body
    /// has one.
    pub async fn submit(&self, request: &IngestRequest) -> Result<IngestResponse> {
        debug!("Submitting log to {}", self.ingest_url);
        let response = self.http.post(&self.ingest_url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(err) => anyhow!(err.error),
                Err(_) => anyhow!("Failed to submit log: {}", status),
            });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{IngestService, QueryService};
    use crate::storage::SledLogStore;
    use crate::types::Severity;
    use crate::web::{build_router, Backend};
    use std::sync::Arc;
    use tempfile::{tempdir, TempDir};
    use tokio::task::JoinHandle;

    async fn start_server() -> (TempDir, String, JoinHandle<()>) {
        let dir = tempdir().unwrap();
        let db = sled::open(dir.path()).unwrap();
        let store = Arc::new(SledLogStore::new(db, "logs").unwrap());
        let app = build_router(Arc::new(Backend {
            ingest: IngestService::new(store.clone(), 1000),
            query: QueryService::new(store),
        }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (dir, format!("http://{}/api/logs", addr), handle)
    }

    #[tokio::test]
    async fn submit_and_fetch_against_live_server() {
        let (_dir, url, _srv) = start_server().await;
        let client = ApiClient::new(url.clone(), url).unwrap();

        let receipt = client
            .submit(&IngestRequest {
                severity: Some("warning".to_string()),
                message: Some("queue backing up".to_string()),
            })
            .await
            .unwrap();
        assert!(receipt.success);

        let logs = client.fetch_logs().await.unwrap();
        assert_eq!(logs.count, 1);
        assert_eq!(logs.logs[0].id, receipt.id);
        assert_eq!(logs.logs[0].severity, Severity::Warning);
    }

    #[tokio::test]
    async fn rejection_surfaces_server_error_text() {
        let (_dir, url, _srv) = start_server().await;
        let client = ApiClient::new(url.clone(), url).unwrap();

        let err = client
            .submit(&IngestRequest {
                severity: Some("critical".to_string()),
                message: Some("x".to_string()),
            })
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid severity. Must be one of: info, warning, error"
        );
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_an_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/api/logs", listener.local_addr().unwrap());
        drop(listener);

        let client = ApiClient::new(url.clone(), url).unwrap();
        assert!(client.fetch_logs().await.is_err());
    }
}
