//! Async client for the query engine's HTTP statement protocol.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};

use super::error::{EngineError, EngineResult};
use super::protocol::{headers, QueryOutput, QueryResults, CLIENT_SOURCE, STATEMENT_PATH};
use crate::config::ConnectionConfig;

/// How often a busy coordinator (502/503/504) is retried before giving up.
const BUSY_RETRIES: u32 = 3;

/// Pause before retrying a busy coordinator.
const BUSY_BACKOFF: Duration = Duration::from_millis(200);

/// Async client for a Trino coordinator.
///
/// Each [`execute`](Self::execute) call submits one statement and follows
/// its `nextUri` chain until the statement finishes. The underlying HTTP
/// connection pool is shared by all calls.
///
/// # Example
///
/// ```ignore
/// use colscout::engine::EngineClient;
///
/// let client = EngineClient::with_timeout(config, Duration::from_secs(60))?;
/// let output = client.execute("SELECT * FROM dw.orders LIMIT 1").await?;
/// println!("{:?}", output.columns);
/// ```
#[derive(Debug, Clone)]
pub struct EngineClient {
    http: Client,
    config: ConnectionConfig,
    timeout: Duration,
}

impl EngineClient {
    /// Create a client with a per-request timeout.
    pub fn with_timeout(config: ConnectionConfig, timeout: Duration) -> EngineResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(EngineError::ClientBuild)?;

        Ok(Self {
            http,
            config,
            timeout,
        })
    }

    /// Run a statement to completion and return its columns and rows.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The coordinator cannot be reached (`Connection`/`Timeout`)
    /// - The engine reports a failure for the statement (`Query`)
    /// - A response is not a statement-protocol document (`Protocol`)
    pub async fn execute(&self, sql: &str) -> EngineResult<QueryOutput> {
        let url = format!("{}{}", self.config.base_url(), STATEMENT_PATH);
        let submit = || self.authorized(self.http.post(&url)).body(sql.to_string());
        let mut page = self.send(submit).await?;
        tracing::debug!(query_id = %page.id, "statement submitted");

        let mut output = QueryOutput::default();
        loop {
            if let Some(error) = page.error.take() {
                if let Some(next_uri) = page.next_uri.as_deref() {
                    self.cancel(next_uri).await;
                }
                return Err(EngineError::query(
                    error.error_name.unwrap_or_else(|| "UNKNOWN".to_string()),
                    error.message,
                ));
            }

            if output.columns.is_empty() {
                if let Some(columns) = page.columns.take() {
                    output.columns = columns.into_iter().map(|c| c.name).collect();
                }
            }
            if let Some(rows) = page.data.take() {
                output.rows.extend(rows);
            }

            let Some(next_uri) = page.next_uri.take() else {
                break;
            };
            page = self
                .send(|| self.authorized(self.http.get(&next_uri)))
                .await?;
        }

        if output.columns.is_empty() {
            return Err(EngineError::Protocol(format!(
                "statement {} finished without column metadata",
                page.id
            )));
        }

        Ok(output)
    }

    /// Ask the coordinator to abandon a statement. Failures are only logged.
    async fn cancel(&self, next_uri: &str) {
        if let Err(e) = self.authorized(self.http.delete(next_uri)).send().await {
            tracing::debug!(error = %e, "failed to cancel statement");
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .basic_auth(&self.config.user, Some(&self.config.password))
            .header(headers::USER, &self.config.user)
            .header(headers::CATALOG, &self.config.catalog)
            .header(headers::SOURCE, CLIENT_SOURCE)
    }

    /// Send a request, retrying while the coordinator reports it is busy.
    async fn send<F>(&self, build: F) -> EngineResult<QueryResults>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0;
        loop {
            let response = build().send().await.map_err(|e| self.transport_error(e))?;
            let status = response.status();

            if is_busy(status) && attempt < BUSY_RETRIES {
                attempt += 1;
                tokio::time::sleep(BUSY_BACKOFF * attempt).await;
                continue;
            }

            return self.read_page(response).await;
        }
    }

    async fn read_page(&self, response: Response) -> EngineResult<QueryResults> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(EngineError::Connection {
                message: format!("authentication rejected for user {} ({})", self.config.user, status),
                source: None,
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Protocol(format!(
                "HTTP {}: {}",
                status,
                body.trim()
            )));
        }

        response
            .json::<QueryResults>()
            .await
            .map_err(|e| EngineError::Protocol(format!("malformed statement response: {}", e)))
    }

    fn transport_error(&self, error: reqwest::Error) -> EngineError {
        if error.is_timeout() {
            EngineError::Timeout(self.timeout.as_secs())
        } else {
            EngineError::connection(error)
        }
    }
}

fn is_busy(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT
    )
}
