//! HTTP-backed control-plane client with retries

use crate::query::{extract_output, ControlPlaneQuery, QueryRequest};
use crate::retry::RetryConfig;
use crate::{PlatformError, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// Control-plane client issuing queries over HTTP.
///
/// The control plane is a network dependency and may transiently fail;
/// calls are retried with exponential backoff before the failure is
/// surfaced to the caller.
pub struct HttpControlPlane {
    client: reqwest::Client,
    endpoint: String,
    retry: RetryConfig,
}

impl HttpControlPlane {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_retry(endpoint, RetryConfig::default())
    }

    pub fn with_retry(endpoint: impl Into<String>, retry: RetryConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            client,
            endpoint: endpoint.into(),
            retry,
        }
    }

    async fn attempt(&self, request: &QueryRequest) -> Result<Value> {
        let body = json!({
            "Service": request.service,
            "Action": request.action,
            "Parameters": request.parameters,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-idempotency-key", &request.idempotency_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlatformError::Status(status.as_u16()));
        }

        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl ControlPlaneQuery for HttpControlPlane {
    async fn query(&self, request: &QueryRequest) -> Result<Option<Value>> {
        let mut last_error = None;

        for retry_count in 0..=self.retry.max_retries {
            if retry_count > 0 {
                let backoff = self.retry.backoff_duration(retry_count - 1);
                warn!(
                    action = %request.action,
                    retry = retry_count,
                    backoff_ms = backoff.as_millis() as u64,
                    "Retrying control plane query"
                );
                tokio::time::sleep(backoff).await;
            }

            match self.attempt(request).await {
                Ok(response) => {
                    debug!(
                        action = %request.action,
                        output_path = %request.output_path,
                        "Control plane query succeeded"
                    );
                    return Ok(extract_output(&response, &request.output_path));
                }
                Err(error) if error.is_retryable() => {
                    last_error = Some(error);
                }
                Err(error) => return Err(error),
            }
        }

        Err(PlatformError::RetriesExhausted {
            attempts: self.retry.max_retries + 1,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn interface_query(index: usize) -> QueryRequest {
        QueryRequest {
            service: "EC2".to_string(),
            action: "DescribeNetworkInterfaces".to_string(),
            parameters: json!({ "NetworkInterfaceIds": ["eni-01", "eni-02"] }),
            output_path: format!("NetworkInterfaces.{index}.PrivateIpAddress"),
            idempotency_key: format!("NetworkInterfaces.{index}.PrivateIpAddress"),
        }
    }

    fn interfaces_response() -> serde_json::Value {
        json!({
            "NetworkInterfaces": [
                { "PrivateIpAddress": "10.0.1.5" },
                { "PrivateIpAddress": "10.0.2.9" },
            ]
        })
    }

    #[tokio::test]
    async fn test_query_extracts_output_path() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(header("x-idempotency-key", "NetworkInterfaces.1.PrivateIpAddress"))
            .respond_with(ResponseTemplate::new(200).set_body_json(interfaces_response()))
            .mount(&server)
            .await;

        let control = HttpControlPlane::new(server.uri());
        let value = control.query(&interface_query(1)).await.unwrap();

        assert_eq!(value, Some(json!("10.0.2.9")));
    }

    #[tokio::test]
    async fn test_query_missing_index_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(interfaces_response()))
            .mount(&server)
            .await;

        let control = HttpControlPlane::new(server.uri());
        let value = control.query(&interface_query(2)).await.unwrap();

        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn test_query_retries_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(interfaces_response()))
            .mount(&server)
            .await;

        let retry = RetryConfig {
            max_retries: 2,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(5),
        };
        let control = HttpControlPlane::with_retry(server.uri(), retry);
        let value = control.query(&interface_query(0)).await.unwrap();

        assert_eq!(value, Some(json!("10.0.1.5")));
    }

    #[tokio::test]
    async fn test_query_client_error_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&server)
            .await;

        let control = HttpControlPlane::new(server.uri());
        let error = control.query(&interface_query(0)).await.unwrap_err();

        assert!(matches!(error, PlatformError::Status(403)));
    }

    #[tokio::test]
    async fn test_query_exhausts_retries() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let retry = RetryConfig {
            max_retries: 1,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(2),
        };
        let control = HttpControlPlane::with_retry(server.uri(), retry);
        let error = control.query(&interface_query(0)).await.unwrap_err();

        assert!(matches!(
            error,
            PlatformError::RetriesExhausted { attempts: 2, .. }
        ));
    }
}
