use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

use crate::{
    error::{AppError, AppResult},
    models::{FetchResult, FAILED_TO_LOAD_MOVIES, UNREADABLE_RESPONSE},
    services::{
        http_transport::{HttpTransport, TransportResponse, UpstreamRequest},
        retry::{is_retryable_status, RetryPolicy},
    },
};

/// Status reported when every attempt failed before any response arrived
pub const CONNECTION_FAILURE_STATUS: u16 = 503;

/// Status reported when the upstream answered 200 with a body that is not JSON
pub const MALFORMED_RESPONSE_STATUS: u16 = 502;

/// GET client that retries transient upstream failures with exponential backoff.
///
/// Holds no per-call state, so one instance can serve concurrent callers.
/// Upstream and network failures always come back as [`FetchResult::Failure`];
/// only a misconfigured request is returned as an error.
pub struct ResilientFetcher {
    transport: Arc<dyn HttpTransport>,
    policy: RetryPolicy,
}

impl ResilientFetcher {
    pub fn new(transport: Arc<dyn HttpTransport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    #[instrument(skip(self, request), fields(url = %request.url))]
    pub async fn fetch(&self, request: &UpstreamRequest) -> AppResult<FetchResult> {
        reqwest::Url::parse(&request.url).map_err(|e| {
            AppError::Configuration(format!("Invalid upstream URL {:?}: {}", request.url, e))
        })?;

        let mut retry = 0;
        loop {
            let attempt = retry + 1;

            let (cause, status, retry_after) = match self.transport.get(request).await {
                Ok(response) if is_retryable_status(response.status) => (
                    format!("status {}", response.status),
                    response.status,
                    response.retry_after,
                ),
                Ok(response) => {
                    tracing::info!(attempt, status = response.status, "Upstream responded");
                    return Ok(into_fetch_result(response));
                }
                Err(error) if error.is_transient() => {
                    (error.to_string(), CONNECTION_FAILURE_STATUS, None)
                }
                Err(error) => return Err(AppError::Configuration(error.to_string())),
            };

            if retry >= self.policy.max_retries {
                tracing::warn!(
                    attempts = attempt,
                    cause = %cause,
                    status,
                    "Upstream retry budget exhausted"
                );
                return Ok(FetchResult::failure(FAILED_TO_LOAD_MOVIES, status));
            }

            retry += 1;
            let delay = self.policy.delay_for(retry, retry_after);
            tracing::warn!(
                attempt,
                cause = %cause,
                delay_ms = delay.as_millis() as u64,
                "Upstream attempt failed, backing off"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

fn into_fetch_result(response: TransportResponse) -> FetchResult {
    if response.status != 200 {
        return FetchResult::failure(FAILED_TO_LOAD_MOVIES, response.status);
    }

    match serde_json::from_slice::<Value>(&response.body) {
        Ok(payload) => FetchResult::Success(payload),
        Err(e) => {
            tracing::warn!(error = %e, "Upstream returned a body that is not JSON");
            FetchResult::failure(UNREADABLE_RESPONSE, MALFORMED_RESPONSE_STATUS)
        }
    }
}
