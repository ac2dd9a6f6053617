/// HTTP transport abstraction for upstream calls
///
/// The fetcher never talks to `reqwest` directly. It issues requests through
/// [`HttpTransport`] so that tests can script statuses and bodies without
/// network access.
use reqwest::{header::RETRY_AFTER, Client as HttpClient};
use std::{fmt, time::Duration};

/// HTTP Basic credentials for an upstream
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: Option<String>,
}

impl fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// A GET request against an upstream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    pub url: String,
    pub credentials: Option<BasicCredentials>,
    /// When false, the upstream certificate is not verified. This leaves the
    /// connection open to interception and is only meant for self-signed
    /// upstreams.
    pub verify_tls: bool,
}

/// Raw response of a single attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
    /// Parsed `Retry-After` header, when the upstream sent one in seconds
    pub retry_after: Option<Duration>,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
            retry_after: None,
        }
    }

    pub fn with_retry_after(mut self, retry_after: Duration) -> Self {
        self.retry_after = Some(retry_after);
        self
    }
}

/// Failure of a single attempt before a complete response was received
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Refused, reset, DNS failure or a body that could not be read
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl TransportError {
    /// Connection-level failures are worth another attempt
    pub fn is_transient(&self) -> bool {
        matches!(self, TransportError::Timeout(_) | TransportError::Connect(_))
    }
}

/// Issues single GET attempts. Retrying is the caller's job.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, request: &UpstreamRequest) -> Result<TransportResponse, TransportError>;
}

/// [`HttpTransport`] backed by `reqwest`.
///
/// Keeps one pooled client per certificate-verification mode.
#[derive(Clone)]
pub struct ReqwestTransport {
    verifying: HttpClient,
    insecure: HttpClient,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let verifying = HttpClient::builder().timeout(timeout).build()?;
        let insecure = HttpClient::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self {
            verifying,
            insecure,
        })
    }

    fn client_for(&self, request: &UpstreamRequest) -> &HttpClient {
        if request.verify_tls {
            &self.verifying
        } else {
            tracing::debug!(url = %request.url, "TLS certificate verification disabled");
            &self.insecure
        }
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, request: &UpstreamRequest) -> Result<TransportResponse, TransportError> {
        let mut builder = self.client_for(request).get(&request.url);
        if let Some(credentials) = &request.credentials {
            builder = builder.basic_auth(&credentials.username, credentials.password.as_ref());
        }

        let response = builder.send().await.map_err(classify_error)?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|h| h.to_str().ok())
            .and_then(parse_retry_after);

        let body = response.bytes().await.map_err(classify_error)?.to_vec();

        Ok(TransportResponse {
            status,
            body,
            retry_after,
        })
    }
}

fn classify_error(error: reqwest::Error) -> TransportError {
    if error.is_builder() {
        TransportError::InvalidRequest(error.to_string())
    } else if error.is_timeout() {
        TransportError::Timeout(error.to_string())
    } else {
        TransportError::Connect(error.to_string())
    }
}

/// Parses the delta-seconds form of `Retry-After`. HTTP dates are ignored.
fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
