//! HTTP transport for the solve API.
//!
//! The solve API speaks protobuf envelopes over plain HTTP with an
//! `Authorization: Apitoken <token>` header. The [`Transport`] trait is the
//! seam between the solver client and the network: production code uses
//! [`ReqwestTransport`], tests script their own.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use thiserror::Error;
use tracing::debug;

use crate::shared_client::{try_build_pooled_client, SHARED_CLIENT};

/// Media type of every envelope sent to or received from the API.
pub const PROTOBUF_CONTENT_TYPE: &str = "application/protobuf";

/// Authorization scheme used by the API.
pub const AUTH_SCHEME: &str = "Apitoken";

/// HTTP error details.
#[derive(Debug, Clone)]
pub struct HttpErrorDetail {
    pub status: u16,
    pub url: String,
    pub message: String,
    pub body_snippet: Option<String>,
}

impl std::fmt::Display for HttpErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {} for {}: {}", self.status, self.url, self.message)?;
        if let Some(ref snippet) = self.body_snippet {
            let truncated: String = snippet.chars().take(200).collect();
            write!(f, " | body[0:200]={}", truncated)?;
        }
        Ok(())
    }
}

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request failed: {0} (is_connect={}, is_timeout={})", .0.is_connect(), .0.is_timeout())]
    Request(#[from] reqwest::Error),

    #[error("{0}")]
    Response(HttpErrorDetail),

    #[error("invalid header: {0}")]
    InvalidHeader(String),
}

impl HttpError {
    /// Create an HTTP error from a non-2xx response.
    pub fn from_response(status: u16, url: &str, body: Option<&str>) -> Self {
        let body_snippet = body.map(|s| s.chars().take(4096).collect());
        HttpError::Response(HttpErrorDetail {
            status,
            url: url.to_string(),
            message: reason_phrase(status).to_string(),
            body_snippet,
        })
    }

    /// Get the HTTP status code, if available.
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Response(detail) => Some(detail.status),
            HttpError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

fn reason_phrase(status: u16) -> &'static str {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("request_failed")
}

/// A single request handed to a [`Transport`].
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

/// A fully-read response.
///
/// The body is already buffered, so no connection outlives the call that
/// produced this value.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Bytes,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Return the body for 2xx responses, or an [`HttpError::Response`]
    /// carrying the server's diagnostic text.
    pub fn into_success_body(self, url: &str) -> Result<Bytes, HttpError> {
        if self.is_success() {
            return Ok(self.body);
        }
        let text = String::from_utf8_lossy(&self.body);
        Err(HttpError::from_response(
            self.status,
            url,
            if text.trim().is_empty() { None } else { Some(&text) },
        ))
    }
}

/// Executes one HTTP exchange.
///
/// Implementations must read the whole response body before returning and
/// must not keep per-call state between invocations.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, HttpError>;
}

/// Build the three headers every API call carries.
pub fn protobuf_headers(api_token: &str) -> Result<HeaderMap, HttpError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(PROTOBUF_CONTENT_TYPE));
    headers.insert(ACCEPT, HeaderValue::from_static(PROTOBUF_CONTENT_TYPE));
    let auth_value = format!("{} {}", AUTH_SCHEME, api_token);
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&auth_value)
            .map_err(|_| HttpError::InvalidHeader("invalid api token characters".to_string()))?,
    );
    Ok(headers)
}

/// [`Transport`] backed by a pooled `reqwest::Client`.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with its own connection pool.
    ///
    /// # Arguments
    ///
    /// * `timeout_secs` - Per-request timeout in seconds
    pub fn new(timeout_secs: u64) -> Result<Self, HttpError> {
        let client = try_build_pooled_client(Some(timeout_secs))?;
        Ok(Self { client })
    }

    /// Create a transport that shares the process-wide pool.
    pub fn shared() -> Self {
        Self {
            client: SHARED_CLIENT.clone(),
        }
    }

    /// Wrap an existing client (e.g. one configured with a proxy).
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, HttpError> {
        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            debug!(url = %request.url, bytes = body.len(), "sending request body");
            builder = builder.body(body);
        }

        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await?;
        debug!(url = %request.url, status, bytes = body.len(), "received response");
        Ok(TransportResponse { status, body })
    }
}
