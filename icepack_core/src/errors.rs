//! Core error types for the icepack client.
//!
//! Every failure the core can report is a [`CoreError`] variant. A solver
//! that finishes by logging an error is *not* one of them: that is a normal
//! terminal outcome, see [`crate::jobs::JobOutcome::SolverError`].

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http::HttpError;

/// HTTP error details for non-2xx API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpErrorInfo {
    /// HTTP status code (e.g., 401, 500)
    pub status: u16,
    /// Request URL
    pub url: String,
    /// Short message (reason phrase or "request_failed")
    pub message: String,
    /// Diagnostic body returned by the server, if any
    pub body_snippet: Option<String>,
}

impl std::fmt::Display for HttpErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {} for {}: {}", self.status, self.url, self.message)?;
        if let Some(ref snippet) = self.body_snippet {
            let truncated: String = snippet.chars().take(200).collect();
            write!(f, " | body[0:200]={}", truncated)?;
        }
        Ok(())
    }
}

/// Unified error enum for the icepack core.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The configuration file did not exist; a default one was written.
    #[error(
        "config file not found: created a default at {}. please populate it with an apiToken",
        path.display()
    )]
    ConfigMissing { path: PathBuf },

    /// Configuration could not be read or is incomplete.
    #[error("config error: {0}")]
    Config(String),

    /// The model-type tag is not in the registry.
    #[error("model type not recognised: \"{tag}\". should be one of: {}", valid.join(", "))]
    UnknownModelType { tag: String, valid: Vec<String> },

    /// Polling was requested with an empty job handle.
    #[error(
        "empty request id: the job was never accepted. check the submission response \
         (the request may have failed, been rate limited, or the model type may not be \
         enabled for this api token)"
    )]
    EmptyRequestId,

    /// Invalid input provided
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// URL parsing failed
    #[error("url parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// HTTP request failed (network layer)
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP response error (non-2xx)
    #[error("{0}")]
    HttpResponse(HttpErrorInfo),

    /// Malformed envelope, solver response, or solution bytes
    #[error("decode error: {0}")]
    Decode(String),

    /// Malformed JSON where the API contract expects JSON
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Polling deadline expired
    #[error("timeout: {0}")]
    Timeout(String),

    /// Polling was cancelled by the caller
    #[error("cancelled: {0}")]
    Cancelled(String),
}

impl CoreError {
    /// Create an HTTP response error.
    pub fn http_response(status: u16, url: &str, message: &str, body: Option<&str>) -> Self {
        CoreError::HttpResponse(HttpErrorInfo {
            status,
            url: url.to_string(),
            message: message.to_string(),
            body_snippet: body.map(|s| s.chars().take(4096).collect()),
        })
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        CoreError::Config(message.into())
    }

    /// Create a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        CoreError::Decode(message.into())
    }

    /// Create a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        CoreError::Timeout(message.into())
    }

    /// Check if this is a configuration problem (missing or invalid file).
    pub fn is_config_error(&self) -> bool {
        matches!(self, CoreError::ConfigMissing { .. } | CoreError::Config(_))
    }

    /// Check if the caller may reasonably retry the whole operation (5xx, timeout, network).
    pub fn is_retryable(&self) -> bool {
        match self {
            CoreError::HttpResponse(info) => info.status >= 500,
            CoreError::Http(_) => true,
            CoreError::Timeout(_) => true,
            _ => false,
        }
    }

    /// Get HTTP status code if this is an HTTP error.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            CoreError::HttpResponse(info) => Some(info.status),
            CoreError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Server-provided diagnostic text, if this is a non-2xx response.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            CoreError::HttpResponse(info) => info.body_snippet.as_deref(),
            _ => None,
        }
    }
}

impl From<HttpError> for CoreError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Request(e) => CoreError::Http(e),
            HttpError::Response(detail) => CoreError::HttpResponse(HttpErrorInfo {
                status: detail.status,
                url: detail.url,
                message: detail.message,
                body_snippet: detail.body_snippet,
            }),
            HttpError::InvalidHeader(msg) => CoreError::InvalidInput(msg),
        }
    }
}

/// Result type alias using CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
