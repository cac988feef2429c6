//! Endpoint configuration.
//!
//! The client reads `{ "endpoint": ..., "apiToken": ... }` from a JSON file
//! once, at construction. A missing file is replaced by a default one so the
//! user only has to paste a token in.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::{CoreError, CoreResult};
use crate::utils;

/// Path the example programs use, relative to their working directory.
pub const DEFAULT_CONFIG_PATH: &str = "../config.json";

/// Hosted API base URI written into a fresh config file.
pub const DEFAULT_ENDPOINT: &str = "https://api.icepack.ai/";

/// Environment variable overriding the config file's endpoint.
pub const ENV_ENDPOINT: &str = "ICEPACK_ENDPOINT";

/// Environment variable overriding the config file's token.
pub const ENV_API_TOKEN: &str = "ICEPACK_API_TOKEN";

/// Base URI and credentials for the solve API.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(rename = "endpoint", default)]
    pub base_uri: String,
    #[serde(rename = "apiToken", default)]
    pub api_token: String,
}

impl std::fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("base_uri", &self.base_uri)
            .field("api_token", &utils::mask_str(&self.api_token))
            .finish()
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_uri: DEFAULT_ENDPOINT.to_string(),
            api_token: String::new(),
        }
    }
}

impl EndpointConfig {
    pub fn new(base_uri: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            base_uri: base_uri.into(),
            api_token: api_token.into(),
        }
    }

    /// Load and validate a config file.
    ///
    /// If `path` does not exist, a default file (empty `apiToken`) is written
    /// there and [`CoreError::ConfigMissing`] is returned.
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            Self::write_default(path)?;
            warn!(path = %path.display(), "config file not found, wrote a default one");
            return Err(CoreError::ConfigMissing {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path)
            .map_err(|e| CoreError::config(format!("failed to read {}: {}", path.display(), e)))?;
        let config = Self::parse(&content)?;
        config.validate()?;
        info!(path = %path.display(), endpoint = %config.base_uri, "loaded endpoint config");
        Ok(config)
    }

    /// Like [`EndpointConfig::load`], but lets `ICEPACK_ENDPOINT` and
    /// `ICEPACK_API_TOKEN` fill in or replace file values before validation.
    pub fn load_with_env(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            let from_env = Self::default().with_env_overrides();
            if from_env.validate().is_ok() {
                return Ok(from_env);
            }
            return Self::load(path);
        }
        let content = fs::read_to_string(path)
            .map_err(|e| CoreError::config(format!("failed to read {}: {}", path.display(), e)))?;
        let config = Self::parse(&content)?.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse config JSON without validating it.
    pub fn parse(content: &str) -> CoreResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| CoreError::config(format!("invalid config JSON: {}", e)))
    }

    /// Write the default config to `path`.
    pub fn write_default(path: &Path) -> CoreResult<()> {
        utils::write_private_json(path, &Self::default()).map_err(|e| {
            CoreError::config(format!(
                "failed to write default config to {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Reject configs the API would refuse anyway.
    pub fn validate(&self) -> CoreResult<()> {
        if self.base_uri.trim().is_empty() {
            return Err(CoreError::config(
                "a valid endpoint should be provided in the config file",
            ));
        }
        if self.api_token.trim().is_empty() {
            return Err(CoreError::config(
                "invalid apiToken in the config file: please update it with a valid token",
            ));
        }
        Ok(())
    }

    /// Replace fields with non-empty `ICEPACK_ENDPOINT` / `ICEPACK_API_TOKEN` values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(endpoint) = env_non_empty(ENV_ENDPOINT) {
            self.base_uri = endpoint;
        }
        if let Some(token) = env_non_empty(ENV_API_TOKEN) {
            self.api_token = token;
        }
        self
    }

    pub fn api_token_masked(&self) -> String {
        utils::mask_str(&self.api_token)
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let err = EndpointConfig::load(&path).unwrap_err();
        match err {
            CoreError::ConfigMissing { path: p } => assert_eq!(p, path),
            other => panic!("unexpected error: {other:?}"),
        }

        let written = EndpointConfig::parse(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.api_token, "");
        assert_eq!(written.base_uri, DEFAULT_ENDPOINT);

        // second load finds the file but the token is still empty
        let err = EndpointConfig::load(&path).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn test_load_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"endpoint": "http://localhost:9000/", "apiToken": "abc123"}"#,
        )
        .unwrap();

        let config = EndpointConfig::load(&path).unwrap();
        assert_eq!(config.base_uri, "http://localhost:9000/");
        assert_eq!(config.api_token, "abc123");
    }

    #[test]
    fn test_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        let err = EndpointConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("invalid config JSON"));
    }

    #[test]
    fn test_empty_endpoint_rejected() {
        let config = EndpointConfig::new("", "tok");
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));
    }

    #[test]
    fn test_debug_masks_token() {
        let config = EndpointConfig::new("http://x/", "super-secret-token");
        let dbg = format!("{config:?}");
        assert!(!dbg.contains("super-secret-token"));
        assert!(dbg.contains("super-se..."));
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(EndpointConfig::default()).unwrap();
        assert_eq!(json["endpoint"], DEFAULT_ENDPOINT);
        assert_eq!(json["apiToken"], "");
    }
}
