//! Solver client construction.
//!
//! A [`SolverClient`] is bound to one model type, one endpoint and one result
//! decoder. It holds no per-call state, so a single client can drive any
//! number of concurrent jobs.

use std::path::Path;
use std::sync::Arc;

use reqwest::header::HeaderMap;
use tracing::debug;

use crate::codec::Decoder;
use crate::config::EndpointConfig;
use crate::errors::{CoreError, CoreResult};
use crate::http::{protobuf_headers, ReqwestTransport, Transport};
use crate::polling::PollConfig;
use crate::registry::ModelRegistry;
use crate::urls;

/// Client for one model type's solve endpoint.
///
/// # Example
///
/// ```ignore
/// use icepack_core::{EndpointConfig, ModelRegistry, ProstDecoder, SolverClient};
///
/// let config = EndpointConfig::load("../config.json".as_ref())?;
/// let client = SolverClient::new(
///     "ivr7-kt461v8eoaif",
///     &config,
///     &ModelRegistry::icepack(),
///     ProstDecoder::<ivr7::SolutionResponse>::new(),
/// )?;
///
/// let job = client.post(&solve_request).await?;
/// let outcome = client.get(&job).await?;
/// ```
pub struct SolverClient<D> {
    pub(crate) model_type: String,
    pub(crate) base_uri: String,
    pub(crate) endpoint: String,
    pub(crate) headers: HeaderMap,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) decoder: D,
    pub(crate) poll: PollConfig,
}

impl<D: Decoder> SolverClient<D> {
    /// Create a client for `model_type`.
    ///
    /// Fails with [`CoreError::UnknownModelType`] before touching anything
    /// else if the tag is not registered.
    pub fn new(
        model_type: &str,
        config: &EndpointConfig,
        registry: &ModelRegistry,
        decoder: D,
    ) -> CoreResult<Self> {
        let suffix = registry.path_suffix(model_type)?;
        let base_uri = urls::normalize_base_uri(&config.base_uri)?;
        let endpoint = urls::join(&base_uri, suffix);
        let headers = protobuf_headers(&config.api_token).map_err(CoreError::from)?;

        debug!(model_type, endpoint = %endpoint, "created solver client");

        Ok(Self {
            model_type: model_type.to_string(),
            base_uri,
            endpoint,
            headers,
            transport: Arc::new(ReqwestTransport::shared()),
            decoder,
            poll: PollConfig::default(),
        })
    }

    /// Create a client from a config file.
    ///
    /// The tag is checked first. A missing file is replaced with a default
    /// and reported as [`CoreError::ConfigMissing`].
    pub fn from_config_file(
        model_type: &str,
        config_path: &Path,
        registry: &ModelRegistry,
        decoder: D,
    ) -> CoreResult<Self> {
        registry.path_suffix(model_type)?;
        let config = EndpointConfig::load(config_path)?;
        Self::new(model_type, &config, registry, decoder)
    }

    /// Replace the transport (tests, proxies, custom TLS).
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Use a dedicated connection pool with the given per-request timeout.
    pub fn with_request_timeout(mut self, timeout_secs: u64) -> CoreResult<Self> {
        self.transport = Arc::new(ReqwestTransport::new(timeout_secs)?);
        Ok(self)
    }

    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    pub fn model_type(&self) -> &str {
        &self.model_type
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// `base_uri` + the model type's path suffix.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn poll_config(&self) -> &PollConfig {
        &self.poll
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }
}

impl<D> std::fmt::Debug for SolverClient<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolverClient")
            .field("model_type", &self.model_type)
            .field("endpoint", &self.endpoint)
            .field("poll", &self.poll)
            .finish_non_exhaustive()
    }
}
