//! # Icepack SDK
//!
//! Ergonomic Rust SDK for the Icepack optimisation API.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use icepack::Icepack;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), icepack::Error> {
//!     icepack::init_tracing();
//!
//!     // Reads ../config.json (or $ICEPACK_CONFIG)
//!     let icepack = Icepack::from_default_config()?;
//!
//!     let solution: tsp::SolutionResponse = icepack
//!         .solve("tsp-mcvfz472gty6", &tsp_request)
//!         .await?;
//!
//!     println!("tour length: {}", solution.objective);
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use prost::Message;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

// Re-export core for advanced usage
pub use icepack_core as core;

// Re-export commonly used core types
pub use icepack_core::{
    prost, CoreError, Decoder, EndpointConfig, FnDecoder, JobHandle, JobOutcome, JobStatus,
    ModelRegistry, PollConfig, ProstDecoder, RawDecoder, SolveState, SolverClient, SolverInfo,
    SolverMessageType, SolverResponse, Transport, DEFAULT_CONFIG_PATH,
};

/// SDK version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default Icepack API base URL.
pub const DEFAULT_BASE_URL: &str = icepack_core::DEFAULT_ENDPOINT;

/// Environment variable pointing at the config file.
pub const CONFIG_ENV: &str = "ICEPACK_CONFIG";

// =============================================================================
// Error Types
// =============================================================================

/// SDK error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Core error passthrough.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The solver finished with an error log entry.
    #[error("job failed: {message}")]
    JobFailed {
        message: String,
        logs: Vec<SolverInfo>,
    },

    /// The solver finished without returning a solution.
    #[error("job completed without a solution")]
    NoSolution,

    /// Reading or writing a local file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Install a `tracing` subscriber that honours `RUST_LOG` (default `info`).
///
/// Does nothing if a global subscriber is already set.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

// =============================================================================
// Main Client
// =============================================================================

/// Main Icepack client.
///
/// Holds the endpoint config and the model registry, and hands out
/// [`SolverClient`]s bound to a model type.
///
/// # Example
///
/// ```rust,ignore
/// use icepack::Icepack;
///
/// let icepack = Icepack::from_config_file("../config.json")?;
///
/// // Or with explicit credentials
/// let icepack = Icepack::new(EndpointConfig::new("https://api.icepack.ai/", "..."));
/// ```
#[derive(Clone)]
pub struct Icepack {
    config: EndpointConfig,
    registry: ModelRegistry,
    poll: PollConfig,
    transport: Option<Arc<dyn Transport>>,
}

impl Icepack {
    /// Create a client with explicit endpoint settings.
    ///
    /// The config is taken as-is; a bad endpoint surfaces when the first
    /// solver client is built.
    pub fn new(config: EndpointConfig) -> Self {
        Self {
            config,
            registry: ModelRegistry::icepack(),
            poll: PollConfig::default(),
            transport: None,
        }
    }

    /// Load endpoint settings from a JSON config file.
    ///
    /// A missing file is replaced with a default one and reported as
    /// [`CoreError::ConfigMissing`].
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self> {
        let config = EndpointConfig::load(path.as_ref())?;
        Ok(Self::new(config))
    }

    /// Load from `$ICEPACK_CONFIG`, falling back to [`DEFAULT_CONFIG_PATH`].
    ///
    /// `ICEPACK_ENDPOINT` and `ICEPACK_API_TOKEN` override the file values.
    pub fn from_default_config() -> Result<Self> {
        let path = default_config_path();
        info!(path = %path.display(), "loading icepack config");
        let config = EndpointConfig::load_with_env(&path)?;
        Ok(Self::new(config))
    }

    /// Replace the built-in model table.
    pub fn with_registry(mut self, registry: ModelRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Poll settings for every client this instance creates.
    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Route every request through `transport` instead of the shared pool.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Get the API token (masked for display).
    pub fn api_token_masked(&self) -> String {
        self.config.api_token_masked()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.config.base_uri
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Client for `model_type` whose solutions decode as `M`.
    pub fn client<M: Message + Default>(
        &self,
        model_type: &str,
    ) -> Result<SolverClient<ProstDecoder<M>>> {
        self.client_with(model_type, ProstDecoder::new())
    }

    /// Client for `model_type` that returns solution bytes untouched.
    pub fn raw_client(&self, model_type: &str) -> Result<SolverClient<RawDecoder>> {
        self.client_with(model_type, RawDecoder)
    }

    /// Client for `model_type` with a custom decoder.
    pub fn client_with<D: Decoder>(&self, model_type: &str, decoder: D) -> Result<SolverClient<D>> {
        let client = SolverClient::new(model_type, &self.config, &self.registry, decoder)?
            .with_poll_config(self.poll.clone());
        Ok(match &self.transport {
            Some(transport) => client.with_transport(transport.clone()),
            None => client,
        })
    }

    // -------------------------------------------------------------------------
    // High-level API
    // -------------------------------------------------------------------------

    /// Submit `request` and wait for its solution.
    ///
    /// A solver error log becomes [`Error::JobFailed`] and a completed job
    /// without a payload becomes [`Error::NoSolution`]. Use
    /// [`Icepack::client`] directly to inspect those outcomes instead.
    pub async fn solve<R, M>(&self, model_type: &str, request: &R) -> Result<M>
    where
        R: Message,
        M: Message + Default,
    {
        self.solve_with_cancel(model_type, request, &CancellationToken::new())
            .await
    }

    /// Like [`Icepack::solve`], but gives up once `cancel` fires.
    pub async fn solve_with_cancel<R, M>(
        &self,
        model_type: &str,
        request: &R,
        cancel: &CancellationToken,
    ) -> Result<M>
    where
        R: Message,
        M: Message + Default,
    {
        let client = self.client::<M>(model_type)?;
        let job = client.post(request).await?;
        let outcome = client.get_with_cancel(&job, cancel).await?;
        into_solution(outcome)
    }

    /// Upload a data payload (e.g. a matrix or vehicle-router data set).
    ///
    /// Data uploads are processed asynchronously; only the handle is returned.
    pub async fn upload_data(&self, model_type: &str, content: Vec<u8>) -> Result<JobHandle> {
        let client = self.raw_client(model_type)?;
        Ok(client.post_bytes(content).await?)
    }
}

impl std::fmt::Debug for Icepack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Icepack")
            .field("config", &self.config)
            .field("models", &self.registry.len())
            .field("poll", &self.poll)
            .finish_non_exhaustive()
    }
}

/// Turn a terminal outcome into its solution, or the matching [`Error`].
pub fn into_solution<T>(outcome: JobOutcome<T>) -> Result<T> {
    match outcome {
        JobOutcome::Solved(value) => Ok(value),
        JobOutcome::NoSolution => Err(Error::NoSolution),
        JobOutcome::SolverError { message, logs, .. } => Err(Error::JobFailed { message, logs }),
    }
}

fn default_config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use icepack_core::http::HttpError;
    use icepack_core::{ProblemEnvelope, TransportRequest, TransportResponse};

    use super::*;

    #[derive(Clone, PartialEq, Message)]
    struct Tour {
        #[prost(uint32, repeated, tag = "1")]
        order: Vec<u32>,
    }

    #[derive(Default)]
    struct Canned {
        responses: Mutex<VecDeque<TransportResponse>>,
        urls: Mutex<Vec<String>>,
    }

    impl Canned {
        fn with(responses: Vec<TransportResponse>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                urls: Mutex::default(),
            })
        }
    }

    #[async_trait]
    impl Transport for Canned {
        async fn execute(
            &self,
            request: TransportRequest,
        ) -> std::result::Result<TransportResponse, HttpError> {
            self.urls.lock().unwrap().push(request.url);
            Ok(self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected request"))
        }
    }

    fn poll(response: SolverResponse) -> TransportResponse {
        let envelope = ProblemEnvelope::solution("tsp-mcvfz472gty6", &response);
        TransportResponse::new(200, envelope.encode_to_vec())
    }

    fn submitted() -> TransportResponse {
        TransportResponse::new(200, r#"{"requestid":"req-7"}"#)
    }

    fn icepack() -> Icepack {
        Icepack::new(EndpointConfig::new("http://solver.test", "tok"))
    }

    #[test]
    fn test_client_endpoints() {
        let icepack = icepack();
        let client = icepack.client::<Tour>("tsp-mcvfz472gty6").unwrap();
        assert_eq!(client.endpoint(), "http://solver.test/vehicle-router/solve/");
        let raw = icepack.raw_client("ivrdata-o43e0dvs78zq").unwrap();
        assert_eq!(raw.endpoint(), "http://solver.test/vehicle-router/data/");
    }

    #[test]
    fn test_unknown_model_type() {
        let err = icepack().raw_client("tsp").unwrap_err();
        match err {
            Error::Core(CoreError::UnknownModelType { tag, valid }) => {
                assert_eq!(tag, "tsp");
                assert!(valid.contains(&"tsp-mcvfz472gty6".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_custom_registry() {
        let icepack = icepack().with_registry(ModelRegistry::new().with_model("demo-echo", "echo/"));
        assert_eq!(
            icepack.raw_client("demo-echo").unwrap().endpoint(),
            "http://solver.test/echo/"
        );
        assert!(icepack.raw_client("tsp-mcvfz472gty6").is_err());
    }

    #[test]
    fn test_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let err = Icepack::from_config_file(&path).unwrap_err();
        assert!(matches!(err, Error::Core(CoreError::ConfigMissing { .. })));
        assert!(path.exists());

        std::fs::write(&path, r#"{"endpoint":"https://api.icepack.ai/","apiToken":"abcdefghijkl"}"#)
            .unwrap();
        let icepack = Icepack::from_config_file(&path).unwrap();
        assert_eq!(icepack.base_url(), DEFAULT_BASE_URL);
        assert_eq!(icepack.api_token_masked(), "abcdefgh...");
        assert!(!format!("{icepack:?}").contains("abcdefghijkl"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_solve_returns_solution() {
        let transport = Canned::with(vec![
            submitted(),
            poll(SolverResponse {
                state: SolveState::Running as i32,
                logs: vec![SolverInfo::new(SolverMessageType::Info, 0, "optimising")],
                solution: None,
            }),
            poll(SolverResponse {
                state: SolveState::Completed as i32,
                logs: vec![],
                solution: Some(Tour { order: vec![0, 2, 1] }.encode_to_vec()),
            }),
        ]);
        let icepack = icepack().with_transport(transport.clone());

        let tour: Tour = icepack
            .solve("tsp-mcvfz472gty6", &Tour { order: vec![] })
            .await
            .unwrap();
        assert_eq!(tour.order, vec![0, 2, 1]);
        assert_eq!(
            *transport.urls.lock().unwrap(),
            vec![
                "http://solver.test/vehicle-router/solve/",
                "http://solver.test/vehicle-router/solve/req-7",
                "http://solver.test/vehicle-router/solve/req-7",
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_solve_maps_solver_error() {
        let transport = Canned::with(vec![
            submitted(),
            poll(SolverResponse {
                state: SolveState::Running as i32,
                logs: vec![SolverInfo::new(SolverMessageType::Error, 0, "bad input")],
                solution: None,
            }),
        ]);
        let icepack = icepack().with_transport(transport);

        let err = icepack
            .solve::<Tour, Tour>("tsp-mcvfz472gty6", &Tour::default())
            .await
            .unwrap_err();
        match err {
            Error::JobFailed { message, logs } => {
                assert_eq!(message, "bad input");
                assert_eq!(logs.len(), 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_upload_data_only_posts() {
        let transport = Canned::with(vec![submitted()]);
        let icepack = icepack().with_transport(transport.clone());

        let handle = icepack
            .upload_data("matrix-vyv95n7wchpl", vec![1, 2, 3])
            .await
            .unwrap();
        assert_eq!(handle.as_str(), "req-7");
        assert_eq!(transport.urls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_into_solution() {
        assert_eq!(into_solution(JobOutcome::Solved(3)).unwrap(), 3);
        assert!(matches!(
            into_solution::<i32>(JobOutcome::NoSolution),
            Err(Error::NoSolution)
        ));
    }
}
