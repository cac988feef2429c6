//! Icepack core library.
//!
//! This crate provides the transport layer for the Icepack solve API:
//! - Model registry mapping model-type tags to endpoint paths
//! - Endpoint configuration loaded from a JSON file
//! - Protobuf envelope and solver response messages
//! - Async submit/poll client generic over its result decoder
//! - Pooled HTTP transport

pub mod api;
pub mod codec;
pub mod config;
pub mod envelope;
pub mod errors;
pub mod http;
pub mod jobs;
pub mod polling;
pub mod registry;
pub mod shared_client;
pub mod urls;
pub mod utils;

// Re-export core types at crate root for convenience
pub use errors::{CoreError, CoreResult, HttpErrorInfo};
pub use jobs::{JobHandle, JobOutcome, JobStatus};

pub use api::SolverClient;
pub use codec::{Decoder, FnDecoder, ProstDecoder, RawDecoder};
pub use config::{EndpointConfig, DEFAULT_CONFIG_PATH, DEFAULT_ENDPOINT};
pub use envelope::{
    LogEntry, ProblemEnvelope, SolveState, SolverInfo, SolverMessageType, SolverResponse, SubType,
};
pub use http::{ReqwestTransport, Transport, TransportRequest, TransportResponse};
pub use polling::PollConfig;
pub use registry::ModelRegistry;

// Used by the `Message` derives downstream crates write for their own
// request and solution types.
pub use prost;
