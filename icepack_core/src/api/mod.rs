//! Solve API client.
//!
//! # Example
//!
//! ```ignore
//! use icepack_core::api::SolverClient;
//! use icepack_core::{EndpointConfig, ModelRegistry, ProstDecoder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EndpointConfig::load("../config.json".as_ref())?;
//!     let client = SolverClient::new(
//!         "tsp-mcvfz472gty6",
//!         &config,
//!         &ModelRegistry::icepack(),
//!         ProstDecoder::<tsp::SolutionResponse>::new(),
//!     )?;
//!
//!     let job = client.post(&request).await?;
//!     match client.get(&job).await? {
//!         JobOutcome::Solved(solution) => println!("{solution:?}"),
//!         other => println!("job ended as {}", other.status()),
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod jobs;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use client::SolverClient;
pub use types::SubmitResponse;
