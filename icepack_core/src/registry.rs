//! Model-type registry.
//!
//! Maps a model-type tag to the URL path suffix of the service that solves it.
//! The registry is passed to the client at construction so tests and private
//! deployments can supply their own table.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;

use crate::errors::{CoreError, CoreResult};

pub const MATRIX_PATH: &str = "matrix/";
pub const VEHICLE_ROUTER_SOLVE_PATH: &str = "vehicle-router/solve/";
pub const VEHICLE_ROUTER_DATA_PATH: &str = "vehicle-router/data/";
pub const NETWORK_SOURCING_SOLVE_PATH: &str = "network-sourcing/solve/";

static ICEPACK_MODELS: Lazy<ModelRegistry> = Lazy::new(|| {
    ModelRegistry::from_pairs([
        ("matrix-vyv95n7wchpl", MATRIX_PATH),
        ("tsp-mcvfz472gty6", VEHICLE_ROUTER_SOLVE_PATH),
        ("tsptw-kcxbievqo879", VEHICLE_ROUTER_SOLVE_PATH),
        ("cvrp-jkfdoctmp51n", VEHICLE_ROUTER_SOLVE_PATH),
        ("cvrptw-acyas3nzweqb", VEHICLE_ROUTER_SOLVE_PATH),
        ("ivr7-kt461v8eoaif", VEHICLE_ROUTER_SOLVE_PATH),
        ("ivr8-yni1c9k2swof", VEHICLE_ROUTER_SOLVE_PATH),
        ("nvd-hap0j2y4zlm1", VEHICLE_ROUTER_SOLVE_PATH),
        ("ivrdata-o43e0dvs78zq", VEHICLE_ROUTER_DATA_PATH),
        ("ns3-tbfvuwtge2iq", NETWORK_SOURCING_SOLVE_PATH),
    ])
});

/// Closed set of known model-type tags and their path suffixes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelRegistry {
    routes: BTreeMap<String, String>,
}

impl ModelRegistry {
    /// An empty registry; add tags with [`ModelRegistry::with_model`].
    pub fn new() -> Self {
        Self::default()
    }

    /// The hosted API's models.
    pub fn icepack() -> Self {
        ICEPACK_MODELS.clone()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            routes: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn with_model(mut self, tag: impl Into<String>, path_suffix: impl Into<String>) -> Self {
        self.routes.insert(tag.into(), path_suffix.into());
        self
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.routes.contains_key(tag)
    }

    /// Registered tags in sorted order.
    pub fn tags(&self) -> Vec<String> {
        self.routes.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Path suffix for `tag`, or `UnknownModelType` listing every valid tag.
    pub fn path_suffix(&self, tag: &str) -> CoreResult<&str> {
        self.routes
            .get(tag)
            .map(String::as_str)
            .ok_or_else(|| CoreError::UnknownModelType {
                tag: tag.to_string(),
                valid: self.tags(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.routes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
