//! Wire types that are JSON rather than protobuf.

use serde::Deserialize;

/// Body of a successful submission.
///
/// The hosted API spells the field `requestid`; some deployments use
/// `requestId`.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    #[serde(rename = "requestid", alias = "requestId", default)]
    pub request_id: Option<String>,
}
