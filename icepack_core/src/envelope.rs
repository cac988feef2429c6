//! Transport envelope and solver response messages.
//!
//! These mirror the `Problem` protobuf package served by the API. The schema
//! is proto2, so identifying fields are `required` and always encoded, even
//! when they hold their default value.

use prost::Message;

use crate::errors::{CoreError, CoreResult};

/// Outer wrapper for every request body and every poll response.
#[derive(Clone, PartialEq, Message)]
pub struct ProblemEnvelope {
    /// Model-type tag, e.g. `"ivr7-kt461v8eoaif"`.
    #[prost(string, required, tag = "1")]
    pub r#type: String,
    #[prost(enumeration = "SubType", required, tag = "2")]
    pub sub_type: i32,
    /// Opaque payload, owned by the domain codec.
    #[prost(bytes = "vec", required, tag = "3")]
    pub content: Vec<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum SubType {
    Input = 0,
    Solution = 1,
}

/// One solver log line.
#[derive(Clone, PartialEq, Message)]
pub struct SolverInfo {
    #[prost(enumeration = "SolverMessageType", required, tag = "1")]
    pub r#type: i32,
    #[prost(int64, required, tag = "2")]
    pub unix_date_time: i64,
    #[prost(string, required, tag = "3")]
    pub info_message: String,
}

/// Log entries are the solver's `SolverInfo` messages.
pub type LogEntry = SolverInfo;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum SolverMessageType {
    Info = 0,
    Warning = 1,
    Error = 2,
}

/// Content of a `SOLUTION` envelope.
#[derive(Clone, PartialEq, Message)]
pub struct SolverResponse {
    #[prost(enumeration = "SolveState", required, tag = "1")]
    pub state: i32,
    /// Full log so far; the server resends every entry on each poll.
    #[prost(message, repeated, tag = "2")]
    pub logs: Vec<SolverInfo>,
    #[prost(bytes = "vec", optional, tag = "3")]
    pub solution: Option<Vec<u8>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum SolveState {
    Pending = 0,
    Completed = 1,
    Running = 2,
    Error = 3,
}

impl ProblemEnvelope {
    /// Wrap an encoded domain request for submission.
    pub fn input(model_type: &str, content: Vec<u8>) -> Self {
        Self {
            r#type: model_type.to_string(),
            sub_type: SubType::Input as i32,
            content,
        }
    }

    /// Wrap an encoded solver response.
    pub fn solution(model_type: &str, response: &SolverResponse) -> Self {
        Self {
            r#type: model_type.to_string(),
            sub_type: SubType::Solution as i32,
            content: response.encode_to_vec(),
        }
    }

    /// Decode an envelope from a response body.
    pub fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        Self::decode(bytes).map_err(|e| CoreError::decode(format!("invalid problem envelope: {e}")))
    }

    /// Decode the envelope content as a [`SolverResponse`].
    pub fn solver_response(&self) -> CoreResult<SolverResponse> {
        SolverResponse::decode(self.content.as_slice())
            .map_err(|e| CoreError::decode(format!("invalid solver response: {e}")))
    }
}

impl SolverInfo {
    pub fn new(message_type: SolverMessageType, unix_date_time: i64, message: impl Into<String>) -> Self {
        Self {
            r#type: message_type as i32,
            unix_date_time,
            info_message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.r#type == SolverMessageType::Error as i32
    }
}

impl SolverResponse {
    pub fn is_completed(&self) -> bool {
        self.state == SolveState::Completed as i32
    }

    /// The most recent log entry, by position in the redelivered list.
    pub fn last_log(&self) -> Option<&SolverInfo> {
        self.logs.last()
    }

    /// Polling stops once the job is COMPLETED or its latest log entry is an
    /// ERROR, whatever the state says.
    pub fn is_terminal(&self) -> bool {
        self.is_completed() || self.last_log().is_some_and(SolverInfo::is_error)
    }

    /// Solution bytes, treating an empty payload as absent.
    pub fn solution_bytes(&self) -> Option<&[u8]> {
        self.solution.as_deref().filter(|b| !b.is_empty())
    }
}
