//! Scripted transport for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use prost::Message;

use crate::envelope::{ProblemEnvelope, SolveState, SolverInfo, SolverResponse};
use crate::http::{HttpError, Transport, TransportRequest, TransportResponse};

/// Replays queued responses in order and records every request.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<TransportResponse, HttpError>>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, response: TransportResponse) -> &Self {
        self.responses.lock().unwrap().push_back(Ok(response));
        self
    }

    pub(crate) fn push_err(&self, err: HttpError) -> &Self {
        self.responses.lock().unwrap().push_back(Err(err));
        self
    }

    pub(crate) fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, HttpError> {
        self.requests.lock().unwrap().push(request);
        let next = self.responses.lock().unwrap().pop_front();
        // an exhausted script looks like a job that never finishes
        next.unwrap_or_else(|| Ok(poll_body(running(vec![]))))
    }
}

pub(crate) fn running(logs: Vec<SolverInfo>) -> SolverResponse {
    SolverResponse {
        state: SolveState::Running as i32,
        logs,
        solution: None,
    }
}

pub(crate) fn completed(solution: Option<Vec<u8>>) -> SolverResponse {
    SolverResponse {
        state: SolveState::Completed as i32,
        logs: vec![],
        solution,
    }
}

/// A 200 poll response wrapping `response` in a solution envelope.
pub(crate) fn poll_body(response: SolverResponse) -> TransportResponse {
    let envelope = ProblemEnvelope::solution("demo-echo", &response);
    TransportResponse::new(200, envelope.encode_to_vec())
}

pub(crate) fn submit_body(json: &str) -> TransportResponse {
    TransportResponse::new(200, json.as_bytes().to_vec())
}
