//! Submit and poll operations.
//!
//! A job is submitted once with `POST {endpoint}` and then polled with
//! `GET {endpoint}{job_id}` until the solver reports it finished. Every poll
//! returns the complete log so far, which is re-emitted through `tracing`.

use std::future;

use bytes::Bytes;
use prost::Message;
use reqwest::Method;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::codec::Decoder;
use crate::envelope::{ProblemEnvelope, SolverInfo, SolverMessageType, SolverResponse};
use crate::errors::{CoreError, CoreResult};
use crate::http::TransportRequest;
use crate::jobs::{JobHandle, JobOutcome, JobStatus};
use crate::polling::PollState;
use crate::urls;

use super::client::SolverClient;
use super::types::SubmitResponse;

impl<D: Decoder> SolverClient<D> {
    /// Submit an encoded request and return its job handle.
    ///
    /// The request is wrapped in an `INPUT` envelope tagged with this
    /// client's model type.
    pub async fn post<R: Message>(&self, request: &R) -> CoreResult<JobHandle> {
        self.post_bytes(request.encode_to_vec()).await
    }

    /// Submit an already-encoded request payload.
    pub async fn post_bytes(&self, content: Vec<u8>) -> CoreResult<JobHandle> {
        let envelope = ProblemEnvelope::input(&self.model_type, content);
        let body = self
            .send(Method::POST, &self.endpoint, Some(envelope.encode_to_vec().into()))
            .await?;

        let parsed: SubmitResponse = serde_json::from_slice(&body).map_err(|e| {
            CoreError::Protocol(format!(
                "submission response from {} is not valid JSON: {e}",
                self.endpoint
            ))
        })?;
        let handle = parsed
            .request_id
            .map(JobHandle::new)
            .filter(|h| !h.is_empty())
            .ok_or_else(|| {
                CoreError::Protocol(format!(
                    "submission response from {} has no requestid",
                    self.endpoint
                ))
            })?;

        info!(
            model_type = %self.model_type,
            job_id = %handle,
            status = %JobStatus::Submitted,
            "submitted job"
        );
        Ok(handle)
    }

    /// Poll `job` until it finishes and decode its solution.
    ///
    /// Without a deadline in the client's [`PollConfig`](crate::PollConfig)
    /// this waits as long as the solver keeps reporting progress.
    pub async fn get(&self, job: impl AsRef<str>) -> CoreResult<JobOutcome<D::Output>> {
        self.get_with_cancel(job, &CancellationToken::new()).await
    }

    /// Like [`SolverClient::get`], but stops with [`CoreError::Cancelled`]
    /// once `cancel` fires. An in-flight request is dropped.
    pub async fn get_with_cancel(
        &self,
        job: impl AsRef<str>,
        cancel: &CancellationToken,
    ) -> CoreResult<JobOutcome<D::Output>> {
        let job_id = job.as_ref();
        if job_id.trim().is_empty() {
            return Err(CoreError::EmptyRequestId);
        }

        let url = urls::join(&self.endpoint, job_id);
        let state = PollState::new(self.poll.clone());
        let deadline_at = state.deadline_at();

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                Err(CoreError::Cancelled(format!("stopped polling job {job_id}")))
            }
            _ = sleep_until(deadline_at) => {
                Err(CoreError::timeout(format!(
                    "job {job_id} did not finish within {:?}",
                    self.poll.deadline.unwrap_or_default()
                )))
            }
            result = self.poll_loop(job_id, &url, state) => result,
        }
    }

    /// Fetch the current state of `job` once, without decoding the solution.
    pub async fn status(&self, job: impl AsRef<str>) -> CoreResult<SolverResponse> {
        let job_id = job.as_ref();
        if job_id.trim().is_empty() {
            return Err(CoreError::EmptyRequestId);
        }
        self.fetch(&urls::join(&self.endpoint, job_id)).await
    }

    /// Submit `request` and wait for its outcome.
    pub async fn solve<R: Message>(&self, request: &R) -> CoreResult<JobOutcome<D::Output>> {
        let handle = self.post(request).await?;
        self.get(&handle).await
    }

    async fn poll_loop(
        &self,
        job_id: &str,
        url: &str,
        mut state: PollState,
    ) -> CoreResult<JobOutcome<D::Output>> {
        loop {
            let delay = state.next_delay();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let response = self.fetch(url).await?;
            state.record_attempt();
            emit_logs(job_id, &response.logs);

            if response.is_terminal() {
                let outcome = self.finish(response)?;
                debug!(
                    job_id,
                    attempts = state.attempts,
                    elapsed_ms = state.elapsed().as_millis() as u64,
                    status = %outcome.status(),
                    "job finished"
                );
                return Ok(outcome);
            }
            debug!(
                job_id,
                attempts = state.attempts,
                state = response.state,
                status = %JobStatus::Polling,
                "job still running"
            );
        }
    }

    fn finish(&self, response: SolverResponse) -> CoreResult<JobOutcome<D::Output>> {
        let solution = response
            .solution_bytes()
            .map(|bytes| self.decoder.decode(bytes))
            .transpose()?;

        if let Some(last) = response.last_log().filter(|l| l.is_error()) {
            return Ok(JobOutcome::SolverError {
                message: last.info_message.clone(),
                logs: response.logs,
                solution,
            });
        }

        Ok(match solution {
            Some(value) => JobOutcome::Solved(value),
            None => JobOutcome::NoSolution,
        })
    }

    async fn fetch(&self, url: &str) -> CoreResult<SolverResponse> {
        let body = self.send(Method::GET, url, None).await?;
        ProblemEnvelope::from_bytes(&body)?.solver_response()
    }

    async fn send(&self, method: Method, url: &str, body: Option<Bytes>) -> CoreResult<Bytes> {
        let request = TransportRequest {
            method,
            url: url.to_string(),
            headers: self.headers.clone(),
            body,
        };
        let response = self.transport.execute(request).await?;
        Ok(response.into_success_body(url)?)
    }
}

async fn sleep_until(at: Option<Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => future::pending().await,
    }
}

fn emit_logs(job_id: &str, logs: &[SolverInfo]) {
    for entry in logs {
        let at = entry.unix_date_time;
        let message = entry.info_message.as_str();
        match entry.r#type() {
            SolverMessageType::Info => info!(job_id, unix_date_time = at, "{message}"),
            SolverMessageType::Warning => warn!(job_id, unix_date_time = at, "{message}"),
            SolverMessageType::Error => error!(job_id, unix_date_time = at, "{message}"),
        }
    }
}
