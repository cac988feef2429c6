//! Submit and poll against a local HTTP server speaking the solve protocol.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use prost::Message;
use tokio::net::TcpListener;

use icepack_core::{
    CoreError, EndpointConfig, JobOutcome, ModelRegistry, PollConfig, ProblemEnvelope,
    ProstDecoder, RawDecoder, ReqwestTransport, SolveState, SolverClient, SolverInfo,
    SolverMessageType, SolverResponse, SubType,
};

const TOKEN: &str = "test-token";

#[derive(Clone, PartialEq, Message)]
struct Route {
    #[prost(string, repeated, tag = "1")]
    stops: Vec<String>,
    #[prost(double, tag = "2")]
    cost: f64,
}

#[derive(Default)]
struct ServerState {
    submitted: Mutex<Option<ProblemEnvelope>>,
    polls: AtomicUsize,
    content_types: Mutex<Vec<String>>,
}

async fn handle(
    req: Request<Incoming>,
    state: Arc<ServerState>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let auth = req
        .headers()
        .get(hyper::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    if auth != format!("Apitoken {TOKEN}") {
        return Ok(respond(StatusCode::UNAUTHORIZED, "invalid api token"));
    }
    if let Some(ct) = req.headers().get(hyper::header::CONTENT_TYPE) {
        state
            .content_types
            .lock()
            .unwrap()
            .push(ct.to_str().unwrap_or_default().to_string());
    }

    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let body = req.into_body().collect().await?.to_bytes();

    match (method, path.as_str()) {
        (Method::POST, "/route/solve/") => {
            let envelope = ProblemEnvelope::decode(body).expect("request envelope");
            *state.submitted.lock().unwrap() = Some(envelope);
            Ok(respond(StatusCode::OK, r#"{"requestid": "job-1"}"#))
        }
        (Method::GET, "/route/solve/job-1") => {
            let polls = state.polls.fetch_add(1, Ordering::SeqCst) + 1;
            let mut logs = vec![SolverInfo::new(SolverMessageType::Info, 1, "queued")];
            let response = if polls < 3 {
                SolverResponse {
                    state: SolveState::Running as i32,
                    logs,
                    solution: None,
                }
            } else {
                logs.push(SolverInfo::new(SolverMessageType::Info, 2, "done"));
                let submitted = state.submitted.lock().unwrap().clone().expect("submitted");
                let mut route = Route::decode(submitted.content.as_slice()).expect("route");
                route.cost = route.stops.len() as f64 * 10.0;
                SolverResponse {
                    state: SolveState::Completed as i32,
                    logs,
                    solution: Some(route.encode_to_vec()),
                }
            };
            let envelope = ProblemEnvelope::solution("route-test", &response);
            Ok(respond(StatusCode::OK, envelope.encode_to_vec()))
        }
        (Method::GET, _) => Ok(respond(StatusCode::NOT_FOUND, "unknown request id")),
        _ => Ok(respond(StatusCode::METHOD_NOT_ALLOWED, "")),
    }
}

fn respond(status: StatusCode, body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .body(Full::new(body.into()))
        .unwrap()
}

async fn spawn_server(state: Arc<ServerState>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let state = state.clone();
            tokio::spawn(async move {
                let service = service_fn(move |req| handle(req, state.clone()));
                let _ = hyper::server::conn::http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await;
            });
        }
    });
    addr
}

fn registry() -> ModelRegistry {
    ModelRegistry::new().with_model("route-test", "route/solve/")
}

fn fast_polls() -> PollConfig {
    PollConfig::default()
        .with_interval(Duration::from_millis(10))
        .with_deadline(Duration::from_secs(10))
}

#[tokio::test]
async fn test_post_poll_decode_over_http() {
    let state = Arc::new(ServerState::default());
    let addr = spawn_server(state.clone()).await;

    let config = EndpointConfig::new(format!("http://{addr}"), TOKEN);
    let client = SolverClient::new("route-test", &config, &registry(), ProstDecoder::<Route>::new())
        .unwrap()
        .with_transport(Arc::new(ReqwestTransport::new(5).unwrap()))
        .with_poll_config(fast_polls());
    assert_eq!(client.endpoint(), format!("http://{addr}/route/solve/"));

    let request = Route {
        stops: vec!["depot".into(), "a".into(), "b".into()],
        cost: 0.0,
    };
    let handle = client.post(&request).await.unwrap();
    assert_eq!(handle.as_str(), "job-1");

    let submitted = state.submitted.lock().unwrap().clone().unwrap();
    assert_eq!(submitted.r#type, "route-test");
    assert_eq!(submitted.sub_type(), SubType::Input);

    let outcome = client.get(&handle).await.unwrap();
    let route = match outcome {
        JobOutcome::Solved(route) => route,
        other => panic!("unexpected outcome: {other:?}"),
    };
    assert_eq!(route.stops, request.stops);
    assert_eq!(route.cost, 30.0);
    assert_eq!(state.polls.load(Ordering::SeqCst), 3);

    let content_types = state.content_types.lock().unwrap();
    assert!(content_types.iter().all(|ct| ct == "application/protobuf"));
}

#[tokio::test]
async fn test_bad_token_is_reported() {
    let state = Arc::new(ServerState::default());
    let addr = spawn_server(state.clone()).await;

    let config = EndpointConfig::new(format!("http://{addr}/"), "wrong");
    let client = SolverClient::new("route-test", &config, &registry(), RawDecoder).unwrap();

    let err = client.post_bytes(vec![]).await.unwrap_err();
    assert_eq!(err.http_status(), Some(401));
    assert!(err.to_string().contains("invalid api token"));
    assert!(state.submitted.lock().unwrap().is_none());
}

#[tokio::test]
async fn test_unknown_job_is_not_retried() {
    let state = Arc::new(ServerState::default());
    let addr = spawn_server(state.clone()).await;

    let config = EndpointConfig::new(format!("http://{addr}/"), TOKEN);
    let client = SolverClient::new("route-test", &config, &registry(), RawDecoder)
        .unwrap()
        .with_poll_config(fast_polls());

    let err = client.get("job-404").await.unwrap_err();
    match err {
        CoreError::HttpResponse(info) => {
            assert_eq!(info.status, 404);
            assert!(info.url.ends_with("/route/solve/job-404"));
            assert_eq!(info.body_snippet.as_deref(), Some("unknown request id"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
