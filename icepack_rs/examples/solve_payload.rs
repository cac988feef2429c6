//! Submit a pre-encoded request and save the solution bytes.
//!
//! ```text
//! cargo run --example solve_payload -- <model-type> <request.bin> <solution.bin> [--timeout-secs N]
//! ```
//!
//! The request file holds the encoded domain request (not the envelope).
//! Press Ctrl-C to stop waiting.

use std::time::Duration;

use icepack::{into_solution, Icepack, PollConfig};
use tokio_util::sync::CancellationToken;

const USAGE: &str =
    "usage: solve_payload <model-type> <request.bin> <solution.bin> [--timeout-secs N]";

struct Args {
    model_type: String,
    request_path: String,
    solution_path: String,
    timeout: Option<Duration>,
}

fn parse_args() -> Result<Args, icepack::Error> {
    let mut positional = Vec::new();
    let mut timeout = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--timeout-secs" {
            let secs = args
                .next()
                .and_then(|v| v.parse::<u64>().ok())
                .ok_or_else(|| icepack::Error::Config(USAGE.to_string()))?;
            timeout = Some(Duration::from_secs(secs));
        } else {
            positional.push(arg);
        }
    }
    let [model_type, request_path, solution_path]: [String; 3] = positional
        .try_into()
        .map_err(|_| icepack::Error::Config(USAGE.to_string()))?;
    Ok(Args {
        model_type,
        request_path,
        solution_path,
        timeout,
    })
}

#[tokio::main]
async fn main() -> Result<(), icepack::Error> {
    icepack::init_tracing();
    let args = parse_args()?;

    let mut poll = PollConfig::default();
    if let Some(timeout) = args.timeout {
        poll = poll.with_deadline(timeout);
    }
    let icepack = Icepack::from_default_config()?.with_poll_config(poll);
    let client = icepack.raw_client(&args.model_type)?;

    let request = std::fs::read(&args.request_path)?;
    let job = client.post_bytes(request).await?;
    println!("job={job}");

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });

    let outcome = client.get_with_cancel(&job, &cancel).await?;
    println!("status={}", outcome.status());
    let solution = into_solution(outcome)?;
    std::fs::write(&args.solution_path, &solution)?;
    println!("wrote {} bytes to {}", solution.len(), args.solution_path);
    Ok(())
}
