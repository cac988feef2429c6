//! Pooled reqwest clients.
//!
//! Every submit and poll builds its own request; connections come from the
//! client's internal pool and go back to it once the response body has been
//! read (or are closed if the request future is dropped). No connection handle
//! is ever stored on a solver client.

use once_cell::sync::Lazy;
use reqwest::Client;
use std::time::Duration;

/// Default pool size for idle connections per host.
pub const DEFAULT_POOL_SIZE: usize = 32;

/// Default connection timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default request timeout in seconds.
///
/// Applies to a single POST or GET, not to the poll loop as a whole.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Process-wide pooled client used by [`crate::http::ReqwestTransport::shared`].
pub static SHARED_CLIENT: Lazy<Client> = Lazy::new(|| build_pooled_client(None));

/// Build a new pooled HTTP client.
///
/// # Arguments
///
/// * `timeout_secs` - Request timeout in seconds (default: 120)
pub fn build_pooled_client(timeout_secs: Option<u64>) -> Client {
    builder(timeout_secs)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Build a pooled client, surfacing builder failures instead of falling back.
pub fn try_build_pooled_client(timeout_secs: Option<u64>) -> Result<Client, reqwest::Error> {
    builder(timeout_secs).build()
}

fn builder(timeout_secs: Option<u64>) -> reqwest::ClientBuilder {
    let timeout = Duration::from_secs(timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));

    Client::builder()
        .pool_max_idle_per_host(DEFAULT_POOL_SIZE)
        .pool_idle_timeout(Duration::from_secs(90))
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .timeout(timeout)
        .tcp_keepalive(Duration::from_secs(60))
        .tcp_nodelay(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_client_exists() {
        let _ = &*SHARED_CLIENT;
    }

    #[test]
    fn test_build_pooled_client_custom_timeout() {
        let client = try_build_pooled_client(Some(5)).unwrap();
        drop(client);
    }
}
