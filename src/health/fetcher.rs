//! Probe transport.
//!
//! The checker only needs "fetch a URL within a deadline, get a status code or an
//! error". Anything implementing [`Fetcher`] can be plugged in; production uses
//! [`HttpFetcher`]. The checker also enforces the deadline itself, so a fetcher
//! that ignores it still cannot stall a probe.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while fetching an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Transport(String),
}

/// Capability to issue a GET against an endpoint and report its status code.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url`, giving up after `timeout`.
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<u16, FetchError>;
}

/// [`Fetcher`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("simplcheck/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Transport(error_chain(&e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<u16, FetchError> {
        match self.client.get(url).timeout(timeout).send().await {
            Ok(response) => Ok(response.status().as_u16()),
            Err(e) if e.is_timeout() => Err(FetchError::Timeout(timeout)),
            Err(e) => Err(FetchError::Transport(error_chain(&e))),
        }
    }
}

/// Flatten an error and its sources into one line.
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unsupported_scheme_is_transport_error() {
        let fetcher = HttpFetcher::new().unwrap();
        let err = fetcher.fetch("a.test", Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }

    #[tokio::test]
    async fn refused_connection_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = HttpFetcher::new().unwrap();
        let err = fetcher
            .fetch(&format!("http://{}/", addr), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }

    #[derive(Debug, Error)]
    #[error("error sending request")]
    struct Outer(#[source] std::io::Error);

    #[test]
    fn error_chain_includes_sources() {
        let err = Outer(std::io::Error::new(std::io::ErrorKind::Other, "reset by peer"));
        assert_eq!(error_chain(&err), "error sending request: reset by peer");
    }
}
