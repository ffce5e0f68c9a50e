//! HTTP transport used to talk to the catalog
//!
//! The retrieval pipeline only needs two things from the network: the body of
//! a page as text and the body of a file as bytes. Both are expressed by the
//! [`HttpFetcher`] trait so the pipeline can be driven by an in-memory fake.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Errors raised by the HTTP transport
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// The request could not be sent or its body could not be read
    #[error("Request to {url} failed: {source}")]
    Network { url: String, source: reqwest::Error },

    /// The server answered with a non-success status code
    #[error("Request to {url} failed with HTTP {status} {reason}")]
    Status {
        url: String,
        status: u16,
        reason: String,
    },
}

/// Performs GET requests against the catalog.
///
/// Implementations must be safe to share between concurrent searches and
/// downloads.
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    /// Fetches `url` and returns the response body decoded as text
    async fn get_text(&self, url: &str) -> Result<String, TransportError>;

    /// Fetches `url` and returns the raw response body
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, TransportError>;
}

/// [`HttpFetcher`] backed by a single shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// Creates a fetcher sending the given user agent.
    ///
    /// # Arguments
    ///
    /// * `user_agent` - Value of the `User-Agent` header sent with every request
    /// * `timeout` - Upper bound for each request, connect and body included;
    ///   `None` waits as long as the server keeps the connection open
    ///
    /// # Returns
    ///
    /// A Result containing the fetcher, or `TransportError::ClientBuild` when
    /// the TLS backend cannot be initialised
    ///
    /// # Examples
    ///
    /// ```
    /// use feliratok::ReqwestFetcher;
    /// use std::time::Duration;
    ///
    /// let fetcher = ReqwestFetcher::new("feliratok/0.1", Some(Duration::from_secs(30)));
    /// assert!(fetcher.is_ok());
    /// ```
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(TransportError::ClientBuild)?;
        Ok(Self { client })
    }

    /// Sends the request and rejects non-success responses
    async fn send(&self, url: &str) -> Result<reqwest::Response, TransportError> {
        debug!(url, "GET");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TransportError::Network {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn get_text(&self, url: &str) -> Result<String, TransportError> {
        self.send(url)
            .await?
            .text()
            .await
            .map_err(|e| TransportError::Network {
                url: url.to_string(),
                source: e,
            })
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        let body = self
            .send(url)
            .await?
            .bytes()
            .await
            .map_err(|e| TransportError::Network {
                url: url.to_string(),
                source: e,
            })?;

        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        let error = TransportError::Status {
            url: "https://feliratok.eu/".to_string(),
            status: 503,
            reason: "Service Unavailable".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Request to https://feliratok.eu/ failed with HTTP 503 Service Unavailable"
        );
    }

    #[test]
    fn test_build_client_with_timeout() {
        assert!(ReqwestFetcher::new("feliratok-test", Some(Duration::from_secs(5))).is_ok());
    }
}
