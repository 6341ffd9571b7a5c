use std::time::Duration;

use declarations_domain::constants::DEFAULT_REQUEST_TIMEOUT_SECS;
use declarations_domain::DeclarationsError;
use reqwest::{Client as ReqwestClient, Method, Request, RequestBuilder, Response};
use tracing::debug;

use crate::errors::InfraError;

/// HTTP client with a per-request timeout.
///
/// Each call makes exactly one attempt; recovery from an unhealthy
/// downstream is left to the circuit breaker in front of it.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Finish `builder` without touching the network.
    ///
    /// A malformed URL, header or body fails here as
    /// `DeclarationsError::InvalidInput`.
    pub fn prepare(&self, builder: RequestBuilder) -> Result<Request, DeclarationsError> {
        builder.build().map_err(|err| InfraError::from(err).into())
    }

    /// Send a prepared request.
    ///
    /// Any received response is returned regardless of status; only
    /// transport faults (connect, timeout) are errors.
    pub async fn execute(&self, request: Request) -> Result<Response, DeclarationsError> {
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "sending HTTP request");

        match self.client.execute(request).await {
            Ok(response) => {
                debug!(%method, %url, status = %response.status(), "received HTTP response");
                Ok(response)
            }
            Err(err) => {
                debug!(%method, %url, error = %err, "HTTP request failed");
                Err(InfraError::from(err).into())
            }
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS) }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<HttpClient, DeclarationsError> {
        let client = ReqwestClient::builder()
            .timeout(self.timeout)
            .no_proxy()
            .build()
            .map_err(|err| DeclarationsError::from(InfraError::from(err)))?;

        Ok(HttpClient { client })
    }
}
