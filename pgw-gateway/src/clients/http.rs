//! Shared request plumbing for the backing HTTP services
//!
//! All transport and status classification into [`UpstreamError`] happens
//! here, once per call.

use pgw_common::{Service, UpstreamError};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, warn};

const USER_AGENT: &str = concat!("pgw-gateway/", env!("CARGO_PKG_VERSION"));

/// Longest slice of an error body carried into an error message
const MAX_ERROR_BODY_CHARS: usize = 200;

/// HTTP client bound to one backing service
#[derive(Debug, Clone)]
pub struct ServiceHttp {
    service: Service,
    base_url: String,
    http_client: reqwest::Client,
}

impl ServiceHttp {
    pub fn new(service: Service, base_url: &str) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            service,
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.http_client
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and classify any failure
    ///
    /// Returns the response only for 2xx statuses.
    pub async fn send(
        &self,
        request: RequestBuilder,
        timeout: Duration,
    ) -> Result<Response, UpstreamError> {
        let response = request
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| self.classify_transport(e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        let err = UpstreamError::from_status(self.service, status.as_u16(), message);

        if status.is_server_error() {
            error!(service = %self.service, status = status.as_u16(), "{}", err);
        } else {
            warn!(service = %self.service, status = status.as_u16(), "{}", err);
        }

        Err(err)
    }

    /// Decode a successful response body
    pub async fn json<T: DeserializeOwned>(&self, response: Response) -> Result<T, UpstreamError> {
        response.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                return self.classify_transport(e);
            }
            error!(service = %self.service, error = %e, "Malformed response body");
            UpstreamError::InvalidResponse {
                service: self.service,
            }
        })
    }

    /// `GET {endpoint}?paths=..&paths=..` decoded as a JSON array
    pub async fn get_by_paths<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        paths: &[String],
        timeout: Duration,
    ) -> Result<Vec<T>, UpstreamError> {
        let query: Vec<(&str, &str)> = paths.iter().map(|p| ("paths", p.as_str())).collect();

        debug!(service = %self.service, count = paths.len(), "Querying clusters by path");

        let request = self.http_client.get(self.url(endpoint)).query(&query);
        let response = self.send(request, timeout).await?;
        self.json(response).await
    }

    fn classify_transport(&self, e: reqwest::Error) -> UpstreamError {
        if e.is_timeout() {
            error!(service = %self.service, "Request timeout");
            UpstreamError::Timeout {
                service: self.service,
            }
        } else {
            error!(service = %self.service, error = %e, "Network error");
            UpstreamError::Network {
                service: self.service,
            }
        }
    }
}

/// Reject empty path lists and blank entries before any I/O
pub fn validate_paths(service: Service, paths: &[String]) -> Result<(), UpstreamError> {
    if paths.is_empty() {
        return Err(UpstreamError::invalid_input(
            service,
            "File paths array cannot be empty",
        ));
    }
    if paths.iter().any(|p| p.trim().is_empty()) {
        return Err(UpstreamError::invalid_input(
            service,
            "File paths must be non-empty strings",
        ));
    }
    Ok(())
}
