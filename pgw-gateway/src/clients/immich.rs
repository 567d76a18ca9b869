//! Immich API client
//!
//! Token validation plus paged asset listing and bulk delete. All calls
//! forward the caller's bearer token unchanged.

use async_trait::async_trait;
use pgw_common::api::{Asset, Identity};
use pgw_common::{Service, UpstreamError};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

use super::http::ServiceHttp;
use super::{AssetSource, IdentityValidator};

const VALIDATE_TOKEN_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Immich asset store and identity provider
#[derive(Debug, Clone)]
pub struct ImmichClient {
    http: ServiceHttp,
    validate_timeout: Duration,
    request_timeout: Duration,
}

impl ImmichClient {
    pub fn new(base_url: &str) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: ServiceHttp::new(Service::Immich, base_url)?,
            validate_timeout: VALIDATE_TOKEN_TIMEOUT,
            request_timeout: REQUEST_TIMEOUT,
        })
    }

    /// Override the per-call timeouts (token validation, everything else)
    pub fn with_timeouts(mut self, validate: Duration, request: Duration) -> Self {
        self.validate_timeout = validate;
        self.request_timeout = request;
        self
    }
}

fn require_token(token: &str) -> Result<(), UpstreamError> {
    if token.trim().is_empty() {
        return Err(UpstreamError::invalid_input(
            Service::Immich,
            "Token cannot be empty",
        ));
    }
    Ok(())
}

#[async_trait]
impl IdentityValidator for ImmichClient {
    async fn validate_token(&self, token: &str) -> Result<Identity, UpstreamError> {
        require_token(token)?;

        let request = self
            .http
            .client()
            .post(self.http.url("/api/auth/validateToken"))
            .bearer_auth(token)
            .json(&json!({}));

        let response = self.http.send(request, self.validate_timeout).await?;
        let identity: Identity = self.http.json(response).await?;

        debug!(user_id = %identity.user_id, "Token validated");
        Ok(identity)
    }
}

#[async_trait]
impl AssetSource for ImmichClient {
    async fn get_assets(
        &self,
        token: &str,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Asset>, UpstreamError> {
        require_token(token)?;
        if limit == 0 {
            return Err(UpstreamError::invalid_input(
                Service::Immich,
                "Limit must be greater than 0",
            ));
        }

        let request = self
            .http
            .client()
            .get(self.http.url("/api/assets"))
            .bearer_auth(token)
            .query(&[("skip", skip), ("limit", limit)]);

        let response = self.http.send(request, self.request_timeout).await?;
        let assets: Vec<Asset> = self.http.json(response).await?;

        debug!(skip, limit, count = assets.len(), "Fetched assets");
        Ok(assets)
    }

    async fn delete_assets(&self, token: &str, ids: &[String]) -> Result<(), UpstreamError> {
        require_token(token)?;
        if ids.is_empty() {
            return Err(UpstreamError::invalid_input(
                Service::Immich,
                "Asset IDs array cannot be empty",
            ));
        }

        let request = self
            .http
            .client()
            .delete(self.http.url("/api/assets"))
            .bearer_auth(token)
            .json(&json!({ "ids": ids }));

        self.http.send(request, self.request_timeout).await?;

        info!(count = ids.len(), "Deleted assets");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client(server: &MockServer) -> ImmichClient {
        ImmichClient::new(&server.base_url()).unwrap()
    }

    #[tokio::test]
    async fn test_validate_token_returns_identity() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/auth/validateToken")
                    .header("authorization", "Bearer tok-1");
                then.status(200)
                    .json_body(json!({"userId": "u1", "email": "u1@example.com"}));
            })
            .await;

        let identity = client(&server).validate_token("tok-1").await.unwrap();

        assert_eq!(identity, Identity::new("u1", "u1@example.com"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_validate_token_unauthorized() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/auth/validateToken");
                then.status(401).body("{\"message\":\"Invalid user token\"}");
            })
            .await;

        let err = client(&server).validate_token("bad").await.unwrap_err();
        assert_eq!(
            err,
            UpstreamError::Unauthorized {
                service: Service::Immich
            }
        );
    }

    #[tokio::test]
    async fn test_blank_token_rejected_without_io() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/auth/validateToken");
                then.status(200);
            })
            .await;

        let err = client(&server).validate_token("  ").await.unwrap_err();

        assert!(matches!(err, UpstreamError::InvalidInput { .. }));
        mock.assert_calls_async(0).await;
    }

    #[tokio::test]
    async fn test_get_assets_sends_paging() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/assets")
                    .query_param("skip", "20")
                    .query_param("limit", "10")
                    .header("authorization", "Bearer tok");
                then.status(200).json_body(json!([
                    {"id": "a1", "path": "/p/IMG_1.JPG", "type": "IMAGE"},
                    {"id": "a2", "originalPath": "/p/IMG_1.CR2", "type": "IMAGE", "isFavorite": true}
                ]));
            })
            .await;

        let assets = client(&server).get_assets("tok", 20, 10).await.unwrap();

        assert_eq!(assets.len(), 2);
        assert_eq!(assets[1].file_path(), Some("/p/IMG_1.CR2"));
        assert_eq!(assets[1].extra["isFavorite"], true);
    }

    #[tokio::test]
    async fn test_get_assets_zero_limit_rejected() {
        let server = MockServer::start_async().await;
        let err = client(&server).get_assets("tok", 0, 0).await.unwrap_err();
        assert!(matches!(err, UpstreamError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_get_assets_malformed_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/assets");
                then.status(200).json_body(json!({"unexpected": "shape"}));
            })
            .await;

        let err = client(&server).get_assets("tok", 0, 10).await.unwrap_err();
        assert!(matches!(err, UpstreamError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_delete_assets_sends_ids() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(DELETE)
                    .path("/api/assets")
                    .json_body(json!({"ids": ["a1", "a2"]}));
                then.status(204);
            })
            .await;

        client(&server)
            .delete_assets("tok", &["a1".to_string(), "a2".to_string()])
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_assets_empty_rejected() {
        let server = MockServer::start_async().await;
        let err = client(&server).delete_assets("tok", &[]).await.unwrap_err();
        assert!(matches!(err, UpstreamError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_slow_response_is_timeout() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/assets");
                then.status(200)
                    .delay(Duration::from_millis(500))
                    .json_body(json!([]));
            })
            .await;

        let client = client(&server)
            .with_timeouts(Duration::from_millis(50), Duration::from_millis(50));
        let err = client.get_assets("tok", 0, 10).await.unwrap_err();

        assert_eq!(
            err,
            UpstreamError::Timeout {
                service: Service::Immich
            }
        );
    }

    #[tokio::test]
    async fn test_unreachable_is_network_error() {
        // Nothing listens on port 9 (discard) in test environments
        let client = ImmichClient::new("http://127.0.0.1:9").unwrap();
        let err = client.validate_token("tok").await.unwrap_err();
        assert!(matches!(err, UpstreamError::Network { .. }));
    }
}
