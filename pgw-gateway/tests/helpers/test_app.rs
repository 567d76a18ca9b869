//! Router wired to in-process doubles
//!
//! Builds the same router as `main`, with every backing service replaced by a
//! double and the token cache backed by an in-process map.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use pgw_common::api::{DuplicateCluster, GroupCluster};
use pgw_common::Service;
use pgw_gateway::cache::{MemoryBackend, TokenCache};
use pgw_gateway::clients::ImmichClient;
use pgw_gateway::services::{AuthGate, EnrichmentEngine, HealthAggregator};
use pgw_gateway::{build_router, AppState};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt; // for `oneshot` method

use super::fakes::{FakeClassifier, FakeImmich};

pub struct TestApp {
    pub router: Router,
    pub immich: Arc<FakeImmich>,
    pub grouping: Arc<FakeClassifier<GroupCluster>>,
    pub dedup: Arc<FakeClassifier<DuplicateCluster>>,
    pub cache_backend: Arc<MemoryBackend>,
}

impl TestApp {
    pub fn new(immich: FakeImmich) -> Self {
        Self::with_classifiers(
            immich,
            FakeClassifier::empty(Service::Grouping),
            FakeClassifier::empty(Service::Deduplication),
        )
    }

    pub fn with_classifiers(
        immich: FakeImmich,
        grouping: FakeClassifier<GroupCluster>,
        dedup: FakeClassifier<DuplicateCluster>,
    ) -> Self {
        let immich = Arc::new(immich);
        let grouping = Arc::new(grouping);
        let dedup = Arc::new(dedup);
        let cache_backend = Arc::new(MemoryBackend::new());
        let token_cache = Arc::new(TokenCache::new(
            cache_backend.clone(),
            Duration::from_secs(300),
        ));

        let state = AppState::new(
            Arc::new(AuthGate::new(token_cache.clone(), immich.clone())),
            immich.clone(),
            Arc::new(EnrichmentEngine::new(grouping.clone(), dedup.clone())),
            Arc::new(HealthAggregator::new(
                immich.clone(),
                grouping.clone(),
                dedup.clone(),
                token_cache,
            )),
        );

        Self {
            router: build_router(state),
            immich,
            grouping,
            dedup,
            cache_backend,
        }
    }

    /// Send one request through the router
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router should not fail");
        let status = response.status();
        (status, extract_json(response.into_body()).await)
    }
}

/// Test helper: Router whose asset store is a real client aimed at a closed port
///
/// Classifiers are empty doubles; the token cache is `cache_backend`, so a
/// test can seed an identity to get past authentication.
pub fn unreachable_immich_router(cache_backend: Arc<MemoryBackend>) -> Router {
    let immich = Arc::new(
        ImmichClient::new("http://127.0.0.1:1").expect("Should build Immich client"),
    );
    let grouping = Arc::new(FakeClassifier::<GroupCluster>::empty(Service::Grouping));
    let dedup = Arc::new(FakeClassifier::<DuplicateCluster>::empty(
        Service::Deduplication,
    ));
    let token_cache = Arc::new(TokenCache::new(cache_backend, Duration::from_secs(300)));

    build_router(AppState::new(
        Arc::new(AuthGate::new(token_cache.clone(), immich.clone())),
        immich.clone(),
        Arc::new(EnrichmentEngine::new(grouping.clone(), dedup.clone())),
        Arc::new(HealthAggregator::new(immich, grouping, dedup, token_cache)),
    ))
}

/// Test helper: Build a request with an optional Authorization header
pub fn request(method: &str, uri: &str, auth: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Test helper: Extract JSON body from response
pub async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}
