//! In-process doubles for the backing services, shared by unit tests

use async_trait::async_trait;
use pgw_common::api::Identity;
use pgw_common::{Service, UpstreamError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::cache::{CacheBackend, CacheError};
use crate::clients::{ClassificationSource, IdentityValidator};

/// Test helper: validator with a fixed answer that records the tokens it saw
pub struct FakeValidator {
    answer: Result<Identity, UpstreamError>,
    seen: Mutex<Vec<String>>,
}

impl FakeValidator {
    pub fn new(answer: Result<Identity, UpstreamError>) -> Arc<Self> {
        Arc::new(Self {
            answer,
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdentityValidator for FakeValidator {
    async fn validate_token(&self, token: &str) -> Result<Identity, UpstreamError> {
        self.seen.lock().unwrap().push(token.to_string());
        self.answer.clone()
    }
}

/// Test helper: classification source with a fixed answer
pub struct FakeClassifier<C> {
    service: Service,
    answer: Result<Vec<C>, UpstreamError>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl<C> FakeClassifier<C> {
    pub fn new(service: Service, answer: Result<Vec<C>, UpstreamError>) -> Self {
        Self {
            service,
            answer,
            calls: AtomicUsize::new(0),
            delay: None,
        }
    }

    /// Sleep before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<C: Clone + Send + Sync> ClassificationSource for FakeClassifier<C> {
    type Cluster = C;

    async fn clusters_by_paths(&self, paths: &[String]) -> Result<Vec<C>, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        crate::clients::http::validate_paths(self.service, paths)?;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.answer.clone()
    }
}

/// Test helper: backend whose every operation fails
pub struct BrokenBackend;

#[async_trait]
impl CacheBackend for BrokenBackend {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::Connection("connection refused".to_string()))
    }

    async fn set_ex(&self, _: &str, _: &str, _: Duration) -> Result<(), CacheError> {
        Err(CacheError::Connection("connection refused".to_string()))
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Err(CacheError::Connection("connection refused".to_string()))
    }
}
