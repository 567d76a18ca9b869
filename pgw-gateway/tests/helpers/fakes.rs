//! In-process doubles for the backing services
//!
//! Each double answers from fixed data and records what it was asked, so
//! tests can assert call counts and forwarded arguments.

use async_trait::async_trait;
use pgw_common::api::{Asset, Identity};
use pgw_common::{Service, UpstreamError};
use pgw_gateway::clients::http::validate_paths;
use pgw_gateway::clients::{AssetSource, ClassificationSource, IdentityValidator};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Arguments of one `get_assets` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub token: String,
    pub skip: u64,
    pub limit: u64,
}

/// Asset store and identity provider double
pub struct FakeImmich {
    identity: Mutex<Result<Identity, UpstreamError>>,
    page: Mutex<Result<Vec<Asset>, UpstreamError>>,
    delete_answer: Mutex<Result<(), UpstreamError>>,
    validations: Mutex<Vec<String>>,
    page_requests: Mutex<Vec<PageRequest>>,
    deletions: Mutex<Vec<Vec<String>>>,
}

impl FakeImmich {
    /// Accepts every token as `identity`, serves an empty page
    pub fn new(identity: Identity) -> Self {
        Self {
            identity: Mutex::new(Ok(identity)),
            page: Mutex::new(Ok(Vec::new())),
            delete_answer: Mutex::new(Ok(())),
            validations: Mutex::new(Vec::new()),
            page_requests: Mutex::new(Vec::new()),
            deletions: Mutex::new(Vec::new()),
        }
    }

    pub fn with_page(self, assets: Vec<Asset>) -> Self {
        *self.page.lock().unwrap() = Ok(assets);
        self
    }

    pub fn failing_page(self, err: UpstreamError) -> Self {
        *self.page.lock().unwrap() = Err(err);
        self
    }

    pub fn rejecting_tokens(self, err: UpstreamError) -> Self {
        *self.identity.lock().unwrap() = Err(err);
        self
    }

    pub fn failing_delete(self, err: UpstreamError) -> Self {
        *self.delete_answer.lock().unwrap() = Err(err);
        self
    }

    pub fn validations(&self) -> Vec<String> {
        self.validations.lock().unwrap().clone()
    }

    pub fn page_requests(&self) -> Vec<PageRequest> {
        self.page_requests.lock().unwrap().clone()
    }

    pub fn deletions(&self) -> Vec<Vec<String>> {
        self.deletions.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdentityValidator for FakeImmich {
    async fn validate_token(&self, token: &str) -> Result<Identity, UpstreamError> {
        self.validations.lock().unwrap().push(token.to_string());
        self.identity.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssetSource for FakeImmich {
    async fn get_assets(
        &self,
        token: &str,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Asset>, UpstreamError> {
        self.page_requests.lock().unwrap().push(PageRequest {
            token: token.to_string(),
            skip,
            limit,
        });
        self.page.lock().unwrap().clone()
    }

    async fn delete_assets(&self, _token: &str, ids: &[String]) -> Result<(), UpstreamError> {
        self.deletions.lock().unwrap().push(ids.to_vec());
        self.delete_answer.lock().unwrap().clone()
    }
}

/// Classification service double
pub struct FakeClassifier<C> {
    service: Service,
    answer: Result<Vec<C>, UpstreamError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl<C> FakeClassifier<C> {
    pub fn new(service: Service, answer: Result<Vec<C>, UpstreamError>) -> Self {
        Self {
            service,
            answer,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn empty(service: Service) -> Self {
        Self::new(service, Ok(Vec::new()))
    }

    /// Never answers within any realistic deadline
    pub fn hanging(service: Service) -> Self {
        Self {
            delay: Some(Duration::from_secs(3600)),
            ..Self::empty(service)
        }
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
        validate_paths(self.service, paths)?;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.answer.clone()
    }
}
