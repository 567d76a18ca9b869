//! Deduplication service client

use async_trait::async_trait;
use pgw_common::api::DuplicateCluster;
use pgw_common::{Service, UpstreamError};
use std::time::Duration;

use super::http::{validate_paths, ServiceHttp};
use super::ClassificationSource;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for `GET /duplicates?paths=..`
#[derive(Debug, Clone)]
pub struct DeduplicationClient {
    http: ServiceHttp,
    timeout: Duration,
}

impl DeduplicationClient {
    pub fn new(base_url: &str) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: ServiceHttp::new(Service::Deduplication, base_url)?,
            timeout: REQUEST_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl ClassificationSource for DeduplicationClient {
    type Cluster = DuplicateCluster;

    async fn clusters_by_paths(
        &self,
        paths: &[String],
    ) -> Result<Vec<DuplicateCluster>, UpstreamError> {
        validate_paths(Service::Deduplication, paths)?;
        self.http.get_by_paths("/duplicates", paths, self.timeout).await
    }
}
