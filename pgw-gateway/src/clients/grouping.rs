//! Grouping service client

use async_trait::async_trait;
use pgw_common::api::GroupCluster;
use pgw_common::{Service, UpstreamError};
use std::time::Duration;

use super::http::{validate_paths, ServiceHttp};
use super::ClassificationSource;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for `GET /groups?paths=..`
#[derive(Debug, Clone)]
pub struct GroupingClient {
    http: ServiceHttp,
    timeout: Duration,
}

impl GroupingClient {
    pub fn new(base_url: &str) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: ServiceHttp::new(Service::Grouping, base_url)?,
            timeout: REQUEST_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl ClassificationSource for GroupingClient {
    type Cluster = GroupCluster;

    async fn clusters_by_paths(&self, paths: &[String]) -> Result<Vec<GroupCluster>, UpstreamError> {
        validate_paths(Service::Grouping, paths)?;
        self.http.get_by_paths("/groups", paths, self.timeout).await
    }
}
