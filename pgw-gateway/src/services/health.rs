//! Composite health check
//!
//! Probes every backing dependency concurrently under one deadline. A probe
//! never fails the check; it reports its dependency as down instead.

use pgw_common::api::{HealthReport, ServiceStatus, ServicesHealth};
use pgw_common::UpstreamError;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::cache::TokenCache;
use crate::clients::{ClassificationSource, DuplicateSource, GroupingSource, IdentityValidator};

/// Sentinel token sent to the identity provider
pub const HEALTH_CHECK_TOKEN: &str = "health-check-token";

/// Sentinel path sent to the classification services
pub const HEALTH_CHECK_PATH: &str = "health-check";

/// Upper bound on the whole aggregation
pub const HEALTH_CHECK_DEADLINE: Duration = Duration::from_secs(5);

pub struct HealthAggregator {
    identity: Arc<dyn IdentityValidator>,
    grouping: Arc<GroupingSource>,
    duplicates: Arc<DuplicateSource>,
    cache: Arc<TokenCache>,
    deadline: Duration,
}

impl HealthAggregator {
    pub fn new(
        identity: Arc<dyn IdentityValidator>,
        grouping: Arc<GroupingSource>,
        duplicates: Arc<DuplicateSource>,
        cache: Arc<TokenCache>,
    ) -> Self {
        Self {
            identity,
            grouping,
            duplicates,
            cache,
            deadline: HEALTH_CHECK_DEADLINE,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Probe all dependencies
    ///
    /// If the deadline passes first, in-flight probes are dropped and every
    /// dependency is reported down.
    pub async fn check(&self) -> HealthReport {
        let probes = async {
            tokio::join!(
                self.probe_identity(),
                probe_classification(&*self.grouping),
                probe_classification(&*self.duplicates),
                self.probe_cache(),
            )
        };

        let services = match tokio::time::timeout(self.deadline, probes).await {
            Ok((immich, grouping, deduplication, redis)) => ServicesHealth {
                immich,
                grouping,
                deduplication,
                redis,
            },
            Err(_) => {
                warn!(deadline_ms = self.deadline.as_millis() as u64, "Health check timed out");
                let timed_out = || {
                    ServiceStatus::down(format!(
                        "Health check timed out after {}ms",
                        self.deadline.as_millis()
                    ))
                };
                ServicesHealth {
                    immich: timed_out(),
                    grouping: timed_out(),
                    deduplication: timed_out(),
                    redis: timed_out(),
                }
            }
        };

        let report = HealthReport::from_services(services);
        debug!(status = ?report.status, "Health check complete");
        report
    }

    /// A credential rejection of the sentinel token still proves the
    /// identity provider is answering
    async fn probe_identity(&self) -> ServiceStatus {
        timed(async {
            match self.identity.validate_token(HEALTH_CHECK_TOKEN).await {
                Err(e) if e.is_credential_rejection() => Ok(()),
                other => other.map(|_| ()),
            }
        })
        .await
    }

    async fn probe_cache(&self) -> ServiceStatus {
        match self.cache.ping().await {
            Ok(()) => ServiceStatus::up(None),
            Err(e) => ServiceStatus::down(e.to_string()),
        }
    }
}

async fn probe_classification<C: Send>(
    source: &dyn ClassificationSource<Cluster = C>,
) -> ServiceStatus {
    timed(source.clusters_by_paths(&[HEALTH_CHECK_PATH.to_string()])).await
}

async fn timed<T, F>(probe: F) -> ServiceStatus
where
    F: Future<Output = Result<T, UpstreamError>>,
{
    let started = Instant::now();
    match probe.await {
        Ok(_) => ServiceStatus::up(Some(started.elapsed().as_millis() as u64)),
        Err(e) => ServiceStatus::down(e.to_string()),
    }
}
