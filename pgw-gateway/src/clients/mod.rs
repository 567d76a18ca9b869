//! Remote-call wrappers for the backing services
//!
//! Each wrapper sits behind a trait so the services above can be exercised
//! with in-process doubles.

use async_trait::async_trait;
use pgw_common::api::{Asset, DuplicateCluster, GroupCluster, Identity};
use pgw_common::UpstreamError;

pub mod deduplication;
pub mod grouping;
pub mod http;
pub mod immich;

pub use deduplication::DeduplicationClient;
pub use grouping::GroupingClient;
pub use immich::ImmichClient;

/// Resolves a bearer token to the identity it belongs to
#[async_trait]
pub trait IdentityValidator: Send + Sync {
    async fn validate_token(&self, token: &str) -> Result<Identity, UpstreamError>;
}

/// Authoritative asset store
#[async_trait]
pub trait AssetSource: Send + Sync {
    /// One page of assets visible to the token's owner
    async fn get_assets(
        &self,
        token: &str,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Asset>, UpstreamError>;

    async fn delete_assets(&self, token: &str, ids: &[String]) -> Result<(), UpstreamError>;
}

/// Classification service keyed by file path
#[async_trait]
pub trait ClassificationSource: Send + Sync {
    type Cluster: Send;

    /// Clusters touching any of `paths`
    ///
    /// Fails with `InvalidInput` on an empty list or a blank entry.
    async fn clusters_by_paths(&self, paths: &[String])
        -> Result<Vec<Self::Cluster>, UpstreamError>;
}

/// Grouping service seen through its trait
pub type GroupingSource = dyn ClassificationSource<Cluster = GroupCluster>;

/// Deduplication service seen through its trait
pub type DuplicateSource = dyn ClassificationSource<Cluster = DuplicateCluster>;
