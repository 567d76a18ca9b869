//! Shared API request/response types
//!
//! Wire models exchanged with the asset store, the grouping and deduplication
//! services, and the web client.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ========================================
// Assets
// ========================================

/// Raw asset record as returned by the asset store
///
/// Fields the gateway does not interpret are kept in `extra` and echoed back
/// to the client unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Asset identifier (identity of the record)
    pub id: String,

    /// Primary file path field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Fallback file path field used by the asset store
    #[serde(rename = "originalPath", default, skip_serializing_if = "Option::is_none")]
    pub original_path: Option<String>,

    /// Media type (e.g. "IMAGE", "VIDEO")
    #[serde(rename = "type")]
    pub media_type: String,

    /// File size in bytes
    #[serde(rename = "size", default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,

    /// Provider-specific fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Asset {
    pub fn new(id: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            path: None,
            original_path: None,
            media_type: media_type.into(),
            size_bytes: None,
            extra: Map::new(),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_original_path(mut self, path: impl Into<String>) -> Self {
        self.original_path = Some(path.into());
        self
    }

    /// Resolve the file path used for enrichment
    ///
    /// `path` wins over `originalPath`; blank values count as absent.
    pub fn file_path(&self) -> Option<&str> {
        non_blank(self.path.as_deref()).or_else(|| non_blank(self.original_path.as_deref()))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Asset plus the classification fields merged in by the gateway
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedAsset {
    #[serde(flatten)]
    pub asset: Asset,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_primary_version: Option<bool>,
    /// Ids of the other cluster members present in the same page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternate_asset_ids: Option<Vec<String>>,
    /// Uppercased extensions, aligned index-for-index with `alternate_asset_ids`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternate_extensions: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_group_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f64>,
}

impl From<Asset> for EnrichedAsset {
    fn from(asset: Asset) -> Self {
        Self {
            asset,
            group_id: None,
            group_type: None,
            is_primary_version: None,
            alternate_asset_ids: None,
            alternate_extensions: None,
            duplicate_group_id: None,
            duplicate_type: None,
            similarity_score: None,
        }
    }
}

/// Response body for `GET /assets`
#[derive(Debug, Clone, Serialize)]
pub struct AssetsResponse {
    pub assets: Vec<EnrichedAsset>,
}

/// Response body for `DELETE /assets`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAssetsResponse {
    pub success: bool,
    pub deleted_count: usize,
}

// ========================================
// Classification Clusters
// ========================================

/// File group from the grouping service (burst, RAW+JPEG pairing, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupCluster {
    pub group_id: String,
    pub group_type: String,
    #[serde(default)]
    pub members: Vec<GroupMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMember {
    pub file_path: String,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(rename = "fileType", default)]
    pub media_type: String,
    #[serde(rename = "fileSize", default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

/// Near-duplicate cluster from the deduplication service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateCluster {
    pub group_id: String,
    pub duplicate_type: String,
    #[serde(default)]
    pub members: Vec<DuplicateMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateMember {
    pub file_path: String,
    /// Similarity in [0, 1]
    pub similarity_score: f64,
    #[serde(rename = "fileSize", default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

// ========================================
// Identity
// ========================================

/// Identity claims returned by the asset store for a valid token
///
/// Also the value stored in the token cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: String,
    pub email: String,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
        }
    }

    /// Both claims present and non-blank
    pub fn is_complete(&self) -> bool {
        !self.user_id.trim().is_empty() && !self.email.trim().is_empty()
    }
}

// ========================================
// Health
// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Up,
    Down,
}

/// Health of a single backing dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub status: ServiceState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServiceStatus {
    pub fn up(latency_ms: Option<u64>) -> Self {
        Self {
            status: ServiceState::Up,
            latency_ms,
            error: None,
        }
    }

    pub fn down(error: impl Into<String>) -> Self {
        Self {
            status: ServiceState::Down,
            latency_ms: None,
            error: Some(error.into()),
        }
    }

    pub fn is_up(&self) -> bool {
        self.status == ServiceState::Up
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Ok,
    Degraded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicesHealth {
    pub immich: ServiceStatus,
    pub grouping: ServiceStatus,
    pub deduplication: ServiceStatus,
    pub redis: ServiceStatus,
}

impl ServicesHealth {
    fn all_up(&self) -> bool {
        self.immich.is_up()
            && self.grouping.is_up()
            && self.deduplication.is_up()
            && self.redis.is_up()
    }
}

/// Composite health report for `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: OverallStatus,
    pub services: ServicesHealth,
}

impl HealthReport {
    /// Overall status is `ok` only when every dependency is up
    pub fn from_services(services: ServicesHealth) -> Self {
        let status = if services.all_up() {
            OverallStatus::Ok
        } else {
            OverallStatus::Degraded
        };
        Self { status, services }
    }

    pub fn is_ok(&self) -> bool {
        self.status == OverallStatus::Ok
    }
}

// ========================================
// Errors
// ========================================

/// Body of every error response: `{error, message}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}
