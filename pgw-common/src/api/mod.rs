//! API module for shared HTTP API functionality
//!
//! Provides the wire types and the bearer-token helpers used by the gateway.
//!
//! # Design Principle
//!
//! This module contains ONLY:
//! - Pure functions (no HTTP framework dependencies)
//! - Shared types
//!
//! The gateway wraps these with framework-specific middleware (axum).

pub mod auth;
pub mod types;

pub use auth::{hash_token, parse_bearer, token_cache_key, HeaderError, TOKEN_KEY_PREFIX};
pub use types::{
    Asset, AssetsResponse, DeleteAssetsResponse, DuplicateCluster, DuplicateMember,
    EnrichedAsset, ErrorBody, GroupCluster, GroupMember, HealthReport, Identity, OverallStatus,
    ServiceState, ServiceStatus, ServicesHealth,
};
