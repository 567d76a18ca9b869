//! # Photo Gateway Common Library
//!
//! Shared code for the photo gateway services including:
//! - Asset, cluster and identity models exchanged with upstream services
//! - Bearer header parsing and token hashing
//! - The upstream error taxonomy used by every remote-call wrapper
//! - Configuration loading
//!
//! Nothing in this crate depends on an HTTP framework; the gateway wraps these
//! pieces with axum and reqwest.

pub mod api;
pub mod config;
pub mod error;
pub mod upstream;

pub use error::{Error, Result};
pub use upstream::{ErrorClass, Service, UpstreamError};
