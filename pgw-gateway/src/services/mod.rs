//! Request-path services: authentication, enrichment and health aggregation

pub mod auth_gate;
pub mod enrichment;
pub mod health;

pub use auth_gate::{AuthGate, AuthRejection, AuthenticatedCaller};
pub use enrichment::{EnrichmentEngine, EnrichmentError};
pub use health::HealthAggregator;
