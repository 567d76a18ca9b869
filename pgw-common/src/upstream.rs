//! Upstream error taxonomy
//!
//! Every remote-call wrapper classifies raw transport failures into
//! [`UpstreamError`] exactly once. Callers above the wrappers only wrap or
//! translate these errors (via [`UpstreamError::class`]), never reclassify
//! them from transport details.

use std::fmt;
use thiserror::Error;

/// Backing dependency of the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// Authoritative photo-asset store and identity provider
    Immich,
    /// Grouping/classification service
    Grouping,
    /// Near-duplicate detection service
    Deduplication,
    /// Shared token cache
    Redis,
}

impl Service {
    /// Stable label used in logs and health reports
    pub const fn as_str(self) -> &'static str {
        match self {
            Service::Immich => "immich",
            Service::Grouping => "grouping",
            Service::Deduplication => "deduplication",
            Service::Redis => "redis",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a call to a backing HTTP service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// Request rejected locally before any I/O
    #[error("{service} request rejected: {reason}")]
    InvalidInput { service: Service, reason: String },

    /// HTTP 401
    #[error("{service}: Invalid token")]
    Unauthorized { service: Service },

    /// HTTP 403
    #[error("{service}: Access forbidden")]
    Forbidden { service: Service },

    /// HTTP 404
    #[error("{service}: Endpoint not found")]
    NotFound { service: Service },

    /// HTTP 500 and any other 5xx except 503
    #[error("{service}: Server error (HTTP {status})")]
    ServerError { service: Service, status: u16 },

    /// HTTP 503
    #[error("{service}: Service unavailable")]
    Unavailable { service: Service },

    /// No response within the call's timeout
    #[error("{service}: Request timeout")]
    Timeout { service: Service },

    /// Connection refused, DNS failure, reset, ...
    ///
    /// Transport detail names internal hosts, so it is logged where the
    /// failure is classified and never carried here.
    #[error("{service}: Network error")]
    Network { service: Service },

    /// Any other 4xx
    #[error("{service}: Request rejected (HTTP {status}): {message}")]
    Rejected {
        service: Service,
        status: u16,
        message: String,
    },

    /// 2xx with a body that does not match the expected shape
    #[error("{service}: Invalid response")]
    InvalidResponse { service: Service },
}

/// Coarse class of an upstream failure, used to choose an HTTP response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Caller input was unusable
    Validation,
    /// Backing service unreachable, slow, or failing (5xx)
    Unavailable,
    /// Backing service answered with a 4xx; status passes through
    Rejected(u16),
}

impl UpstreamError {
    /// Classify an HTTP status that is not a success
    pub fn from_status(service: Service, status: u16, message: impl Into<String>) -> Self {
        match status {
            401 => UpstreamError::Unauthorized { service },
            403 => UpstreamError::Forbidden { service },
            404 => UpstreamError::NotFound { service },
            503 => UpstreamError::Unavailable { service },
            500..=599 => UpstreamError::ServerError { service, status },
            _ => UpstreamError::Rejected {
                service,
                status,
                message: message.into(),
            },
        }
    }

    pub fn invalid_input(service: Service, reason: impl Into<String>) -> Self {
        UpstreamError::InvalidInput {
            service,
            reason: reason.into(),
        }
    }

    pub fn service(&self) -> Service {
        match self {
            UpstreamError::InvalidInput { service, .. }
            | UpstreamError::Unauthorized { service }
            | UpstreamError::Forbidden { service }
            | UpstreamError::NotFound { service }
            | UpstreamError::ServerError { service, .. }
            | UpstreamError::Unavailable { service }
            | UpstreamError::Timeout { service }
            | UpstreamError::Network { service }
            | UpstreamError::Rejected { service, .. }
            | UpstreamError::InvalidResponse { service } => *service,
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            UpstreamError::InvalidInput { .. } => ErrorClass::Validation,
            UpstreamError::Unauthorized { .. } => ErrorClass::Rejected(401),
            UpstreamError::Forbidden { .. } => ErrorClass::Rejected(403),
            UpstreamError::NotFound { .. } => ErrorClass::Rejected(404),
            UpstreamError::Rejected { status, .. } => ErrorClass::Rejected(*status),
            UpstreamError::ServerError { .. }
            | UpstreamError::Unavailable { .. }
            | UpstreamError::Timeout { .. }
            | UpstreamError::Network { .. }
            | UpstreamError::InvalidResponse { .. } => ErrorClass::Unavailable,
        }
    }

    /// The service answered and refused the credentials
    pub fn is_credential_rejection(&self) -> bool {
        matches!(
            self,
            UpstreamError::Unauthorized { .. } | UpstreamError::Forbidden { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_named_variants() {
        let s = Service::Grouping;
        assert_eq!(
            UpstreamError::from_status(s, 401, ""),
            UpstreamError::Unauthorized { service: s }
        );
        assert_eq!(
            UpstreamError::from_status(s, 403, ""),
            UpstreamError::Forbidden { service: s }
        );
        assert_eq!(
            UpstreamError::from_status(s, 404, ""),
            UpstreamError::NotFound { service: s }
        );
        assert_eq!(
            UpstreamError::from_status(s, 500, ""),
            UpstreamError::ServerError { service: s, status: 500 }
        );
        assert_eq!(
            UpstreamError::from_status(s, 503, ""),
            UpstreamError::Unavailable { service: s }
        );
        assert!(matches!(
            UpstreamError::from_status(s, 422, "bad paths"),
            UpstreamError::Rejected { status: 422, .. }
        ));
    }

    #[test]
    fn test_class_mapping() {
        let s = Service::Immich;
        assert_eq!(UpstreamError::Timeout { service: s }.class(), ErrorClass::Unavailable);
        assert_eq!(
            UpstreamError::ServerError { service: s, status: 502 }.class(),
            ErrorClass::Unavailable
        );
        assert_eq!(
            UpstreamError::Unauthorized { service: s }.class(),
            ErrorClass::Rejected(401)
        );
        assert_eq!(
            UpstreamError::invalid_input(s, "empty").class(),
            ErrorClass::Validation
        );
    }

    #[test]
    fn test_display_names_service() {
        let err = UpstreamError::Unavailable { service: Service::Deduplication };
        assert_eq!(err.to_string(), "deduplication: Service unavailable");
        assert_eq!(err.service(), Service::Deduplication);
    }

    #[test]
    fn test_credential_rejection() {
        assert!(UpstreamError::Unauthorized { service: Service::Immich }.is_credential_rejection());
        assert!(!UpstreamError::Timeout { service: Service::Immich }.is_credential_rejection());
    }
}
