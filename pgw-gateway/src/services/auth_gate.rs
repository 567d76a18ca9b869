//! Bearer-token authentication
//!
//! Cache-aside in front of the identity validator: a cached identity skips the
//! remote call; a miss validates live and writes through. The cache is an
//! optimization only, so its failures never reject a caller.

use pgw_common::api::{parse_bearer, HeaderError, Identity};
use pgw_common::UpstreamError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::TokenCache;
use crate::clients::IdentityValidator;

const GENERIC_VALIDATION_FAILURE: &str = "Token validation failed";

/// Why a request was refused authentication
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthRejection {
    #[error("Missing Authorization header")]
    MissingHeader,

    #[error("Invalid Authorization header format")]
    BadFormat,

    #[error("{0}")]
    InvalidToken(String),
}

impl AuthRejection {
    /// Error code carried in the response body
    pub fn code(&self) -> &'static str {
        match self {
            AuthRejection::MissingHeader | AuthRejection::BadFormat => "unauthorized",
            AuthRejection::InvalidToken(_) => "invalid_token",
        }
    }
}

impl From<HeaderError> for AuthRejection {
    fn from(err: HeaderError) -> Self {
        match err {
            HeaderError::Missing => AuthRejection::MissingHeader,
            HeaderError::BadFormat => AuthRejection::BadFormat,
        }
    }
}

/// Identity and token of an authenticated request
///
/// Inserted into request extensions by the auth middleware.
#[derive(Clone)]
pub struct AuthenticatedCaller {
    pub identity: Identity,
    pub token: String,
}

impl AuthenticatedCaller {
    pub fn new(identity: Identity, token: impl Into<String>) -> Self {
        Self {
            identity,
            token: token.into(),
        }
    }
}

impl fmt::Debug for AuthenticatedCaller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedCaller")
            .field("identity", &self.identity)
            .field("token", &"<redacted>")
            .finish()
    }
}

pub struct AuthGate {
    cache: Arc<TokenCache>,
    validator: Arc<dyn IdentityValidator>,
}

impl AuthGate {
    pub fn new(cache: Arc<TokenCache>, validator: Arc<dyn IdentityValidator>) -> Self {
        Self { cache, validator }
    }

    /// Resolve an Authorization header value to a caller
    pub async fn authenticate(
        &self,
        header: Option<&str>,
    ) -> Result<AuthenticatedCaller, AuthRejection> {
        let token = parse_bearer(header)?;

        match self.cache.get(token).await {
            Ok(Some(identity)) => {
                debug!(user_id = %identity.user_id, "Authenticated from token cache");
                return Ok(AuthenticatedCaller::new(identity, token));
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Token cache read failed, validating live"),
        }

        let identity = self
            .validator
            .validate_token(token)
            .await
            .map_err(rejection_for)?;

        if !identity.is_complete() {
            warn!("Validator returned an identity with blank claims");
            return Err(AuthRejection::InvalidToken(
                GENERIC_VALIDATION_FAILURE.to_string(),
            ));
        }

        if let Err(e) = self.cache.set(token, &identity).await {
            warn!(error = %e, "Token cache write failed");
        }

        debug!(user_id = %identity.user_id, "Authenticated by live validation");
        Ok(AuthenticatedCaller::new(identity, token))
    }
}

fn rejection_for(err: UpstreamError) -> AuthRejection {
    match err {
        UpstreamError::InvalidInput { .. } | UpstreamError::InvalidResponse { .. } => {
            warn!(error = %err, "Token validation failed unexpectedly");
            AuthRejection::InvalidToken(GENERIC_VALIDATION_FAILURE.to_string())
        }
        other => {
            debug!(error = %other, "Token rejected");
            AuthRejection::InvalidToken(other.to_string())
        }
    }
}
