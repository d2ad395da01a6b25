use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::method::KeyFamily;

pub type VerifyResult<T> = Result<T, VerificationError>;

/// Rejected construction arguments for an [`Issuer`](crate::Issuer) or
/// [`Verifier`](crate::Verifier).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unsupported signing algorithm '{0}'")]
    UnsupportedAlgorithm(String),
    #[error("no {0} key configured")]
    MissingKey(&'static str),
    #[error("key id must not be empty")]
    EmptyKeyId,
    #[error("failed to parse {kind} key: {reason}")]
    KeyParse { kind: &'static str, reason: String },
    #[error("algorithm '{algorithm}' cannot be used with a {found} key")]
    KeyFamilyMismatch { algorithm: String, found: KeyFamily },
}

#[derive(Debug, Error)]
pub enum SigningError {
    #[error("failed to serialize token {0}: {1}")]
    Serialize(&'static str, String),
    #[error("failed to sign token: {0}")]
    Crypto(String),
}

/// Temporal validation failures reported by [`Claims::validate`](crate::Claims::validate).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimsError {
    #[error("token expired at {expired_at}")]
    Expired { expired_at: DateTime<Utc> },
    #[error("token not valid before {not_before}")]
    NotYetValid { not_before: DateTime<Utc> },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("malformed token: {0}")]
    Malformed(String),
    #[error("unexpected signing algorithm '{found}', expected '{expected}'")]
    UnexpectedAlgorithm { expected: String, found: String },
    #[error("token missing kid header")]
    MissingKeyId,
    #[error("token kid '{found}' does not match expected '{expected}'")]
    KeyIdMismatch { expected: String, found: String },
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token could not be verified: {0}")]
    Unverifiable(String),
    #[error("token expired at {expired_at}")]
    Expired { expired_at: DateTime<Utc> },
    #[error("token not valid before {not_before}")]
    NotYetValid { not_before: DateTime<Utc> },
}

impl From<ClaimsError> for VerificationError {
    fn from(value: ClaimsError) -> Self {
        match value {
            ClaimsError::Expired { expired_at } => Self::Expired { expired_at },
            ClaimsError::NotYetValid { not_before } => Self::NotYetValid { not_before },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorizationError {
    #[error("insufficient role, required one of: {}", required.join(", "))]
    Forbidden { required: Vec<String> },
}

/// Failures while turning an `Authorization` header into an [`AuthContext`](crate::AuthContext).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("authorization header missing")]
    MissingAuthorization,
    #[error("authorization header malformed")]
    InvalidAuthorization,
    #[error(transparent)]
    Verification(#[from] VerificationError),
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        "AUTH_CONFIG"
    }
}

impl SigningError {
    pub fn code(&self) -> &'static str {
        "AUTH_SIGNING"
    }
}

impl VerificationError {
    /// Stable machine-readable code for callers mapping failures onto their own wire errors.
    pub fn code(&self) -> &'static str {
        match self {
            VerificationError::Malformed(_) => "AUTH_TOKEN",
            VerificationError::UnexpectedAlgorithm { .. } => "AUTH_ALGORITHM",
            VerificationError::MissingKeyId | VerificationError::KeyIdMismatch { .. } => {
                "AUTH_KEY"
            }
            VerificationError::InvalidSignature | VerificationError::Unverifiable(_) => {
                "AUTH_SIGNATURE"
            }
            VerificationError::Expired { .. } | VerificationError::NotYetValid { .. } => {
                "AUTH_EXPIRED"
            }
        }
    }
}

impl AuthorizationError {
    pub fn code(&self) -> &'static str {
        "AUTH_FORBIDDEN"
    }
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthorization | AuthError::InvalidAuthorization => "AUTH_HEADER",
            AuthError::Verification(err) => err.code(),
        }
    }
}
