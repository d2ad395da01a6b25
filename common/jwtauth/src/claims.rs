use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AuthorizationError, ClaimsError};

/// Authenticated payload carried inside a token.
///
/// Temporal fields travel as NumericDate (whole seconds since the epoch). The
/// `with_*` setters drop sub-second precision so a value survives an
/// issue/verify round trip unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "iss", default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(rename = "sub", default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(rename = "aud", default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<Audience>,
    #[serde(
        rename = "exp",
        default,
        with = "chrono::serde::ts_seconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(
        rename = "nbf",
        default,
        with = "chrono::serde::ts_seconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub not_before: Option<DateTime<Utc>>,
    #[serde(
        rename = "iat",
        default,
        with = "chrono::serde::ts_seconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub issued_at: Option<DateTime<Utc>>,
    #[serde(rename = "jti", default, skip_serializing_if = "Option::is_none")]
    pub jwt_id: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// The `aud` claim, which may be a single string or an array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    Single(String),
    Many(Vec<String>),
}

impl Audience {
    pub fn contains(&self, audience: &str) -> bool {
        match self {
            Audience::Single(value) => value == audience,
            Audience::Many(values) => values.iter().any(|value| value == audience),
        }
    }
}

impl From<&str> for Audience {
    fn from(value: &str) -> Self {
        Audience::Single(value.to_owned())
    }
}

impl From<String> for Audience {
    fn from(value: String) -> Self {
        Audience::Single(value)
    }
}

impl From<Vec<String>> for Audience {
    fn from(value: Vec<String>) -> Self {
        Audience::Many(value)
    }
}

fn whole_seconds(at: DateTime<Utc>) -> DateTime<Utc> {
    Utc.timestamp_opt(at.timestamp(), 0).single().unwrap_or(at)
}

impl Claims {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_audience(mut self, audience: impl Into<Audience>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn with_expiration(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = Some(whole_seconds(at));
        self
    }

    pub fn with_not_before(mut self, at: DateTime<Utc>) -> Self {
        self.not_before = Some(whole_seconds(at));
        self
    }

    pub fn with_issued_at(mut self, at: DateTime<Utc>) -> Self {
        self.issued_at = Some(whole_seconds(at));
        self
    }

    pub fn with_jwt_id(mut self, jwt_id: impl Into<String>) -> Self {
        self.jwt_id = Some(jwt_id.into());
        self
    }

    /// Assigns a random v4 UUID as the `jti`.
    pub fn with_generated_jwt_id(self) -> Self {
        self.with_jwt_id(Uuid::new_v4().to_string())
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Checks the temporal bounds (`exp`, `nbf`) against the current time.
    ///
    /// Issuer, audience and subject are left to the caller's own policy.
    pub fn validate(&self) -> Result<(), ClaimsError> {
        self.validate_at(Utc::now(), 0)
    }

    /// Same rule as [`Claims::validate`] with an explicit clock and a
    /// symmetric leeway in seconds.
    pub fn validate_at(&self, now: DateTime<Utc>, leeway_seconds: u32) -> Result<(), ClaimsError> {
        let leeway = Duration::seconds(i64::from(leeway_seconds));

        if let Some(expired_at) = self.expires_at {
            if now - leeway >= expired_at {
                return Err(ClaimsError::Expired { expired_at });
            }
        }

        if let Some(not_before) = self.not_before {
            if now + leeway < not_before {
                return Err(ClaimsError::NotYetValid { not_before });
            }
        }

        Ok(())
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|value| value == role)
    }

    /// True when at least one candidate appears in `roles`.
    pub fn has_any_role<S: AsRef<str>>(&self, candidates: &[S]) -> bool {
        candidates
            .iter()
            .any(|candidate| self.has_role(candidate.as_ref()))
    }

    /// Like [`Claims::has_any_role`], but an empty `allowed` list means no
    /// role is required.
    pub fn ensure_any_role(&self, allowed: &[&str]) -> Result<(), AuthorizationError> {
        if allowed.is_empty() || self.has_any_role(allowed) {
            return Ok(());
        }

        Err(AuthorizationError::Forbidden {
            required: allowed.iter().map(|value| value.to_string()).collect(),
        })
    }
}
