use http::header::AUTHORIZATION;
use http::{Extensions, HeaderMap, HeaderValue};

use crate::claims::Claims;
use crate::error::AuthError;
use crate::verifier::Verifier;

/// Verified claims plus the raw token, carried between request stages.
///
/// The type itself is the lookup key in [`http::Extensions`]; there is no
/// named slot to agree on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub claims: Claims,
    pub token: String,
}

impl AuthContext {
    /// Verifies the bearer token found in `headers`.
    pub fn from_headers(verifier: &Verifier, headers: &HeaderMap) -> Result<Self, AuthError> {
        let value = headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthorization)?;
        Self::from_authorization(verifier, value)
    }

    pub fn from_authorization(verifier: &Verifier, value: &HeaderValue) -> Result<Self, AuthError> {
        let token = parse_bearer(value)?;
        let claims = verifier.verify(token)?;
        Ok(Self {
            claims,
            token: token.to_owned(),
        })
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.claims.has_role(role)
    }

    pub fn into_claims(self) -> Claims {
        self.claims
    }

    /// Stores the context, returning any context it displaced.
    pub fn insert_into(self, extensions: &mut Extensions) -> Option<AuthContext> {
        extensions.insert(self)
    }

    pub fn from_extensions(extensions: &Extensions) -> Option<&AuthContext> {
        extensions.get::<AuthContext>()
    }
}

fn parse_bearer(value: &HeaderValue) -> Result<&str, AuthError> {
    let raw = value
        .to_str()
        .map_err(|_| AuthError::InvalidAuthorization)?
        .trim();

    let token = raw
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthorization)?
        .trim();

    if token.is_empty() {
        return Err(AuthError::InvalidAuthorization);
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bearer_accepts_valid_token() {
        let header = HeaderValue::from_static("Bearer abc.def.ghi");
        let token = parse_bearer(&header).expect("token");
        assert_eq!(token, "abc.def.ghi");
    }

    #[test]
    fn parse_bearer_rejects_wrong_scheme() {
        let header = HeaderValue::from_static("Basic credentials");
        let err = parse_bearer(&header).expect_err("should reject");
        assert!(matches!(err, AuthError::InvalidAuthorization));
    }

    #[test]
    fn parse_bearer_rejects_empty_value() {
        let header = HeaderValue::from_static("Bearer    ");
        let err = parse_bearer(&header).expect_err("should reject empty token");
        assert!(matches!(err, AuthError::InvalidAuthorization));
    }

    #[test]
    fn extensions_carry_context_by_type() {
        let mut extensions = Extensions::new();
        assert!(AuthContext::from_extensions(&extensions).is_none());

        let context = AuthContext {
            claims: Claims::new().with_subject("user-1").with_roles(["admin"]),
            token: "abc.def.ghi".to_string(),
        };
        assert!(context.clone().insert_into(&mut extensions).is_none());

        let stored = AuthContext::from_extensions(&extensions).expect("stored");
        assert!(stored.has_role("admin"));
        assert_eq!(stored, &context);

        let displaced = AuthContext {
            claims: Claims::new(),
            token: "other".to_string(),
        }
        .insert_into(&mut extensions)
        .expect("previous context");
        assert_eq!(displaced.into_claims().subject.as_deref(), Some("user-1"));
    }
}
