use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{encode, EncodingKey, Header};
use tracing::debug;

use crate::claims::Claims;
use crate::config::JwtConfig;
use crate::error::{ConfigError, SigningError};
use crate::header::{encode_segment, TokenHeader};
use crate::method::{ensure_key_family, ensure_key_id, resolve_method, KeyFamily, SigningMethod};
use crate::token::Token;

/// Server-side token minting with a fixed algorithm, private key and `kid`.
#[derive(Clone)]
pub struct Issuer {
    method: Arc<dyn SigningMethod>,
    key: Arc<EncodingKey>,
    key_id: String,
    config: JwtConfig,
}

impl fmt::Debug for Issuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Issuer")
            .field("algorithm", &self.method.name())
            .field("key_id", &self.key_id)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Issuer {
    pub fn new(
        algorithm: &str,
        private_key: EncodingKey,
        key_id: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Self::builder(algorithm)
            .with_private_key(private_key)
            .with_key_id(key_id)
            .build()
    }

    pub fn builder(algorithm: impl Into<String>) -> IssuerBuilder {
        IssuerBuilder::new(algorithm)
    }

    pub fn algorithm(&self) -> &'static str {
        self.method.name()
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    /// Signs `claims` into a compact `header.payload.signature` token whose
    /// header carries the configured `kid`.
    pub fn issue(&self, claims: &Claims) -> Result<String, SigningError> {
        let token = match self.method.jwt_algorithm() {
            Some(algorithm) => {
                let mut header = Header::new(algorithm);
                header.typ = self.config.token_type.clone();
                header.kid = Some(self.key_id.clone());
                encode(&header, claims, &self.key).map_err(|err| match err.kind() {
                    ErrorKind::Json(_) => SigningError::Serialize("token", err.to_string()),
                    _ => SigningError::Crypto(err.to_string()),
                })?
            }
            None => self.issue_with_method(claims)?,
        };

        debug!(kid = %self.key_id, alg = self.method.name(), "issued JWT");
        Ok(token)
    }

    fn issue_with_method(&self, claims: &Claims) -> Result<String, SigningError> {
        let header = TokenHeader::new(
            self.method.name(),
            self.config.token_type.clone(),
            self.key_id.as_str(),
        );
        let header_segment = encode_segment(&header)
            .map_err(|err| SigningError::Serialize("header", err.to_string()))?;
        let payload_segment = encode_segment(claims)
            .map_err(|err| SigningError::Serialize("claims", err.to_string()))?;

        let signing_input = format!("{header_segment}.{payload_segment}");
        let signature = self
            .method
            .sign(signing_input.as_bytes(), &self.key)
            .map_err(|err| SigningError::Crypto(err.to_string()))?;
        Ok(format!("{signing_input}.{signature}"))
    }

    /// Issues `claims` and wraps the result as a bearer [`Token`].
    pub fn issue_token(&self, claims: &Claims) -> Result<Token, SigningError> {
        let access_token = self.issue(claims)?;
        let token = Token::bearer(access_token);
        Ok(match claims.expires_at {
            Some(expires_at) => {
                let remaining = (expires_at - Utc::now()).num_seconds().max(0);
                token.with_expires_in(remaining)
            }
            None => token,
        })
    }
}

pub struct IssuerBuilder {
    algorithm: String,
    method: Option<Arc<dyn SigningMethod>>,
    key: Option<EncodingKey>,
    key_family: Option<KeyFamily>,
    key_id: String,
    config: JwtConfig,
}

impl fmt::Debug for IssuerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuerBuilder")
            .field("algorithm", &self.algorithm)
            .field("key_id", &self.key_id)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl IssuerBuilder {
    fn new(algorithm: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
            method: None,
            key: None,
            key_family: None,
            key_id: String::new(),
            config: JwtConfig::default(),
        }
    }

    /// Replaces the named algorithm with a caller-supplied implementation.
    pub fn with_signing_method(mut self, method: Arc<dyn SigningMethod>) -> Self {
        self.algorithm = method.name().to_owned();
        self.method = Some(method);
        self
    }

    pub fn with_private_key(mut self, key: EncodingKey) -> Self {
        self.key = Some(key);
        self.key_family = None;
        self
    }

    pub fn with_rsa_pem(self, pem: &[u8]) -> Result<Self, ConfigError> {
        let key = EncodingKey::from_rsa_pem(pem).map_err(|err| ConfigError::KeyParse {
            kind: "RSA private",
            reason: err.to_string(),
        })?;
        Ok(self.with_parsed_key(key, KeyFamily::Rsa))
    }

    pub fn with_ec_pem(self, pem: &[u8]) -> Result<Self, ConfigError> {
        let key = EncodingKey::from_ec_pem(pem).map_err(|err| ConfigError::KeyParse {
            kind: "EC private",
            reason: err.to_string(),
        })?;
        Ok(self.with_parsed_key(key, KeyFamily::Ec))
    }

    pub fn with_ed_pem(self, pem: &[u8]) -> Result<Self, ConfigError> {
        let key = EncodingKey::from_ed_pem(pem).map_err(|err| ConfigError::KeyParse {
            kind: "Ed25519 private",
            reason: err.to_string(),
        })?;
        Ok(self.with_parsed_key(key, KeyFamily::Ed))
    }

    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = key_id.into();
        self
    }

    pub fn with_config(mut self, config: JwtConfig) -> Self {
        self.config = config;
        self
    }

    fn with_parsed_key(mut self, key: EncodingKey, family: KeyFamily) -> Self {
        self.key = Some(key);
        self.key_family = Some(family);
        self
    }

    pub fn build(self) -> Result<Issuer, ConfigError> {
        let method = resolve_method(&self.algorithm, self.method)?;
        let key = self.key.ok_or(ConfigError::MissingKey("private"))?;
        ensure_key_family(method.as_ref(), self.key_family)?;
        ensure_key_id(&self.key_id)?;

        Ok(Issuer {
            method,
            key: Arc::new(key),
            key_id: self.key_id,
            config: self.config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placeholder_key() -> EncodingKey {
        EncodingKey::from_secret(b"construction checks never touch key bytes")
    }

    #[test]
    fn rejects_unrecognized_algorithm() {
        let err = Issuer::new("not-a-real-alg", placeholder_key(), "kid1")
            .expect_err("should reject");
        assert!(matches!(err, ConfigError::UnsupportedAlgorithm(name) if name == "not-a-real-alg"));
    }

    #[test]
    fn rejects_symmetric_algorithm() {
        let err = Issuer::new("HS256", placeholder_key(), "kid1").expect_err("should reject");
        assert!(matches!(err, ConfigError::UnsupportedAlgorithm(_)));
    }

    #[test]
    fn rejects_missing_private_key() {
        let err = Issuer::builder("RS256")
            .with_key_id("kid1")
            .build()
            .expect_err("should reject");
        assert!(matches!(err, ConfigError::MissingKey("private")));
    }

    #[test]
    fn rejects_empty_key_id() {
        let err = Issuer::new("RS256", placeholder_key(), "").expect_err("should reject");
        assert!(matches!(err, ConfigError::EmptyKeyId));
    }

    #[test]
    fn rejects_unparseable_pem() {
        let err = Issuer::builder("RS256")
            .with_rsa_pem(b"-----BEGIN NOTHING-----")
            .expect_err("should reject");
        assert!(matches!(err, ConfigError::KeyParse { kind: "RSA private", .. }));
    }

    #[test]
    fn accepts_recognized_algorithm() {
        let issuer = Issuer::new("RS256", placeholder_key(), "main").expect("issuer");
        assert_eq!(issuer.algorithm(), "RS256");
        assert_eq!(issuer.key_id(), "main");
        let rendered = format!("{issuer:?}");
        assert!(rendered.contains("RS256"));
        assert!(!rendered.contains("construction checks"));
    }
}
