use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::DecodingKey;
use tracing::debug;

use crate::claims::Claims;
use crate::config::JwtConfig;
use crate::error::{ConfigError, VerificationError, VerifyResult};
use crate::header::{decode_segment, TokenHeader, TokenSegments};
use crate::method::{ensure_key_family, ensure_key_id, resolve_method, KeyFamily, SigningMethod};

/// Public key material tagged with the family it was parsed as.
///
/// Only the parsing constructors can build one, so the family always matches
/// the key bytes and [`VerifierBuilder::build`] can reject an algorithm that
/// does not fit.
#[derive(Clone)]
pub struct PublicKey {
    key: DecodingKey,
    family: KeyFamily,
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey")
            .field("family", &self.family)
            .finish_non_exhaustive()
    }
}

impl PublicKey {
    pub fn from_rsa_pem(pem: &[u8]) -> Result<Self, ConfigError> {
        let key = DecodingKey::from_rsa_pem(pem).map_err(|err| ConfigError::KeyParse {
            kind: "RSA public",
            reason: err.to_string(),
        })?;
        Ok(Self::tagged(key, KeyFamily::Rsa))
    }

    /// Builds the key from base64url modulus and exponent, as published in a JWK.
    pub fn from_rsa_components(modulus: &str, exponent: &str) -> Result<Self, ConfigError> {
        let key = DecodingKey::from_rsa_components(modulus, exponent).map_err(|err| {
            ConfigError::KeyParse {
                kind: "RSA public",
                reason: err.to_string(),
            }
        })?;
        Ok(Self::tagged(key, KeyFamily::Rsa))
    }

    pub fn from_rsa_der(der: &[u8]) -> Self {
        Self::tagged(DecodingKey::from_rsa_der(der), KeyFamily::Rsa)
    }

    pub fn from_ec_pem(pem: &[u8]) -> Result<Self, ConfigError> {
        let key = DecodingKey::from_ec_pem(pem).map_err(|err| ConfigError::KeyParse {
            kind: "EC public",
            reason: err.to_string(),
        })?;
        Ok(Self::tagged(key, KeyFamily::Ec))
    }

    pub fn from_ec_der(der: &[u8]) -> Self {
        Self::tagged(DecodingKey::from_ec_der(der), KeyFamily::Ec)
    }

    pub fn from_ed_pem(pem: &[u8]) -> Result<Self, ConfigError> {
        let key = DecodingKey::from_ed_pem(pem).map_err(|err| ConfigError::KeyParse {
            kind: "Ed25519 public",
            reason: err.to_string(),
        })?;
        Ok(Self::tagged(key, KeyFamily::Ed))
    }

    pub fn from_ed_der(der: &[u8]) -> Self {
        Self::tagged(DecodingKey::from_ed_der(der), KeyFamily::Ed)
    }

    pub fn family(&self) -> KeyFamily {
        self.family
    }

    fn tagged(key: DecodingKey, family: KeyFamily) -> Self {
        Self { key, family }
    }
}

/// Relying-party token verification pinned to one algorithm, public key and `kid`.
#[derive(Clone)]
pub struct Verifier {
    method: Arc<dyn SigningMethod>,
    key: Arc<DecodingKey>,
    key_id: String,
    config: JwtConfig,
}

impl fmt::Debug for Verifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Verifier")
            .field("algorithm", &self.method.name())
            .field("key_id", &self.key_id)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Verifier {
    pub fn new(
        algorithm: &str,
        public_key: PublicKey,
        expected_key_id: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Self::builder(algorithm)
            .with_public_key(public_key)
            .with_key_id(expected_key_id)
            .build()
    }

    pub fn builder(algorithm: impl Into<String>) -> VerifierBuilder {
        VerifierBuilder::new(algorithm)
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

    /// Parses and validates `token`, returning its claims only when every
    /// check passes.
    ///
    /// Checks run in order and the first failure is returned: structure,
    /// header `alg`, header `kid`, signature, then `exp`/`nbf`. The header
    /// pins are evaluated before the public key is used.
    pub fn verify(&self, token: &str) -> VerifyResult<Claims> {
        match self.verify_inner(token) {
            Ok(claims) => {
                debug!(kid = %self.key_id, "verified JWT successfully");
                Ok(claims)
            }
            Err(err) => {
                debug!(reason = err.code(), error = %err, "rejected JWT");
                Err(err)
            }
        }
    }

    fn verify_inner(&self, token: &str) -> VerifyResult<Claims> {
        let segments = TokenSegments::split(token).ok_or_else(|| {
            VerificationError::Malformed("expected header.payload.signature".to_string())
        })?;

        let header: TokenHeader = decode_segment(segments.header)
            .map_err(|reason| VerificationError::Malformed(format!("header: {reason}")))?;

        if header.alg != self.method.name() {
            return Err(VerificationError::UnexpectedAlgorithm {
                expected: self.method.name().to_owned(),
                found: header.alg,
            });
        }

        let kid = header.kid.ok_or(VerificationError::MissingKeyId)?;
        if kid != self.key_id {
            return Err(VerificationError::KeyIdMismatch {
                expected: self.key_id.clone(),
                found: kid,
            });
        }

        let valid = self
            .method
            .verify(
                segments.signing_input.as_bytes(),
                segments.signature,
                &self.key,
            )
            .map_err(classify_crypto_error)?;
        if !valid {
            return Err(VerificationError::InvalidSignature);
        }

        let claims: Claims = decode_segment(segments.payload)
            .map_err(|reason| VerificationError::Malformed(format!("payload: {reason}")))?;
        claims.validate_at(Utc::now(), self.config.leeway_seconds)?;
        Ok(claims)
    }
}

fn classify_crypto_error(err: jsonwebtoken::errors::Error) -> VerificationError {
    match err.kind() {
        ErrorKind::Base64(_) => {
            VerificationError::Malformed("signature: invalid base64url".to_string())
        }
        ErrorKind::InvalidSignature => VerificationError::InvalidSignature,
        _ => VerificationError::Unverifiable(err.to_string()),
    }
}

pub struct VerifierBuilder {
    algorithm: String,
    method: Option<Arc<dyn SigningMethod>>,
    key: Option<PublicKey>,
    key_id: String,
    config: JwtConfig,
}

impl VerifierBuilder {
    fn new(algorithm: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
            method: None,
            key: None,
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

    pub fn with_public_key(mut self, key: PublicKey) -> Self {
        self.key = Some(key);
        self
    }

    pub fn with_rsa_pem(self, pem: &[u8]) -> Result<Self, ConfigError> {
        Ok(self.with_public_key(PublicKey::from_rsa_pem(pem)?))
    }

    /// Builds the key from base64url modulus and exponent, as published in a JWK.
    pub fn with_rsa_components(self, modulus: &str, exponent: &str) -> Result<Self, ConfigError> {
        Ok(self.with_public_key(PublicKey::from_rsa_components(modulus, exponent)?))
    }

    pub fn with_ec_pem(self, pem: &[u8]) -> Result<Self, ConfigError> {
        Ok(self.with_public_key(PublicKey::from_ec_pem(pem)?))
    }

    pub fn with_ed_pem(self, pem: &[u8]) -> Result<Self, ConfigError> {
        Ok(self.with_public_key(PublicKey::from_ed_pem(pem)?))
    }

    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = key_id.into();
        self
    }

    pub fn with_config(mut self, config: JwtConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Verifier, ConfigError> {
        let method = resolve_method(&self.algorithm, self.method)?;
        let key = self.key.ok_or(ConfigError::MissingKey("public"))?;
        ensure_key_family(method.as_ref(), Some(key.family()))?;
        ensure_key_id(&self.key_id)?;

        Ok(Verifier {
            method,
            key: Arc::new(key.key),
            key_id: self.key_id,
            config: self.config,
        })
    }
}
