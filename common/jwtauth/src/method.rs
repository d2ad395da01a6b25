use std::fmt;
use std::sync::Arc;

use jsonwebtoken::{crypto, Algorithm, DecodingKey, EncodingKey};

use crate::error::ConfigError;

/// Key material family an algorithm expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFamily {
    Rsa,
    Ec,
    Ed,
}

impl fmt::Display for KeyFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            KeyFamily::Rsa => "RSA",
            KeyFamily::Ec => "EC",
            KeyFamily::Ed => "Ed25519",
        };
        f.write_str(label)
    }
}

/// Signing capability the [`Issuer`](crate::Issuer) and
/// [`Verifier`](crate::Verifier) run their pipelines against.
///
/// `name` is the exact `alg` header value. Signatures are base64url encoded
/// without padding.
pub trait SigningMethod: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    fn family(&self) -> KeyFamily;

    /// The `jsonwebtoken` algorithm, when there is one. Issuers encode tokens
    /// for these methods with `jsonwebtoken::encode`.
    fn jwt_algorithm(&self) -> Option<Algorithm> {
        None
    }

    fn sign(&self, message: &[u8], key: &EncodingKey) -> jsonwebtoken::errors::Result<String>;

    fn verify(
        &self,
        message: &[u8],
        signature: &str,
        key: &DecodingKey,
    ) -> jsonwebtoken::errors::Result<bool>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaSize {
    Sha256,
    Sha384,
    Sha512,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Curve {
    P256,
    P384,
}

/// The asymmetric algorithm families backed by `jsonwebtoken::crypto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsymmetricMethod {
    RsaPkcs1(ShaSize),
    RsaPss(ShaSize),
    Ecdsa(Curve),
    EdDsa,
}

impl AsymmetricMethod {
    pub fn from_name(name: &str) -> Option<Self> {
        let method = match name {
            "RS256" => AsymmetricMethod::RsaPkcs1(ShaSize::Sha256),
            "RS384" => AsymmetricMethod::RsaPkcs1(ShaSize::Sha384),
            "RS512" => AsymmetricMethod::RsaPkcs1(ShaSize::Sha512),
            "PS256" => AsymmetricMethod::RsaPss(ShaSize::Sha256),
            "PS384" => AsymmetricMethod::RsaPss(ShaSize::Sha384),
            "PS512" => AsymmetricMethod::RsaPss(ShaSize::Sha512),
            "ES256" => AsymmetricMethod::Ecdsa(Curve::P256),
            "ES384" => AsymmetricMethod::Ecdsa(Curve::P384),
            "EdDSA" => AsymmetricMethod::EdDsa,
            _ => return None,
        };
        Some(method)
    }

    pub fn algorithm(&self) -> Algorithm {
        match self {
            AsymmetricMethod::RsaPkcs1(ShaSize::Sha256) => Algorithm::RS256,
            AsymmetricMethod::RsaPkcs1(ShaSize::Sha384) => Algorithm::RS384,
            AsymmetricMethod::RsaPkcs1(ShaSize::Sha512) => Algorithm::RS512,
            AsymmetricMethod::RsaPss(ShaSize::Sha256) => Algorithm::PS256,
            AsymmetricMethod::RsaPss(ShaSize::Sha384) => Algorithm::PS384,
            AsymmetricMethod::RsaPss(ShaSize::Sha512) => Algorithm::PS512,
            AsymmetricMethod::Ecdsa(Curve::P256) => Algorithm::ES256,
            AsymmetricMethod::Ecdsa(Curve::P384) => Algorithm::ES384,
            AsymmetricMethod::EdDsa => Algorithm::EdDSA,
        }
    }
}

impl SigningMethod for AsymmetricMethod {
    fn name(&self) -> &'static str {
        match self {
            AsymmetricMethod::RsaPkcs1(ShaSize::Sha256) => "RS256",
            AsymmetricMethod::RsaPkcs1(ShaSize::Sha384) => "RS384",
            AsymmetricMethod::RsaPkcs1(ShaSize::Sha512) => "RS512",
            AsymmetricMethod::RsaPss(ShaSize::Sha256) => "PS256",
            AsymmetricMethod::RsaPss(ShaSize::Sha384) => "PS384",
            AsymmetricMethod::RsaPss(ShaSize::Sha512) => "PS512",
            AsymmetricMethod::Ecdsa(Curve::P256) => "ES256",
            AsymmetricMethod::Ecdsa(Curve::P384) => "ES384",
            AsymmetricMethod::EdDsa => "EdDSA",
        }
    }

    fn family(&self) -> KeyFamily {
        match self {
            AsymmetricMethod::RsaPkcs1(_) | AsymmetricMethod::RsaPss(_) => KeyFamily::Rsa,
            AsymmetricMethod::Ecdsa(_) => KeyFamily::Ec,
            AsymmetricMethod::EdDsa => KeyFamily::Ed,
        }
    }

    fn jwt_algorithm(&self) -> Option<Algorithm> {
        Some(self.algorithm())
    }

    fn sign(&self, message: &[u8], key: &EncodingKey) -> jsonwebtoken::errors::Result<String> {
        crypto::sign(message, key, self.algorithm())
    }

    fn verify(
        &self,
        message: &[u8],
        signature: &str,
        key: &DecodingKey,
    ) -> jsonwebtoken::errors::Result<bool> {
        crypto::verify(signature, message, key, self.algorithm())
    }
}

/// Looks up a recognized asymmetric algorithm by its `alg` name.
///
/// HMAC algorithms and `none` are never recognized.
pub fn signing_method(name: &str) -> Option<Arc<dyn SigningMethod>> {
    AsymmetricMethod::from_name(name).map(|method| Arc::new(method) as Arc<dyn SigningMethod>)
}

pub(crate) fn resolve_method(
    algorithm: &str,
    custom: Option<Arc<dyn SigningMethod>>,
) -> Result<Arc<dyn SigningMethod>, ConfigError> {
    match custom {
        Some(method) => Ok(method),
        None => signing_method(algorithm)
            .ok_or_else(|| ConfigError::UnsupportedAlgorithm(algorithm.to_owned())),
    }
}

pub(crate) fn ensure_key_family(
    method: &dyn SigningMethod,
    key_family: Option<KeyFamily>,
) -> Result<(), ConfigError> {
    match key_family {
        Some(found) if found != method.family() => Err(ConfigError::KeyFamilyMismatch {
            algorithm: method.name().to_owned(),
            found,
        }),
        _ => Ok(()),
    }
}

pub(crate) fn ensure_key_id(key_id: &str) -> Result<(), ConfigError> {
    if key_id.is_empty() {
        return Err(ConfigError::EmptyKeyId);
    }
    Ok(())
}
