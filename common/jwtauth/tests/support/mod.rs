#![allow(dead_code)]

use std::sync::OnceLock;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use p256::pkcs8::{EncodePrivateKey, EncodePublicKey};
use rsa::pkcs1::{EncodeRsaPrivateKey, EncodeRsaPublicKey, LineEnding};
use rsa::rand_core::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::RsaPrivateKey;
use tracing_subscriber::EnvFilter;

pub struct RsaKeyMaterial {
    pub private_pem: String,
    pub public_pem: String,
    pub modulus: String,
    pub exponent: String,
}

pub struct EcKeyMaterial {
    pub private_pem: String,
    pub public_pem: String,
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Shared RSA key pair; 2048-bit generation is slow enough to do once.
pub fn rsa_keys() -> &'static RsaKeyMaterial {
    static KEYS: OnceLock<RsaKeyMaterial> = OnceLock::new();
    KEYS.get_or_init(generate_rsa_key_material)
}

/// A second, unrelated RSA key pair.
pub fn other_rsa_keys() -> &'static RsaKeyMaterial {
    static KEYS: OnceLock<RsaKeyMaterial> = OnceLock::new();
    KEYS.get_or_init(generate_rsa_key_material)
}

fn generate_rsa_key_material() -> RsaKeyMaterial {
    let mut rng = OsRng;
    let private_key = RsaPrivateKey::new(&mut rng, 2048).expect("key generation");
    let public_key = private_key.to_public_key();

    let private_pem = private_key
        .to_pkcs1_pem(LineEnding::LF)
        .expect("private pem")
        .to_string();
    let public_pem = public_key.to_pkcs1_pem(LineEnding::LF).expect("public pem");
    let modulus = URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be());
    let exponent = URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be());

    RsaKeyMaterial {
        private_pem,
        public_pem,
        modulus,
        exponent,
    }
}

pub fn ec_keys() -> EcKeyMaterial {
    let secret = p256::SecretKey::random(&mut OsRng);
    let private_pem = secret
        .to_pkcs8_pem(LineEnding::LF)
        .expect("private pem")
        .to_string();
    let public_pem = secret
        .public_key()
        .to_public_key_pem(LineEnding::LF)
        .expect("public pem");

    EcKeyMaterial {
        private_pem,
        public_pem,
    }
}

/// Splits a compact token into its three segments.
pub fn segments(token: &str) -> (String, String, String) {
    let mut parts = token.split('.');
    let header = parts.next().expect("header").to_string();
    let payload = parts.next().expect("payload").to_string();
    let signature = parts.next().expect("signature").to_string();
    assert!(parts.next().is_none(), "token has more than three segments");
    (header, payload, signature)
}

/// Re-encodes the header segment after `edit` mutates its JSON, keeping the
/// original payload and signature.
pub fn rewrite_header(token: &str, edit: impl FnOnce(&mut serde_json::Value)) -> String {
    let (header, payload, signature) = segments(token);
    let bytes = URL_SAFE_NO_PAD.decode(header).expect("header base64");
    let mut value: serde_json::Value = serde_json::from_slice(&bytes).expect("header json");
    edit(&mut value);
    let header = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&value).expect("header json"));
    format!("{header}.{payload}.{signature}")
}
