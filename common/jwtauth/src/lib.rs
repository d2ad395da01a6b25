pub mod claims;
pub mod config;
pub mod context;
pub mod error;
pub mod header;
pub mod issuer;
pub mod method;
pub mod token;
pub mod verifier;

pub use claims::{Audience, Claims};
pub use config::JwtConfig;
pub use context::AuthContext;
pub use error::{
    AuthError, AuthorizationError, ClaimsError, ConfigError, SigningError, VerificationError,
    VerifyResult,
};
pub use header::TokenHeader;
pub use issuer::{Issuer, IssuerBuilder};
pub use method::{signing_method, AsymmetricMethod, KeyFamily, SigningMethod};
pub use token::Token;
pub use verifier::{PublicKey, Verifier, VerifierBuilder};
