/// Runtime tuning shared by the issuer and verifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JwtConfig {
    /// Allowable clock skew in seconds when validating exp/nbf.
    pub leeway_seconds: u32,
    /// Value written to the `typ` header; `None` omits it.
    pub token_type: Option<String>,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl JwtConfig {
    /// Strict temporal checks (no leeway) and `typ: JWT`.
    pub fn new() -> Self {
        Self {
            leeway_seconds: 0,
            token_type: Some("JWT".to_string()),
        }
    }

    /// Adjust the allowed leeway.
    pub fn with_leeway(mut self, seconds: u32) -> Self {
        self.leeway_seconds = seconds;
        self
    }

    pub fn with_token_type(mut self, token_type: Option<String>) -> Self {
        self.token_type = token_type;
        self
    }
}
