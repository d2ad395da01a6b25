use serde::{Deserialize, Serialize};

/// Issued access token as handed back to a client.
///
/// `refresh_token` is carried for callers that mint one but is never
/// serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    #[serde(skip)]
    pub refresh_token: Option<String>,
}

impl Token {
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: "Bearer".to_string(),
            expires_in: None,
            refresh_token: None,
        }
    }

    pub fn with_expires_in(mut self, seconds: i64) -> Self {
        self.expires_in = Some(seconds);
        self
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// `Authorization` header value for this token.
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn refresh_token_is_never_serialized() {
        let token = Token::bearer("abc.def.ghi")
            .with_expires_in(900)
            .with_refresh_token("secret-refresh");

        let value = serde_json::to_value(&token).expect("serialize");
        assert_eq!(
            value,
            json!({
                "access_token": "abc.def.ghi",
                "token_type": "Bearer",
                "expires_in": 900,
            })
        );
    }

    #[test]
    fn deserialized_token_has_no_refresh_token() {
        let token: Token = serde_json::from_value(json!({
            "access_token": "abc.def.ghi",
            "token_type": "Bearer",
            "refresh_token": "ignored",
        }))
        .expect("deserialize");
        assert_eq!(token.refresh_token, None);
        assert_eq!(token.expires_in, None);
    }

    #[test]
    fn authorization_header_uses_token_type() {
        assert_eq!(
            Token::bearer("abc.def.ghi").authorization_header(),
            "Bearer abc.def.ghi"
        );
    }
}
