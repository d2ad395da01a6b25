use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// JOSE header written by the issuer and pinned by the verifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHeader {
    pub alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

impl TokenHeader {
    pub fn new(alg: impl Into<String>, typ: Option<String>, kid: impl Into<String>) -> Self {
        Self {
            alg: alg.into(),
            typ,
            kid: Some(kid.into()),
        }
    }
}

/// Borrowed view of a compact `header.payload.signature` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TokenSegments<'a> {
    pub header: &'a str,
    pub payload: &'a str,
    pub signature: &'a str,
    /// `header.payload`, the bytes the signature covers.
    pub signing_input: &'a str,
}

impl<'a> TokenSegments<'a> {
    pub fn split(token: &'a str) -> Option<Self> {
        let (signing_input, signature) = token.rsplit_once('.')?;
        let (header, payload) = signing_input.split_once('.')?;
        if header.is_empty() || payload.is_empty() || payload.contains('.') {
            return None;
        }

        Some(Self {
            header,
            payload,
            signature,
            signing_input,
        })
    }
}

pub(crate) fn encode_segment<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let json = serde_json::to_vec(value)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

pub(crate) fn decode_segment<T: DeserializeOwned>(segment: &str) -> Result<T, String> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|err| format!("invalid base64url: {err}"))?;
    serde_json::from_slice(&bytes).map_err(|err| format!("invalid JSON: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_exposes_signing_input() {
        let segments = TokenSegments::split("aaa.bbb.ccc").expect("three segments");
        assert_eq!(segments.header, "aaa");
        assert_eq!(segments.payload, "bbb");
        assert_eq!(segments.signature, "ccc");
        assert_eq!(segments.signing_input, "aaa.bbb");
    }

    #[test]
    fn split_rejects_wrong_segment_counts() {
        assert!(TokenSegments::split("").is_none());
        assert!(TokenSegments::split("aaa").is_none());
        assert!(TokenSegments::split("aaa.bbb").is_none());
        assert!(TokenSegments::split("aaa.bbb.ccc.ddd").is_none());
        assert!(TokenSegments::split(".bbb.ccc").is_none());
    }

    #[test]
    fn header_round_trips_through_a_segment() {
        let header = TokenHeader::new("RS256", Some("JWT".to_string()), "main");
        let segment = encode_segment(&header).expect("encode");
        assert!(!segment.contains('='));

        let decoded: TokenHeader = decode_segment(&segment).expect("decode");
        assert_eq!(decoded, header);
    }

    #[test]
    fn header_without_kid_decodes_to_none() {
        let segment = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256"}"#);
        let decoded: TokenHeader = decode_segment(&segment).expect("decode");
        assert_eq!(decoded.kid, None);
        assert_eq!(decoded.typ, None);
    }

    #[test]
    fn decode_reports_base64_and_json_failures() {
        let err = decode_segment::<TokenHeader>("***").expect_err("bad base64");
        assert!(err.starts_with("invalid base64url"));

        let segment = URL_SAFE_NO_PAD.encode(b"not json");
        let err = decode_segment::<TokenHeader>(&segment).expect_err("bad json");
        assert!(err.starts_with("invalid JSON"));
    }
}
