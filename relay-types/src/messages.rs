//! JSON bodies exchanged with the relay.

use serde::{Deserialize, Serialize};

use crate::Code;

/// Body of a token submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitRequest {
    /// Opaque discovery token, usually base64 of the vendor's archived blob.
    pub token: String,
}

impl SubmitRequest {
    /// Wrap a token for submission.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

/// Body returned by both submit and lookup.
///
/// The HTTP status is 200 whether or not the operation worked; callers
/// must look at `success`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Assigned or requested code. `null` when a lookup path held no digits.
    pub id: Option<Code>,
    /// Stored token, or empty on failure.
    pub token: String,
    /// Whether the write or lookup succeeded.
    pub success: bool,
}

impl TokenResponse {
    /// Submission refused before reaching storage.
    pub fn rejected() -> Self {
        Self {
            id: Some(Code::REJECTED),
            token: String::new(),
            success: false,
        }
    }

    /// Result of a storage write for `code`.
    pub fn stored(code: Code, token: String, success: bool) -> Self {
        Self {
            id: Some(code),
            token,
            success,
        }
    }

    /// Lookup hit.
    pub fn found(id: Option<Code>, token: String) -> Self {
        Self {
            id,
            token,
            success: true,
        }
    }

    /// Lookup miss (or failed read).
    pub fn missing(id: Option<Code>) -> Self {
        Self {
            id,
            token: String::new(),
            success: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_matches_wire_shape() {
        let json = serde_json::to_value(TokenResponse::rejected()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "id": -1, "token": "", "success": false })
        );
    }

    #[test]
    fn missing_without_digits_serializes_null_id() {
        let json = serde_json::to_value(TokenResponse::missing(None)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "id": null, "token": "", "success": false })
        );
    }

    #[test]
    fn found_carries_token_verbatim() {
        let resp = TokenResponse::found(Some(Code::new(4231)), "QUJD".to_string());
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"id":4231,"token":"QUJD","success":true}"#);
    }

    #[test]
    fn submit_request_parses_extra_fields() {
        let req: SubmitRequest =
            serde_json::from_str(r#"{"token":"QUJD","device":"phone"}"#).unwrap();
        assert_eq!(req, SubmitRequest::new("QUJD"));
    }

    #[test]
    fn submit_request_requires_token() {
        assert!(serde_json::from_str::<SubmitRequest>(r#"{"tok":"x"}"#).is_err());
        assert!(serde_json::from_str::<SubmitRequest>(r#"{"token":5}"#).is_err());
    }

    #[test]
    fn response_parses_from_relay_json() {
        let resp: TokenResponse =
            serde_json::from_str(r#"{"id":9999,"token":"","success":false}"#).unwrap();
        assert_eq!(resp, TokenResponse::missing(Some(Code::new(9999))));
    }
}
