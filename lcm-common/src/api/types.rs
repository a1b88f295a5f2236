//! Shared API request/response types

use serde::{Deserialize, Serialize};

/// Body of `POST /api/auth`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthRequest {
    #[serde(default)]
    pub password: String,
}

/// Successful login
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
}

/// `error` member of a failure response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (`NOT_FOUND`, `CONFLICT`, ...)
    pub code: String,
    pub message: String,
}

/// Failure response: `{success: false, error: {code, message}}`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_shape() {
        let json = serde_json::to_value(ErrorResponse::new("CONFLICT", "Already exists: subject ENG")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "CONFLICT");
        assert_eq!(json["error"]["message"], "Already exists: subject ENG");
    }

    #[test]
    fn test_auth_request_missing_password() {
        let request: AuthRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.password, "");
    }
}
