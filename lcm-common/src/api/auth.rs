//! Shared-password authentication
//!
//! The admin password is compared by SHA-256 digest. A successful login hands
//! out a random session token; token bookkeeping lives in the service.
//!
//! This module contains only pure functions, no HTTP framework types.

use sha2::{Digest, Sha256};

/// SHA-256 of a password as 64 hex characters
///
/// # Examples
///
/// ```
/// use lcm_common::api::auth::password_digest;
///
/// let digest = password_digest("admin123");
/// assert_eq!(digest.len(), 64);
/// ```
pub fn password_digest(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Check a submitted password against the configured one
///
/// Both sides are digested first so the comparison always walks 64 bytes.
///
/// ```
/// use lcm_common::api::auth::verify_password;
///
/// assert!(verify_password("secret", "secret"));
/// assert!(!verify_password("Secret", "secret"));
/// ```
pub fn verify_password(submitted: &str, expected: &str) -> bool {
    let submitted = password_digest(submitted);
    let expected = password_digest(expected);

    submitted
        .bytes()
        .zip(expected.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// Fresh random session token
pub fn new_session_token() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Extract the token of an `Authorization: Bearer <token>` header value
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let token = header_value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_stable() {
        assert_eq!(
            password_digest("admin123"),
            "240be518fabd2724ddb6f04eeb1da5967448d7e831c08c8fa822809f74c720a9"
        );
    }

    #[test]
    fn test_verify_password() {
        assert!(verify_password("admin123", "admin123"));
        assert!(!verify_password("admin1234", "admin123"));
        assert!(!verify_password("", "admin123"));
    }

    #[test]
    fn test_session_tokens_are_unique() {
        assert_ne!(new_session_token(), new_session_token());
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Bearer   "), None);
        assert_eq!(bearer_token("Basic abc"), None);
    }
}
