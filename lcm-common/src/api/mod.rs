//! Shared HTTP API functionality
//!
//! Contains only pure functions and shared types; the service wraps them
//! with framework-specific middleware.

pub mod auth;
pub mod types;

pub use auth::{bearer_token, new_session_token, password_digest, verify_password};
pub use types::{AuthRequest, AuthResponse, ErrorDetail, ErrorResponse};
