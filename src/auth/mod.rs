//! Caller identity for callable functions.
//!
//! Callable requests carry a Firebase Auth ID token in the `Authorization` header.
//! The token is verified against Google's published signing keys and turned into a
//! [`CallerContext`]; handlers receive the context explicitly and never read the
//! raw header themselves.

pub mod keys;
pub mod verifier;


pub use self::verifier::{FirebaseTokenClaims, IdTokenVerifier, TokenVerificationError, TokenVerifier};

/// A verified caller, asserted by the identity provider.
#[derive(Debug, Clone, PartialEq)]
pub struct CallerContext {
    /// The caller's unique user id (the token's `sub` claim).
    pub uid: String,
    /// Remaining token claims (`email`, `firebase`, custom claims, ...).
    pub claims: serde_json::Map<String, serde_json::Value>,
}

impl CallerContext {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            claims: serde_json::Map::new(),
        }
    }
}

/// Extracts the credential from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(authorization: &str) -> Option<&str> {
    let (scheme, token) = authorization.trim().split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}
