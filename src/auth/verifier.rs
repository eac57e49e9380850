use crate::auth::keys::{KeyFetchError, PublicKeyManager};
use crate::auth::CallerContext;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Clock skew tolerated for `auth_time` and `iat`, in seconds.
const CLOCK_SKEW_SECS: u64 = 300;

#[derive(Error, Debug)]
pub enum TokenVerificationError {
    #[error("Key fetch error: {0}")]
    KeyFetchError(#[from] KeyFetchError),
    #[error("JWT validation error: {0}")]
    JwtError(jsonwebtoken::errors::Error),
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("Token expired")]
    Expired,
}

impl From<jsonwebtoken::errors::Error> for TokenVerificationError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenVerificationError::Expired,
            _ => TokenVerificationError::JwtError(err),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirebaseTokenClaims {
    pub aud: String,
    pub iss: String,
    pub sub: String,
    pub exp: u64,
    pub iat: u64,
    pub auth_time: u64,
    #[serde(flatten)]
    pub claims: serde_json::Map<String, serde_json::Value>,
}

/// Turns a bearer credential into a verified caller identity.
#[async_trait::async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<CallerContext, TokenVerificationError>;
}

/// Verifies Firebase Auth ID tokens (RS256, issued by `securetoken.google.com`).
pub struct IdTokenVerifier {
    project_id: String,
    key_manager: PublicKeyManager,
}

impl IdTokenVerifier {
    pub fn new(project_id: impl Into<String>, jwks_url: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            key_manager: PublicKeyManager::new(jwks_url),
        }
    }

    pub async fn verify_token(&self, token: &str) -> Result<FirebaseTokenClaims, TokenVerificationError> {
        let header = decode_header(token)?;
        if header.alg != Algorithm::RS256 {
            return Err(TokenVerificationError::InvalidToken(format!(
                "Unexpected algorithm {:?}",
                header.alg
            )));
        }
        let kid = header
            .kid
            .ok_or_else(|| TokenVerificationError::InvalidToken("Missing kid in header".to_string()))?;

        let key = self.key_manager.get_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.project_id]);
        validation.set_issuer(&[format!("https://securetoken.google.com/{}", self.project_id)]);
        validation.set_required_spec_claims(&["exp", "aud", "iss", "sub"]);

        let claims = decode::<FirebaseTokenClaims>(token, &key, &validation)?.claims;

        if claims.sub.is_empty() || claims.sub.len() > 128 {
            return Err(TokenVerificationError::InvalidToken(
                "Subject (sub) claim must be a non-empty string of at most 128 characters".to_string(),
            ));
        }

        let now = chrono::Utc::now().timestamp().max(0) as u64;
        if claims.auth_time > now + CLOCK_SKEW_SECS {
            return Err(TokenVerificationError::InvalidToken("Auth time is in the future".to_string()));
        }
        if claims.iat > now + CLOCK_SKEW_SECS {
            return Err(TokenVerificationError::InvalidToken("Issued-at time is in the future".to_string()));
        }

        Ok(claims)
    }
}

#[async_trait::async_trait]
impl TokenVerifier for IdTokenVerifier {
    async fn verify(&self, token: &str) -> Result<CallerContext, TokenVerificationError> {
        let claims = self.verify_token(token).await?;
        Ok(CallerContext {
            uid: claims.sub,
            claims: claims.claims,
        })
    }
}
