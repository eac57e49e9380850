use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::DecodingKey;
use reqwest::Client;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;

pub const GOOGLE_ID_TOKEN_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

const DEFAULT_MAX_AGE_SECS: u64 = 3600;

#[derive(Error, Debug)]
pub enum KeyFetchError {
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("Key endpoint returned {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("Failed to parse keys: {0}")]
    ParseError(#[from] jsonwebtoken::errors::Error),
    #[error("No public key found for kid {0}")]
    KeyNotFound(String),
}

struct CachedKeys {
    keys: HashMap<String, DecodingKey>,
    expires_at: Instant,
}

impl CachedKeys {
    fn is_fresh(&self) -> bool {
        Instant::now() < self.expires_at
    }

    fn lookup(&self, kid: &str) -> Result<DecodingKey, KeyFetchError> {
        self.keys
            .get(kid)
            .cloned()
            .ok_or_else(|| KeyFetchError::KeyNotFound(kid.to_string()))
    }
}

/// Fetches and caches the public signing keys for Firebase ID tokens.
///
/// The cache lifetime follows the `max-age` directive of the key endpoint.
pub struct PublicKeyManager {
    client: Client,
    jwks_url: String,
    cache: RwLock<Option<CachedKeys>>,
}

impl PublicKeyManager {
    pub fn new(jwks_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            jwks_url: jwks_url.into(),
            cache: RwLock::new(None),
        }
    }

    /// Returns the key for `kid`.
    ///
    /// While the cached key set is fresh an unknown `kid` fails without a
    /// refetch. Concurrent refreshes are serialized on the cache write lock and
    /// only the first one goes to the network.
    pub async fn get_key(&self, kid: &str) -> Result<DecodingKey, KeyFetchError> {
        if let Some(cached) = &*self.cache.read().await {
            if cached.is_fresh() {
                return cached.lookup(kid);
            }
        }

        let mut cache = self.cache.write().await;
        if let Some(cached) = cache.as_ref().filter(|cached| cached.is_fresh()) {
            return cached.lookup(kid);
        }
        let fetched = self.fetch_keys().await?;
        let key = fetched.lookup(kid);
        *cache = Some(fetched);
        key
    }

    async fn fetch_keys(&self) -> Result<CachedKeys, KeyFetchError> {
        let response = self.client.get(&self.jwks_url).send().await?;
        if !response.status().is_success() {
            return Err(KeyFetchError::HttpStatus(response.status()));
        }

        let max_age = response
            .headers()
            .get(reqwest::header::CACHE_CONTROL)
            .and_then(|h| h.to_str().ok())
            .and_then(parse_max_age)
            .unwrap_or(DEFAULT_MAX_AGE_SECS);

        let jwks: JwkSet = response.json().await?;

        let mut keys = HashMap::new();
        for jwk in &jwks.keys {
            if let Some(kid) = &jwk.common.key_id {
                keys.insert(kid.clone(), DecodingKey::from_jwk(jwk)?);
            }
        }
        tracing::debug!(count = keys.len(), max_age, "refreshed ID token signing keys");

        Ok(CachedKeys {
            keys,
            expires_at: Instant::now() + Duration::from_secs(max_age),
        })
    }
}

/// Extracts `max-age` seconds from a `Cache-Control` header value.
pub(crate) fn parse_max_age(cache_control: &str) -> Option<u64> {
    cache_control.split(',').find_map(|part| {
        part.trim()
            .strip_prefix("max-age=")
            .and_then(|secs| secs.parse::<u64>().ok())
    })
}
