use crate::auth::keys::GOOGLE_ID_TOKEN_JWKS_URL;
use crate::firestore::DocumentPattern;
use crate::functions::marker_update::{
    DEFAULT_BODY, DEFAULT_CLICK_ACTION, DEFAULT_MARKER_TOPIC, DEFAULT_TITLE,
};
use crate::functions::MarkerNotifier;
use crate::messaging::{MessagingEndpoints, DEFAULT_FCM_BASE_URL, DEFAULT_IID_BASE_URL};
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DOCUMENT_PATTERN: &str = "markers/{markerId}";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
    #[error("no project id: set FIREBASE_PROJECT_ID or use a service account key with project_id")]
    ProjectIdMissing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub credentials_path: PathBuf,
    pub project_id: Option<String>,
    pub document_pattern: DocumentPattern,
    pub notifier: MarkerNotifier,
    pub endpoints: MessagingEndpoints,
    pub jwks_url: String,
    pub max_retries: u32,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let or = |name: &str, default: &str| get(name).unwrap_or_else(|| default.to_string());

        let port = match get("PORT") {
            Some(raw) => raw.parse().map_err(|e| ConfigError::Invalid {
                name: "PORT",
                reason: format!("{}", e),
            })?,
            None => DEFAULT_PORT,
        };

        let max_retries = match get("OUTBOUND_MAX_RETRIES") {
            Some(raw) => raw.parse().map_err(|e| ConfigError::Invalid {
                name: "OUTBOUND_MAX_RETRIES",
                reason: format!("{}", e),
            })?,
            None => 0,
        };

        let document_pattern = DocumentPattern::parse(&or("MARKER_DOCUMENT_PATTERN", DEFAULT_DOCUMENT_PATTERN))
            .map_err(|e| ConfigError::Invalid {
                name: "MARKER_DOCUMENT_PATTERN",
                reason: e.to_string(),
            })?;

        let log_format = match get("LOG_FORMAT").as_deref() {
            None => LogFormat::Text,
            Some(f) if f.eq_ignore_ascii_case("text") => LogFormat::Text,
            Some(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "LOG_FORMAT",
                    reason: format!("expected text or json, got {}", other),
                })
            }
        };

        Ok(Config {
            port,
            credentials_path: get("GOOGLE_APPLICATION_CREDENTIALS")
                .map(PathBuf::from)
                .ok_or(ConfigError::Missing("GOOGLE_APPLICATION_CREDENTIALS"))?,
            project_id: get("FIREBASE_PROJECT_ID"),
            document_pattern,
            notifier: MarkerNotifier {
                topic: or("MARKER_TOPIC", DEFAULT_MARKER_TOPIC),
                default_title: or("MARKER_DEFAULT_TITLE", DEFAULT_TITLE),
                default_body: or("MARKER_DEFAULT_BODY", DEFAULT_BODY),
                click_action: or("MARKER_CLICK_ACTION", DEFAULT_CLICK_ACTION),
            },
            endpoints: MessagingEndpoints {
                fcm_base_url: http_url("FCM_BASE_URL", or("FCM_BASE_URL", DEFAULT_FCM_BASE_URL))?,
                iid_base_url: http_url("IID_BASE_URL", or("IID_BASE_URL", DEFAULT_IID_BASE_URL))?,
            },
            jwks_url: http_url("ID_TOKEN_JWKS_URL", or("ID_TOKEN_JWKS_URL", GOOGLE_ID_TOKEN_JWKS_URL))?,
            max_retries,
            log_format,
        })
    }

    /// The explicit project id, else the one in the service account key.
    pub fn resolve_project_id(&self, key_project_id: Option<&str>) -> Result<String, ConfigError> {
        self.project_id
            .as_deref()
            .or(key_project_id)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .ok_or(ConfigError::ProjectIdMissing)
    }
}

fn http_url(name: &'static str, raw: String) -> Result<String, ConfigError> {
    let url = Url::parse(&raw).map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Invalid {
            name,
            reason: format!("unsupported scheme {}", url.scheme()),
        });
    }
    Ok(raw)
}
