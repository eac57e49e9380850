//! Backend functions for marker update notifications.
//!
//! Two handlers are exposed over HTTP:
//!
//! * `onMarkerUpdate` receives Firestore document-updated events for
//!   `markers/{markerId}` and broadcasts a push notification to the
//!   `marker_updates` topic when the marker's `metadata` changed.
//! * `subscribeToTopic` is a callable function that subscribes the authenticated
//!   caller to a notification topic.

pub mod auth;
pub mod config;
pub mod core;
pub mod firestore;
pub mod functions;
pub mod messaging;
pub mod server;
pub mod telemetry;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use crate::auth::IdTokenVerifier;
use crate::config::{Config, ConfigError};
use crate::core::middleware::AuthMiddleware;
use crate::messaging::FirebaseMessaging;
use crate::server::AppState;
use tokio::sync::OnceCell;
use yup_oauth2::ServiceAccountKey;

static APP: OnceCell<FunctionsApp> = OnceCell::const_new();

/// The process-wide backend handle: outbound FCM client and ID-token verifier.
///
/// Built once at startup and only read afterwards; handlers receive it through
/// [`FunctionsApp::state`].
pub struct FunctionsApp {
    config: Config,
    project_id: String,
    messaging: Arc<FirebaseMessaging>,
    verifier: Arc<IdTokenVerifier>,
}

impl FunctionsApp {
    pub fn new(service_account_key: ServiceAccountKey, config: Config) -> Result<Self, ConfigError> {
        let middleware = AuthMiddleware::new(service_account_key);
        let project_id = config.resolve_project_id(middleware.project_id())?;

        let messaging = FirebaseMessaging::new(
            middleware,
            &project_id,
            &config.endpoints,
            config.max_retries,
        );
        let verifier = IdTokenVerifier::new(project_id.clone(), config.jwks_url.clone());

        Ok(Self {
            config,
            project_id,
            messaging: Arc::new(messaging),
            verifier: Arc::new(verifier),
        })
    }

    /// Initializes the process-wide handle on first call; later calls return the
    /// existing handle and ignore their arguments.
    pub async fn initialize(
        service_account_key: ServiceAccountKey,
        config: Config,
    ) -> Result<&'static FunctionsApp, ConfigError> {
        APP.get_or_try_init(move || async move { Self::new(service_account_key, config) })
            .await
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Router state wired to the real FCM client and token verifier.
    pub fn state(&self) -> AppState {
        AppState {
            push: self.messaging.clone(),
            verifier: self.verifier.clone(),
            notifier: self.config.notifier.clone(),
            document_pattern: self.config.document_pattern.clone(),
        }
    }
}
