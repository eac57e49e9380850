//! HTTP adapter.
//!
//! Translates platform transport conventions into handler calls: CloudEvents for
//! the Firestore trigger, the Firebase callable protocol for `subscribeToTopic`.

mod callable;
mod events;


use crate::auth::TokenVerifier;
use crate::firestore::DocumentPattern;
use crate::functions::MarkerNotifier;
use crate::messaging::PushService;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use self::events::DOCUMENT_UPDATED_EVENT;

/// Everything a request needs, shared read-only across requests.
#[derive(Clone)]
pub struct AppState {
    pub push: Arc<dyn PushService>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub notifier: MarkerNotifier,
    pub document_pattern: DocumentPattern,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/onMarkerUpdate", post(events::on_marker_update))
        .route("/subscribeToTopic", post(callable::subscribe_to_topic))
        .route("/healthz", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

async fn health() -> &'static str {
    "ok"
}
