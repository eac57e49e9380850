use super::AppState;
use crate::firestore::models::DocumentEventData;
use crate::firestore::relative_document_path;
use crate::functions::MarkerChange;
use crate::messaging::MessagingError;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

pub const DOCUMENT_UPDATED_EVENT: &str = "google.cloud.firestore.document.v1.updated";

#[derive(Debug)]
pub(crate) enum EventError {
    /// The event cannot be processed; retrying will not help.
    Malformed(String),
    /// The notification could not be delivered; the platform should retry.
    Delivery(MessagingError),
}

impl IntoResponse for EventError {
    fn into_response(self) -> Response {
        match self {
            EventError::Malformed(reason) => {
                tracing::warn!(%reason, "rejecting malformed document event");
                (StatusCode::BAD_REQUEST, reason).into_response()
            }
            // Already logged by the notifier.
            EventError::Delivery(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Firestore `document.v1.updated` CloudEvent (binary content mode, JSON data).
pub(crate) async fn on_marker_update(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, EventError> {
    let event_id = header_str(&headers, "ce-id").unwrap_or("-");

    if let Some(event_type) = header_str(&headers, "ce-type") {
        if event_type != DOCUMENT_UPDATED_EVENT {
            tracing::warn!(event_id, event_type, "ignoring event of unexpected type");
            return Ok(StatusCode::OK);
        }
    }

    let event = DocumentEventData::from_json(&body).map_err(|e| EventError::Malformed(e.to_string()))?;
    let (Some(before), Some(after)) = (event.old_value.as_ref(), event.value.as_ref()) else {
        return Err(EventError::Malformed(
            "update event must carry both value and oldValue".to_string(),
        ));
    };

    let path = header_str(&headers, "ce-document")
        .map(relative_document_path)
        .unwrap_or_else(|| relative_document_path(&after.name));

    let Some(marker_id) = state.document_pattern.document_id(path) else {
        tracing::warn!(
            event_id,
            path,
            pattern = state.document_pattern.as_str(),
            "ignoring event for document outside the trigger pattern"
        );
        return Ok(StatusCode::OK);
    };

    let change = MarkerChange::from_documents(marker_id, before, after)
        .map_err(|e| EventError::Malformed(e.to_string()))?;

    state
        .notifier
        .on_marker_update(state.push.as_ref(), &change)
        .await
        .map_err(EventError::Delivery)?;

    Ok(StatusCode::OK)
}
