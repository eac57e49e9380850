use crate::firestore::convert::{canonical_json, convert_value_to_serde_value};
use crate::firestore::models::Document;
use crate::firestore::FirestoreError;
use crate::messaging::models::{Message, Notification};
use crate::messaging::{MessagingError, PushService};
use std::collections::HashMap;

pub const DEFAULT_MARKER_TOPIC: &str = "marker_updates";
pub const DEFAULT_TITLE: &str = "Marcador Actualizado";
pub const DEFAULT_BODY: &str = "Se ha actualizado la información de un marcador";
pub const DEFAULT_CLICK_ACTION: &str = "FLUTTER_NOTIFICATION_CLICK";
pub const MARKER_UPDATE_TYPE: &str = "marker_update";

/// The fields of a marker document this function cares about.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerSnapshot {
    pub title: Option<String>,
    pub description: Option<String>,
    /// `None` when the document has no `metadata` field; an explicit null is `Some(Null)`.
    pub metadata: Option<serde_json::Value>,
}

impl MarkerSnapshot {
    pub fn from_document(document: &Document) -> Result<Self, FirestoreError> {
        let text = |field: &str| {
            document
                .fields
                .get(field)
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let metadata = document
            .fields
            .get("metadata")
            .map(convert_value_to_serde_value)
            .transpose()?;

        Ok(Self {
            title: text("title"),
            description: text("description"),
            metadata,
        })
    }
}

/// Before and after snapshots of one updated marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerChange {
    pub marker_id: String,
    pub before: MarkerSnapshot,
    pub after: MarkerSnapshot,
}

impl MarkerChange {
    pub fn from_documents(
        marker_id: impl Into<String>,
        before: &Document,
        after: &Document,
    ) -> Result<Self, FirestoreError> {
        Ok(Self {
            marker_id: marker_id.into(),
            before: MarkerSnapshot::from_document(before)?,
            after: MarkerSnapshot::from_document(after)?,
        })
    }

    /// Whether the canonical JSON of `metadata` differs between the snapshots.
    pub fn metadata_changed(&self) -> bool {
        let before = self.before.metadata.as_ref().map(canonical_json);
        let after = self.after.metadata.as_ref().map(canonical_json);
        before != after
    }
}

/// Forwards marker metadata changes to a broadcast topic.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerNotifier {
    pub topic: String,
    pub default_title: String,
    pub default_body: String,
    pub click_action: String,
}

impl Default for MarkerNotifier {
    fn default() -> Self {
        Self {
            topic: DEFAULT_MARKER_TOPIC.to_string(),
            default_title: DEFAULT_TITLE.to_string(),
            default_body: DEFAULT_BODY.to_string(),
            click_action: DEFAULT_CLICK_ACTION.to_string(),
        }
    }
}

impl MarkerNotifier {
    pub fn build_message(&self, change: &MarkerChange) -> Message {
        let after = &change.after;

        let mut data = HashMap::new();
        data.insert("markerId".to_string(), change.marker_id.clone());
        data.insert("type".to_string(), MARKER_UPDATE_TYPE.to_string());
        data.insert("click_action".to_string(), self.click_action.clone());

        Message {
            notification: Some(Notification {
                title: Some(after.title.clone().unwrap_or_else(|| self.default_title.clone())),
                body: Some(after.description.clone().unwrap_or_else(|| self.default_body.clone())),
                ..Default::default()
            }),
            data: Some(data),
            topic: Some(self.topic.clone()),
            ..Default::default()
        }
    }

    /// Sends one notification when the marker's metadata changed.
    ///
    /// Returns the delivery id, or `None` when metadata is unchanged and nothing
    /// was sent. Delivery failures are logged here and returned to the caller.
    pub async fn on_marker_update<P>(
        &self,
        push: &P,
        change: &MarkerChange,
    ) -> Result<Option<String>, MessagingError>
    where
        P: PushService + ?Sized,
    {
        if !change.metadata_changed() {
            tracing::debug!(marker_id = %change.marker_id, "marker metadata unchanged, skipping notification");
            return Ok(None);
        }

        let message = self.build_message(change);
        match push.send(&message).await {
            Ok(message_id) => {
                tracing::info!(
                    marker_id = %change.marker_id,
                    topic = %self.topic,
                    message_id = %message_id,
                    "marker update notification sent"
                );
                Ok(Some(message_id))
            }
            Err(e) => {
                tracing::error!(
                    marker_id = %change.marker_id,
                    topic = %self.topic,
                    error = %e,
                    "failed to send marker update notification"
                );
                Err(e)
            }
        }
    }
}
