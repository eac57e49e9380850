use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Represents a message to be sent via FCM.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Arbitrary key/value payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<HashMap<String, String>>,

    /// Basic notification template to use across all platforms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,

    /// Registration token to send a message to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Topic name to send a message to, e.g. "marker_updates".
    /// Note: "/topics/" prefix should not be provided.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,

    /// Condition to send a message to, e.g. "'foo' in topics && 'bar' in topics".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// Basic notification template to use across all platforms.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// The notification's title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// The notification's body text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// The URL of an image to be downloaded on the device and displayed in the notification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Response from the topic management APIs.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TopicManagementResponse {
    /// The number of tokens successfully subscribed/unsubscribed.
    pub success_count: usize,
    /// The number of tokens that failed to subscribe/unsubscribe.
    pub failure_count: usize,
    /// The list of errors.
    pub errors: Vec<TopicManagementError>,
}

/// Error details for a single registration token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TopicManagementError {
    /// The index of the token in the request list.
    pub index: usize,
    /// The error message.
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SendResponseInternal {
    pub name: String,
}
