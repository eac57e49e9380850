//! Firebase Cloud Messaging module.
//!
//! A thin client over the FCM HTTP v1 send endpoint and the Instance ID topic
//! management endpoints (`batchAdd` / `batchRemove`).
//!
//! Handlers depend on the [`PushService`] trait rather than on the concrete client,
//! so the delivery service can be replaced in tests.

use crate::core::middleware::AuthMiddleware;
use crate::core::{build_client, parse_error_response};
use crate::messaging::models::{
    Message, SendResponseInternal, TopicManagementError, TopicManagementResponse,
};
use reqwest::header;
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod models;
#[cfg(test)]
mod tests;

pub const DEFAULT_FCM_BASE_URL: &str = "https://fcm.googleapis.com";
pub const DEFAULT_IID_BASE_URL: &str = "https://iid.googleapis.com";

const TOPIC_BATCH_SIZE: usize = 1000;

#[derive(Error, Debug)]
pub enum MessagingError {
    #[error("HTTP Request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Middleware error: {0}")]
    MiddlewareError(#[from] reqwest_middleware::Error),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Invalid message: {0}")]
    InvalidMessage(String),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Outbound push-delivery operations used by the function handlers.
#[async_trait::async_trait]
pub trait PushService: Send + Sync {
    /// Sends one message and returns the delivery id assigned by the service.
    async fn send(&self, message: &Message) -> Result<String, MessagingError>;

    /// Registers `tokens` for `topic`.
    async fn subscribe_to_topic(
        &self,
        topic: &str,
        tokens: &[&str],
    ) -> Result<TopicManagementResponse, MessagingError>;
}

/// Base URLs of the two Google APIs the client talks to.
#[derive(Debug, Clone)]
pub struct MessagingEndpoints {
    pub fcm_base_url: String,
    pub iid_base_url: String,
}

impl Default for MessagingEndpoints {
    fn default() -> Self {
        Self {
            fcm_base_url: DEFAULT_FCM_BASE_URL.to_string(),
            iid_base_url: DEFAULT_IID_BASE_URL.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct FirebaseMessaging {
    client: ClientWithMiddleware,
    send_url: String,
    iid_base_url: String,
}

// Wrapper for the request body required by FCM v1 API
#[derive(Serialize)]
struct SendRequest<'a> {
    validate_only: bool,
    message: &'a Message,
}

#[derive(Serialize)]
struct TopicManagementRequest<'a> {
    to: &'a str,
    registration_tokens: &'a [&'a str],
}

#[derive(Deserialize)]
struct TopicManagementApiResponse {
    results: Option<Vec<TopicManagementApiResult>>,
}

#[derive(Deserialize)]
struct TopicManagementApiResult {
    error: Option<String>,
}

impl FirebaseMessaging {
    pub fn new(
        middleware: AuthMiddleware,
        project_id: &str,
        endpoints: &MessagingEndpoints,
        max_retries: u32,
    ) -> Self {
        let client = build_client(middleware, max_retries);
        Self::new_with_client(client, project_id, endpoints)
    }

    pub fn new_with_client(
        client: ClientWithMiddleware,
        project_id: &str,
        endpoints: &MessagingEndpoints,
    ) -> Self {
        let fcm = endpoints.fcm_base_url.trim_end_matches('/');
        Self {
            client,
            send_url: format!("{}/v1/projects/{}/messages:send", fcm, project_id),
            iid_base_url: endpoints.iid_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn send(&self, message: &Message) -> Result<String, MessagingError> {
        validate_message(message)?;
        let request = SendRequest {
            validate_only: false,
            message,
        };

        let response = self
            .client
            .post(&self.send_url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(&request)?)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MessagingError::ApiError(
                parse_error_response(response, "FCM send failed").await,
            ));
        }

        let result: SendResponseInternal = response.json().await?;
        Ok(result.name)
    }

    pub async fn subscribe_to_topic(
        &self,
        topic: &str,
        tokens: &[&str],
    ) -> Result<TopicManagementResponse, MessagingError> {
        self.manage_topic(topic, tokens, true).await
    }

    pub async fn unsubscribe_from_topic(
        &self,
        topic: &str,
        tokens: &[&str],
    ) -> Result<TopicManagementResponse, MessagingError> {
        self.manage_topic(topic, tokens, false).await
    }

    async fn manage_topic(
        &self,
        topic: &str,
        tokens: &[&str],
        subscribe: bool,
    ) -> Result<TopicManagementResponse, MessagingError> {
        if topic.is_empty() || topic == "/topics/" {
            return Err(MessagingError::InvalidMessage("Topic name must be non-empty.".to_string()));
        }
        if tokens.is_empty() {
            return Err(MessagingError::InvalidMessage(
                "At least one registration token is required.".to_string(),
            ));
        }

        let topic_path = if topic.starts_with("/topics/") {
            topic.to_string()
        } else {
            format!("/topics/{}", topic)
        };

        let url = if subscribe {
            format!("{}/iid/v1:batchAdd", self.iid_base_url)
        } else {
            format!("{}/iid/v1:batchRemove", self.iid_base_url)
        };

        let mut response_summary = TopicManagementResponse::default();

        for (batch_idx, chunk) in tokens.chunks(TOPIC_BATCH_SIZE).enumerate() {
            let request = TopicManagementRequest {
                to: &topic_path,
                registration_tokens: chunk,
            };

            let response = self
                .client
                .post(&url)
                .header(header::CONTENT_TYPE, "application/json")
                // The IID API only accepts OAuth2 bearer tokens when this header is set.
                .header("access_token_auth", "true")
                .body(serde_json::to_vec(&request)?)
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(MessagingError::ApiError(
                    parse_error_response(response, "Topic management failed").await,
                ));
            }

            let api_response: TopicManagementApiResponse = response.json().await?;

            if let Some(results) = api_response.results {
                for (i, result) in results.iter().enumerate() {
                    if let Some(error) = &result.error {
                        response_summary.failure_count += 1;
                        response_summary.errors.push(TopicManagementError {
                            index: batch_idx * TOPIC_BATCH_SIZE + i,
                            reason: error.clone(),
                        });
                    } else {
                        response_summary.success_count += 1;
                    }
                }
            }
        }

        Ok(response_summary)
    }
}

#[async_trait::async_trait]
impl PushService for FirebaseMessaging {
    async fn send(&self, message: &Message) -> Result<String, MessagingError> {
        FirebaseMessaging::send(self, message).await
    }

    async fn subscribe_to_topic(
        &self,
        topic: &str,
        tokens: &[&str],
    ) -> Result<TopicManagementResponse, MessagingError> {
        FirebaseMessaging::subscribe_to_topic(self, topic, tokens).await
    }
}

fn validate_message(message: &Message) -> Result<(), MessagingError> {
    let num_targets = [
        message.token.is_some(),
        message.topic.is_some(),
        message.condition.is_some(),
    ]
    .iter()
    .filter(|&&t| t)
    .count();

    if num_targets != 1 {
        return Err(MessagingError::InvalidMessage(
            "Message must have exactly one of token, topic, or condition.".to_string(),
        ));
    }

    if let Some(topic) = &message.topic {
        if topic.is_empty() || topic.starts_with("/topics/") {
            return Err(MessagingError::InvalidMessage(format!(
                "Malformed topic name: {:?}",
                topic
            )));
        }
    }

    Ok(())
}
