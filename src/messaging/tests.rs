use super::*;
use crate::messaging::models::{Message, Notification};
use httpmock::prelude::*;
use reqwest::Client;
use reqwest_middleware::ClientBuilder;
use serde_json::json;
use std::collections::HashMap;

fn messaging_for(server: &MockServer) -> FirebaseMessaging {
    let client = ClientBuilder::new(Client::new()).build();
    let endpoints = MessagingEndpoints {
        fcm_base_url: server.base_url(),
        iid_base_url: server.base_url(),
    };
    FirebaseMessaging::new_with_client(client, "test-project", &endpoints)
}

fn topic_message() -> Message {
    let mut data = HashMap::new();
    data.insert("markerId".to_string(), "m1".to_string());

    Message {
        topic: Some("marker_updates".to_string()),
        notification: Some(Notification {
            title: Some("Test Title".to_string()),
            body: Some("Test Body".to_string()),
            ..Default::default()
        }),
        data: Some(data),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_send_message() {
    let server = MockServer::start_async().await;
    let messaging = messaging_for(&server);

    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/projects/test-project/messages:send")
                .header("content-type", "application/json")
                .json_body(json!({
                    "validate_only": false,
                    "message": {
                        "topic": "marker_updates",
                        "notification": { "title": "Test Title", "body": "Test Body" },
                        "data": { "markerId": "m1" }
                    }
                }));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "name": "projects/test-project/messages/12345"
                }));
        })
        .await;

    let result = messaging.send(&topic_message()).await.unwrap();
    assert_eq!(result, "projects/test-project/messages/12345");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_send_api_error() {
    let server = MockServer::start_async().await;
    let messaging = messaging_for(&server);

    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/projects/test-project/messages:send");
            then.status(400)
                .header("content-type", "application/json")
                .json_body(json!({
                    "error": {
                        "code": 400,
                        "message": "Request contains an invalid argument.",
                        "status": "INVALID_ARGUMENT"
                    }
                }));
        })
        .await;

    let err = messaging.send(&topic_message()).await.unwrap_err();
    match err {
        MessagingError::ApiError(msg) => {
            assert!(msg.contains("Request contains an invalid argument."));
            assert!(msg.contains("INVALID_ARGUMENT"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_send_rejects_message_without_single_target() {
    let server = MockServer::start_async().await;
    let messaging = messaging_for(&server);

    let mock = server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(200);
        })
        .await;

    let mut message = topic_message();
    message.token = Some("device-token".to_string());
    let err = messaging.send(&message).await.unwrap_err();
    assert!(matches!(err, MessagingError::InvalidMessage(_)));

    message.token = None;
    message.topic = None;
    let err = messaging.send(&message).await.unwrap_err();
    assert!(matches!(err, MessagingError::InvalidMessage(_)));

    message.topic = Some("/topics/marker_updates".to_string());
    let err = messaging.send(&message).await.unwrap_err();
    assert!(matches!(err, MessagingError::InvalidMessage(_)));

    mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn test_subscribe_to_topic() {
    let server = MockServer::start_async().await;
    let messaging = messaging_for(&server);

    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/iid/v1:batchAdd")
                .header("access_token_auth", "true")
                .json_body(json!({
                    "to": "/topics/test-topic",
                    "registration_tokens": ["token1", "token2"]
                }));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "results": [
                        {},
                        { "error": "INVALID_ARGUMENT" }
                    ]
                }));
        })
        .await;

    let result = messaging
        .subscribe_to_topic("test-topic", &["token1", "token2"])
        .await
        .unwrap();
    assert_eq!(result.success_count, 1);
    assert_eq!(result.failure_count, 1);
    assert_eq!(result.errors[0].index, 1);
    assert_eq!(result.errors[0].reason, "INVALID_ARGUMENT");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_subscribe_keeps_topic_prefix() {
    let server = MockServer::start_async().await;
    let messaging = messaging_for(&server);

    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/iid/v1:batchAdd")
                .json_body(json!({
                    "to": "/topics/marker_updates",
                    "registration_tokens": ["u1"]
                }));
            then.status(200).json_body(json!({ "results": [{}] }));
        })
        .await;

    let result = messaging
        .subscribe_to_topic("/topics/marker_updates", &["u1"])
        .await
        .unwrap();
    assert_eq!(result.success_count, 1);
    assert!(result.errors.is_empty());

    mock.assert_async().await;
}

#[tokio::test]
async fn test_unsubscribe_from_topic() {
    let server = MockServer::start_async().await;
    let messaging = messaging_for(&server);

    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/iid/v1:batchRemove")
                .json_body(json!({
                    "to": "/topics/test-topic",
                    "registration_tokens": ["token1"]
                }));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "results": [
                        {}
                    ]
                }));
        })
        .await;

    let result = messaging
        .unsubscribe_from_topic("test-topic", &["token1"])
        .await
        .unwrap();
    assert_eq!(result.success_count, 1);
    assert_eq!(result.failure_count, 0);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_topic_management_http_failure() {
    let server = MockServer::start_async().await;
    let messaging = messaging_for(&server);

    server
        .mock_async(|when, then| {
            when.method(POST).path("/iid/v1:batchAdd");
            then.status(503).body("unavailable");
        })
        .await;

    let err = messaging
        .subscribe_to_topic("marker_updates", &["u1"])
        .await
        .unwrap_err();
    assert!(matches!(err, MessagingError::ApiError(_)));
}

#[tokio::test]
async fn test_topic_management_rejects_empty_input() {
    let server = MockServer::start_async().await;
    let messaging = messaging_for(&server);

    assert!(matches!(
        messaging.subscribe_to_topic("", &["u1"]).await,
        Err(MessagingError::InvalidMessage(_))
    ));
    assert!(matches!(
        messaging.subscribe_to_topic("marker_updates", &[]).await,
        Err(MessagingError::InvalidMessage(_))
    ));
}
