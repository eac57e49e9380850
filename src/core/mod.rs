pub mod middleware;

use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::Deserialize;

use crate::core::middleware::AuthMiddleware;


#[derive(Debug, Deserialize)]
pub struct FirebaseErrorResponse {
    pub error: FirebaseErrorDetails,
}

#[derive(Debug, Deserialize)]
pub struct FirebaseErrorDetails {
    pub code: u16,
    pub message: String,
    pub status: Option<String>,
}

impl FirebaseErrorResponse {
    pub fn display_message(&self) -> String {
        match &self.error.status {
            Some(status) => format!("{} (code: {}, status: {})", self.error.message, self.error.code, status),
            None => format!("{} (code: {})", self.error.message, self.error.code),
        }
    }
}

/// Reads a non-success response body, preferring the Google API error envelope
/// and falling back to the raw body text.
pub async fn parse_error_response(response: reqwest::Response, default_msg: &str) -> String {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    match serde_json::from_str::<FirebaseErrorResponse>(&text) {
        Ok(error_resp) => format!("{} {}: {}", default_msg, status, error_resp.display_message()),
        Err(_) if text.is_empty() => format!("{}: {}", default_msg, status),
        Err(_) => format!("{} {}: {}", default_msg, status, text),
    }
}

/// Builds the authenticated outbound client.
///
/// Transient-failure retries are only installed when `max_retries > 0`; by default
/// failures surface to the caller immediately and the hosting platform owns retry.
pub fn build_client(middleware: AuthMiddleware, max_retries: u32) -> ClientWithMiddleware {
    let mut builder = ClientBuilder::new(Client::new());

    if max_retries > 0 {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);
        builder = builder.with(RetryTransientMiddleware::new_with_policy(retry_policy));
    }

    builder.with(middleware).build()
}
