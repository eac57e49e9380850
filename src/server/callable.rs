use super::AppState;
use crate::auth::{bearer_token, CallerContext, TokenVerifier};
use crate::functions::{self, CallableError, SubscribeResponse};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Deserialize)]
struct CallableRequest {
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub(crate) struct CallableResult<T> {
    result: T,
}

impl IntoResponse for CallableError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": {
                "status": self.code.status(),
                "message": self.message,
            }
        });
        (self.code.http_status(), Json(body)).into_response()
    }
}

/// Resolves the caller from the `Authorization` header. Missing or invalid
/// credentials yield no caller; the handler decides what that means.
async fn caller_context(verifier: &dyn TokenVerifier, headers: &HeaderMap) -> Option<CallerContext> {
    let token = headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()
        .and_then(bearer_token)?;

    match verifier.verify(token).await {
        Ok(caller) => Some(caller),
        Err(e) => {
            tracing::warn!(error = %e, "rejected callable ID token");
            None
        }
    }
}

fn request_data(body: &[u8]) -> serde_json::Value {
    match serde_json::from_slice::<CallableRequest>(body) {
        Ok(request) => request.data,
        Err(e) => {
            tracing::debug!(error = %e, "callable request body is not a JSON object with data");
            serde_json::Value::Null
        }
    }
}

pub(crate) async fn subscribe_to_topic(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<CallableResult<SubscribeResponse>>, CallableError> {
    let caller = caller_context(state.verifier.as_ref(), &headers).await;
    let data = request_data(&body);

    let result = functions::subscribe_to_topic(state.push.as_ref(), caller.as_ref(), &data).await?;
    Ok(Json(CallableResult { result }))
}
