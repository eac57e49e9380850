use crate::auth::CallerContext;
use crate::functions::error::CallableError;
use crate::messaging::PushService;
use serde::{Deserialize, Serialize};

const MSG_UNAUTHENTICATED: &str = "El usuario debe estar autenticado";
const MSG_TOPIC_REQUIRED: &str = "El tema es requerido";
const MSG_SUBSCRIBE_FAILED: &str = "Error al suscribir al tema";

/// Result returned to the client on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeResponse {
    pub success: bool,
}

/// Subscribes the calling user to the topic named in `data.topic`.
///
/// `caller` is the identity asserted by the auth layer; `None` means the request
/// carried no valid credentials.
pub async fn subscribe_to_topic<P>(
    push: &P,
    caller: Option<&CallerContext>,
    data: &serde_json::Value,
) -> Result<SubscribeResponse, CallableError>
where
    P: PushService + ?Sized,
{
    let caller = caller.ok_or_else(|| CallableError::unauthenticated(MSG_UNAUTHENTICATED))?;

    let topic = data
        .get("topic")
        .and_then(serde_json::Value::as_str)
        .filter(|topic| !topic.is_empty())
        .ok_or_else(|| CallableError::invalid_argument(MSG_TOPIC_REQUIRED))?;

    match push.subscribe_to_topic(topic, &[caller.uid.as_str()]).await {
        Ok(response) => {
            if response.failure_count > 0 {
                let reasons = response
                    .errors
                    .iter()
                    .map(|e| e.reason.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                tracing::warn!(
                    uid = %caller.uid,
                    topic,
                    failure_count = response.failure_count,
                    reasons = %reasons,
                    "topic service rejected caller identity"
                );
            } else {
                tracing::info!(uid = %caller.uid, topic, "subscribed caller to topic");
            }
            Ok(SubscribeResponse { success: true })
        }
        Err(e) => {
            tracing::error!(uid = %caller.uid, topic, error = %e, "failed to subscribe caller to topic");
            Err(CallableError::internal(MSG_SUBSCRIBE_FAILED))
        }
    }
}
