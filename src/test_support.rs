//! Fakes shared by the handler and router tests.

use crate::messaging::models::{Message, TopicManagementError, TopicManagementResponse};
use crate::messaging::{MessagingError, PushService};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) enum Behaviour {
    #[default]
    Succeed,
    Fail,
    RejectTokens,
}

/// Records every outbound call instead of talking to FCM.
#[derive(Default)]
pub(crate) struct RecordingPush {
    pub behaviour: Behaviour,
    pub sent: Mutex<Vec<Message>>,
    pub subscriptions: Mutex<Vec<(String, Vec<String>)>>,
}

impl RecordingPush {
    pub fn with(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<Message> {
        self.sent.lock().unwrap().clone()
    }

    pub fn subscriptions(&self) -> Vec<(String, Vec<String>)> {
        self.subscriptions.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl PushService for RecordingPush {
    async fn send(&self, message: &Message) -> Result<String, MessagingError> {
        self.sent.lock().unwrap().push(message.clone());
        match self.behaviour {
            Behaviour::Fail => Err(MessagingError::ApiError("FCM send failed 503".to_string())),
            _ => Ok("projects/test-project/messages/1".to_string()),
        }
    }

    async fn subscribe_to_topic(
        &self,
        topic: &str,
        tokens: &[&str],
    ) -> Result<TopicManagementResponse, MessagingError> {
        self.subscriptions.lock().unwrap().push((
            topic.to_string(),
            tokens.iter().map(|t| t.to_string()).collect(),
        ));
        match self.behaviour {
            Behaviour::Succeed => Ok(TopicManagementResponse {
                success_count: tokens.len(),
                ..Default::default()
            }),
            Behaviour::Fail => Err(MessagingError::ApiError("Topic management failed 500".to_string())),
            Behaviour::RejectTokens => Ok(TopicManagementResponse {
                success_count: 0,
                failure_count: tokens.len(),
                errors: (0..tokens.len())
                    .map(|index| TopicManagementError {
                        index,
                        reason: "INVALID_ARGUMENT".to_string(),
                    })
                    .collect(),
            }),
        }
    }
}

struct ErrorCounter(Arc<AtomicUsize>);

impl<S: Subscriber> Layer<S> for ErrorCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::ERROR {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Counts ERROR events emitted on the current thread while the guard is alive.
pub(crate) fn count_errors() -> (Arc<AtomicUsize>, tracing::subscriber::DefaultGuard) {
    let counter = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(ErrorCounter(counter.clone()));
    (counter, tracing::subscriber::set_default(subscriber))
}
