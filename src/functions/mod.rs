//! The function handlers.
//!
//! Both handlers are stateless: everything they need (the push service, the
//! notifier settings, the caller identity) is passed in by the adapter.

pub mod error;
pub mod marker_update;
pub mod topic_subscription;


pub use self::error::{CallableError, FunctionsErrorCode};
pub use self::marker_update::{MarkerChange, MarkerNotifier, MarkerSnapshot};
pub use self::topic_subscription::{subscribe_to_topic, SubscribeResponse};
