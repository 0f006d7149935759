//! Post-commit change notification.
//!
//! After a ledger mutation commits, interested observers (a push channel,
//! a dashboard feed) are told what changed, keyed by the client's public
//! slug. Delivery is strictly best-effort: the mutation has already
//! committed, so a failed or unobserved notification is logged and
//! dropped, never surfaced to the caller and never retried.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;

/// Default capacity of the broadcast buffer.
const DEFAULT_CAPACITY: usize = 256;

/// Kind of committed change an event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerEventType {
    /// A WORK entry was appended.
    AddLog,
    /// The balance was topped up.
    Refill,
    /// A ledger entry was reversed.
    DeleteLog,
    /// The client's status changed.
    StatusUpdate,
    /// Client metadata changed.
    DetailsUpdate,
    /// The client and its ledger were deleted.
    ProjectDeleted,
}

/// A committed ledger change, broadcast to observers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// Public slug of the affected client.
    pub client_slug: String,
    /// What changed.
    pub event_type: LedgerEventType,
    /// Event-specific payload (new entry, new balance, ...).
    pub payload: Value,
}

impl LedgerEvent {
    /// Creates a new event.
    #[must_use]
    pub fn new(client_slug: impl Into<String>, event_type: LedgerEventType, payload: Value) -> Self {
        Self {
            client_slug: client_slug.into(),
            event_type,
            payload,
        }
    }
}

/// Best-effort fan-out of committed ledger changes.
///
/// Cloning is cheap; all clones publish into the same channel.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    tx: broadcast::Sender<LedgerEvent>,
}

impl ChangeNotifier {
    /// Creates a notifier with the default buffer capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a notifier with an explicit buffer capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribes to all future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.tx.subscribe()
    }

    /// Publishes an event to all current subscribers.
    ///
    /// Infallible from the caller's point of view: having no subscribers
    /// is normal and merely traced. Must only be called after the
    /// originating transaction has committed.
    pub fn publish(&self, event: LedgerEvent) {
        let slug = event.client_slug.clone();
        let event_type = event.event_type;
        match self.tx.send(event) {
            Ok(receivers) => {
                debug!(%slug, ?event_type, receivers, "published ledger event");
            }
            Err(_) => {
                debug!(%slug, ?event_type, "no subscribers for ledger event");
            }
        }
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_subscriber_receives_event() {
        let notifier = ChangeNotifier::new();
        let mut rx = notifier.subscribe();

        notifier.publish(LedgerEvent::new(
            "acme-corp-x9z2k",
            LedgerEventType::AddLog,
            json!({ "hours": "2.5" }),
        ));

        let event = rx.recv().await.expect("event");
        assert_eq!(event.client_slug, "acme-corp-x9z2k");
        assert_eq!(event.event_type, LedgerEventType::AddLog);
        assert_eq!(event.payload["hours"], "2.5");
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let notifier = ChangeNotifier::new();
        // Must not panic or error with zero receivers.
        notifier.publish(LedgerEvent::new(
            "ghost",
            LedgerEventType::ProjectDeleted,
            json!({}),
        ));
        assert_eq!(notifier.receiver_count(), 0);
    }

    #[test]
    fn test_event_type_wire_tags() {
        let tags: Vec<String> = [
            LedgerEventType::AddLog,
            LedgerEventType::Refill,
            LedgerEventType::DeleteLog,
            LedgerEventType::StatusUpdate,
            LedgerEventType::DetailsUpdate,
            LedgerEventType::ProjectDeleted,
        ]
        .iter()
        .map(|t| serde_json::to_string(t).unwrap())
        .collect();

        assert_eq!(
            tags,
            vec![
                "\"ADD_LOG\"",
                "\"REFILL\"",
                "\"DELETE_LOG\"",
                "\"STATUS_UPDATE\"",
                "\"DETAILS_UPDATE\"",
                "\"PROJECT_DELETED\"",
            ]
        );
    }
}
