use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::domain::types::WorkspaceId;

/// Row-level change kinds, plus the ephemeral signals that ride the same feed.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    Insert,
    Update,
    Delete,
    Typing,
    Read,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ChangeEvent {
    pub workspace_id: i32,
    pub table: &'static str,
    pub action: ChangeAction,
    pub row_id: i32,
    pub payload: serde_json::Value,
    pub at: NaiveDateTime,
}

impl ChangeEvent {
    pub fn new<T: Serialize>(
        workspace_id: WorkspaceId,
        table: &'static str,
        action: ChangeAction,
        row_id: i32,
        payload: &T,
    ) -> Self {
        let payload = serde_json::to_value(payload).unwrap_or_else(|err| {
            log::warn!("Dropping unserializable payload for {table}: {err}");
            serde_json::Value::Null
        });
        Self {
            workspace_id: workspace_id.get(),
            table,
            action,
            row_id,
            payload,
            at: Utc::now().naive_utc(),
        }
    }
}

/// Fan-out hub shared by every request handler.
#[derive(Clone, Debug)]
pub struct EventHub {
    sender: broadcast::Sender<ChangeEvent>,
}

impl EventHub {
    /// Lagging receivers lose the oldest events once `capacity` is exceeded.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Returns the number of subscribers reached; zero is not an error.
    pub fn publish(&self, event: ChangeEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(workspace: i32, row_id: i32) -> ChangeEvent {
        ChangeEvent::new(
            WorkspaceId::new(workspace).unwrap(),
            "messages",
            ChangeAction::Insert,
            row_id,
            &serde_json::json!({ "body": "hi" }),
        )
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        let hub = EventHub::new(4);
        assert_eq!(hub.publish(event(1, 1)), 0);
    }

    #[test]
    fn subscribers_receive_events_in_order() {
        let hub = EventHub::new(4);
        let mut rx = hub.subscribe();
        hub.publish(event(1, 1));
        hub.publish(event(1, 2));

        assert_eq!(rx.try_recv().unwrap().row_id, 1);
        assert_eq!(rx.try_recv().unwrap().row_id, 2);
    }

    #[test]
    fn slow_subscriber_observes_lag() {
        let hub = EventHub::new(2);
        let mut rx = hub.subscribe();
        for id in 1..=4 {
            hub.publish(event(1, id));
        }

        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Lagged(2))
        ));
        assert_eq!(rx.try_recv().unwrap().row_id, 3);
    }
}
