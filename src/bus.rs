use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{trace, warn};

/// Broadcasts every dispatched action, serialized to JSON, to whoever listens.
#[derive(Debug, Clone)]
pub struct ActionBus {
    sender: broadcast::Sender<Value>,
}

impl ActionBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn publish<T: Serialize>(&self, action: &T) {
        match serde_json::to_value(action) {
            Ok(value) => self.publish_value(value),
            Err(e) => warn!("Dropping action that can not be serialized: {e}"),
        }
    }

    pub fn publish_value(&self, value: Value) {
        // No subscribers is fine
        if self.sender.send(value).is_err() {
            trace!("No one is listening for actions");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Value> {
        self.sender.subscribe()
    }
}
