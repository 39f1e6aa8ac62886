//! Topic-based subscription routing.
//!
//! Registrations are local to one channel: a replacement channel starts
//! with an empty router, and the owner re-subscribes from its
//! `on_connected` hook.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::mpsc;

/// Routes incoming notifications to subscribers by exact topic string.
#[derive(Clone, Default)]
pub struct SubscriptionRouter {
    entries: Arc<Mutex<HashMap<String, Vec<mpsc::UnboundedSender<Value>>>>>,
}

impl SubscriptionRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register interest in `topic` (e.g. `app:block:new`).
    pub fn register(&self, topic: &str) -> mpsc::UnboundedReceiver<Value> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.entries
            .lock()
            .unwrap()
            .entry(topic.to_string())
            .or_default()
            .push(tx);
        rx
    }

    /// Forward a notification payload to every subscriber of `topic`.
    ///
    /// Subscribers whose receiver was dropped are pruned on the way.
    pub fn dispatch(&self, topic: &str, payload: Value) {
        let mut entries = self.entries.lock().unwrap();
        if let Some(senders) = entries.get_mut(topic) {
            senders.retain(|tx| tx.send(payload.clone()).is_ok());
        }
    }

    /// Topics with at least one registration.
    pub fn topics(&self) -> Vec<String> {
        self.entries.lock().unwrap().keys().cloned().collect()
    }

    /// Number of registered topics.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
