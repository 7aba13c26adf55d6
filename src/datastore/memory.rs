//! In-memory storage backend.
//!
//! Each key is backed by its own watch channel, so observers see the current
//! value immediately and every change afterwards. Intended for tests and
//! wiring; nothing is persisted.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::watch;

use super::{DataStore, ValueWatch};

/// [`DataStore`] holding everything in process memory.
#[derive(Default)]
pub struct MemoryDataStore {
    entries: Mutex<HashMap<String, Arc<watch::Sender<Option<Value>>>>>,
}

impl MemoryDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Channel backing `key`, created unset on first touch.
    fn channel(&self, key: &str) -> Arc<watch::Sender<Option<Value>>> {
        let mut entries = self.entries.lock();
        Arc::clone(
            entries
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(watch::channel(None).0)),
        )
    }
}

#[async_trait]
impl DataStore for MemoryDataStore {
    fn observe_value(&self, key: &str) -> ValueWatch {
        ValueWatch::new(self.channel(key).subscribe())
    }

    async fn get_value(&self, key: &str) -> Option<Value> {
        let sender = {
            let entries = self.entries.lock();
            entries.get(key).cloned()
        };
        sender.and_then(|sender| sender.borrow().clone())
    }

    async fn set_value(&self, key: &str, value: Value) {
        self.channel(key).send_replace(Some(value));
    }

    async fn delete_value(&self, key: &str) {
        let sender = {
            let entries = self.entries.lock();
            entries.get(key).cloned()
        };
        if let Some(sender) = sender {
            sender.send_replace(None);
        }
    }
}
