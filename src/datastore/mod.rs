//! Key-value storage contract.
//!
//! Backends store JSON values under string keys; feature code works through
//! the typed [`DataStoreExt`] extension with [`DataEntry`] keys that carry a
//! default value. The value-erased core keeps the trait object-safe so a
//! backend can be shared as `Arc<dyn DataStore>`.

mod memory;

pub use memory::MemoryDataStore;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::watch;

/// Errors surfaced by the typed storage operations.
#[derive(Debug, Error)]
pub enum DataStoreError {
    #[error("value for key '{key}' failed to encode: {reason}")]
    Serialization { key: String, reason: String },
}

/// Marker for types storable through a [`DataEntry`].
pub trait DataValue: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

impl<T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static> DataValue for T {}

/// Typed key: a string key plus the default returned while nothing is stored.
#[derive(Debug, Clone)]
pub struct DataEntry<T> {
    key: String,
    default_value: T,
}

impl<T: DataValue> DataEntry<T> {
    pub fn new(key: impl Into<String>, default_value: T) -> Self {
        Self {
            key: key.into(),
            default_value,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn default_value(&self) -> &T {
        &self.default_value
    }
}

/// Value-erased storage capability.
///
/// Implementations persist raw JSON values; `observe_value` must emit the
/// current value (or `None`) immediately, then every change.
#[async_trait]
pub trait DataStore: Send + Sync {
    fn observe_value(&self, key: &str) -> ValueWatch;

    async fn get_value(&self, key: &str) -> Option<Value>;

    async fn set_value(&self, key: &str, value: Value);

    async fn delete_value(&self, key: &str);
}

/// Live view of one raw entry: current value first, then updates.
pub struct ValueWatch {
    rx: watch::Receiver<Option<Value>>,
    primed: bool,
}

impl ValueWatch {
    /// Wrap a raw watch receiver. Backends construct these in
    /// [`DataStore::observe_value`].
    pub fn new(rx: watch::Receiver<Option<Value>>) -> Self {
        Self { rx, primed: false }
    }

    pub fn current(&self) -> Option<Value> {
        self.rx.borrow().clone()
    }

    /// Next observation, or `None` once the backend is gone.
    pub async fn next(&mut self) -> Option<Option<Value>> {
        if !self.primed {
            self.primed = true;
            return Some(self.rx.borrow_and_update().clone());
        }
        match self.rx.changed().await {
            Ok(()) => Some(self.rx.borrow_and_update().clone()),
            Err(_) => None,
        }
    }
}

/// Live view of one typed entry: the entry's default stands in while nothing
/// (or nothing decodable) is stored.
pub struct DataWatch<T> {
    raw: ValueWatch,
    default_value: T,
}

impl<T: DataValue> DataWatch<T> {
    /// Next observation, or `None` once the backend is gone.
    pub async fn next(&mut self) -> Option<T> {
        let raw = self.raw.next().await?;
        Some(decode_or(raw, &self.default_value))
    }

    pub fn current(&self) -> T {
        decode_or(self.raw.current(), &self.default_value)
    }
}

fn decode_or<T: DataValue>(raw: Option<Value>, default_value: &T) -> T {
    raw.and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or_else(|| default_value.clone())
}

/// Typed operations on top of any [`DataStore`].
#[async_trait]
pub trait DataStoreExt: DataStore {
    /// Observe an entry; emits the default while the entry is unset.
    fn observe<T: DataValue>(&self, entry: &DataEntry<T>) -> DataWatch<T> {
        DataWatch {
            raw: self.observe_value(entry.key()),
            default_value: entry.default_value().clone(),
        }
    }

    /// Current value of an entry, or `None` when unset (or undecodable).
    async fn get<T: DataValue>(&self, entry: &DataEntry<T>) -> Option<T> {
        let raw = self.get_value(entry.key()).await?;
        serde_json::from_value(raw).ok()
    }

    /// Store a value for an entry.
    async fn set<T: DataValue>(
        &self,
        entry: &DataEntry<T>,
        value: T,
    ) -> Result<(), DataStoreError> {
        let raw = serde_json::to_value(&value).map_err(|err| DataStoreError::Serialization {
            key: entry.key().to_string(),
            reason: err.to_string(),
        })?;
        self.set_value(entry.key(), raw).await;
        Ok(())
    }

    /// Remove an entry's value; observers fall back to the default.
    async fn delete<T: DataValue>(&self, entry: &DataEntry<T>) {
        self.delete_value(entry.key()).await;
    }
}

impl<S: DataStore + ?Sized> DataStoreExt for S {}
