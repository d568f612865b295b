//! Key-value blob storage shared by the history, achievement and settings stores.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use anyhow::{anyhow, Context, Result};
use serde::{de::DeserializeOwned, Serialize};

const ENABLE_LOGS: bool = true;

use crate::log_warn;

pub mod keys {
    pub const SESSIONS: &str = "bite_sessions";
    pub const ACHIEVEMENTS: &str = "bite_achievements";
    pub const SETTINGS: &str = "bite_settings";
}

pub trait BlobStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;
}

/// Process-local store. Clones share the same map.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let guard = self
            .entries
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        guard.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

/// Reads and decodes `key`. Missing keys, read errors and decode errors all yield `None`.
pub fn load_json<T: DeserializeOwned>(store: &dyn BlobStore, key: &str) -> Option<T> {
    let bytes = match store.get(key) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return None,
        Err(err) => {
            log_warn!("failed to read '{key}' from store: {err:#}");
            return None;
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(err) => {
            log_warn!("discarding undecodable '{key}' entry: {err}");
            None
        }
    }
}

pub fn save_json<T: Serialize + ?Sized>(store: &dyn BlobStore, key: &str, value: &T) -> Result<()> {
    let encoded =
        serde_json::to_vec(value).with_context(|| format!("failed to encode '{key}'"))?;
    store
        .set(key, &encoded)
        .with_context(|| format!("failed to write '{key}'"))
}
