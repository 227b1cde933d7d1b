use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;

use crate::error::StorageError;

use super::storage::SharedStore;

/// A JSON array persisted under a single key.
///
/// Mutations are serialized through one async lock: each one works on a copy
/// of the latest snapshot, writes it out, and only then replaces the
/// in-memory list. A failed write leaves both copies as they were.
pub struct PersistedList<T> {
    key: &'static str,
    store: SharedStore,
    items: Mutex<Vec<T>>,
}

impl<T> PersistedList<T>
where
    T: Serialize + DeserializeOwned + Clone + Send,
{
    pub fn load(store: SharedStore, key: &'static str) -> Result<Self, StorageError> {
        let items = match store.get(key)? {
            Some(raw) => match serde_json::from_str::<Vec<T>>(&raw) {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!("discarding unreadable {}: {}", key, e);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        tracing::debug!("loaded {} entries from {}", items.len(), key);

        Ok(Self {
            key,
            store,
            items: Mutex::new(items),
        })
    }

    pub async fn snapshot(&self) -> Vec<T> {
        self.items.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.items.lock().await.len()
    }

    /// Applies `f` to a copy of the list and commits it once it is persisted.
    pub async fn mutate<R>(&self, f: impl FnOnce(&mut Vec<T>) -> R) -> Result<R, StorageError> {
        let mut guard = self.items.lock().await;

        let mut next = guard.clone();
        let out = f(&mut next);

        let raw = serde_json::to_string(&next).map_err(|source| StorageError::Encode {
            key: self.key.to_string(),
            source,
        })?;
        self.store.set(self.key, &raw)?;

        *guard = next;
        Ok(out)
    }
}
