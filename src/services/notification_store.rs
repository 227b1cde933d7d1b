use std::sync::Arc;

use crate::{error::StorageError, models::NotificationRecord};

use super::{
    collection::PersistedList,
    storage::{SharedStore, NOTIFICATIONS_KEY},
};

#[derive(Debug, Clone, PartialEq)]
pub enum AppendOutcome {
    Inserted,
    /// A record with the same rule trigger already exists; nothing was written.
    Duplicate,
}

/// Newest-first notification log shared by every consumer.
#[derive(Clone)]
pub struct NotificationStore {
    list: Arc<PersistedList<NotificationRecord>>,
}

impl NotificationStore {
    pub fn load(store: SharedStore) -> Result<Self, StorageError> {
        Ok(Self {
            list: Arc::new(PersistedList::load(store, NOTIFICATIONS_KEY)?),
        })
    }

    /// Inserts at the head. Records raised by an alert rule are skipped when
    /// one with the same `(commodity, priceType, targetValue)` is present.
    pub async fn append(&self, record: NotificationRecord) -> Result<AppendOutcome, StorageError> {
        self.list
            .mutate(|items| {
                if record.is_rule_triggered() && items.iter().any(|n| n.same_trigger(&record)) {
                    return AppendOutcome::Duplicate;
                }
                items.insert(0, record);
                AppendOutcome::Inserted
            })
            .await
    }

    /// Inserts at the head without any duplicate check.
    pub async fn append_unconditional(&self, record: NotificationRecord) -> Result<(), StorageError> {
        self.list.mutate(|items| items.insert(0, record)).await
    }

    pub async fn list(&self) -> Vec<NotificationRecord> {
        self.list.snapshot().await
    }

    pub async fn get(&self, id: &str) -> Option<NotificationRecord> {
        self.list.snapshot().await.into_iter().find(|n| n.id == id)
    }

    pub async fn count(&self) -> usize {
        self.list.len().await
    }

    /// Returns whether a record was removed.
    pub async fn remove_by_id(&self, id: &str) -> Result<bool, StorageError> {
        self.list
            .mutate(|items| {
                let before = items.len();
                items.retain(|n| n.id != id);
                items.len() != before
            })
            .await
    }

    pub async fn clear_all(&self) -> Result<(), StorageError> {
        self.list.mutate(|items| items.clear()).await
    }
}
