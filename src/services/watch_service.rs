use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::WatchEntry;

/// Session-only price watches. Never persisted; gone on restart.
#[derive(Clone, Default)]
pub struct WatchList {
    entries: Arc<RwLock<Vec<WatchEntry>>>,
}

impl WatchList {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn list(&self) -> Vec<WatchEntry> {
        self.entries.read().await.clone()
    }

    pub async fn add(&self, entry: WatchEntry) {
        tracing::info!("watching {} above {}", entry.commodity, entry.price_with_profit);
        self.entries.write().await.push(entry);
    }

    /// Drops every watch on `commodity`; returns how many went.
    pub async fn remove_commodity(&self, commodity: &str) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|w| w.commodity != commodity);
        before - entries.len()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}
