use serde::{Deserialize, Serialize};

/// Session-only "tell me when the last price beats this" watch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchEntry {
    pub commodity: String,
    pub price_with_profit: String,
}
