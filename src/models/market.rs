use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PriceType;

/// One `record` element of the market feed. Prices stay as the feed sent them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PriceRow {
    pub security_name: String,
    pub high_price: String,
    pub low_price: String,
    pub last_price: String,
}

impl PriceRow {
    pub fn price(&self, kind: PriceType) -> &str {
        match kind {
            PriceType::High => &self.high_price,
            PriceType::Low => &self.low_price,
            PriceType::Last => &self.last_price,
        }
    }
}

/// Rows from the most recent successful fetch, kept for display only.
#[derive(Debug, Clone, Serialize)]
pub struct MarketSnapshot {
    pub rows: Vec<PriceRow>,
    pub fetched_at: DateTime<Utc>,
}

impl MarketSnapshot {
    /// Distinct, non-blank security names in feed order.
    pub fn commodities(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for row in &self.rows {
            let name = row.security_name.trim();
            if name.is_empty() || out.iter().any(|c| c == &row.security_name) {
                continue;
            }
            out.push(row.security_name.clone());
        }
        out
    }
}
