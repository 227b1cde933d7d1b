use std::fmt;

use serde::{Deserialize, Serialize};

/// Which column of a feed row an alert compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriceType {
    High,
    Low,
    Last,
}

impl PriceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceType::High => "High",
            PriceType::Low => "Low",
            PriceType::Last => "Last",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Some(PriceType::High),
            "low" => Some(PriceType::Low),
            "last" => Some(PriceType::Last),
            _ => None,
        }
    }
}

impl fmt::Display for PriceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRule {
    pub id: String,
    pub commodity: String,
    pub price_type: PriceType,
    pub target_value: f64,
}
