use serde::{Deserialize, Serialize};

pub const COMMODITIES: [&str; 3] = [
    "YELLOW MAIZE FUTURE SPOT",
    "WHITE MAIZE FUTURE SPOT",
    "SOYBEAN FUTURE SPOT",
];

pub const INVALID_INPUT: &str = "Invalid input";

/// Cost form as typed by the user; numbers are parsed at calculation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormFields {
    pub hectares: String,
    pub seed_cost: String,
    pub fertiliser_cost: String,
    pub chemicals_cost: String,
    pub employee_cost: String,
    pub eskom_cost: String,
    pub fuel_cost: String,
    pub transport_cost: String,
    pub other_expenses: String,
    pub profit_wanted: String,
    pub average_yield: String,
    pub insurance: String,
    pub commodity: String,
    pub has_insurance: bool,
}

impl Default for FormFields {
    fn default() -> Self {
        Self {
            hectares: String::new(),
            seed_cost: String::new(),
            fertiliser_cost: String::new(),
            chemicals_cost: String::new(),
            employee_cost: String::new(),
            eskom_cost: String::new(),
            fuel_cost: String::new(),
            transport_cost: String::new(),
            other_expenses: String::new(),
            profit_wanted: String::new(),
            average_yield: String::new(),
            insurance: String::new(),
            commodity: COMMODITIES[0].to_string(),
            has_insurance: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub break_even: String,
    pub price_with_profit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRecord {
    pub fields: FormFields,
    pub result: CalculationResult,
    // epoch millis
    pub timestamp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostSummary {
    pub avg_break_even: f64,
    pub avg_profit: f64,
    pub count: usize,
}
