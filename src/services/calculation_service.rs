use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    error::StorageError,
    models::{
        calculation::INVALID_INPUT, CalculationRecord, CalculationResult, CostSummary, FormFields,
    },
};

use super::{
    collection::PersistedList,
    evaluator::parse_price,
    storage::{SharedStore, CALCULATIONS_KEY, LAST_CALC_TIME_KEY},
};

/// Break-even and target-profit price per ton for a cost form.
///
/// Empty or unreadable numbers count as 0; insurance only counts when the
/// form says there is insurance. Zero hectares or zero yield cannot be
/// divided by and yield "Invalid input" for both prices.
pub fn calculate(fields: &FormFields) -> CalculationResult {
    let hectares = parse_price(&fields.hectares);
    let average_yield = parse_price(&fields.average_yield);
    let profit_wanted = parse_price(&fields.profit_wanted);
    let insurance = if fields.has_insurance {
        parse_price(&fields.insurance)
    } else {
        0.0
    };

    let total_cost: f64 = [
        &fields.seed_cost,
        &fields.fertiliser_cost,
        &fields.chemicals_cost,
        &fields.employee_cost,
        &fields.eskom_cost,
        &fields.fuel_cost,
        &fields.transport_cost,
        &fields.other_expenses,
    ]
    .iter()
    .map(|v| parse_price(v))
    .sum::<f64>()
        + insurance;

    if hectares == 0.0 || average_yield == 0.0 {
        return CalculationResult {
            break_even: INVALID_INPUT.to_string(),
            price_with_profit: INVALID_INPUT.to_string(),
        };
    }

    let break_even = total_cost / hectares / average_yield;
    let price_with_profit = (total_cost + profit_wanted) / hectares / average_yield;

    CalculationResult {
        break_even: format!("{:.2}", break_even),
        price_with_profit: format!("{:.2}", price_with_profit),
    }
}

fn parse_result(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Average prices over a history; `None` for an empty history.
pub fn summarize(records: &[CalculationRecord]) -> Option<CostSummary> {
    if records.is_empty() {
        return None;
    }

    let mut break_even_sum = 0.0;
    let mut profit_sum = 0.0;
    let mut count = 0usize;

    for r in records {
        let be = parse_result(&r.result.break_even);
        let pw = parse_result(&r.result.price_with_profit);
        if let Some(v) = be {
            break_even_sum += v;
        }
        if let Some(v) = pw {
            profit_sum += v;
        }
        if be.is_some() && pw.is_some() {
            count += 1;
        }
    }

    let divisor = count.max(1) as f64;
    Some(CostSummary {
        avg_break_even: break_even_sum / divisor,
        avg_profit: profit_sum / divisor,
        count,
    })
}

#[derive(Clone)]
pub struct CalculationStore {
    list: Arc<PersistedList<CalculationRecord>>,
    store: SharedStore,
}

impl CalculationStore {
    pub fn load(store: SharedStore) -> Result<Self, StorageError> {
        Ok(Self {
            list: Arc::new(PersistedList::load(store.clone(), CALCULATIONS_KEY)?),
            store,
        })
    }

    /// Calculates, stores the record at the head of the history and stamps
    /// the last-calculation time. Only a failed history write is an error.
    pub async fn record(&self, fields: FormFields) -> Result<CalculationRecord, StorageError> {
        let record = CalculationRecord {
            result: calculate(&fields),
            fields,
            timestamp: Utc::now().timestamp_millis(),
        };

        let stored = record.clone();
        self.list.mutate(move |items| items.insert(0, stored)).await?;

        // best effort
        if let Err(e) = self.store.set(LAST_CALC_TIME_KEY, &record.timestamp.to_string()) {
            tracing::warn!("could not stamp {}: {}", LAST_CALC_TIME_KEY, e);
        }

        Ok(record)
    }

    pub async fn history(&self) -> Vec<CalculationRecord> {
        self.list.snapshot().await
    }

    pub async fn summary(&self) -> Option<CostSummary> {
        summarize(&self.list.snapshot().await)
    }

    pub fn last_calculated_at(&self) -> Result<Option<DateTime<Utc>>, StorageError> {
        let raw = self.store.get(LAST_CALC_TIME_KEY)?;
        Ok(raw
            .and_then(|s| s.trim().parse::<i64>().ok())
            .and_then(DateTime::from_timestamp_millis))
    }
}
