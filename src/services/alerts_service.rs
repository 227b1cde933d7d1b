use std::{collections::HashMap, sync::Arc};

use uuid::Uuid;

use crate::{
    error::StorageError,
    models::{AlertRule, PriceType},
};

use super::{
    collection::PersistedList,
    storage::{SharedStore, ALERTS_KEY},
};

pub type FieldErrors = HashMap<String, String>;

/// Raw alert form values, validated into an `AlertRule`.
#[derive(Debug, Clone, Default)]
pub struct AlertDraft {
    pub commodity: String,
    pub price_type: String,
    pub target_value: String,
}

impl AlertDraft {
    pub fn validate(&self) -> Result<(String, PriceType, f64), FieldErrors> {
        let mut errs = FieldErrors::new();

        let commodity = self.commodity.trim().to_string();
        if commodity.is_empty() {
            errs.insert("commodity".into(), "Select a commodity.".into());
        }

        let price_type = match PriceType::parse(&self.price_type) {
            Some(p) => Some(p),
            None if self.price_type.trim().is_empty() => Some(PriceType::Last),
            None => {
                errs.insert("priceType".into(), "Choose High, Low or Last.".into());
                None
            }
        };

        let target = match self.target_value.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Some(v),
            _ => {
                errs.insert("targetValue".into(), "Enter a valid target value.".into());
                None
            }
        };

        match (price_type, target) {
            (Some(p), Some(t)) if errs.is_empty() => Ok((commodity, p, t)),
            _ => Err(errs),
        }
    }
}

#[derive(Debug)]
pub enum AlertError {
    Invalid(FieldErrors),
    Storage(StorageError),
}

impl From<StorageError> for AlertError {
    fn from(e: StorageError) -> Self {
        AlertError::Storage(e)
    }
}

#[derive(Clone)]
pub struct AlertStore {
    list: Arc<PersistedList<AlertRule>>,
}

impl AlertStore {
    pub fn load(store: SharedStore) -> Result<Self, StorageError> {
        Ok(Self {
            list: Arc::new(PersistedList::load(store, ALERTS_KEY)?),
        })
    }

    pub async fn list(&self) -> Vec<AlertRule> {
        self.list.snapshot().await
    }

    pub async fn create_alert(&self, draft: &AlertDraft) -> Result<AlertRule, AlertError> {
        let (commodity, price_type, target_value) = draft.validate().map_err(AlertError::Invalid)?;

        let alert = AlertRule {
            id: Uuid::new_v4().to_string(),
            commodity,
            price_type,
            target_value,
        };

        let stored = alert.clone();
        self.list.mutate(move |items| items.push(stored)).await?;

        tracing::info!(
            "alert added: {} {} {}",
            alert.commodity,
            alert.price_type,
            alert.target_value
        );

        Ok(alert)
    }

    /// Replaces the rule with the same id. Returns `None` when no such rule exists.
    pub async fn update_alert(&self, id: &str, draft: &AlertDraft) -> Result<Option<AlertRule>, AlertError> {
        let (commodity, price_type, target_value) = draft.validate().map_err(AlertError::Invalid)?;

        let updated = AlertRule {
            id: id.to_string(),
            commodity,
            price_type,
            target_value,
        };

        let replacement = updated.clone();
        let found = self
            .list
            .mutate(move |items| match items.iter_mut().find(|a| a.id == replacement.id) {
                Some(slot) => {
                    *slot = replacement;
                    true
                }
                None => false,
            })
            .await?;

        Ok(found.then_some(updated))
    }

    pub async fn delete_alert(&self, id: &str) -> Result<bool, StorageError> {
        self.list
            .mutate(|items| {
                let before = items.len();
                items.retain(|a| a.id != id);
                items.len() != before
            })
            .await
    }
}
