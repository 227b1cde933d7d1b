use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{config::Settings, error::StorageError};

use super::storage::{SharedStore, PREFERENCES_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Af,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Af => "af",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Some(Language::En),
            "af" | "afrikaans" => Some(Language::Af),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub language: Language,
    pub notifications_enabled: bool,
}

impl Preferences {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            language: Language::parse(&settings.language).unwrap_or_default(),
            notifications_enabled: settings.notifications_enabled,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesPatch {
    pub language: Option<Language>,
    pub notifications_enabled: Option<bool>,
}

#[derive(Clone)]
pub struct PreferenceStore {
    store: SharedStore,
    current: Arc<Mutex<Preferences>>,
}

impl PreferenceStore {
    /// Stored preferences win over the configured defaults.
    pub fn load(store: SharedStore, defaults: Preferences) -> Result<Self, StorageError> {
        let current = match store.get(PREFERENCES_KEY)? {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("discarding unreadable {}: {}", PREFERENCES_KEY, e);
                defaults
            }),
            None => defaults,
        };

        Ok(Self {
            store,
            current: Arc::new(Mutex::new(current)),
        })
    }

    pub async fn get(&self) -> Preferences {
        *self.current.lock().await
    }

    pub async fn update(&self, patch: PreferencesPatch) -> Result<Preferences, StorageError> {
        let mut guard = self.current.lock().await;

        let mut next = *guard;
        if let Some(lang) = patch.language {
            next.language = lang;
        }
        if let Some(enabled) = patch.notifications_enabled {
            next.notifications_enabled = enabled;
        }

        let raw = serde_json::to_string(&next).map_err(|source| StorageError::Encode {
            key: PREFERENCES_KEY.to_string(),
            source,
        })?;
        self.store.set(PREFERENCES_KEY, &raw)?;

        *guard = next;
        Ok(next)
    }
}
