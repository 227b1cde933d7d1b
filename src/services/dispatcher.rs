use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio::{
    sync::broadcast::{self, error::RecvError},
    task::JoinHandle,
};
use uuid::Uuid;

use crate::{
    error::{DeliveryError, StorageError},
    models::{AlertRule, NotificationRecord, NotificationType},
};

use super::{
    evaluator::{AlertMatch, MatchSource},
    messages::{self, Messages},
    notification_store::{AppendOutcome, NotificationStore},
    preferences::PreferenceStore,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationContent {
    /// `None` when the sender gave no title.
    pub title: Option<String>,
    pub body: String,
    pub data: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveredNotification {
    pub identifier: String,
    pub content: NotificationContent,
}

/// The device's notification facility.
pub trait NotificationDelivery: Send + Sync {
    /// Shows `content` immediately; returns the delivery identifier.
    fn schedule(&self, content: NotificationContent) -> Result<String, DeliveryError>;

    /// Stream of notifications delivered from outside the app (push).
    fn on_received(&self) -> broadcast::Receiver<DeliveredNotification>;
}

/// How many shown notifications `LocalDelivery` keeps, oldest dropped first.
pub const DISPLAYED_LIMIT: usize = 50;

/// In-process delivery: scheduled notifications are logged and kept for
/// inspection, pushed ones are fanned out to `on_received` subscribers.
pub struct LocalDelivery {
    received_tx: broadcast::Sender<DeliveredNotification>,
    displayed: Mutex<Vec<DeliveredNotification>>,
}

impl LocalDelivery {
    pub fn new(capacity: usize) -> Self {
        let (received_tx, _) = broadcast::channel(capacity);
        Self {
            received_tx,
            displayed: Mutex::new(Vec::new()),
        }
    }

    /// Simulates an externally delivered notification.
    pub fn push(&self, content: NotificationContent) -> String {
        let identifier = Uuid::new_v4().to_string();
        let delivered = DeliveredNotification {
            identifier: identifier.clone(),
            content,
        };

        if self.received_tx.send(delivered).is_err() {
            tracing::warn!("pushed notification {} had no listener", identifier);
        }
        identifier
    }

    pub fn displayed(&self) -> Vec<DeliveredNotification> {
        self.displayed
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }
}

impl NotificationDelivery for LocalDelivery {
    fn schedule(&self, content: NotificationContent) -> Result<String, DeliveryError> {
        let identifier = Uuid::new_v4().to_string();
        tracing::info!(
            target: "device",
            "{}: {}",
            content.title.as_deref().unwrap_or_default(),
            content.body
        );

        let mut displayed = self
            .displayed
            .lock()
            .map_err(|_| DeliveryError::Unavailable("display list poisoned".to_string()))?;
        if displayed.len() >= DISPLAYED_LIMIT {
            displayed.remove(0);
        }
        displayed.push(DeliveredNotification {
            identifier: identifier.clone(),
            content,
        });

        Ok(identifier)
    }

    fn on_received(&self) -> broadcast::Receiver<DeliveredNotification> {
        self.received_tx.subscribe()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RaiseOutcome {
    Recorded(NotificationRecord),
    Duplicate,
}

#[derive(Clone)]
pub struct NotificationDispatcher {
    store: NotificationStore,
    delivery: Arc<dyn NotificationDelivery>,
    messages: Messages,
    preferences: PreferenceStore,
    events_tx: broadcast::Sender<String>,
}

impl NotificationDispatcher {
    pub fn new(
        store: NotificationStore,
        delivery: Arc<dyn NotificationDelivery>,
        messages: Messages,
        preferences: PreferenceStore,
        events_tx: broadcast::Sender<String>,
    ) -> Self {
        Self {
            store,
            delivery,
            messages,
            preferences,
            events_tx,
        }
    }

    pub async fn dispatch(&self, m: &AlertMatch) -> Result<RaiseOutcome, StorageError> {
        match &m.source {
            MatchSource::Rule(rule) => {
                let label = format!("{} price hit: {}", rule.price_type, rule.target_value);
                self.raise(&m.commodity, &label, Some(rule)).await
            }
            MatchSource::Watch(_) => self.raise(&m.commodity, &m.matched_price, None).await,
        }
    }

    /// Records a notification for a match and shows it on the device.
    ///
    /// Rule-raised notifications go through the store's duplicate check and
    /// are neither recorded nor shown again while an identical one exists.
    pub async fn raise(
        &self,
        commodity: &str,
        price_label: &str,
        rule: Option<&AlertRule>,
    ) -> Result<RaiseOutcome, StorageError> {
        let prefs = self.preferences.get().await;

        let ctx = json!({ "commodity": commodity, "lastPrice": price_label });
        let title = messages::render(&self.messages, prefs.language, "alert_title", &ctx);
        let body = messages::render(&self.messages, prefs.language, "alert_body", &ctx);

        let mut params = Map::new();
        params.insert("commodity".into(), json!(commodity));
        if let Some(r) = rule {
            params.insert("priceType".into(), json!(r.price_type.as_str()));
            params.insert("targetValue".into(), json!(r.target_value));
        }

        let record = NotificationRecord::new(title.clone(), body.clone(), params.clone());

        if rule.is_some() {
            if self.store.append(record.clone()).await? == AppendOutcome::Duplicate {
                tracing::debug!("suppressed duplicate alert for {}", commodity);
                return Ok(RaiseOutcome::Duplicate);
            }
        } else {
            self.store.append_unconditional(record.clone()).await?;
        }

        let _ = self.events_tx.send("notificationsUpdated".to_string());

        if prefs.notifications_enabled {
            let mut data = params.clone();
            data.insert("params".into(), Value::Object(params));

            if let Err(e) = self.delivery.schedule(NotificationContent {
                title: Some(title),
                body,
                data,
            }) {
                tracing::warn!("could not show notification for {}: {}", commodity, e);
            }
        }

        Ok(RaiseOutcome::Recorded(record))
    }

    /// Appends every externally delivered notification to the store.
    pub fn spawn_listener(&self) -> JoinHandle<()> {
        let mut rx = self.delivery.on_received();
        let store = self.store.clone();
        let events_tx = self.events_tx.clone();

        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(delivered) => {
                        let record = record_from_delivery(&delivered);
                        match store.append_unconditional(record).await {
                            Ok(()) => {
                                let _ = events_tx.send("notificationsUpdated".to_string());
                            }
                            Err(e) => {
                                tracing::error!("dropping delivered notification {}: {}", delivered.identifier, e);
                                let _ = events_tx.send("storageFailed".to_string());
                            }
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        tracing::warn!("notification listener skipped {} deliveries", n);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

fn data_str(data: &Map<String, Value>, key: &str) -> Option<String> {
    data.get(key).and_then(Value::as_str).map(str::to_string)
}

pub fn record_from_delivery(delivered: &DeliveredNotification) -> NotificationRecord {
    let content = &delivered.content;
    let data = &content.data;

    let title = content
        .title
        .clone()
        .unwrap_or_else(|| "No Title".to_string());

    let params = match data.get("params") {
        Some(Value::Object(m)) => m.clone(),
        _ => Map::new(),
    };

    let mut record = NotificationRecord::new(title, content.body.clone(), params);
    record.id = delivered.identifier.clone();
    record.image_url = data_str(data, "image_url");
    record.button_text = data_str(data, "button_text");
    record.button_link = data_str(data, "button_link");
    record.screen = data_str(data, "screen");
    record.notification_type = data_str(data, "notification_type")
        .map(|t| NotificationType::parse(&t))
        .unwrap_or_default();
    record
}
