//! Library entrypoint for AgriMarket.

use std::{sync::Arc, time::Duration};

use tokio::sync::{broadcast, mpsc};

pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub mod controllers;
pub mod routes;

use services::{
    alert_monitor::{MarketMonitor, Trigger},
    alerts_service::AlertStore,
    calculation_service::CalculationStore,
    dispatcher::{LocalDelivery, NotificationDispatcher},
    feed::MarketFeedClient,
    messages::{self, Messages},
    notification_store::NotificationStore,
    preferences::{PreferenceStore, Preferences},
    storage::SharedStore,
    watch_service::WatchList,
};

#[derive(Clone)]
pub struct AppState {
    pub settings: config::Settings,
    pub messages: Messages,
    pub alerts: AlertStore,
    pub watches: WatchList,
    pub notifications: NotificationStore,
    pub calculations: CalculationStore,
    pub preferences: PreferenceStore,
    pub delivery: Arc<LocalDelivery>,
    pub dispatcher: NotificationDispatcher,
    pub monitor: Arc<MarketMonitor>,
    pub events_tx: broadcast::Sender<String>,
}

impl AppState {
    /// Loads every persisted collection from `store` and wires the services.
    ///
    /// The returned receiver feeds `spawn_price_alert_monitor`.
    pub fn build(
        settings: config::Settings,
        store: SharedStore,
    ) -> anyhow::Result<(Self, mpsc::Receiver<Trigger>)> {
        let messages = messages::build_messages()?;
        let (events_tx, _events_rx) = broadcast::channel::<String>(64);

        let alerts = AlertStore::load(store.clone())?;
        let notifications = NotificationStore::load(store.clone())?;
        let calculations = CalculationStore::load(store.clone())?;
        let preferences = PreferenceStore::load(store, Preferences::from_settings(&settings))?;
        let watches = WatchList::new();

        let delivery = Arc::new(LocalDelivery::new(32));
        let dispatcher = NotificationDispatcher::new(
            notifications.clone(),
            delivery.clone(),
            messages.clone(),
            preferences.clone(),
            events_tx.clone(),
        );

        let feed = MarketFeedClient::new(
            settings.market_feed_url.clone(),
            Duration::from_secs(settings.feed_timeout_secs),
        );
        let (monitor, triggers) = MarketMonitor::new(
            feed,
            alerts.clone(),
            watches.clone(),
            dispatcher.clone(),
            events_tx.clone(),
        );

        let state = AppState {
            settings,
            messages,
            alerts,
            watches,
            notifications,
            calculations,
            preferences,
            delivery,
            dispatcher,
            monitor,
            events_tx,
        };

        Ok((state, triggers))
    }
}
