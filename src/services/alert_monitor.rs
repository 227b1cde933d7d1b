//! The feed cycle: fetch, evaluate, dispatch.
//!
//! One loop serves the poll timer and queued triggers (foreground
//! transitions). Manual refreshes call `run_cycle` directly; a cycle guard
//! makes sure only one cycle is in flight, later requests are skipped.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use chrono::Utc;
use serde::Serialize;
use tokio::{
    sync::{broadcast, mpsc, watch, Mutex, RwLock},
    task::JoinHandle,
    time,
};

use crate::{error::FeedError, models::MarketSnapshot};

use super::{
    alerts_service::AlertStore,
    dispatcher::{NotificationDispatcher, RaiseOutcome},
    evaluator,
    feed::MarketFeedClient,
    watch_service::WatchList,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleState {
    Idle,
    Fetching,
    Evaluating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Timer,
    Foreground,
    Manual,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Evaluated {
        rows: usize,
        matches: usize,
        recorded: usize,
    },
    Failed(FeedError),
    /// Another cycle was already running.
    Skipped,
}

pub struct MarketMonitor {
    feed: MarketFeedClient,
    alerts: AlertStore,
    watches: WatchList,
    dispatcher: NotificationDispatcher,
    events_tx: broadcast::Sender<String>,

    cycle_guard: Mutex<()>,
    state_tx: watch::Sender<CycleState>,
    latest: RwLock<Option<MarketSnapshot>>,
    last_error: RwLock<Option<FeedError>>,

    trigger_tx: mpsc::Sender<Trigger>,
    foreground: AtomicBool,
}

impl MarketMonitor {
    pub fn new(
        feed: MarketFeedClient,
        alerts: AlertStore,
        watches: WatchList,
        dispatcher: NotificationDispatcher,
        events_tx: broadcast::Sender<String>,
    ) -> (Arc<Self>, mpsc::Receiver<Trigger>) {
        let (trigger_tx, trigger_rx) = mpsc::channel(8);
        let (state_tx, _) = watch::channel(CycleState::Idle);

        let monitor = Arc::new(Self {
            feed,
            alerts,
            watches,
            dispatcher,
            events_tx,
            cycle_guard: Mutex::new(()),
            state_tx,
            latest: RwLock::new(None),
            last_error: RwLock::new(None),
            trigger_tx,
            foreground: AtomicBool::new(true),
        });

        (monitor, trigger_rx)
    }

    pub fn state(&self) -> CycleState {
        *self.state_tx.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<CycleState> {
        self.state_tx.subscribe()
    }

    pub async fn latest(&self) -> Option<MarketSnapshot> {
        self.latest.read().await.clone()
    }

    pub async fn last_error(&self) -> Option<FeedError> {
        self.last_error.read().await.clone()
    }

    /// Queues a cycle for the monitor loop. A full queue already holds a
    /// pending cycle, so the request is dropped.
    pub fn request(&self, trigger: Trigger) -> bool {
        match self.trigger_tx.try_send(trigger) {
            Ok(()) => true,
            Err(_) => {
                tracing::debug!("cycle request {:?} dropped, one is already queued", trigger);
                false
            }
        }
    }

    /// Records the app's visibility; coming back to the foreground queues a cycle.
    pub fn set_foreground(&self, active: bool) -> bool {
        let was_active = self.foreground.swap(active, Ordering::SeqCst);
        if active && !was_active {
            tracing::info!("app returned to foreground");
            return self.request(Trigger::Foreground);
        }
        false
    }

    pub fn is_foreground(&self) -> bool {
        self.foreground.load(Ordering::SeqCst)
    }

    pub async fn run_cycle(&self, trigger: Trigger) -> CycleOutcome {
        let Ok(_guard) = self.cycle_guard.try_lock() else {
            tracing::debug!("{:?} cycle skipped, another is in flight", trigger);
            return CycleOutcome::Skipped;
        };

        tracing::debug!("{:?} cycle: fetching", trigger);
        self.state_tx.send_replace(CycleState::Fetching);

        let rows = match self.feed.fetch_prices().await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!("market feed failed: {}", e);
                *self.last_error.write().await = Some(e.clone());
                self.state_tx.send_replace(CycleState::Idle);
                let _ = self.events_tx.send("marketFailed".to_string());
                return CycleOutcome::Failed(e);
            }
        };

        *self.latest.write().await = Some(MarketSnapshot {
            rows: rows.clone(),
            fetched_at: Utc::now(),
        });
        *self.last_error.write().await = None;
        let _ = self.events_tx.send("marketUpdated".to_string());

        self.state_tx.send_replace(CycleState::Evaluating);

        let rules = self.alerts.list().await;
        let watches = self.watches.list().await;
        let matches = evaluator::evaluate(&rows, &rules, &watches);

        let mut recorded = 0;
        for m in &matches {
            match self.dispatcher.dispatch(m).await {
                Ok(RaiseOutcome::Recorded(_)) => recorded += 1,
                Ok(RaiseOutcome::Duplicate) => {}
                Err(e) => {
                    // the store is unchanged, so the next cycle retries this match
                    tracing::error!("could not record alert for {}: {}", m.commodity, e);
                    let _ = self.events_tx.send("storageFailed".to_string());
                }
            }
        }

        tracing::info!(
            "feed cycle done: {} rows, {} matches, {} recorded",
            rows.len(),
            matches.len(),
            recorded
        );

        self.state_tx.send_replace(CycleState::Idle);

        CycleOutcome::Evaluated {
            rows: rows.len(),
            matches: matches.len(),
            recorded,
        }
    }
}

/// Runs a cycle on every poll tick (the first immediately) and on every
/// queued trigger. Ticks while the app is in the background are skipped.
pub fn spawn_price_alert_monitor(
    monitor: Arc<MarketMonitor>,
    mut triggers: mpsc::Receiver<Trigger>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Skip);

        loop {
            let trigger = tokio::select! {
                _ = interval.tick() => {
                    if !monitor.is_foreground() {
                        continue;
                    }
                    Trigger::Timer
                }
                t = triggers.recv() => match t {
                    Some(t) => t,
                    None => break,
                },
            };

            if let CycleOutcome::Failed(e) = monitor.run_cycle(trigger).await {
                tracing::debug!("cycle ended without evaluation: {}", e);
            }
        }
    })
}
