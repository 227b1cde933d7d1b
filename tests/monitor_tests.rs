mod common;

use std::{sync::Arc, time::Duration};

use agrimarket::{
    error::FeedError,
    models::WatchEntry,
    services::{
        alert_monitor::{spawn_price_alert_monitor, CycleOutcome, CycleState, Trigger},
        alerts_service::AlertDraft,
        dispatcher::{NotificationContent, NotificationDelivery, DISPLAYED_LIMIT},
        preferences::PreferencesPatch,
    },
    AppState,
};
use axum::http::StatusCode;
use serde_json::{json, Map};

use common::{feed_xml, spawn_feed, test_state, MAIZE};

async fn add_rule(state: &AppState, price_type: &str, target: &str) {
    state
        .alerts
        .create_alert(&AlertDraft {
            commodity: MAIZE.to_string(),
            price_type: price_type.to_string(),
            target_value: target.to_string(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn matching_rule_records_one_notification() {
    let feed = spawn_feed(&feed_xml(&[(MAIZE, "", "", "100")]), Duration::ZERO).await;
    let (state, _) = test_state(&feed.url);
    add_rule(&state, "Last", "100").await;

    let outcome = state.monitor.run_cycle(Trigger::Manual).await;

    assert_eq!(
        outcome,
        CycleOutcome::Evaluated {
            rows: 1,
            matches: 1,
            recorded: 1
        }
    );
    let list = state.notifications.list().await;
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].params["commodity"], json!(MAIZE));
    assert_eq!(list[0].params["priceType"], json!("Last"));
    assert_eq!(list[0].params["targetValue"], json!(100.0));
    assert!(list[0].body.contains(MAIZE));
    assert_eq!(state.delivery.displayed().len(), 1);
    assert_eq!(state.monitor.state(), CycleState::Idle);
}

#[tokio::test]
async fn repeated_cycles_do_not_repeat_rule_notifications() {
    let feed = spawn_feed(&feed_xml(&[(MAIZE, "", "", "100")]), Duration::ZERO).await;
    let (state, _) = test_state(&feed.url);
    add_rule(&state, "Last", "100").await;

    state.monitor.run_cycle(Trigger::Timer).await;
    let second = state.monitor.run_cycle(Trigger::Timer).await;

    assert_eq!(
        second,
        CycleOutcome::Evaluated {
            rows: 1,
            matches: 1,
            recorded: 0
        }
    );
    assert_eq!(state.notifications.count().await, 1);
    assert_eq!(state.delivery.displayed().len(), 1);
}

#[tokio::test]
async fn near_miss_records_nothing() {
    let feed = spawn_feed(&feed_xml(&[(MAIZE, "", "", "100.01")]), Duration::ZERO).await;
    let (state, _) = test_state(&feed.url);
    add_rule(&state, "Last", "100").await;

    state.monitor.run_cycle(Trigger::Manual).await;

    assert_eq!(state.notifications.count().await, 0);
    assert!(state.delivery.displayed().is_empty());
}

#[tokio::test]
async fn watch_records_on_every_cycle() {
    let feed = spawn_feed(&feed_xml(&[(MAIZE, "", "", "5200")]), Duration::ZERO).await;
    let (state, _) = test_state(&feed.url);
    state
        .watches
        .add(WatchEntry {
            commodity: MAIZE.to_string(),
            price_with_profit: "5000".to_string(),
        })
        .await;

    state.monitor.run_cycle(Trigger::Manual).await;
    state.monitor.run_cycle(Trigger::Manual).await;

    let list = state.notifications.list().await;
    assert_eq!(list.len(), 2);
    assert!(list[0].params.get("targetValue").is_none());
    assert!(list[0].body.contains("5200"));
}

#[tokio::test]
async fn failed_fetch_returns_to_idle_and_keeps_last_snapshot() {
    let feed = spawn_feed(&feed_xml(&[(MAIZE, "", "", "100")]), Duration::ZERO).await;
    let (state, _) = test_state(&feed.url);

    state.monitor.run_cycle(Trigger::Manual).await;
    feed.set_status(StatusCode::SERVICE_UNAVAILABLE);
    let outcome = state.monitor.run_cycle(Trigger::Manual).await;

    assert!(matches!(outcome, CycleOutcome::Failed(FeedError::Unavailable(_))));
    assert_eq!(state.monitor.state(), CycleState::Idle);
    assert!(state.monitor.last_error().await.is_some());
    let snapshot = state.monitor.latest().await.unwrap();
    assert_eq!(snapshot.rows.len(), 1);

    feed.set_status(StatusCode::OK);
    state.monitor.run_cycle(Trigger::Manual).await;
    assert!(state.monitor.last_error().await.is_none());
}

#[tokio::test]
async fn overlapping_cycle_is_skipped() {
    let feed = spawn_feed(&feed_xml(&[(MAIZE, "", "", "100")]), Duration::from_millis(500)).await;
    let (state, _) = test_state(&feed.url);
    add_rule(&state, "Last", "100").await;

    let monitor = state.monitor.clone();
    let first = tokio::spawn(async move { monitor.run_cycle(Trigger::Timer).await });
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(state.monitor.state(), CycleState::Fetching);
    assert_eq!(state.monitor.run_cycle(Trigger::Manual).await, CycleOutcome::Skipped);

    let outcome = first.await.unwrap();
    assert!(matches!(outcome, CycleOutcome::Evaluated { recorded: 1, .. }));
    assert_eq!(state.notifications.count().await, 1);
}

#[tokio::test]
async fn disabled_notifications_are_recorded_but_not_shown() {
    let feed = spawn_feed(&feed_xml(&[(MAIZE, "", "", "100")]), Duration::ZERO).await;
    let (state, _) = test_state(&feed.url);
    add_rule(&state, "Last", "100").await;
    state
        .preferences
        .update(PreferencesPatch {
            notifications_enabled: Some(false),
            ..PreferencesPatch::default()
        })
        .await
        .unwrap();

    state.monitor.run_cycle(Trigger::Manual).await;

    assert_eq!(state.notifications.count().await, 1);
    assert!(state.delivery.displayed().is_empty());
}

#[tokio::test]
async fn storage_failure_is_retried_next_cycle() {
    let feed = spawn_feed(&feed_xml(&[(MAIZE, "", "", "100")]), Duration::ZERO).await;
    let (state, store) = test_state(&feed.url);
    add_rule(&state, "Last", "100").await;
    let mut events = state.events_tx.subscribe();

    store.set_fail_writes(true);
    let failed = state.monitor.run_cycle(Trigger::Timer).await;
    assert!(matches!(failed, CycleOutcome::Evaluated { recorded: 0, .. }));
    assert_eq!(state.notifications.count().await, 0);

    let mut seen = Vec::new();
    while let Ok(e) = events.try_recv() {
        seen.push(e);
    }
    assert!(seen.iter().any(|e| e == "storageFailed"));

    store.set_fail_writes(false);
    let retried = state.monitor.run_cycle(Trigger::Timer).await;
    assert!(matches!(retried, CycleOutcome::Evaluated { recorded: 1, .. }));
    assert_eq!(state.notifications.count().await, 1);
}

#[tokio::test]
async fn pushed_notifications_are_recorded_by_the_listener() {
    let (state, _) = test_state("");
    let listener = state.dispatcher.spawn_listener();

    let mut params = Map::new();
    params.insert("commodity".into(), json!(MAIZE));
    let mut data = Map::new();
    data.insert("params".into(), json!(params));
    data.insert("screen".into(), json!("Market"));
    data.insert("notification_type".into(), json!("promotion"));

    let id = state.delivery.push(NotificationContent {
        title: None,
        body: "New prices are in".to_string(),
        data,
    });

    let mut stored = None;
    for _ in 0..50 {
        if let Some(n) = state.notifications.get(&id).await {
            stored = Some(n);
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    listener.abort();

    let n = stored.expect("listener should record the pushed notification");
    assert_eq!(n.title, "No Title");
    assert_eq!(n.screen.as_deref(), Some("Market"));
    assert_eq!(n.params["commodity"], json!(MAIZE));
    assert_eq!(state.notifications.count().await, 1);
}

#[tokio::test]
async fn foreground_flag_tracks_app_state() {
    let (state, _) = test_state("");

    assert!(state.monitor.is_foreground());
    assert!(!state.monitor.set_foreground(true));
    assert!(!state.monitor.set_foreground(false));
    assert!(!state.monitor.is_foreground());
}

#[tokio::test]
async fn foreground_return_triggers_a_cycle() {
    let feed = spawn_feed(&feed_xml(&[(MAIZE, "", "", "100")]), Duration::ZERO).await;
    let store = Arc::new(agrimarket::services::storage::MemoryStore::new());
    let (state, triggers) =
        AppState::build(common::test_settings(&feed.url), store).unwrap();
    add_rule(&state, "Last", "100").await;

    state.monitor.set_foreground(false);
    let handle = spawn_price_alert_monitor(state.monitor.clone(), triggers, Duration::from_secs(3600));

    // the first tick is skipped while in the background
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(state.notifications.count().await, 0);

    assert!(state.monitor.set_foreground(true));
    for _ in 0..50 {
        if state.notifications.count().await == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    handle.abort();

    assert_eq!(state.notifications.count().await, 1);
}

#[tokio::test]
async fn cycle_state_moves_through_fetching_back_to_idle() {
    let feed = spawn_feed(&feed_xml(&[(MAIZE, "", "", "100")]), Duration::from_millis(200)).await;
    let (state, _) = test_state(&feed.url);
    add_rule(&state, "Last", "100").await;

    let mut rx = state.monitor.subscribe_state();
    assert_eq!(*rx.borrow_and_update(), CycleState::Idle);

    let seen = tokio::spawn(async move {
        let mut seen = Vec::new();
        while rx.changed().await.is_ok() {
            let s = *rx.borrow_and_update();
            seen.push(s);
            if s == CycleState::Idle {
                break;
            }
        }
        seen
    });

    state.monitor.run_cycle(Trigger::Manual).await;
    let seen = tokio::time::timeout(Duration::from_secs(2), seen).await.unwrap().unwrap();

    assert_eq!(seen.first(), Some(&CycleState::Fetching));
    assert_eq!(seen.last(), Some(&CycleState::Idle));
}

#[tokio::test]
async fn shown_notifications_are_capped() {
    let (state, _) = test_state("");

    for i in 0..DISPLAYED_LIMIT + 5 {
        state
            .delivery
            .schedule(NotificationContent {
                title: Some(format!("n{i}")),
                body: String::new(),
                data: Map::new(),
            })
            .unwrap();
    }

    let shown = state.delivery.displayed();
    assert_eq!(shown.len(), DISPLAYED_LIMIT);
    assert_eq!(shown[0].content.title.as_deref(), Some("n5"));
    assert_eq!(
        shown.last().unwrap().content.title,
        Some(format!("n{}", DISPLAYED_LIMIT + 4))
    );
}
