pub mod storage;
pub mod collection;
pub mod feed;
pub mod evaluator;
pub mod messages;
pub mod preferences;
pub mod alert_monitor;

pub mod alerts_service;
pub mod watch_service;
pub mod notification_store;
pub mod dispatcher;
pub mod calculation_service;
