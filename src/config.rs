use std::env;

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub data_dir: String,

    pub market_feed_url: String,
    pub feed_timeout_secs: u64,
    pub poll_interval_secs: u64,

    // defaults for the persisted preferences
    pub language: String,
    pub notifications_enabled: bool,
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let host = env::var("HOST")
        .unwrap_or_else(|_| "127.0.0.1".to_string());

    let port = env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let data_dir = env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string());

    let market_feed_url = env::var("MARKET_FEED_URL").unwrap_or_default();

    let feed_timeout_secs = env::var("FEED_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(8);

    let poll_interval_secs = env::var("POLL_INTERVAL_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(30);

    let language = env::var("APP_LANGUAGE").unwrap_or_else(|_| "en".to_string());

    let notifications_enabled = env::var("NOTIFICATIONS_ENABLED")
        .map(|v| !(v == "0" || v.eq_ignore_ascii_case("false")))
        .unwrap_or(true);

    Settings {
        host,
        port,
        data_dir,
        market_feed_url,
        feed_timeout_secs,
        poll_interval_secs,
        language,
        notifications_enabled,
    }
}
