#![allow(dead_code)]

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use agrimarket::{config::Settings, services::storage::MemoryStore, AppState};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    routing::get,
    Router,
};
use http_body_util::BodyExt;

pub fn test_settings(feed_url: &str) -> Settings {
    Settings {
        host: "127.0.0.1".to_string(),
        port: 0,
        data_dir: String::new(),
        market_feed_url: feed_url.to_string(),
        feed_timeout_secs: 2,
        poll_interval_secs: 30,
        language: "en".to_string(),
        notifications_enabled: true,
    }
}

pub fn test_state(feed_url: &str) -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let (state, _triggers) =
        AppState::build(test_settings(feed_url), store.clone()).expect("app state");
    (state, store)
}

pub async fn response_json(res: axum::response::Response) -> serde_json::Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
}

pub fn json_request(method: &str, uri: &str, body: Option<serde_json::Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// A local stand-in for the market feed whose reply can change between requests.
pub struct FeedDouble {
    pub url: String,
    body: Arc<Mutex<String>>,
    status: Arc<Mutex<StatusCode>>,
}

impl FeedDouble {
    pub fn set_body(&self, body: &str) {
        *self.body.lock().unwrap() = body.to_string();
    }

    pub fn set_status(&self, status: StatusCode) {
        *self.status.lock().unwrap() = status;
    }
}

pub async fn spawn_feed(body: &str, delay: Duration) -> FeedDouble {
    let body = Arc::new(Mutex::new(body.to_string()));
    let status = Arc::new(Mutex::new(StatusCode::OK));

    let (b, s) = (body.clone(), status.clone());
    let app = Router::new().route(
        "/feed",
        get(move || {
            let (b, s) = (b.clone(), s.clone());
            async move {
                tokio::time::sleep(delay).await;
                let status = *s.lock().unwrap();
                let body = b.lock().unwrap().clone();
                (status, body)
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FeedDouble {
        url: format!("http://{addr}/feed"),
        body,
        status,
    }
}

pub fn feed_xml(rows: &[(&str, &str, &str, &str)]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<data>");
    for (name, high, low, last) in rows {
        xml.push_str(&format!(
            "<record><SecurityName>{name}</SecurityName><HighPrice>{high}</HighPrice>\
             <LowPrice>{low}</LowPrice><LastPrice>{last}</LastPrice></record>"
        ));
    }
    xml.push_str("</data>");
    xml
}

pub const MAIZE: &str = "YELLOW MAIZE FUTURE SPOT";
