use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::{FeedError, ParseError},
    models::PriceRow,
};

#[derive(Clone)]
pub struct MarketFeedClient {
    http: Client,
    url: String,
    timeout: Duration,
}

impl MarketFeedClient {
    pub fn new(url: String, timeout: Duration) -> Self {
        Self {
            http: Client::new(),
            url,
            timeout,
        }
    }

    fn has_url(&self) -> bool {
        !self.url.trim().is_empty()
    }

    /// Fetches and parses the feed once. The whole request, body included,
    /// races the configured timeout.
    pub async fn fetch_prices(&self) -> Result<Vec<PriceRow>, FeedError> {
        if !self.has_url() {
            return Err(FeedError::Unavailable(
                "MARKET_FEED_URL is missing in .env".to_string(),
            ));
        }

        match tokio::time::timeout(self.timeout, self.fetch_inner()).await {
            Ok(res) => res,
            Err(_) => {
                tracing::warn!("market feed timed out after {:?}", self.timeout);
                Err(FeedError::Timeout)
            }
        }
    }

    async fn fetch_inner(&self) -> Result<Vec<PriceRow>, FeedError> {
        let res = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FeedError::Unavailable(e.to_string()))?;

        tracing::debug!("market feed responded {}", res.status());

        if !res.status().is_success() {
            let status = res.status();
            return Err(FeedError::Unavailable(format!(
                "Failed to fetch market data: {status}"
            )));
        }

        let body = res
            .text()
            .await
            .map_err(|e| FeedError::Unavailable(e.to_string()))?;

        parse_feed(&body).map_err(|e| FeedError::Unavailable(e.to_string()))
    }
}

#[derive(Debug, Default, Deserialize)]
struct FeedDocument {
    #[serde(rename = "record", default)]
    records: Vec<PriceRow>,
}

/// Parses a feed document: any root element holding zero or more `record`
/// children. Missing price fields come back as empty strings.
pub fn parse_feed(xml: &str) -> Result<Vec<PriceRow>, ParseError> {
    if xml.trim().is_empty() {
        return Err(ParseError::Xml("empty document".to_string()));
    }

    let doc: FeedDocument =
        quick_xml::de::from_str(xml).map_err(|e| ParseError::Xml(e.to_string()))?;

    Ok(doc.records)
}
