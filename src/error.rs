use thiserror::Error;

/// Why a feed cycle produced no rows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    #[error("market feed request timed out")]
    Timeout,

    #[error("market feed unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error on {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not encode {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed market feed: {0}")]
    Xml(String),
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("notification delivery unavailable: {0}")]
    Unavailable(String),
}
