//! cninfo-specific error types

use crate::models::Market;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CninfoError {
    #[error("Stock '{input}' not found in stock database (code pattern suggests {market_hint})")]
    StockNotFound {
        input: String,
        market_hint: Market,
    },

    #[error("Failed to parse stock database {path}: {source}")]
    StockDatabase {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse cninfo response: {0}")]
    ResponseParse(#[from] serde_json::Error),

    #[error("cninfo API error (status {status_code}): {message}")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
