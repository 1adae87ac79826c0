//! Error handling for etfdash
//!
//! Defines custom error types and establishes a unified Result type
//! using anyhow for context chaining and error propagation.
//!
//! Per-instrument data issues (missing history, zero base price, new
//! listings) are never errors: they degrade to absent fields in the
//! output. The only fail-fast path is a structurally invalid price
//! series handed in by the acquisition layer.

use thiserror::Error;

/// Core error types for dashboard operations
#[derive(Error, Debug)]
pub enum DashError {
    #[error("malformed price series for {ticker}: {reason}")]
    MalformedSeries { ticker: String, reason: String },

    #[error("fetch error: {0}")]
    FetchError(String),

    #[error("cache error: {0}")]
    CacheError(String),

    #[error("unknown ticker: {0}")]
    UnknownTicker(String),

    #[error("io error")]
    Io(#[from] std::io::Error),
}

/// Result type alias for dashboard operations
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_formatting_is_readable() {
        let err = DashError::MalformedSeries {
            ticker: "1306.T".to_string(),
            reason: "duplicate date 2024-01-05".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "malformed price series for 1306.T: duplicate date 2024-01-05"
        );
    }

    #[test]
    fn test_anyhow_context_chains_errors() {
        use anyhow::Context;
        let result: Result<()> =
            Err(anyhow::anyhow!("original error")).context("failed to build price table");
        match result {
            Err(e) => {
                assert!(e.to_string().contains("failed to build price table"));
                let debug_msg = format!("{:?}", e);
                assert!(debug_msg.contains("original error"));
            }
            Ok(_) => panic!("expected error"),
        }
    }

    #[test]
    fn test_dash_error_variants() {
        let fetch_err = DashError::FetchError("timeout".to_string());
        assert!(fetch_err.to_string().starts_with("fetch error"));

        let cache_err = DashError::CacheError("stale".to_string());
        assert!(cache_err.to_string().starts_with("cache error"));

        let ticker_err = DashError::UnknownTicker("XXXX.T".to_string());
        assert!(ticker_err.to_string().starts_with("unknown ticker"));
    }
}
