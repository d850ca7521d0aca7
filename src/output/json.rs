//! JSON output formatting

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Envelope for `--format json` output
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T> {
    /// The actual data
    pub data: T,

    /// Metadata about the response
    pub meta: Metadata,
}

/// Metadata included in JSON output
#[derive(Debug, Serialize, Deserialize)]
pub struct Metadata {
    /// Timestamp of the response
    pub timestamp: String,

    /// CLI version
    pub version: String,
}

impl<T> JsonOutput<T> {
    /// Create a new JSON output with metadata
    pub fn new(data: T) -> Self {
        Self {
            data,
            meta: Metadata {
                timestamp: Utc::now().to_rfc3339(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }
}

/// Format data as pretty-printed JSON
pub fn format_json<T: Serialize + ?Sized>(data: &T) -> Result<String, serde_json::Error> {
    let output = JsonOutput::new(data);
    serde_json::to_string_pretty(&output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize, Clone)]
    struct Quote {
        symbol: String,
        price: f64,
    }

    #[test]
    fn test_json_output_carries_version() {
        let output = JsonOutput::new(vec!["AAPL", "MSFT"]);

        assert_eq!(output.data, vec!["AAPL", "MSFT"]);
        assert_eq!(output.meta.version, env!("CARGO_PKG_VERSION"));
        assert!(!output.meta.timestamp.is_empty());
    }

    #[test]
    fn test_format_json_wraps_data() {
        let quotes = vec![Quote {
            symbol: "AAPL".to_string(),
            price: 189.5,
        }];

        let result = format_json(&quotes).unwrap();

        assert!(result.contains("\"data\""));
        assert!(result.contains("\"meta\""));
        assert!(result.contains("\"symbol\": \"AAPL\""));
        assert!(result.contains("\"price\": 189.5"));
    }

    #[test]
    fn test_format_json_empty_watchlist() {
        let quotes: Vec<Quote> = vec![];
        let result = format_json(&quotes).unwrap();

        assert!(result.contains("\"data\": []"));
    }
}
