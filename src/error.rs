use thiserror::Error;

/// Main error type for the scraping library
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// Transport-level HTTP failure (DNS, timeout, refused, bad status).
    /// Not retried at this layer.
    #[error("Connection failed: {0}")]
    Connection(#[from] reqwest::Error),

    /// A search fetch failed inside the name-shortening retry loop
    #[error("{game} ({appid}): search fetch failed")]
    Lookup { game: String, appid: u64 },

    /// Name retries exhausted without extracting any duration entries
    #[error("{game} ({appid}): times not found")]
    GameLengthNotFound { game: String, appid: u64 },

    /// Review page budget exhausted without a single qualifying hour count
    #[error("{game} ({appid}): no review times found")]
    NoReviewsFound { game: String, appid: u64 },

    /// The remote page no longer matches the parser's structural assumptions
    #[error("{game} ({appid}): page layout changed ({context})")]
    LayoutChanged {
        game: String,
        appid: u64,
        context: String,
    },

    /// Steam Web API level failure (denied, malformed, unresolvable user)
    #[error("Steam API error from {endpoint}: {message}")]
    Api { endpoint: String, message: String },

    /// JSON deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Parsing-state bug (e.g. duplicate duration label). Must never occur
    /// in correct operation; file a bug if it does.
    #[error("Internal consistency fault: {0}")]
    Internal(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ScrapeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ScrapeError::GameLengthNotFound {
            game: "Portal".to_string(),
            appid: 400,
        };
        assert_eq!(err.to_string(), "Portal (400): times not found");
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{broken").unwrap_err();
        let err: ScrapeError = json_err.into();
        assert!(matches!(err, ScrapeError::Json(_)));
    }
}
