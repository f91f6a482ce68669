/// Result type for harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Error types for channel lookup, enumeration and configuration
#[derive(thiserror::Error, Debug)]
pub enum HarvestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("YouTube API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Channel {0} has no uploads playlist")]
    NoUploadsPlaylist(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl HarvestError {
    /// Configuration errors are the only ones that abort a run
    pub fn is_configuration(&self) -> bool {
        matches!(self, HarvestError::Configuration(_))
    }
}
