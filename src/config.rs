use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{HarvestError, Result};

/// Configuration for the transcript harvester
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// YouTube Data API settings and the channels to harvest
    pub api: ApiConfig,

    /// Transcript retrieval settings
    pub fetch: FetchConfig,

    /// Output and storage settings
    pub output: OutputConfig,

    /// Performance and resource settings
    pub performance: PerformanceConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// YouTube Data API key
    pub api_key: Option<String>,

    /// Base URL of the Data API
    pub base_url: String,

    /// Channel names or channel ids to harvest
    pub channels: Vec<String>,

    /// Stop paging a channel once this many videos are listed
    pub max_results: usize,

    /// Items requested per playlist page (the API caps this at 50)
    pub page_size: u32,

    /// Timeout for Data API requests (seconds)
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Preferred caption languages, in priority order
    pub languages: Vec<String>,

    /// Languages tried once when none of the preferred ones exist.
    /// Empty means the preferred request is repeated as-is.
    pub fallback_languages: Vec<String>,

    /// Upper bound for one fetch-and-save (seconds)
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Base output directory, one subdirectory per channel
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Maximum number of transcript fetches in flight per channel
    pub max_concurrent_fetches: usize,
}

const CONFIG_PATHS: [&str; 2] = [
    "transcript-harvester.toml",
    "config/transcript-harvester.toml",
];

impl Config {
    /// Load configuration from the first config file found, then overlay the environment
    pub fn load() -> Result<Self> {
        for path in &CONFIG_PATHS {
            if Path::new(path).exists() {
                match Self::load_from(path) {
                    Ok(config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        Self::from_env()
    }

    /// Load configuration from a specific file, then overlay the environment
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_str = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&config_str).map_err(|e| {
            HarvestError::Configuration(format!("invalid config file {}: {}", path.display(), e))
        })?;
        config.apply_env();
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env();
        Ok(config)
    }

    /// Override settings with environment variables
    pub fn apply_env(&mut self) {
        self.apply_vars(env_value);
    }

    /// Override settings from `lookup`, which returns the value of a variable if set
    pub fn apply_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(api_key) = lookup("YOUTUBE_API_KEY") {
            self.api.api_key = Some(api_key);
        }

        if let Some(channels) = lookup("YOUTUBE_CHANNELS") {
            self.api.channels = split_list(&channels);
        }

        if let Some(output_dir) = lookup("HARVESTER_OUTPUT_DIR") {
            self.output.base_dir = PathBuf::from(output_dir);
        }

        if let Some(workers) = lookup("HARVESTER_WORKERS") {
            match workers.parse() {
                Ok(workers) => self.performance.max_concurrent_fetches = workers,
                Err(_) => tracing::warn!("Ignoring invalid HARVESTER_WORKERS value: {}", workers),
            }
        }

        if let Some(languages) = lookup("HARVESTER_LANGUAGES") {
            self.fetch.languages = split_list(&languages);
        }

        if let Some(languages) = lookup("HARVESTER_FALLBACK_LANGUAGES") {
            self.fetch.fallback_languages = split_list(&languages);
        }
    }

    /// Validate configuration. Any error here aborts before network activity.
    pub fn validate(&self) -> Result<()> {
        if self.api_key().is_none() {
            return Err(HarvestError::Configuration(
                "No API key provided. Please provide an API key via --api-key, the YOUTUBE_API_KEY environment variable or a .env file.".to_string(),
            ));
        }

        if self.api.channels.iter().all(|c| c.trim().is_empty()) {
            return Err(HarvestError::Configuration(
                "No channels provided. Please provide channel names or IDs via --channels, the YOUTUBE_CHANNELS environment variable or a .env file.".to_string(),
            ));
        }

        if self.performance.max_concurrent_fetches == 0 {
            return Err(HarvestError::Configuration(
                "max_concurrent_fetches must be greater than 0".to_string(),
            ));
        }

        if self.api.page_size == 0 || self.api.page_size > 50 {
            return Err(HarvestError::Configuration(
                "page_size must be between 1 and 50".to_string(),
            ));
        }

        if self.api.max_results == 0 {
            return Err(HarvestError::Configuration(
                "max_results must be greater than 0".to_string(),
            ));
        }

        if self.fetch.languages.is_empty() {
            return Err(HarvestError::Configuration(
                "at least one transcript language is required".to_string(),
            ));
        }

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }

    /// The API key, if one is set and not blank
    pub fn api_key(&self) -> Option<&str> {
        self.api
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Transcript Harvester Configuration:\n\
            - Channels: {}\n\
            - Output Directory: {}\n\
            - Workers: {}\n\
            - Languages: {}\n\
            - Fallback Languages: {}\n\
            - Max Results: {}",
            self.api.channels.join(", "),
            self.output.base_dir.display(),
            self.performance.max_concurrent_fetches,
            self.fetch.languages.join(", "),
            if self.fetch.fallback_languages.is_empty() {
                "(repeat preferred)".to_string()
            } else {
                self.fetch.fallback_languages.join(", ")
            },
            self.api.max_results,
        )
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://www.googleapis.com/youtube/v3".to_string(),
            channels: Vec::new(),
            max_results: 500_000,
            page_size: 50,
            request_timeout_seconds: 30,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            languages: vec!["en".to_string()],
            fallback_languages: Vec::new(),
            timeout_seconds: 120,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("data"),
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            // Fetches are network bound, so allow more than one per core
            max_concurrent_fetches: (num_cpus::get() * 4).min(32),
        }
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Load variables from a `.env` file in the working directory or its parents.
/// Variables already set in the environment win.
pub fn load_dotenv() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::debug!("📄 Loaded environment from: {}", path.display());
            Some(path)
        }
        Err(e) if e.not_found() => None,
        Err(e) => {
            tracing::warn!("Failed to read .env file: {}", e);
            None
        }
    }
}

/// Split a comma separated list, trimming entries and dropping blanks
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.api.api_key = Some(api_key.into());
        self
    }

    pub fn with_channels<I, S>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.api.channels = channels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api.base_url = url.into();
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.config.api.max_results = max_results;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.config.api.page_size = page_size;
        self
    }

    pub fn with_languages(mut self, languages: Vec<String>) -> Self {
        self.config.fetch.languages = languages;
        self
    }

    pub fn with_fallback_languages(mut self, languages: Vec<String>) -> Self {
        self.config.fetch.fallback_languages = languages;
        self
    }

    pub fn with_fetch_timeout(mut self, seconds: u64) -> Self {
        self.config.fetch.timeout_seconds = seconds;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output.base_dir = dir.into();
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.config.performance.max_concurrent_fetches = workers;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
