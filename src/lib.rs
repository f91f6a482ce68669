//! YouTube Transcript Harvester
//!
//! Lists every upload of a set of channels through the YouTube Data API and
//! saves each video's caption text to `<output>/<channel>/<date>_<title>.txt`,
//! skipping videos whose file already exists.

pub mod config;
pub mod error;
pub mod fetcher;
pub mod output;
pub mod processing;
pub mod transcript;
pub mod youtube;

// Re-export main types for easy access
pub use crate::config::{Config, ConfigBuilder};
pub use crate::error::{HarvestError, Result};
pub use crate::fetcher::{FetchOutcome, TranscriptFetcher};
pub use crate::processing::{ChannelReport, HarvestReport, Harvester};
pub use crate::transcript::{TranscriptError, TranscriptLine, TranscriptSource, YouTubeTranscriptSource};
pub use crate::youtube::{ChannelId, ChannelResolver, DataApiClient, VideoCatalog, VideoDescriptor, VideoEnumerator};
