/// YouTube channel lookup and upload enumeration
///
/// The Data API is reached through the [`VideoCatalog`] trait so the
/// resolver and enumerator can run against an in-memory catalog in tests.

pub mod data_api;
pub mod enumerator;
pub mod resolver;

pub use data_api::DataApiClient;
pub use enumerator::VideoEnumerator;
pub use resolver::ChannelResolver;

use async_trait::async_trait;
use std::fmt;

use crate::error::Result;

/// Stable, opaque channel identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelId(String);

impl ChannelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A video listed in a channel's uploads playlist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoDescriptor {
    pub id: String,
    pub title: String,
    /// RFC 3339 publish timestamp as returned by the API
    pub published_at: String,
    pub url: String,
}

impl VideoDescriptor {
    pub fn new(id: impl Into<String>, title: impl Into<String>, published_at: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            url: watch_url(&id),
            id,
            title: title.into(),
            published_at: published_at.into(),
        }
    }
}

/// Public watch URL for a video id
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// One item of a playlist page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistItem {
    pub video_id: String,
    pub title: String,
    pub published_at: String,
}

/// One page of a playlist listing
#[derive(Debug, Clone, Default)]
pub struct PlaylistPage {
    pub items: Vec<PlaylistItem>,
    pub next_page_token: Option<String>,
}

/// The three Data API calls the harvester depends on
#[async_trait]
pub trait VideoCatalog: Send + Sync {
    /// Best channel match for a free-text query, if any
    async fn search_channel(&self, query: &str) -> Result<Option<ChannelId>>;

    /// Id of the channel's automatically maintained uploads playlist
    async fn uploads_playlist(&self, channel_id: &ChannelId) -> Result<String>;

    /// One page of a playlist; `page_token` is `None` for the first page
    async fn playlist_page(
        &self,
        playlist_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<PlaylistPage>;
}
