/// Channel name to channel id resolution
use super::{ChannelId, VideoCatalog};
use crate::error::Result;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::debug;

static CHANNEL_ID: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^UC[0-9A-Za-z_-]{22}$").ok());

/// Maps human-readable channel names to stable channel ids
#[derive(Clone)]
pub struct ChannelResolver {
    catalog: Arc<dyn VideoCatalog>,
}

impl ChannelResolver {
    pub fn new(catalog: Arc<dyn VideoCatalog>) -> Self {
        Self { catalog }
    }

    /// Resolve a channel name with a single best-match search.
    /// Inputs that are already channel ids are passed through without a request.
    pub async fn resolve(&self, channel_name: &str) -> Result<Option<ChannelId>> {
        let channel_name = channel_name.trim();

        if looks_like_channel_id(channel_name) {
            debug!("Treating {} as a channel id", channel_name);
            return Ok(Some(ChannelId::new(channel_name)));
        }

        let channel_id = self.catalog.search_channel(channel_name).await?;
        debug!("Search for {} resolved to {:?}", channel_name, channel_id);
        Ok(channel_id)
    }
}

/// Channel ids are "UC" followed by 22 URL-safe base64 characters
pub fn looks_like_channel_id(input: &str) -> bool {
    CHANNEL_ID.as_ref().is_some_and(|re| re.is_match(input))
}
