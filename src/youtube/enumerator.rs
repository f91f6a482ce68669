/// Uploads playlist enumeration
use super::{ChannelId, VideoCatalog, VideoDescriptor};
use crate::error::Result;
use std::sync::Arc;
use tracing::{debug, info};

/// Default cap on videos listed per channel
pub const DEFAULT_MAX_RESULTS: usize = 500_000;

/// Largest page the playlistItems endpoint serves
pub const MAX_PAGE_SIZE: u32 = 50;

/// Pages through a channel's uploads playlist
#[derive(Clone)]
pub struct VideoEnumerator {
    catalog: Arc<dyn VideoCatalog>,
    page_size: u32,
}

impl VideoEnumerator {
    pub fn new(catalog: Arc<dyn VideoCatalog>, page_size: u32) -> Self {
        Self {
            catalog,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// List the channel's uploads in playlist order.
    ///
    /// Stops when the API returns no continuation token or once at least
    /// `max_results` videos have been collected. The last page is kept whole,
    /// so the result may exceed `max_results` by less than one page. Any
    /// request failure fails the whole listing.
    pub async fn list_uploads(&self, channel_id: &ChannelId, max_results: usize) -> Result<Vec<VideoDescriptor>> {
        let uploads_playlist = self.catalog.uploads_playlist(channel_id).await?;
        debug!("Uploads playlist for {}: {}", channel_id, uploads_playlist);

        let mut videos = Vec::new();
        let mut next_page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self
                .catalog
                .playlist_page(&uploads_playlist, self.page_size, next_page_token.as_deref())
                .await?;
            pages += 1;

            videos.extend(
                page.items
                    .into_iter()
                    .map(|item| VideoDescriptor::new(item.video_id, item.title, item.published_at)),
            );

            next_page_token = page.next_page_token;
            if next_page_token.is_none() || videos.len() >= max_results {
                break;
            }
        }

        info!("📹 Listed {} videos for channel {} ({} pages)", videos.len(), channel_id, pages);
        Ok(videos)
    }
}
