use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{HarvestError, Result};
use crate::fetcher::{FetchOutcome, TranscriptFetcher};
use crate::output::ensure_channel_dir;
use crate::transcript::{TranscriptSource, YouTubeTranscriptSource};
use crate::youtube::{ChannelId, ChannelResolver, DataApiClient, VideoCatalog, VideoDescriptor, VideoEnumerator};

/// Outcome counts for one channel
#[derive(Debug, Clone, Default)]
pub struct ChannelReport {
    pub name: String,
    pub channel_id: Option<ChannelId>,
    pub videos: usize,
    pub saved: usize,
    pub already_present: usize,
    pub disabled: usize,
    pub not_found: usize,
    pub failed: usize,
    /// Set when the channel was skipped before any video was fetched
    pub error: Option<String>,
}

impl ChannelReport {
    fn new(name: &str, channel_id: Option<ChannelId>) -> Self {
        Self {
            name: name.to_string(),
            channel_id,
            ..Self::default()
        }
    }

    fn record(&mut self, outcome: &FetchOutcome) {
        match outcome {
            FetchOutcome::Saved(_) => self.saved += 1,
            FetchOutcome::AlreadyPresent(_) => self.already_present += 1,
            FetchOutcome::Disabled => self.disabled += 1,
            FetchOutcome::NotFound => self.not_found += 1,
            FetchOutcome::Failed(_) => self.failed += 1,
        }
    }
}

/// Overall harvest results, logged at the end of a run
#[derive(Debug, Clone)]
pub struct HarvestReport {
    pub started_at: DateTime<Utc>,
    pub total_time: Duration,
    pub channels: Vec<ChannelReport>,
    /// Channel names that did not resolve to a channel id
    pub unresolved: Vec<String>,
}

impl HarvestReport {
    pub fn total_videos(&self) -> usize {
        self.channels.iter().map(|c| c.videos).sum()
    }

    pub fn total_saved(&self) -> usize {
        self.channels.iter().map(|c| c.saved).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.channels
            .iter()
            .map(|c| c.already_present + c.disabled + c.not_found)
            .sum()
    }

    pub fn total_failed(&self) -> usize {
        self.channels.iter().map(|c| c.failed).sum()
    }
}

/// A channel request that resolved to an id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedChannel {
    pub name: String,
    pub id: ChannelId,
}

/// Drives a harvest: resolve channels, then enumerate and fetch one channel at a time.
///
/// Videos of a channel are fetched concurrently, bounded by a semaphore the
/// harvester owns. A channel's batch completes before the next channel starts.
pub struct Harvester {
    config: Config,
    resolver: ChannelResolver,
    enumerator: VideoEnumerator,
    fetcher: TranscriptFetcher,
    worker_semaphore: Arc<Semaphore>,
    max_concurrent: usize,
}

impl Harvester {
    pub fn new(config: Config, catalog: Arc<dyn VideoCatalog>, source: Arc<dyn TranscriptSource>) -> Self {
        let max_concurrent = config.performance.max_concurrent_fetches.max(1);
        info!("🔧 Initializing Harvester with {} workers", max_concurrent);

        Self {
            resolver: ChannelResolver::new(catalog.clone()),
            enumerator: VideoEnumerator::new(catalog, config.api.page_size),
            fetcher: TranscriptFetcher::new(source, &config.fetch),
            worker_semaphore: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
            config,
        }
    }

    /// Validate the configuration and wire up the YouTube-backed collaborators
    pub fn from_config(config: Config) -> Result<Self> {
        config.validate()?;
        let api_key = config
            .api_key()
            .ok_or_else(|| HarvestError::Configuration("No API key provided".to_string()))?
            .to_string();

        let catalog = Arc::new(DataApiClient::new(&config.api, api_key)?);
        let source = Arc::new(
            YouTubeTranscriptSource::new()
                .map_err(|e| HarvestError::Configuration(format!("cannot build HTTP client: {}", e)))?,
        );

        Ok(Self::new(config, catalog, source))
    }

    /// Harvest every channel in `channel_names`, in order
    pub async fn run(&self, channel_names: &[String]) -> HarvestReport {
        let started_at = Utc::now();
        let start_time = Instant::now();

        info!("🚀 Starting transcript harvest for {} channels", channel_names.len());
        info!("📂 Output: {}", self.config.output.base_dir.display());

        let (resolved, unresolved) = self.resolve_channels(channel_names).await;

        let mut channels = Vec::with_capacity(resolved.len());
        for channel in &resolved {
            channels.push(self.harvest_channel(channel).await);
        }

        HarvestReport {
            started_at,
            total_time: start_time.elapsed(),
            channels,
            unresolved,
        }
    }

    /// Resolve names to ids, dropping names that do not resolve.
    /// Names that resolve to an id already seen are harvested once.
    pub async fn resolve_channels(&self, channel_names: &[String]) -> (Vec<ResolvedChannel>, Vec<String>) {
        let mut resolved = Vec::new();
        let mut unresolved = Vec::new();
        let mut seen = HashSet::new();

        for name in channel_names {
            match self.resolver.resolve(name).await {
                Ok(Some(id)) => {
                    if seen.insert(id.clone()) {
                        info!("🔍 Resolved channel {} -> {}", name, id);
                        resolved.push(ResolvedChannel { name: name.clone(), id });
                    } else {
                        warn!("Channel {} resolves to already requested id {}, skipping", name, id);
                    }
                }
                Ok(None) => {
                    warn!("⚠️ No channel found for {}, skipping", name);
                    unresolved.push(name.clone());
                }
                Err(e) => {
                    error!("Failed to resolve channel {}: {}", name, e);
                    unresolved.push(name.clone());
                }
            }
        }

        (resolved, unresolved)
    }

    /// Enumerate one channel and fetch all its transcripts
    pub async fn harvest_channel(&self, channel: &ResolvedChannel) -> ChannelReport {
        let mut report = ChannelReport::new(&channel.name, Some(channel.id.clone()));
        info!("📺 Harvesting channel {} ({})", channel.name, channel.id);

        let videos = match self.enumerator.list_uploads(&channel.id, self.config.api.max_results).await {
            Ok(videos) => videos,
            Err(e) => {
                error!("Failed to list videos for channel {}: {}", channel.name, e);
                report.error = Some(e.to_string());
                return report;
            }
        };
        report.videos = videos.len();

        let dir = match ensure_channel_dir(&self.config.output.base_dir, &channel.name).await {
            Ok(dir) => dir,
            Err(e) => {
                error!("Cannot create output directory for channel {}: {}", channel.name, e);
                report.error = Some(e.to_string());
                return report;
            }
        };

        let outcomes = self.fetch_all(videos, &dir).await;
        for outcome in &outcomes {
            report.record(outcome);
        }
        // Tasks that died without reporting count as failures
        report.failed += report.videos.saturating_sub(outcomes.len());

        info!(
            "✅ Channel {} done: {} saved, {} already present, {} disabled, {} not found, {} failed",
            channel.name, report.saved, report.already_present, report.disabled, report.not_found, report.failed
        );
        report
    }

    /// Fetch videos in parallel with controlled concurrency and wait for all of them
    async fn fetch_all(&self, videos: Vec<VideoDescriptor>, dir: &Path) -> Vec<FetchOutcome> {
        let (tx, mut rx) = mpsc::channel(self.max_concurrent);
        let total_videos = videos.len();

        for (index, video) in videos.into_iter().enumerate() {
            let fetcher = self.fetcher.clone();
            let dir: PathBuf = dir.to_path_buf();
            let tx = tx.clone();
            let semaphore = Arc::clone(&self.worker_semaphore);

            tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return;
                };

                debug!("📹 Fetching video {}/{}: {}", index + 1, total_videos, video.id);
                let outcome = fetcher.fetch_and_save(&video, &dir).await;

                if let Err(e) = tx.send(outcome).await {
                    error!("Failed to send result: {}", e);
                }
            });
        }

        // Drop the original sender to close the channel when all tasks complete
        drop(tx);

        let mut outcomes = Vec::with_capacity(total_videos);
        while let Some(outcome) = rx.recv().await {
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Get harvester statistics
    pub fn get_stats(&self) -> HarvesterStats {
        HarvesterStats {
            max_workers: self.max_concurrent,
            available_permits: self.worker_semaphore.available_permits(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HarvesterStats {
    pub max_workers: usize,
    pub available_permits: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;
    use crate::transcript::{TranscriptError, TranscriptLine};
    use crate::youtube::{PlaylistItem, PlaylistPage};
    use async_trait::async_trait;
    use tempfile::TempDir;

    struct OneChannelCatalog;

    #[async_trait]
    impl VideoCatalog for OneChannelCatalog {
        async fn search_channel(&self, query: &str) -> Result<Option<ChannelId>> {
            Ok((query == "known").then(|| ChannelId::new("UCknown")))
        }

        async fn uploads_playlist(&self, _channel_id: &ChannelId) -> Result<String> {
            Ok("UUknown".to_string())
        }

        async fn playlist_page(&self, _: &str, _: u32, _: Option<&str>) -> Result<PlaylistPage> {
            Ok(PlaylistPage {
                items: vec![PlaylistItem {
                    video_id: "vid00000001".to_string(),
                    title: "Only Video".to_string(),
                    published_at: "2024-01-02T03:04:05Z".to_string(),
                }],
                next_page_token: None,
            })
        }
    }

    struct EchoSource;

    #[async_trait]
    impl TranscriptSource for EchoSource {
        async fn fetch(&self, video_id: &str, _: &[String]) -> std::result::Result<Vec<TranscriptLine>, TranscriptError> {
            Ok(vec![TranscriptLine::new(video_id, 0.0, 1.0)])
        }
    }

    fn harvester(output: &Path, workers: usize) -> Harvester {
        let config = ConfigBuilder::new()
            .with_api_key("key")
            .with_channels(["known"])
            .with_output_dir(output)
            .with_workers(workers)
            .build();
        Harvester::new(config, Arc::new(OneChannelCatalog), Arc::new(EchoSource))
    }

    #[tokio::test]
    async fn test_harvester_creation() {
        let temp_dir = TempDir::new().unwrap();
        let stats = harvester(temp_dir.path(), 4).get_stats();
        assert_eq!(stats.max_workers, 4);
        assert_eq!(stats.available_permits, 4);
    }

    #[tokio::test]
    async fn test_unresolved_channels_are_dropped() {
        let temp_dir = TempDir::new().unwrap();
        let harvester = harvester(temp_dir.path(), 2);

        let names = vec!["missing".to_string(), "known".to_string(), "known".to_string()];
        let (resolved, unresolved) = harvester.resolve_channels(&names).await;

        assert_eq!(
            resolved,
            vec![ResolvedChannel {
                name: "known".to_string(),
                id: ChannelId::new("UCknown")
            }]
        );
        assert_eq!(unresolved, vec!["missing".to_string()]);
    }

    #[tokio::test]
    async fn test_run_writes_into_channel_directory() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("data");
        let harvester = harvester(&output, 1);

        let report = harvester.run(&["known".to_string()]).await;

        let file = output.join("known").join("2024-01-02_Only_Video.txt");
        assert_eq!(std::fs::read_to_string(file).unwrap(), "vid00000001");
        assert_eq!(report.total_saved(), 1);
        assert_eq!(report.total_videos(), 1);
        assert_eq!(harvester.get_stats().available_permits, 1);
    }

    #[tokio::test]
    async fn test_from_config_rejects_missing_key() {
        let config = ConfigBuilder::new().with_channels(["known"]).build();
        let err = Harvester::from_config(config).err().unwrap();
        assert!(err.is_configuration());
    }
}
