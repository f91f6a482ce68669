use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::FetchConfig;
use crate::output::transcript_path;
use crate::transcript::{join_lines, TranscriptError, TranscriptLine, TranscriptSource};
use crate::youtube::VideoDescriptor;

/// What happened to one video
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Transcript written to the path
    Saved(PathBuf),
    /// A file with the target name already existed; nothing was fetched
    AlreadyPresent(PathBuf),
    /// The video has captions turned off
    Disabled,
    /// No track in the preferred or fallback languages
    NotFound,
    /// Transport, parse, write or timeout failure
    Failed(String),
}

/// Fetches a video's transcript and writes it next to its siblings.
///
/// `fetch_and_save` never returns an error: every failure is logged and
/// reported as a [`FetchOutcome`] so one bad video cannot abort the batch.
#[derive(Clone)]
pub struct TranscriptFetcher {
    source: Arc<dyn TranscriptSource>,
    languages: Vec<String>,
    fallback_languages: Vec<String>,
    timeout: Duration,
}

impl TranscriptFetcher {
    pub fn new(source: Arc<dyn TranscriptSource>, config: &FetchConfig) -> Self {
        Self {
            source,
            languages: config.languages.clone(),
            fallback_languages: config.fallback_languages.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetch the transcript of `video` and save it under `dir`, unless already saved
    pub async fn fetch_and_save(&self, video: &VideoDescriptor, dir: &Path) -> FetchOutcome {
        let path = transcript_path(dir, video);

        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            debug!("⏭️ Already saved: {}", path.display());
            return FetchOutcome::AlreadyPresent(path);
        }

        info!("🎬 Trying video: [{}]", path.display());

        let lines = match tokio::time::timeout(self.timeout, self.fetch_with_fallback(video)).await {
            Ok(Ok(lines)) => lines,
            Ok(Err(outcome)) => return outcome,
            Err(_) => {
                warn!(
                    "⏱️ Timed out after {:.0}s fetching transcript for {} ({})",
                    self.timeout.as_secs_f64(),
                    video.url,
                    video.title
                );
                return FetchOutcome::Failed(format!("timed out after {:?}", self.timeout));
            }
        };

        if let Err(e) = tokio::fs::write(&path, join_lines(&lines)).await {
            warn!("❌ Failed to write transcript for {} to {}: {}", video.url, path.display(), e);
            return FetchOutcome::Failed(e.to_string());
        }

        info!("✅ Successfully saved transcript for {} as {}", video.url, path.display());
        FetchOutcome::Saved(path)
    }

    async fn fetch_with_fallback(&self, video: &VideoDescriptor) -> Result<Vec<TranscriptLine>, FetchOutcome> {
        match self.source.fetch(&video.id, &self.languages).await {
            Ok(lines) => Ok(lines),
            Err(TranscriptError::Disabled(_)) => {
                info!("🚫 No transcripts available for {} with title {}", video.url, video.title);
                Err(FetchOutcome::Disabled)
            }
            Err(TranscriptError::NotFound { available, .. }) => {
                let fallback = self.fallback_languages();
                debug!(
                    "No transcript in {:?} for {} (available: {:?}), retrying with {:?}",
                    self.languages, video.id, available, fallback
                );

                self.source.fetch(&video.id, fallback).await.map_err(|e| {
                    warn!(
                        "❌ Error fetching fallback transcript for {} with title {}: {}",
                        video.url, video.title, e
                    );
                    match e {
                        TranscriptError::Disabled(_) => FetchOutcome::Disabled,
                        TranscriptError::NotFound { .. } => FetchOutcome::NotFound,
                        other => FetchOutcome::Failed(other.to_string()),
                    }
                })
            }
            Err(e) => {
                warn!("❌ Unknown error [{}] for {} ({})", e, video.title, video.url);
                Err(FetchOutcome::Failed(e.to_string()))
            }
        }
    }

    /// Languages for the single retry; the preferred list when none are configured
    fn fallback_languages(&self) -> &[String] {
        if self.fallback_languages.is_empty() {
            &self.languages
        } else {
            &self.fallback_languages
        }
    }
}
