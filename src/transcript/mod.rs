/// Caption track retrieval
///
/// Providers implement [`TranscriptSource`] and report typed failures so the
/// fetcher can tell "disabled" and "not found" apart from transport errors.

pub mod youtube_api;

pub use youtube_api::YouTubeTranscriptSource;

use async_trait::async_trait;

/// One timed caption segment
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptLine {
    pub text: String,
    /// Offset from the start of the video, in seconds
    pub start: f64,
    /// Segment length in seconds
    pub duration: f64,
}

impl TranscriptLine {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }
}

/// Failures reported by a transcript provider
#[derive(thiserror::Error, Debug)]
pub enum TranscriptError {
    #[error("Transcripts are disabled for video {0}")]
    Disabled(String),

    #[error("No transcript for video {video_id} in {requested:?} (available: {available:?})")]
    NotFound {
        video_id: String,
        requested: Vec<String>,
        available: Vec<String>,
    },

    #[error("Video {video_id} is unavailable: {reason}")]
    VideoUnavailable { video_id: String, reason: String },

    #[error("Too many requests, YouTube is asking for a captcha (video {0})")]
    TooManyRequests(String),

    #[error("Transcript request failed: {0}")]
    Request(String),

    #[error("Failed to parse transcript data: {0}")]
    Parse(String),
}

/// Source of caption text for a video
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the transcript of `video_id` in the first available language of `languages`
    async fn fetch(&self, video_id: &str, languages: &[String]) -> Result<Vec<TranscriptLine>, TranscriptError>;
}

/// Concatenate line texts with single spaces, dropping timing information
pub fn join_lines(lines: &[TranscriptLine]) -> String {
    lines
        .iter()
        .map(|line| line.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
