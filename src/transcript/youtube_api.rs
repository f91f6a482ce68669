/// Caption retrieval through `yt-transcript-rs`
use super::{TranscriptError, TranscriptLine, TranscriptSource};
use async_trait::async_trait;
use tracing::debug;
use yt_transcript_rs::api::YouTubeTranscriptApi;
use yt_transcript_rs::errors::{CouldNotRetrieveTranscript, CouldNotRetrieveTranscriptReason};

/// Transcript source backed by YouTube's innertube caption endpoints
pub struct YouTubeTranscriptSource {
    api: YouTubeTranscriptApi,
}

impl YouTubeTranscriptSource {
    pub fn new() -> Result<Self, TranscriptError> {
        let api = YouTubeTranscriptApi::new(None, None, None)
            .map_err(|e| TranscriptError::Request(format!("cannot create transcript client: {}", e)))?;
        Ok(Self { api })
    }
}

#[async_trait]
impl TranscriptSource for YouTubeTranscriptSource {
    async fn fetch(&self, video_id: &str, languages: &[String]) -> Result<Vec<TranscriptLine>, TranscriptError> {
        let codes: Vec<&str> = languages.iter().map(String::as_str).collect();
        debug!("Requesting transcript for {} in {:?}", video_id, codes);

        let transcript = self
            .api
            .fetch_transcript(video_id, &codes, false)
            .await
            .map_err(|e| classify(video_id, languages, e))?;

        Ok(transcript
            .snippets
            .into_iter()
            .map(|snippet| TranscriptLine::new(snippet.text, snippet.start, snippet.duration))
            .collect())
    }
}

/// Map the crate's failure reasons onto [`TranscriptError`]
pub fn classify(video_id: &str, languages: &[String], err: CouldNotRetrieveTranscript) -> TranscriptError {
    match &err.reason {
        Some(CouldNotRetrieveTranscriptReason::TranscriptsDisabled { .. }) => {
            TranscriptError::Disabled(video_id.to_string())
        }
        Some(CouldNotRetrieveTranscriptReason::NoTranscriptFound { .. }) => TranscriptError::NotFound {
            video_id: video_id.to_string(),
            requested: languages.to_vec(),
            available: Vec::new(),
        },
        Some(CouldNotRetrieveTranscriptReason::VideoUnavailable { .. })
        | Some(CouldNotRetrieveTranscriptReason::VideoUnplayable { .. }) => TranscriptError::VideoUnavailable {
            video_id: video_id.to_string(),
            reason: err.to_string(),
        },
        Some(CouldNotRetrieveTranscriptReason::IpBlocked { .. })
        | Some(CouldNotRetrieveTranscriptReason::RequestBlocked { .. }) => {
            TranscriptError::TooManyRequests(video_id.to_string())
        }
        _ => TranscriptError::Request(err.to_string()),
    }
}
