/// YouTube Data API v3 client
use super::{ChannelId, PlaylistItem, PlaylistPage, VideoCatalog};
use crate::config::ApiConfig;
use crate::error::{HarvestError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

const SEARCH_FIELDS: &str = "items(id(channelId))";
const CHANNEL_FIELDS: &str = "items/contentDetails/relatedPlaylists/uploads";
const PLAYLIST_FIELDS: &str = "nextPageToken,items(snippet(publishedAt,resourceId(videoId),title))";

/// Data API client authenticated with a developer key
#[derive(Clone)]
pub struct DataApiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    channel_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChannelListResponse {
    #[serde(default)]
    items: Vec<ChannelItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelItem {
    content_details: ContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentDetails {
    related_playlists: RelatedPlaylists,
}

#[derive(Debug, Deserialize)]
struct RelatedPlaylists {
    uploads: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemListResponse {
    next_page_token: Option<String>,
    #[serde(default)]
    items: Vec<PlaylistItemResource>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItemResource {
    snippet: PlaylistSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistSnippet {
    published_at: String,
    title: String,
    resource_id: ResourceId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    video_id: String,
}

impl DataApiClient {
    pub fn new(config: &ApiConfig, api_key: impl Into<String>) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, resource: &str, params: &[(&str, &str)]) -> Result<T> {
        let endpoint = format!("{}/{}", self.base_url, resource);
        debug!("Sending Data API request to {}", endpoint);

        let response = self
            .client
            .get(&endpoint)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(HarvestError::Api { status, body });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl VideoCatalog for DataApiClient {
    async fn search_channel(&self, query: &str) -> Result<Option<ChannelId>> {
        let response: SearchResponse = self
            .get_json(
                "search",
                &[
                    ("part", "snippet"),
                    ("type", "channel"),
                    ("q", query),
                    ("maxResults", "1"),
                    ("fields", SEARCH_FIELDS),
                ],
            )
            .await?;

        Ok(response
            .items
            .into_iter()
            .next()
            .and_then(|item| item.id.channel_id)
            .map(ChannelId::new))
    }

    async fn uploads_playlist(&self, channel_id: &ChannelId) -> Result<String> {
        let response: ChannelListResponse = self
            .get_json(
                "channels",
                &[
                    ("part", "contentDetails"),
                    ("id", channel_id.as_str()),
                    ("fields", CHANNEL_FIELDS),
                ],
            )
            .await?;

        response
            .items
            .into_iter()
            .next()
            .and_then(|item| item.content_details.related_playlists.uploads)
            .ok_or_else(|| HarvestError::NoUploadsPlaylist(channel_id.to_string()))
    }

    async fn playlist_page(
        &self,
        playlist_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<PlaylistPage> {
        let page_size = page_size.to_string();
        let mut params = vec![
            ("part", "snippet"),
            ("playlistId", playlist_id),
            ("maxResults", page_size.as_str()),
            ("fields", PLAYLIST_FIELDS),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        let response: PlaylistItemListResponse = self.get_json("playlistItems", &params).await?;

        Ok(PlaylistPage {
            items: response
                .items
                .into_iter()
                .map(|item| PlaylistItem {
                    video_id: item.snippet.resource_id.video_id,
                    title: item.snippet.title,
                    published_at: item.snippet.published_at,
                })
                .collect(),
            next_page_token: response.next_page_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer) -> DataApiClient {
        let config = ApiConfig {
            base_url: server.base_url(),
            ..ApiConfig::default()
        };
        DataApiClient::new(&config, "test-key").unwrap()
    }

    #[tokio::test]
    async fn test_search_channel_returns_first_match() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/search")
                .query_param("type", "channel")
                .query_param("q", "Veritasium")
                .query_param("maxResults", "1")
                .query_param("key", "test-key");
            then.status(200).json_body(json!({
                "items": [{ "id": { "channelId": "UCHnyfMqiRRG1u-2MsSQLbXA" } }]
            }));
        });

        let channel = client_for(&server).search_channel("Veritasium").await.unwrap();

        mock.assert();
        assert_eq!(channel, Some(ChannelId::new("UCHnyfMqiRRG1u-2MsSQLbXA")));
    }

    #[tokio::test]
    async fn test_search_channel_without_results() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/search");
            then.status(200).json_body(json!({}));
        });

        let channel = client_for(&server).search_channel("nobody").await.unwrap();
        assert_eq!(channel, None);
    }

    #[tokio::test]
    async fn test_uploads_playlist_lookup() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/channels")
                .query_param("part", "contentDetails")
                .query_param("id", "UC123");
            then.status(200).json_body(json!({
                "items": [{ "contentDetails": { "relatedPlaylists": { "uploads": "UU123" } } }]
            }));
        });

        let playlist = client_for(&server)
            .uploads_playlist(&ChannelId::new("UC123"))
            .await
            .unwrap();

        mock.assert();
        assert_eq!(playlist, "UU123");
    }

    #[tokio::test]
    async fn test_unknown_channel_has_no_uploads_playlist() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/channels");
            then.status(200).json_body(json!({ "items": [] }));
        });

        let err = client_for(&server)
            .uploads_playlist(&ChannelId::new("UCmissing"))
            .await
            .unwrap_err();
        assert!(matches!(err, HarvestError::NoUploadsPlaylist(id) if id == "UCmissing"));
    }

    #[tokio::test]
    async fn test_playlist_page_maps_snippets() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/playlistItems")
                .query_param("playlistId", "UU123")
                .query_param("maxResults", "50")
                .query_param("pageToken", "CAUQAA");
            then.status(200).json_body(json!({
                "nextPageToken": "CAoQAA",
                "items": [
                    { "snippet": {
                        "publishedAt": "2023-04-05T12:00:00Z",
                        "title": "My Video",
                        "resourceId": { "videoId": "abc123def45" }
                    } },
                    { "snippet": {
                        "publishedAt": "2023-04-01T08:30:00Z",
                        "title": "Older",
                        "resourceId": { "videoId": "zyx987wvu65" }
                    } }
                ]
            }));
        });

        let page = client_for(&server)
            .playlist_page("UU123", 50, Some("CAUQAA"))
            .await
            .unwrap();

        mock.assert();
        assert_eq!(page.next_page_token.as_deref(), Some("CAoQAA"));
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].video_id, "abc123def45");
        assert_eq!(page.items[0].title, "My Video");
        assert_eq!(page.items[1].published_at, "2023-04-01T08:30:00Z");
    }

    #[tokio::test]
    async fn test_api_error_carries_status_and_body() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/search");
            then.status(403).body("quotaExceeded");
        });

        let err = client_for(&server).search_channel("any").await.unwrap_err();
        match err {
            HarvestError::Api { status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body, "quotaExceeded");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let config = ApiConfig {
            base_url: "not a url".to_string(),
            ..ApiConfig::default()
        };
        let result = DataApiClient::new(&config, "test-key");
        assert!(matches!(result, Err(HarvestError::Url(_))));
    }
}
