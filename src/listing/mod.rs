use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;

use crate::client::{ApiEndpoint, Params, YoutubeClient};
use crate::{ErrorKind, RetrievalError, Result};

/// Page size requested from the playlist items endpoint
pub const MAX_RESULTS: u32 = 50;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistPage {
    items: Vec<PlaylistItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    snippet: PlaylistSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistSnippet {
    resource_id: ResourceId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    video_id: String,
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    id: Option<SearchItemId>,
    snippet: SearchSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    channel_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchSnippet {
    title: String,
    channel_id: Option<String>,
}

impl SearchItem {
    fn channel_id(self) -> Option<String> {
        self.snippet
            .channel_id
            .or_else(|| self.id.and_then(|id| id.channel_id))
    }
}

#[derive(Debug, Deserialize)]
struct ChannelsPage {
    items: Vec<ChannelItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelItem {
    content_details: ChannelContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelContentDetails {
    related_playlists: RelatedPlaylists,
}

#[derive(Debug, Deserialize)]
struct RelatedPlaylists {
    uploads: String,
}

/// Enumerates video ids through the YouTube Data API v3
#[derive(Clone)]
pub struct ListingPaginator {
    client: Arc<dyn YoutubeClient>,
}

impl ListingPaginator {
    pub fn new(client: Arc<dyn YoutubeClient>) -> Self {
        Self { client }
    }

    /// Every video id of a playlist, in page order.
    ///
    /// Pages are requested one after another until a response carries no `nextPageToken`.
    pub async fn video_ids(&self, playlist_id: &str, api_key: &str) -> Result<Vec<String>> {
        let mut video_ids = Vec::new();
        let mut page_token: Option<String> = None;
        let mut page = 0;

        loop {
            page += 1;

            let mut params = Params::new();
            params.insert("key".to_string(), api_key.to_string());
            params.insert("playlistId".to_string(), playlist_id.to_string());
            params.insert("part".to_string(), "snippet".to_string());
            params.insert("maxResults".to_string(), MAX_RESULTS.to_string());
            if let Some(token) = page_token.take() {
                params.insert("pageToken".to_string(), token);
            }

            let body = self.client.get_api(ApiEndpoint::PlaylistItems, &params).await?;
            let parsed: PlaylistPage = parse(&body, || ErrorKind::PlaylistParse {
                playlist_id: playlist_id.to_string(),
                page,
            })?;

            tracing::debug!(
                "Playlist {} page {} returned {} videos",
                playlist_id,
                page,
                parsed.items.len()
            );

            video_ids.extend(parsed.items.into_iter().map(|item| item.snippet.resource_id.video_id));

            match parsed.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        tracing::info!("Found {} videos in playlist {}", video_ids.len(), playlist_id);
        Ok(video_ids)
    }

    /// Resolve a channel name to its id, the first search result titled exactly `name` wins
    pub async fn channel_id(&self, channel_name: &str, api_key: &str) -> Result<String> {
        let mut params = Params::new();
        params.insert("key".to_string(), api_key.to_string());
        params.insert("q".to_string(), channel_name.to_string());
        params.insert("part".to_string(), "snippet".to_string());
        params.insert("type".to_string(), "channel".to_string());

        let body = self.client.get_api(ApiEndpoint::Search, &params).await?;
        let parsed: SearchPage = parse(&body, || ErrorKind::ChannelSearchParse(channel_name.to_string()))?;

        let item = parsed
            .items
            .into_iter()
            .find(|item| item.snippet.title == channel_name)
            .ok_or_else(|| ErrorKind::ChannelNotFound(channel_name.to_string()))?;

        item.channel_id()
            .ok_or_else(|| ErrorKind::ChannelSearchParse(channel_name.to_string()).into())
    }

    /// Id of the uploads playlist of a channel
    pub async fn uploads_playlist_id(&self, channel_id: &str, api_key: &str) -> Result<String> {
        let mut params = Params::new();
        params.insert("key".to_string(), api_key.to_string());
        params.insert("part".to_string(), "contentDetails".to_string());
        params.insert("id".to_string(), channel_id.to_string());

        let body = self.client.get_api(ApiEndpoint::Channels, &params).await?;
        let parsed: ChannelsPage = parse(&body, || ErrorKind::ChannelDetailsParse(channel_id.to_string()))?;

        parsed
            .items
            .into_iter()
            .next()
            .map(|item| item.content_details.related_playlists.uploads)
            .ok_or_else(|| ErrorKind::ChannelDetailsParse(channel_id.to_string()).into())
    }

    /// Every uploaded video id of a channel looked up by name
    pub async fn channel_video_ids(&self, channel_name: &str, api_key: &str) -> Result<Vec<String>> {
        let channel_id = self.channel_id(channel_name, api_key).await?;
        tracing::debug!("Channel '{}' resolved to {}", channel_name, channel_id);

        let uploads = self.uploads_playlist_id(&channel_id, api_key).await?;
        self.video_ids(&uploads, api_key).await
    }
}

fn parse<T: DeserializeOwned>(body: &str, kind: impl FnOnce() -> ErrorKind) -> Result<T> {
    serde_json::from_str(body).map_err(|e| RetrievalError::new(kind()).with_source(e).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockYoutubeClient;
    use mockall::predicate::eq;
    use mockall::Sequence;
    use std::sync::Mutex;

    fn playlist_page(ids: &[&str], next_page_token: Option<&str>) -> String {
        let items: Vec<_> = ids
            .iter()
            .map(|id| serde_json::json!({"snippet": {"title": "video", "resourceId": {"kind": "youtube#video", "videoId": id}}}))
            .collect();
        let mut page = serde_json::json!({"kind": "youtube#playlistItemListResponse", "items": items});
        if let Some(token) = next_page_token {
            page["nextPageToken"] = token.into();
        }
        page.to_string()
    }

    #[tokio::test]
    async fn test_video_ids_follows_page_tokens() {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);
        let mut client = MockYoutubeClient::new();
        client
            .expect_get_api()
            .with(eq(ApiEndpoint::PlaylistItems), mockall::predicate::always())
            .times(2)
            .returning(move |_, params| {
                recorded.lock().unwrap().push(params.clone());
                if params.contains_key("pageToken") {
                    Ok(playlist_page(&["ccccccccccc"], None))
                } else {
                    Ok(playlist_page(&["aaaaaaaaaaa", "bbbbbbbbbbb"], Some("CDIQAA")))
                }
            });

        let paginator = ListingPaginator::new(Arc::new(client));
        let ids = paginator.video_ids("PL123", "key").await.unwrap();

        assert_eq!(ids, vec!["aaaaaaaaaaa", "bbbbbbbbbbb", "ccccccccccc"]);

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].get("key").map(String::as_str), Some("key"));
        assert_eq!(requests[0].get("playlistId").map(String::as_str), Some("PL123"));
        assert_eq!(requests[0].get("part").map(String::as_str), Some("snippet"));
        assert_eq!(requests[0].get("maxResults").map(String::as_str), Some("50"));
        assert!(!requests[0].contains_key("pageToken"));
        assert_eq!(requests[1].get("pageToken").map(String::as_str), Some("CDIQAA"));
    }

    #[tokio::test]
    async fn test_malformed_page_fails_whole_enumeration() {
        let mut sequence = Sequence::new();
        let mut client = MockYoutubeClient::new();
        client
            .expect_get_api()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_, _| Ok(playlist_page(&["aaaaaaaaaaa"], Some("NEXT"))));
        client
            .expect_get_api()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_, _| Ok(r#"{"items":[{"snippet":{}}]}"#.to_string()));

        let paginator = ListingPaginator::new(Arc::new(client));
        let err = paginator.video_ids("PL123", "key").await.unwrap_err();

        assert_eq!(
            err.kind(),
            Some(&ErrorKind::PlaylistParse {
                playlist_id: "PL123".to_string(),
                page: 2
            })
        );
        assert!(err.video_id().is_none());
    }

    #[tokio::test]
    async fn test_http_errors_propagate() {
        let mut client = MockYoutubeClient::new();
        client
            .expect_get_api()
            .returning(|_, _| Err(ErrorKind::HttpStatus(403).into()));

        let paginator = ListingPaginator::new(Arc::new(client));
        let err = paginator.video_ids("PL123", "bad-key").await.unwrap_err();

        assert_eq!(err.kind(), Some(&ErrorKind::HttpStatus(403)));
    }

    #[tokio::test]
    async fn test_channel_videos_resolve_through_search_and_details() {
        let mut client = MockYoutubeClient::new();
        client
            .expect_get_api()
            .with(eq(ApiEndpoint::Search), mockall::predicate::always())
            .times(1)
            .returning(|_, params| {
                assert_eq!(params.get("q").map(String::as_str), Some("Some Channel"));
                assert_eq!(params.get("type").map(String::as_str), Some("channel"));
                assert_eq!(params.get("part").map(String::as_str), Some("snippet"));
                Ok(r#"{"items":[
                    {"id":{"kind":"youtube#channel","channelId":"UCother"},"snippet":{"title":"Some Channel Fans","channelId":"UCother"}},
                    {"id":{"kind":"youtube#channel","channelId":"UCsome"},"snippet":{"title":"Some Channel","channelId":"UCsome"}}
                ]}"#
                .to_string())
            });
        client
            .expect_get_api()
            .with(eq(ApiEndpoint::Channels), mockall::predicate::always())
            .times(1)
            .returning(|_, params| {
                assert_eq!(params.get("id").map(String::as_str), Some("UCsome"));
                assert_eq!(params.get("part").map(String::as_str), Some("contentDetails"));
                Ok(r#"{"items":[{"contentDetails":{"relatedPlaylists":{"likes":"","uploads":"UUsome"}}}]}"#.to_string())
            });
        client
            .expect_get_api()
            .with(eq(ApiEndpoint::PlaylistItems), mockall::predicate::always())
            .times(1)
            .returning(|_, params| {
                assert_eq!(params.get("playlistId").map(String::as_str), Some("UUsome"));
                Ok(playlist_page(&["aaaaaaaaaaa"], None))
            });

        let paginator = ListingPaginator::new(Arc::new(client));
        let ids = paginator.channel_video_ids("Some Channel", "key").await.unwrap();

        assert_eq!(ids, vec!["aaaaaaaaaaa"]);
    }

    #[tokio::test]
    async fn test_channel_id_falls_back_to_item_id() {
        let mut client = MockYoutubeClient::new();
        client.expect_get_api().times(1).returning(|_, _| {
            Ok(r#"{"items":[{"id":{"kind":"youtube#channel","channelId":"UCfromid"},"snippet":{"title":"Some Channel"}}]}"#
                .to_string())
        });

        let paginator = ListingPaginator::new(Arc::new(client));
        let channel_id = paginator.channel_id("Some Channel", "key").await.unwrap();

        assert_eq!(channel_id, "UCfromid");
    }

    #[tokio::test]
    async fn test_channel_without_exact_title_is_not_found() {
        let mut client = MockYoutubeClient::new();
        client.expect_get_api().times(1).returning(|_, _| {
            Ok(r#"{"items":[{"snippet":{"title":"some channel","channelId":"UCsome"}}]}"#.to_string())
        });

        let paginator = ListingPaginator::new(Arc::new(client));
        let err = paginator.channel_id("Some Channel", "key").await.unwrap_err();

        assert_eq!(err.kind(), Some(&ErrorKind::ChannelNotFound("Some Channel".to_string())));
    }

    #[tokio::test]
    async fn test_malformed_search_and_details_are_classified() {
        let mut client = MockYoutubeClient::new();
        client
            .expect_get_api()
            .with(eq(ApiEndpoint::Search), mockall::predicate::always())
            .returning(|_, _| Ok("not json".to_string()));
        client
            .expect_get_api()
            .with(eq(ApiEndpoint::Channels), mockall::predicate::always())
            .returning(|_, _| Ok(r#"{"items":[]}"#.to_string()));

        let paginator = ListingPaginator::new(Arc::new(client));

        let err = paginator.channel_id("Some Channel", "key").await.unwrap_err();
        assert_eq!(err.kind(), Some(&ErrorKind::ChannelSearchParse("Some Channel".to_string())));

        let err = paginator.uploads_playlist_id("UCsome", "key").await.unwrap_err();
        assert_eq!(err.kind(), Some(&ErrorKind::ChannelDetailsParse("UCsome".to_string())));
    }
}
