use std::path::Path;
use std::sync::Arc;

use crate::client::{HttpYoutubeClient, YoutubeClient};
use crate::fetch::cookies::LinesReader;
use crate::fetch::VideoPageFetcher;
use crate::transcript::content::TranscriptContent;
use crate::transcript::{extract, validate_language_codes, TranscriptDirectory, TranscriptTrack, VideoId};
use crate::Result;

/// Single video transcript retrieval: fetch the watch page, extract the directory, resolve a
/// track and fetch its content
#[derive(Clone)]
pub struct TranscriptApi {
    client: Arc<dyn YoutubeClient>,
    fetcher: VideoPageFetcher,
}

impl TranscriptApi {
    pub fn new(client: Arc<dyn YoutubeClient>) -> Self {
        let fetcher = VideoPageFetcher::new(Arc::clone(&client));
        Self { client, fetcher }
    }

    /// Read cookie files through a custom reader
    pub fn with_lines_reader(client: Arc<dyn YoutubeClient>, lines_reader: Arc<dyn LinesReader>) -> Self {
        let fetcher = VideoPageFetcher::with_lines_reader(Arc::clone(&client), lines_reader);
        Self { client, fetcher }
    }

    pub fn client(&self) -> &Arc<dyn YoutubeClient> {
        &self.client
    }

    /// List the transcripts available for a video
    pub async fn list_transcripts(&self, video_id: &str) -> Result<TranscriptDirectory> {
        let video_id = VideoId::parse(video_id)?;
        tracing::debug!("Listing transcripts for {}", video_id);

        let page = self.fetcher.fetch(&video_id, None).await?;
        extract::extract(&page, video_id.as_str())
    }

    /// List the transcripts of a video using the cookies of a Netscape cookie file
    pub async fn list_transcripts_with_cookies(
        &self,
        video_id: &str,
        cookies_path: &Path,
    ) -> Result<TranscriptDirectory> {
        let video_id = VideoId::parse(video_id)?;
        tracing::debug!("Listing transcripts for {} with cookies from {}", video_id, cookies_path.display());

        let page = self.fetcher.fetch_with_cookie_file(&video_id, cookies_path).await?;
        extract::extract(&page, video_id.as_str())
    }

    /// Fetch the content of the first available transcript in the requested languages
    pub async fn get_transcript(&self, video_id: &str, language_codes: &[&str]) -> Result<TranscriptContent> {
        validate_language_codes(language_codes)?;
        let directory = self.list_transcripts(video_id).await?;
        self.resolve_and_fetch(&directory, language_codes).await
    }

    pub async fn get_transcript_with_cookies(
        &self,
        video_id: &str,
        cookies_path: &Path,
        language_codes: &[&str],
    ) -> Result<TranscriptContent> {
        validate_language_codes(language_codes)?;
        let directory = self.list_transcripts_with_cookies(video_id, cookies_path).await?;
        self.resolve_and_fetch(&directory, language_codes).await
    }

    /// Download and clean the content of a track
    pub async fn fetch(&self, track: &TranscriptTrack) -> Result<TranscriptContent> {
        track.fetch(self.client.as_ref()).await
    }

    async fn resolve_and_fetch(
        &self,
        directory: &TranscriptDirectory,
        language_codes: &[&str],
    ) -> Result<TranscriptContent> {
        let track = directory.find_transcript(language_codes)?;
        tracing::debug!(
            "Fetching {} transcript '{}' for {}",
            if track.is_generated() { "generated" } else { "manual" },
            track.language_code(),
            directory.video_id()
        );

        self.fetch(&track).await
    }
}

impl Default for TranscriptApi {
    fn default() -> Self {
        Self::new(Arc::new(HttpYoutubeClient::new()))
    }
}
