use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use std::sync::Arc;

pub mod cookies;

use crate::client::{Headers, YoutubeClient};
use crate::transcript::VideoId;
use crate::{ErrorKind, RetrievalError, Result, TranscriptError};
use cookies::{FsLinesReader, LinesReader};

const CONSENT_FORM_MARKER: &str = "action=\"https://consent.youtube.com/s\"";

static CONSENT_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"name="v" value="(.*?)""#).expect("valid consent pattern"));

/// Fetches watch pages, getting past the cookie consent interstitial
#[derive(Clone)]
pub struct VideoPageFetcher {
    client: Arc<dyn YoutubeClient>,
    lines_reader: Arc<dyn LinesReader>,
}

impl VideoPageFetcher {
    pub fn new(client: Arc<dyn YoutubeClient>) -> Self {
        Self::with_lines_reader(client, Arc::new(FsLinesReader))
    }

    pub fn with_lines_reader(client: Arc<dyn YoutubeClient>, lines_reader: Arc<dyn LinesReader>) -> Self {
        Self {
            client,
            lines_reader,
        }
    }

    /// Fetch the watch page, retrying once with a consent cookie when the consent form comes back
    pub async fn fetch(&self, video_id: &VideoId, cookie_header: Option<&str>) -> Result<String> {
        let page = self.fetch_page(video_id, cookie_header).await?;

        if !contains_consent_form(&page) {
            return Ok(page);
        }

        tracing::debug!("Consent page returned for {}, retrying with consent cookie", video_id);

        let consent = consent_cookie(&page).ok_or_else(|| consent_failed(video_id))?;
        let cookie = match cookie_header {
            Some(existing) if !existing.trim().is_empty() => format!("{}; {}", existing, consent),
            _ => consent,
        };

        let page = self.fetch_page(video_id, Some(&cookie)).await?;
        if contains_consent_form(&page) {
            return Err(consent_failed(video_id));
        }

        Ok(page)
    }

    /// Fetch the watch page with the cookies of a Netscape cookie file
    pub async fn fetch_with_cookie_file(&self, video_id: &VideoId, cookies_path: &Path) -> Result<String> {
        let cookie_header = self.load_cookie_header(video_id, cookies_path)?;
        self.fetch(video_id, Some(&cookie_header)).await
    }

    fn load_cookie_header(&self, video_id: &VideoId, cookies_path: &Path) -> Result<String> {
        let lines = self.lines_reader.read_lines(cookies_path).map_err(|e| {
            TranscriptError::from(
                RetrievalError::new(ErrorKind::CookieFile(cookies_path.to_path_buf()))
                    .with_source(e)
                    .for_video(video_id.as_str()),
            )
        })?;

        let cookies = cookies::parse_cookies(&lines);
        tracing::debug!("Loaded {} cookies from {}", cookies.len(), cookies_path.display());

        Ok(cookies::cookie_header(&cookies))
    }

    async fn fetch_page(&self, video_id: &VideoId, cookie_header: Option<&str>) -> Result<String> {
        let mut headers = Headers::new();
        headers.insert("Accept-Language".to_string(), "en-US".to_string());
        if let Some(cookie) = cookie_header {
            headers.insert("Cookie".to_string(), cookie.to_string());
        }

        self.client
            .get(&video_id.watch_url(), &headers)
            .await
            .map_err(|e| e.for_video(video_id.as_str()))
    }
}

fn contains_consent_form(page: &str) -> bool {
    page.contains(CONSENT_FORM_MARKER)
}

/// `CONSENT=YES+<v>` built from the hidden `v` input of the consent form
fn consent_cookie(page: &str) -> Option<String> {
    CONSENT_VALUE
        .captures(page)
        .and_then(|captures| captures.get(1))
        .map(|value| format!("CONSENT=YES+{}", value.as_str()))
}

fn consent_failed(video_id: &VideoId) -> TranscriptError {
    TranscriptError::from(ErrorKind::ConsentFailed).for_video(video_id.as_str())
}
