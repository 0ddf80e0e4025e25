use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::collections::BTreeMap;
use std::fmt;

#[cfg(test)]
use mockall::automock;

use crate::{ErrorKind, RetrievalError, Result};

/// Request headers, header name to value
pub type Headers = BTreeMap<String, String>;

/// Query parameters for the listing API, key to value
pub type Params = BTreeMap<String, String>;

/// Default root of the YouTube Data API v3
pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/";

/// Resources of the YouTube Data API v3 used for playlist and channel listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiEndpoint {
    PlaylistItems,
    Search,
    Channels,
}

impl ApiEndpoint {
    pub fn resource(&self) -> &'static str {
        match self {
            ApiEndpoint::PlaylistItems => "playlistItems",
            ApiEndpoint::Search => "search",
            ApiEndpoint::Channels => "channels",
        }
    }

    /// Full URL of the resource under the given API root
    pub fn url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.resource())
    }
}

impl fmt::Display for ApiEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resource())
    }
}

/// HTTP boundary used by every component that talks to YouTube
#[cfg_attr(test, automock)]
#[async_trait]
pub trait YoutubeClient: Send + Sync {
    /// GET an arbitrary URL with the given headers, returning the body of a 200 response
    async fn get(&self, url: &str, headers: &Headers) -> Result<String>;

    /// GET a listing API resource with the given query parameters
    async fn get_api(&self, endpoint: ApiEndpoint, params: &Params) -> Result<String>;
}

/// Encode query parameters, spaces become `%20`
pub fn encode_params(params: &Params) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// reqwest backed client
#[derive(Debug, Clone)]
pub struct HttpYoutubeClient {
    client: Client,
    api_base_url: String,
}

impl HttpYoutubeClient {
    pub fn new() -> Self {
        Self::with_api_base_url(DEFAULT_API_BASE_URL)
    }

    /// Client targeting a different listing API root (proxies, test servers)
    pub fn with_api_base_url(api_base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_base_url: api_base_url.into(),
        }
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }
}

impl Default for HttpYoutubeClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl YoutubeClient for HttpYoutubeClient {
    async fn get(&self, url: &str, headers: &Headers) -> Result<String> {
        tracing::debug!("GET {}", url);

        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| RetrievalError::new(ErrorKind::RequestFailed).with_source(e))?;

        if response.status() != StatusCode::OK {
            return Err(ErrorKind::HttpStatus(response.status().as_u16()).into());
        }

        let body = response
            .text()
            .await
            .map_err(|e| RetrievalError::new(ErrorKind::RequestFailed).with_source(e))?;

        Ok(body)
    }

    async fn get_api(&self, endpoint: ApiEndpoint, params: &Params) -> Result<String> {
        let url = format!("{}?{}", endpoint.url(&self.api_base_url), encode_params(params));
        self.get(&url, &Headers::new()).await
    }
}
