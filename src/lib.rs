//! YouTube Transcript - retrieve closed captions for YouTube videos, playlists and channels
//!
//! This library scrapes the watch page of a video for the embedded captions JSON, works around
//! the cookie consent interstitial some regions get, and turns the raw caption XML into a clean,
//! timed transcript. Playlists and channels are enumerated through the YouTube Data API v3 and
//! their transcripts are retrieved concurrently.

pub mod api;
pub mod batch;
pub mod cli;
pub mod client;
pub mod config;
pub mod fetch;
pub mod listing;
pub mod output;
pub mod transcript;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

use std::path::PathBuf;

pub use api::TranscriptApi;
pub use batch::{BatchOrchestrator, BatchRequest, BatchResult, BatchTarget};
pub use cli::{Cli, Commands, OutputFormat};
pub use client::{ApiEndpoint, HttpYoutubeClient, YoutubeClient};
pub use config::Config;
pub use transcript::content::{Fragment, TranscriptContent};
pub use transcript::{TranscriptDirectory, TranscriptTrack, VideoId};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, TranscriptError>;

/// Boxed cause attached to a retrieval error
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Base URL of the watch page, the video id is appended to it
pub const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

const TOO_MANY_REQUESTS: &str = "YouTube is receiving too many requests from this IP and now requires solving a captcha to continue. \
One of the following things can be done to work around this:\n\
- Manually solve the captcha in a browser and export the cookie file, then pass it with --cookies\n\
- Use a different IP address\n\
- Wait until the ban on your IP has been lifted";

/// Error types returned by the library
#[derive(thiserror::Error, Debug)]
pub enum TranscriptError {
    #[error("Invalid video id: {0}")]
    InvalidVideoId(String),

    #[error("Language codes cannot be blank")]
    BlankLanguageCode,

    #[error("API key cannot be blank")]
    BlankApiKey,

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),
}

impl TranscriptError {
    /// Whether this error is a precondition violation rather than a retrieval failure
    pub fn is_precondition(&self) -> bool {
        !matches!(self, TranscriptError::Retrieval(_))
    }

    /// Video the error relates to, when known
    pub fn video_id(&self) -> Option<&str> {
        match self {
            TranscriptError::InvalidVideoId(id) => Some(id),
            TranscriptError::Retrieval(err) => err.video_id(),
            _ => None,
        }
    }

    /// Classification of a retrieval error
    pub fn kind(&self) -> Option<&ErrorKind> {
        match self {
            TranscriptError::Retrieval(err) => Some(err.kind()),
            _ => None,
        }
    }

    /// Attach a video id to a retrieval error that does not carry one yet
    pub fn for_video(self, video_id: &str) -> Self {
        match self {
            TranscriptError::Retrieval(err) => TranscriptError::Retrieval(err.for_video(video_id)),
            other => other,
        }
    }
}

impl From<ErrorKind> for TranscriptError {
    fn from(kind: ErrorKind) -> Self {
        TranscriptError::Retrieval(RetrievalError::new(kind))
    }
}

/// A failed network call, parse or page-structure anomaly
#[derive(thiserror::Error, Debug)]
#[error("{}", describe(.video_id.as_deref(), .kind))]
pub struct RetrievalError {
    video_id: Option<String>,
    kind: ErrorKind,
    #[source]
    source: Option<BoxError>,
}

fn describe(video_id: Option<&str>, kind: &ErrorKind) -> String {
    match video_id {
        Some(id) => format!(
            "Could not retrieve transcript for the video: {}{}.\nReason: {}",
            WATCH_URL, id, kind
        ),
        None => format!("Could not retrieve transcripts.\nReason: {}", kind),
    }
}

impl RetrievalError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            video_id: None,
            kind,
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the video id unless one is already present
    pub fn for_video(mut self, video_id: &str) -> Self {
        if self.video_id.is_none() {
            self.video_id = Some(video_id.to_string());
        }
        self
    }

    pub fn video_id(&self) -> Option<&str> {
        self.video_id.as_deref()
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

/// Classification of retrieval failures
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ErrorKind {
    #[error("Request to YouTube failed.")]
    RequestFailed,

    #[error("Request to YouTube failed. Status code: {0}")]
    HttpStatus(u16),

    #[error("Failed to automatically give consent to saving cookies")]
    ConsentFailed,

    #[error("Failed to load cookies from a file: {}.", .0.display())]
    CookieFile(PathBuf),

    #[error("{}", TOO_MANY_REQUESTS)]
    TooManyRequests,

    #[error("This video is no longer available.")]
    VideoUnavailable,

    #[error("Transcripts are disabled for this video.")]
    TranscriptsDisabled,

    #[error("Failed to parse transcript JSON.")]
    InvalidCaptionsJson,

    #[error("No transcripts were found for any of the requested language codes: [{}]. {directory}.", .requested.join(", "))]
    NoTranscriptFound {
        requested: Vec<String>,
        directory: String,
    },

    #[error("This transcript is not translatable")]
    NotTranslatable,

    #[error("Translation language '{0}' is not available")]
    TranslationUnavailable(String),

    #[error("Failed to parse transcript content XML.")]
    InvalidTranscriptXml,

    #[error("Could not parse playlist JSON for the playlist: {playlist_id} (page {page})")]
    PlaylistParse { playlist_id: String, page: usize },

    #[error("Could not parse search JSON for the channel: {0}")]
    ChannelSearchParse(String),

    #[error("Could not find channel with the name: {0}")]
    ChannelNotFound(String),

    #[error("Could not parse channel JSON for the channel with id: {0}")]
    ChannelDetailsParse(String),

    #[error("Transcript retrieval task failed")]
    TaskFailed,
}
