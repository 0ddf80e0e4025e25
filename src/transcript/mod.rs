use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub mod content;
pub mod extract;

use crate::client::{Headers, YoutubeClient};
use crate::{ErrorKind, Result, TranscriptError};
use content::TranscriptContent;

/// Language used when no language code is requested
pub const DEFAULT_LANGUAGE: &str = "en";

/// Translation language code to display name
pub type TranslationLanguages = BTreeMap<String, String>;

/// An 11 character YouTube video id
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Validate a raw id, rejecting anything that is not `[A-Za-z0-9_-]{11}`
    pub fn parse(raw: &str) -> Result<Self> {
        let valid = raw.len() == 11
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

        if !valid {
            return Err(TranscriptError::InvalidVideoId(raw.to_string()));
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Watch page URL for this video
    pub fn watch_url(&self) -> String {
        format!("{}{}", crate::WATCH_URL, self.0)
    }
}

impl FromStr for VideoId {
    type Err = TranscriptError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One selectable caption track of a video
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptTrack {
    video_id: String,
    url: String,
    language: String,
    language_code: String,
    is_generated: bool,
    translation_languages: Arc<TranslationLanguages>,
}

impl TranscriptTrack {
    pub fn new(
        video_id: impl Into<String>,
        url: impl Into<String>,
        language: impl Into<String>,
        language_code: impl Into<String>,
        is_generated: bool,
        translation_languages: Arc<TranslationLanguages>,
    ) -> Self {
        Self {
            video_id: video_id.into(),
            url: url.into(),
            language: language.into(),
            language_code: language_code.into(),
            is_generated,
            translation_languages,
        }
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    /// URL the caption payload is fetched from
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Display name of the language
    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn language_code(&self) -> &str {
        &self.language_code
    }

    pub fn is_generated(&self) -> bool {
        self.is_generated
    }

    pub fn is_translatable(&self) -> bool {
        !self.translation_languages.is_empty()
    }

    /// Codes this track can be translated into, sorted
    pub fn translation_languages(&self) -> Vec<&str> {
        self.translation_languages.keys().map(String::as_str).collect()
    }

    /// Derive a track translated into `language_code`.
    ///
    /// The translated track keeps the translation languages of the source track.
    pub fn translate(&self, language_code: &str) -> Result<TranscriptTrack> {
        if !self.is_translatable() {
            return Err(TranscriptError::from(ErrorKind::NotTranslatable).for_video(&self.video_id));
        }

        let language = self.translation_languages.get(language_code).ok_or_else(|| {
            TranscriptError::from(ErrorKind::TranslationUnavailable(language_code.to_string()))
                .for_video(&self.video_id)
        })?;

        Ok(Self {
            video_id: self.video_id.clone(),
            url: format!("{}&tlang={}", self.url, language_code),
            language: language.clone(),
            language_code: language_code.to_string(),
            is_generated: self.is_generated,
            translation_languages: Arc::clone(&self.translation_languages),
        })
    }

    /// Download and clean the caption payload of this track
    pub async fn fetch(&self, client: &dyn YoutubeClient) -> Result<TranscriptContent> {
        let mut headers = Headers::new();
        headers.insert("Accept-Language".to_string(), "en-US".to_string());

        let xml = client
            .get(&self.url, &headers)
            .await
            .map_err(|e| e.for_video(&self.video_id))?;

        content::extract(&xml, &self.video_id)
    }
}

impl fmt::Display for TranscriptTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Transcript for video with id: {}.", self.video_id)?;
        writeln!(f, "Language: {}", self.language)?;
        writeln!(f, "Language code: {}", self.language_code)?;
        writeln!(f, "API URL for retrieving content: {}", self.url)?;
        write!(
            f,
            "Available translation languages: [{}]",
            self.translation_languages().join(", ")
        )
    }
}

/// All tracks and translation options available for a video
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptDirectory {
    video_id: String,
    manual: BTreeMap<String, TranscriptTrack>,
    generated: BTreeMap<String, TranscriptTrack>,
    translation_languages: Arc<TranslationLanguages>,
}

impl TranscriptDirectory {
    pub fn new(
        video_id: impl Into<String>,
        manual: BTreeMap<String, TranscriptTrack>,
        generated: BTreeMap<String, TranscriptTrack>,
        translation_languages: Arc<TranslationLanguages>,
    ) -> Self {
        Self {
            video_id: video_id.into(),
            manual,
            generated,
            translation_languages,
        }
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    /// Find a track in the requested languages, preferring manually created ones.
    ///
    /// Codes are tried in order, an empty slice means `["en"]`.
    pub fn find_transcript(&self, language_codes: &[&str]) -> Result<TranscriptTrack> {
        let codes = validate_language_codes(language_codes)?;

        Self::find_in(&self.manual, &codes)
            .or_else(|| Self::find_in(&self.generated, &codes))
            .ok_or_else(|| self.not_found(&codes))
    }

    /// Find a manually created track in the requested languages
    pub fn find_manual_transcript(&self, language_codes: &[&str]) -> Result<TranscriptTrack> {
        let codes = validate_language_codes(language_codes)?;
        Self::find_in(&self.manual, &codes).ok_or_else(|| self.not_found(&codes))
    }

    /// Find an automatically generated track in the requested languages
    pub fn find_generated_transcript(&self, language_codes: &[&str]) -> Result<TranscriptTrack> {
        let codes = validate_language_codes(language_codes)?;
        Self::find_in(&self.generated, &codes).ok_or_else(|| self.not_found(&codes))
    }

    fn find_in(tracks: &BTreeMap<String, TranscriptTrack>, codes: &[&str]) -> Option<TranscriptTrack> {
        codes.iter().find_map(|code| tracks.get(*code)).cloned()
    }

    fn not_found(&self, codes: &[&str]) -> TranscriptError {
        TranscriptError::from(ErrorKind::NoTranscriptFound {
            requested: codes.iter().map(|c| c.to_string()).collect(),
            directory: self.to_string(),
        })
        .for_video(&self.video_id)
    }

    pub fn manual_language_codes(&self) -> Vec<&str> {
        self.manual.keys().map(String::as_str).collect()
    }

    pub fn generated_language_codes(&self) -> Vec<&str> {
        self.generated.keys().map(String::as_str).collect()
    }

    pub fn translation_language_codes(&self) -> Vec<&str> {
        self.translation_languages.keys().map(String::as_str).collect()
    }

    /// Manually created tracks first, then generated ones
    pub fn iter(&self) -> impl Iterator<Item = &TranscriptTrack> {
        self.manual.values().chain(self.generated.values())
    }

    pub fn len(&self) -> usize {
        self.manual.len() + self.generated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<'a> IntoIterator for &'a TranscriptDirectory {
    type Item = &'a TranscriptTrack;
    type IntoIter = Box<dyn Iterator<Item = &'a TranscriptTrack> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

impl fmt::Display for TranscriptDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "For video with ID ({}) transcripts are available in the following languages:",
            self.video_id
        )?;
        writeln!(f, "Manually created: [{}]", self.manual_language_codes().join(", "))?;
        writeln!(f, "Automatically generated: [{}]", self.generated_language_codes().join(", "))?;
        write!(
            f,
            "Available translation languages: [{}]",
            self.translation_language_codes().join(", ")
        )
    }
}

/// Apply the default language and reject blank codes
pub fn validate_language_codes<'a>(language_codes: &[&'a str]) -> Result<Vec<&'a str>> {
    if language_codes.is_empty() {
        return Ok(vec![DEFAULT_LANGUAGE]);
    }

    if language_codes.iter().any(|code| code.trim().is_empty()) {
        return Err(TranscriptError::BlankLanguageCode);
    }

    Ok(language_codes.to_vec())
}
