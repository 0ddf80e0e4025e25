use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::{TranscriptDirectory, TranscriptTrack, TranslationLanguages};
use crate::{ErrorKind, RetrievalError, Result, TranscriptError};

const CAPTIONS_MARKER: &str = "\"captions\":";
const VIDEO_DETAILS_MARKER: &str = ",\"videoDetails";
const RECAPTCHA_MARKER: &str = "class=\"g-recaptcha\"";
const PLAYABILITY_MARKER: &str = "\"playabilityStatus\":";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTracklist {
    caption_tracks: Vec<RawCaptionTrack>,
    #[serde(default)]
    translation_languages: Vec<RawTranslationLanguage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCaptionTrack {
    base_url: String,
    name: RawText,
    language_code: String,
    /// Generated tracks carry a `kind` field, whatever its value
    #[serde(default, rename = "kind", deserialize_with = "field_present")]
    has_kind: bool,
}

fn field_present<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    Value::deserialize(deserializer).map(|_| true)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTranslationLanguage {
    language_code: String,
    language_name: RawText,
}

/// Text node, either `simpleText` or a list of `runs`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawText {
    simple_text: Option<String>,
    #[serde(default)]
    runs: Vec<RawRun>,
}

#[derive(Debug, Deserialize)]
struct RawRun {
    text: String,
}

impl RawText {
    fn into_text(self) -> String {
        match self.simple_text {
            Some(text) => text,
            None => self.runs.into_iter().map(|run| run.text).collect(),
        }
    }
}

/// Build the transcript directory of a video from its watch page
pub fn extract(page: &str, video_id: &str) -> Result<TranscriptDirectory> {
    let json = captions_json(page).map_err(|kind| TranscriptError::from(kind).for_video(video_id))?;
    let tracklist = parse_tracklist(&json).map_err(|e| e.for_video(video_id))?;

    let translation_languages: Arc<TranslationLanguages> = Arc::new(
        tracklist
            .translation_languages
            .into_iter()
            .map(|language| (language.language_code, language.language_name.into_text()))
            .collect(),
    );

    let mut manual = BTreeMap::new();
    let mut generated = BTreeMap::new();

    for raw in tracklist.caption_tracks {
        let is_generated = raw.has_kind;
        let track = TranscriptTrack::new(
            video_id,
            raw.base_url,
            raw.name.into_text(),
            raw.language_code.clone(),
            is_generated,
            Arc::clone(&translation_languages),
        );

        let tracks = if is_generated { &mut generated } else { &mut manual };
        // first track of a language wins
        tracks.entry(raw.language_code).or_insert(track);
    }

    tracing::debug!(
        "Video {} has {} manual and {} generated transcripts",
        video_id,
        manual.len(),
        generated.len()
    );

    Ok(TranscriptDirectory::new(video_id, manual, generated, translation_languages))
}

/// Locate the captions JSON inside a watch page.
///
/// Returns the text between `"captions":` and `,"videoDetails` with newlines removed. When the
/// page carries no captions the failure is classified from the rest of the page.
pub fn captions_json(page: &str) -> std::result::Result<String, ErrorKind> {
    let Some((_, rest)) = page.split_once(CAPTIONS_MARKER) else {
        if page.contains(RECAPTCHA_MARKER) {
            return Err(ErrorKind::TooManyRequests);
        }
        if !page.contains(PLAYABILITY_MARKER) {
            return Err(ErrorKind::VideoUnavailable);
        }
        return Err(ErrorKind::TranscriptsDisabled);
    };

    let json = rest.split(VIDEO_DETAILS_MARKER).next().unwrap_or(rest);
    Ok(json.replace('\n', ""))
}

/// Parse the captions JSON and project it onto the typed track list
fn parse_tracklist(json: &str) -> Result<RawTracklist> {
    let root: Value = serde_json::from_str(json)
        .map_err(|e| RetrievalError::new(ErrorKind::InvalidCaptionsJson).with_source(e))?;

    let renderer = root
        .get("playerCaptionsTracklistRenderer")
        .ok_or(ErrorKind::TranscriptsDisabled)?;

    if !renderer.get("captionTracks").is_some_and(Value::is_array) {
        return Err(ErrorKind::TranscriptsDisabled.into());
    }

    let tracklist = RawTracklist::deserialize(renderer)
        .map_err(|e| RetrievalError::new(ErrorKind::InvalidCaptionsJson).with_source(e))?;

    Ok(tracklist)
}
