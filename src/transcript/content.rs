use once_cell::sync::Lazy;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::{ErrorKind, RetrievalError, Result, TranscriptError};

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<[^>]*>").expect("valid tag pattern"));

static XML_ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(lt|gt|amp|quot|apos|#[0-9]+|#[xX][0-9a-fA-F]+);").expect("valid entity pattern")
});

/// Cleaned content of a transcript track
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptContent {
    content: Vec<Fragment>,
}

/// One timed caption unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub text: String,

    /// Start time in seconds
    pub start: f64,

    /// Duration in seconds
    pub dur: f64,
}

impl Fragment {
    pub fn new(text: impl Into<String>, start: f64, dur: f64) -> Self {
        Self {
            text: text.into(),
            start,
            dur,
        }
    }

    /// End time in seconds
    pub fn end(&self) -> f64 {
        self.start + self.dur
    }
}

impl TranscriptContent {
    pub fn new(content: Vec<Fragment>) -> Self {
        Self { content }
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.content
    }

    pub fn into_fragments(self) -> Vec<Fragment> {
        self.content
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Parse a caption payload and clean its fragments, preserving their order
pub fn extract(xml: &str, video_id: &str) -> Result<TranscriptContent> {
    let raw = parse_fragments(xml).map_err(|e| {
        TranscriptError::from(
            RetrievalError::new(ErrorKind::InvalidTranscriptXml)
                .with_source(e)
                .for_video(video_id),
        )
    })?;

    Ok(TranscriptContent::new(clean_fragments(raw)))
}

/// Raw fragment as it appears in the payload, text is absent for empty elements
#[derive(Debug)]
struct RawFragment {
    text: Option<String>,
    start: f64,
    dur: f64,
}

/// Drop blank fragments, strip tags, then unescape entities.
///
/// Tags are stripped before unescaping so encoded angle brackets survive as text.
fn clean_fragments(fragments: Vec<RawFragment>) -> Vec<Fragment> {
    fragments
        .into_iter()
        .filter_map(|fragment| {
            let text = fragment.text.filter(|text| !text.trim().is_empty())?;
            let stripped = HTML_TAG.replace_all(&text, "");
            let text = unescape_xml(&stripped).into_owned();
            Some(Fragment::new(text, fragment.start, fragment.dur))
        })
        .collect()
}

/// Decode the predefined XML entities and numeric character references in one pass.
///
/// Anything else, HTML named entities included, is left as literal text.
fn unescape_xml(text: &str) -> Cow<'_, str> {
    XML_ENTITY.replace_all(text, |captures: &Captures<'_>| {
        let decoded = match &captures[1] {
            "lt" => Some('<'),
            "gt" => Some('>'),
            "amp" => Some('&'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            reference => numeric_reference(reference),
        };

        match decoded {
            Some(c) => c.to_string(),
            None => captures[0].to_string(),
        }
    })
}

fn numeric_reference(reference: &str) -> Option<char> {
    let digits = reference.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse().ok()?,
    };
    char::from_u32(code)
}

/// Run the cleanup pipeline over already extracted fragments
pub fn clean(fragments: &[Fragment]) -> Vec<Fragment> {
    let raw = fragments
        .iter()
        .map(|fragment| RawFragment {
            text: Some(fragment.text.clone()),
            start: fragment.start,
            dur: fragment.dur,
        })
        .collect();

    clean_fragments(raw)
}

fn parse_fragments(xml: &str) -> std::result::Result<Vec<RawFragment>, PayloadError> {
    let mut reader = Reader::from_str(xml);
    let mut fragments = Vec::new();
    let mut depth = 0usize;
    let mut seen_root = false;
    let mut current: Option<RawFragment> = None;

    loop {
        match reader.read_event()? {
            Event::Start(element) => {
                depth += 1;
                match depth {
                    1 => seen_root = true,
                    2 => current = Some(timing(&element)?),
                    _ => {}
                }
            }
            Event::Empty(element) => match depth {
                0 => seen_root = true,
                1 => fragments.push(timing(&element)?),
                _ => {}
            },
            Event::Text(text) => {
                if let Some(fragment) = current.as_mut() {
                    push_text(fragment, &text.unescape()?);
                } else if depth == 0 && !text.unescape()?.trim().is_empty() {
                    return Err(PayloadError::Structure("text outside of the root element"));
                }
            }
            Event::CData(data) => {
                if let Some(fragment) = current.as_mut() {
                    push_text(fragment, &String::from_utf8_lossy(&data));
                }
            }
            Event::End(_) => {
                if depth == 2 {
                    if let Some(fragment) = current.take() {
                        fragments.push(fragment);
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root || depth != 0 {
        return Err(PayloadError::Structure("missing or unclosed root element"));
    }

    Ok(fragments)
}

fn push_text(fragment: &mut RawFragment, text: &str) {
    fragment.text.get_or_insert_with(String::new).push_str(text);
}

fn timing(element: &BytesStart<'_>) -> std::result::Result<RawFragment, PayloadError> {
    let mut start = None;
    let mut dur = None;

    for attribute in element.attributes() {
        let attribute = attribute.map_err(quick_xml::Error::from)?;
        let value = attribute.unescape_value()?;
        match attribute.key.as_ref() {
            b"start" => start = Some(parse_seconds(&value)?),
            b"dur" => dur = Some(parse_seconds(&value)?),
            _ => {}
        }
    }

    Ok(RawFragment {
        text: None,
        start: start.ok_or(PayloadError::Structure("fragment without a start attribute"))?,
        dur: dur.unwrap_or(0.0),
    })
}

fn parse_seconds(value: &str) -> std::result::Result<f64, PayloadError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| PayloadError::Structure("timing attribute is not a number"))
}

#[derive(thiserror::Error, Debug)]
enum PayloadError {
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    #[error("{0}")]
    Structure(&'static str),
}
