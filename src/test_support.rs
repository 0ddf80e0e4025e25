//! Fixtures shared by the unit tests

pub const VIDEO_ID: &str = "dQw4w9WgXcQ";

pub const TRANSCRIPT_XML: &str = r#"<?xml version="1.0" encoding="utf-8" ?><transcript><text start="0" dur="1.54">Hey, this is just a test</text><text start="1.54" dur="4.16">this is not the original transcript</text><text start="5.7" dur="3.239">test &amp;amp; test, like this &amp;quot;test&amp;quot; he&amp;#39;s testing</text></transcript>"#;

/// Captions JSON with a manual Czech track, a generated English track and two translation languages
pub fn captions_json(video_id: &str) -> String {
    format!(
        r#"{{"playerCaptionsTracklistRenderer":{{"captionTracks":[{{"baseUrl":"https://www.youtube.com/api/timedtext?v={id}&lang=cs","name":{{"simpleText":"Czech"}},"vssId":".cs","languageCode":"cs","isTranslatable":true}},{{"baseUrl":"https://www.youtube.com/api/timedtext?v={id}&lang=en&kind=asr","name":{{"simpleText":"English (auto-generated)"}},"vssId":"a.en","languageCode":"en","kind":"asr","isTranslatable":true}}],"translationLanguages":[{{"languageCode":"af","languageName":{{"simpleText":"Afrikaans"}}}},{{"languageCode":"de","languageName":{{"simpleText":"German"}}}}]}}}}"#,
        id = video_id
    )
}

/// Watch page embedding the given captions JSON
pub fn watch_page(captions: &str) -> String {
    format!(
        "<!DOCTYPE html><html><body><script>var ytInitialPlayerResponse = {{\"responseContext\":{{}},\"playabilityStatus\":{{\"status\":\"OK\"}},\"captions\":{},\"videoDetails\":{{\"videoId\":\"{}\"}}}};</script></body></html>",
        captions, VIDEO_ID
    )
}

/// Watch page of a video with the default captions
pub fn default_watch_page(video_id: &str) -> String {
    watch_page(&captions_json(video_id))
}

pub const CONSENT_PAGE: &str = r#"<html><form action="https://consent.youtube.com/s" method="POST"><input type="hidden" name="gl" value="DE"><input type="hidden" name="v" value="cb.20210328-17-p0.de+FX+119"></form></html>"#;

pub fn headers_of(pairs: &[(&str, &str)]) -> crate::client::Headers {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}
