use url::Url;

use crate::transcript::VideoId;
use crate::Result;

/// Extract a video id from a YouTube URL or accept a bare id.
///
/// Handles `watch?v=`, `youtu.be/`, `/embed/`, `/shorts/` and `/v/` links on any youtube host.
pub fn extract_video_id(input: &str) -> Result<VideoId> {
    let input = input.trim();

    let candidate = Url::parse(input)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .and_then(|url| video_id_from_url(&url))
        .unwrap_or_else(|| input.to_string());

    VideoId::parse(&candidate)
}

fn video_id_from_url(url: &Url) -> Option<String> {
    let host = url.host_str()?.trim_start_matches("www.").trim_start_matches("m.");

    if host == "youtu.be" {
        return url.path_segments()?.next().map(str::to_string);
    }

    if !host.ends_with("youtube.com") && !host.ends_with("youtube-nocookie.com") {
        return None;
    }

    if let Some((_, id)) = url.query_pairs().find(|(key, _)| key == "v") {
        return Some(id.into_owned());
    }

    let mut segments = url.path_segments()?;
    match segments.next()? {
        "embed" | "shorts" | "v" | "live" => segments.next().map(str::to_string),
        _ => None,
    }
}
