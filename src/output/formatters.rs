use crate::transcript::content::{Fragment, TranscriptContent};

/// Compact JSON, `{"content":[{"text":..,"start":..,"dur":..}]}`
pub fn format_as_json(content: &TranscriptContent) -> serde_json::Result<String> {
    serde_json::to_string(content)
}

pub fn format_as_pretty_json(content: &TranscriptContent) -> serde_json::Result<String> {
    serde_json::to_string_pretty(content)
}

/// Fragment texts, one per line, without timestamps
pub fn format_as_text(content: &TranscriptContent) -> String {
    content
        .fragments()
        .iter()
        .map(|fragment| fragment.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// WebVTT subtitles
pub fn format_as_vtt(content: &TranscriptContent) -> String {
    let cues = format_as_subtitles(content, |_, fragment| {
        format!("{}\n{}", timestamp_line(fragment), fragment.text)
    });

    format!("WEBVTT\n\n{}", cues)
}

/// SubRip subtitles, numbered from 1
pub fn format_as_srt(content: &TranscriptContent) -> String {
    format_as_subtitles(content, |index, fragment| {
        format!("{}\n{}\n{}", index + 1, timestamp_line(fragment), fragment.text)
    })
}

fn format_as_subtitles(content: &TranscriptContent, block: impl Fn(usize, &Fragment) -> String) -> String {
    content
        .fragments()
        .iter()
        .enumerate()
        .map(|(index, fragment)| block(index, fragment))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn timestamp_line(fragment: &Fragment) -> String {
    format!(
        "{} --> {}",
        format_timestamp(fragment.start),
        format_timestamp(fragment.end())
    )
}

/// `HH:MM:SS.mmm`, each component truncated
pub fn format_timestamp(seconds: f64) -> String {
    let hours = (seconds / 3600.0) as u64;
    let minutes = ((seconds % 3600.0) / 60.0) as u64;
    let secs = (seconds % 60.0) as u64;
    let millis = ((seconds % 1.0) * 1000.0) as u64;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content() -> TranscriptContent {
        TranscriptContent::new(vec![
            Fragment::new("Hey, this is just a test", 0.0, 1.5),
            Fragment::new("this is <not> the original", 1.5, 2.25),
        ])
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "00:00:00.000");
        assert_eq!(format_timestamp(3661.25), "01:01:01.250");
        assert_eq!(format_timestamp(59.5), "00:00:59.500");
        assert_eq!(format_timestamp(125.125), "00:02:05.125");
        assert_eq!(format_timestamp(36000.5), "10:00:00.500");
    }

    #[test]
    fn test_format_as_text() {
        assert_eq!(
            format_as_text(&content()),
            "Hey, this is just a test\nthis is <not> the original"
        );
        assert_eq!(format_as_text(&TranscriptContent::default()), "");
    }

    #[test]
    fn test_format_as_json() {
        let json = format_as_json(&content()).unwrap();
        assert_eq!(
            json,
            r#"{"content":[{"text":"Hey, this is just a test","start":0.0,"dur":1.5},{"text":"this is <not> the original","start":1.5,"dur":2.25}]}"#
        );

        let pretty = format_as_pretty_json(&content()).unwrap();
        let reparsed: TranscriptContent = serde_json::from_str(&pretty).unwrap();
        assert_eq!(reparsed, content());
        assert!(pretty.contains('\n'));
    }

    #[test]
    fn test_format_as_vtt() {
        assert_eq!(
            format_as_vtt(&content()),
            "WEBVTT\n\n\
             00:00:00.000 --> 00:00:01.500\nHey, this is just a test\n\n\
             00:00:01.500 --> 00:00:03.750\nthis is <not> the original"
        );
    }

    #[test]
    fn test_format_as_srt() {
        assert_eq!(
            format_as_srt(&content()),
            "1\n00:00:00.000 --> 00:00:01.500\nHey, this is just a test\n\n\
             2\n00:00:01.500 --> 00:00:03.750\nthis is <not> the original"
        );
    }
}
