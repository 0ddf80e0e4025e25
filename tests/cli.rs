use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Binary isolated from any real configuration or credentials
fn yt_transcript(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("yt-transcript").unwrap();
    cmd.current_dir(home.path())
        .env("XDG_CONFIG_HOME", home.path())
        .env("HOME", home.path())
        .env_remove("YOUTUBE_API_KEY")
        .env_remove("YOUTUBE_COOKIES")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();

    yt_transcript(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("playlist"))
        .stdout(predicate::str::contains("channel"));
}

#[test]
fn test_formats_lists_every_format() {
    let home = TempDir::new().unwrap();

    yt_transcript(&home)
        .arg("formats")
        .assert()
        .success()
        .stdout(predicate::str::contains("pretty-json"))
        .stdout(predicate::str::contains("vtt"))
        .stdout(predicate::str::contains("srt"));
}

#[test]
fn test_invalid_video_id_is_rejected() {
    let home = TempDir::new().unwrap();

    yt_transcript(&home)
        .args(["get", "invalid!id"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid video id: invalid!id"));
}

#[test]
fn test_playlist_requires_api_key() {
    let home = TempDir::new().unwrap();

    yt_transcript(&home)
        .args(["playlist", "PL123"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("API key is required"));
}

#[test]
fn test_unknown_format_is_rejected() {
    let home = TempDir::new().unwrap();

    yt_transcript(&home)
        .args(["get", "dQw4w9WgXcQ", "--format", "csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("csv"));
}

#[test]
fn test_batch_rejects_subtitle_formats() {
    let home = TempDir::new().unwrap();

    yt_transcript(&home)
        .args(["playlist", "PL123", "--api-key", "key", "--format", "vtt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("vtt"));
}

#[test]
fn test_config_show_prints_defaults() {
    let home = TempDir::new().unwrap();

    yt_transcript(&home)
        .args(["config", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Current Configuration:"))
        .stdout(predicate::str::contains("Default Languages: en"));
}

#[test]
fn test_local_config_file_is_used() {
    let home = TempDir::new().unwrap();
    std::fs::write(
        home.path().join("config.yaml"),
        "youtube:\n  api_key: null\n  api_base_url: https://www.googleapis.com/youtube/v3/\n  cookies_path: null\n\
         app:\n  default_languages: [de, en]\n  default_output_format: srt\n  stop_on_error: false\n",
    )
    .unwrap();

    yt_transcript(&home)
        .args(["config", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Default Languages: de, en"))
        .stdout(predicate::str::contains("Default Format: srt"));
}

#[test]
fn test_invalid_config_file_fails() {
    let home = TempDir::new().unwrap();
    std::fs::write(home.path().join("config.yaml"), "youtube: [not, a, map]\n").unwrap();

    yt_transcript(&home)
        .arg("formats")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config file"));
}
