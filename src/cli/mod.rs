use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "yt-transcript",
    about = "YouTube Transcript - Retrieve closed captions for YouTube videos, playlists and channels",
    version,
    long_about = "A CLI tool for retrieving YouTube transcripts without a headless browser. Single videos are read from the watch page, playlists and channels are enumerated through the YouTube Data API v3 and retrieved concurrently."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Netscape cookies.txt file sent with every watch page request
    #[arg(long, global = true, env = "YOUTUBE_COOKIES", value_name = "FILE")]
    pub cookies: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the transcripts available for a video
    List {
        /// Video id or YouTube URL
        #[arg(value_name = "VIDEO")]
        video: String,
    },

    /// Fetch the transcript of a video
    Get {
        /// Video id or YouTube URL
        #[arg(value_name = "VIDEO")]
        video: String,

        /// Language codes in order of preference (defaults to the configured languages)
        #[arg(short, long = "lang", value_name = "LANG")]
        languages: Vec<String>,

        /// Translate the transcript into this language
        #[arg(short, long, value_name = "LANG")]
        translate: Option<String>,

        /// Output format (defaults to the configured format)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Fetch the transcripts of every video in a playlist
    Playlist {
        /// Playlist id
        #[arg(value_name = "PLAYLIST_ID")]
        playlist_id: String,

        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Fetch the transcripts of every video uploaded by a channel
    Channel {
        /// Channel name, matched exactly against search results
        #[arg(value_name = "NAME")]
        name: String,

        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Show or write the configuration file
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },

    /// List supported output formats
    Formats,
}

/// Options shared by the playlist and channel commands
#[derive(Args, Debug, Clone)]
pub struct BatchArgs {
    /// YouTube Data API v3 key
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Language codes in order of preference (defaults to the configured languages)
    #[arg(short, long = "lang", value_name = "LANG")]
    pub languages: Vec<String>,

    /// Skip videos that fail instead of aborting the batch
    #[arg(long)]
    pub continue_on_error: bool,

    /// Output format of the combined result
    #[arg(short, long, value_enum, default_value_t = BatchFormat::Json)]
    pub format: BatchFormat,

    /// Output file path (prints to console if not specified)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Formats for a playlist or channel result, a JSON map of video id to transcript
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchFormat {
    /// Compact JSON
    Json,
    /// Indented JSON
    PrettyJson,
}

#[derive(ValueEnum, Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text
    Text,
    /// Compact JSON with timestamps
    Json,
    /// Indented JSON with timestamps
    PrettyJson,
    /// WebVTT format
    Vtt,
    /// SRT subtitle format
    Srt,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::PrettyJson => write!(f, "pretty-json"),
            OutputFormat::Vtt => write!(f, "vtt"),
            OutputFormat::Srt => write!(f, "srt"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true)
    }
}
