use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use youtube_transcript::cli::{BatchArgs, BatchFormat, Cli, Commands, OutputFormat};
use youtube_transcript::{
    output, utils, BatchOrchestrator, BatchRequest, BatchTarget, Config, HttpYoutubeClient, TranscriptApi,
    TranscriptContent,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.log_json);

    let config = Config::load()?;
    let client = Arc::new(HttpYoutubeClient::with_api_base_url(config.youtube.api_base_url.clone()));
    let api = TranscriptApi::new(client);
    let cookies = cli.cookies.clone().or_else(|| config.youtube.cookies_path.clone());

    match cli.command {
        Commands::List { video } => {
            let video_id = utils::extract_video_id(&video)?;

            let directory = match &cookies {
                Some(path) => api.list_transcripts_with_cookies(video_id.as_str(), path).await?,
                None => api.list_transcripts(video_id.as_str()).await?,
            };

            println!("{}", directory);
            for track in &directory {
                println!();
                println!("{}", track);
            }
        }
        Commands::Get {
            video,
            languages,
            translate,
            format,
            output,
        } => {
            let video_id = utils::extract_video_id(&video)?;
            let languages = languages_or_default(languages, &config);
            let codes: Vec<&str> = languages.iter().map(String::as_str).collect();
            let format = match format {
                Some(format) => format,
                None => config.output_format()?,
            };

            tracing::info!("Fetching transcript for {}", video_id);

            let directory = match &cookies {
                Some(path) => api.list_transcripts_with_cookies(video_id.as_str(), path).await?,
                None => api.list_transcripts(video_id.as_str()).await?,
            };

            let mut track = directory.find_transcript(&codes)?;
            if let Some(target) = translate {
                track = track.translate(&target)?;
            }

            let content = api.fetch(&track).await?;

            match output {
                Some(path) => {
                    output::save_to_file(&content, &path, &format)?;
                    println!("Transcript saved to: {}", path.display());
                }
                None => {
                    output::print_to_console(&content, &format)?;
                }
            }
        }
        Commands::Playlist { playlist_id, batch } => {
            let target = BatchTarget::Playlist(playlist_id);
            run_batch(api, target, batch, cookies, &config, cli.quiet).await?;
        }
        Commands::Channel { name, batch } => {
            let target = BatchTarget::Channel(name);
            run_batch(api, target, batch, cookies, &config, cli.quiet).await?;
        }
        Commands::Config { show } => {
            if show {
                config.display();
                println!("  Config File: {}", Config::config_path()?.display());
            } else {
                let path = config.save()?;
                println!("Configuration written to: {}", path.display());
            }
        }
        Commands::Formats => {
            println!("Supported output formats:");
            println!("  • {} - transcript text, one fragment per line", OutputFormat::Text);
            println!("  • {} - compact JSON with start and duration", OutputFormat::Json);
            println!("  • {} - indented JSON with start and duration", OutputFormat::PrettyJson);
            println!("  • {} - WebVTT subtitles", OutputFormat::Vtt);
            println!("  • {} - SubRip subtitles", OutputFormat::Srt);
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool, json: bool) {
    let default_filter = if verbose {
        "youtube_transcript=debug"
    } else {
        "youtube_transcript=info"
    };

    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

fn languages_or_default(languages: Vec<String>, config: &Config) -> Vec<String> {
    if languages.is_empty() {
        config.app.default_languages.clone()
    } else {
        languages
    }
}

async fn run_batch(
    api: TranscriptApi,
    target: BatchTarget,
    args: BatchArgs,
    cookies: Option<PathBuf>,
    config: &Config,
    quiet: bool,
) -> Result<()> {
    let api_key = args
        .api_key
        .or_else(|| config.youtube.api_key.clone())
        .context("A YouTube Data API key is required, pass --api-key or set YOUTUBE_API_KEY")?;

    let mut request =
        BatchRequest::new(api_key)?.with_stop_on_error(config.app.stop_on_error && !args.continue_on_error);
    if let Some(path) = cookies {
        request = request.with_cookies_path(path);
    }

    let languages = languages_or_default(args.languages, config);
    let codes: Vec<&str> = languages.iter().map(String::as_str).collect();

    let progress = if quiet { ProgressBar::hidden() } else { spinner()? };
    progress.set_message(match &target {
        BatchTarget::Playlist(id) => format!("Retrieving transcripts for playlist {}...", id),
        BatchTarget::Channel(name) => format!("Retrieving transcripts for channel {}...", name),
    });

    let orchestrator = BatchOrchestrator::with_api(api);
    let result = orchestrator.get_transcripts(&request, &target, &codes).await;
    progress.finish_and_clear();
    let result = result?;

    for (video_id, reason) in result.failures() {
        tracing::warn!("No transcript for {}: {}", video_id, reason);
    }

    let transcripts: BTreeMap<&str, &TranscriptContent> = result.iter().collect();
    let rendered = match args.format {
        BatchFormat::Json => serde_json::to_string(&transcripts),
        BatchFormat::PrettyJson => serde_json::to_string_pretty(&transcripts),
    }
    .context("Failed to serialize transcripts")?;

    match args.output {
        Some(path) => {
            fs_err::write(&path, rendered)?;
            println!("{} transcripts saved to: {}", result.len(), path.display());
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

fn spinner() -> Result<ProgressBar> {
    let progress = ProgressBar::new_spinner();
    progress.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    progress.enable_steady_tick(Duration::from_millis(100));
    Ok(progress)
}
