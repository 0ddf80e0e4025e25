use std::collections::{BTreeMap, HashMap, HashSet};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::{Id as TaskId, JoinSet};

use crate::api::TranscriptApi;
use crate::client::YoutubeClient;
use crate::listing::ListingPaginator;
use crate::transcript::content::TranscriptContent;
use crate::transcript::{validate_language_codes, TranscriptDirectory};
use crate::{ErrorKind, RetrievalError, Result, TranscriptError};

/// Parameters shared by every video of a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    api_key: String,
    cookies_path: Option<PathBuf>,
    stop_on_error: bool,
}

impl BatchRequest {
    /// Request using the given Data API key, stopping on the first error
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(TranscriptError::BlankApiKey);
        }

        Ok(Self {
            api_key,
            cookies_path: None,
            stop_on_error: true,
        })
    }

    /// Fetch every watch page with the cookies of this Netscape cookie file
    pub fn with_cookies_path(mut self, cookies_path: impl Into<PathBuf>) -> Self {
        self.cookies_path = Some(cookies_path.into());
        self
    }

    pub fn with_stop_on_error(mut self, stop_on_error: bool) -> Self {
        self.stop_on_error = stop_on_error;
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn cookies_path(&self) -> Option<&Path> {
        self.cookies_path.as_deref()
    }

    pub fn stop_on_error(&self) -> bool {
        self.stop_on_error
    }
}

/// Collection of videos a batch runs over
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchTarget {
    /// Playlist id
    Playlist(String),
    /// Channel name, resolved through a search
    Channel(String),
}

/// Per-video outcomes of a batch
#[derive(Debug, Clone)]
pub struct BatchResult<T> {
    results: BTreeMap<String, T>,
    failures: BTreeMap<String, String>,
}

impl<T> BatchResult<T> {
    fn new() -> Self {
        Self {
            results: BTreeMap::new(),
            failures: BTreeMap::new(),
        }
    }

    pub fn get(&self, video_id: &str) -> Option<&T> {
        self.results.get(video_id)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Successful results ordered by video id
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.results.iter().map(|(id, value)| (id.as_str(), value))
    }

    pub fn into_inner(self) -> BTreeMap<String, T> {
        self.results
    }

    /// Video id to error message for the videos skipped under continue-on-error
    pub fn failures(&self) -> &BTreeMap<String, String> {
        &self.failures
    }
}

/// Runs the single video pipeline over every video of a playlist or channel
#[derive(Clone)]
pub struct BatchOrchestrator {
    api: TranscriptApi,
    paginator: ListingPaginator,
}

impl BatchOrchestrator {
    pub fn new(client: Arc<dyn YoutubeClient>) -> Self {
        Self::with_api(TranscriptApi::new(client))
    }

    /// Reuse an existing single video API and its client
    pub fn with_api(api: TranscriptApi) -> Self {
        let paginator = ListingPaginator::new(Arc::clone(api.client()));
        Self { api, paginator }
    }

    /// Transcript directory of every video of the target
    pub async fn list_transcripts(
        &self,
        request: &BatchRequest,
        target: &BatchTarget,
    ) -> Result<BatchResult<TranscriptDirectory>> {
        let cookies_path = request.cookies_path().map(Path::to_path_buf);

        self.run(request, target, move |api, video_id| {
            let cookies_path = cookies_path.clone();
            async move {
                match cookies_path {
                    Some(path) => api.list_transcripts_with_cookies(&video_id, &path).await,
                    None => api.list_transcripts(&video_id).await,
                }
            }
        })
        .await
    }

    /// Content of the first available transcript in the requested languages for every video
    pub async fn get_transcripts(
        &self,
        request: &BatchRequest,
        target: &BatchTarget,
        language_codes: &[&str],
    ) -> Result<BatchResult<TranscriptContent>> {
        let language_codes: Vec<String> = validate_language_codes(language_codes)?
            .into_iter()
            .map(str::to_string)
            .collect();
        let cookies_path = request.cookies_path().map(Path::to_path_buf);

        self.run(request, target, move |api, video_id| {
            let cookies_path = cookies_path.clone();
            let language_codes = language_codes.clone();
            async move {
                let codes: Vec<&str> = language_codes.iter().map(String::as_str).collect();
                match cookies_path {
                    Some(path) => api.get_transcript_with_cookies(&video_id, &path, &codes).await,
                    None => api.get_transcript(&video_id, &codes).await,
                }
            }
        })
        .await
    }

    async fn video_ids(&self, request: &BatchRequest, target: &BatchTarget) -> Result<Vec<String>> {
        match target {
            BatchTarget::Playlist(playlist_id) => self.paginator.video_ids(playlist_id, request.api_key()).await,
            BatchTarget::Channel(name) => self.paginator.channel_video_ids(name, request.api_key()).await,
        }
    }

    /// Spawn one task per video and merge outcomes as they complete
    async fn run<T, F, Fut>(&self, request: &BatchRequest, target: &BatchTarget, task: F) -> Result<BatchResult<T>>
    where
        T: Send + 'static,
        F: Fn(TranscriptApi, String) -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let video_ids = self.video_ids(request, target).await?;

        let mut seen = HashSet::new();
        let mut tasks = JoinSet::new();
        let mut task_videos: HashMap<TaskId, String> = HashMap::new();
        for video_id in video_ids {
            if !seen.insert(video_id.clone()) {
                continue;
            }
            let work = task(self.api.clone(), video_id.clone());
            let handle = tasks.spawn({
                let video_id = video_id.clone();
                async move { (video_id, work.await) }
            });
            task_videos.insert(handle.id(), video_id);
        }

        tracing::info!("Retrieving transcripts for {} videos of {:?}", tasks.len(), target);

        let mut batch = BatchResult::new();
        while let Some(joined) = tasks.join_next().await {
            let (video_id, outcome) = match joined {
                Ok(pair) => pair,
                Err(e) => {
                    let video_id = task_videos.remove(&e.id()).unwrap_or_default();
                    let err = TranscriptError::from(
                        RetrievalError::new(ErrorKind::TaskFailed)
                            .with_source(e)
                            .for_video(&video_id),
                    );
                    (video_id, Err(err))
                }
            };

            match outcome {
                Ok(value) => {
                    batch.results.insert(video_id, value);
                }
                Err(err) if request.stop_on_error() => {
                    tracing::debug!("Stopping batch after failure of {}", video_id);
                    tasks.abort_all();
                    return Err(err);
                }
                Err(err) => {
                    tracing::warn!("Skipping {}: {}", video_id, err);
                    batch.failures.insert(video_id, err.to_string());
                }
            }
        }

        tracing::info!(
            "Retrieved {} transcripts, {} failed",
            batch.len(),
            batch.failures.len()
        );

        Ok(batch)
    }
}
