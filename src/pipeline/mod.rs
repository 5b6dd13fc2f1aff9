use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;

use crate::clean::{GeminiCleaner, TranscriptCleaner, API_KEY_ENV};
use crate::config::Config;
use crate::fetch::{TranscriptSource, YoutubeTranscriptSource};
use crate::format::{render_transcript, FormatOptions};
use crate::output::TranscriptStore;
use crate::video::VideoId;
use crate::{Result, TubescrubError};

/// Outcome of a pipeline run
#[derive(Debug)]
pub struct PipelineReport {
    pub video_id: VideoId,

    /// Video title, when the oEmbed lookup resolved one
    pub title: Option<String>,

    pub segment_count: usize,

    /// Seconds of video covered by the transcript
    pub span_seconds: f64,

    pub raw_path: PathBuf,
    pub cleaned_path: Option<PathBuf>,

    pub raw_transcript: String,
    pub cleaned_transcript: Option<String>,

    pub completed_at: DateTime<Utc>,
}

/// The transcript cleaning pipeline
///
/// Runs the stages strictly in sequence: extract the video id, fetch the
/// segment sequence, render the raw transcript, persist it, send it through
/// the cleaning transform, persist the result. The raw artifact is written
/// before the cleaning call, so a cleaning failure still leaves a complete
/// raw transcript behind.
pub struct CleaningPipeline {
    source: Box<dyn TranscriptSource>,
    cleaner: Option<Box<dyn TranscriptCleaner>>,
    store: TranscriptStore,
    options: FormatOptions,
    show_progress: bool,
}

struct FetchOutcome {
    video_id: VideoId,
    title: Option<String>,
    segment_count: usize,
    span_seconds: f64,
    raw_transcript: String,
    raw_path: PathBuf,
}

impl CleaningPipeline {
    /// Create the production pipeline; without an API key only `fetch` works
    pub fn new(config: &Config, api_key: Option<String>) -> Self {
        let client = Client::new();

        let source = YoutubeTranscriptSource::new(
            client.clone(),
            config.transcript.language.clone(),
        );

        let cleaner = api_key.map(|key| {
            Box::new(GeminiCleaner::new(
                client,
                key,
                &config.api,
                config.transcript.keep_timestamps,
            )) as Box<dyn TranscriptCleaner>
        });

        Self {
            source: Box::new(source),
            cleaner,
            store: TranscriptStore::new(&config.app.output_dir),
            options: config.format_options(),
            show_progress: true,
        }
    }

    /// Create a pipeline from explicit components, used to substitute
    /// stand-ins for the network-calling stages
    pub fn with_components(
        source: Box<dyn TranscriptSource>,
        cleaner: Option<Box<dyn TranscriptCleaner>>,
        store: TranscriptStore,
        options: FormatOptions,
    ) -> Self {
        Self {
            source,
            cleaner,
            store,
            options,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Run the full pipeline: fetch, render, persist raw, clean, persist cleaned
    pub async fn run(&self, input: &str) -> Result<PipelineReport> {
        let cleaner = self
            .cleaner
            .as_deref()
            .ok_or(TubescrubError::MissingApiKey {
                env_var: API_KEY_ENV,
            })?;

        let fetched = self.fetch_stage(input).await?;

        let spinner = self.spinner("Cleaning transcript...");
        let cleaned = cleaner.clean(&fetched.raw_transcript).await;
        finish(spinner);
        let cleaned = cleaned?;

        let cleaned_path = self.store.write_cleaned(&fetched.video_id, &cleaned)?;
        tracing::info!("Cleaned transcript saved to {}", cleaned_path.display());

        Ok(self.report(fetched, Some((cleaned_path, cleaned))))
    }

    /// Run the fetch half only: fetch, render, persist raw
    pub async fn fetch(&self, input: &str) -> Result<PipelineReport> {
        let fetched = self.fetch_stage(input).await?;
        Ok(self.report(fetched, None))
    }

    async fn fetch_stage(&self, input: &str) -> Result<FetchOutcome> {
        let video_id = VideoId::extract(input)?;
        tracing::info!("Video id: {}", video_id);

        let title = self.source.video_title(&video_id).await;
        if let Some(title) = &title {
            tracing::info!("Title: {}", title);
        }

        let spinner = self.spinner("Fetching transcript...");
        let segments = self.source.fetch_transcript(&video_id).await;
        finish(spinner);
        let segments = segments?;

        let span_seconds = segments
            .last()
            .map(|segment| segment.start + segment.duration)
            .unwrap_or(0.0);

        let raw_transcript = render_transcript(&segments, self.options);
        if raw_transcript.is_empty() {
            return Err(TubescrubError::EmptyTranscript {
                video_id: video_id.to_string(),
            });
        }

        let raw_path = self.store.write_raw(&video_id, &raw_transcript)?;
        tracing::info!("Raw transcript saved to {}", raw_path.display());

        Ok(FetchOutcome {
            video_id,
            title,
            segment_count: segments.len(),
            span_seconds,
            raw_transcript,
            raw_path,
        })
    }

    fn report(
        &self,
        fetched: FetchOutcome,
        cleaned: Option<(PathBuf, String)>,
    ) -> PipelineReport {
        let (cleaned_path, cleaned_transcript) = match cleaned {
            Some((path, text)) => (Some(path), Some(text)),
            None => (None, None),
        };

        PipelineReport {
            video_id: fetched.video_id,
            title: fetched.title,
            segment_count: fetched.segment_count,
            span_seconds: fetched.span_seconds,
            raw_path: fetched.raw_path,
            cleaned_path,
            raw_transcript: fetched.raw_transcript,
            cleaned_transcript,
            completed_at: Utc::now(),
        }
    }

    fn spinner(&self, message: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let progress = ProgressBar::new_spinner();
        progress.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        progress.enable_steady_tick(Duration::from_millis(120));
        progress.set_message(message.to_string());
        Some(progress)
    }
}

fn finish(spinner: Option<ProgressBar>) {
    if let Some(progress) = spinner {
        progress.finish_and_clear();
    }
}
