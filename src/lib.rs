//! Tubescrub - fetch a YouTube video's transcript and clean it up with Gemini
//!
//! This library fetches the caption transcript for a YouTube video, renders it
//! into a single raw text blob, sends that blob to the Gemini API for a
//! disfluency-removing rewrite, and persists both the raw and cleaned text.

pub mod clean;
pub mod cli;
pub mod config;
pub mod fetch;
pub mod format;
pub mod output;
pub mod pipeline;
pub mod utils;
pub mod video;

pub use clean::{GeminiCleaner, TranscriptCleaner};
pub use config::Config;
pub use fetch::{TranscriptSegment, TranscriptSource, YoutubeTranscriptSource};
pub use format::{FormatOptions, JoinStyle};
pub use output::TranscriptStore;
pub use pipeline::{CleaningPipeline, PipelineReport};
pub use video::VideoId;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, TubescrubError>;

/// Everything that can go wrong between a URL and two files on disk
#[derive(thiserror::Error, Debug)]
pub enum TubescrubError {
    #[error("could not extract a video id from {0:?}")]
    InvalidUrl(String),

    #[error("missing API key: pass --api-key or set the {env_var} environment variable")]
    MissingApiKey { env_var: &'static str },

    #[error("subtitles are disabled for video {video_id}")]
    TranscriptsDisabled { video_id: String },

    #[error("no transcript found for video {video_id} in language {language:?}")]
    NoTranscriptFound { video_id: String, language: String },

    #[error("video {video_id} is unavailable: {reason}")]
    VideoUnavailable { video_id: String, reason: String },

    #[error("transcript for video {video_id} is empty, nothing to clean")]
    EmptyTranscript { video_id: String },

    #[error("cleaning API rejected the credential: {message}")]
    ApiAuthentication { message: String },

    #[error("cleaning API quota exceeded: {message}")]
    ApiQuotaExceeded { message: String },

    #[error("cleaning API call failed: {message}")]
    ApiTransient { message: String },

    #[error("unexpected {service} response: {detail}")]
    UnexpectedResponse {
        service: &'static str,
        detail: String,
    },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("file operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}
