use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::format::{FormatOptions, JoinStyle};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Cleaning API configuration
    pub api: ApiConfig,

    /// Transcript fetching and rendering settings
    pub transcript: TranscriptConfig,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Gemini model used for the cleaning rewrite
    pub model: String,

    /// Base URL of the generative language API
    pub endpoint: String,

    /// Sampling temperature for the rewrite
    pub temperature: f32,

    /// Retry a transient API failure once before giving up
    pub retry_transient: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptConfig {
    /// Preferred caption language (auto-select if not set)
    pub language: Option<String>,

    /// Keep `[H:MM:SS]` timestamps in the raw transcript
    pub keep_timestamps: bool,

    /// How segment texts are joined
    pub join: JoinStyle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory the raw and cleaned artifacts are written to
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                model: "gemini-2.0-flash".to_string(),
                endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
                temperature: 0.3,
                retry_transient: true,
            },
            transcript: TranscriptConfig {
                language: None,
                keep_timestamps: false,
                join: JoinStyle::Space,
            },
            app: AppConfig {
                output_dir: PathBuf::from("transcripts"),
            },
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content =
                fs_err::read_to_string(&config_path).context("Failed to read config file")?;

            let config: Config =
                serde_yaml::from_str(&content).context("Failed to parse config file")?;

            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save().await?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub async fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;

        fs_err::write(&config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Location of the configuration file
    pub fn path() -> Result<PathBuf> {
        Self::config_path()
    }

    /// Get configuration file path
    fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join("tubescrub").join("config.yaml"))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.api.model.is_empty() {
            anyhow::bail!("Cleaning model must be configured");
        }

        if !self.api.endpoint.starts_with("http") {
            anyhow::bail!("API endpoint must be an HTTP(S) URL");
        }

        if !(0.0..=2.0).contains(&self.api.temperature) {
            anyhow::bail!("Temperature must be between 0.0 and 2.0");
        }

        Ok(())
    }

    /// Rendering options implied by the transcript settings
    pub fn format_options(&self) -> FormatOptions {
        FormatOptions {
            join: self.transcript.join,
            timestamps: self.transcript.keep_timestamps,
        }
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Model: {}", self.api.model);
        println!("  Endpoint: {}", self.api.endpoint);
        println!("  Temperature: {}", self.api.temperature);
        println!("  Retry transient failures: {}", self.api.retry_transient);
        if let Some(language) = &self.transcript.language {
            println!("  Language: {}", language);
        } else {
            println!("  Language: auto");
        }
        println!("  Keep timestamps: {}", self.transcript.keep_timestamps);
        println!("  Output directory: {}", self.app.output_dir.display());
    }
}
