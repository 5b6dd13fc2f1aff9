use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::format::JoinStyle;

#[derive(Parser)]
#[command(
    name = "tubescrub",
    about = "Fetch YouTube transcripts and clean them up with the Gemini API",
    version,
    long_about = "A CLI tool that fetches the caption transcript of a YouTube video, saves the raw text, and sends it through the Gemini API to strip filler words and disfluencies. Both the raw and the cleaned transcript are written to the output directory, keyed by the video id."
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
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch a transcript, clean it with Gemini, and save both versions
    Clean {
        /// YouTube URL or bare video id
        #[arg(value_name = "URL_OR_ID")]
        url: String,

        /// Gemini API key
        #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, value_name = "KEY")]
        api_key: Option<String>,

        /// Output directory for the transcript files
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Caption language to fetch (auto-select if not specified)
        #[arg(short, long, value_name = "LANG")]
        language: Option<String>,

        /// Keep [H:MM:SS] timestamps in the raw transcript
        #[arg(long)]
        timestamps: bool,

        /// How segment texts are joined in the raw transcript
        #[arg(long, value_enum, value_name = "STYLE")]
        join: Option<JoinStyle>,

        /// Override the cleaning model from the config file
        #[arg(long, value_name = "MODEL")]
        model: Option<String>,

        /// Print the cleaned transcript to stdout as well
        #[arg(long)]
        print: bool,
    },

    /// Fetch and save the raw transcript only (no API key required)
    Fetch {
        /// YouTube URL or bare video id
        #[arg(value_name = "URL_OR_ID")]
        url: String,

        /// Output directory for the transcript file
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Caption language to fetch (auto-select if not specified)
        #[arg(short, long, value_name = "LANG")]
        language: Option<String>,

        /// Keep [H:MM:SS] timestamps in the raw transcript
        #[arg(long)]
        timestamps: bool,

        /// How segment texts are joined in the raw transcript
        #[arg(long, value_enum, value_name = "STYLE")]
        join: Option<JoinStyle>,

        /// Print the raw transcript to stdout as well
        #[arg(long)]
        print: bool,
    },

    /// Show the effective configuration
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}
