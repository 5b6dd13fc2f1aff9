use anyhow::Result;
use clap::Parser;
use console::style;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tubescrub::clean::API_KEY_ENV;
use tubescrub::cli::{Cli, Commands};
use tubescrub::format::JoinStyle;
use tubescrub::pipeline::{CleaningPipeline, PipelineReport};
use tubescrub::utils::format_duration;
use tubescrub::{Config, TubescrubError};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "tubescrub=debug"
    } else {
        "tubescrub=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().await?;

    match cli.command {
        Commands::Clean {
            url,
            api_key,
            output_dir,
            language,
            timestamps,
            join,
            model,
            print,
        } => {
            let config = apply_overrides(config, output_dir, language, timestamps, join, model);
            let api_key = api_key.ok_or(TubescrubError::MissingApiKey {
                env_var: API_KEY_ENV,
            })?;

            let pipeline =
                CleaningPipeline::new(&config, Some(api_key)).with_progress(!cli.quiet);

            tracing::info!("Starting transcript cleaning for: {}", url);
            let report = pipeline.run(&url).await?;
            tracing::debug!("Run completed at {}", report.completed_at);

            print_summary(&report);
            println!("Raw transcript saved to: {}", report.raw_path.display());
            if let Some(path) = &report.cleaned_path {
                println!(
                    "{} {}",
                    style("Cleaned transcript saved to:").green(),
                    path.display()
                );
            }

            if print {
                if let Some(cleaned) = &report.cleaned_transcript {
                    println!("\n{}", cleaned);
                }
            }
        }
        Commands::Fetch {
            url,
            output_dir,
            language,
            timestamps,
            join,
            print,
        } => {
            let config = apply_overrides(config, output_dir, language, timestamps, join, None);
            let pipeline = CleaningPipeline::new(&config, None).with_progress(!cli.quiet);

            tracing::info!("Fetching transcript for: {}", url);
            let report = pipeline.fetch(&url).await?;

            print_summary(&report);
            println!(
                "{} {}",
                style("Raw transcript saved to:").green(),
                report.raw_path.display()
            );

            if print {
                println!("\n{}", report.raw_transcript);
            }
        }
        Commands::Config { show } => {
            if show {
                config.display();
            } else {
                println!("Edit the config file to change settings:");
                println!("  {}", Config::path()?.display());
            }
        }
    }

    Ok(())
}

fn apply_overrides(
    mut config: Config,
    output_dir: Option<PathBuf>,
    language: Option<String>,
    timestamps: bool,
    join: Option<JoinStyle>,
    model: Option<String>,
) -> Config {
    if let Some(output_dir) = output_dir {
        config.app.output_dir = output_dir;
    }
    if let Some(language) = language {
        config.transcript.language = Some(language);
    }
    if timestamps {
        config.transcript.keep_timestamps = true;
    }
    if let Some(join) = join {
        config.transcript.join = join;
    }
    if let Some(model) = model {
        config.api.model = model;
    }
    config
}

fn print_summary(report: &PipelineReport) {
    if let Some(title) = &report.title {
        println!("{} {}", style("Video:").bold(), title);
    }
    println!(
        "Fetched {} segments spanning {}",
        report.segment_count,
        format_duration(report.span_seconds)
    );
}
