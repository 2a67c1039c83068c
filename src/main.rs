use std::path::PathBuf;
use std::process::ExitCode;

use ai_image_prep::config::{Credentials, Dataset, DatasetBuckets, RunConfig, DEFAULT_JPEG_QUALITY};
use ai_image_prep::processing;
use ai_image_prep::{Location, RunSummary, TransformConfig};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use prep_transform::config::{DEFAULT_SCALE, DEFAULT_SIDE, IMAGENET_MEAN};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Preprocess classifier images: resize, subtract channel means, scale, and save.
#[derive(Parser, Debug)]
#[command(name = "prep")]
#[command(version, about = "🖼️ Preprocess real and AI-generated images for classifier training")]
#[command(long_about = "Resize images to a fixed size, subtract per-channel means and rescale them into
8-bit RGB files. Sources and destinations are local directories or s3://bucket locations.
Images that fail to download, decode or upload are logged and skipped.")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process one source directory or bucket into one destination
    Run {
        /// Directory or s3://bucket[/prefix] holding raw images
        #[arg(value_name = "SOURCE")]
        source: String,

        /// Directory or s3://bucket[/prefix] receiving processed images
        #[arg(value_name = "DESTINATION")]
        destination: String,

        #[command(flatten)]
        transform: TransformArgs,
    },

    /// Process both datasets whose buckets are named by environment variables
    Datasets {
        /// Write processed real images here instead of the processed real bucket
        #[arg(long, value_name = "DIR")]
        local_out_real: Option<PathBuf>,

        /// Write processed generated images here instead of the processed generated bucket
        #[arg(long, value_name = "DIR")]
        local_out_generated: Option<PathBuf>,

        #[command(flatten)]
        transform: TransformArgs,
    },
}

#[derive(Args, Debug)]
struct TransformArgs {
    /// Output image width.
    #[arg(long, default_value_t = DEFAULT_SIDE)]
    width: u32,

    /// Output image height.
    #[arg(long, default_value_t = DEFAULT_SIDE)]
    height: u32,

    /// Per-channel means subtracted before scaling, in 0-255 pixel units.
    #[arg(long, value_name = "R,G,B", help = "Channel means as R,G,B (default: ImageNet means)")]
    mean: Option<String>,

    /// Scale factor applied after mean subtraction.
    #[arg(long, value_name = "FLOAT", help = "Scale factor after mean subtraction (default: 1/255)")]
    scale: Option<f32>,

    /// Output JPEG quality (1-100).
    #[arg(short, long, default_value_t = DEFAULT_JPEG_QUALITY, value_name = "INT")]
    quality: u8,
}

impl TransformArgs {
    fn to_config(&self) -> Result<TransformConfig> {
        let mean = match &self.mean {
            Some(raw) => parse_mean(raw)?,
            None => IMAGENET_MEAN.to_vec(),
        };
        let scale = self.scale.unwrap_or(DEFAULT_SCALE);
        TransformConfig::from_mean_slice(self.width, self.height, &mean, scale)
            .context("Invalid transform parameters")
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("ai_image_prep={log_level},prep={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(err) = run(cli.command) {
        tracing::error!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Run {
            source,
            destination,
            transform,
        } => {
            let config = RunConfig::new(
                Location::parse(&source)?,
                Location::parse(&destination)?,
                transform.to_config()?,
            )
            .with_jpeg_quality(transform.quality);

            let credentials = if config.uses_buckets() {
                Some(Credentials::from_env()?)
            } else {
                None
            };

            let summary = processing::run(&config, credentials.as_ref())
                .with_context(|| format!("Failed to process {source} -> {destination}"))?;
            report(&source, &summary);
        }
        Command::Datasets {
            local_out_real,
            local_out_generated,
            transform,
        } => {
            let transform_config = transform.to_config()?;
            let buckets = DatasetBuckets::from_env()?;
            let credentials = Credentials::from_env()?;

            for dataset in Dataset::ALL {
                let local_out = match dataset {
                    Dataset::Real => &local_out_real,
                    Dataset::Generated => &local_out_generated,
                };
                let destination = match local_out {
                    Some(dir) => Location::local(dir),
                    None => buckets.processed(dataset)?,
                };
                let config = RunConfig::new(buckets.source(dataset), destination, transform_config)
                    .with_jpeg_quality(transform.quality);

                let summary = processing::run(&config, Some(&credentials))
                    .with_context(|| format!("Failed to process {dataset} dataset"))?;
                report(dataset.name(), &summary);
            }
        }
    }
    Ok(())
}

fn report(label: &str, summary: &RunSummary) {
    println!(
        "{label}: {} processed, {} skipped ({} listed, {} not images)",
        summary.processed,
        summary.skipped_count(),
        summary.listed,
        summary.filtered
    );
}

/// Parse channel means like "123.68,116.78,103.94"
fn parse_mean(raw: &str) -> Result<Vec<f32>> {
    raw.split(',')
        .map(|part| {
            part.trim()
                .parse::<f32>()
                .map_err(|_| anyhow::anyhow!("Invalid channel mean: {}", part.trim()))
        })
        .collect()
}
