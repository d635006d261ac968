use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use imgbatch::app::App;
use imgbatch::intake::load_uploads;
use imgbatch::models::{
    BatchReport, Config, DuplicatePolicy, Quality, TargetFormat, TransformParameters,
};
use imgbatch::Error;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "imgbatch")]
#[command(about = "Reduce image quality or convert image formats, packaged as one ZIP archive")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Re-encode every image as JPEG at a lower quality, keeping its file name.
    Reduce {
        /// Quality level in [1, 100]. Defaults to IMGBATCH_DEFAULT_QUALITY.
        #[arg(long, short)]
        quality: Option<u8>,

        #[command(flatten)]
        common: CommonArgs,
    },
    /// Convert every image to PNG or JPEG.
    Convert {
        /// Target format: png or jpeg.
        #[arg(long, short, value_parser = parse_target_format)]
        format: TargetFormat,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Debug, Args)]
struct CommonArgs {
    /// Images to process (jpg, jpeg or png).
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,

    /// Directory the archive is written to. Overrides IMGBATCH_OUTPUT_DIR.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Write a side-by-side HTML preview of every image to this path.
    #[arg(long)]
    preview_html: Option<PathBuf>,

    /// How to handle two outputs with the same name: rename or replace.
    #[arg(long, value_parser = parse_duplicate_policy)]
    on_duplicate: Option<DuplicatePolicy>,

    /// Optional path to write a machine-readable JSON report.
    #[arg(long)]
    json_output: Option<PathBuf>,
}

fn parse_target_format(input: &str) -> std::result::Result<TargetFormat, String> {
    input.parse().map_err(|e: Error| e.to_string())
}

fn parse_duplicate_policy(input: &str) -> std::result::Result<DuplicatePolicy, String> {
    input.parse().map_err(|e: Error| e.to_string())
}

impl CliArgs {
    fn common(&self) -> &CommonArgs {
        match &self.command {
            Command::Reduce { common, .. } | Command::Convert { common, .. } => common,
        }
    }

    /// Resolve the batch parameters, falling back to `config` where a flag
    /// was omitted.
    fn parameters(&self, config: &Config) -> imgbatch::Result<TransformParameters> {
        match &self.command {
            Command::Reduce { quality, .. } => {
                let level = match quality {
                    Some(level) => Quality::new(*level)
                        .map_err(|e| Error::Config(format!("--quality: {}", e)))?,
                    None => config.default_quality,
                };
                Ok(TransformParameters::QualityReduction { level })
            }
            Command::Convert { format, .. } => {
                Ok(TransformParameters::FormatConversion { target: *format })
            }
        }
    }

    /// Apply CLI overrides on top of the environment configuration.
    fn apply_overrides(&self, mut config: Config) -> Config {
        let common = self.common();
        if let Some(dir) = &common.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(policy) = common.on_duplicate {
            config.duplicate_policy = policy;
        }
        config
    }
}

fn write_report(path: &Path, report: &BatchReport) -> imgbatch::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(report)?)?;
    info!("Wrote JSON report to {}", path.display());
    Ok(())
}

async fn run(args: CliArgs) -> imgbatch::Result<()> {
    let config = args.apply_overrides(Config::from_env()?);
    let params = args.parameters(&config)?;
    let common = args.common();

    let items = load_uploads(&common.files)?;
    let app = App::new(&config, common.preview_html.as_deref());

    match app.run(&items, &params).await? {
        Some(report) => {
            info!(
                "{} entries archived in {}",
                report.archive_entries.len(),
                report.location
            );
            if let Some(path) = &common.json_output {
                write_report(path, &report)?;
            }
        }
        None => info!("Nothing to do"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "imgbatch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting imgbatch");

    let args = CliArgs::parse();

    match run(args).await {
        Ok(()) => {
            info!("Batch completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Batch failed: {}", e);
            std::process::exit(1);
        }
    }
}
