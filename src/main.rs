use clap::{Parser, Subcommand};
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use watermark_my_images::config::Settings;
use watermark_my_images::watermark::{
    derive_with, ensure_watermark, font_size, FanoutSink, ImageCodec, MetadataSink, MetadataStore,
    QueryPolicy, SourceImage, TextMetrics, TracingSink, WatermarkOutcome, WatermarkPipeline,
};

/// Stamp a text watermark onto images
#[derive(Parser, Debug)]
#[command(name = "watermark-my-images")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to settings file (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Watermark images, reusing existing artifacts
    Apply {
        /// Regenerate artifacts that already exist
        #[arg(long)]
        force: bool,

        /// Source images
        #[arg(required = true)]
        sources: Vec<PathBuf>,
    },

    /// Print the artifact path for a path or URL
    Derive {
        /// Keep any ?query or #fragment
        #[arg(long)]
        keep_query: bool,

        path: String,
    },

    /// Print text geometry for a label and image width
    Measure {
        #[arg(long)]
        label: String,

        /// Image width in pixels
        #[arg(long)]
        width: u32,

        /// Text size percentage (defaults to the configured size)
        #[arg(long)]
        size: Option<f64>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum ApplyStatus {
    Created,
    Reused,
    Failed,
}

#[derive(Debug, Serialize)]
struct ApplyReport {
    source: String,
    status: ApplyStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    absolute_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct MeasureReport {
    font_size: u32,
    #[serde(flatten)]
    metrics: TextMetrics,
    canvas: (u32, u32),
}

fn main() {
    let args = Args::parse();

    let settings = match &args.config {
        Some(path) => Settings::from_file(path),
        None => Ok(Settings::default()),
    }
    .and_then(|settings| settings.validate().map(|_| settings))
    .unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::process::exit(1);
    });

    // Initialize logging subsystem
    watermark_my_images::logging::init_subscriber(&settings.logging);

    tracing::debug!(
        config_file = ?args.config,
        fonts_dir = %settings.fonts_dir.display(),
        jpeg_quality = settings.jpeg_quality,
        metadata_store = settings.metadata_store.is_some(),
        "Configuration loaded successfully"
    );

    let code = match args.command {
        Command::Apply { force, sources } => apply(&settings, &sources, force),
        Command::Derive { keep_query, path } => {
            let policy = if keep_query {
                QueryPolicy::Retain
            } else {
                QueryPolicy::Strip
            };
            println!("{}", derive_with(&path, policy));
            0
        }
        Command::Measure { label, width, size } => {
            measure(&label, width, size.unwrap_or(settings.watermark.size))
        }
    };

    std::process::exit(code);
}

fn apply(settings: &Settings, sources: &[PathBuf], force: bool) -> i32 {
    let mut sink = FanoutSink::new().with(Arc::new(TracingSink::new(settings.logs)));
    if let Some(path) = &settings.metadata_store {
        match MetadataStore::open(path) {
            Ok(store) => sink = sink.with(Arc::new(MetadataSink::new(Arc::new(store)))),
            Err(e) => {
                eprintln!("Failed to open metadata store: {}", e);
                return 1;
            }
        }
    }

    let pipeline = WatermarkPipeline::new(
        Arc::new(ImageCodec::new(settings.jpeg_quality)),
        settings.fonts_dir.clone(),
    )
    .with_sink(Arc::new(sink));

    let reports: Vec<ApplyReport> = sources
        .par_iter()
        .map(|path| {
            let source = SourceImage::new(path.clone());
            let outcome = ensure_watermark(&pipeline, &settings.watermark, &source, force);
            let source = path.display().to_string();

            match outcome {
                Ok(WatermarkOutcome::Created(artifact)) => ApplyReport {
                    source,
                    status: ApplyStatus::Created,
                    absolute_path: Some(artifact.absolute_path),
                    error: None,
                },
                Ok(WatermarkOutcome::Reused(artifact)) => {
                    tracing::info!(
                        source = %source,
                        absolute_path = %artifact.absolute_path,
                        "Reusing existing watermark"
                    );
                    ApplyReport {
                        source,
                        status: ApplyStatus::Reused,
                        absolute_path: Some(artifact.absolute_path),
                        error: None,
                    }
                }
                Err(e) => ApplyReport {
                    source,
                    status: ApplyStatus::Failed,
                    absolute_path: None,
                    error: Some(e.to_string()),
                },
            }
        })
        .collect();

    let failed = reports
        .iter()
        .filter(|r| matches!(r.status, ApplyStatus::Failed))
        .count();

    tracing::info!(
        total = reports.len(),
        failed = failed,
        "Watermarking finished"
    );

    print_json(&reports);
    i32::from(failed > 0)
}

fn measure(label: &str, width: u32, size: f64) -> i32 {
    let result = font_size(size, width).and_then(|font_size| {
        TextMetrics::compute(label, font_size).map(|metrics| MeasureReport {
            font_size,
            canvas: metrics.canvas_size(),
            metrics,
        })
    });

    match result {
        Ok(report) => {
            print_json(&report);
            0
        }
        Err(e) => {
            eprintln!("{}", e);
            1
        }
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}
