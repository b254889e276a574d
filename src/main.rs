use std::num::NonZeroU32;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use multiplier_lens::api::MultiplierTracker;
use multiplier_lens::core::ocr::TesseractRecognizer;
use multiplier_lens::core::{AppConfig, CropRegion, ExtractionCache, Outcome};

#[derive(Parser)]
#[command(name = "multiplier-lens")]
#[command(about = "Read crash-game multipliers from a recording and estimate above/under odds")]
struct Cli {
    /// JSON5 config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Video to read the multiplier history from
    #[arg(long)]
    video: Option<PathBuf>,
    /// Run recognition on every Nth frame
    #[arg(long)]
    stride: Option<NonZeroU32>,
    /// Region of interest as x,y,width,height
    #[arg(long)]
    roi: Option<CropRegion>,
    /// Threshold separating "above" from "under"
    #[arg(long)]
    threshold: Option<f64>,
    /// Skip the video and use manual values only
    #[arg(long)]
    no_video: bool,
    /// Append a manual multiplier (repeatable)
    #[arg(long = "add", value_name = "VALUE")]
    add: Vec<String>,
    /// Print a prediction for one side
    #[arg(long, value_enum)]
    predict: Option<Side>,
    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Side {
    Above,
    Under,
}

impl From<Side> for Outcome {
    fn from(side: Side) -> Self {
        match side {
            Side::Above => Outcome::Above,
            Side::Under => Outcome::Under,
        }
    }
}

fn main() -> Result<()> {
    multiplier_lens::init_logging();
    let cli = Cli::parse();

    let config = build_config(&cli)?;
    let recognizer = TesseractRecognizer::from_config(&config.ocr);
    let mut cache = ExtractionCache::new();
    let mut tracker = MultiplierTracker::new(config);

    if tracker.config().use_video {
        println!(
            "Reading multipliers from {}...",
            tracker.config().video_path.display()
        );
        let count = tracker.load_video(&mut cache, &recognizer);
        println!("Extracted {} multipliers", count);
    }

    for value in &cli.add {
        match tracker.add_manual(value) {
            Ok(added) => println!("Added {} to history", added),
            Err(e) => eprintln!("{}", e),
        }
    }

    let report = tracker.report();
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println!("Recent History (last {})", tracker.config().recent_window);
    if report.recent.is_empty() {
        println!("No data available.");
    } else {
        let recent: Vec<String> = report.recent.iter().map(|v| v.to_string()).collect();
        println!("[{}]", recent.join(", "));
    }

    let label = report.threshold_label();
    println!();
    println!("Prediction Confidence");
    println!("Above {}: {}", label, report.above_percent);
    println!("Under {}: {}", label, report.under_percent);

    if let Some(side) = cli.predict {
        println!();
        println!("{}", tracker.predict(side.into()));
    }

    Ok(())
}

fn build_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => AppConfig::default(),
    };

    if let Some(video) = &cli.video {
        config.video_path = video.clone();
    }
    if let Some(stride) = cli.stride {
        config.frame_stride = stride;
    }
    if let Some(roi) = cli.roi {
        config.crop_region = Some(roi);
    }
    if let Some(threshold) = cli.threshold {
        config.threshold = threshold;
    }
    if cli.no_video {
        config.use_video = false;
    }

    config.validate()?;
    Ok(config)
}
