mod annotate;
mod report;
mod settings;
mod source;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{info, warn};
use needle_motion::{DetectionSink, FrameSource, MotionError, MotionPipeline, TimestampedFrame};
use report::ReportSink;
use source::ImageFileSource;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Replays still frames through the motion detector and reports what it sees.
#[derive(Parser, Debug)]
#[command(name = "needle_tester")]
struct Args {
    /// Detector settings (`.json` or `.toml`).
    #[arg(long, default_value = "conf.json")]
    conf: PathBuf,

    /// Read every file in this directory, in name order.
    #[arg(long, conflicts_with = "frames")]
    frames_dir: Option<PathBuf>,

    /// Write an annotated PNG per frame into this directory.
    #[arg(long)]
    annotate: Option<PathBuf>,

    /// Print every result to stdout as a JSON line.
    #[arg(long)]
    json: bool,

    /// Frame images, in playback order.
    frames: Vec<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    // --- 1. Settings ---
    let settings = settings::load(&args.conf)?;
    let config = settings.motion;
    info!(
        "watching {} of a {}x{} stream (delta threshold {}, min area {})",
        config.roi(),
        config.frame_size.width,
        config.frame_size.height,
        config.delta_threshold,
        config.min_area
    );
    if settings.capture.fps.is_some() || settings.capture.camera_warmup_time.is_some() {
        info!("ignoring capture settings {:?} while replaying files", settings.capture);
    }

    // --- 2. Frame source and outputs ---
    let mut source = match (&args.frames_dir, args.frames.is_empty()) {
        (Some(dir), _) => ImageFileSource::from_dir(dir)?,
        (None, false) => ImageFileSource::new(args.frames.clone()),
        (None, true) => bail!("no frames given; pass image paths or --frames-dir"),
    };
    if let Some(dir) = &args.annotate {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let mut sink = ReportSink::new(io::stdout().lock(), args.json);

    // --- 3. Detection loop ---
    let roi = config.roi();
    let mut pipeline = MotionPipeline::new(config)?;
    while let Some(next) = source.next_frame() {
        let TimestampedFrame { frame, timestamp } = match next {
            Ok(next) => next,
            Err(err) => {
                warn!("skipping unreadable frame: {err:#}");
                continue;
            }
        };

        let result = match pipeline.process(&frame, timestamp) {
            Ok(result) => result,
            Err(err @ MotionError::DimensionMismatch { .. }) => {
                warn!("skipping {:?}: {err}", source.current_path());
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        sink.on_result(&result);

        // --- 4. Annotation ---
        if let Some(dir) = &args.annotate {
            let canvas = annotate::render(&frame, &roi, &result);
            annotate::save(&canvas, &annotate::output_path(dir, source.current_path(), result.sequence()))?;
        }
    }

    info!(
        "processed {} frame(s), {} with movement",
        sink.frames(),
        sink.frames_with_movement()
    );
    Ok(())
}
