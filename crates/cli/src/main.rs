use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::Parser;
use crossbeam_channel::{Receiver, Sender};

use motionguard_core::detection::infrastructure::frame_difference_detector::{
    DetectorConfig, FrameDifferenceDetector,
};
use motionguard_core::pipeline::detect_motion_use_case::DetectMotionUseCase;
use motionguard_core::pipeline::infrastructure::threaded_pipeline_executor::ThreadedPipelineExecutor;
use motionguard_core::pipeline::pipeline_executor::PipelineConfig;
use motionguard_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use motionguard_core::rendering::domain::frame_display::FrameDisplay;
use motionguard_core::rendering::frame_renderer::{FrameRenderer, RenderConfig};
use motionguard_core::rendering::infrastructure::annotator_factory::RenderMode;
use motionguard_core::rendering::infrastructure::cancel_keys::CancelKeys;
use motionguard_core::rendering::infrastructure::headless_display::HeadlessDisplay;
use motionguard_core::rendering::infrastructure::image_sequence_display::ImageSequenceDisplay;
use motionguard_core::shared::constants::{
    DISPLAY_WAIT_MS, FRAME_DELAY_MS, PRIVACY_BLUR_KERNEL, QUEUE_CAPACITY, REFRESH_INTERVAL,
};
use motionguard_core::video::domain::video_reader::VideoReader;
use motionguard_core::video::infrastructure::image_sequence_reader::ImageSequenceReader;

/// Motion detection for video files and image sequences.
///
/// Press Ctrl-C, or type `q` and Enter, to stop.
#[derive(Parser, Debug)]
#[command(name = "motionguard")]
struct Cli {
    /// Input video file or directory of images.
    input: PathBuf,

    /// How motion regions are marked: boxes or privacy.
    #[arg(long, default_value = "privacy")]
    mode: String,

    /// Gaussian kernel size for privacy blur (must be odd).
    #[arg(long, default_value_t = PRIVACY_BLUR_KERNEL)]
    blur_strength: usize,

    /// Frames between baseline refreshes.
    #[arg(long, default_value_t = REFRESH_INTERVAL)]
    refresh_interval: u64,

    /// Delay after each frame read, in milliseconds (0 disables pacing).
    #[arg(long, default_value_t = FRAME_DELAY_MS)]
    frame_delay_ms: u64,

    /// How long to wait for a cancel key after each frame, in milliseconds.
    #[arg(long, default_value_t = DISPLAY_WAIT_MS)]
    display_wait_ms: u64,

    /// Capacity of each inter-stage queue (0 = unbounded).
    #[arg(long, default_value_t = QUEUE_CAPACITY)]
    queue_capacity: usize,

    /// Write rendered frames as PNGs into this directory.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Do not overlay the wall-clock timestamp.
    #[arg(long)]
    no_timestamp: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mode = validate(&cli)?;

    let reader = build_reader(&cli.input)?;
    let detector = FrameDifferenceDetector::new(DetectorConfig {
        refresh_interval: cli.refresh_interval,
        ..DetectorConfig::default()
    })?;

    let keys = CancelKeys::new(spawn_cancel_listeners()?);
    let display: Box<dyn FrameDisplay> = match &cli.output_dir {
        Some(dir) => Box::new(ImageSequenceDisplay::new(dir, keys)?),
        None => Box::new(HeadlessDisplay::new(keys)),
    };
    let render_config = RenderConfig {
        mode,
        blur_kernel: cli.blur_strength,
        timestamp: !cli.no_timestamp,
        wait: Duration::from_millis(cli.display_wait_ms),
    };
    let renderer = FrameRenderer::from_config(&render_config, display);

    let config = PipelineConfig {
        frame_delay: Duration::from_millis(cli.frame_delay_ms),
        queue_capacity: (cli.queue_capacity > 0).then_some(cli.queue_capacity),
        ..PipelineConfig::default()
    };

    let mut use_case = DetectMotionUseCase::new(
        reader,
        Box::new(detector),
        renderer,
        Box::new(ThreadedPipelineExecutor::new()),
        config,
    );
    let mut logger = StdoutPipelineLogger::default();
    let report = use_case.execute(&cli.input, &mut logger)?;

    if report.cancelled {
        log::info!("Stopped by user after {} frames", report.frames_rendered);
    }
    Ok(())
}

fn validate(cli: &Cli) -> Result<RenderMode, Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input not found: {}", cli.input.display()).into());
    }
    if cli.blur_strength == 0 || cli.blur_strength % 2 == 0 {
        return Err(format!(
            "Blur strength must be a positive odd integer, got {}",
            cli.blur_strength
        )
        .into());
    }
    if cli.refresh_interval == 0 {
        return Err("Refresh interval must be at least 1".into());
    }
    if let Some(dir) = &cli.output_dir {
        if dir.is_file() {
            return Err(format!("Output directory is a file: {}", dir.display()).into());
        }
    }
    Ok(cli.mode.parse::<RenderMode>()?)
}

fn build_reader(input: &Path) -> Result<Box<dyn VideoReader>, Box<dyn std::error::Error>> {
    if input.is_dir() {
        return Ok(Box::new(ImageSequenceReader::new()));
    }
    video_file_reader()
}

#[cfg(feature = "ffmpeg")]
fn video_file_reader() -> Result<Box<dyn VideoReader>, Box<dyn std::error::Error>> {
    use motionguard_core::video::infrastructure::ffmpeg_reader::FfmpegReader;
    Ok(Box::new(FfmpegReader::new()))
}

#[cfg(not(feature = "ffmpeg"))]
fn video_file_reader() -> Result<Box<dyn VideoReader>, Box<dyn std::error::Error>> {
    Err("Video files need the `ffmpeg` feature; pass a directory of images instead".into())
}

/// Feeds cancel requests from Ctrl-C and from a `q` line on stdin.
fn spawn_cancel_listeners() -> Result<Receiver<()>, Box<dyn std::error::Error>> {
    let (tx, rx) = crossbeam_channel::unbounded();

    let ctrlc_tx = tx.clone();
    ctrlc::set_handler(move || {
        let _ = ctrlc_tx.send(());
    })?;

    std::thread::spawn(move || watch_stdin(std::io::stdin().lock(), &tx));
    Ok(rx)
}

fn watch_stdin(input: impl BufRead, tx: &Sender<()>) {
    for line in input.lines() {
        let Ok(line) = line else { break };
        if line.trim().eq_ignore_ascii_case("q") {
            let _ = tx.send(());
            break;
        }
    }
}
