use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;

use moodmirror_core::camera::infrastructure::nokhwa_frame_source::{
    list_devices, CaptureConfig, NokhwaFrameSource,
};
use moodmirror_core::emotion::domain::emotion::Emotion;
use moodmirror_core::emotion::domain::emotion_detector::EmotionDetector;
use moodmirror_core::emotion::infrastructure::detector_factory::{create_detector, ModelPaths};
use moodmirror_core::pipeline::inference_loop::{InferenceLoop, LoopConfig};
use moodmirror_core::pipeline::infrastructure::threaded_loop_runner::{LoopEvent, LoopRunner};
use moodmirror_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use moodmirror_core::presentation::image_writer::save_snapshot;
use moodmirror_core::presentation::infrastructure::image_file_writer::ImageFileWriter;
use moodmirror_core::shared::constants::{
    DEFAULT_CONFIDENCE, DEFAULT_DEVICE_INDEX, DEFAULT_FAILURE_THRESHOLD, DEFAULT_OPEN_TIMEOUT,
    EMOTION_MODEL, FACE_MODEL,
};

/// Longest stretch `watch` blocks before re-checking for Ctrl-C.
const INTERRUPT_POLL: Duration = Duration::from_millis(200);

/// Live facial emotion recognition from a webcam.
#[derive(Parser, Debug)]
#[command(name = "moodmirror")]
struct Cli {
    /// Camera device index.
    #[arg(long, default_value_t = DEFAULT_DEVICE_INDEX)]
    device: u32,

    /// Tick period in milliseconds.
    #[arg(long, default_value = "50")]
    tick_ms: u64,

    /// Max wait for a frame per tick (defaults to the tick period).
    #[arg(long)]
    read_timeout_ms: Option<u64>,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE)]
    confidence: f64,

    /// Consecutive skipped ticks before reporting a read failure.
    #[arg(long, default_value_t = DEFAULT_FAILURE_THRESHOLD)]
    failure_threshold: usize,

    /// Seconds to run (0 = until Ctrl-C).
    #[arg(long, default_value = "10")]
    duration: u64,

    /// Save annotated frames to this directory.
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Save every Nth rendered frame when --snapshot-dir is set.
    #[arg(long, default_value = "20")]
    snapshot_every: u64,

    /// List available cameras and exit.
    #[arg(long)]
    list_devices: bool,

    /// Directory with pre-downloaded model files.
    #[arg(long)]
    models_dir: Option<PathBuf>,
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
    validate(&cli)?;

    if cli.list_devices {
        return print_devices();
    }

    let detector = build_detector(&cli)?;
    let period = Duration::from_millis(cli.tick_ms);
    let capture = CaptureConfig {
        read_timeout: cli.read_timeout_ms.map_or(period, Duration::from_millis),
        open_timeout: DEFAULT_OPEN_TIMEOUT,
        ..CaptureConfig::default()
    };
    let loop_config = LoopConfig {
        device_index: cli.device,
        failure_threshold: cli.failure_threshold,
    };

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = interrupted.clone();
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))?;

    let mut runner = LoopRunner::spawn(period, move |presenter| {
        Ok(InferenceLoop::new(
            Box::new(NokhwaFrameSource::new(capture)),
            detector,
            presenter,
            Box::new(StdoutPipelineLogger::default()),
            loop_config,
        ))
    })?;
    runner.start();

    let result = watch(&runner, &cli, &interrupted);
    runner.stop();
    runner.shutdown();
    result
}

/// Consumes runner events until the duration is up, Ctrl-C is pressed or
/// the camera fails. Returning lets the caller stop and shut down the runner.
fn watch(
    runner: &LoopRunner,
    cli: &Cli,
    interrupted: &AtomicBool,
) -> Result<(), Box<dyn std::error::Error>> {
    let deadline = (cli.duration > 0).then(|| Instant::now() + Duration::from_secs(cli.duration));
    let writer = ImageFileWriter::new();
    let mut rendered: u64 = 0;
    let mut last_emotion: Option<Option<Emotion>> = None;

    loop {
        let Some(wait) = next_wait(deadline, interrupted, Instant::now()) else {
            return Ok(());
        };
        let Ok(event) = runner.events().recv_timeout(wait) else {
            continue;
        };

        match event {
            LoopEvent::Started {
                device_index,
                name,
                width,
                height,
            } => log::info!("Streaming from camera {device_index} ({name}, {width}x{height})"),
            LoopEvent::StartFailed(e) => return Err(e.into()),
            LoopEvent::BuildFailed(e) => return Err(e.into()),
            LoopEvent::Frame(frame, annotation) => {
                rendered += 1;
                log::debug!("Frame {}: {}", frame.index(), annotation.headline());
                if last_emotion != Some(annotation.dominant_emotion()) {
                    log::info!("{}", annotation.headline());
                    last_emotion = Some(annotation.dominant_emotion());
                }
                if let Some(dir) = &cli.snapshot_dir {
                    if rendered % cli.snapshot_every == 0 {
                        match save_snapshot(&writer, dir, &frame, &annotation) {
                            Ok(path) => log::info!("Saved {}", path.display()),
                            Err(e) => log::warn!("Snapshot failed: {e}"),
                        }
                    }
                }
            }
            LoopEvent::Status(message) => log::warn!("{message}"),
            LoopEvent::TicksSkipped(n) => log::debug!("Skipped {n} tick(s)"),
            LoopEvent::Exited => return Ok(()),
            LoopEvent::Ready | LoopEvent::Cleared | LoopEvent::Stopped => {}
        }
    }
}

/// How long to block for the next event, or `None` once it is time to stop.
fn next_wait(deadline: Option<Instant>, interrupted: &AtomicBool, now: Instant) -> Option<Duration> {
    if interrupted.load(Ordering::SeqCst) {
        log::info!("Interrupted; stopping camera");
        return None;
    }
    match deadline {
        Some(deadline) if now >= deadline => None,
        Some(deadline) => Some((deadline - now).min(INTERRUPT_POLL)),
        None => Some(INTERRUPT_POLL),
    }
}

fn build_detector(cli: &Cli) -> Result<Box<dyn EmotionDetector>, Box<dyn std::error::Error>> {
    let bundled = cli.models_dir.as_deref();
    log::info!("Resolving model: {}", FACE_MODEL.name);
    let face = FACE_MODEL.resolve(bundled, Some(Box::new(download_progress)))?;
    log::info!("Resolving model: {}", EMOTION_MODEL.name);
    let emotion = EMOTION_MODEL.resolve(bundled, Some(Box::new(download_progress)))?;

    create_detector(&ModelPaths { face, emotion }, cli.confidence)
}

fn print_devices() -> Result<(), Box<dyn std::error::Error>> {
    let devices = list_devices()?;
    if devices.is_empty() {
        println!("No cameras found");
    }
    for device in devices {
        println!("{}: {} ({})", device.index, device.name, device.description);
    }
    Ok(())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.tick_ms == 0 {
        return Err("Tick period must be positive".into());
    }
    if cli.read_timeout_ms == Some(0) {
        return Err("Read timeout must be positive".into());
    }
    if !(0.0..=1.0).contains(&cli.confidence) {
        return Err(format!(
            "Confidence must be between 0.0 and 1.0, got {}",
            cli.confidence
        )
        .into());
    }
    if cli.failure_threshold == 0 {
        return Err("Failure threshold must be positive".into());
    }
    if cli.snapshot_every == 0 {
        return Err("Snapshot interval must be positive".into());
    }
    if let Some(dir) = &cli.models_dir {
        if !dir.is_dir() {
            return Err(format!("Models directory not found: {}", dir.display()).into());
        }
    }
    Ok(())
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = downloaded as f64 / total as f64 * 100.0;
        eprint!("\rDownloading model: {pct:.0}%");
        if downloaded >= total {
            eprintln!();
        }
    }
}
