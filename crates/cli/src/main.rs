use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;

use touchguard_core::alarm::alarm_controller::AlarmController;
use touchguard_core::alarm::infrastructure::rodio_tone_sink::default_sink_factory;
use touchguard_core::detection::domain::face_detector::FaceDetector;
use touchguard_core::detection::domain::hand_detector::HandDetector;
use touchguard_core::detection::infrastructure::model_resolver;
use touchguard_core::detection::infrastructure::onnx_face_detector::{
    OnnxFaceDetector, DEFAULT_CONFIDENCE,
};
use touchguard_core::detection::infrastructure::onnx_hand_detector::{
    OnnxHandDetector, DEFAULT_PRESENCE_THRESHOLD,
};
use touchguard_core::detection::infrastructure::skip_frame_detector::SkipFrameFaceDetector;
use touchguard_core::monitor::config::{MonitorConfig, Sensitivity};
use touchguard_core::pipeline::frame_coordinator::FrameCoordinator;
use touchguard_core::pipeline::infrastructure::threaded_monitor_executor::ThreadedMonitorExecutor;
use touchguard_core::pipeline::status_listener::LogStatusListener;
use touchguard_core::pipeline::watch_session_use_case::WatchSessionUseCase;
use touchguard_core::video::infrastructure::ffmpeg_camera_source::FfmpegCameraSource;

/// Watches a camera stream and alerts when hands rest on the face.
#[derive(Parser)]
#[command(name = "touchguard")]
struct Cli {
    /// Camera device or recorded clip to watch.
    #[arg(default_value = "/dev/video0")]
    input: PathBuf,

    /// Seconds a hand must stay near the face before the alarm fires.
    #[arg(long, default_value = "1.0")]
    threshold: f64,

    /// Proximity sensitivity: low, medium, or high.
    #[arg(long, default_value = "medium")]
    sensitivity: String,

    /// Disable the audible alarm (status output only).
    #[arg(long)]
    no_sound: bool,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE)]
    confidence: f64,

    /// Hand presence threshold (0.0-1.0).
    #[arg(long, default_value_t = DEFAULT_PRESENCE_THRESHOLD)]
    presence: f64,

    /// Run face detection every Nth frame (1 = every frame).
    #[arg(long, default_value = "2")]
    skip_frames: usize,

    /// JSON config file; command-line flags are ignored for the values
    /// it provides.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory with bundled ONNX models (skips download).
    #[arg(long)]
    model_dir: Option<PathBuf>,
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
    let config = build_config(&cli)?;

    let face_detector = build_face_detector(&cli)?;
    let hand_detector = build_hand_detector(&cli)?;

    let alarm = AlarmController::new(default_sink_factory(), config.sound_enabled);
    let coordinator = FrameCoordinator::new(config, alarm, Box::new(LogStatusListener::new()));
    let camera = Box::new(FfmpegCameraSource::new(cli.input.clone()));

    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = cancelled.clone();
    ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))?;

    let mut session = WatchSessionUseCase::new(
        camera,
        face_detector,
        hand_detector,
        coordinator,
        Box::new(ThreadedMonitorExecutor),
        Some(cancelled),
    );

    log::info!(
        "touchguard starting: threshold {:.1}s, margin {:.2}, sound {} (Ctrl-C to stop)",
        config.touch_threshold_secs,
        config.proximity_margin,
        if config.sound_enabled { "on" } else { "off" }
    );
    session.execute()
}

fn build_config(cli: &Cli) -> Result<MonitorConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => MonitorConfig::from_json_file(path)?,
        None => {
            let margin = parse_sensitivity(&cli.sensitivity).margin();
            MonitorConfig::new(cli.threshold, margin, true)?
        }
    };
    if cli.no_sound {
        config.sound_enabled = false;
    }
    Ok(config)
}

fn parse_sensitivity(s: &str) -> Sensitivity {
    match s.to_lowercase().as_str() {
        "low" => Sensitivity::Low,
        "high" => Sensitivity::High,
        _ => Sensitivity::Medium,
    }
}

fn build_face_detector(cli: &Cli) -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error>> {
    let model_path = model_resolver::resolve_face_model(
        cli.model_dir.as_deref(),
        Some(Box::new(log_download_progress("face model"))),
    )?;
    let detector = OnnxFaceDetector::new(&model_path, cli.confidence)?;
    if cli.skip_frames > 1 {
        Ok(Box::new(SkipFrameFaceDetector::new(
            Box::new(detector),
            cli.skip_frames,
        )?))
    } else {
        Ok(Box::new(detector))
    }
}

fn build_hand_detector(cli: &Cli) -> Result<Box<dyn HandDetector>, Box<dyn std::error::Error>> {
    let model_path = model_resolver::resolve_hand_model(
        cli.model_dir.as_deref(),
        Some(Box::new(log_download_progress("hand model"))),
    )?;
    Ok(Box::new(OnnxHandDetector::new(&model_path, cli.presence)?))
}

/// Download progress logger, throttled to whole-percent steps.
fn log_download_progress(what: &'static str) -> impl Fn(u64, u64) + Send {
    let last_pct = std::sync::atomic::AtomicU64::new(u64::MAX);
    move |downloaded, total| {
        if total == 0 {
            return;
        }
        let pct = downloaded * 100 / total;
        if last_pct.swap(pct, Ordering::Relaxed) != pct {
            log::info!("downloading {what}: {pct}%");
        }
    }
}
