use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, select, Receiver, Sender, TrySendError};

use crate::detection::domain::face_box::FaceBox;
use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::hand_detector::HandDetector;
use crate::detection::domain::hand_landmarks::HandLandmarks;
use crate::pipeline::frame_coordinator::FrameCoordinator;
use crate::pipeline::monitor_executor::{ControlMessage, MonitorExecutor, MonitorRunConfig};
use crate::shared::frame::Frame;
use crate::video::domain::camera_source::CameraSource;

/// Room for detection results between a detector thread and the main
/// loop. Small on purpose: the main loop drains far faster than
/// detectors produce.
const RESULT_CHANNEL_CAPACITY: usize = 4;

/// Cadence of the cancellation check when all channels are quiet.
const IDLE_POLL_MS: u64 = 100;

/// Runs the monitor with dedicated threads for capture and each detector.
///
/// Layout: `camera ─fan-out→ {face detect, hand detect} → main [evaluate]`
///
/// Capture-to-detector channels hold a single frame and are fed with
/// `try_send`: when a detector lags, the newest frame is dropped in
/// favor of the one already queued (at most one interval older). Live
/// monitoring prefers freshness over completeness, so a backlog must
/// never form.
///
/// The main loop is the single owner of the coordinator; face results
/// are cached passively, hand results trigger one evaluation each, and
/// control messages mutate config between evaluations. This replaces
/// shared-field callback re-entrancy with a latest-of-two-streams merge.
pub struct ThreadedMonitorExecutor;

type SendError = Box<dyn std::error::Error + Send + Sync>;

impl MonitorExecutor for ThreadedMonitorExecutor {
    fn execute(
        &self,
        mut camera: Box<dyn CameraSource>,
        face_detector: Box<dyn FaceDetector>,
        hand_detector: Box<dyn HandDetector>,
        mut coordinator: FrameCoordinator,
        config: MonitorRunConfig,
    ) -> Result<(), Box<dyn std::error::Error>> {
        // Acquisition failure aborts start before any monitoring state
        // exists.
        let metadata = camera.open()?;
        log::info!(
            "watching {} ({}x{} @ {:.1} fps)",
            metadata.source,
            metadata.width,
            metadata.height,
            metadata.fps
        );

        let (face_frame_tx, face_frame_rx) = bounded::<Frame>(1);
        let (hand_frame_tx, hand_frame_rx) = bounded::<Frame>(1);
        let (face_tx, face_rx) = bounded::<Vec<FaceBox>>(RESULT_CHANNEL_CAPACITY);
        let (hand_tx, hand_rx) = bounded::<Vec<HandLandmarks>>(RESULT_CHANNEL_CAPACITY);

        let camera_handle = spawn_camera(
            camera,
            face_frame_tx,
            hand_frame_tx,
            config.cancelled.clone(),
        );
        let face_handle = spawn_face_detector(face_detector, face_frame_rx, face_tx);
        let hand_handle = spawn_hand_detector(hand_detector, hand_frame_rx, hand_tx);

        let epoch = Instant::now();
        run_main_loop(&mut coordinator, face_rx, hand_rx, &config, epoch);

        // Teardown, reached via Stop, the cancellation flag, or camera
        // end-of-stream: silence the alarm, clear the machine, release
        // the camera, drop the detectors.
        config.cancelled.store(true, Ordering::Relaxed);
        coordinator.reset();

        let mut camera = camera_handle
            .join()
            .map_err(|_| -> SendError { "camera thread panicked".into() })?;
        camera.close();
        face_handle
            .join()
            .map_err(|_| -> SendError { "face detector thread panicked".into() })?;
        hand_handle
            .join()
            .map_err(|_| -> SendError { "hand detector thread panicked".into() })?;

        Ok(())
    }
}

fn spawn_camera(
    mut camera: Box<dyn CameraSource>,
    face_tx: Sender<Frame>,
    hand_tx: Sender<Frame>,
    cancelled: Arc<AtomicBool>,
) -> std::thread::JoinHandle<Box<dyn CameraSource>> {
    std::thread::spawn(move || {
        for frame_result in camera.frames() {
            if cancelled.load(Ordering::Relaxed) {
                break;
            }
            match frame_result {
                Ok(frame) => {
                    if fan_out(&face_tx, frame.clone()) || fan_out(&hand_tx, frame) {
                        break; // a detector hung up
                    }
                }
                Err(e) => {
                    log::warn!("camera read failed: {e}");
                    break;
                }
            }
        }
        camera
    })
}

/// Offer a frame to a detector; returns true when the receiver is gone.
///
/// A full slot means the detector is still busy with the queued frame;
/// this one is skipped (the queued frame is at most one interval older).
fn fan_out(tx: &Sender<Frame>, frame: Frame) -> bool {
    match tx.try_send(frame) {
        Ok(()) => false,
        Err(TrySendError::Full(_)) => false,
        Err(TrySendError::Disconnected(_)) => true,
    }
}

fn spawn_face_detector(
    mut detector: Box<dyn FaceDetector>,
    frame_rx: Receiver<Frame>,
    result_tx: Sender<Vec<FaceBox>>,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        for frame in frame_rx {
            match detector.detect(&frame) {
                Ok(faces) => {
                    if result_tx.send(faces).is_err() {
                        break;
                    }
                }
                // Per-frame failures never kill the loop: log, skip the
                // frame, and let the cached result stand.
                Err(e) => log::warn!(
                    "face detection failed on frame {} (t={:.2}s): {e}",
                    frame.index(),
                    frame.timestamp()
                ),
            }
        }
    })
}

fn spawn_hand_detector(
    mut detector: Box<dyn HandDetector>,
    frame_rx: Receiver<Frame>,
    result_tx: Sender<Vec<HandLandmarks>>,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        for frame in frame_rx {
            match detector.detect(&frame) {
                Ok(hands) => {
                    if result_tx.send(hands).is_err() {
                        break;
                    }
                }
                Err(e) => log::warn!(
                    "hand detection failed on frame {} (t={:.2}s): {e}",
                    frame.index(),
                    frame.timestamp()
                ),
            }
        }
    })
}

/// The single-owner evaluation loop.
///
/// Face results refresh the cache; hand results trigger one evaluation
/// each at the current monotonic time; control messages mutate config
/// between evaluations. Runs until cancelled, stopped, or the camera
/// stream ends (both result channels disconnect).
fn run_main_loop(
    coordinator: &mut FrameCoordinator,
    mut face_rx: Receiver<Vec<FaceBox>>,
    mut hand_rx: Receiver<Vec<HandLandmarks>>,
    config: &MonitorRunConfig,
    epoch: Instant,
) {
    let mut controls_rx = config.controls.clone();
    let mut face_open = true;
    let mut hand_open = true;

    while face_open || hand_open {
        if config.cancelled.load(Ordering::Relaxed) {
            break;
        }
        select! {
            recv(face_rx) -> msg => match msg {
                Ok(faces) => coordinator.on_faces(faces),
                Err(_) => {
                    // Disconnected receivers are always ready; swap in a
                    // silent one so the select doesn't spin.
                    face_open = false;
                    face_rx = crossbeam_channel::never();
                }
            },
            recv(hand_rx) -> msg => match msg {
                Ok(hands) => {
                    let now = epoch.elapsed().as_secs_f64();
                    coordinator.on_hands(hands, now);
                }
                Err(_) => {
                    hand_open = false;
                    hand_rx = crossbeam_channel::never();
                }
            },
            recv(controls_rx) -> msg => match msg {
                Ok(ControlMessage::Stop) => break,
                Ok(msg) => apply_control(coordinator, msg),
                Err(_) => {
                    // The host dropped its controls handle; the session
                    // keeps running until cancelled or the stream ends.
                    controls_rx = crossbeam_channel::never();
                }
            },
            default(Duration::from_millis(IDLE_POLL_MS)) => {}
        }
    }
}

fn apply_control(coordinator: &mut FrameCoordinator, msg: ControlMessage) {
    match msg {
        ControlMessage::SetThreshold(secs) => {
            if let Err(e) = coordinator.set_threshold(secs) {
                log::warn!("ignored control message: {e}");
            }
        }
        ControlMessage::SetSensitivity(sensitivity) => coordinator.set_sensitivity(sensitivity),
        ControlMessage::SetSoundEnabled(enabled) => coordinator.set_sound_enabled(enabled),
        // Stop is handled by the caller before dispatch.
        ControlMessage::Stop => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::alarm_controller::AlarmController;
    use crate::detection::infrastructure::replay_detectors::{
        ReplayFaceDetector, ReplayHandDetector,
    };
    use crate::monitor::config::MonitorConfig;
    use crate::monitor::status::{MonitorStatus, StatusLabel};
    use crate::pipeline::status_listener::StatusListener;
    use crate::video::infrastructure::synthetic_camera_source::SyntheticCameraSource;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct CollectingListener(Arc<Mutex<Vec<MonitorStatus>>>);

    impl StatusListener for CollectingListener {
        fn status(&mut self, status: &MonitorStatus) {
            self.0.lock().unwrap().push(*status);
        }
        fn alert_started(&mut self, _duration_secs: f64) {}
        fn alert_ended(&mut self, _duration_secs: f64) {}
    }

    fn run_session(
        faces: HashMap<usize, Vec<FaceBox>>,
        hands: HashMap<usize, Vec<HandLandmarks>>,
        total_frames: usize,
    ) -> Vec<MonitorStatus> {
        let statuses = Arc::new(Mutex::new(Vec::new()));
        let coordinator = FrameCoordinator::new(
            MonitorConfig::default(),
            AlarmController::silent(),
            Box::new(CollectingListener(statuses.clone())),
        );
        let camera = SyntheticCameraSource::unpaced(64, 48, 30.0, total_frames);
        let (_, controls) = crossbeam_channel::unbounded();
        let config = MonitorRunConfig {
            cancelled: Arc::new(AtomicBool::new(false)),
            controls,
        };

        ThreadedMonitorExecutor
            .execute(
                Box::new(camera),
                Box::new(ReplayFaceDetector::new(faces)),
                Box::new(ReplayHandDetector::new(hands)),
                coordinator,
                config,
            )
            .unwrap();

        let result = statuses.lock().unwrap().clone();
        result
    }

    #[test]
    fn test_session_ends_with_camera_off() {
        let statuses = run_session(HashMap::new(), HashMap::new(), 5);
        let last = statuses.last().unwrap();
        assert_eq!(last.label, StatusLabel::CameraOff);
    }

    #[test]
    fn test_evaluations_occur_and_report_clear_without_detections() {
        let statuses = run_session(HashMap::new(), HashMap::new(), 5);
        // At least one hand result should have driven an evaluation.
        assert!(statuses
            .iter()
            .any(|s| s.label == StatusLabel::Clear && !s.alerting));
    }

    #[test]
    fn test_stop_message_ends_session() {
        let coordinator = FrameCoordinator::new(
            MonitorConfig::default(),
            AlarmController::silent(),
            Box::new(crate::pipeline::status_listener::NullStatusListener),
        );
        // Endless camera; only the Stop message can end the session.
        let camera = SyntheticCameraSource::unpaced(64, 48, 30.0, usize::MAX);
        let (control_tx, controls) = crossbeam_channel::unbounded();
        let config = MonitorRunConfig {
            cancelled: Arc::new(AtomicBool::new(false)),
            controls,
        };
        control_tx.send(ControlMessage::Stop).unwrap();

        ThreadedMonitorExecutor
            .execute(
                Box::new(camera),
                Box::new(ReplayFaceDetector::new(HashMap::new())),
                Box::new(ReplayHandDetector::new(HashMap::new())),
                coordinator,
                config,
            )
            .unwrap();
    }

    #[test]
    fn test_cancellation_flag_ends_session() {
        let coordinator = FrameCoordinator::new(
            MonitorConfig::default(),
            AlarmController::silent(),
            Box::new(crate::pipeline::status_listener::NullStatusListener),
        );
        let camera = SyntheticCameraSource::unpaced(64, 48, 30.0, usize::MAX);
        let (_control_tx, controls) = crossbeam_channel::unbounded();
        let cancelled = Arc::new(AtomicBool::new(false));
        let config = MonitorRunConfig {
            cancelled: cancelled.clone(),
            controls,
        };

        let canceller = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            cancelled.store(true, Ordering::Relaxed);
        });

        ThreadedMonitorExecutor
            .execute(
                Box::new(camera),
                Box::new(ReplayFaceDetector::new(HashMap::new())),
                Box::new(ReplayHandDetector::new(HashMap::new())),
                coordinator,
                config,
            )
            .unwrap();
        canceller.join().unwrap();
    }
}
