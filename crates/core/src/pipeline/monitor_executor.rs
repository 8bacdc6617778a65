use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::hand_detector::HandDetector;
use crate::monitor::config::Sensitivity;
use crate::pipeline::frame_coordinator::FrameCoordinator;
use crate::video::domain::camera_source::CameraSource;

/// Runtime adjustments accepted while a watch session is running.
///
/// Threshold and sensitivity apply on the next evaluation; the sound
/// flag applies immediately. `Stop` ends the session.
#[derive(Clone, Debug, PartialEq)]
pub enum ControlMessage {
    SetThreshold(f64),
    SetSensitivity(Sensitivity),
    SetSoundEnabled(bool),
    Stop,
}

/// Configuration for one watch-session run.
pub struct MonitorRunConfig {
    pub cancelled: Arc<AtomicBool>,
    pub controls: crossbeam_channel::Receiver<ControlMessage>,
}

/// Abstracts how the capture → detect → evaluate loop is executed.
///
/// This is a port (application-layer interface). Infrastructure provides
/// concrete implementations (e.g. threaded).
pub trait MonitorExecutor: Send {
    fn execute(
        &self,
        camera: Box<dyn CameraSource>,
        face_detector: Box<dyn FaceDetector>,
        hand_detector: Box<dyn HandDetector>,
        coordinator: FrameCoordinator,
        config: MonitorRunConfig,
    ) -> Result<(), Box<dyn std::error::Error>>;
}
