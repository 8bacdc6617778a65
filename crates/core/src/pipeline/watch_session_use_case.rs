use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};

use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::hand_detector::HandDetector;
use crate::monitor::config::Sensitivity;
use crate::pipeline::frame_coordinator::FrameCoordinator;
use crate::pipeline::monitor_executor::{ControlMessage, MonitorExecutor, MonitorRunConfig};
use crate::video::domain::camera_source::CameraSource;

/// Handle for adjusting a running watch session from another thread.
///
/// Sends are fire-and-forget: once the session has ended they go
/// nowhere, which makes every control (including `stop`) idempotent and
/// safe to call even if start never completed.
#[derive(Clone)]
pub struct MonitorControls {
    tx: Sender<ControlMessage>,
}

impl MonitorControls {
    pub fn set_threshold(&self, secs: f64) {
        let _ = self.tx.send(ControlMessage::SetThreshold(secs));
    }

    pub fn set_sensitivity(&self, sensitivity: Sensitivity) {
        let _ = self.tx.send(ControlMessage::SetSensitivity(sensitivity));
    }

    pub fn set_sound_enabled(&self, enabled: bool) {
        let _ = self.tx.send(ControlMessage::SetSoundEnabled(enabled));
    }

    pub fn stop(&self) {
        let _ = self.tx.send(ControlMessage::Stop);
    }
}

/// Orchestrates one live monitoring session.
///
/// Wires the camera, detectors, and coordinator together and delegates
/// execution to a `MonitorExecutor`. This is a single-use struct:
/// `execute` consumes the owned components, so calling it twice will
/// fail.
pub struct WatchSessionUseCase {
    camera: Option<Box<dyn CameraSource>>,
    face_detector: Option<Box<dyn FaceDetector>>,
    hand_detector: Option<Box<dyn HandDetector>>,
    coordinator: Option<FrameCoordinator>,
    executor: Box<dyn MonitorExecutor>,
    cancelled: Arc<AtomicBool>,
    controls_tx: Sender<ControlMessage>,
    controls_rx: Option<Receiver<ControlMessage>>,
}

impl WatchSessionUseCase {
    pub fn new(
        camera: Box<dyn CameraSource>,
        face_detector: Box<dyn FaceDetector>,
        hand_detector: Box<dyn HandDetector>,
        coordinator: FrameCoordinator,
        executor: Box<dyn MonitorExecutor>,
        cancelled: Option<Arc<AtomicBool>>,
    ) -> Self {
        let (controls_tx, controls_rx) = crossbeam_channel::unbounded();
        Self {
            camera: Some(camera),
            face_detector: Some(face_detector),
            hand_detector: Some(hand_detector),
            coordinator: Some(coordinator),
            executor,
            cancelled: cancelled.unwrap_or_else(|| Arc::new(AtomicBool::new(false))),
            controls_tx,
            controls_rx: Some(controls_rx),
        }
    }

    pub fn controls(&self) -> MonitorControls {
        MonitorControls {
            tx: self.controls_tx.clone(),
        }
    }

    pub fn cancelled(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    /// Run the session to completion (camera end-of-stream, cancellation
    /// flag, or a `Stop` control).
    pub fn execute(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let config = MonitorRunConfig {
            cancelled: self.cancelled.clone(),
            controls: self
                .controls_rx
                .take()
                .ok_or("Session already executed")?,
        };

        self.executor.execute(
            self.camera.take().ok_or("Session already executed")?,
            self.face_detector.take().ok_or("Session already executed")?,
            self.hand_detector.take().ok_or("Session already executed")?,
            self.coordinator.take().ok_or("Session already executed")?,
            config,
        )
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
    use crate::pipeline::infrastructure::threaded_monitor_executor::ThreadedMonitorExecutor;
    use crate::pipeline::status_listener::NullStatusListener;
    use crate::video::infrastructure::synthetic_camera_source::SyntheticCameraSource;
    use std::collections::HashMap;

    fn session() -> WatchSessionUseCase {
        let coordinator = FrameCoordinator::new(
            MonitorConfig::default(),
            AlarmController::silent(),
            Box::new(NullStatusListener),
        );
        WatchSessionUseCase::new(
            Box::new(SyntheticCameraSource::unpaced(64, 48, 30.0, 3)),
            Box::new(ReplayFaceDetector::new(HashMap::new())),
            Box::new(ReplayHandDetector::new(HashMap::new())),
            coordinator,
            Box::new(ThreadedMonitorExecutor),
            None,
        )
    }

    #[test]
    fn test_execute_runs_to_completion() {
        let mut s = session();
        assert!(s.execute().is_ok());
    }

    #[test]
    fn test_execute_twice_fails() {
        let mut s = session();
        s.execute().unwrap();
        let err = s.execute().unwrap_err();
        assert!(err.to_string().contains("already executed"));
    }

    #[test]
    fn test_controls_after_session_end_are_harmless() {
        let mut s = session();
        let controls = s.controls();
        s.execute().unwrap();
        // Session over: these go nowhere, and must not panic.
        controls.set_threshold(2.0);
        controls.set_sound_enabled(false);
        controls.stop();
        controls.stop();
    }

    #[test]
    fn test_stop_before_start_prevents_hang() {
        let mut s = session();
        s.controls().stop();
        // The queued Stop is consumed on start; the session ends.
        assert!(s.execute().is_ok());
    }
}
