//! Merges the two detection streams into synchronous evaluation steps.

use crate::alarm::alarm_controller::AlarmController;
use crate::detection::domain::face_box::FaceBox;
use crate::detection::domain::hand_landmarks::HandLandmarks;
use crate::detection::domain::proximity::any_hand_near_face;
use crate::monitor::config::{ConfigError, MonitorConfig, Sensitivity};
use crate::monitor::status::MonitorStatus;
use crate::monitor::touch_state::{AlarmCommand, TouchStateMachine};
use crate::pipeline::status_listener::StatusListener;

/// Single owner of all per-evaluation mutable state.
///
/// Face and hand results arrive on independent clocks; the coordinator
/// caches the latest of each and runs one evaluation per *hand* arrival,
/// using whatever face result is cached, however stale. Face arrivals
/// only refresh the cache; they never evaluate. A stalled stream simply
/// freezes its cached result (no staleness expiry), while a delivered
/// empty result overwrites the cache: "nothing seen" is a result too.
pub struct FrameCoordinator {
    config: MonitorConfig,
    machine: TouchStateMachine,
    alarm: AlarmController,
    listener: Box<dyn StatusListener>,
    latest_faces: Vec<FaceBox>,
    latest_hands: Vec<HandLandmarks>,
}

impl FrameCoordinator {
    pub fn new(
        config: MonitorConfig,
        mut alarm: AlarmController,
        listener: Box<dyn StatusListener>,
    ) -> Self {
        alarm.set_enabled(config.sound_enabled);
        Self {
            config,
            machine: TouchStateMachine::new(),
            alarm,
            listener,
            latest_faces: Vec::new(),
            latest_hands: Vec::new(),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Cache a face result. Every arrival overwrites the cache, empty
    /// results included.
    pub fn on_faces(&mut self, faces: Vec<FaceBox>) {
        self.latest_faces = faces;
    }

    /// Cache a hand result and run one evaluation at monotonic time `now`.
    pub fn on_hands(&mut self, hands: Vec<HandLandmarks>, now: f64) -> MonitorStatus {
        self.latest_hands = hands;
        self.evaluate(now)
    }

    fn evaluate(&mut self, now: f64) -> MonitorStatus {
        // First detected face only; additional faces are ignored.
        let touching = self
            .latest_faces
            .first()
            .map(|face| any_hand_near_face(&self.latest_hands, face, self.config.proximity_margin))
            .unwrap_or(false);

        let update = self
            .machine
            .update(touching, now, self.config.touch_threshold_secs);

        match update.alarm {
            Some(AlarmCommand::Start) => {
                self.alarm.start();
                if let Some(duration) = update.duration {
                    self.listener.alert_started(duration);
                }
            }
            Some(AlarmCommand::Stop) => {
                self.alarm.stop();
                if let Some(ended) = update.ended {
                    if ended.was_alerting {
                        self.listener.alert_ended(ended.duration);
                    }
                }
            }
            None => {}
        }

        let status = MonitorStatus::from_update(&update);
        self.listener.status(&status);
        status
    }

    /// Takes effect on the next evaluation.
    pub fn set_threshold(&mut self, secs: f64) -> Result<(), ConfigError> {
        if secs <= 0.0 {
            return Err(ConfigError::NonPositiveThreshold(secs));
        }
        self.config.touch_threshold_secs = secs;
        Ok(())
    }

    /// Takes effect on the next evaluation.
    pub fn set_sensitivity(&mut self, sensitivity: Sensitivity) {
        self.config.set_sensitivity(sensitivity);
    }

    /// Takes effect on the next evaluation.
    pub fn set_margin(&mut self, margin: f64) -> Result<(), ConfigError> {
        if margin <= 0.0 {
            return Err(ConfigError::NonPositiveMargin(margin));
        }
        self.config.proximity_margin = margin;
        Ok(())
    }

    /// Applies immediately: disabling silences a running alarm before
    /// this returns. The visual alert state is untouched either way.
    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.config.sound_enabled = enabled;
        self.alarm.set_enabled(enabled);
    }

    /// Tear down evaluation state: alarm silenced, machine cleared,
    /// caches dropped, "Camera Off" reported. Idempotent.
    pub fn reset(&mut self) -> MonitorStatus {
        self.alarm.stop();
        self.machine.reset();
        self.latest_faces.clear();
        self.latest_hands.clear();
        let status = MonitorStatus::camera_off();
        self.listener.status(&status);
        status
    }

    #[cfg(test)]
    fn alarm_running(&self) -> bool {
        self.alarm.is_running()
    }
}
