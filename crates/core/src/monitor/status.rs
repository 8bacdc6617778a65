use crate::monitor::touch_state::{TouchState, TouchUpdate};

/// User-facing status label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusLabel {
    CameraOff,
    Clear,
    Touching,
}

impl std::fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusLabel::CameraOff => write!(f, "Camera Off"),
            StatusLabel::Clear => write!(f, "Clear"),
            StatusLabel::Touching => write!(f, "TOUCHING"),
        }
    }
}

/// Externally observable output of one evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonitorStatus {
    pub label: StatusLabel,
    pub alerting: bool,
    /// Elapsed touch time; populated only while alerting.
    pub duration_secs: Option<f64>,
}

impl MonitorStatus {
    pub fn camera_off() -> Self {
        Self {
            label: StatusLabel::CameraOff,
            alerting: false,
            duration_secs: None,
        }
    }

    pub fn from_update(update: &TouchUpdate) -> Self {
        let alerting = update.state == TouchState::Alerting;
        Self {
            label: match update.state {
                TouchState::Clear => StatusLabel::Clear,
                TouchState::TouchingBelowThreshold | TouchState::Alerting => StatusLabel::Touching,
            },
            alerting,
            duration_secs: if alerting { update.duration } else { None },
        }
    }

    /// One-decimal display form of the duration, e.g. "1.0".
    pub fn duration_display(&self) -> Option<String> {
        self.duration_secs.map(|d| format!("{d:.1}"))
    }
}
