use crate::monitor::status::{MonitorStatus, StatusLabel};

/// Observer port for the monitor's externally visible outputs.
///
/// Decouples the coordinator from output mechanisms (log, GUI signals,
/// tests) so hosts can watch evaluations without touching the evaluation
/// code.
pub trait StatusListener: Send {
    /// Called after every evaluation with the current status.
    fn status(&mut self, status: &MonitorStatus);

    /// Called once when a session crosses the alert threshold.
    fn alert_started(&mut self, duration_secs: f64);

    /// Called when an alerting session ends.
    fn alert_ended(&mut self, duration_secs: f64);

    /// Human-readable diagnostics. Default: no-op.
    fn info(&mut self, _message: &str) {}
}

/// Listener that discards all events.
///
/// Used by tests where output is irrelevant and by hosts that poll the
/// returned status instead.
pub struct NullStatusListener;

impl StatusListener for NullStatusListener {
    fn status(&mut self, _status: &MonitorStatus) {}
    fn alert_started(&mut self, _duration_secs: f64) {}
    fn alert_ended(&mut self, _duration_secs: f64) {}
}

/// Logs transitions and alert lines via the `log` crate.
///
/// Per-evaluation statuses are suppressed unless the label or alerting
/// flag changed, keeping steady-state output quiet at camera rate.
#[derive(Default)]
pub struct LogStatusListener {
    last: Option<(StatusLabel, bool)>,
}

impl LogStatusListener {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatusListener for LogStatusListener {
    fn status(&mut self, status: &MonitorStatus) {
        let key = (status.label, status.alerting);
        if self.last == Some(key) {
            return;
        }
        self.last = Some(key);
        log::info!("status: {}", status.label);
    }

    fn alert_started(&mut self, duration_secs: f64) {
        log::warn!("ALERT: hands on face for {duration_secs:.1}s");
    }

    fn alert_ended(&mut self, duration_secs: f64) {
        log::info!("touch ended after {duration_secs:.1}s");
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_listener_all_methods_are_noop() {
        let mut listener = NullStatusListener;
        listener.status(&MonitorStatus::camera_off());
        listener.alert_started(1.0);
        listener.alert_ended(1.2);
        listener.info("hello");
        // No panics = success
    }

    #[test]
    fn test_log_listener_tracks_transitions() {
        // We can't capture log output here; verify the dedup key updates.
        let mut listener = LogStatusListener::new();
        let off = MonitorStatus::camera_off();
        listener.status(&off);
        assert_eq!(listener.last, Some((StatusLabel::CameraOff, false)));

        listener.status(&off); // repeated status keeps the same key
        assert_eq!(listener.last, Some((StatusLabel::CameraOff, false)));
    }
}
