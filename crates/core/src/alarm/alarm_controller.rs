//! Audible alarm lifecycle.
//!
//! The controller owns at most one repeating-tone task at a time. The
//! task plays an immediately audible pulse, then one pulse per repeat
//! interval, alternating strictly between the two siren frequencies,
//! until stopped. Cancellation is synchronous: `stop` joins the task, so
//! no pulse fires after it returns.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{bounded, select, tick, Sender};

use crate::alarm::domain::tone::{alarm_pulses, TonePulse};
use crate::alarm::domain::tone_sink::{NullToneSink, ToneSink};
use crate::shared::constants::ALARM_REPEAT_INTERVAL_MS;

/// Builds a sink on the alarm task's thread at each activation.
///
/// Returning `Err` degrades that activation to silence: the alert stays
/// visual-only and the evaluation loop is never disturbed.
pub type SinkFactory =
    Arc<dyn Fn() -> Result<Box<dyn ToneSink>, Box<dyn std::error::Error>> + Send + Sync>;

struct AlarmHandle {
    stop_tx: Sender<()>,
    join: JoinHandle<()>,
}

pub struct AlarmController {
    factory: SinkFactory,
    enabled: bool,
    handle: Option<AlarmHandle>,
}

impl AlarmController {
    pub fn new(factory: SinkFactory, enabled: bool) -> Self {
        Self {
            factory,
            enabled,
            handle: None,
        }
    }

    /// A controller that never produces sound; for tests and hosts
    /// without audio output.
    pub fn silent() -> Self {
        Self::new(Arc::new(|| Ok(Box::new(NullToneSink) as Box<dyn ToneSink>)), false)
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Applies immediately: disabling while running silences the alarm
    /// before this returns.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.stop();
        }
    }

    /// Begin the repeating alarm. Idempotent: a no-op when sound is
    /// disabled or the alarm is already running.
    pub fn start(&mut self) {
        if !self.enabled || self.handle.is_some() {
            return;
        }

        let (stop_tx, stop_rx) = bounded::<()>(1);
        let factory = self.factory.clone();
        let join = std::thread::spawn(move || {
            let mut sink: Box<dyn ToneSink> = match factory() {
                Ok(sink) => sink,
                Err(e) => {
                    log::warn!("audio output unavailable, alarm is silent: {e}");
                    Box::new(NullToneSink)
                }
            };

            let ticker = tick(Duration::from_millis(ALARM_REPEAT_INTERVAL_MS));
            let mut pulses = alarm_pulses();

            // First pulse is immediate; the ticker drives the repeats.
            play_next(sink.as_mut(), &mut pulses);
            loop {
                select! {
                    recv(stop_rx) -> _ => break,
                    recv(ticker) -> _ => play_next(sink.as_mut(), &mut pulses),
                }
            }
            sink.stop();
        });

        self.handle = Some(AlarmHandle { stop_tx, join });
    }

    /// Cancel the repeating alarm and release audio resources. Idempotent
    /// and synchronous: no pulse fires after this returns.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.stop_tx.send(());
            let _ = handle.join.join();
        }
    }
}

impl Drop for AlarmController {
    fn drop(&mut self) {
        self.stop();
    }
}

fn play_next(sink: &mut dyn ToneSink, pulses: &mut impl Iterator<Item = TonePulse>) {
    if let Some(pulse) = pulses.next() {
        if let Err(e) = sink.play(&pulse) {
            log::warn!("alarm pulse failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records played frequencies into shared storage.
    struct RecordingSink {
        played: Arc<Mutex<Vec<f64>>>,
        stopped: Arc<Mutex<bool>>,
    }

    impl ToneSink for RecordingSink {
        fn play(&mut self, pulse: &TonePulse) -> Result<(), Box<dyn std::error::Error>> {
            self.played.lock().unwrap().push(pulse.frequency_hz);
            Ok(())
        }

        fn stop(&mut self) {
            *self.stopped.lock().unwrap() = true;
        }
    }

    fn recording_controller() -> (AlarmController, Arc<Mutex<Vec<f64>>>, Arc<Mutex<bool>>) {
        let played = Arc::new(Mutex::new(Vec::new()));
        let stopped = Arc::new(Mutex::new(false));
        let (p, s) = (played.clone(), stopped.clone());
        let factory: SinkFactory = Arc::new(move || {
            Ok(Box::new(RecordingSink {
                played: p.clone(),
                stopped: s.clone(),
            }) as Box<dyn ToneSink>)
        });
        (AlarmController::new(factory, true), played, stopped)
    }

    #[test]
    fn test_start_plays_immediately_and_stop_is_synchronous() {
        let (mut alarm, played, stopped) = recording_controller();
        alarm.start();
        assert!(alarm.is_running());

        // The first pulse is played before the first tick.
        std::thread::sleep(Duration::from_millis(50));
        alarm.stop();
        assert!(!alarm.is_running());
        assert!(*stopped.lock().unwrap());

        let count = played.lock().unwrap().len();
        assert!(count >= 1, "no pulse played before stop");

        // Synchronous cancellation: nothing fires after stop returns.
        std::thread::sleep(Duration::from_millis(400));
        assert_eq!(played.lock().unwrap().len(), count);
    }

    #[test]
    fn test_pulses_alternate_frequencies() {
        let (mut alarm, played, _) = recording_controller();
        alarm.start();
        // Enough for the immediate pulse plus two ticks.
        std::thread::sleep(Duration::from_millis(700));
        alarm.stop();

        let freqs = played.lock().unwrap().clone();
        assert!(freqs.len() >= 3, "expected >= 3 pulses, got {}", freqs.len());
        for (i, f) in freqs.iter().enumerate() {
            let expected = if i % 2 == 0 { 1200.0 } else { 800.0 };
            assert_eq!(*f, expected, "pulse {i}");
        }
    }

    #[test]
    fn test_start_twice_spawns_one_task() {
        let (mut alarm, played, _) = recording_controller();
        alarm.start();
        alarm.start();
        std::thread::sleep(Duration::from_millis(50));
        alarm.stop();

        // Two tasks would both play an immediate 1200 Hz pulse.
        let freqs = played.lock().unwrap().clone();
        assert_eq!(freqs.iter().filter(|&&f| f == 1200.0).count(), 1);
    }

    #[test]
    fn test_stop_while_not_running_is_noop() {
        let (mut alarm, _, _) = recording_controller();
        alarm.stop();
        alarm.stop();
        assert!(!alarm.is_running());
    }

    #[test]
    fn test_start_when_disabled_is_noop() {
        let (mut alarm, played, _) = recording_controller();
        alarm.set_enabled(false);
        alarm.start();
        assert!(!alarm.is_running());
        std::thread::sleep(Duration::from_millis(50));
        assert!(played.lock().unwrap().is_empty());
    }

    #[test]
    fn test_disable_while_running_stops_synchronously() {
        let (mut alarm, played, stopped) = recording_controller();
        alarm.start();
        std::thread::sleep(Duration::from_millis(50));

        alarm.set_enabled(false);
        assert!(!alarm.is_running());
        assert!(*stopped.lock().unwrap());

        let count = played.lock().unwrap().len();
        std::thread::sleep(Duration::from_millis(400));
        assert_eq!(played.lock().unwrap().len(), count);
    }

    #[test]
    fn test_failed_sink_degrades_to_silence() {
        let factory: SinkFactory = Arc::new(|| Err("no audio device".into()));
        let mut alarm = AlarmController::new(factory, true);
        alarm.start();
        assert!(alarm.is_running());
        alarm.stop();
        assert!(!alarm.is_running());
    }

    #[test]
    fn test_restart_after_stop() {
        let (mut alarm, played, _) = recording_controller();
        alarm.start();
        std::thread::sleep(Duration::from_millis(30));
        alarm.stop();
        let first = played.lock().unwrap().len();

        alarm.start();
        std::thread::sleep(Duration::from_millis(30));
        alarm.stop();
        assert!(played.lock().unwrap().len() > first);
    }
}
