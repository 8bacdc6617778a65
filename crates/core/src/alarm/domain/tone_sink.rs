use super::tone::TonePulse;

/// Output port for audible alarm pulses.
///
/// `play` queues one synthesized pulse for immediate playback; `stop`
/// silences anything queued or sounding. Sinks are constructed on the
/// alarm task's own thread (audio output handles are typically not
/// `Send`), so no `Send` bound is required here.
pub trait ToneSink {
    fn play(&mut self, pulse: &TonePulse) -> Result<(), Box<dyn std::error::Error>>;
    fn stop(&mut self);
}

/// Sink that discards all pulses.
///
/// Stands in for the audio device in tests and when audio output is
/// unavailable; the alarm then degrades to status-only.
pub struct NullToneSink;

impl ToneSink for NullToneSink {
    fn play(&mut self, _pulse: &TonePulse) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }

    fn stop(&mut self) {}
}
