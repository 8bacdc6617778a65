use std::sync::Arc;

use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, Sink};

use crate::alarm::alarm_controller::SinkFactory;
use crate::alarm::domain::tone::TonePulse;
use crate::alarm::domain::tone_sink::ToneSink;
use crate::shared::constants::ALARM_SAMPLE_RATE;

/// Plays alarm pulses on the default audio device via rodio.
///
/// Pulses are appended back-to-back on one sink, so the repeat cadence
/// produces a continuous siren rather than gapped beeps.
pub struct RodioToneSink {
    // Dropping the stream kills playback; it must outlive the sink.
    _stream: OutputStream,
    sink: Sink,
}

impl RodioToneSink {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let (stream, handle) = OutputStream::try_default()?;
        let sink = Sink::try_new(&handle)?;
        Ok(Self {
            _stream: stream,
            sink,
        })
    }
}

impl ToneSink for RodioToneSink {
    fn play(&mut self, pulse: &TonePulse) -> Result<(), Box<dyn std::error::Error>> {
        let samples = pulse.samples(ALARM_SAMPLE_RATE);
        self.sink
            .append(SamplesBuffer::new(1, ALARM_SAMPLE_RATE, samples));
        Ok(())
    }

    fn stop(&mut self) {
        self.sink.stop();
    }
}

/// Standard factory for [`crate::alarm::alarm_controller::AlarmController`]:
/// a rodio sink on the default output device, built on the alarm task's
/// thread at each activation.
pub fn default_sink_factory() -> SinkFactory {
    Arc::new(|| Ok(Box::new(RodioToneSink::new()?) as Box<dyn ToneSink>))
}
