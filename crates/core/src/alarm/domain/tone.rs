//! Alarm pulse synthesis.
//!
//! Pure sample generation; playback happens behind [`super::tone_sink::ToneSink`].

use std::f64::consts::PI;

use crate::shared::constants::{ALARM_PEAK_GAIN, ALARM_PULSE_SECS, ALARM_TONE_FREQS_HZ};

/// Envelope floor as a fraction of peak gain. The decay constant is
/// derived so a pulse lands here at its final sample.
const SILENCE_RATIO: f64 = 0.01;

/// One audible alarm pulse: a sine at `frequency_hz` shaped by an
/// exponential amplitude decay from `peak_gain` down to near-silence
/// over `duration_secs`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TonePulse {
    pub frequency_hz: f64,
    pub duration_secs: f64,
    pub peak_gain: f32,
}

impl TonePulse {
    /// A standard alarm pulse at the given frequency.
    pub fn alarm(frequency_hz: f64) -> Self {
        Self {
            frequency_hz,
            duration_secs: ALARM_PULSE_SECS,
            peak_gain: ALARM_PEAK_GAIN,
        }
    }

    /// Mono f32 PCM at `sample_rate`.
    pub fn samples(&self, sample_rate: u32) -> Vec<f32> {
        let count = (self.duration_secs * sample_rate as f64).round() as usize;
        let decay_per_sec = (1.0 / SILENCE_RATIO).ln() / self.duration_secs;
        let peak = self.peak_gain as f64;

        (0..count)
            .map(|i| {
                let t = i as f64 / sample_rate as f64;
                let envelope = peak * (-decay_per_sec * t).exp();
                (envelope * (2.0 * PI * self.frequency_hz * t).sin()) as f32
            })
            .collect()
    }
}

/// Endless strict alternation of the two alarm frequencies.
pub fn alarm_pulses() -> impl Iterator<Item = TonePulse> {
    ALARM_TONE_FREQS_HZ.into_iter().cycle().map(TonePulse::alarm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::constants::ALARM_SAMPLE_RATE;
    use approx::assert_relative_eq;

    fn pulse() -> TonePulse {
        TonePulse::alarm(1200.0)
    }

    #[test]
    fn test_sample_count_matches_duration() {
        let samples = pulse().samples(ALARM_SAMPLE_RATE);
        let expected = (ALARM_PULSE_SECS * ALARM_SAMPLE_RATE as f64).round() as usize;
        assert_eq!(samples.len(), expected);
    }

    #[test]
    fn test_starts_at_zero_crossing() {
        // sin(0) = 0, so the pulse never clicks on start.
        let samples = pulse().samples(ALARM_SAMPLE_RATE);
        assert_relative_eq!(samples[0], 0.0);
    }

    #[test]
    fn test_peak_amplitude_bounded_by_gain() {
        let samples = pulse().samples(ALARM_SAMPLE_RATE);
        let max = samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(max <= ALARM_PEAK_GAIN);
        // ...and the early cycles actually get near the peak.
        assert!(max > ALARM_PEAK_GAIN * 0.8);
    }

    #[test]
    fn test_envelope_decays_to_near_silence() {
        let samples = pulse().samples(ALARM_SAMPLE_RATE);
        let tail_start = samples.len() - samples.len() / 20;
        let tail_max = samples[tail_start..]
            .iter()
            .fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(
            tail_max < ALARM_PEAK_GAIN * 0.02,
            "tail peak {tail_max} not near silence"
        );
    }

    #[test]
    fn test_envelope_is_monotonically_decaying() {
        // Compare per-chunk peaks across the pulse; each chunk spans
        // multiple carrier cycles so its peak tracks the envelope.
        let samples = pulse().samples(ALARM_SAMPLE_RATE);
        let chunk = ALARM_SAMPLE_RATE as usize / 100; // 10ms
        let peaks: Vec<f32> = samples
            .chunks(chunk)
            .map(|c| c.iter().fold(0.0f32, |m, s| m.max(s.abs())))
            .collect();
        for pair in peaks.windows(2).take(peaks.len() - 2) {
            assert!(pair[1] < pair[0], "envelope increased: {pair:?}");
        }
    }

    #[test]
    fn test_alarm_pulses_alternate_strictly() {
        let freqs: Vec<f64> = alarm_pulses().take(5).map(|p| p.frequency_hz).collect();
        assert_eq!(freqs, vec![1200.0, 800.0, 1200.0, 800.0, 1200.0]);
    }
}
