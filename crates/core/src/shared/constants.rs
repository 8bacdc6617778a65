pub const FACE_MODEL_NAME: &str = "blazeface_front_128.onnx";
pub const FACE_MODEL_URL: &str =
    "https://github.com/touchguard/models/releases/download/v0.1.0/blazeface_front_128.onnx";

pub const HAND_MODEL_NAME: &str = "hand_landmarks_dual_224.onnx";
pub const HAND_MODEL_URL: &str =
    "https://github.com/touchguard/models/releases/download/v0.1.0/hand_landmarks_dual_224.onnx";

/// Most hand models report at most two hands; extra sets are discarded.
pub const MAX_HANDS: usize = 2;

/// The two siren frequencies, played in strict alternation.
pub const ALARM_TONE_FREQS_HZ: [f64; 2] = [1200.0, 800.0];

/// Cadence of the repeating alarm pulse.
pub const ALARM_REPEAT_INTERVAL_MS: u64 = 300;

/// Length of one alarm pulse. Equal to the repeat interval so consecutive
/// pulses butt up against each other into a continuous siren.
pub const ALARM_PULSE_SECS: f64 = 0.3;

pub const ALARM_SAMPLE_RATE: u32 = 22_050;

pub const ALARM_PEAK_GAIN: f32 = 0.8;
