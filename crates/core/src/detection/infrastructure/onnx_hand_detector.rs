/// Two-hand landmark detector using ONNX Runtime via `ort`.
///
/// Runs a combined two-hand landmark model on the full frame. The model
/// emits, per hand slot, 21 landmarks as (x, y, z) in input-pixel units
/// plus a presence probability; slots below the presence threshold are
/// empty. Landmarks are normalized before leaving this module.
use std::path::Path;

use crate::detection::domain::hand_detector::HandDetector;
use crate::detection::domain::hand_landmarks::{HandLandmarks, LANDMARK_COUNT};
use crate::shared::frame::Frame;

/// Model input resolution.
const INPUT_SIZE: u32 = 224;

/// Values per landmark in the model output (x, y, z).
const VALUES_PER_LANDMARK: usize = 3;

/// Hand slots in the model output.
const HAND_SLOTS: usize = 2;

/// Default presence probability below which a hand slot is discarded.
pub const DEFAULT_PRESENCE_THRESHOLD: f64 = 0.5;

pub struct OnnxHandDetector {
    session: ort::session::Session,
    presence_threshold: f64,
}

impl OnnxHandDetector {
    pub fn new(
        model_path: &Path,
        presence_threshold: f64,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?.commit_from_file(model_path)?;
        Ok(Self {
            session,
            presence_threshold,
        })
    }
}

impl HandDetector for OnnxHandDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<HandLandmarks>, Box<dyn std::error::Error>> {
        // 1. Preprocess: resize to 224x224, normalize to [0,1], NCHW
        let input_tensor = preprocess(frame, INPUT_SIZE);

        // 2. Inference. Expected outputs:
        //    - landmarks: [2, 63] (21 × (x, y, z) per hand slot)
        //    - presence:  [2] probabilities
        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() < 2 {
            return Err(format!("hand model expected 2 outputs, got {}", outputs.len()).into());
        }

        let landmark_out = outputs[0].try_extract_array::<f32>()?;
        let presence_out = outputs[1].try_extract_array::<f32>()?;
        let landmark_data = landmark_out.as_slice().ok_or("Cannot get landmark slice")?;
        let presence_data = presence_out.as_slice().ok_or("Cannot get presence slice")?;

        // A malformed tensor is a model/runtime fault; failing here makes
        // the caller skip this evaluation and keep its cached result.
        let per_hand = LANDMARK_COUNT * VALUES_PER_LANDMARK;
        if landmark_data.len() != HAND_SLOTS * per_hand || presence_data.len() != HAND_SLOTS {
            return Err(format!(
                "hand model output shape mismatch: {} landmark values, {} scores",
                landmark_data.len(),
                presence_data.len()
            )
            .into());
        }

        // 3. Decode present slots to normalized landmark sets
        let mut hands = Vec::new();
        for slot in 0..HAND_SLOTS {
            if (presence_data[slot] as f64) < self.presence_threshold {
                continue;
            }
            hands.push(decode_slot(&landmark_data[slot * per_hand..(slot + 1) * per_hand])?);
        }

        Ok(hands)
    }
}

/// Convert one slot's 63 raw values into a normalized landmark set.
fn decode_slot(raw: &[f32]) -> Result<HandLandmarks, Box<dyn std::error::Error>> {
    let size = INPUT_SIZE as f64;
    let points: Vec<(f64, f64)> = raw
        .chunks(VALUES_PER_LANDMARK)
        .map(|lm| ((lm[0] as f64 / size).clamp(0.0, 1.0), (lm[1] as f64 / size).clamp(0.0, 1.0)))
        .collect();
    Ok(HandLandmarks::from_points(&points)?)
}

/// Resize frame to `size × size` and normalize to [0,1] NCHW float32.
fn preprocess(frame: &Frame, size: u32) -> ndarray::Array4<f32> {
    let src = frame.as_ndarray();
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;
    let s = size as usize;

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, s, s));

    for y in 0..s {
        let src_y = (((y as f64 + 0.5) * src_h as f64 / s as f64) as usize).min(src_h - 1);
        for x in 0..s {
            let src_x = (((x as f64 + 0.5) * src_w as f64 / s as f64) as usize).min(src_w - 1);
            for c in 0..3 {
                tensor[[0, c, y, x]] = src[[src_y, src_x, c]] as f32 / 255.0;
            }
        }
    }

    tensor
}
