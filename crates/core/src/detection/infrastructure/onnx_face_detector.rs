/// BlazeFace-style face detector using ONNX Runtime via `ort`.
///
/// A lightweight anchor-based detector; fast enough to run per-frame on
/// CPU at camera rate. Emits normalized [`FaceBox`]es; the rest of the
/// monitor never sees pixel coordinates.
use std::path::Path;

use crate::detection::domain::face_box::FaceBox;
use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::frame::Frame;

/// Model input resolution.
const INPUT_SIZE: u32 = 128;

/// Default confidence threshold; matches the tuning the monitor was
/// calibrated with.
pub const DEFAULT_CONFIDENCE: f64 = 0.7;

/// NMS IoU threshold.
const NMS_IOU_THRESH: f64 = 0.3;

/// Number of anchors in the short-range model.
const NUM_ANCHORS: usize = 896;

/// Values per anchor in the regressor output (box deltas + keypoints).
const REGRESSOR_STRIDE: usize = 16;

pub struct OnnxFaceDetector {
    session: ort::session::Session,
    confidence: f64,
    anchors: Vec<[f32; 2]>,
}

impl OnnxFaceDetector {
    pub fn new(model_path: &Path, confidence: f64) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?.commit_from_file(model_path)?;
        Ok(Self {
            session,
            confidence,
            anchors: generate_anchors(),
        })
    }
}

impl FaceDetector for OnnxFaceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<FaceBox>, Box<dyn std::error::Error>> {
        // 1. Preprocess: resize to 128x128, normalize to [0,1], NCHW
        let input_tensor = preprocess(frame, INPUT_SIZE);

        // 2. Inference. The model outputs two tensors:
        //    - regressors: [1, 896, 16] (box deltas + keypoints)
        //    - classificators: [1, 896, 1] (logit scores)
        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() < 2 {
            return Err(format!("face model expected 2 outputs, got {}", outputs.len()).into());
        }

        let regressors = outputs[0].try_extract_array::<f32>()?;
        let scores = outputs[1].try_extract_array::<f32>()?;
        let reg_data = regressors.as_slice().ok_or("Cannot get regressor slice")?;
        let score_data = scores.as_slice().ok_or("Cannot get score slice")?;

        // 3. Decode anchors, keeping normalized center/size boxes
        let mut candidates = Vec::new();
        let num_anchors = self.anchors.len().min(NUM_ANCHORS).min(score_data.len());

        for (i, &raw_score) in score_data.iter().enumerate().take(num_anchors) {
            let score = sigmoid(raw_score) as f64;
            if score < self.confidence {
                continue;
            }

            let reg_offset = i * REGRESSOR_STRIDE;
            if reg_offset + 4 > reg_data.len() {
                break;
            }

            let anchor = &self.anchors[i];
            let size = INPUT_SIZE as f32;
            let cx = (anchor[0] + reg_data[reg_offset] / size) as f64;
            let cy = (anchor[1] + reg_data[reg_offset + 1] / size) as f64;
            let w = (reg_data[reg_offset + 2] / size) as f64;
            let h = (reg_data[reg_offset + 3] / size) as f64;

            candidates.push(Candidate {
                face: FaceBox::new(cx.clamp(0.0, 1.0), cy.clamp(0.0, 1.0), w, h),
                score,
            });
        }

        // 4. NMS, highest score first
        Ok(nms(&mut candidates, NMS_IOU_THRESH))
    }
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

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

// ---------------------------------------------------------------------------
// Anchor generation (short-range model)
// ---------------------------------------------------------------------------

/// Two feature map scales: 16×16 cells with 2 anchors, 8×8 with 6.
fn generate_anchors() -> Vec<[f32; 2]> {
    let strides = [(8usize, 2usize), (16, 6)];
    let mut anchors = Vec::with_capacity(NUM_ANCHORS);

    for &(stride, per_cell) in &strides {
        let grid = INPUT_SIZE as usize / stride;
        for y in 0..grid {
            for x in 0..grid {
                let cx = (x as f32 + 0.5) / grid as f32;
                let cy = (y as f32 + 0.5) / grid as f32;
                for _ in 0..per_cell {
                    anchors.push([cx, cy]);
                }
            }
        }
    }

    anchors
}

// ---------------------------------------------------------------------------
// NMS in normalized space
// ---------------------------------------------------------------------------

struct Candidate {
    face: FaceBox,
    score: f64,
}

fn nms(candidates: &mut [Candidate], iou_thresh: f64) -> Vec<FaceBox> {
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut kept: Vec<FaceBox> = Vec::new();
    for c in candidates.iter() {
        if kept.iter().all(|k| face_iou(k, &c.face) <= iou_thresh) {
            kept.push(c.face);
        }
    }
    kept
}

fn face_iou(a: &FaceBox, b: &FaceBox) -> f64 {
    let (ax1, ay1) = (a.x_center - a.width / 2.0, a.y_center - a.height / 2.0);
    let (ax2, ay2) = (a.x_center + a.width / 2.0, a.y_center + a.height / 2.0);
    let (bx1, by1) = (b.x_center - b.width / 2.0, b.y_center - b.height / 2.0);
    let (bx2, by2) = (b.x_center + b.width / 2.0, b.y_center + b.height / 2.0);

    let inter = (ax2.min(bx2) - ax1.max(bx1)).max(0.0) * (ay2.min(by2) - ay1.max(by1)).max(0.0);
    if inter == 0.0 {
        return 0.0;
    }
    let area_a = a.width * a.height;
    let area_b = b.width * b.height;
    inter / (area_a + area_b - inter)
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
