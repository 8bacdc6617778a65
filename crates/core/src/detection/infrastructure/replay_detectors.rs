use std::collections::HashMap;

use crate::detection::domain::face_box::FaceBox;
use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::hand_detector::HandDetector;
use crate::detection::domain::hand_landmarks::HandLandmarks;
use crate::shared::frame::Frame;

/// Replays pre-computed face results by frame index.
///
/// Frames without an entry yield an empty result ("no face seen"),
/// matching what a live detector reports for such frames. Used by
/// executor tests and offline analysis of recorded clips.
pub struct ReplayFaceDetector {
    script: HashMap<usize, Vec<FaceBox>>,
}

impl ReplayFaceDetector {
    pub fn new(script: HashMap<usize, Vec<FaceBox>>) -> Self {
        Self { script }
    }
}

impl FaceDetector for ReplayFaceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<FaceBox>, Box<dyn std::error::Error>> {
        Ok(self.script.get(&frame.index()).cloned().unwrap_or_default())
    }
}

/// Replays pre-computed hand results by frame index.
pub struct ReplayHandDetector {
    script: HashMap<usize, Vec<HandLandmarks>>,
}

impl ReplayHandDetector {
    pub fn new(script: HashMap<usize, Vec<HandLandmarks>>) -> Self {
        Self { script }
    }
}

impl HandDetector for ReplayHandDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<HandLandmarks>, Box<dyn std::error::Error>> {
        Ok(self.script.get(&frame.index()).cloned().unwrap_or_default())
    }
}
