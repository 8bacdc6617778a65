use crate::detection::domain::hand_landmarks::HandLandmarks;
use crate::shared::frame::Frame;

/// Domain interface for hand landmark detection.
///
/// Yields zero to two 21-point normalized landmark sets per frame; order
/// among hands carries no meaning.
pub trait HandDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<HandLandmarks>, Box<dyn std::error::Error>>;
}
