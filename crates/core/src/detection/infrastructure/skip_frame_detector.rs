use crate::detection::domain::face_box::FaceBox;
use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::frame::Frame;

/// Decorator that runs face detection every N frames, reusing results in
/// between.
///
/// On skipped frames, box centers are linearly extrapolated from the
/// velocity observed between the two most recent real detections, so a
/// moving face doesn't stutter between detection frames. Velocity is
/// tracked for the first face only, the one the monitor evaluates.
pub struct SkipFrameFaceDetector {
    inner: Box<dyn FaceDetector>,
    skip_interval: usize,
    frame_count: usize,
    last_faces: Vec<FaceBox>,
    /// Normalized (dx, dy) per frame of the first face's center.
    velocity: Option<(f64, f64)>,
    prev_center: Option<(f64, f64)>,
    frames_since_detect: usize,
}

impl SkipFrameFaceDetector {
    pub fn new(inner: Box<dyn FaceDetector>, skip_interval: usize) -> Result<Self, &'static str> {
        if skip_interval < 1 {
            return Err("skip_interval must be >= 1");
        }
        Ok(Self {
            inner,
            skip_interval,
            frame_count: 0,
            last_faces: Vec::new(),
            velocity: None,
            prev_center: None,
            frames_since_detect: 0,
        })
    }

    fn update_velocity(&mut self, faces: &[FaceBox]) {
        let center = faces.first().map(|f| (f.x_center, f.y_center));
        if let (Some((cx, cy)), Some((px, py))) = (center, self.prev_center) {
            let per_frame = self.skip_interval as f64;
            self.velocity = Some(((cx - px) / per_frame, (cy - py) / per_frame));
        } else {
            // Face appeared or disappeared: no meaningful velocity.
            self.velocity = None;
        }
        self.prev_center = center;
    }

    fn extrapolate(&self, steps: usize) -> Vec<FaceBox> {
        let Some((dx, dy)) = self.velocity else {
            return self.last_faces.clone();
        };
        self.last_faces
            .iter()
            .map(|f| FaceBox {
                x_center: (f.x_center + dx * steps as f64).clamp(0.0, 1.0),
                y_center: (f.y_center + dy * steps as f64).clamp(0.0, 1.0),
                ..*f
            })
            .collect()
    }
}

impl FaceDetector for SkipFrameFaceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<FaceBox>, Box<dyn std::error::Error>> {
        let result = if self.frame_count % self.skip_interval == 0 {
            let faces = self.inner.detect(frame)?;
            self.update_velocity(&faces);
            self.last_faces = faces.clone();
            self.frames_since_detect = 0;
            faces
        } else {
            self.frames_since_detect += 1;
            self.extrapolate(self.frames_since_detect)
        };
        self.frame_count += 1;
        Ok(result)
    }
}
