/// Properties of an opened live stream or recorded clip.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraMetadata {
    pub width: u32,
    pub height: u32,
    /// Nominal frame rate; 0.0 when the source does not report one.
    pub fps: f64,
    /// Human-readable source description (device path, file name).
    pub source: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction() {
        let meta = CameraMetadata {
            width: 1280,
            height: 720,
            fps: 30.0,
            source: "/dev/video0".to_string(),
        };
        assert_eq!(meta.width, 1280);
        assert_eq!(meta.height, 720);
        assert_eq!(meta.fps, 30.0);
        assert_eq!(meta.source, "/dev/video0");
    }

    #[test]
    fn test_unknown_fps_is_zero() {
        // Sources that can't report a rate use fps = 0.0
        let meta = CameraMetadata {
            width: 640,
            height: 480,
            fps: 0.0,
            source: "synthetic".to_string(),
        };
        assert_eq!(meta.fps, 0.0);
    }
}
