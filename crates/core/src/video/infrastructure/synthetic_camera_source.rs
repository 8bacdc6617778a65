use std::time::Duration;

use crate::shared::camera_metadata::CameraMetadata;
use crate::shared::frame::Frame;
use crate::video::domain::camera_source::CameraSource;

/// Generates blank RGB frames at a fixed nominal rate without hardware.
///
/// Used by executor tests and audio-only demos. Paced mode sleeps one
/// frame interval per frame to mimic a live device; unpaced mode emits
/// as fast as the consumer drains.
pub struct SyntheticCameraSource {
    width: u32,
    height: u32,
    fps: f64,
    total_frames: usize,
    paced: bool,
    opened: bool,
}

impl SyntheticCameraSource {
    pub fn new(width: u32, height: u32, fps: f64, total_frames: usize) -> Self {
        Self {
            width,
            height,
            fps,
            total_frames,
            paced: true,
            opened: false,
        }
    }

    /// No inter-frame sleeping; frame timestamps still advance by the
    /// nominal interval.
    pub fn unpaced(width: u32, height: u32, fps: f64, total_frames: usize) -> Self {
        Self {
            paced: false,
            ..Self::new(width, height, fps, total_frames)
        }
    }
}

impl CameraSource for SyntheticCameraSource {
    fn open(&mut self) -> Result<CameraMetadata, Box<dyn std::error::Error>> {
        self.opened = true;
        Ok(CameraMetadata {
            width: self.width,
            height: self.height,
            fps: self.fps,
            source: "synthetic".to_string(),
        })
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        if !self.opened {
            return Box::new(std::iter::once(Err(
                "SyntheticCameraSource: not opened".into()
            )));
        }

        let (width, height, fps, paced) = (self.width, self.height, self.fps, self.paced);
        let interval = if fps > 0.0 { 1.0 / fps } else { 0.0 };
        let pixels = (width as usize) * (height as usize) * 3;

        Box::new((0..self.total_frames).map(move |index| {
            if paced && interval > 0.0 {
                std::thread::sleep(Duration::from_secs_f64(interval));
            }
            Ok(Frame::new(
                vec![0u8; pixels],
                width,
                height,
                3,
                index,
                index as f64 * interval,
            ))
        }))
    }

    fn close(&mut self) {
        self.opened = false;
    }
}
