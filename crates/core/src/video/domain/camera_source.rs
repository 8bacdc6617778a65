use crate::shared::camera_metadata::CameraMetadata;
use crate::shared::frame::Frame;

/// Supplies live frames at a roughly fixed rate.
///
/// Implementations own the device or decoder; the pipeline only sees
/// `Frame`s stamped with capture time. Lifecycle is open → frames →
/// close; `close` must be safe at any point, including before `open`
/// or mid-iteration.
pub trait CameraSource: Send {
    /// Acquires the stream and returns its properties. A failure here
    /// aborts start; no monitoring state is created.
    fn open(&mut self) -> Result<CameraMetadata, Box<dyn std::error::Error>>;

    /// Returns an iterator over frames in capture order.
    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_>;

    /// Releases the stream.
    fn close(&mut self);
}
