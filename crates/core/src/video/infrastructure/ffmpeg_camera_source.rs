use std::path::PathBuf;
use std::time::Instant;

use crate::shared::camera_metadata::CameraMetadata;
use crate::shared::frame::Frame;
use crate::video::domain::camera_source::CameraSource;

/// Decodes a camera device or recorded clip via ffmpeg-next
/// (libavformat + libavcodec), converting each frame to RGB24.
///
/// On Linux a V4L2 device path (`/dev/video0`) is probed like any other
/// input; recorded clips let the monitor replay captured sessions.
/// Capture timestamps come from the stream rate when it reports one
/// (deterministic for clips) and from the wall clock otherwise.
pub struct FfmpegCameraSource {
    source: PathBuf,
    input_ctx: Option<ffmpeg_next::format::context::Input>,
    video_stream_index: usize,
    fps: f64,
    opened_at: Option<Instant>,
}

// Safety: FfmpegCameraSource is only used from a single thread at a
// time. The raw pointers inside ffmpeg types are not shared across
// threads.
unsafe impl Send for FfmpegCameraSource {}

impl FfmpegCameraSource {
    pub fn new(source: PathBuf) -> Self {
        Self {
            source,
            input_ctx: None,
            video_stream_index: 0,
            fps: 0.0,
            opened_at: None,
        }
    }
}

impl CameraSource for FfmpegCameraSource {
    fn open(&mut self) -> Result<CameraMetadata, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let ictx = ffmpeg_next::format::input(&self.source)?;

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream found")?;

        let video_stream_index = stream.index();
        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;

        let rate = stream.rate();
        let fps = if rate.denominator() != 0 {
            rate.numerator() as f64 / rate.denominator() as f64
        } else {
            0.0
        };

        let metadata = CameraMetadata {
            width: decoder.width(),
            height: decoder.height(),
            fps,
            source: self.source.display().to_string(),
        };

        self.video_stream_index = video_stream_index;
        self.fps = fps;
        self.opened_at = Some(Instant::now());
        self.input_ctx = Some(ictx);

        Ok(metadata)
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        let fps = self.fps;
        let opened_at = self.opened_at.unwrap_or_else(Instant::now);
        let video_stream_index = self.video_stream_index;

        let Some(ictx) = self.input_ctx.as_mut() else {
            return Box::new(std::iter::once(Err("FfmpegCameraSource: not opened".into())));
        };

        let Some(stream) = ictx.streams().best(ffmpeg_next::media::Type::Video) else {
            return Box::new(std::iter::once(Err(
                "FfmpegCameraSource: video stream vanished".into(),
            )));
        };
        let decoder = match ffmpeg_next::codec::context::Context::from_parameters(
            stream.parameters(),
        )
        .and_then(|ctx| ctx.decoder().video())
        {
            Ok(d) => d,
            Err(e) => return Box::new(std::iter::once(Err(e.into()))),
        };

        let width = decoder.width();
        let height = decoder.height();

        let scaler = match ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        ) {
            Ok(s) => s,
            Err(e) => return Box::new(std::iter::once(Err(e.into()))),
        };

        Box::new(CaptureIter {
            ictx,
            decoder,
            scaler,
            width,
            height,
            video_stream_index,
            frame_index: 0,
            fps,
            opened_at,
            flushing: false,
            done: false,
        })
    }

    fn close(&mut self) {
        self.input_ctx = None;
        self.opened_at = None;
    }
}

/// Lazy decode iterator: one frame at a time, nothing buffered.
struct CaptureIter<'a> {
    ictx: &'a mut ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    width: u32,
    height: u32,
    video_stream_index: usize,
    frame_index: usize,
    fps: f64,
    opened_at: Instant,
    flushing: bool,
    done: bool,
}

impl CaptureIter<'_> {
    fn timestamp(&self) -> f64 {
        if self.fps > 0.0 {
            self.frame_index as f64 / self.fps
        } else {
            self.opened_at.elapsed().as_secs_f64()
        }
    }

    fn try_receive(&mut self) -> Option<Result<Frame, Box<dyn std::error::Error>>> {
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        if self.decoder.receive_frame(&mut decoded).is_err() {
            return None;
        }

        let mut rgb = ffmpeg_next::util::frame::video::Video::empty();
        if let Err(e) = self.scaler.run(&decoded, &mut rgb) {
            return Some(Err(Box::new(e)));
        }

        let pixels = extract_rgb_pixels(&rgb, self.width, self.height);
        let frame = Frame::new(
            pixels,
            self.width,
            self.height,
            3,
            self.frame_index,
            self.timestamp(),
        );
        self.frame_index += 1;
        Some(Ok(frame))
    }
}

impl Iterator for CaptureIter<'_> {
    type Item = Result<Frame, Box<dyn std::error::Error>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if let Some(result) = self.try_receive() {
            return Some(result);
        }

        if self.flushing {
            self.done = true;
            return None;
        }

        loop {
            let Some((stream, packet)) = self.ictx.packets().next() else {
                let _ = self.decoder.send_eof();
                self.flushing = true;
                if let Some(result) = self.try_receive() {
                    return Some(result);
                }
                self.done = true;
                return None;
            };

            if stream.index() != self.video_stream_index {
                continue;
            }

            if self.decoder.send_packet(&packet).is_err() {
                continue;
            }

            if let Some(result) = self.try_receive() {
                return Some(result);
            }
        }
    }
}

/// Copy pixel rows out of an ffmpeg RGB24 frame, honoring stride padding.
fn extract_rgb_pixels(
    rgb: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = rgb.stride(0);
    let row_bytes = (width as usize) * 3;
    let data = rgb.data(0);

    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        pixels.extend_from_slice(&data[start..start + row_bytes]);
    }
    pixels
}
