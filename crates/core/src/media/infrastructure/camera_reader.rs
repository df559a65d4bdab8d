use std::path::Path;

use thiserror::Error;

use crate::media::domain::frame_reader::FrameReader;
use crate::media::domain::media_metadata::MediaMetadata;
use crate::shared::constants::{IDEAL_CAMERA_HEIGHT, IDEAL_CAMERA_WIDTH, WEBCAM_ERROR};
use crate::shared::detection_source::DetectionSource;
use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum CameraError {
    /// Device missing, busy, or permission denied. The detail goes to the log.
    #[error("{}", WEBCAM_ERROR)]
    Access(String),
    #[error("no capture backend named {0} is available")]
    Unsupported(&'static str),
    #[error("capture device {0} has no video stream")]
    NoVideoStream(String),
}

/// libavdevice input format used for cameras on this platform.
pub fn capture_format_name() -> &'static str {
    if cfg!(target_os = "macos") {
        "avfoundation"
    } else if cfg!(target_os = "windows") {
        "dshow"
    } else {
        "v4l2"
    }
}

/// The camera opened when no device is configured.
pub fn default_device() -> &'static str {
    if cfg!(target_os = "macos") {
        "0"
    } else if cfg!(target_os = "windows") {
        "video=Integrated Camera"
    } else {
        "/dev/video0"
    }
}

/// Capture options asking the device for a preferred resolution and rate.
///
/// Devices treat these as hints; the opened stream reports what was granted.
pub fn capture_options(width: u32, height: u32, fps: u32) -> Vec<(&'static str, String)> {
    vec![
        ("video_size", format!("{width}x{height}")),
        ("framerate", fps.to_string()),
    ]
}

/// Streams RGB frames from a local camera via libavdevice.
pub struct CameraReader {
    width: u32,
    height: u32,
    fps: u32,
    input_ctx: Option<ffmpeg_next::format::context::Input>,
    decoder: Option<ffmpeg_next::decoder::Video>,
    video_stream_index: usize,
    metadata: Option<MediaMetadata>,
}

// Safety: CameraReader is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for CameraReader {}

impl CameraReader {
    pub fn new() -> Self {
        Self::with_resolution(IDEAL_CAMERA_WIDTH, IDEAL_CAMERA_HEIGHT, 30)
    }

    pub fn with_resolution(width: u32, height: u32, fps: u32) -> Self {
        Self {
            width,
            height,
            fps,
            input_ctx: None,
            decoder: None,
            video_stream_index: 0,
            metadata: None,
        }
    }

    pub fn metadata(&self) -> Option<&MediaMetadata> {
        self.metadata.as_ref()
    }

    fn find_capture_format() -> Result<ffmpeg_next::Format, CameraError> {
        let name = capture_format_name();
        ffmpeg_next::device::input::video()
            .find(|fmt| fmt.name() == name)
            .ok_or(CameraError::Unsupported(name))
    }
}

impl Default for CameraReader {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameReader for CameraReader {
    fn open(&mut self, location: &Path) -> Result<MediaMetadata, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;
        ffmpeg_next::device::register_all();

        let device = location.to_string_lossy().to_string();
        let format = Self::find_capture_format()?;

        let mut options = ffmpeg_next::Dictionary::new();
        for (key, value) in capture_options(self.width, self.height, self.fps) {
            options.set(key, &value);
        }

        let ictx = ffmpeg_next::format::open_with(
            &device,
            &format,
            options,
        )
        .map(|ctx| ctx.input())
        .map_err(|e| {
            log::error!("Error accessing webcam {device}: {e}");
            CameraError::Access(e.to_string())
        })?;

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or_else(|| CameraError::NoVideoStream(device.clone()))?;

        let video_stream_index = stream.index();
        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;

        let rate = stream.avg_frame_rate();
        let fps = if rate.denominator() != 0 {
            rate.numerator() as f64 / rate.denominator() as f64
        } else {
            self.fps as f64
        };

        let metadata = MediaMetadata {
            width: decoder.width(),
            height: decoder.height(),
            fps,
            source: DetectionSource::Webcam,
            location: Some(location.to_path_buf()),
        };
        log::info!(
            "Opened camera {device} at {}x{} ({fps:.1} fps)",
            metadata.width,
            metadata.height
        );

        self.video_stream_index = video_stream_index;
        self.metadata = Some(metadata.clone());
        self.decoder = Some(decoder);
        self.input_ctx = Some(ictx);

        Ok(metadata)
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        let (Some(ictx), Some(decoder)) = (self.input_ctx.as_mut(), self.decoder.as_mut()) else {
            return Box::new(std::iter::once(Err("CameraReader: not opened".into())));
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
            Ok(scaler) => scaler,
            Err(e) => return Box::new(std::iter::once(Err(e.into()))),
        };

        Box::new(CameraFrameIter {
            ictx,
            decoder,
            scaler,
            width,
            height,
            video_stream_index: self.video_stream_index,
            frame_index: 0,
            done: false,
        })
    }

    fn close(&mut self) {
        if self.input_ctx.take().is_some() {
            log::info!("Camera released");
        }
        self.decoder = None;
        self.metadata = None;
    }
}

/// Decodes camera packets one frame at a time. Ends only when the device
/// stops delivering packets.
struct CameraFrameIter<'a> {
    ictx: &'a mut ffmpeg_next::format::context::Input,
    decoder: &'a mut ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    width: u32,
    height: u32,
    video_stream_index: usize,
    frame_index: usize,
    done: bool,
}

impl CameraFrameIter<'_> {
    fn try_receive(&mut self) -> Option<Result<Frame, Box<dyn std::error::Error>>> {
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        if self.decoder.receive_frame(&mut decoded).is_err() {
            return None;
        }

        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::empty();
        if let Err(e) = self.scaler.run(&decoded, &mut rgb_frame) {
            return Some(Err(Box::new(e)));
        }

        let pixels = extract_rgb_pixels(&rgb_frame, self.width, self.height);
        let frame = Frame::new(pixels, self.width, self.height, 3, self.frame_index);
        self.frame_index += 1;
        Some(Ok(frame))
    }
}

impl Iterator for CameraFrameIter<'_> {
    type Item = Result<Frame, Box<dyn std::error::Error>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if let Some(result) = self.try_receive() {
            return Some(result);
        }

        loop {
            let Some((stream, packet)) = self.ictx.packets().next() else {
                log::warn!("Camera stopped delivering frames");
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

/// Copies pixel data from an ffmpeg frame into a contiguous RGB buffer.
///
/// ffmpeg frames may pad each row (stride > width*3); the padding is dropped.
fn extract_rgb_pixels(
    rgb_frame: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let w = width as usize;
    let h = height as usize;

    let mut pixels = Vec::with_capacity(w * h * 3);
    for row in 0..h {
        let row_start = row * stride;
        pixels.extend_from_slice(&data[row_start..row_start + w * 3]);
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_options_request_ideal_resolution() {
        let opts = capture_options(IDEAL_CAMERA_WIDTH, IDEAL_CAMERA_HEIGHT, 30);
        assert_eq!(opts[0], ("video_size", "1280x720".to_string()));
        assert_eq!(opts[1], ("framerate", "30".to_string()));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_linux_defaults() {
        assert_eq!(capture_format_name(), "v4l2");
        assert_eq!(default_device(), "/dev/video0");
    }

    #[test]
    fn test_extract_rgb_pixels_strips_padding() {
        ffmpeg_next::init().unwrap();
        let (w, h) = (5u32, 3u32);
        let mut frame =
            ffmpeg_next::util::frame::video::Video::new(ffmpeg_next::format::Pixel::RGB24, w, h);
        let stride = frame.stride(0);
        let data = frame.data_mut(0);
        for row in 0..h as usize {
            for col in 0..w as usize {
                let offset = row * stride + col * 3;
                data[offset] = row as u8;
                data[offset + 1] = col as u8;
                data[offset + 2] = 7;
            }
        }

        let pixels = extract_rgb_pixels(&frame, w, h);
        assert_eq!(pixels.len(), (w * h * 3) as usize);
        let last = ((2 * w + 4) * 3) as usize;
        assert_eq!(&pixels[last..last + 3], &[2, 4, 7]);
    }

    #[test]
    fn test_frames_without_open_returns_error() {
        let mut reader = CameraReader::new();
        assert!(reader.frames().next().unwrap().is_err());
    }

    #[test]
    fn test_open_missing_device_fails() {
        let mut reader = CameraReader::new();
        assert!(reader.open(Path::new("/nonexistent/video99")).is_err());
        assert!(reader.metadata().is_none());
    }

    #[test]
    fn test_access_error_message() {
        let err = CameraError::Access("Permission denied".into());
        assert_eq!(
            err.to_string(),
            "Failed to access webcam. Please ensure you have given permission."
        );
    }

    #[test]
    fn test_close_idempotent() {
        let mut reader = CameraReader::new();
        reader.close();
        reader.close();
    }
}
