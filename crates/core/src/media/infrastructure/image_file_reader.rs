use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::media::domain::frame_reader::FrameReader;
use crate::media::domain::media_metadata::MediaMetadata;
use crate::shared::constants::{IMAGE_EXTENSIONS, NOT_AN_IMAGE_ERROR};
use crate::shared::detection_source::DetectionSource;
use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum ImageLoadError {
    #[error("{}", NOT_AN_IMAGE_ERROR)]
    NotAnImage(PathBuf),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// True when the path's extension names a supported image format.
pub fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Decode an image file into an RGB frame.
///
/// Files without a known image extension are accepted only when their
/// content is recognisably an image.
pub fn load_image(path: &Path) -> Result<Frame, ImageLoadError> {
    let reader = image::ImageReader::open(path)
        .map_err(|e| ImageLoadError::Io {
            path: path.to_path_buf(),
            source: e,
        })?
        .with_guessed_format()
        .map_err(|e| ImageLoadError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

    if reader.format().is_none() {
        return Err(ImageLoadError::NotAnImage(path.to_path_buf()));
    }

    let img = reader.decode().map_err(|e| match e {
        image::ImageError::Unsupported(_) if !has_image_extension(path) => {
            ImageLoadError::NotAnImage(path.to_path_buf())
        }
        other => ImageLoadError::Decode {
            path: path.to_path_buf(),
            source: other,
        },
    })?;
    Ok(Frame::from_rgb_image(img.to_rgb8(), 0))
}

/// Adapts a single image file to the [`FrameReader`] interface.
///
/// The image is a one-frame source with `fps = 0`, so the detection loop
/// runs on it once.
pub struct ImageFileReader {
    frame: Option<Frame>,
    metadata: Option<MediaMetadata>,
}

impl ImageFileReader {
    pub fn new() -> Self {
        Self {
            frame: None,
            metadata: None,
        }
    }
}

impl Default for ImageFileReader {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameReader for ImageFileReader {
    fn open(&mut self, location: &Path) -> Result<MediaMetadata, Box<dyn std::error::Error>> {
        let frame = load_image(location)?;
        let metadata = MediaMetadata {
            width: frame.width(),
            height: frame.height(),
            fps: 0.0,
            source: DetectionSource::Upload,
            location: Some(location.to_path_buf()),
        };
        self.frame = Some(frame);
        self.metadata = Some(metadata.clone());
        Ok(metadata)
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        if self.frame.is_none() {
            return Box::new(std::iter::once(Err("ImageFileReader: not opened".into())));
        }
        Box::new(self.frame.take().into_iter().map(Ok))
    }

    fn close(&mut self) {
        self.frame = None;
        self.metadata = None;
    }
}
