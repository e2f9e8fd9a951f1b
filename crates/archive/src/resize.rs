use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResizeError {
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Failed to encode resized image: {0}")]
    Encode(String),
    #[error("Unsupported output format: '{0}'")]
    UnsupportedFormat(String),
    #[error("Target size {0}x{1} is empty")]
    EmptyTarget(u32, u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Target box per orientation. Photos are scaled to fit their box with the
/// aspect ratio kept, so a 4:3 photo lands exactly on a 4:3 box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeSpec {
    pub landscape: Dimensions,
    pub portrait: Dimensions,
}

impl Default for ResizeSpec {
    fn default() -> Self {
        Self {
            landscape: Dimensions::new(1600, 1200),
            portrait: Dimensions::new(1200, 1600),
        }
    }
}

impl ResizeSpec {
    /// Square photos count as landscape.
    pub fn target_for(&self, width: u32, height: u32) -> Dimensions {
        if width >= height {
            self.landscape
        } else {
            self.portrait
        }
    }
}

/// Scale one photo and re-encode it in the format its extension names.
pub fn resize_image(
    data: &[u8],
    extension: &str,
    spec: &ResizeSpec,
) -> Result<Vec<u8>, ResizeError> {
    let ext = extension.trim_start_matches('.');
    let format = ImageFormat::from_extension(ext)
        .ok_or_else(|| ResizeError::UnsupportedFormat(ext.to_string()))?;

    let img = image::load_from_memory(data)?;
    let target = spec.target_for(img.width(), img.height());
    if target.width == 0 || target.height == 0 {
        return Err(ResizeError::EmptyTarget(target.width, target.height));
    }

    let resized = img.resize(target.width, target.height, FilterType::Lanczos3);
    // The JPEG encoder rejects alpha channels.
    let resized = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(resized.to_rgb8()),
        _ => resized,
    };

    let mut buf = Vec::new();
    resized
        .write_to(&mut Cursor::new(&mut buf), format)
        .map_err(|e| ResizeError::Encode(e.to_string()))?;
    Ok(buf)
}
