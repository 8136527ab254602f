use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{StippleError, StippleResult};

/// Where the source image comes from.
#[derive(Clone, Debug)]
pub enum ImageSource {
    /// Encoded image bytes (PNG, JPEG, ...).
    Bytes(Arc<[u8]>),
    /// Path to an encoded image file.
    Path(PathBuf),
}

impl ImageSource {
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::Bytes(bytes.into())
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }
}

/// A decoded image in straight RGBA8, at its natural size.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    pub(crate) rgba: image::RgbaImage,
}

impl DecodedImage {
    pub fn from_rgba(rgba: image::RgbaImage) -> Self {
        Self { rgba }
    }

    pub fn width(&self) -> u32 {
        self.rgba.width()
    }

    pub fn height(&self) -> u32 {
        self.rgba.height()
    }
}

pub fn decode_image(bytes: &[u8]) -> StippleResult<DecodedImage> {
    let dyn_img = image::load_from_memory(bytes)
        .context("decode image from memory")
        .map_err(|e| StippleError::decode(format!("{e:#}")))?;
    Ok(DecodedImage {
        rgba: dyn_img.to_rgba8(),
    })
}

/// Read (if needed) and decode a source.
pub fn load_source(source: &ImageSource) -> StippleResult<DecodedImage> {
    match source {
        ImageSource::Bytes(bytes) => decode_image(bytes),
        ImageSource::Path(path) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("read image '{}'", path.display()))
                .map_err(|e| StippleError::decode(format!("{e:#}")))?;
            decode_image(&bytes)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sampling/decode.rs"]
mod tests;
