use image::imageops::{self, FilterType};

use crate::engine::config::SampleMargin;
use crate::foundation::core::SurfaceSize;
use crate::foundation::error::{StippleError, StippleResult};
use crate::sampling::decode::DecodedImage;

/// Straight RGBA8 pixels aligned to the surface grid, row-major.
///
/// `data` always holds exactly `width * height * 4` bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Fully transparent buffer of the given size.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    /// Wrap caller-provided RGBA8 bytes. Fails unless the length matches the dimensions.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> StippleResult<Self> {
        let expected = (width as usize) * (height as usize) * 4;
        if data.len() != expected {
            return Err(StippleError::validation(format!(
                "pixel buffer {width}x{height} needs {expected} bytes, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(((y as usize) * (self.width as usize) + (x as usize)) * 4)
    }

    /// RGBA at `(x, y)`; transparent outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.offset(x, y)
            .and_then(|i| self.data.get(i..i + 4))
            .and_then(|px| px.try_into().ok())
            .unwrap_or([0; 4])
    }

    /// Writes outside the buffer are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if let Some(i) = self.offset(x, y) {
            self.data[i..i + 4].copy_from_slice(&rgba);
        }
    }
}

/// Size the image is drawn at: natural size, or scaled down uniformly to fit the
/// margin-reduced surface. Never scales up.
pub fn fit_size(natural: (u32, u32), surface: SurfaceSize, margin: SampleMargin) -> (f64, f64) {
    let (w, h) = (f64::from(natural.0), f64::from(natural.1));
    let max_w = margin.reduce(surface.width);
    let max_h = margin.reduce(surface.height);
    if w > max_w || h > max_h {
        let ratio = (w / max_w).max(h / max_h);
        (w / ratio, h / ratio)
    } else {
        (w, h)
    }
}

/// Draw `image` centered on a transparent offscreen buffer the size of the surface.
///
/// Returns `None` for a zero-area surface; nothing downstream should run in that case.
#[tracing::instrument(skip(image), fields(image_w = image.width(), image_h = image.height()))]
pub fn sample(image: &DecodedImage, surface: SurfaceSize, margin: SampleMargin) -> Option<PixelBuffer> {
    if surface.is_empty() {
        tracing::debug!("zero-area surface, skipping sampling");
        return None;
    }

    let (fw, fh) = fit_size((image.width(), image.height()), surface, margin);
    let draw_w = (fw.round() as u32).max(1);
    let draw_h = (fh.round() as u32).max(1);

    let mut canvas = image::RgbaImage::new(surface.width, surface.height);
    let x = ((f64::from(surface.width) - fw) / 2.0).round() as i64;
    let y = ((f64::from(surface.height) - fh) / 2.0).round() as i64;

    if draw_w == image.width() && draw_h == image.height() {
        imageops::replace(&mut canvas, &image.rgba, x, y);
    } else {
        let scaled = imageops::resize(&image.rgba, draw_w, draw_h, FilterType::Triangle);
        imageops::replace(&mut canvas, &scaled, x, y);
    }

    Some(PixelBuffer {
        width: surface.width,
        height: surface.height,
        data: canvas.into_raw(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/sampling/pixels.rs"]
mod tests;
