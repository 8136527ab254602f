use vello_cpu::kurbo::{self, Shape};
use vello_cpu::peniko::{self, BlendMode, Compose, Mix};

use crate::foundation::core::{Point, Rgba8, SurfaceSize};
use crate::foundation::error::{StippleError, StippleResult};
use crate::render::surface::{Compositing, DrawSurface, FrameRGBA};

const DISC_TOLERANCE: f64 = 0.1;

struct Raster {
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
}

/// CPU drawing surface rasterized with `vello_cpu`.
///
/// Draw calls are recorded into a render context and rasterized into the backing pixmap on
/// [`DrawSurface::present`]. A zero-area surface accepts draws and discards them.
pub struct CpuSurface {
    size: SurfaceSize,
    raster: Option<Raster>,
    blend: BlendMode,
    presented: u64,
}

impl CpuSurface {
    pub fn new(size: SurfaceSize) -> StippleResult<Self> {
        Ok(Self {
            size,
            raster: make_raster(size)?,
            blend: BlendMode::default(),
            presented: 0,
        })
    }

    /// Last presented frame (premultiplied RGBA8).
    pub fn frame(&self) -> FrameRGBA {
        let data = match &self.raster {
            Some(r) => r.pixmap.data_as_u8_slice().to_vec(),
            None => Vec::new(),
        };
        FrameRGBA {
            width: self.size.width,
            height: self.size.height,
            data,
            premultiplied: true,
        }
    }

    /// Number of frames presented so far.
    pub fn presented(&self) -> u64 {
        self.presented
    }
}

fn make_raster(size: SurfaceSize) -> StippleResult<Option<Raster>> {
    if size.is_empty() {
        return Ok(None);
    }
    let w: u16 = size
        .width
        .try_into()
        .map_err(|_| StippleError::render("surface width exceeds u16"))?;
    let h: u16 = size
        .height
        .try_into()
        .map_err(|_| StippleError::render("surface height exceeds u16"))?;
    Ok(Some(Raster {
        ctx: vello_cpu::RenderContext::new(w, h),
        pixmap: vello_cpu::Pixmap::new(w, h),
    }))
}

fn paint(color: Rgba8) -> peniko::Color {
    peniko::Color::from_rgba8(color.r, color.g, color.b, color.a)
}

fn blend_for(mode: Compositing) -> BlendMode {
    match mode {
        Compositing::SourceOver => BlendMode::default(),
        Compositing::Lighter => BlendMode::new(Mix::Normal, Compose::Plus),
    }
}

/// Quad covering a butt-capped segment of the given width. `None` when nothing would be drawn.
fn segment_quad(from: Point, to: Point, width: f64) -> Option<kurbo::BezPath> {
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    let len = dx.hypot(dy);
    if len == 0.0 || width <= 0.0 {
        return None;
    }
    let (nx, ny) = (-dy / len * width / 2.0, dx / len * width / 2.0);
    let mut path = kurbo::BezPath::new();
    path.move_to(kurbo::Point::new(from.x + nx, from.y + ny));
    path.line_to(kurbo::Point::new(to.x + nx, to.y + ny));
    path.line_to(kurbo::Point::new(to.x - nx, to.y - ny));
    path.line_to(kurbo::Point::new(from.x - nx, from.y - ny));
    path.close_path();
    Some(path)
}

fn check_finite(values: &[f64]) -> StippleResult<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(StippleError::render("non-finite draw coordinates"))
    }
}

impl DrawSurface for CpuSurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn resize(&mut self, size: SurfaceSize) -> StippleResult<()> {
        if size != self.size {
            self.raster = make_raster(size)?;
            self.size = size;
        }
        Ok(())
    }

    fn set_compositing(&mut self, mode: Compositing) {
        self.blend = blend_for(mode);
    }

    fn clear(&mut self) -> StippleResult<()> {
        if let Some(r) = &mut self.raster {
            r.ctx.reset();
            r.pixmap.data_as_u8_slice_mut().fill(0);
        }
        Ok(())
    }

    fn stroke_line(
        &mut self,
        from: Point,
        to: Point,
        width: f64,
        color: Rgba8,
    ) -> StippleResult<()> {
        check_finite(&[from.x, from.y, to.x, to.y, width])?;
        let Some(r) = &mut self.raster else {
            return Ok(());
        };
        let Some(path) = segment_quad(from, to, width) else {
            return Ok(());
        };
        r.ctx.set_blend_mode(self.blend);
        r.ctx.set_paint(paint(color));
        r.ctx.fill_path(&path);
        Ok(())
    }

    fn fill_disc(&mut self, center: Point, radius: f64, color: Rgba8) -> StippleResult<()> {
        check_finite(&[center.x, center.y, radius])?;
        let Some(r) = &mut self.raster else {
            return Ok(());
        };
        if radius <= 0.0 {
            return Ok(());
        }
        let path = kurbo::Circle::new(kurbo::Point::new(center.x, center.y), radius)
            .to_path(DISC_TOLERANCE);
        r.ctx.set_blend_mode(self.blend);
        r.ctx.set_paint(paint(color));
        r.ctx.fill_path(&path);
        Ok(())
    }

    fn present(&mut self) -> StippleResult<()> {
        if let Some(r) = &mut self.raster {
            r.ctx.flush();
            r.ctx.render_to_pixmap(&mut r.pixmap);
        }
        self.presented += 1;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
