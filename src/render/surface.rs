use crate::foundation::core::{Point, Rgba8, SurfaceSize};
use crate::foundation::error::StippleResult;

/// How new draws combine with pixels already on the surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Compositing {
    /// Regular alpha compositing.
    #[default]
    SourceOver,
    /// Additive: overlapping colors brighten.
    Lighter,
}

/// The drawing surface an engine renders into.
///
/// Draw calls between [`DrawSurface::clear`] and [`DrawSurface::present`] make up one frame.
pub trait DrawSurface {
    fn size(&self) -> SurfaceSize;

    /// Reallocate for a new measured size. Content is discarded.
    fn resize(&mut self, size: SurfaceSize) -> StippleResult<()>;

    fn set_compositing(&mut self, mode: Compositing);

    /// Erase everything drawn so far.
    fn clear(&mut self) -> StippleResult<()>;

    /// Straight segment with butt caps.
    fn stroke_line(&mut self, from: Point, to: Point, width: f64, color: Rgba8)
    -> StippleResult<()>;

    fn fill_disc(&mut self, center: Point, radius: f64, color: Rgba8) -> StippleResult<()>;

    /// Make the frame visible.
    fn present(&mut self) -> StippleResult<()>;
}

/// Snapshot of a surface's pixels, four bytes per pixel with no row padding.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    /// Set for raster output; cleared by [`FrameRGBA::to_straight`].
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Copy with straight alpha, suitable for PNG encoding.
    pub fn to_straight(&self) -> FrameRGBA {
        let mut data = self.data.clone();
        if self.premultiplied {
            for px in data.chunks_exact_mut(4) {
                let a = u16::from(px[3]);
                if a == 0 {
                    px[0] = 0;
                    px[1] = 0;
                    px[2] = 0;
                    continue;
                }
                for c in &mut px[..3] {
                    *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
                }
            }
        }
        FrameRGBA {
            width: self.width,
            height: self.height,
            data,
            premultiplied: false,
        }
    }

    /// Composite onto an opaque background color.
    pub fn flatten_onto(&self, bg: Rgba8) -> FrameRGBA {
        let straight = self.to_straight();
        let mut data = straight.data;
        for px in data.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            let inv = 255 - a;
            px[0] = ((u16::from(px[0]) * a + u16::from(bg.r) * inv + 127) / 255) as u8;
            px[1] = ((u16::from(px[1]) * a + u16::from(bg.g) * inv + 127) / 255) as u8;
            px[2] = ((u16::from(px[2]) * a + u16::from(bg.b) * inv + 127) / 255) as u8;
            px[3] = 255;
        }
        FrameRGBA {
            width: self.width,
            height: self.height,
            data,
            premultiplied: false,
        }
    }
}

/// One recorded draw call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Clear,
    Compositing(Compositing),
    Line {
        from: Point,
        to: Point,
        width: f64,
        color: Rgba8,
    },
    Disc {
        center: Point,
        radius: f64,
        color: Rgba8,
    },
    Present,
}

/// Surface that records draw calls instead of rasterizing.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    size: SurfaceSize,
    commands: Vec<DrawCommand>,
    presented: u64,
}

impl RecordingSurface {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            commands: Vec::new(),
            presented: 0,
        }
    }

    /// Commands since the last clear (the current or last presented frame).
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn lines(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
    }

    pub fn discs(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Disc { .. }))
    }

    /// Number of frames presented so far.
    pub fn presented(&self) -> u64 {
        self.presented
    }
}

impl DrawSurface for RecordingSurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn resize(&mut self, size: SurfaceSize) -> StippleResult<()> {
        self.size = size;
        self.commands.clear();
        Ok(())
    }

    fn set_compositing(&mut self, mode: Compositing) {
        self.commands.push(DrawCommand::Compositing(mode));
    }

    fn clear(&mut self) -> StippleResult<()> {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
        Ok(())
    }

    fn stroke_line(
        &mut self,
        from: Point,
        to: Point,
        width: f64,
        color: Rgba8,
    ) -> StippleResult<()> {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            width,
            color,
        });
        Ok(())
    }

    fn fill_disc(&mut self, center: Point, radius: f64, color: Rgba8) -> StippleResult<()> {
        self.commands.push(DrawCommand::Disc {
            center,
            radius,
            color,
        });
        Ok(())
    }

    fn present(&mut self) -> StippleResult<()> {
        self.commands.push(DrawCommand::Present);
        self.presented += 1;
        Ok(())
    }
}
