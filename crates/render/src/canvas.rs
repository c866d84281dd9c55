use walkabout_common::{Image, Rect, Rgba, Surface, SurfaceError};

/// CPU raster surface: one logical unit is one pixel.
///
/// Behaves like a 2D canvas context: resizing resets the context state, which
/// here means smoothing turns back on. Callers that want crisp pixel art must
/// disable it again after every resize.
#[derive(Debug, Clone)]
pub struct SoftwareCanvas {
    image: Image,
    smoothing: bool,
}

impl SoftwareCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: Image::filled(width, height, Rgba::TRANSPARENT),
            smoothing: true,
        }
    }

    /// The backing pixels.
    pub fn image(&self) -> &Image {
        &self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        self.image.get(x, y)
    }

    /// Pixel columns/rows covered by `rect`, clipped to the canvas.
    fn span(&self, rect: Rect) -> Option<(u32, u32, u32, u32)> {
        let clip = |lo: f64, hi: f64, max: u32| {
            let lo = lo.round().clamp(0.0, max as f64) as u32;
            let hi = hi.round().clamp(0.0, max as f64) as u32;
            (lo < hi).then_some((lo, hi))
        };
        let (x0, x1) = clip(rect.x, rect.right(), self.image.width())?;
        let (y0, y1) = clip(rect.y, rect.bottom(), self.image.height())?;
        Some((x0, x1, y0, y1))
    }

    fn blend(&mut self, x: u32, y: u32, color: Rgba) {
        if let Some(dst) = self.image.get(x, y) {
            self.image.set(x, y, color.over(dst));
        }
    }
}

impl Surface for SoftwareCanvas {
    fn size(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    fn clear(&mut self) {
        self.image.pixels_mut().fill(Rgba::TRANSPARENT);
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        let Some((x0, x1, y0, y1)) = self.span(rect) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                self.blend(x, y, color);
            }
        }
    }

    fn blit(&mut self, source: &Image, src: Rect, dst: Rect) -> Result<(), SurfaceError> {
        source.check_source(src)?;
        if dst.is_empty() {
            return Ok(());
        }
        let Some((x0, x1, y0, y1)) = self.span(dst) else {
            return Ok(());
        };

        let step_x = src.w / dst.w;
        let step_y = src.h / dst.h;
        for y in y0..y1 {
            let v = src.y + (y as f64 + 0.5 - dst.y) * step_y;
            for x in x0..x1 {
                let u = src.x + (x as f64 + 0.5 - dst.x) * step_x;
                let color = if self.smoothing {
                    sample_bilinear(source, src, u, v)
                } else {
                    sample_nearest(source, src, u, v)
                };
                self.blend(x, y, color);
            }
        }
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        let mut next = Image::filled(width, height, Rgba::TRANSPARENT);
        let keep_w = width.min(self.image.width()) as usize;
        let keep_h = height.min(self.image.height());
        if keep_w > 0 {
            let old_w = self.image.width() as usize;
            let new_w = width as usize;
            for y in 0..keep_h as usize {
                let from = &self.image.pixels()[y * old_w..y * old_w + keep_w];
                next.pixels_mut()[y * new_w..y * new_w + keep_w].copy_from_slice(from);
            }
        }
        tracing::debug!(
            from = ?(self.image.width(), self.image.height()),
            to = ?(width, height),
            "canvas resized"
        );
        self.image = next;
        self.smoothing = true;
    }

    fn smoothing(&self) -> bool {
        self.smoothing
    }

    fn set_smoothing(&mut self, enabled: bool) {
        self.smoothing = enabled;
    }
}

/// Texel coordinate clamped into `src`, so samples never bleed into the
/// neighbouring frame on the sheet.
fn texel(source: &Image, src: Rect, x: f64, y: f64) -> Rgba {
    let x = x.min(src.right() - 1.0).max(src.x).floor() as u32;
    let y = y.min(src.bottom() - 1.0).max(src.y).floor() as u32;
    source.get(x, y).unwrap_or_default()
}

fn sample_nearest(source: &Image, src: Rect, u: f64, v: f64) -> Rgba {
    texel(source, src, u, v)
}

fn sample_bilinear(source: &Image, src: Rect, u: f64, v: f64) -> Rgba {
    let (u, v) = (u - 0.5, v - 0.5);
    let (x0, y0) = (u.floor(), v.floor());
    let (fx, fy) = (u - x0, v - y0);
    let c00 = texel(source, src, x0, y0);
    let c10 = texel(source, src, x0 + 1.0, y0);
    let c01 = texel(source, src, x0, y0 + 1.0);
    let c11 = texel(source, src, x0 + 1.0, y0 + 1.0);
    let lerp = |a: u8, b: u8, c: u8, d: u8| {
        let top = a as f64 * (1.0 - fx) + b as f64 * fx;
        let bottom = c as f64 * (1.0 - fx) + d as f64 * fx;
        (top * (1.0 - fy) + bottom * fy).round() as u8
    };
    Rgba::new(
        lerp(c00.r, c10.r, c01.r, c11.r),
        lerp(c00.g, c10.g, c01.g, c11.g),
        lerp(c00.b, c10.b, c01.b, c11.b),
        lerp(c00.a, c10.a, c01.a, c11.a),
    )
}
