use crate::surface::SurfaceError;
use crate::types::{Rect, Rgba};

/// A source image held in memory, row-major, top-left origin.
///
/// Sprite sheets and canvas backing stores are both `Image`s.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Image {
    /// Wrap an existing pixel buffer. The buffer length must equal `width * height`.
    pub fn new(width: u32, height: u32, pixels: Vec<Rgba>) -> Result<Self, SurfaceError> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(SurfaceError::PixelCount {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build an image from tightly packed RGBA8 bytes.
    pub fn from_rgba8(width: u32, height: u32, bytes: &[u8]) -> Result<Self, SurfaceError> {
        if bytes.len() % 4 != 0 {
            return Err(SurfaceError::PixelCount {
                expected: width as usize * height as usize,
                actual: bytes.len() / 4,
            });
        }
        let pixels: Vec<Rgba> = bytemuck::cast_slice(bytes).to_vec();
        Self::new(width, height, pixels)
    }

    /// An image of the given size filled with a single color.
    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Rgba] {
        &mut self.pixels
    }

    /// Raw RGBA8 bytes, ready for texture upload or file output.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Rgba> {
        if x < self.width && y < self.height {
            Some(self.pixels[self.index(x, y)])
        } else {
            None
        }
    }

    pub fn set(&mut self, x: u32, y: u32, color: Rgba) {
        if x < self.width && y < self.height {
            let i = self.index(x, y);
            self.pixels[i] = color;
        }
    }

    /// Check that `src` lies inside the image and the image is drawable.
    pub fn check_source(&self, src: Rect) -> Result<(), SurfaceError> {
        if self.is_empty() {
            return Err(SurfaceError::EmptyImage);
        }
        let inside = src.x >= 0.0
            && src.y >= 0.0
            && src.right() <= self.width as f64
            && src.bottom() <= self.height as f64;
        if src.is_empty() || !inside {
            return Err(SurfaceError::SourceOutOfBounds {
                src,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}
