use crate::image::Image;
use crate::types::{Rect, Rgba};

/// Errors raised while drawing onto a surface.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SurfaceError {
    #[error("source image has no pixels")]
    EmptyImage,
    #[error("source rect {src:?} outside {width}x{height} image")]
    SourceOutOfBounds { src: Rect, width: u32, height: u32 },
    #[error("pixel buffer holds {actual} pixels, expected {expected}")]
    PixelCount { expected: usize, actual: usize },
}

/// A 2D drawing target. The frame scheduler owns exactly one.
///
/// Coordinates are screen-space logical units; implementations decide how a
/// unit maps to a pixel. `resize` must keep already drawn content at the same
/// coordinates, clipped to the new size.
pub trait Surface {
    /// Current size in logical units.
    fn size(&self) -> (u32, u32);

    /// Erase everything to transparent.
    fn clear(&mut self);

    /// Fill `rect` with a solid color.
    fn fill_rect(&mut self, rect: Rect, color: Rgba);

    /// Copy `src` out of `source`, scaled to cover `dst`.
    fn blit(&mut self, source: &Image, src: Rect, dst: Rect) -> Result<(), SurfaceError>;

    /// Change the surface size, preserving existing content.
    fn resize(&mut self, width: u32, height: u32);

    /// Whether scaled blits interpolate between source pixels.
    fn smoothing(&self) -> bool;

    fn set_smoothing(&mut self, enabled: bool);
}
