//! Sprite sheets and frame dumps on disk, decoded and encoded by the `image` crate.
//!
//! Frames are flattened over a background color before encoding so formats
//! without alpha (PPM) can hold them. Sheets may name one color key that
//! becomes fully transparent after decoding.

use std::path::Path;

use walkabout_common::{Image, Rgba, SurfaceError};

/// Errors from reading or writing image files.
#[derive(Debug, thiserror::Error)]
pub enum ImageFileError {
    #[error("image codec: {0}")]
    Codec(#[from] image::ImageError),
    #[error(transparent)]
    Image(#[from] SurfaceError),
}

/// Load any supported image file (format picked from the contents).
pub fn load_image(path: impl AsRef<Path>, color_key: Option<Rgba>) -> Result<Image, ImageFileError> {
    let bytes = std::fs::read(path).map_err(image::ImageError::IoError)?;
    decode_image(&bytes, color_key)
}

/// Decode an in-memory image file.
pub fn decode_image(bytes: &[u8], color_key: Option<Rgba>) -> Result<Image, ImageFileError> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let mut image = Image::from_rgba8(rgba.width(), rgba.height(), rgba.as_raw())?;
    if let Some(key) = color_key {
        apply_color_key(&mut image, key);
    }
    Ok(image)
}

/// Write `image` flattened over `background`. The format follows the path's extension.
pub fn save_image(
    image: &Image,
    background: Rgba,
    path: impl AsRef<Path>,
) -> Result<(), ImageFileError> {
    flatten(image, background).save(path)?;
    Ok(())
}

/// Pixels matching `key` in RGB (alpha ignored) become transparent.
fn apply_color_key(image: &mut Image, key: Rgba) {
    for px in image.pixels_mut() {
        if (px.r, px.g, px.b) == (key.r, key.g, key.b) {
            *px = Rgba::TRANSPARENT;
        }
    }
}

fn flatten(image: &Image, background: Rgba) -> image::RgbImage {
    image::RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let c = image.get(x, y).unwrap_or(Rgba::TRANSPARENT).over(background);
        image::Rgb([c.r, c.g, c.b])
    })
}
