//! Procedural stand-in sheet for running without a sprite sheet file.

use walkabout_common::{Image, Rgba};

use crate::sprite::SpriteError;

/// Largest placeholder sheet, in pixels.
pub const MAX_PLACEHOLDER_PIXELS: u64 = 1 << 24;

/// Where a strip sits on the sheet, in whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripSpec {
    pub origin_x: u32,
    pub origin_y: u32,
    pub frame_count: u32,
}

const PALETTE: [Rgba; 6] = [
    Rgba::opaque(214, 93, 14),
    Rgba::opaque(69, 133, 136),
    Rgba::opaque(152, 151, 26),
    Rgba::opaque(177, 98, 134),
    Rgba::opaque(215, 153, 33),
    Rgba::opaque(104, 157, 106),
];

/// Build a sheet large enough for every strip. Each strip gets its own body
/// color and each frame a marker stripe at a different column, so frame
/// changes are visible on screen. Everything else stays transparent.
///
/// Fails when the strips need more than [`MAX_PLACEHOLDER_PIXELS`].
pub fn placeholder_sheet(
    frame_width: u32,
    frame_height: u32,
    strips: &[StripSpec],
) -> Result<Image, SpriteError> {
    let (fw, fh) = (u64::from(frame_width), u64::from(frame_height));
    let mut width = fw;
    let mut height = fh;
    for s in strips {
        let right = u64::from(s.frame_count)
            .checked_mul(fw)
            .and_then(|w| w.checked_add(u64::from(s.origin_x)));
        let bottom = u64::from(s.origin_y).checked_add(fh);
        let (Some(right), Some(bottom)) = (right, bottom) else {
            return Err(SpriteError::SheetTooLarge {
                width: u64::MAX,
                height: u64::MAX,
            });
        };
        width = width.max(right);
        height = height.max(bottom);
    }
    let too_large = SpriteError::SheetTooLarge { width, height };
    if width.checked_mul(height).is_none_or(|px| px > MAX_PLACEHOLDER_PIXELS) {
        return Err(too_large);
    }
    let (Ok(width), Ok(height)) = (u32::try_from(width), u32::try_from(height)) else {
        return Err(too_large);
    };

    let mut image = Image::filled(width, height, Rgba::TRANSPARENT);
    if frame_width == 0 || frame_height == 0 {
        return Ok(image);
    }
    let inset = (frame_width / 4).max(1);
    let stripe = (frame_width / 8).max(1);

    for (strip_index, strip) in strips.iter().enumerate() {
        let body = PALETTE[strip_index % PALETTE.len()];
        for frame in 0..strip.frame_count {
            let fx = strip.origin_x + frame * frame_width;
            for y in 0..frame_height {
                for x in inset..frame_width.saturating_sub(inset) {
                    image.set(fx + x, strip.origin_y + y, body);
                }
            }
            let marker_x = inset + (frame * stripe) % frame_width.saturating_sub(2 * inset).max(1);
            for y in frame_height / 2..frame_height {
                for x in marker_x..(marker_x + stripe).min(frame_width) {
                    image.set(fx + x, strip.origin_y + y, Rgba::BLACK);
                }
            }
        }
    }
    Ok(image)
}
