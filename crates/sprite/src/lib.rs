//! Sprite Animation Engine: named strips of frames on a sprite sheet, advanced
//! by elapsed wall-clock time rather than tick counts.
//!
//! # Invariants
//! - The frame index is always below the active strip's frame count.
//! - The scale factor is strictly positive.
//! - Only `advance` moves the frame index forward.

pub mod animation;
pub mod sheet;
pub mod sprite;

pub use animation::Animation;
pub use sheet::{StripSpec, placeholder_sheet};
pub use sprite::{Sprite, SpriteError};
