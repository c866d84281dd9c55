//! Shared types for walkabout: screen geometry, pixels, source images and the
//! drawing surface every renderer implements.
//!
//! # Invariants
//! - World-space positions are `f64` (`glam::DVec2`) so movement deltas sum exactly.
//! - Surfaces never see world-space coordinates; callers convert first.

pub mod image;
pub mod surface;
pub mod types;

pub use glam::DVec2;
pub use image::Image;
pub use surface::{Surface, SurfaceError};
pub use types::{Rect, Rgba};
