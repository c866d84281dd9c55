//! Rendering adapters behind the [`Surface`](walkabout_common::Surface) trait.
//!
//! # Invariants
//! - Surfaces never read or mutate world state; they only receive draw calls.
//! - Resizing keeps existing pixels at the same coordinates.
//!
//! [`SoftwareCanvas`] rasterizes into an RGBA buffer that a window backend
//! presents. [`RecordingSurface`] keeps the draw calls instead of pixels, for
//! tests and frame inspection.

mod canvas;
pub mod image_file;
mod recording;

pub use canvas::SoftwareCanvas;
pub use recording::{DrawCommand, RecordingSurface};
