//! wgpu presentation backend for walkabout.
//!
//! The game draws into a CPU-side RGBA image; this crate uploads that image
//! into a texture each frame and draws it over the whole window with a
//! nearest-neighbour sampler, so pixel art stays crisp at any window size.
//!
//! # Invariants
//! - The presenter never mutates game state.
//! - Presentation rate is independent of the tick rate.

mod presenter;
mod shaders;

pub use presenter::CanvasPresenter;
