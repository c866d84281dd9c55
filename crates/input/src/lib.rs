//! Input: held-key state sampled once per tick and turned into movement.
//!
//! # Invariants
//! - The simulation only reads input; key edges come from the host.
//! - Movement is derived each tick, never stored.

pub mod action;
pub mod movement;
pub mod state;

pub use action::{Action, Bindings};
pub use movement::{Facing, IDLE_ANIMATION, Movement, MovementPolicy};
pub use state::{InputSampler, InputState, Key};
