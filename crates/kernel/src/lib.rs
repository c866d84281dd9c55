//! World Model: the player's logical position and the static items around it.
//!
//! # Invariants
//! - The player position is the single camera anchor.
//! - Item screen positions are derived fresh on every draw, never cached.
//! - The only mutation after setup is `transform`.

pub mod world;

pub use world::{ITEM_COLOR, ITEM_SIZE, Item, World};
