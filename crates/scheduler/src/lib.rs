//! Frame Scheduler: one step function per tick plus a driver that calls it at
//! a fixed cadence.
//!
//! # Invariants
//! - Within a tick: input sampling, then movement, then redraw.
//! - Resizes are queued and applied at the start of the next tick, so they
//!   never interleave with drawing.
//! - A failed draw is logged and the loop keeps going.

pub mod config;
pub mod driver;
pub mod game;

pub use config::{AnimationConfig, ConfigError, DemoConfig, SpriteConfig, Viewport};
pub use driver::{Clock, FixedRate, ManualClock, Scheduler, StopHandle, SystemClock};
pub use game::{FrameError, Game, TickReport, TickStats};
