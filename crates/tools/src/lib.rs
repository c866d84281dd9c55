//! Developer Tooling: read-only views of a running game for the CLI and logs.

pub mod inspector;

pub use inspector::{GameInspector, GameSummary, ItemInfo};
