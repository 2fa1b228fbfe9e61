//! Configuration types for the trader.
//!
//! - `core`: root config, per-instrument and pair-group settings, TOML loading
//! - `regime`: regime tags and band models
//! - `trend`: trend classifier parameters

mod core;
mod regime;
mod trend;

pub use core::*;
pub use regime::*;
pub use trend::*;
