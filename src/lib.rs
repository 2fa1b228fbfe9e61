//! Per-tick trading decision engine.
//!
//! The host hands a [`TradingState`] snapshot to [`Trader::run`] once per
//! tick and submits the returned [`OrderBatch`].

#![deny(unreachable_pub)]

// Core modules
pub mod errors;
mod prelude;
pub mod types;

// Decision engine
pub mod trader;

// Re-exports
pub use errors::{Error, EstimateError};
pub use prelude::Result;
pub use trader::{
    init_logging, BandModel, InstrumentConfig, InventoryLedger, LogConfig, LogFormat, PairConfig,
    Regime, Trader, TraderConfig, TrendConfig, TrendSignal,
};
pub use types::*;
