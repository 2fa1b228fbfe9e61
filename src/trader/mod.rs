//! Per-tick decision engine.
//!
//! One [`Trader::run`] call is one tick: record history, estimate, route by
//! regime and build inventory-capped orders. Ticks must be fed strictly in
//! order; nothing here suspends or spawns.
//!
//! # Components
//!
//! - `config`: instrument regimes, limits, windows, pair groups
//! - `history`: append-only fair-price / true-range / EMA / spread series
//! - `estimator`: fair intervals, hedge ratios, trend classifiers
//! - `execution`: greedy liquidity taking with a market-making residual
//! - `position`: read-only inventory view
//! - `strategy`: regime dispatch
//! - `infra`: logging setup for hosts

pub mod config;
pub mod estimator;
pub mod execution;
pub mod history;
pub mod infra;
pub mod position;
pub mod strategy;

#[cfg(test)]
mod tests;

pub use config::*;
pub use estimator::{FairInterval, TrendClassifier, TrendSignal};
pub use execution::{Execution, LiquidityTaker, Side};
pub use history::{HistoryStore, InstrumentHistory};
pub use infra::{init_logging, LogConfig, LogFormat};
pub use position::InventoryLedger;

use std::collections::{HashMap, HashSet};

use tracing::{info, trace};

use crate::prelude::Result;
use crate::types::{InstrumentId, OrderBatch, TradingState};
use crate::Error;
use estimator::classifier_for;
use strategy::{route_tick, TickContext};

/// Everything the engine carries from one tick to the next.
#[derive(Debug)]
pub struct EngineState {
    config: TraderConfig,
    history: HistoryStore,
    /// One classifier per trending instrument
    classifiers: HashMap<InstrumentId, Box<dyn TrendClassifier>>,
    ticks: u64,
}

impl EngineState {
    fn new(config: TraderConfig) -> Self {
        let history = HistoryStore::new(&config);
        let classifiers = config
            .instruments
            .iter()
            .filter(|c| c.regime == Regime::Trending)
            .map(|c| (c.id.clone(), classifier_for(c.trend_or_default())))
            .collect();
        Self {
            config,
            history,
            classifiers,
            ticks: 0,
        }
    }

    pub fn config(&self) -> &TraderConfig {
        &self.config
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Ticks processed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

/// The decision engine the host calls once per tick.
#[derive(Debug)]
pub struct Trader {
    state: EngineState,
}

impl Trader {
    /// Validate `config` and start with empty history.
    pub fn new(config: TraderConfig) -> Result<Self> {
        config.validate().map_err(Error::InvalidConfig)?;
        info!(
            instruments = config.instruments.len(),
            pairs = config.pairs.len(),
            "trader configured"
        );
        Ok(Self {
            state: EngineState::new(config),
        })
    }

    /// Engine with the four-product tutorial preset.
    pub fn tutorial() -> Result<Self> {
        Self::new(TraderConfig::tutorial())
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn config(&self) -> &TraderConfig {
        &self.state.config
    }

    pub fn history(&self) -> &HistoryStore {
        &self.state.history
    }

    /// Process one tick and return the orders to submit.
    ///
    /// Never fails: instruments without a usable estimate simply do not
    /// appear in the batch.
    pub fn run(&mut self, state: &TradingState) -> OrderBatch {
        let EngineState {
            config,
            history,
            classifiers,
            ticks,
        } = &mut self.state;

        let skipped: HashSet<InstrumentId> = history
            .record_tick(&config.instruments, state)
            .into_iter()
            .map(|e| e.instrument().clone())
            .collect();

        let ctx = TickContext::new(state);
        let batch = route_tick(config, history, classifiers, &ctx, &skipped);
        *ticks += 1;

        trace!(
            timestamp = state.timestamp,
            tick = *ticks,
            skipped = skipped.len(),
            instruments = batch.len(),
            "tick complete"
        );
        batch
    }

    /// Parse a JSON snapshot and process it.
    pub fn run_json(&mut self, payload: &str) -> Result<OrderBatch> {
        let state = TradingState::from_json(payload)?;
        Ok(self.run(&state))
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_invalid_config_rejected() {
        let cfg = TraderConfig::new(
            vec![InstrumentConfig::new("PEARLS", 0, Regime::MeanReverting)],
            vec![],
        );
        let err = Trader::new(cfg).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_classifier_per_trending_instrument() {
        let cfg = TraderConfig::new(
            vec![
                InstrumentConfig::new("PEARLS", 20, Regime::MeanReverting),
                InstrumentConfig::new("BANANAS", 20, Regime::Trending),
            ],
            vec![],
        );
        let trader = Trader::new(cfg).unwrap();
        assert_eq!(trader.state().classifiers.len(), 1);
        assert_eq!(trader.state().classifiers[&InstrumentId::from("BANANAS")].name(), "macd");
    }

    #[test]
    fn test_first_tick_emits_nothing() {
        let mut trader = Trader::tutorial().unwrap();
        let state = TradingState::new(0).with_book(
            "PEARLS",
            crate::types::OrderDepth::new(&[(10_002, -5)], &[(9_998, 5)]),
        );
        assert!(trader.run(&state).is_empty());
        assert_eq!(trader.state().ticks(), 1);
    }

    #[test]
    fn test_run_json_rejects_garbage() {
        let mut trader = Trader::tutorial().unwrap();
        let err = trader.run_json("{not json").unwrap_err();
        assert!(matches!(err, Error::JsonParse(_)));
    }
}
