//! Regime dispatch for one tick.
//!
//! Regimes are fixed at configuration time. Each tradable instrument (or pair
//! group) is routed to exactly one regime handler; handler failures are
//! estimate errors that skip that instrument for this tick only.

mod mean_reverting;
mod pairs;
mod trending;

pub use mean_reverting::mean_reverting_orders;
pub use pairs::pair_orders;
pub use trending::trending_orders;

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use super::config::{Regime, TraderConfig};
use super::estimator::TrendClassifier;
use super::history::HistoryStore;
use super::position::InventoryLedger;
use crate::errors::EstimateError;
use crate::types::{InstrumentId, Order, OrderBatch, OrderDepth, TradingState};

/// Per-tick view shared by the regime handlers.
#[derive(Debug)]
pub struct TickContext<'a> {
    pub state: &'a TradingState,
    pub ledger: InventoryLedger,
    empty: OrderDepth,
}

impl<'a> TickContext<'a> {
    pub fn new(state: &'a TradingState) -> Self {
        Self {
            state,
            ledger: InventoryLedger::from_state(state),
            empty: OrderDepth::default(),
        }
    }

    /// This tick's book; an empty book when the host sent none.
    pub fn book(&self, id: &InstrumentId) -> &OrderDepth {
        self.state.order_depths.get(id).unwrap_or(&self.empty)
    }
}

/// Route every configured instrument and pair group for one tick.
///
/// `skipped` lists instruments whose history did not grow this tick; they
/// emit nothing, and neither does any pair group containing one of them.
pub fn route_tick(
    config: &TraderConfig,
    history: &mut HistoryStore,
    classifiers: &mut HashMap<InstrumentId, Box<dyn TrendClassifier>>,
    ctx: &TickContext<'_>,
    skipped: &HashSet<InstrumentId>,
) -> OrderBatch {
    let mut batch = OrderBatch::new();

    for cfg in &config.instruments {
        if skipped.contains(&cfg.id) {
            continue;
        }
        let result = match cfg.regime {
            Regime::ObservationOnly | Regime::PairLeg => continue,
            Regime::MeanReverting => match history.instrument(&cfg.id) {
                Some(hist) => mean_reverting_orders(cfg, hist, ctx),
                None => continue,
            },
            Regime::Trending => {
                let (Some(hist), Some(classifier)) =
                    (history.instrument(&cfg.id), classifiers.get_mut(&cfg.id))
                else {
                    continue;
                };
                trending_orders(cfg, hist, classifier.as_mut(), ctx)
            }
        };
        collect(&mut batch, result);
    }

    for (group, pair) in config.pairs.iter().enumerate() {
        if skipped.contains(&pair.leg_a) || skipped.contains(&pair.leg_b) {
            continue;
        }
        let (Some(cfg_a), Some(cfg_b)) = (
            config.instrument(pair.leg_a.as_str()),
            config.instrument(pair.leg_b.as_str()),
        ) else {
            continue;
        };
        collect(&mut batch, pair_orders(group, pair, cfg_a, cfg_b, history, ctx));
    }

    trace!(
        timestamp = ctx.state.timestamp,
        instruments = batch.len(),
        orders = batch.values().map(Vec::len).sum::<usize>(),
        "tick routed"
    );
    batch
}

fn collect(batch: &mut OrderBatch, result: Result<Vec<Order>, EstimateError>) {
    match result {
        Ok(orders) => {
            for order in orders {
                batch.entry(order.instrument.clone()).or_default().push(order);
            }
        }
        Err(e) => debug!(instrument = %e.instrument(), reason = %e, "skipped"),
    }
}
