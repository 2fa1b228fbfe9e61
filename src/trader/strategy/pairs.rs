//! Pairs regime.
//!
//! Leg A is the price leg and trades first: sell it when the spread is rich,
//! buy it when cheap, flatten it when the spread is back inside the band.
//! Leg B then hedges exactly `round(-hedge_ratio * executed_a)` units. Both
//! legs only take liquidity, bounded by their own last fair price.

use std::cmp::Ordering;

use tracing::debug;

use super::TickContext;
use crate::errors::EstimateError;
use crate::trader::config::{InstrumentConfig, PairConfig};
use crate::trader::estimator::estimate_pair;
use crate::trader::execution::{Execution, LiquidityTaker};
use crate::trader::history::HistoryStore;
use crate::types::Order;

pub fn pair_orders(
    group: usize,
    pair: &PairConfig,
    cfg_a: &InstrumentConfig,
    cfg_b: &InstrumentConfig,
    history: &mut HistoryStore,
    ctx: &TickContext<'_>,
) -> Result<Vec<Order>, EstimateError> {
    let estimate = estimate_pair(group, pair, history)?;
    let fair_a = history
        .last_fair(&pair.leg_a)
        .ok_or_else(|| EstimateError::data_gap(&pair.leg_a, 1, 0))?;
    let fair_b = history
        .last_fair(&pair.leg_b)
        .ok_or_else(|| EstimateError::data_gap(&pair.leg_b, 1, 0))?;

    let band = estimate.interval;
    let book_a = ctx.book(&pair.leg_a);
    let position_a = ctx.ledger.position(&pair.leg_a);
    let taker_a = LiquidityTaker::from_ledger(&pair.leg_a, cfg_a.limit, &ctx.ledger);

    let leg_a = if estimate.spread > band.upper {
        taker_a.sell(book_a, fair_a, None, false)
    } else if estimate.spread < band.lower {
        taker_a.buy(book_a, fair_a, None, false)
    } else if position_a > 0 {
        taker_a.sell(book_a, fair_a, Some(position_a), false)
    } else if position_a < 0 {
        taker_a.buy(book_a, fair_a, Some(position_a.saturating_neg()), false)
    } else {
        Execution::default()
    };

    let executed_a = leg_a.net_quantity();
    let hedge_qty = (-estimate.hedge_ratio() * executed_a as f64).round() as i64;
    let book_b = ctx.book(&pair.leg_b);
    let taker_b = LiquidityTaker::from_ledger(&pair.leg_b, cfg_b.limit, &ctx.ledger);
    let leg_b = match hedge_qty.cmp(&0) {
        Ordering::Greater => taker_b.buy(book_b, fair_b, Some(hedge_qty), false),
        Ordering::Less => taker_b.sell(book_b, fair_b, Some(hedge_qty.saturating_neg()), false),
        Ordering::Equal => Execution::default(),
    };

    debug!(
        pair = %pair.label(),
        spread = estimate.spread,
        lower = band.lower,
        upper = band.upper,
        executed_a,
        hedge_qty,
        "pair routed"
    );

    let mut orders = leg_a.orders;
    orders.extend(leg_b.orders);
    Ok(orders)
}
