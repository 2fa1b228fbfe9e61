//! Mean-reverting regime: buy below the fair interval, sell above it, and
//! rest the leftover capacity at the bounds.

use super::TickContext;
use crate::errors::EstimateError;
use crate::trader::config::InstrumentConfig;
use crate::trader::estimator::estimate;
use crate::trader::execution::LiquidityTaker;
use crate::trader::history::InstrumentHistory;
use crate::types::Order;

pub fn mean_reverting_orders(
    cfg: &InstrumentConfig,
    history: &InstrumentHistory,
    ctx: &TickContext<'_>,
) -> Result<Vec<Order>, EstimateError> {
    let interval = estimate(cfg, history)?;
    let book = ctx.book(&cfg.id);
    let taker = LiquidityTaker::from_ledger(&cfg.id, cfg.limit, &ctx.ledger);

    let mut orders = taker.buy(book, interval.lower, None, true).orders;
    orders.extend(taker.sell(book, interval.upper, None, true).orders);
    Ok(orders)
}
