//! Greedy liquidity taking with an optional market-making residual.
//!
//! A buy walks the asks strictly below the price bound, cheapest first,
//! taking whole levels while they fit in the remaining capacity. The level
//! that exhausts capacity is taken partially and the walk stops there. Any
//! capacity left after the last qualifying level is optionally posted as a
//! single resting order at the bound itself. Sells mirror this on the bids.

use tracing::debug;

use crate::trader::position::InventoryLedger;
use crate::types::{net_quantity, BookLevel, InstrumentId, Order, OrderDepth};

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    fn sign(self) -> i64 {
        match self {
            Side::Buy => 1,
            Side::Sell => -1,
        }
    }
}

/// Orders produced by one taker call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Execution {
    pub orders: Vec<Order>,
    /// Signed quantity sent against resting liquidity (excludes the residual)
    pub volume_taken: i64,
}

impl Execution {
    /// Signed sum of every emitted order, residual included.
    pub fn net_quantity(&self) -> i64 {
        net_quantity(&self.orders)
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

/// Liquidity taker/maker for one instrument within one tick.
#[derive(Debug, Clone)]
pub struct LiquidityTaker {
    instrument: InstrumentId,
    limit: i64,
    position: i64,
}

impl LiquidityTaker {
    pub fn new(instrument: InstrumentId, limit: i64, position: i64) -> Self {
        Self {
            instrument,
            limit,
            position,
        }
    }

    /// Taker for `instrument` using the ledger's current position.
    pub fn from_ledger(instrument: &InstrumentId, limit: i64, ledger: &InventoryLedger) -> Self {
        Self::new(instrument.clone(), limit, ledger.position(instrument))
    }

    /// Remaining capacity on `side`, capped by `capacity_override`.
    pub fn capacity(&self, side: Side, capacity_override: Option<i64>) -> i64 {
        let base = match side {
            Side::Buy => self.limit.saturating_sub(self.position),
            Side::Sell => self.limit.saturating_add(self.position),
        };
        let capped = match capacity_override {
            Some(cap) => base.min(cap),
            None => base,
        };
        capped.max(0)
    }

    /// Take asks below `price_bound`, then optionally post the rest at it.
    pub fn buy(
        &self,
        book: &OrderDepth,
        price_bound: f64,
        capacity_override: Option<i64>,
        post_residual: bool,
    ) -> Execution {
        let levels = book.asks_below(price_bound);
        self.walk(Side::Buy, &levels, price_bound, capacity_override, post_residual)
    }

    /// Hit bids above `price_bound`, then optionally post the rest at it.
    pub fn sell(
        &self,
        book: &OrderDepth,
        price_bound: f64,
        capacity_override: Option<i64>,
        post_residual: bool,
    ) -> Execution {
        let levels = book.bids_above(price_bound);
        self.walk(Side::Sell, &levels, price_bound, capacity_override, post_residual)
    }

    /// `levels` must already be sorted best price first.
    fn walk(
        &self,
        side: Side,
        levels: &[BookLevel],
        price_bound: f64,
        capacity_override: Option<i64>,
        post_residual: bool,
    ) -> Execution {
        let mut remaining = self.capacity(side, capacity_override);
        let mut execution = Execution::default();

        for level in levels {
            if remaining == 0 {
                break;
            }
            let take = level.quantity.min(remaining);
            if take == 0 {
                continue;
            }
            self.emit(&mut execution, level.price as f64, side.sign() * take);
            execution.volume_taken += side.sign() * take;
            remaining -= take;
        }

        if post_residual && remaining > 0 && price_bound.is_finite() {
            self.emit(&mut execution, price_bound, side.sign() * remaining);
        }
        execution
    }

    fn emit(&self, execution: &mut Execution, price: f64, quantity: i64) {
        let order = Order::new(self.instrument.clone(), price, quantity);
        debug!(%order, "order");
        execution.orders.push(order);
    }
}
