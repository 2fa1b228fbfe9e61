//! Order types returned to the host.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::InstrumentId;

/// A priced, sized order.
///
/// `quantity` is signed: positive buys, negative sells. It is never zero.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Order {
    pub instrument: InstrumentId,
    pub price: f64,
    pub quantity: i64,
}

impl Order {
    pub fn new(instrument: InstrumentId, price: f64, quantity: i64) -> Self {
        Self {
            instrument,
            price,
            quantity,
        }
    }

    pub fn is_buy(&self) -> bool {
        self.quantity > 0
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = if self.is_buy() { "BUY" } else { "SELL" };
        write!(
            f,
            "{} {}x {} @ {}",
            side,
            self.quantity.abs(),
            self.instrument,
            self.price
        )
    }
}

/// Orders for one tick, keyed by instrument.
///
/// Instruments the engine did not act on are absent.
pub type OrderBatch = HashMap<InstrumentId, Vec<Order>>;

/// Signed sum of order quantities.
pub fn net_quantity(orders: &[Order]) -> i64 {
    orders.iter().map(|o| o.quantity).sum()
}
