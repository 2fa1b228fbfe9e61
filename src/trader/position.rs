//! Read-only inventory view for one tick.

use std::collections::HashMap;

use crate::types::{InstrumentId, TradingState};

/// Signed positions as reported by the host.
///
/// The trader never mutates positions; the host updates them after fills and
/// hands a fresh snapshot on the next tick.
#[derive(Debug, Clone, Default)]
pub struct InventoryLedger {
    positions: HashMap<InstrumentId, i64>,
}

impl InventoryLedger {
    pub fn new(positions: HashMap<InstrumentId, i64>) -> Self {
        Self { positions }
    }

    pub fn from_state(state: &TradingState) -> Self {
        Self::new(state.position.clone())
    }

    /// Current position; flat when the host omitted the instrument.
    pub fn position(&self, id: &InstrumentId) -> i64 {
        self.positions.get(id).copied().unwrap_or(0)
    }

    /// How much more can be bought before hitting `+limit`.
    pub fn buy_capacity(&self, id: &InstrumentId, limit: i64) -> i64 {
        limit.saturating_sub(self.position(id)).max(0)
    }

    /// How much more can be sold before hitting `-limit`.
    pub fn sell_capacity(&self, id: &InstrumentId, limit: i64) -> i64 {
        limit.saturating_add(self.position(id)).max(0)
    }
}
