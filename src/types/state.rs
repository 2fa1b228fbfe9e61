//! Per-tick market snapshot supplied by the host.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{InstrumentId, OrderDepth};
use crate::prelude::Result;

/// Everything the engine sees for one tick.
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct TradingState {
    #[serde(default)]
    pub timestamp: i64,
    /// Order book per instrument
    #[serde(default)]
    pub order_depths: HashMap<InstrumentId, OrderDepth>,
    /// Signed position per instrument; a missing key means flat
    #[serde(default)]
    pub position: HashMap<InstrumentId, i64>,
    /// External scalar observations for observation-only instruments
    #[serde(default)]
    pub observations: HashMap<InstrumentId, f64>,
}

impl TradingState {
    pub fn new(timestamp: i64) -> Self {
        Self {
            timestamp,
            ..Default::default()
        }
    }

    /// Parse a host payload.
    pub fn from_json(payload: &str) -> Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Builder: add an order book.
    pub fn with_book(mut self, instrument: &str, depth: OrderDepth) -> Self {
        self.order_depths.insert(InstrumentId::from(instrument), depth);
        self
    }

    /// Builder: set a position.
    pub fn with_position(mut self, instrument: &str, position: i64) -> Self {
        self.position.insert(InstrumentId::from(instrument), position);
        self
    }

    /// Builder: add an external observation.
    pub fn with_observation(mut self, instrument: &str, value: f64) -> Self {
        self.observations.insert(InstrumentId::from(instrument), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json() {
        let payload = r#"{
            "timestamp": 1200,
            "order_depths": {
                "PEARLS": {
                    "sell_orders": { "10002": -5, "10004": -10 },
                    "buy_orders": { "9996": 3 }
                }
            },
            "position": { "PEARLS": -4 },
            "observations": { "DOLPHIN_SIGHTINGS": 3051.0 }
        }"#;

        let state = TradingState::from_json(payload).unwrap();
        assert_eq!(state.timestamp, 1200);
        let book = &state.order_depths["PEARLS"];
        assert_eq!(book.sell_orders.get(&10002), Some(&-5));
        assert_eq!(book.buy_orders.get(&9996), Some(&3));
        assert_eq!(state.position["PEARLS"], -4);
        assert_eq!(state.observations["DOLPHIN_SIGHTINGS"], 3051.0);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(TradingState::from_json("{\"timestamp\": \"soon\"}").is_err());
    }
}
