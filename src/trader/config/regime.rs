//! Regime tags and band models.

use serde::{Deserialize, Serialize};

/// Static regime assigned to an instrument at configuration time.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    /// Quote both sides around a rolling fair-value band
    #[default]
    MeanReverting,
    /// Trade in the direction of a trend classifier, liquidity-taking only
    Trending,
    /// One leg of a pair group; orders are driven by the pair spread
    PairLeg,
    /// Contributes history only, never receives orders
    ObservationOnly,
}

impl Regime {
    /// Whether instruments in this regime may receive orders.
    pub fn is_tradable(&self) -> bool {
        !matches!(self, Regime::ObservationOnly)
    }
}

/// How a mean-reverting instrument derives its fair-value band.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BandModel {
    /// Rolling mean ± k·σ over the lookback window
    #[default]
    StdDev,
    /// EMA ± k·ATR (volatility-banded)
    Atr,
}
