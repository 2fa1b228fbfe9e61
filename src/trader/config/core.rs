//! Core trader configuration types.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::regime::{BandModel, Regime};
use super::trend::TrendConfig;
use crate::prelude::{Error, Result};
use crate::trader::infra::LogConfig;
use crate::types::InstrumentId;

/// Per-instrument configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct InstrumentConfig {
    /// Instrument identifier as published by the host
    pub id: InstrumentId,
    /// Inventory limit; position must stay within [-limit, +limit]
    #[serde(default)]
    pub limit: i64,
    /// Regime tag
    #[serde(default)]
    pub regime: Regime,
    /// Window length for rolling mean/σ, ATR and pair statistics
    #[serde(default = "default_lookback")]
    pub lookback: usize,
    /// Band half-width multiplier (k in μ ± kσ / EMA ± k·ATR)
    #[serde(default = "default_band_width")]
    pub band_width: f64,
    /// Band model for the fair-value interval
    #[serde(default)]
    pub band: BandModel,
    /// Trend classifier for trending instruments (MACD if omitted)
    #[serde(default)]
    pub trend: Option<TrendConfig>,
}

fn default_lookback() -> usize {
    30
}

fn default_band_width() -> f64 {
    2.0
}

impl InstrumentConfig {
    /// Create a config with default window parameters.
    pub fn new(id: &str, limit: i64, regime: Regime) -> Self {
        Self {
            id: InstrumentId::from(id),
            limit,
            regime,
            lookback: default_lookback(),
            band_width: default_band_width(),
            band: BandModel::default(),
            trend: None,
        }
    }

    /// Builder: set lookback window.
    pub fn with_lookback(mut self, lookback: usize) -> Self {
        self.lookback = lookback;
        self
    }

    /// Builder: set band model.
    pub fn with_band(mut self, band: BandModel) -> Self {
        self.band = band;
        self
    }

    /// Builder: set trend classifier.
    pub fn with_trend(mut self, trend: TrendConfig) -> Self {
        self.trend = Some(trend);
        self
    }

    /// Trend classifier parameters, falling back to MACD.
    pub fn trend_or_default(&self) -> TrendConfig {
        self.trend.unwrap_or_default()
    }
}

/// A pair-trading group.
///
/// `leg_a` is the price leg and `leg_b` the hedge leg:
/// `spread = A - hedge_ratio * B`. Leg A is traded first; leg B is then
/// rebalanced against leg A's executed quantity.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PairConfig {
    pub leg_a: InstrumentId,
    pub leg_b: InstrumentId,
    /// Window for the hedge regression and the spread band
    #[serde(default = "default_lookback")]
    pub lookback: usize,
    /// Spread band half-width multiplier
    #[serde(default = "default_band_width")]
    pub band_width: f64,
}

impl PairConfig {
    pub fn new(leg_a: &str, leg_b: &str) -> Self {
        Self {
            leg_a: InstrumentId::from(leg_a),
            leg_b: InstrumentId::from(leg_b),
            lookback: default_lookback(),
            band_width: default_band_width(),
        }
    }

    /// Builder: set lookback window.
    pub fn with_lookback(mut self, lookback: usize) -> Self {
        self.lookback = lookback;
        self
    }

    /// Label used in logs, e.g. `PINA_COLADAS/COCONUTS`.
    pub fn label(&self) -> String {
        format!("{}/{}", self.leg_a, self.leg_b)
    }
}

/// Root configuration. Fixed once the trader is constructed.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct TraderConfig {
    #[serde(default)]
    pub instruments: Vec<InstrumentConfig>,
    #[serde(default)]
    pub pairs: Vec<PairConfig>,
    #[serde(default)]
    pub logging: LogConfig,
}

impl TraderConfig {
    pub fn new(instruments: Vec<InstrumentConfig>, pairs: Vec<PairConfig>) -> Self {
        Self {
            instruments,
            pairs,
            logging: LogConfig::default(),
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(&path).map_err(|e| {
            Error::ConfigRead(format!("{}: {}", path.as_ref().display(), e))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Render as TOML (used to write sample configs).
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::toml_parse(e.to_string()))
    }

    /// Preset for the four tutorial products.
    ///
    /// PEARLS and BANANAS are quoted around a rolling band; PINA_COLADAS and
    /// COCONUTS trade as a pair with PINA_COLADAS as the price leg.
    pub fn tutorial() -> Self {
        Self::new(
            vec![
                InstrumentConfig::new("PEARLS", 20, Regime::MeanReverting),
                InstrumentConfig::new("BANANAS", 20, Regime::MeanReverting),
                InstrumentConfig::new("COCONUTS", 600, Regime::PairLeg),
                InstrumentConfig::new("PINA_COLADAS", 300, Regime::PairLeg),
            ],
            vec![PairConfig::new("PINA_COLADAS", "COCONUTS")],
        )
    }

    /// Look up an instrument's config.
    pub fn instrument(&self, id: &str) -> Option<&InstrumentConfig> {
        self.instruments.iter().find(|c| c.id.as_str() == id)
    }

    /// Validate invariants that would otherwise surface as wrong orders.
    ///
    /// Returns a descriptive error for the first violated invariant.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let mut seen = HashSet::new();
        for cfg in &self.instruments {
            if !seen.insert(cfg.id.as_str()) {
                return Err(format!("duplicate instrument id {}", cfg.id));
            }
            if cfg.regime.is_tradable() && cfg.limit <= 0 {
                return Err(format!(
                    "{}: limit must be > 0, got {}",
                    cfg.id, cfg.limit
                ));
            }
            if cfg.lookback < 2 {
                return Err(format!(
                    "{}: lookback must be >= 2, got {}",
                    cfg.id, cfg.lookback
                ));
            }
            if !cfg.band_width.is_finite() || cfg.band_width <= 0.0 {
                return Err(format!(
                    "{}: band_width must be finite and > 0, got {}",
                    cfg.id, cfg.band_width
                ));
            }
            if let Some(trend) = &cfg.trend {
                trend.validate().map_err(|e| format!("{}: {}", cfg.id, e))?;
            }
        }

        let regimes: HashMap<&str, Regime> = self
            .instruments
            .iter()
            .map(|c| (c.id.as_str(), c.regime))
            .collect();
        let mut paired = HashSet::new();
        for pair in &self.pairs {
            if pair.leg_a == pair.leg_b {
                return Err(format!("pair {} uses the same leg twice", pair.label()));
            }
            if pair.lookback < 2 {
                return Err(format!(
                    "pair {}: lookback must be >= 2, got {}",
                    pair.label(),
                    pair.lookback
                ));
            }
            if !pair.band_width.is_finite() || pair.band_width <= 0.0 {
                return Err(format!(
                    "pair {}: band_width must be finite and > 0",
                    pair.label()
                ));
            }
            for leg in [&pair.leg_a, &pair.leg_b] {
                match regimes.get(leg.as_str()) {
                    Some(Regime::PairLeg) => {}
                    Some(other) => {
                        return Err(format!(
                            "pair {}: {} is tagged {:?}, expected PairLeg",
                            pair.label(),
                            leg,
                            other
                        ))
                    }
                    None => {
                        return Err(format!(
                            "pair {}: unknown instrument {}",
                            pair.label(),
                            leg
                        ))
                    }
                }
                if !paired.insert(leg.as_str()) {
                    return Err(format!("{leg} belongs to more than one pair group"));
                }
            }
        }

        for cfg in &self.instruments {
            if cfg.regime == Regime::PairLeg && !paired.contains(cfg.id.as_str()) {
                return Err(format!("{} is tagged PairLeg but is in no pair group", cfg.id));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
        [[instruments]]
        id = "PEARLS"
        limit = 20

        [[instruments]]
        id = "BANANAS"
        limit = 20
        lookback = 60
        band = "atr"

        [[instruments]]
        id = "DIVING_GEAR"
        limit = 50
        regime = "trending"
        trend = { kind = "momentum", rate = 4 }

        [[instruments]]
        id = "DOLPHIN_SIGHTINGS"
        regime = "observation_only"

        [[instruments]]
        id = "COCONUTS"
        limit = 600
        regime = "pair_leg"

        [[instruments]]
        id = "PINA_COLADAS"
        limit = 300
        regime = "pair_leg"

        [[pairs]]
        leg_a = "PINA_COLADAS"
        leg_b = "COCONUTS"
        lookback = 60

        [logging]
        stdout_format = "compact"
    "#;

    #[test]
    fn test_parse_full_config() {
        let config = TraderConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.instruments.len(), 6);
        assert!(config.validate().is_ok());

        let pearls = config.instrument("PEARLS").unwrap();
        assert_eq!(pearls.regime, Regime::MeanReverting);
        assert_eq!(pearls.lookback, 30);
        assert_eq!(pearls.band_width, 2.0);

        let bananas = config.instrument("BANANAS").unwrap();
        assert_eq!(bananas.band, BandModel::Atr);
        assert_eq!(bananas.lookback, 60);

        let gear = config.instrument("DIVING_GEAR").unwrap();
        assert_eq!(
            gear.trend_or_default(),
            TrendConfig::Momentum {
                rate: 4,
                num_slopes: 3
            }
        );

        assert_eq!(config.pairs[0].label(), "PINA_COLADAS/COCONUTS");
        assert_eq!(config.pairs[0].lookback, 60);
    }

    #[test]
    fn test_tutorial_preset_is_valid() {
        let config = TraderConfig::tutorial();
        assert!(config.validate().is_ok());
        assert_eq!(config.instrument("COCONUTS").unwrap().limit, 600);
        assert_eq!(config.instrument("PINA_COLADAS").unwrap().limit, 300);
    }

    #[test]
    fn test_toml_round_trip_through_file() {
        let config = TraderConfig::tutorial();
        let rendered = config.to_toml_string().unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(rendered.as_bytes()).unwrap();

        let loaded = TraderConfig::from_file(file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_is_config_read_error() {
        let err = TraderConfig::from_file("/nonexistent/trader.toml").unwrap_err();
        assert!(matches!(err, Error::ConfigRead(_)));
    }

    #[test]
    fn test_validate_rejects_zero_limit() {
        let config = TraderConfig::new(
            vec![InstrumentConfig::new("PEARLS", 0, Regime::MeanReverting)],
            vec![],
        );
        let err = config.validate().unwrap_err();
        assert!(err.contains("limit"), "error should mention limit: {err}");
    }

    #[test]
    fn test_validate_rejects_short_lookback() {
        let config = TraderConfig::new(
            vec![InstrumentConfig::new("PEARLS", 20, Regime::MeanReverting).with_lookback(1)],
            vec![],
        );
        let err = config.validate().unwrap_err();
        assert!(err.contains("lookback"), "error should mention lookback: {err}");
    }

    #[test]
    fn test_validate_rejects_untagged_pair_leg() {
        let config = TraderConfig::new(
            vec![
                InstrumentConfig::new("A", 10, Regime::PairLeg),
                InstrumentConfig::new("B", 10, Regime::MeanReverting),
            ],
            vec![PairConfig::new("A", "B")],
        );
        let err = config.validate().unwrap_err();
        assert!(err.contains("expected PairLeg"), "unexpected error: {err}");
    }

    #[test]
    fn test_validate_rejects_leg_in_two_groups() {
        let config = TraderConfig::new(
            vec![
                InstrumentConfig::new("A", 10, Regime::PairLeg),
                InstrumentConfig::new("B", 10, Regime::PairLeg),
                InstrumentConfig::new("C", 10, Regime::PairLeg),
            ],
            vec![PairConfig::new("A", "B"), PairConfig::new("A", "C")],
        );
        let err = config.validate().unwrap_err();
        assert!(err.contains("more than one pair"), "unexpected error: {err}");
    }

    #[test]
    fn test_validate_rejects_orphan_pair_leg() {
        let config = TraderConfig::new(
            vec![InstrumentConfig::new("A", 10, Regime::PairLeg)],
            vec![],
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        let config = TraderConfig::new(
            vec![
                InstrumentConfig::new("PEARLS", 20, Regime::MeanReverting),
                InstrumentConfig::new("PEARLS", 30, Regime::MeanReverting),
            ],
            vec![],
        );
        let err = config.validate().unwrap_err();
        assert!(err.contains("duplicate"), "unexpected error: {err}");
    }
}
