use thiserror::Error;

use crate::types::InstrumentId;

/// Recoverable estimation and book failures.
///
/// These never leave the engine: the router logs them and skips the affected
/// instrument (or pair group) for the current tick only.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimateError {
    /// Not enough history for the requested window.
    #[error("{instrument}: data gap (need {needed} observations, have {available})")]
    DataGap {
        instrument: InstrumentId,
        needed: usize,
        available: usize,
    },

    /// A bound or parameter came out NaN or infinite.
    #[error("{instrument}: non-finite {what}")]
    NonFiniteEstimate {
        instrument: InstrumentId,
        what: &'static str,
    },

    /// The snapshot carries a book with no non-zero level on either side.
    #[error("{instrument}: empty order book")]
    EmptyBook { instrument: InstrumentId },
}

impl EstimateError {
    /// Create a data gap error
    pub fn data_gap(instrument: &InstrumentId, needed: usize, available: usize) -> Self {
        EstimateError::DataGap {
            instrument: instrument.clone(),
            needed,
            available,
        }
    }

    /// Create a non-finite estimate error
    pub fn non_finite(instrument: &InstrumentId, what: &'static str) -> Self {
        EstimateError::NonFiniteEstimate {
            instrument: instrument.clone(),
            what,
        }
    }

    /// Instrument the failure belongs to.
    pub fn instrument(&self) -> &InstrumentId {
        match self {
            EstimateError::DataGap { instrument, .. }
            | EstimateError::NonFiniteEstimate { instrument, .. }
            | EstimateError::EmptyBook { instrument } => instrument,
        }
    }
}

/// Main crate error type.
///
/// Only construction and I/O paths return it; `Trader::run` is infallible.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// Configuration failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be read
    #[error("Config read error: {0}")]
    ConfigRead(String),

    /// TOML parse error
    #[error("Toml parse error: {0}")]
    TomlParse(String),

    /// JSON parse error
    #[error("Json parse error: {0}")]
    JsonParse(String),

    /// Logging setup error
    #[error("Logging error: {0}")]
    Logging(String),
}

impl Error {
    /// Create a JSON parse error
    pub fn json_parse(msg: impl Into<String>) -> Self {
        Error::JsonParse(msg.into())
    }

    /// Create a TOML parse error
    pub fn toml_parse(msg: impl Into<String>) -> Self {
        Error::TomlParse(msg.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::JsonParse(e.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::TomlParse(e.to_string())
    }
}
