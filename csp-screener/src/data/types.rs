//! Core data types for option chain screening.
//!
//! `RawContract` mirrors one entry of the Tradier chain payload and lives
//! only until it is normalized. `Contract` is the shaped record the
//! screening predicate works on, and `MatchRecord` is the exported row.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Option type (call or put).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "C" | "CALL" => Some(Self::Call),
            "P" | "PUT" => Some(Self::Put),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Call => "call",
            Self::Put => "put",
        }
    }
}

/// Greeks block attached to a chain entry when requested.
///
/// Tradier leaves individual greeks null for illiquid or freshly listed
/// contracts, so each one is optional on its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    #[serde(default)]
    pub delta: Option<f64>,
    #[serde(default)]
    pub theta: Option<f64>,
    #[serde(default)]
    pub gamma: Option<f64>,
}

/// One option instrument as returned by the chain endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawContract {
    /// OCC contract symbol (e.g. "XYZ240216P00020000")
    #[serde(default)]
    pub symbol: Option<String>,

    /// Underlying symbol
    pub underlying: String,

    /// "put" or "call"
    pub option_type: String,

    pub expiration_date: NaiveDate,

    pub strike: Decimal,

    #[serde(default)]
    pub bid: Option<Decimal>,

    #[serde(default)]
    pub ask: Option<Decimal>,

    #[serde(default)]
    pub volume: Option<i64>,

    #[serde(default)]
    pub open_interest: Option<i64>,

    #[serde(default)]
    pub greeks: Option<Greeks>,
}

/// A normalized option contract.
#[derive(Debug, Clone, PartialEq)]
pub struct Contract {
    /// Underlying symbol (e.g., "XYZ")
    pub symbol: String,

    /// Option type; absent when upstream sent something unrecognised
    pub option_type: Option<OptionType>,

    /// Option expiration date
    pub expiration: NaiveDate,

    /// Strike price
    pub strike: Decimal,

    /// Bid price
    pub bid: Option<Decimal>,

    /// Ask price
    pub ask: Option<Decimal>,

    /// Trading volume
    pub volume: Option<i64>,

    /// Open interest
    pub open_interest: Option<i64>,

    pub delta: Option<f64>,
    pub theta: Option<f64>,
    pub gamma: Option<f64>,

    /// Mid price rounded to cents, defined only when both sides are quoted
    pub premium: Option<Decimal>,
}

impl Contract {
    /// Bid-ask spread in dollars.
    pub fn spread(&self) -> Option<Decimal> {
        match (self.bid, self.ask) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }

    pub fn is_put(&self) -> bool {
        self.option_type == Some(OptionType::Put)
    }
}

/// A contract that passed every screening predicate.
///
/// Field order and serde names are the columns of the output artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Expiration")]
    pub expiration: NaiveDate,
    #[serde(rename = "Strike")]
    pub strike: Decimal,
    #[serde(rename = "Bid")]
    pub bid: Decimal,
    #[serde(rename = "Ask")]
    pub ask: Decimal,
    #[serde(rename = "Volume")]
    pub volume: i64,
    #[serde(rename = "Delta")]
    pub delta: f64,
    #[serde(rename = "Premium")]
    pub premium: Decimal,
}

/// Column headers of the output artifact, in order.
pub const MATCH_COLUMNS: &[&str] = &[
    "Symbol",
    "Expiration",
    "Strike",
    "Bid",
    "Ask",
    "Volume",
    "Delta",
    "Premium",
];
