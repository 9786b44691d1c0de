//! Cash-secured put selection criteria.
//!
//! A contract is a candidate when all of these hold:
//! - bid and ask are both quoted
//! - it is a put
//! - bid > 0
//! - delta is known and at or above the delta floor (e.g. -0.20)
//! - mid premium at or above the premium floor
//! - ask - bid at or below the spread cap
//! - it traded today (volume > 0)
//!
//! The underlying itself must trade strictly inside the price band, since
//! the position ties up strike x 100 in cash.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::{Contract, MatchRecord};

/// Why a contract was not selected. Ordered like the checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rejection {
    MissingQuote,
    NotPut,
    NoBid,
    MissingDelta,
    DeltaBelowFloor,
    PremiumBelowFloor,
    SpreadTooWide,
    NoVolume,
}

impl Rejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingQuote => "missing_quote",
            Self::NotPut => "not_put",
            Self::NoBid => "no_bid",
            Self::MissingDelta => "missing_delta",
            Self::DeltaBelowFloor => "delta_below_floor",
            Self::PremiumBelowFloor => "premium_below_floor",
            Self::SpreadTooWide => "spread_too_wide",
            Self::NoVolume => "no_volume",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CriteriaError {
    #[error("price band is empty: min {min} >= max {max}")]
    EmptyPriceBand { min: Decimal, max: Decimal },

    #[error("max bid/ask spread must not be negative, got {0}")]
    NegativeSpread(Decimal),

    #[error("delta floor must lie in [-1, 0], got {0}")]
    DeltaOutOfRange(f64),
}

/// Screening thresholds, fixed for the duration of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreeningCriteria {
    /// Widest acceptable ask - bid, in dollars.
    pub max_bid_ask_spread: Decimal,
    /// Underlying must trade above this (exclusive).
    pub min_price: Decimal,
    /// Underlying must trade below this (exclusive).
    pub max_price: Decimal,
    /// Smallest acceptable mid premium.
    pub min_premium: Decimal,
    /// Put delta floor; deltas more negative than this are too deep.
    pub max_delta: f64,
}

impl Default for ScreeningCriteria {
    fn default() -> Self {
        Self {
            max_bid_ask_spread: dec!(0.15),
            min_price: dec!(10),
            max_price: dec!(70),
            min_premium: dec!(0.30),
            max_delta: -0.20,
        }
    }
}

impl ScreeningCriteria {
    pub fn validate(&self) -> Result<(), CriteriaError> {
        if self.min_price >= self.max_price {
            return Err(CriteriaError::EmptyPriceBand {
                min: self.min_price,
                max: self.max_price,
            });
        }
        if self.max_bid_ask_spread.is_sign_negative() {
            return Err(CriteriaError::NegativeSpread(self.max_bid_ask_spread));
        }
        if !(-1.0..=0.0).contains(&self.max_delta) {
            return Err(CriteriaError::DeltaOutOfRange(self.max_delta));
        }
        Ok(())
    }

    /// Symbol-level gate on the underlying's spot price.
    pub fn admits_price(&self, price: Decimal) -> bool {
        price > self.min_price && price < self.max_price
    }

    /// Check a contract against every predicate, in order.
    pub fn evaluate(&self, contract: &Contract) -> Result<MatchRecord, Rejection> {
        let (bid, ask, premium) = match (contract.bid, contract.ask, contract.premium) {
            (Some(bid), Some(ask), Some(premium)) => (bid, ask, premium),
            _ => return Err(Rejection::MissingQuote),
        };

        if !contract.is_put() {
            return Err(Rejection::NotPut);
        }

        if bid <= Decimal::ZERO {
            return Err(Rejection::NoBid);
        }

        let delta = contract.delta.ok_or(Rejection::MissingDelta)?;
        if delta.is_nan() || delta < self.max_delta {
            return Err(Rejection::DeltaBelowFloor);
        }

        if premium < self.min_premium {
            return Err(Rejection::PremiumBelowFloor);
        }

        if ask - bid > self.max_bid_ask_spread {
            return Err(Rejection::SpreadTooWide);
        }

        let volume = match contract.volume {
            Some(v) if v > 0 => v,
            _ => return Err(Rejection::NoVolume),
        };

        Ok(MatchRecord {
            symbol: contract.symbol.clone(),
            expiration: contract.expiration,
            strike: contract.strike,
            bid,
            ask,
            volume,
            delta,
            premium,
        })
    }

    pub fn matches(&self, contract: &Contract) -> bool {
        self.evaluate(contract).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::OptionType;
    use chrono::NaiveDate;

    fn candidate() -> Contract {
        Contract {
            symbol: "XYZ".to_string(),
            option_type: Some(OptionType::Put),
            expiration: NaiveDate::from_ymd_opt(2024, 2, 16).unwrap(),
            strike: dec!(22.5),
            bid: Some(dec!(1.00)),
            ask: Some(dec!(1.10)),
            volume: Some(5),
            open_interest: Some(40),
            delta: Some(-0.18),
            theta: Some(-0.03),
            gamma: Some(0.05),
            premium: Some(dec!(1.05)),
        }
    }

    #[test]
    fn test_default_criteria() {
        let criteria = ScreeningCriteria::default();
        assert_eq!(criteria.max_bid_ask_spread, dec!(0.15));
        assert_eq!(criteria.min_price, dec!(10));
        assert_eq!(criteria.max_price, dec!(70));
        assert_eq!(criteria.min_premium, dec!(0.30));
        assert_eq!(criteria.max_delta, -0.20);
        assert!(criteria.validate().is_ok());
    }

    #[test]
    fn test_candidate_matches() {
        let record = ScreeningCriteria::default().evaluate(&candidate()).unwrap();
        assert_eq!(record.symbol, "XYZ");
        assert_eq!(record.strike, dec!(22.5));
        assert_eq!(record.bid, dec!(1.00));
        assert_eq!(record.ask, dec!(1.10));
        assert_eq!(record.volume, 5);
        assert_eq!(record.delta, -0.18);
        assert_eq!(record.premium, dec!(1.05));
    }

    #[test]
    fn test_each_predicate_excludes_on_its_own() {
        let criteria = ScreeningCriteria::default();
        let base = candidate();

        let cases = vec![
            (Contract { bid: None, premium: None, ..base.clone() }, Rejection::MissingQuote),
            (Contract { ask: None, premium: None, ..base.clone() }, Rejection::MissingQuote),
            (
                Contract { option_type: Some(OptionType::Call), ..base.clone() },
                Rejection::NotPut,
            ),
            (Contract { option_type: None, ..base.clone() }, Rejection::NotPut),
            (
                Contract { bid: Some(dec!(0)), ask: Some(dec!(0.10)), ..base.clone() },
                Rejection::NoBid,
            ),
            (Contract { delta: None, ..base.clone() }, Rejection::MissingDelta),
            (Contract { delta: Some(-0.35), ..base.clone() }, Rejection::DeltaBelowFloor),
            (Contract { premium: Some(dec!(0.29)), ..base.clone() }, Rejection::PremiumBelowFloor),
            (
                Contract { ask: Some(dec!(1.16)), ..base.clone() },
                Rejection::SpreadTooWide,
            ),
            (Contract { volume: Some(0), ..base.clone() }, Rejection::NoVolume),
            (Contract { volume: None, ..base.clone() }, Rejection::NoVolume),
        ];

        for (contract, expected) in cases {
            assert_eq!(criteria.evaluate(&contract), Err(expected), "{:?}", contract);
        }
    }

    #[test]
    fn test_spread_boundary() {
        let criteria = ScreeningCriteria::default();

        let at_cap = Contract {
            bid: Some(dec!(1.00)),
            ask: Some(dec!(1.15)),
            ..candidate()
        };
        assert!(criteria.matches(&at_cap));

        let over_cap = Contract {
            bid: Some(dec!(1.00)),
            ask: Some(dec!(1.16)),
            ..candidate()
        };
        assert_eq!(criteria.evaluate(&over_cap), Err(Rejection::SpreadTooWide));
    }

    #[test]
    fn test_delta_and_premium_boundaries_are_inclusive() {
        let criteria = ScreeningCriteria::default();
        let on_floor = Contract {
            delta: Some(-0.20),
            premium: Some(dec!(0.30)),
            ..candidate()
        };
        assert!(criteria.matches(&on_floor));
    }

    #[test]
    fn test_price_gate_is_exclusive() {
        let criteria = ScreeningCriteria::default();
        assert!(criteria.admits_price(dec!(25.00)));
        assert!(criteria.admits_price(dec!(10.01)));
        assert!(!criteria.admits_price(dec!(10)));
        assert!(!criteria.admits_price(dec!(70)));
        assert!(!criteria.admits_price(dec!(75.00)));
    }

    #[test]
    fn test_validate_rejects_bad_thresholds() {
        let inverted = ScreeningCriteria {
            min_price: dec!(70),
            max_price: dec!(10),
            ..Default::default()
        };
        assert!(matches!(inverted.validate(), Err(CriteriaError::EmptyPriceBand { .. })));

        let positive_delta = ScreeningCriteria {
            max_delta: 0.2,
            ..Default::default()
        };
        assert_eq!(positive_delta.validate(), Err(CriteriaError::DeltaOutOfRange(0.2)));
    }
}
