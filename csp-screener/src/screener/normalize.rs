//! Raw chain entry -> normalized contract.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::data::{Contract, OptionType, RawContract};

/// Mid price rounded to cents.
///
/// Defined only when both sides are quoted and neither is negative. The
/// mid is exact, so a half-cent tie rounds to the even cent: 0.29/0.30
/// gives 0.30 and 0.32/0.33 gives 0.32. Binary-float rounding can land on
/// the other cent for the same quotes, which matters at the premium floor.
pub fn mid_premium(bid: Option<Decimal>, ask: Option<Decimal>) -> Option<Decimal> {
    let (bid, ask) = (bid?, ask?);
    if bid.is_sign_negative() || ask.is_sign_negative() {
        return None;
    }
    let mid = (bid + ask) / Decimal::from(2);
    Some(mid.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven))
}

/// Shape a raw chain entry into a `Contract`.
///
/// Missing quotes and greeks stay absent; the screening predicate is the
/// one that decides what absence means.
pub fn normalize(raw: RawContract) -> Contract {
    let premium = mid_premium(raw.bid, raw.ask);
    let greeks = raw.greeks.unwrap_or_default();

    Contract {
        symbol: raw.underlying,
        option_type: OptionType::from_str(&raw.option_type),
        expiration: raw.expiration_date,
        strike: raw.strike,
        bid: raw.bid,
        ask: raw.ask,
        volume: raw.volume,
        open_interest: raw.open_interest,
        delta: greeks.delta,
        theta: greeks.theta,
        gamma: greeks.gamma,
        premium,
    }
}
