//! Expiration windowing by days-to-expiration.

use chrono::{Duration, Local, NaiveDate};

use crate::gateway::{MarketData, MarketDataError, MarketDataGateway};

/// Source of "today" for DTE calculations.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local calendar date of the machine running the screen.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Calendar days from `today` until `expiration` (negative once expired).
pub fn days_to_expiration(expiration: NaiveDate, today: NaiveDate) -> i64 {
    (expiration - today).num_days()
}

/// `today + days`, or `None` when that falls outside the calendar chrono
/// can represent.
fn offset(today: NaiveDate, days: i64) -> Option<NaiveDate> {
    Duration::try_days(days).and_then(|delta| today.checked_add_signed(delta))
}

/// Keep expirations strictly between `today + min_dte` and `today + max_dte`.
///
/// Upstream order is preserved. A bound chrono cannot represent lies
/// beyond every real date: past it, nothing clears the lower bound and
/// everything is under the upper one.
pub fn window_expirations(
    expirations: &[NaiveDate],
    today: NaiveDate,
    min_dte: i64,
    max_dte: i64,
) -> Vec<NaiveDate> {
    let min_bound = offset(today, min_dte);
    let max_bound = offset(today, max_dte);

    let above_min = |date: NaiveDate| match min_bound {
        Some(bound) => date > bound,
        None => min_dte < 0,
    };
    let below_max = |date: NaiveDate| match max_bound {
        Some(bound) => date < bound,
        None => max_dte > 0,
    };

    expirations
        .iter()
        .copied()
        .filter(|&date| above_min(date) && below_max(date))
        .collect()
}

/// Fetch expirations for `symbol` and keep those inside the DTE window.
///
/// `today` is read from the clock once, so every date in the scan is
/// compared against the same bounds.
pub async fn select_window<M: MarketData, C: Clock + ?Sized>(
    gateway: &MarketDataGateway<M>,
    clock: &C,
    symbol: &str,
    min_dte: i64,
    max_dte: i64,
) -> Result<Vec<NaiveDate>, MarketDataError> {
    let expirations = gateway.expirations(symbol).await?;
    let today = clock.today();
    Ok(window_expirations(&expirations, today, min_dte, max_dte))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_bounds_are_exclusive() {
        let today = date(2024, 1, 1);
        let dates = vec![
            today + Duration::days(10),
            today + Duration::days(11),
            today + Duration::days(46),
            today + Duration::days(47),
        ];

        let window = window_expirations(&dates, today, 10, 47);
        assert_eq!(
            window,
            vec![today + Duration::days(11), today + Duration::days(46)]
        );
    }

    #[test]
    fn test_preserves_upstream_order() {
        let today = date(2024, 1, 1);
        let dates = vec![date(2024, 2, 16), date(2024, 1, 19), date(2024, 1, 26)];
        let window = window_expirations(&dates, today, 10, 47);
        assert_eq!(window, dates);
    }

    #[test]
    fn test_outside_dates_dropped() {
        let today = date(2024, 1, 1);
        let dates = vec![date(2024, 1, 5), date(2024, 6, 21), date(2023, 12, 29)];
        assert!(window_expirations(&dates, today, 10, 47).is_empty());
    }

    #[test]
    fn test_huge_max_dte_leaves_window_open_above() {
        let today = date(2024, 1, 1);
        let dates = vec![today, date(2024, 1, 20), date(2199, 12, 19)];

        let window = window_expirations(&dates, today, 10, 1_000_000_000);
        assert_eq!(window, vec![date(2024, 1, 20), date(2199, 12, 19)]);

        let window = window_expirations(&dates, today, 10, i64::MAX);
        assert_eq!(window, vec![date(2024, 1, 20), date(2199, 12, 19)]);
    }

    #[test]
    fn test_huge_min_dte_admits_nothing() {
        let today = date(2024, 1, 1);
        let dates = vec![date(2024, 1, 20), date(2199, 12, 19)];
        assert!(window_expirations(&dates, today, 1_000_000_000, i64::MAX).is_empty());
    }

    #[test]
    fn test_days_to_expiration() {
        assert_eq!(days_to_expiration(date(2024, 1, 31), date(2024, 1, 1)), 30);
        assert_eq!(days_to_expiration(date(2023, 12, 31), date(2024, 1, 1)), -1);
    }

    #[test]
    fn test_fixed_clock() {
        assert_eq!(FixedClock(date(2024, 3, 8)).today(), date(2024, 3, 8));
    }
}
