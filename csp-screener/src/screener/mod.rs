//! Cash-secured put screening.
//!
//! Provides:
//! - Expiration windowing by days-to-expiration
//! - Raw chain entry normalization (mid premium, optional greeks)
//! - Selection criteria and the per-contract predicate
//! - The sequential per-symbol screening engine

pub mod criteria;
pub mod engine;
pub mod normalize;
pub mod window;

pub use criteria::{CriteriaError, Rejection, ScreeningCriteria};
pub use engine::{screen, RejectionTally, RunResult, ScreeningEngine, SymbolOutcome, SymbolReport};
pub use normalize::{mid_premium, normalize};
pub use window::{
    days_to_expiration, select_window, window_expirations, Clock, FixedClock, SystemClock,
};
