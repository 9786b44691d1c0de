pub mod tradier;
pub mod types;

pub use tradier::{parse_chain, parse_expirations, parse_quote, Environment, TradierClient};
pub use types::{Contract, Greeks, MatchRecord, OptionType, RawContract, MATCH_COLUMNS};
