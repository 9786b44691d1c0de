pub mod config;
pub mod data;
pub mod gateway;
pub mod io;
pub mod report;
pub mod screener;

// Re-export commonly used types
pub use config::{ConfigError, ScreenerConfig};
pub use data::{Contract, Environment, MatchRecord, OptionType, RawContract, TradierClient};
pub use gateway::{MarketData, MarketDataError, MarketDataGateway};
pub use screener::{RunResult, ScreeningCriteria, ScreeningEngine, SymbolOutcome, SymbolReport};
