//! Market data gateway.
//!
//! `MarketData` is the upstream capability (Tradier in production, an
//! in-memory fake in tests). `MarketDataGateway` sits in front of it and
//! decides which failures a screening run can shrug off: an unavailable
//! endpoint or a payload of the wrong shape reads as "no data" for that
//! symbol, while a transport failure is returned to the caller.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::warn;

use crate::data::RawContract;

/// Market data errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    #[error("upstream returned HTTP {status}: {body}")]
    Unavailable { status: u16, body: String },

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("transport failure: {0}")]
    Transport(String),
}

impl MarketDataError {
    /// Whether a screening run can continue past this error.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Transport(_))
    }
}

/// Read-only market data capability.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Last traded price, `None` when upstream has no quote for `symbol`.
    async fn quote(&self, symbol: &str) -> Result<Option<Decimal>, MarketDataError>;

    /// Published expirations in upstream order.
    async fn expirations(&self, symbol: &str) -> Result<Vec<NaiveDate>, MarketDataError>;

    /// Option chain (with greeks) for one expiration.
    async fn chain(
        &self,
        symbol: &str,
        expiration: NaiveDate,
    ) -> Result<Vec<RawContract>, MarketDataError>;
}

/// Gateway applying the "missing data is not fatal" policy.
pub struct MarketDataGateway<M> {
    source: M,
}

impl<M: MarketData> MarketDataGateway<M> {
    pub fn new(source: M) -> Self {
        Self { source }
    }

    /// Access the underlying source (request counters, test fakes).
    pub fn source(&self) -> &M {
        &self.source
    }

    /// Latest traded price for `symbol`, or `None` if it cannot be priced.
    pub async fn spot_price(&self, symbol: &str) -> Result<Option<Decimal>, MarketDataError> {
        let result = self.source.quote(symbol).await;
        absorb(result, symbol, "quote")
    }

    /// All published expirations for `symbol`; empty when unavailable.
    pub async fn expirations(&self, symbol: &str) -> Result<Vec<NaiveDate>, MarketDataError> {
        let result = self.source.expirations(symbol).await;
        absorb(result, symbol, "expirations")
    }

    /// Raw chain for one expiration; empty when unavailable.
    pub async fn chain(
        &self,
        symbol: &str,
        expiration: NaiveDate,
    ) -> Result<Vec<RawContract>, MarketDataError> {
        let result = self.source.chain(symbol, expiration).await;
        absorb(result, symbol, "chain")
    }
}

/// Turn recoverable errors into the empty value for `T`.
fn absorb<T: Default>(
    result: Result<T, MarketDataError>,
    symbol: &str,
    what: &str,
) -> Result<T, MarketDataError> {
    match result {
        Ok(value) => Ok(value),
        Err(e) if e.is_recoverable() => {
            warn!("{}: {} unavailable, treating as empty ({})", symbol, what, e);
            Ok(T::default())
        }
        Err(e) => Err(e),
    }
}
