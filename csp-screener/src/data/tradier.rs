//! Tradier market data client.
//!
//! Endpoints used:
//! - `GET /markets/quotes?symbols=`                    (spot quote)
//! - `GET /markets/options/expirations?symbol=`        (expiration list)
//! - `GET /markets/options/chains?symbol=&expiration=&greeks=true`
//!
//! Tradier collapses single-element arrays into bare objects/strings and
//! uses `null` for "nothing here", so every payload is parsed through a
//! serde envelope that spells those shapes out.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::types::RawContract;
use crate::gateway::{MarketData, MarketDataError};

const SANDBOX_URL: &str = "https://sandbox.tradier.com/v1";
const PRODUCTION_URL: &str = "https://api.tradier.com/v1";

/// Which Tradier deployment to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Delayed data, free developer accounts
    #[default]
    Sandbox,
    /// Brokerage account required
    Production,
}

impl Environment {
    pub fn base_url(&self) -> &'static str {
        match self {
            Self::Sandbox => SANDBOX_URL,
            Self::Production => PRODUCTION_URL,
        }
    }
}

/// Either one item or a list of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Many(items) => items,
            Self::One(item) => vec![item],
        }
    }
}

#[derive(Debug, Deserialize)]
struct QuotesEnvelope {
    quotes: Option<QuotesBody>,
}

#[derive(Debug, Deserialize)]
struct QuotesBody {
    #[serde(default)]
    quote: Option<OneOrMany<RawQuote>>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawQuote {
    symbol: String,
    #[serde(default)]
    last: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct ExpirationsEnvelope {
    expirations: Option<ExpirationsBody>,
}

#[derive(Debug, Deserialize)]
struct ExpirationsBody {
    #[serde(default)]
    date: Option<DateList>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DateList {
    Many(Vec<String>),
    Scalar(String),
}

#[derive(Debug, Deserialize)]
struct ChainEnvelope {
    options: Option<ChainBody>,
}

#[derive(Debug, Deserialize)]
struct ChainBody {
    #[serde(default)]
    option: Option<OneOrMany<RawContract>>,
}

/// Extract the last traded price for `symbol` from a quotes payload.
///
/// Returns `Ok(None)` when the payload carries no quote (unknown symbol)
/// or the quote has no last price.
pub fn parse_quote(body: &str, symbol: &str) -> Result<Option<Decimal>, MarketDataError> {
    let envelope: QuotesEnvelope = serde_json::from_str(body)
        .map_err(|e| MarketDataError::MalformedPayload(format!("quotes: {}", e)))?;

    let quotes = match envelope.quotes.and_then(|q| q.quote) {
        Some(q) => q.into_vec(),
        None => return Ok(None),
    };

    let quote = quotes
        .iter()
        .find(|q| q.symbol.eq_ignore_ascii_case(symbol))
        .or_else(|| quotes.first());

    Ok(quote.and_then(|q| q.last))
}

/// Parse an expirations payload into dates, preserving upstream order.
///
/// A bare string where a list is expected is reported as malformed.
/// Entries that are not `YYYY-MM-DD` are skipped.
pub fn parse_expirations(body: &str) -> Result<Vec<NaiveDate>, MarketDataError> {
    let envelope: ExpirationsEnvelope = serde_json::from_str(body)
        .map_err(|e| MarketDataError::MalformedPayload(format!("expirations: {}", e)))?;

    let dates = match envelope.expirations.and_then(|e| e.date) {
        Some(DateList::Many(dates)) => dates,
        Some(DateList::Scalar(value)) => {
            return Err(MarketDataError::MalformedPayload(format!(
                "expirations: expected a list of dates, got scalar {:?}",
                value
            )));
        }
        None => return Ok(Vec::new()),
    };

    Ok(dates
        .iter()
        .filter_map(|d| match NaiveDate::parse_from_str(d, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                warn!("Skipping unparsable expiration date {:?}", d);
                None
            }
        })
        .collect())
}

/// Parse an option chain payload. `{"options": null}` is an empty chain.
pub fn parse_chain(body: &str) -> Result<Vec<RawContract>, MarketDataError> {
    let envelope: ChainEnvelope = serde_json::from_str(body)
        .map_err(|e| MarketDataError::MalformedPayload(format!("chain: {}", e)))?;

    Ok(envelope
        .options
        .and_then(|o| o.option)
        .map(OneOrMany::into_vec)
        .unwrap_or_default())
}

/// Tradier API client.
pub struct TradierClient {
    client: Client,
    base_url: String,
    token: String,
    request_count: AtomicU64,
}

impl TradierClient {
    /// Create a new client for the given deployment.
    pub fn new(environment: Environment, token: String) -> Self {
        Self::with_base_url(environment.base_url(), token)
    }

    /// Create a client against an arbitrary base URL (proxies, local mocks).
    pub fn with_base_url(base_url: &str, token: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            request_count: AtomicU64::new(0),
        }
    }

    /// Get request count for monitoring.
    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Authenticated GET returning the raw body of a 2xx response.
    async fn request(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<String, MarketDataError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self
            .client
            .get(&url)
            .query(params)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| MarketDataError::Transport(e.to_string()))?;

        self.request_count.fetch_add(1, Ordering::Relaxed);

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MarketDataError::Unavailable {
                status: status.as_u16(),
                body,
            });
        }

        response
            .text()
            .await
            .map_err(|e| MarketDataError::Transport(e.to_string()))
    }
}

#[async_trait]
impl MarketData for TradierClient {
    async fn quote(&self, symbol: &str) -> Result<Option<Decimal>, MarketDataError> {
        let body = self.request("markets/quotes", &[("symbols", symbol)]).await?;
        parse_quote(&body, symbol)
    }

    async fn expirations(&self, symbol: &str) -> Result<Vec<NaiveDate>, MarketDataError> {
        let body = self
            .request("markets/options/expirations", &[("symbol", symbol)])
            .await?;
        parse_expirations(&body)
    }

    async fn chain(
        &self,
        symbol: &str,
        expiration: NaiveDate,
    ) -> Result<Vec<RawContract>, MarketDataError> {
        let date_str = expiration.format("%Y-%m-%d").to_string();
        let params = [
            ("symbol", symbol),
            ("expiration", date_str.as_str()),
            ("greeks", "true"),
        ];

        let body = self.request("markets/options/chains", &params).await?;
        parse_chain(&body)
    }
}
