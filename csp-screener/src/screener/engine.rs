//! Screening engine.
//!
//! Per symbol: price gate -> expiration window -> chain per expiration ->
//! normalize -> predicate. Symbols, expirations and contracts are visited
//! strictly in order and matches are appended in discovery order, so two
//! runs over the same data produce the same sequence.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::{debug, info};

use super::criteria::{Rejection, ScreeningCriteria};
use super::normalize::normalize;
use super::window::{select_window, Clock, SystemClock};
use crate::config::ScreenerConfig;
use crate::data::{Contract, MatchRecord};
use crate::gateway::{MarketData, MarketDataError, MarketDataGateway};

/// Keep the contracts that pass every predicate, in input order.
pub fn screen(contracts: &[Contract], criteria: &ScreeningCriteria) -> Vec<MatchRecord> {
    contracts
        .iter()
        .filter_map(|c| criteria.evaluate(c).ok())
        .collect()
}

/// Count of rejected contracts per reason.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RejectionTally {
    counts: BTreeMap<Rejection, usize>,
}

impl RejectionTally {
    pub fn record(&mut self, reason: Rejection) {
        *self.counts.entry(reason).or_insert(0) += 1;
    }

    pub fn count(&self, reason: Rejection) -> usize {
        self.counts.get(&reason).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Rejection, usize)> + '_ {
        self.counts.iter().map(|(r, n)| (*r, *n))
    }
}

/// What happened to one symbol.
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolOutcome {
    /// Upstream had no price; nothing else was fetched.
    NoQuote,
    /// Price outside the band; nothing else was fetched.
    OutsidePriceBand { price: Decimal },
    /// Chains were screened.
    Screened {
        price: Decimal,
        /// Expirations inside the DTE window.
        expirations: usize,
        /// Contracts inspected across those expirations.
        contracts: usize,
        rejections: RejectionTally,
        matches: Vec<MatchRecord>,
    },
}

/// Screening result for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolReport {
    pub symbol: String,
    pub outcome: SymbolOutcome,
}

impl SymbolReport {
    pub fn matches(&self) -> &[MatchRecord] {
        match &self.outcome {
            SymbolOutcome::Screened { matches, .. } => matches,
            _ => &[],
        }
    }

    pub fn was_screened(&self) -> bool {
        matches!(self.outcome, SymbolOutcome::Screened { .. })
    }
}

/// Result of a full run, reports kept in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunResult {
    pub reports: Vec<SymbolReport>,
}

impl RunResult {
    pub fn push(&mut self, report: SymbolReport) {
        self.reports.push(report);
    }

    /// Every match, symbol-major in input order then discovery order.
    pub fn matches(&self) -> impl Iterator<Item = &MatchRecord> {
        self.reports.iter().flat_map(|r| r.matches().iter())
    }

    /// Owned copy of the match sequence, ready for export.
    pub fn into_matches(self) -> Vec<MatchRecord> {
        self.reports
            .into_iter()
            .flat_map(|r| match r.outcome {
                SymbolOutcome::Screened { matches, .. } => matches,
                _ => Vec::new(),
            })
            .collect()
    }

    pub fn match_count(&self) -> usize {
        self.reports.iter().map(|r| r.matches().len()).sum()
    }

    pub fn symbols_screened(&self) -> usize {
        self.reports.iter().filter(|r| r.was_screened()).count()
    }
}

/// Cash-secured put screener over a market data source.
pub struct ScreeningEngine<M, C = SystemClock> {
    gateway: MarketDataGateway<M>,
    config: ScreenerConfig,
    clock: C,
}

impl<M: MarketData> ScreeningEngine<M, SystemClock> {
    pub fn new(source: M, config: ScreenerConfig) -> Self {
        Self::with_clock(source, config, SystemClock)
    }
}

impl<M: MarketData, C: Clock> ScreeningEngine<M, C> {
    pub fn with_clock(source: M, config: ScreenerConfig, clock: C) -> Self {
        Self {
            gateway: MarketDataGateway::new(source),
            config,
            clock,
        }
    }

    pub fn config(&self) -> &ScreenerConfig {
        &self.config
    }

    pub fn gateway(&self) -> &MarketDataGateway<M> {
        &self.gateway
    }

    /// Screen a single symbol.
    ///
    /// Only transport failures are returned as errors; anything else the
    /// upstream gets wrong shows up as an empty outcome.
    pub async fn screen_symbol(&self, symbol: &str) -> Result<SymbolReport, MarketDataError> {
        let criteria = &self.config.criteria;

        let price = match self.gateway.spot_price(symbol).await? {
            Some(price) => price,
            None => {
                info!("{}: no quote, skipping", symbol);
                return Ok(SymbolReport {
                    symbol: symbol.to_string(),
                    outcome: SymbolOutcome::NoQuote,
                });
            }
        };

        if !criteria.admits_price(price) {
            info!(
                "{}: price {} outside ({}, {}), skipping",
                symbol, price, criteria.min_price, criteria.max_price
            );
            return Ok(SymbolReport {
                symbol: symbol.to_string(),
                outcome: SymbolOutcome::OutsidePriceBand { price },
            });
        }

        let expirations = select_window(
            &self.gateway,
            &self.clock,
            symbol,
            self.config.min_dte,
            self.config.max_dte,
        )
        .await?;

        let mut contracts_seen = 0;
        let mut rejections = RejectionTally::default();
        let mut matches = Vec::new();

        for &expiration in &expirations {
            let chain = self.gateway.chain(symbol, expiration).await?;
            contracts_seen += chain.len();

            for raw in chain {
                let contract = normalize(raw);
                match criteria.evaluate(&contract) {
                    Ok(mut record) => {
                        record.symbol = symbol.to_string();
                        matches.push(record);
                    }
                    Err(reason) => rejections.record(reason),
                }
            }
        }

        info!(
            "{}: price {}, {} expirations, {} contracts, {} matches",
            symbol,
            price,
            expirations.len(),
            contracts_seen,
            matches.len()
        );
        for (reason, count) in rejections.iter() {
            debug!("{}: rejected {} x {}", symbol, count, reason.as_str());
        }

        Ok(SymbolReport {
            symbol: symbol.to_string(),
            outcome: SymbolOutcome::Screened {
                price,
                expirations: expirations.len(),
                contracts: contracts_seen,
                rejections,
                matches,
            },
        })
    }

    /// Screen every symbol in order.
    pub async fn run<S: AsRef<str>>(&self, symbols: &[S]) -> Result<RunResult, MarketDataError> {
        let mut result = RunResult::default();
        for symbol in symbols {
            let report = self.screen_symbol(symbol.as_ref()).await?;
            result.push(report);
        }
        Ok(result)
    }
}
