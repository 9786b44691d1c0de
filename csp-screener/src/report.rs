//! Console presentation of screening results.
//!
//! The engine hands back a flat, ordered match sequence. Grouping by
//! symbol and the one-time `Symbol:` header are computed here, on top of
//! that sequence, without reordering it.

use crate::data::MatchRecord;
use crate::screener::{RunResult, SymbolOutcome};

pub const SEPARATOR: &str = "============================================================";

/// A run of consecutive matches sharing a symbol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymbolGroup<'a> {
    pub symbol: &'a str,
    pub matches: &'a [MatchRecord],
}

/// Split `matches` into consecutive same-symbol groups.
pub fn group_by_symbol(matches: &[MatchRecord]) -> Vec<SymbolGroup<'_>> {
    matches
        .chunk_by(|a, b| a.symbol == b.symbol)
        .map(|chunk| SymbolGroup {
            symbol: &chunk[0].symbol,
            matches: chunk,
        })
        .collect()
}

/// One match as a console line.
pub fn format_match(record: &MatchRecord) -> String {
    format!(
        "Wheel: {}, {}, BID:{}, ASK:{}, {}, {}(D), Premium: {}",
        record.expiration,
        record.strike,
        record.bid,
        record.ask,
        record.volume,
        record.delta,
        record.premium
    )
}

/// Console lines for a match sequence: a header per symbol, then its matches.
pub fn render_matches(matches: &[MatchRecord]) -> Vec<String> {
    let mut lines = Vec::with_capacity(matches.len());
    for group in group_by_symbol(matches) {
        lines.push(format!("Symbol: {}", group.symbol));
        lines.extend(group.matches.iter().map(format_match));
    }
    lines
}

/// End-of-run summary.
pub fn summary_lines(result: &RunResult) -> Vec<String> {
    let mut no_quote = 0;
    let mut out_of_band = 0;
    let mut contracts = 0;

    for report in &result.reports {
        match &report.outcome {
            SymbolOutcome::NoQuote => no_quote += 1,
            SymbolOutcome::OutsidePriceBand { .. } => out_of_band += 1,
            SymbolOutcome::Screened { contracts: n, .. } => contracts += n,
        }
    }

    vec![
        SEPARATOR.to_string(),
        "Screening Summary".to_string(),
        SEPARATOR.to_string(),
        format!("  Symbols processed: {}", result.reports.len()),
        format!("  Symbols screened: {}", result.symbols_screened()),
        format!("  Skipped (no quote): {}", no_quote),
        format!("  Skipped (price band): {}", out_of_band),
        format!("  Contracts inspected: {}", contracts),
        format!("  Matches: {}", result.match_count()),
    ]
}
