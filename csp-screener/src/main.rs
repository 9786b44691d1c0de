//! Cash-secured put screener CLI.
//!
//! # Usage
//!
//! ```bash
//! # Set API token
//! export TRADIER_API_TOKEN=your-token
//!
//! # Screen every symbol in symbols.csv with the default criteria
//! csp-screener screen --symbols symbols.csv
//!
//! # Custom thresholds, production data, wider window
//! csp-screener screen --symbols symbols.csv --config screener.json \
//!     --environment production --max-dte 60
//!
//! # Inspect price and windowed expirations for one symbol
//! csp-screener expirations --symbol XYZ
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use csp_screener::config::TOKEN_ENV_VAR;
use csp_screener::data::{Environment, TradierClient};
use csp_screener::io::{read_symbols, write_matches};
use csp_screener::report::{render_matches, summary_lines, SEPARATOR};
use csp_screener::screener::{
    days_to_expiration, window_expirations, Clock, RunResult, ScreeningEngine, SystemClock,
};
use csp_screener::{MarketDataGateway, ScreenerConfig};

#[derive(Parser)]
#[command(name = "csp-screener")]
#[command(about = "Screen option chains for cash-secured put candidates")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a JSON config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Tradier deployment (overrides the config file)
    #[arg(long, global = true, value_enum)]
    environment: Option<Environment>,

    /// Minimum days to expiration, exclusive (overrides the config file)
    #[arg(long, global = true)]
    min_dte: Option<i64>,

    /// Maximum days to expiration, exclusive (overrides the config file)
    #[arg(long, global = true)]
    max_dte: Option<i64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Screen a list of symbols and write matches to CSV
    Screen {
        /// CSV file with a Symbol column
        #[arg(short, long, default_value = "symbols.csv")]
        symbols: PathBuf,

        /// Output CSV file
        #[arg(short, long, default_value = "output_cash_secured_puts.csv")]
        output: PathBuf,
    },

    /// Show spot price and windowed expirations for one symbol
    Expirations {
        /// Ticker symbol
        #[arg(long)]
        symbol: String,
    },
}

fn load_config(cli: &Cli) -> Result<ScreenerConfig> {
    let mut config = match &cli.config {
        Some(path) => ScreenerConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ScreenerConfig::default(),
    };

    if let Some(environment) = cli.environment {
        config.environment = environment;
    }
    if let Some(min_dte) = cli.min_dte {
        config.min_dte = min_dte;
    }
    if let Some(max_dte) = cli.max_dte {
        config.max_dte = max_dte;
    }

    config.validate().context("Invalid screening configuration")?;
    Ok(config)
}

fn client(config: &ScreenerConfig) -> Result<TradierClient> {
    let token = std::env::var(TOKEN_ENV_VAR)
        .with_context(|| format!("{} environment variable not set", TOKEN_ENV_VAR))?;
    Ok(TradierClient::new(config.environment, token))
}

async fn cmd_screen(config: ScreenerConfig, symbols_path: PathBuf, output: PathBuf) -> Result<()> {
    let symbols = read_symbols(&symbols_path)
        .with_context(|| format!("Failed to read symbols from {}", symbols_path.display()))?;

    println!("{}", SEPARATOR);
    println!("Cash-Secured Put Screen");
    println!("{}", SEPARATOR);
    println!("  Symbols: {}", symbols.len());
    println!("  Environment: {:?}", config.environment);
    println!("  DTE window: ({}, {})", config.min_dte, config.max_dte);
    println!(
        "  Price band: ({}, {})",
        config.criteria.min_price, config.criteria.max_price
    );
    println!(
        "  Max spread: {}  Min premium: {}  Delta floor: {}",
        config.criteria.max_bid_ask_spread, config.criteria.min_premium, config.criteria.max_delta
    );
    println!();

    let engine = ScreeningEngine::new(client(&config)?, config);

    let pb = ProgressBar::new(symbols.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );

    let mut result = RunResult::default();
    for symbol in &symbols {
        pb.set_message(format!("Processing {}...", symbol));

        let report = engine
            .screen_symbol(symbol)
            .await
            .with_context(|| format!("Screening aborted at {}", symbol))?;

        for line in render_matches(report.matches()) {
            pb.println(line);
        }

        result.push(report);
        pb.inc(1);
    }
    pb.finish_with_message("done");

    println!();
    for line in summary_lines(&result) {
        println!("{}", line);
    }
    println!(
        "  Requests made: {}",
        engine.gateway().source().request_count()
    );

    let matches = result.into_matches();
    write_matches(&output, &matches)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("  Output: {} ({} rows)", output.display(), matches.len());
    println!("{}", SEPARATOR);

    Ok(())
}

async fn cmd_expirations(config: ScreenerConfig, symbol: String) -> Result<()> {
    let gateway = MarketDataGateway::new(client(&config)?);
    let clock = SystemClock;
    let today = clock.today();

    println!("{}", SEPARATOR);
    println!("{} as of {}", symbol, today);
    println!("{}", SEPARATOR);

    match gateway.spot_price(&symbol).await? {
        Some(price) => {
            let verdict = if config.criteria.admits_price(price) {
                "inside price band"
            } else {
                "OUTSIDE price band"
            };
            println!("  Last: {} ({})", price, verdict);
        }
        None => println!("  Last: no quote"),
    }

    let all = gateway.expirations(&symbol).await?;
    let window = window_expirations(&all, today, config.min_dte, config.max_dte);

    println!("  Published expirations: {}", all.len());
    println!(
        "  Inside ({}, {}) DTE: {}",
        config.min_dte,
        config.max_dte,
        window.len()
    );
    for expiration in &window {
        println!("    {} ({} DTE)", expiration, days_to_expiration(*expiration, today));
    }
    println!("{}", SEPARATOR);

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("csp_screener=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Screen { symbols, output } => {
            cmd_screen(config, symbols, output).await?;
        }
        Commands::Expirations { symbol } => {
            cmd_expirations(config, symbol).await?;
        }
    }

    Ok(())
}
