//! Fetch, align and value the history of an account's current holdings.
use super::account::AccountId;
use super::align::align;
use super::asset::Asset;
use super::config::AppConfig;
use super::error::HistoryError;
use super::holdings::{Holding, HoldingsProvider};
use super::price::{DateWindow, PriceHistoryProvider, RawSeries};
use super::valuation::{PortfolioSeries, value_portfolio};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Knobs for a single history computation.
#[derive(Debug, Clone)]
pub struct HistoryOptions {
    pub window: DateWindow,
    pub quote: Asset,
    pub concurrency_limit: usize,
    pub fetch_timeout: Duration,
    pub min_balance: Decimal,
}

impl HistoryOptions {
    pub fn from_config(config: &AppConfig, now: DateTime<Utc>) -> Result<Self> {
        let window = chrono::Duration::from_std(config.window)
            .ok()
            .and_then(|period| DateWindow::trailing(now, period))
            .context("Lookback window is too large")?;
        Ok(Self {
            window,
            quote: config.quote.to_asset()?,
            concurrency_limit: config.concurrency_limit.max(1),
            fetch_timeout: config.fetch_timeout,
            min_balance: config.min_balance,
        })
    }
}

/// Receives progress of the per-asset price fetches.
pub trait FetchProgress: Sync {
    fn start(&self, _total: usize) {}
    fn advance(&self) {}
    fn finish(&self) {}
}

impl FetchProgress for () {}

/// Everything computed for one account.
#[derive(Debug, Clone)]
pub struct AccountHistory {
    pub account: AccountId,
    pub quote: Asset,
    pub window: DateWindow,
    pub holdings: Vec<Holding>,
    /// Held assets without any price inside the window.
    pub unpriced: Vec<Asset>,
    pub series: PortfolioSeries,
}

/// Drops balances below `min_balance`.
pub fn select_holdings(holdings: Vec<Holding>, min_balance: Decimal) -> Vec<Holding> {
    holdings
        .into_iter()
        .filter(|h| {
            let keep = h.quantity >= min_balance;
            if !keep {
                debug!(asset = %h.asset, quantity = %h.quantity, "Skipping dust balance");
            }
            keep
        })
        .collect()
}

/// Fetches the history of every asset, at most `concurrency_limit` at a time.
///
/// A failed or timed out fetch yields an empty series for that asset, so it is
/// left out of the valuation instead of aborting the run.
pub async fn fetch_price_histories(
    assets: &[Asset],
    provider: &dyn PriceHistoryProvider,
    window: &DateWindow,
    concurrency_limit: usize,
    fetch_timeout: Duration,
    progress: &dyn FetchProgress,
) -> BTreeMap<Asset, RawSeries> {
    progress.start(assets.len());

    let results: Vec<(Asset, RawSeries)> = stream::iter(assets)
        .map(|asset| async move {
            let result =
                tokio::time::timeout(fetch_timeout, provider.get_price_history(asset, window))
                    .await;
            progress.advance();

            let series = match result {
                Ok(Ok(series)) => {
                    debug!(asset = %asset, points = series.len(), "Fetched price history");
                    series
                }
                Ok(Err(e @ HistoryError::AssetNotFound { .. })) => {
                    warn!(asset = %asset, "Skipping asset: {e}");
                    RawSeries::empty()
                }
                Ok(Err(e)) => {
                    warn!(asset = %asset, error = %e, "Price history fetch failed, excluding asset");
                    RawSeries::empty()
                }
                Err(_) => {
                    warn!(
                        asset = %asset,
                        timeout = ?fetch_timeout,
                        "Price history fetch timed out, excluding asset"
                    );
                    RawSeries::empty()
                }
            };
            (asset.clone(), series)
        })
        .buffer_unordered(concurrency_limit.max(1))
        .collect()
        .await;

    progress.finish();
    results.into_iter().collect()
}

/// Aligns the fetched histories and values `holdings` against them.
///
/// Holdings of the quote asset are valued at exactly one unit per unit held.
pub fn build_portfolio_series(
    holdings: &[Holding],
    histories: &BTreeMap<Asset, RawSeries>,
    quote: &Asset,
    window: &DateWindow,
) -> Result<PortfolioSeries, HistoryError> {
    if holdings.is_empty() {
        return Err(HistoryError::NoHoldings);
    }

    let mut table = align(histories, window)?;
    if holdings.iter().any(|h| &h.asset == quote) {
        table.pin(quote.clone(), Decimal::ONE);
    }
    value_portfolio(holdings, &table)
}

/// Runs the whole pipeline for `account`.
pub async fn compute_account_history(
    account: &AccountId,
    holdings_provider: &dyn HoldingsProvider,
    price_provider: &dyn PriceHistoryProvider,
    options: &HistoryOptions,
    progress: &dyn FetchProgress,
) -> Result<AccountHistory, HistoryError> {
    let holdings = holdings_provider.list_holdings(account).await?;
    let holdings = select_holdings(holdings, options.min_balance);
    if holdings.is_empty() {
        return Err(HistoryError::NoHoldings);
    }
    info!(account = %account, holdings = holdings.len(), "Loaded account holdings");

    let assets: Vec<Asset> = holdings
        .iter()
        .map(|h| h.asset.clone())
        .filter(|asset| asset != &options.quote)
        .collect();

    let histories = fetch_price_histories(
        &assets,
        price_provider,
        &options.window,
        options.concurrency_limit,
        options.fetch_timeout,
        progress,
    )
    .await;

    let unpriced: Vec<Asset> = histories
        .iter()
        .filter(|(_, series)| !series.points().iter().any(|p| options.window.contains(p.date)))
        .map(|(asset, _)| asset.clone())
        .collect();

    let series = build_portfolio_series(&holdings, &histories, &options.quote, &options.window)?;
    info!(account = %account, points = series.len(), "Computed portfolio history");

    Ok(AccountHistory {
        account: account.clone(),
        quote: options.quote.clone(),
        window: options.window,
        holdings,
        unpriced,
        series,
    })
}
