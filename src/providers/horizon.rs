use super::util::with_retry;
use crate::core::{
    AccountId, Asset, DateWindow, HistoryError, Holding, HoldingsProvider, PriceHistoryProvider,
    PricePoint, RawSeries,
};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::{StatusCode, Url};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use tracing::{debug, instrument, warn};

const USER_AGENT: &str = "backfolio/0.1";
const RETRIES: usize = 3;
const RETRY_DELAY_MS: u64 = 500;
/// One candle per day.
const DAY_RESOLUTION_MS: i64 = 86_400_000;
/// Gap between the last candle of a page and the start of the next page.
const PAGE_ADVANCE_MS: i64 = 3_600_000;

fn http_client() -> Result<reqwest::Client, HistoryError> {
    Ok(reqwest::Client::builder().user_agent(USER_AGENT).build()?)
}

fn asset_params(prefix: &str, asset: &Asset) -> Vec<(String, String)> {
    let mut params = vec![(format!("{prefix}_asset_type"), asset.asset_type().to_string())];
    if let Asset::Credit { code, issuer } = asset {
        params.push((format!("{prefix}_asset_code"), code.clone()));
        params.push((format!("{prefix}_asset_issuer"), issuer.clone()));
    }
    params
}

#[derive(Deserialize, Debug)]
struct AccountResponse {
    balances: Vec<BalanceLine>,
}

#[derive(Deserialize, Debug)]
struct BalanceLine {
    balance: String,
    asset_type: String,
    asset_code: Option<String>,
    asset_issuer: Option<String>,
}

impl BalanceLine {
    /// `None` for balances that are not plain assets, e.g. liquidity pool shares.
    fn to_holding(&self) -> Option<Holding> {
        let asset = match (
            self.asset_type.as_str(),
            &self.asset_code,
            &self.asset_issuer,
        ) {
            ("native", _, _) => Asset::Native,
            ("credit_alphanum4" | "credit_alphanum12", Some(code), Some(issuer)) => {
                Asset::credit(code, issuer)
            }
            _ => {
                debug!(asset_type = %self.asset_type, "Skipping unsupported balance line");
                return None;
            }
        };

        match Decimal::from_str(&self.balance) {
            Ok(quantity) => Some(Holding::new(asset, quantity)),
            Err(e) => {
                warn!(asset = %asset, balance = %self.balance, "Unparseable balance: {e}");
                None
            }
        }
    }
}

/// Lists account balances from a Horizon server.
pub struct HorizonHoldingsProvider {
    base_url: String,
}

impl HorizonHoldingsProvider {
    pub fn new(base_url: &str) -> Self {
        HorizonHoldingsProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl HoldingsProvider for HorizonHoldingsProvider {
    #[instrument(name = "HorizonAccountFetch", skip(self), fields(account = %account))]
    async fn list_holdings(&self, account: &AccountId) -> Result<Vec<Holding>, HistoryError> {
        let url = format!("{}/accounts/{}", self.base_url, account);
        debug!("Requesting account from {}", url);

        let client = http_client()?;
        let response = with_retry(|| client.get(&url).send(), RETRIES, RETRY_DELAY_MS).await?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(HistoryError::AccountNotFound {
                    account: account.to_string(),
                });
            }
            status if !status.is_success() => {
                return Err(HistoryError::Network(format!(
                    "HTTP error: {status} for account: {account}"
                )));
            }
            _ => {}
        }

        let data: AccountResponse = response.json().await.map_err(|e| {
            HistoryError::Network(format!("Failed to parse account response for {account}: {e}"))
        })?;

        let holdings: Vec<Holding> = data
            .balances
            .iter()
            .filter_map(BalanceLine::to_holding)
            .collect();
        debug!(holdings = ?holdings, "Received account balances");
        Ok(holdings)
    }
}

#[derive(Deserialize, Debug)]
struct TradeAggregationsResponse {
    #[serde(rename = "_embedded")]
    embedded: EmbeddedRecords,
}

#[derive(Deserialize, Debug)]
struct EmbeddedRecords {
    records: Vec<TradeAggregation>,
}

/// Horizon has served the bucket timestamp both as a number and as a string.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum Timestamp {
    Millis(i64),
    Text(String),
}

impl Timestamp {
    fn millis(&self) -> Option<i64> {
        match self {
            Timestamp::Millis(ms) => Some(*ms),
            Timestamp::Text(s) => s.parse().ok(),
        }
    }
}

#[derive(Deserialize, Debug)]
struct TradeAggregation {
    timestamp: Timestamp,
    close: String,
}

impl TradeAggregation {
    fn to_point(&self) -> Option<PricePoint> {
        let date = Utc
            .timestamp_millis_opt(self.timestamp.millis()?)
            .single()?
            .date_naive();
        let price = Decimal::from_str(&self.close).ok()?;
        Some(PricePoint::new(date, price))
    }
}

/// Daily closing prices of an asset against the quote asset, taken from
/// Horizon's trade aggregations.
pub struct HorizonPriceHistoryProvider {
    base_url: String,
    quote: Asset,
    page_size: u32,
}

impl HorizonPriceHistoryProvider {
    pub fn new(base_url: &str, quote: Asset, page_size: u32) -> Self {
        HorizonPriceHistoryProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            quote,
            page_size,
        }
    }

    async fn fetch_page(
        &self,
        client: &reqwest::Client,
        asset: &Asset,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<TradeAggregation>, HistoryError> {
        let mut params = asset_params("base", asset);
        params.extend(asset_params("counter", &self.quote));
        params.extend([
            ("start_time".to_string(), start_ms.to_string()),
            ("end_time".to_string(), end_ms.to_string()),
            ("resolution".to_string(), DAY_RESOLUTION_MS.to_string()),
            ("limit".to_string(), self.page_size.to_string()),
            ("order".to_string(), "asc".to_string()),
        ]);

        let url = Url::parse_with_params(&format!("{}/trade_aggregations", self.base_url), &params)
            .map_err(|e| HistoryError::Network(format!("Invalid Horizon URL: {e}")))?;
        debug!("Requesting trade aggregations from {}", url);

        let response =
            with_retry(|| client.get(url.clone()).send(), RETRIES, RETRY_DELAY_MS).await?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(HistoryError::AssetNotFound {
                    asset: asset.to_string(),
                });
            }
            status if !status.is_success() => {
                return Err(HistoryError::Network(format!(
                    "HTTP error: {status} for asset: {asset}"
                )));
            }
            _ => {}
        }

        let data: TradeAggregationsResponse = response.json().await.map_err(|e| {
            HistoryError::Network(format!(
                "Failed to parse trade aggregations for {asset}: {e}"
            ))
        })?;
        Ok(data.embedded.records)
    }
}

#[async_trait]
impl PriceHistoryProvider for HorizonPriceHistoryProvider {
    #[instrument(
        name = "HorizonPriceHistoryFetch",
        skip(self, window),
        fields(asset = %asset)
    )]
    async fn get_price_history(
        &self,
        asset: &Asset,
        window: &DateWindow,
    ) -> Result<RawSeries, HistoryError> {
        let client = http_client()?;
        let end_ms = window.end.timestamp_millis();
        let mut start_ms = window.start.timestamp_millis();
        let mut points = Vec::new();

        while end_ms - start_ms > PAGE_ADVANCE_MS {
            let records = self.fetch_page(&client, asset, start_ms, end_ms).await?;
            let Some(last_ms) = records.last().and_then(|r| r.timestamp.millis()) else {
                break;
            };

            for record in &records {
                match record.to_point() {
                    Some(point) => points.push(point),
                    None => debug!(record = ?record, "Skipping malformed trade aggregation"),
                }
            }
            debug!("{} records...", points.len());

            let next_ms = last_ms + PAGE_ADVANCE_MS;
            if next_ms <= start_ms {
                break;
            }
            start_ms = next_ms;
        }

        if points.is_empty() {
            return Err(HistoryError::AssetNotFound {
                asset: asset.to_string(),
            });
        }
        Ok(RawSeries::new(points))
    }
}
