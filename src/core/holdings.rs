//! Account holdings abstractions

use super::account::AccountId;
use super::asset::Asset;
use super::error::HistoryError;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// A quantity of an asset held by the account today.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Holding {
    pub asset: Asset,
    pub quantity: Decimal,
}

impl Holding {
    pub fn new(asset: Asset, quantity: Decimal) -> Self {
        Self { asset, quantity }
    }
}

#[async_trait]
pub trait HoldingsProvider: Send + Sync {
    async fn list_holdings(&self, account: &AccountId) -> Result<Vec<Holding>, HistoryError>;
}
