//! Core business logic abstractions

pub mod account;
pub mod align;
pub mod asset;
pub mod config;
pub mod duration;
pub mod error;
pub mod history;
pub mod holdings;
pub mod log;
pub mod price;
pub mod valuation;

// Re-export main types for cleaner imports
pub use account::AccountId;
pub use asset::Asset;
pub use error::HistoryError;
pub use holdings::{Holding, HoldingsProvider};
pub use price::{DateWindow, PriceHistoryProvider, PricePoint, RawSeries};
pub use valuation::{PortfolioPoint, PortfolioSeries};
