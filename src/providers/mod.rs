pub mod horizon;
pub mod util;

pub use horizon::{HorizonHoldingsProvider, HorizonPriceHistoryProvider};
