//! Error taxonomy for fetching and valuing account history.

/// Errors raised by the history pipeline and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("invalid account id '{account}': {reason}")]
    InvalidAccount { account: String, reason: String },

    #[error("account not found: {account}")]
    AccountNotFound { account: String },

    #[error("no market found for asset {asset}")]
    AssetNotFound { asset: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("no price data within the requested window, nothing to plot")]
    EmptyTimeline,

    #[error("account holds no assets to value")]
    NoHoldings,
}

impl From<reqwest::Error> for HistoryError {
    fn from(err: reqwest::Error) -> Self {
        HistoryError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = HistoryError::AccountNotFound {
            account: "GABC".to_string(),
        };
        assert_eq!(err.to_string(), "account not found: GABC");
        assert_eq!(
            HistoryError::EmptyTimeline.to_string(),
            "no price data within the requested window, nothing to plot"
        );
    }
}
