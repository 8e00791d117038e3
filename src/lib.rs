pub mod chart;
pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::AppConfig;
use crate::core::history::{HistoryOptions, compute_account_history};
use crate::core::AccountId;
use crate::providers::{HorizonHoldingsProvider, HorizonPriceHistoryProvider};
use anyhow::Result;
use chrono::Utc;
use std::path::PathBuf;
use tracing::{debug, info};

pub enum AppCommand {
    Plot {
        account: String,
        output: PathBuf,
    },
    Export {
        account: String,
        output: Option<PathBuf>,
    },
}

impl AppCommand {
    fn account(&self) -> &str {
        match self {
            AppCommand::Plot { account, .. } | AppCommand::Export { account, .. } => account,
        }
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("backfolio starting...");

    // Reject a malformed account before touching the network
    let account: AccountId = command.account().parse()?;

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let options = HistoryOptions::from_config(&config, Utc::now())?;
    let holdings_provider = HorizonHoldingsProvider::new(config.horizon_url());
    let price_provider = HorizonPriceHistoryProvider::new(
        config.horizon_url(),
        options.quote.clone(),
        config.page_size(),
    );

    let pb = cli::ui::new_progress_bar(0, true);
    let history =
        compute_account_history(&account, &holdings_provider, &price_provider, &options, &pb)
            .await?;

    match command {
        AppCommand::Plot { output, .. } => cli::plot::run(&history, &output),
        AppCommand::Export { output, .. } => cli::export::run(&history, output.as_deref()),
    }
}
