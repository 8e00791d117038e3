use crate::core::history::AccountHistory;
use crate::core::valuation::PortfolioSeries;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Writes the portfolio series as `date,value` CSV to `output`, or to stdout.
pub fn run(history: &AccountHistory, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_csv(&history.series, file)?;
            info!("Exported {} points to {}", history.series.len(), path.display());
        }
        None => write_csv(&history.series, std::io::stdout().lock())?,
    }
    Ok(())
}

pub fn write_csv<W: Write>(series: &PortfolioSeries, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for point in series.points() {
        csv.serialize(point).context("Failed to write CSV record")?;
    }
    csv.flush().context("Failed to flush CSV output")?;
    Ok(())
}
