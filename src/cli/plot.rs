use super::ui;
use crate::chart::{ChartMeta, ChartRenderer, SvgChartRenderer};
use crate::core::history::AccountHistory;
use crate::core::valuation::PortfolioPoint;
use anyhow::Result;
use comfy_table::{Cell, Table};
use std::path::Path;

/// Renders the portfolio chart to `output` and prints a summary.
pub fn run(history: &AccountHistory, output: &Path) -> Result<()> {
    let renderer = SvgChartRenderer::new(output);
    renderer.render(&history.series, &chart_meta(history))?;

    println!(
        "\nAccount: {}",
        ui::style_text(history.account.as_str(), ui::StyleType::Title)
    );
    println!("{}", holdings_table(history));
    println!("{}", summary_table(history));

    for asset in &history.unpriced {
        println!(
            "{}",
            ui::style_text(
                &format!("No price history for {}, valued at 0", asset.short_label()),
                ui::StyleType::Warning
            )
        );
    }
    println!(
        "{}",
        ui::style_text(
            &format!("Chart written to {}", output.display()),
            ui::StyleType::Subtle
        )
    );
    Ok(())
}

pub fn chart_meta(history: &AccountHistory) -> ChartMeta {
    ChartMeta {
        title: format!(
            "Current holdings of {} ({} to {})",
            short_account(history.account.as_str()),
            history.window.start_date(),
            history.window.end_date()
        ),
        x_label: "Time".to_string(),
        y_label: format!("Value in {}", history.quote.code()),
        series_label: "Portfolio".to_string(),
    }
}

fn short_account(account: &str) -> String {
    match (account.get(..4), account.get(account.len().saturating_sub(4)..)) {
        (Some(head), Some(tail)) if account.len() > 8 => format!("{head}…{tail}"),
        _ => account.to_string(),
    }
}

fn holdings_table(history: &AccountHistory) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Asset"),
        ui::header_cell("Type"),
        ui::header_cell("Quantity"),
    ]);

    for holding in &history.holdings {
        let label = if history.unpriced.contains(&holding.asset) {
            ui::style_text(&holding.asset.short_label(), ui::StyleType::Subtle)
        } else {
            holding.asset.short_label()
        };
        table.add_row(vec![
            Cell::new(label),
            Cell::new(holding.asset.asset_type()),
            ui::amount_cell(holding.quantity, 7),
        ]);
    }
    table
}

fn summary_table(history: &AccountHistory) -> Table {
    let mut table = ui::new_styled_table();
    let quote = history.quote.code();
    table.set_header(vec![
        ui::header_cell(""),
        ui::header_cell("Date"),
        ui::header_cell(&format!("Value ({quote})")),
    ]);

    let Some(summary) = history.series.summary() else {
        return table;
    };

    let point_row = |label: &str, point: &PortfolioPoint| {
        vec![
            Cell::new(label),
            Cell::new(point.date.to_string()),
            ui::amount_cell(point.value, 2),
        ]
    };
    table.add_row(point_row("First", &summary.first));
    table.add_row(point_row("Low", &summary.low));
    table.add_row(point_row("High", &summary.high));
    table.add_row(point_row("Last", &summary.last));
    table.add_row(vec![
        Cell::new(ui::style_text("Change", ui::StyleType::TotalLabel)),
        Cell::new(""),
        ui::amount_cell(summary.change, 2),
    ]);
    table.add_row(vec![
        Cell::new(ui::style_text("Change %", ui::StyleType::TotalLabel)),
        Cell::new(""),
        ui::change_cell(summary.change_pct),
    ]);
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::history::build_portfolio_series;
    use crate::core::{AccountId, Asset, DateWindow, Holding, PricePoint, RawSeries};
    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;
    use std::collections::BTreeMap;

    const ACCOUNT: &str = "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF";

    fn history() -> AccountHistory {
        let window = DateWindow::trailing(
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            Duration::days(60),
        )
        .unwrap();
        let quote = Asset::credit(
            "USDC",
            "GA5ZSEJYB37JRC5AVCIA5MOP4RHTM335X2KGX3IHOJAPP5RE34K4KZVN",
        );
        let holdings = vec![Holding::new(Asset::Native, Decimal::from(100))];
        let series: RawSeries = [(1, 1), (2, 2)]
            .into_iter()
            .map(|(d, p)| {
                PricePoint::new(NaiveDate::from_ymd_opt(2024, 2, d).unwrap(), Decimal::from(p))
            })
            .collect();
        let histories = BTreeMap::from([(Asset::Native, series)]);

        AccountHistory {
            account: ACCOUNT.parse::<AccountId>().unwrap(),
            series: build_portfolio_series(&holdings, &histories, &quote, &window).unwrap(),
            quote,
            window,
            holdings,
            unpriced: Vec::new(),
        }
    }

    #[test]
    fn test_chart_meta() {
        let meta = chart_meta(&history());
        assert_eq!(meta.title, "Current holdings of GAAA…AWHF (2024-01-01 to 2024-03-01)");
        assert_eq!(meta.y_label, "Value in USDC");
    }

    #[test]
    fn test_summary_table_rows() {
        let rendered = summary_table(&history()).to_string();
        assert!(rendered.contains("2024-02-01"));
        assert!(rendered.contains("200"));
        assert!(rendered.contains("100.00%"));
    }

    #[test]
    fn test_run_writes_chart() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("portfolio.svg");

        run(&history(), &output).unwrap();

        let svg = std::fs::read_to_string(&output).unwrap();
        assert!(svg.contains("Value in USDC"));
    }
}
