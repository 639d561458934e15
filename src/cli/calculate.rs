use super::ui;
use crate::core::{InflationCalculator, InflationResult};
use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::Cell;
use tracing::info;

impl InflationResult {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![ui::header_cell("Month"), ui::header_cell("Rate")]);

        for item in &self.monthly_rates {
            table.add_row(vec![Cell::new(item.month), ui::rate_cell(item.rate)]);
        }

        table.add_row(vec![
            Cell::new(ui::style_text("Total", ui::StyleType::TotalLabel)),
            ui::total_cell(&format!("%{}", self.total_inflation)),
        ]);

        table.to_string()
    }

    pub fn display_summary(&self) -> String {
        let period = format!(
            "{} - {} ({} months)",
            self.start_date.format("%Y-%m-%d"),
            self.end_date.format("%Y-%m-%d"),
            self.months
        );
        let price = format!(
            "{} TL -> {} TL (+{} TL)",
            self.base_price_example, self.final_price_example, self.price_increase
        );
        format!(
            "{}\n{} %{}\n{} {}\n{}",
            ui::style_text(&period, ui::StyleType::Title),
            ui::style_text("Total inflation:", ui::StyleType::TotalLabel),
            ui::style_text(&self.total_inflation, ui::StyleType::TotalValue),
            ui::style_text("Example price:", ui::StyleType::TotalLabel),
            price,
            ui::style_text(&format!("Source: {}", self.source), ui::StyleType::Subtle),
        )
    }
}

pub async fn run(
    calculator: &InflationCalculator,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    json: bool,
) -> Result<()> {
    info!(?start, ?end, "Calculating inflation");

    let spinner = ui::new_spinner("Fetching inflation data...");
    let outcome = calculator.calculate_checked(start, end).await;
    spinner.finish_and_clear();
    let result = outcome?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.display_as_table());
        println!("{}", result.display_summary());
    }
    Ok(())
}
