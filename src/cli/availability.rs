use super::ui;
use crate::core::{Availability, MonthKey, MonthRange, RateProvider};
use comfy_table::Cell;
use std::collections::BTreeMap;

fn unavailable_message(reason: &dyn std::fmt::Display) -> String {
    ui::style_text(
        &format!("Inflation data is currently unavailable: {reason}"),
        ui::StyleType::Error,
    )
}

pub fn format_range(range: &Availability<MonthRange>) -> String {
    match range {
        Availability::Available(range) => format!(
            "{} {} - {}",
            ui::style_text("Available data:", ui::StyleType::TotalLabel),
            range.start,
            range.end
        ),
        Availability::Unavailable(reason) => unavailable_message(reason),
    }
}

pub fn format_months(months: &Availability<Vec<MonthKey>>) -> String {
    match months {
        Availability::Available(months) => {
            let mut table = ui::new_styled_table();
            table.set_header(vec![ui::header_cell("Year"), ui::header_cell("Months")]);

            let mut rows: BTreeMap<i32, Vec<String>> = BTreeMap::new();
            for month in months {
                rows.entry(month.year())
                    .or_default()
                    .push(format!("{:02}", month.month()));
            }
            for (year, list) in rows {
                table.add_row(vec![Cell::new(year), Cell::new(list.join(" "))]);
            }
            table.to_string()
        }
        Availability::Unavailable(reason) => unavailable_message(reason),
    }
}

/// Prints the span of months with data. Never fails.
pub async fn run_range(provider: &dyn RateProvider) -> anyhow::Result<()> {
    let spinner = ui::new_spinner("Fetching inflation data...");
    let range = provider.available_range().await;
    spinner.finish_and_clear();
    println!("{}", format_range(&range));
    Ok(())
}

/// Prints every month with data, grouped by year. Never fails.
pub async fn run_months(provider: &dyn RateProvider) -> anyhow::Result<()> {
    let spinner = ui::new_spinner("Fetching inflation data...");
    let months = provider.available_months().await;
    spinner.finish_and_clear();
    println!("{}", format_months(&months));
    Ok(())
}
