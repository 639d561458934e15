//! Compound inflation between two dates.
use crate::core::error::{CalculationError, InflationError};
use crate::core::format::format_tr;
use crate::core::rates::{Availability, MonthKey, MonthlyRates, RateProvider};
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

pub const SOURCE_LABEL: &str = "EVDS API";

/// Rate applied for one month of the calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyRate {
    pub month: MonthKey,
    pub rate: f64,
}

/// Outcome of a successful calculation.
///
/// Numeric fields come in two forms: a formatted string (`15,50`) for
/// display and a raw `_value` for further computation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InflationResult {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub monthly_rates: Vec<MonthlyRate>,
    pub total_inflation: String,
    pub total_inflation_value: f64,
    pub months: usize,
    pub price_increase: String,
    pub price_increase_value: f64,
    pub base_price_example: String,
    pub final_price_example: String,
    pub source: String,
}

/// Compounds the monthly rates of every month from `start` up to, not
/// including, `end`. Months missing from `rates` are skipped. Dates may be
/// given in either order.
pub fn compound(
    rates: &MonthlyRates,
    start: NaiveDate,
    end: NaiveDate,
    reference_price: f64,
) -> InflationResult {
    let (start, end) = if start > end { (end, start) } else { (start, end) };

    let mut monthly_rates = Vec::new();
    let mut month = MonthKey::from_date(start);
    let mut current = start;
    while current < end {
        if let Some(rate) = rates.get(&month) {
            monthly_rates.push(MonthlyRate { month, rate });
        }
        month = month.next();
        current = month.first_day();
    }

    let compound_rate = monthly_rates
        .iter()
        .fold(1.0, |acc, item| acc * (1.0 + item.rate / 100.0));
    let total_inflation = (compound_rate - 1.0) * 100.0;
    let final_price = reference_price * compound_rate;
    let price_increase = final_price - reference_price;
    debug!(
        months = monthly_rates.len(),
        compound_rate, "Compounded monthly rates"
    );

    InflationResult {
        start_date: start,
        end_date: end,
        months: monthly_rates.len(),
        monthly_rates,
        total_inflation: format_tr(total_inflation),
        total_inflation_value: total_inflation,
        price_increase: format_tr(price_increase),
        price_increase_value: price_increase,
        base_price_example: format_tr(reference_price),
        final_price_example: format_tr(final_price),
        source: SOURCE_LABEL.to_string(),
    }
}

/// Runs inflation calculations against a rate provider.
pub struct InflationCalculator {
    provider: Arc<dyn RateProvider>,
    reference_price: f64,
}

impl InflationCalculator {
    pub fn new(provider: Arc<dyn RateProvider>, reference_price: f64) -> Self {
        Self {
            provider,
            reference_price,
        }
    }

    pub fn provider(&self) -> &dyn RateProvider {
        self.provider.as_ref()
    }

    /// Inflation between two dates, in either order.
    pub async fn calculate(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<InflationResult, InflationError> {
        let rates = self.provider.monthly_rates().await?;
        Ok(compound(&rates, start, end, self.reference_price))
    }

    /// Validates user supplied dates against the available data before
    /// calculating.
    ///
    /// The earliest accepted start is the first day of the first month with
    /// data; the latest accepted end is the first day after the last month
    /// with data, since the end date itself is never compounded.
    pub async fn calculate_checked(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<InflationResult, CalculationError> {
        let (Some(start), Some(end)) = (start, end) else {
            return Err(CalculationError::MissingDates);
        };
        let (start, end) = if start > end { (end, start) } else { (start, end) };

        let range = match self.provider.available_range().await {
            Availability::Available(range) => range,
            Availability::Unavailable(_) => return Err(CalculationError::DataUnavailable),
        };

        if start < range.start.first_day() || end > range.end.next().first_day() {
            info!(%start, %end, "Requested dates outside available data");
            return Err(CalculationError::OutOfRange {
                min: range.start,
                max: range.end,
            });
        }

        Ok(self.calculate(start, end).await?)
    }
}
