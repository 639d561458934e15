use crate::core::rates::MonthKey;
use thiserror::Error;

/// Rate data could not be produced.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InflationError {
    #[error("Failed to retrieve inflation data from EVDS API.")]
    FetchFailed,
    #[error("EVDS API returned empty data.")]
    EmptyData,
}

/// Why a requested calculation produced no result.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CalculationError {
    #[error("Please select both start and end dates")]
    MissingDates,
    #[error("Inflation data is currently unavailable. Please check API configuration.")]
    DataUnavailable,
    #[error("Please select dates between {min} and {max}")]
    OutOfRange { min: MonthKey, max: MonthKey },
    #[error("An error occurred during calculation: {0}")]
    Calculation(#[from] InflationError),
}
