//! Core business logic abstractions

pub mod cache;
pub mod config;
pub mod error;
pub mod format;
pub mod inflation;
pub mod log;
pub mod rates;

// Re-export main types for cleaner imports
pub use error::{CalculationError, InflationError};
pub use inflation::{InflationCalculator, InflationResult, MonthlyRate};
pub use rates::{Availability, MonthKey, MonthRange, MonthlyRates, RateProvider, RateSource};
