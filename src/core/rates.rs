//! Monthly rate data: month keys, raw API rows and their normalization.

use crate::core::error::InflationError;
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid month key: {0}")]
pub struct ParseMonthKeyError(String);

/// A calendar month, rendered as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        // Only months chrono can represent, so first_day() is total.
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MAX)
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = ParseMonthKeyError;

    /// Accepts `YYYY-MM` and the unpadded `YYYY-M` used by EVDS.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseMonthKeyError(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(err)?;
        if year.len() != 4 || month.is_empty() || month.len() > 2 {
            return Err(err());
        }
        let year = year.parse::<i32>().map_err(|_| err())?;
        let month = month.parse::<u32>().map_err(|_| err())?;
        MonthKey::new(year, month).ok_or_else(err)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Inclusive span of months for which rate data exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthRange {
    pub start: MonthKey,
    pub end: MonthKey,
}

/// Monthly percentage change keyed by month, kept in chronological order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthlyRates(BTreeMap<MonthKey, f64>);

impl MonthlyRates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, month: MonthKey, rate: f64) -> Option<f64> {
        self.0.insert(month, rate)
    }

    pub fn get(&self, month: &MonthKey) -> Option<f64> {
        self.0.get(month).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn months(&self) -> Vec<MonthKey> {
        self.0.keys().copied().collect()
    }

    pub fn range(&self) -> Option<MonthRange> {
        let (start, _) = self.0.first_key_value()?;
        let (end, _) = self.0.last_key_value()?;
        Some(MonthRange {
            start: *start,
            end: *end,
        })
    }
}

impl FromIterator<(MonthKey, f64)> for MonthlyRates {
    fn from_iter<I: IntoIterator<Item = (MonthKey, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A series value as the API sent it.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Text(String),
    Number(f64),
}

impl RawValue {
    /// Converts a JSON value; `null` and non-scalar values count as absent.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => Some(RawValue::Text(s.clone())),
            serde_json::Value::Number(n) => n.as_f64().map(RawValue::Number),
            _ => None,
        }
    }

    /// The numeric value, reading text by its leading numeric prefix (0.0 if none).
    pub fn as_rate(&self) -> f64 {
        match self {
            RawValue::Text(s) => parse_leading_float(s),
            RawValue::Number(n) => *n,
        }
    }
}

/// One row of the EVDS `items` array.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRateRecord {
    pub date: Option<String>,
    pub value: Option<RawValue>,
}

impl RawRateRecord {
    pub fn new(date: &str, value: &str) -> Self {
        Self {
            date: Some(date.to_string()),
            value: Some(RawValue::Text(value.to_string())),
        }
    }
}

/// Source of raw monthly rate rows.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Identifier of the series this source serves, e.g. `TP.FG.J0`.
    fn series(&self) -> &str;

    /// Fetches rows between two dates. `None` means the source had nothing to
    /// offer: it was unconfigured, unreachable, or answered with an error.
    async fn fetch_rates(&self, start: NaiveDate, end: NaiveDate) -> Option<Vec<RawRateRecord>>;
}

/// Outcome of a query that reports missing data instead of failing.
#[derive(Debug, Clone, PartialEq)]
pub enum Availability<T> {
    Available(T),
    Unavailable(InflationError),
}

impl<T> Availability<T> {
    pub fn ok(self) -> Option<T> {
        match self {
            Availability::Available(value) => Some(value),
            Availability::Unavailable(_) => None,
        }
    }
}

impl<T> From<Result<T, InflationError>> for Availability<T> {
    fn from(result: Result<T, InflationError>) -> Self {
        match result {
            Ok(value) => Availability::Available(value),
            Err(e) => {
                warn!(error = %e, "Rate data unavailable");
                Availability::Unavailable(e)
            }
        }
    }
}

/// Normalized monthly rate data.
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn monthly_rates(&self) -> Result<MonthlyRates, InflationError>;

    /// First and last month with data.
    async fn available_range(&self) -> Availability<MonthRange> {
        self.monthly_rates()
            .await
            .and_then(|rates| rates.range().ok_or(InflationError::EmptyData))
            .into()
    }

    /// All months with data, in chronological order.
    async fn available_months(&self) -> Availability<Vec<MonthKey>> {
        self.monthly_rates().await.map(|rates| rates.months()).into()
    }
}

/// Turns raw rows into a month to rate mapping.
///
/// A row survives when its parsed rate is non-zero or its raw value is the
/// exact text `"0"`. Everything else that parses to zero (`"0.0"`, `""`,
/// `"n/a"`, the number `0`) is dropped.
pub fn normalize(records: &[RawRateRecord]) -> MonthlyRates {
    let mut rates = MonthlyRates::new();
    for record in records {
        let (Some(date), Some(value)) = (&record.date, &record.value) else {
            continue;
        };

        let rate = value.as_rate();
        let literal_zero = matches!(value, RawValue::Text(s) if s == "0");
        if rate == 0.0 && !literal_zero {
            debug!(date = %date, "Dropping zero or unparsable rate");
            continue;
        }

        match date.parse::<MonthKey>() {
            Ok(month) => {
                rates.insert(month, rate);
            }
            Err(e) => debug!("Dropping row: {}", e),
        }
    }
    rates
}

/// Parses the longest numeric prefix of `s`, ignoring leading whitespace.
fn parse_leading_float(s: &str) -> f64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;
    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }
    if digits == 0 {
        return 0.0;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().unwrap_or(0.0)
}
