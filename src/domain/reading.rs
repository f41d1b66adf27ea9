//! Module defining the raw rows read from the source and the validated readings built from them

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{Error, validation_error};

/// Number of decimal places a stored temperature keeps.
const TEMPERATURE_SCALE: u32 = 2;

const DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// A row as read from the source: a date and a temperature, both still unchecked text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    line: u64,
    date: String,
    temperature: String,
}

impl RawRow {
    pub fn new(line: u64, date: impl Into<String>, temperature: impl Into<String>) -> Self {
        Self {
            line,
            date: date.into(),
            temperature: temperature.into(),
        }
    }

    /// 1-based line number in the source, used to identify the row in logs
    pub fn line(&self) -> u64 {
        self.line
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn temperature(&self) -> &str {
        &self.temperature
    }
}

/// A validated temperature reading, ready to be persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading {
    reading_date: NaiveDateTime,
    temperature: Decimal,
}

impl Reading {
    pub fn new(reading_date: NaiveDateTime, temperature: Decimal) -> Self {
        Self {
            reading_date,
            temperature: temperature
                .round_dp_with_strategy(TEMPERATURE_SCALE, RoundingStrategy::MidpointAwayFromZero),
        }
    }

    pub fn reading_date(&self) -> NaiveDateTime {
        self.reading_date
    }

    pub fn temperature(&self) -> Decimal {
        self.temperature
    }
}

impl TryFrom<&RawRow> for Reading {
    type Error = Error;

    fn try_from(row: &RawRow) -> Result<Self, Self::Error> {
        let reading_date = parse_date(row.date())
            .ok_or_else(|| validation_error(row.line(), format!("invalid date: {:?}", row.date())))?;
        let temperature = parse_temperature(row.temperature()).ok_or_else(|| {
            validation_error(
                row.line(),
                format!("invalid temperature: {:?}", row.temperature()),
            )
        })?;
        Ok(Reading::new(reading_date, temperature))
    }
}

fn parse_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

// Decimal has no NaN or infinity, so anything that parses is finite
fn parse_temperature(text: &str) -> Option<Decimal> {
    let text = text.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}
