//! Observation records and their stored/exported shape

use chrono::{DateTime, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use thiserror::Error;

const MINUTE_FORMAT: &str = "%Y-%m-%dT%H:%M";
const SECOND_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

const ACCEPTED_FORMATS: [&str; 4] = [
    MINUTE_FORMAT,
    SECOND_FORMAT,
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// A single recorded measurement of the cumulative fluid amount.
///
/// Observations are never edited once created. `carryover` is the part of
/// `amount` that came from the standing offset active at submission time,
/// so recomputing old entries keeps using the offset they were recorded with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ObservationRecord", into = "ObservationRecord")]
pub struct Observation {
    pub timestamp: NaiveDateTime,
    pub amount: f64,
    pub carryover: f64,
}

impl Observation {
    pub fn new(timestamp: NaiveDateTime, amount: f64) -> Self {
        Self {
            timestamp,
            amount,
            carryover: 0.0,
        }
    }

    pub fn with_carryover(timestamp: NaiveDateTime, amount: f64, carryover: f64) -> Self {
        Self {
            timestamp,
            amount,
            carryover,
        }
    }

    /// Builds an observation from the amount a user entered at submission,
    /// adding the standing carryover on top.
    pub fn record(timestamp: NaiveDateTime, entered: f64, carryover: f64) -> Self {
        Self::with_carryover(timestamp, entered + carryover, carryover)
    }
}

#[derive(Debug, Error)]
pub enum ObservationError {
    #[error("Invalid datetime '{0}'")]
    InvalidTimestamp(String),
}

/// Parses the timestamp formats accepted from users and stored collections.
///
/// RFC 3339 values keep their wall-clock part; the offset is dropped.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    ACCEPTED_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.naive_local())
        })
}

/// Formats a timestamp the way datetime-local inputs produce it, keeping
/// seconds only when they are present.
pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    if timestamp.second() == 0 && timestamp.nanosecond() == 0 {
        timestamp.format(MINUTE_FORMAT).to_string()
    } else {
        timestamp.format(SECOND_FORMAT).to_string()
    }
}

/// Amounts arrive either as JSON numbers or as numeric strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum NumericField {
    Number(f64),
    Text(String),
}

impl NumericField {
    /// Unparseable text becomes NaN so the defect shows up in computed rates.
    fn value(&self) -> f64 {
        match self {
            NumericField::Number(n) => *n,
            NumericField::Text(s) => s.trim().parse().unwrap_or(f64::NAN),
        }
    }
}

impl From<f64> for NumericField {
    fn from(value: f64) -> Self {
        // f64 Display is the shortest representation that parses back exactly
        NumericField::Text(value.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ObservationRecord {
    datetime: String,
    amount: NumericField,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    carryover: Option<NumericField>,
}

impl TryFrom<ObservationRecord> for Observation {
    type Error = ObservationError;

    fn try_from(record: ObservationRecord) -> Result<Self, Self::Error> {
        let timestamp = parse_timestamp(&record.datetime)
            .ok_or(ObservationError::InvalidTimestamp(record.datetime))?;
        Ok(Observation {
            timestamp,
            amount: record.amount.value(),
            carryover: record.carryover.map_or(0.0, |c| c.value()),
        })
    }
}

impl From<Observation> for ObservationRecord {
    fn from(observation: Observation) -> Self {
        ObservationRecord {
            datetime: format_timestamp(&observation.timestamp),
            amount: observation.amount.into(),
            carryover: Some(observation.carryover.into()),
        }
    }
}

impl Display for Observation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}ml (carryover {}ml)",
            format_timestamp(&self.timestamp),
            self.amount,
            self.carryover
        )
    }
}
