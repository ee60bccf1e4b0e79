//! Core shared types: intake records and the summaries the engine emits

use crate::errors::{SharedError, SharedResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Partition identifier for aggregation (e.g. a US state code)
pub type RegionCode = String;

/// Default seed set: every region a record may reference
pub const US_REGIONS: [&str; 51] = [
    "AK", "AL", "AR", "AZ", "CA", "CO", "CT", "DC", "DE", "FL", "GA", "HI", "IA", "ID", "IL", "IN", "KS",
    "KY", "LA", "MA", "MD", "ME", "MI", "MN", "MO", "MS", "MT", "NC", "ND", "NE", "NH", "NJ", "NM", "NV",
    "NY", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VA", "VT", "WA", "WI", "WV", "WY",
];

/// Sex recorded on an intake record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// Parse a free-form gender field; anything starting with `m`/`M` is male.
    pub fn from_code(code: &str) -> Self {
        let male = code
            .trim_start()
            .chars()
            .next()
            .map(|c| c.eq_ignore_ascii_case(&'m'))
            .unwrap_or(false);
        if male { Sex::Male } else { Sex::Female }
    }

    pub fn is_male(self) -> bool {
        matches!(self, Sex::Male)
    }
}

/// A single typed attribute value carried by an intake record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Integer(i64),
    Text(String),
    Date(NaiveDate),
}

/// One intake record: a bag of named, typed attributes plus its sequence number
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawRecord {
    pub rec_no: u64,
    fields: HashMap<String, FieldValue>,
}

impl RawRecord {
    pub fn new(rec_no: u64) -> Self {
        Self {
            rec_no,
            fields: HashMap::new(),
        }
    }

    pub fn with_integer(mut self, name: &str, value: i64) -> Self {
        self.fields.insert(name.to_string(), FieldValue::Integer(value));
        self
    }

    pub fn with_text(mut self, name: &str, value: &str) -> Self {
        self.fields.insert(name.to_string(), FieldValue::Text(value.to_string()));
        self
    }

    pub fn with_date(mut self, name: &str, value: NaiveDate) -> Self {
        self.fields.insert(name.to_string(), FieldValue::Date(value));
        self
    }

    /// Typed access; a missing field or a type mismatch is a decode failure.
    pub fn integer(&self, name: &str) -> SharedResult<i64> {
        match self.fields.get(name) {
            Some(FieldValue::Integer(value)) => Ok(*value),
            Some(_) => Err(SharedError::FieldType {
                field: name.to_string(),
                expected: "integer",
            }),
            None => Err(SharedError::MissingField { field: name.to_string() }),
        }
    }

    pub fn text(&self, name: &str) -> SharedResult<&str> {
        match self.fields.get(name) {
            Some(FieldValue::Text(value)) => Ok(value),
            Some(_) => Err(SharedError::FieldType {
                field: name.to_string(),
                expected: "text",
            }),
            None => Err(SharedError::MissingField { field: name.to_string() }),
        }
    }

    pub fn date(&self, name: &str) -> SharedResult<NaiveDate> {
        match self.fields.get(name) {
            Some(FieldValue::Date(value)) => Ok(*value),
            Some(_) => Err(SharedError::FieldType {
                field: name.to_string(),
                expected: "date",
            }),
            None => Err(SharedError::MissingField { field: name.to_string() }),
        }
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

/// Summary emitted for one region by the trailing summary unit
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionSummary {
    pub region: RegionCode,
    pub total_headcount: u64,
    pub average_height_ft: u64,
    pub average_height_in: u64,
    pub average_weight: u64,
    pub average_bmi: f64,
    pub overweight_headcount: u64,
    pub overweight_percentage: u64,
}

impl fmt::Display for RegionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: headcount {}, height {}'{}'', weight {}lbs, BMI {:.1}, overweight {} ({}%)",
            self.region,
            self.total_headcount,
            self.average_height_ft,
            self.average_height_in,
            self.average_weight,
            self.average_bmi,
            self.overweight_headcount,
            self.overweight_percentage,
        )
    }
}
