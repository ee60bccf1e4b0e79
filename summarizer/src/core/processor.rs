//! Per-unit transformation
//!
//! One transformation function handles both unit kinds: regular units fold
//! into the shared aggregate and emit nothing; the trailing summary unit
//! reads the completed aggregate and emits one summary per seeded region.

use crate::core::metrics;
use crate::core::store::AggregateStore;
use crate::error::{EngineError, EngineResult};
use chrono::NaiveDate;
use shared::{RawRecord, RegionSummary, Sex, SharedError};
use std::sync::Arc;
use tracing::debug;

/// Field names expected on every intake record
const FIELD_RESIDENCE: &str = "Residence";
const FIELD_HEIGHT_FT: &str = "Height.ft";
const FIELD_HEIGHT_IN: &str = "Height.in";
const FIELD_WEIGHT: &str = "Weight";
const FIELD_BIRTH_DATE: &str = "BirthDate";
const FIELD_GENDER: &str = "Gender";

/// A unit of work fed through the pipeline
#[derive(Clone, Debug)]
pub enum WorkUnit {
    /// One intake record; folds into the aggregate, emits nothing
    Regular(RawRecord),
    /// The reserved trailing unit; reads the aggregate and emits the summaries
    Summary,
}

/// Transforms units of work against the shared aggregate store
#[derive(Clone)]
pub struct UnitProcessor {
    store: Arc<AggregateStore>,
    as_of: NaiveDate,
}

impl UnitProcessor {
    /// Create a processor computing ages as of the given date
    pub fn new(store: Arc<AggregateStore>, as_of: NaiveDate) -> Self {
        Self { store, as_of }
    }

    /// Process one unit of work.
    ///
    /// Regular units return an empty vec; the summary unit returns one
    /// summary per seeded region, ordered by region code ascending.
    pub fn process(&self, unit: &WorkUnit) -> EngineResult<Vec<RegionSummary>> {
        match unit {
            WorkUnit::Regular(record) => {
                self.fold_record(record)?;
                Ok(Vec::new())
            }
            WorkUnit::Summary => Ok(self.summarize()),
        }
    }

    fn fold_record(&self, record: &RawRecord) -> EngineResult<()> {
        let region = decode(record, record.text(FIELD_RESIDENCE))?;
        let feet = decode(record, record.integer(FIELD_HEIGHT_FT))?;
        let inches = decode(record, record.integer(FIELD_HEIGHT_IN))?;
        let weight = decode(record, record.integer(FIELD_WEIGHT))?;
        let birth = decode(record, record.date(FIELD_BIRTH_DATE))?;
        let sex = Sex::from_code(decode(record, record.text(FIELD_GENDER))?);

        let height = metrics::to_inches(feet, inches);
        let bmi = metrics::to_bmi(height, weight).ok_or_else(|| EngineError::Computation {
            rec_no: record.rec_no,
            message: format!("BMI undefined for height {height}in, weight {weight}lbs"),
        })?;
        let age = metrics::to_age(birth, self.as_of);
        let overweight = metrics::is_overweight(bmi, age, sex);

        debug!(
            rec_no = record.rec_no,
            region, height, weight, age, overweight, "folding record"
        );

        self.store
            .fold(region, |totals| totals.with_measurement(height as u64, weight as u64, bmi, overweight))
    }

    fn summarize(&self) -> Vec<RegionSummary> {
        self.store
            .snapshot()
            .into_iter()
            .map(|(region, totals)| {
                let average_height = metrics::average(totals.height_total, totals.headcount);
                let (feet, inches) = metrics::to_feet_and_inches(average_height as i64);
                let average_bmi = if totals.headcount == 0 {
                    0.0
                } else {
                    metrics::to_one_decimal(totals.bmi_total / totals.headcount as f64)
                };

                RegionSummary {
                    region,
                    total_headcount: totals.headcount,
                    average_height_ft: feet as u64,
                    average_height_in: inches as u64,
                    average_weight: metrics::average(totals.weight_total, totals.headcount),
                    average_bmi,
                    overweight_headcount: totals.overweight_headcount,
                    overweight_percentage: metrics::average(totals.overweight_headcount * 100, totals.headcount),
                }
            })
            .collect()
    }
}

fn decode<T>(record: &RawRecord, value: Result<T, SharedError>) -> EngineResult<T> {
    value.map_err(|source| EngineError::RecordDecode {
        rec_no: record.rec_no,
        source,
    })
}
