//! Shared fixtures for the integration suite

use chrono::NaiveDate;
use shared::RawRecord;
use summarizer::PipelineConfig;

/// Fixed reference date so age computation is deterministic
pub fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2019, 6, 15).unwrap()
}

/// Build a complete intake record
pub fn person(
    rec_no: u64,
    region: &str,
    feet: i64,
    inches: i64,
    weight: i64,
    birth: (i32, u32, u32),
    gender: &str,
) -> RawRecord {
    RawRecord::new(rec_no)
        .with_text("Residence", region)
        .with_integer("Height.ft", feet)
        .with_integer("Height.in", inches)
        .with_integer("Weight", weight)
        .with_date(
            "BirthDate",
            NaiveDate::from_ymd_opt(birth.0, birth.1, birth.2).unwrap(),
        )
        .with_text("Gender", gender)
}

/// Pipeline config seeded with the given regions and a fixed as-of date
pub fn config(regions: &[&str], concurrency: usize) -> PipelineConfig {
    PipelineConfig {
        concurrency,
        regions: regions.iter().map(|region| region.to_string()).collect(),
        as_of: Some(as_of()),
    }
}

pub fn init() {
    shared::logging::init_tracing(Some("warn"));
}
