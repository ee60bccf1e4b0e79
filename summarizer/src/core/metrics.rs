//! Pure domain calculations for individual records
//!
//! Height conversions, BMI, age and the overweight classification. All
//! functions are deterministic and free of shared state.

use chrono::{Datelike, NaiveDate};
use shared::Sex;

/// Minor units per major unit in the two-tier height encoding
pub const INCHES_PER_FOOT: i64 = 12;

/// BMI scale constant for imperial units (lbs per square inch)
const BMI_SCALE: f64 = 703.0;

/// Convert a feet + inches pair into total inches
pub fn to_inches(feet: i64, inches: i64) -> i64 {
    feet * INCHES_PER_FOOT + inches
}

/// Convert total inches back into a feet + inches pair
pub fn to_feet_and_inches(total: i64) -> (i64, i64) {
    (total / INCHES_PER_FOOT, total % INCHES_PER_FOOT)
}

/// Body-mass index from height in inches and weight in pounds.
///
/// `None` when the height is non-positive or the weight negative; the
/// caller propagates that as a computation fault, never a silent zero.
pub fn to_bmi(height_inches: i64, weight: i64) -> Option<f64> {
    if height_inches <= 0 || weight < 0 {
        return None;
    }
    let height = height_inches as f64;
    Some(BMI_SCALE * weight as f64 / height / height)
}

/// Age in whole years as of the given date.
///
/// One year is subtracted when the birthday has not yet occurred in the
/// `as_of` year (day-of-year comparison).
pub fn to_age(birth: NaiveDate, as_of: NaiveDate) -> i64 {
    let mut age = (as_of.year() - birth.year()) as i64;
    if as_of.ordinal() < birth.ordinal() {
        age -= 1;
    }
    age
}

/// Overweight BMI threshold, piecewise linear in age and branching on sex.
///
/// Boundary ages (20, 40, 60) take the upper branch.
pub fn overweight_threshold(age: i64, sex: Sex) -> f64 {
    match sex {
        Sex::Male => {
            if age < 20 {
                25.0
            } else if age < 40 {
                25.0 + 0.2 * (age - 20) as f64
            } else if age < 60 {
                29.0 + 0.1 * (age - 40) as f64
            } else {
                31.0
            }
        }
        Sex::Female => {
            if age < 20 {
                24.0
            } else if age < 60 {
                24.0 + 0.1 * (age - 20) as f64
            } else {
                28.0
            }
        }
    }
}

/// Whether the BMI exceeds the sex- and age-adjusted threshold
pub fn is_overweight(bmi: f64, age: i64, sex: Sex) -> bool {
    bmi > overweight_threshold(age, sex)
}

/// Integer average rounded half away from zero; an empty group averages to zero
pub fn average(total: u64, count: u64) -> u64 {
    if count == 0 {
        return 0;
    }
    (total as f64 / count as f64).round() as u64
}

/// Round to one decimal place, half away from zero
pub fn to_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
