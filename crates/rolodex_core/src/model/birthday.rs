//! Birthday value type and age calculations.
//!
//! # Responsibility
//! - Store a birth date as an explicit (year, month, day) triple.
//! - Compute age and same-day checks against a caller-supplied date.
//!
//! # Invariants
//! - A validated `Birthday` always decomposes into a real calendar date.
//! - Age increments on the calendar-year boundary, not on the birth
//!   month/day. A person born in December reports the incremented age
//!   from Jan 1 on. This is the product's age convention, not a bug.

use crate::model::person::PersonValidationError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Birth date kept as separate fields so month/day queries stay indexable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Birthday {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl Birthday {
    /// Creates a validated birthday from a (year, month, day) triple.
    ///
    /// # Errors
    /// - `InvalidBirthday` when the year is not positive or the triple does
    ///   not form a real calendar date (Feb 30, month 13, ...). Leap days
    ///   are accepted in leap years only.
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, PersonValidationError> {
        let birthday = Self { year, month, day };
        birthday.validate()?;
        Ok(birthday)
    }

    /// Creates a birthday from an already-valid calendar date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }

    /// Re-checks the triple, for values constructed field-by-field
    /// (deserialization, row parsing).
    pub fn validate(&self) -> Result<(), PersonValidationError> {
        if self.year <= 0 || self.as_date().is_none() {
            return Err(PersonValidationError::InvalidBirthday {
                year: self.year,
                month: self.month,
                day: self.day,
            });
        }
        Ok(())
    }

    /// Returns the triple as a calendar date, or `None` when invalid.
    pub fn as_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }

    /// Age in the given calendar year.
    ///
    /// # Contract
    /// - `age = current_year - birth_year + 1`.
    /// - Month and day are never consulted; everyone ages on Jan 1.
    pub fn age_in_year(&self, current_year: i32) -> i32 {
        current_year - self.year + 1
    }

    /// Whether the given date falls on this birthday (month/day match,
    /// birth year ignored).
    pub fn is_on(&self, date: NaiveDate) -> bool {
        self.month == date.month() && self.day == date.day()
    }
}
