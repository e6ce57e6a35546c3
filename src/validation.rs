//! Parsing of the loosely typed fields that clients send in request bodies and
//! query strings.

use serde::Deserialize;
use time::{Date, Month, format_description::BorrowedFormatItem, macros::format_description};

use crate::{Error, amount::Amount, recurrence::last_day_of_month};

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Parse a calendar date in the `YYYY-MM-DD` format.
///
/// Timestamps such as "2024-01-15T00:00:00.000Z" are accepted and their time
/// of day is ignored.
///
/// # Errors
///
/// Returns [Error::InvalidDate] if `raw_date` is not a valid date.
pub fn parse_date(raw_date: &str) -> Result<Date, Error> {
    let trimmed = raw_date.trim();
    let date_part = match trimmed.split_once('T') {
        Some((date_part, _)) => date_part,
        None => trimmed,
    };

    Date::parse(date_part, DATE_FORMAT).map_err(|_| Error::InvalidDate(raw_date.to_owned()))
}

/// Trim a description and check it is not empty.
///
/// # Errors
///
/// Returns [Error::EmptyDescription] if `raw_description` is only whitespace.
pub fn parse_description(raw_description: &str) -> Result<String, Error> {
    let description = raw_description.trim();

    if description.is_empty() {
        Err(Error::EmptyDescription)
    } else {
        Ok(description.to_owned())
    }
}

/// Convert a raw amount into an [Amount].
///
/// # Errors
///
/// Returns [Error::InvalidAmount] if `raw_amount` is negative or not finite.
pub fn parse_amount(raw_amount: f64) -> Result<Amount, Error> {
    Amount::new(raw_amount)
}

/// Convert a zero-based month index (0 is January) into a [Month].
///
/// # Errors
///
/// Returns [Error::InvalidMonth] if `index` is not between 0 and 11.
pub fn month_from_index(index: i64) -> Result<Month, Error> {
    u8::try_from(index)
        .ok()
        .and_then(|index| Month::try_from(index + 1).ok())
        .ok_or(Error::InvalidMonth(index))
}

/// Query parameters that select a calendar month.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct MonthQuery {
    /// The zero-based month, 0 is January.
    pub month: Option<i64>,
    /// The calendar year, e.g. 2024.
    pub year: Option<i32>,
}

impl MonthQuery {
    /// The month and year selected by the query, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if only one of month and year is given or the month is
    /// out of range.
    pub fn selected_month(&self) -> Result<Option<(Month, i32)>, Error> {
        match (self.month, self.year) {
            (Some(month), Some(year)) => Ok(Some((month_from_index(month)?, year))),
            (None, None) => Ok(None),
            _ => Err(Error::InvalidQuery(
                "The month and year must be given together.".to_owned(),
            )),
        }
    }
}

/// The first and last day of `month` in `year`.
///
/// # Errors
///
/// Returns [Error::InvalidQuery] if the year is outside the supported range.
pub fn month_bounds(month: Month, year: i32) -> Result<(Date, Date), Error> {
    let out_of_range = |_| Error::InvalidQuery(format!("The year {year} is not supported."));

    let first = Date::from_calendar_date(year, month, 1).map_err(out_of_range)?;
    let last =
        Date::from_calendar_date(year, month, last_day_of_month(year, month)).map_err(out_of_range)?;

    Ok((first, last))
}
