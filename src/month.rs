use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fmt, str::FromStr};
use thiserror::Error;

/// A calendar month, the unit every budget limit is expressed in
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Month {
    first: NaiveDate,
}

#[derive(Error, Debug, PartialEq)]
pub enum MonthParseError {
    #[error("expected a month formatted as YYYY-MM, got '{0}'")]
    Format(String),
    #[error("month {0} is outside the range 1 - 12")]
    OutOfRange(u32),
}

impl Month {
    /// Returns `None` if `month` is not between 1 and 12
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first| Month { first })
    }

    /// The month a given day falls in
    pub fn of(date: NaiveDate) -> Self {
        Month {
            first: date - Duration::days(date.day0() as i64),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    /// January = 1, December = 12
    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next().first - Duration::days(1)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        Month::of(date) == *self
    }

    pub fn next(&self) -> Self {
        // No month is longer than 31 days
        Month::of(self.first + Duration::days(31))
    }

    pub fn prev(&self) -> Self {
        Month::of(self.first - Duration::days(1))
    }

    /// Whole-month difference between `earlier` and this month.
    ///
    /// Days are ignored entirely: 31 January to 1 February is one month. The result is
    /// negative when `earlier` is actually later than `self`.
    pub fn months_since(&self, earlier: Month) -> i32 {
        (self.year() - earlier.year()) * 12 + (self.month() as i32 - earlier.month() as i32)
    }
}

impl From<NaiveDate> for Month {
    fn from(date: NaiveDate) -> Self {
        Month::of(date)
    }
}

impl TryFrom<String> for Month {
    type Error = MonthParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Month> for String {
    fn from(month: Month) -> String {
        month.to_string()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for Month {
    type Err = MonthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let format_err = || MonthParseError::Format(s.to_owned());

        let (year, month) = s.trim().split_once('-').ok_or_else(format_err)?;
        let year: i32 = year.parse().map_err(|_| format_err())?;
        let month: u32 = month.parse().map_err(|_| format_err())?;

        Month::new(year, month).ok_or(MonthParseError::OutOfRange(month))
    }
}
