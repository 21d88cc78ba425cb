//! Calendar quarter bucketing.
//!
//! Partitions a date range into fixed calendar quarters (Q1 = Jan-Mar,
//! Q2 = Apr-Jun, Q3 = Jul-Sep, Q4 = Oct-Dec) and aligns sparse per-quarter
//! counts against an exhaustive, zero-initialized template.

mod template;

pub use template::{build_quarter_template, merge_results, QuarterCount, QuarterTemplate};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised by the quarter bucketer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuarterError {
    /// The start of the range is after its end.
    #[error("invalid date range: {start} is after {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// A result row named a quarter the template does not contain.
    #[error("quarter '{label}' is not part of the template")]
    UnknownQuarter { label: String },

    /// A string that is not of the form `<year>Q<1..4>`.
    #[error("invalid quarter label '{0}', expected e.g. 2024Q1")]
    InvalidLabel(String),
}

/// A fixed three-month calendar quarter.
///
/// Ordering is chronological; `Display` produces the label used in SQL
/// and reports (`2024Q3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Quarter {
    year: i32,
    number: u8,
}

impl Quarter {
    /// Creates a quarter, returning `None` unless `number` is 1 through 4 and
    /// `year` lies in the range `NaiveDate` can represent.
    pub fn new(year: i32, number: u8) -> Option<Self> {
        let years = NaiveDate::MIN.year()..=NaiveDate::MAX.year();
        ((1..=4).contains(&number) && years.contains(&year)).then_some(Self { year, number })
    }

    /// Returns the quarter a `(year, month)` pair falls in, or `None` for a
    /// month outside 1-12.
    pub fn from_year_month(year: i32, month: u32) -> Option<Self> {
        let number = match month {
            1..=3 => 1,
            4..=6 => 2,
            7..=9 => 3,
            10..=12 => 4,
            _ => return None,
        };
        Self::new(year, number)
    }

    /// Returns the quarter containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            number: (date.month0() / 3) as u8 + 1,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    /// First calendar month of the quarter (1, 4, 7 or 10).
    pub fn first_month(&self) -> u32 {
        u32::from(self.number - 1) * 3 + 1
    }

    /// Advances to the following quarter, carrying into the next year after Q4.
    ///
    /// Years are bounded by `new`, so the carry cannot overflow.
    pub fn next(self) -> Self {
        match self.number {
            4 => Self {
                year: self.year + 1,
                number: 1,
            },
            n => Self {
                year: self.year,
                number: n + 1,
            },
        }
    }

    /// Last calendar day of the quarter; the inclusive bucketing cutoff.
    pub fn last_day(&self) -> NaiveDate {
        let (year, month) = match self.number {
            4 => (self.year + 1, 1),
            _ => (self.year, self.first_month() + 3),
        };
        NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(|first_of_next| first_of_next.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// The `<year>Q<n>` label.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Q{}", self.year, self.number)
    }
}

impl FromStr for Quarter {
    type Err = QuarterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || QuarterError::InvalidLabel(s.to_string());
        let (year, number) = s.split_once('Q').ok_or_else(invalid)?;
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let number = number.parse::<u8>().map_err(|_| invalid())?;
        Self::new(year, number).ok_or_else(invalid)
    }
}

impl From<Quarter> for String {
    fn from(quarter: Quarter) -> Self {
        quarter.label()
    }
}

impl TryFrom<String> for Quarter {
    type Error = QuarterError;

    fn try_from(label: String) -> Result<Self, Self::Error> {
        label.parse()
    }
}
