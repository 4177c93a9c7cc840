use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeDelta, Utc};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::{AppError, AppResult};

/// `MM-YYYY`: two digits of month, dash, four digits of year.
static MONTH_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2})-(\d{4})$").expect("month token pattern is valid"));

/// A calendar month parsed from a `MM-YYYY` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    first_day: NaiveDate,
    next_first_day: NaiveDate,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> AppResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(invalid_token(&format!("{month:02}-{year:04}")));
        }
        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
        let first_day = NaiveDate::from_ymd_opt(year, month, 1);
        let next_first_day = NaiveDate::from_ymd_opt(next_year, next_month, 1);
        match (first_day, next_first_day) {
            (Some(first_day), Some(next_first_day)) => Ok(Self {
                first_day,
                next_first_day,
            }),
            _ => Err(invalid_token(&format!("{month:02}-{year:04}"))),
        }
    }

    pub fn parse(token: &str) -> AppResult<Self> {
        let caps = MONTH_TOKEN
            .captures(token)
            .ok_or_else(|| invalid_token(token))?;
        let month: u32 = caps[1].parse().map_err(|_| invalid_token(token))?;
        let year: i32 = caps[2].parse().map_err(|_| invalid_token(token))?;
        Self::new(year, month)
    }

    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    /// First day of the month, 00:00:00 UTC.
    pub fn first_instant(&self) -> DateTime<Utc> {
        self.first_day.and_time(NaiveTime::MIN).and_utc()
    }

    /// Last day of the month, 23:59:59 UTC.
    ///
    /// Taken as one second before the first instant of the following month, so
    /// month length and leap years come from the calendar itself.
    pub fn last_instant(&self) -> DateTime<Utc> {
        self.next_first_day.and_time(NaiveTime::MIN).and_utc() - TimeDelta::seconds(1)
    }
}

impl FromStr for YearMonth {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:04}", self.month(), self.year())
    }
}

fn invalid_token(token: &str) -> AppError {
    AppError::InvalidDateFormat(format!("'{token}' is not a valid month, expected MM-YYYY"))
}

/// Parses a month token into the first instant of that month.
pub fn normalize_start(token: &str) -> AppResult<DateTime<Utc>> {
    YearMonth::parse(token).map(|m| m.first_instant())
}

/// Parses a month token into the last instant of that month.
pub fn normalize_end(token: &str) -> AppResult<DateTime<Utc>> {
    YearMonth::parse(token).map(|m| m.last_instant())
}
