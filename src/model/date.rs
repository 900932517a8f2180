// File: src/model/date.rs
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `D/M` with an optional `/YYYY`, anchored at the start of the input.
static DATE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})(?:/(\d{4}))?").unwrap());

/// First bare `D/M` pair anywhere in a cell.
static DAY_MONTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{1,2})/(\d{1,2})").unwrap());

/// Every word-bounded `D/M` pair in a cell.
static DAY_MONTH_BOUNDED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})\b").unwrap());

/// The academic year a planning covers. Months 8..=12 belong to the fall
/// term (`fall_year`), months 1..=7 to the spring term (`fall_year + 1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcademicYear {
    pub fall_year: i32,
}

impl AcademicYear {
    pub fn new(fall_year: i32) -> Self {
        Self { fall_year }
    }

    pub fn spring_year(&self) -> i32 {
        self.fall_year + 1
    }

    pub fn year_for_month(&self, month: u32) -> i32 {
        if (1..=7).contains(&month) {
            self.spring_year()
        } else {
            self.fall_year
        }
    }

    /// Assigns a year to a bare day/month pair. Returns `None` when the pair
    /// is outside 1..=31 / 1..=12.
    pub fn resolve(&self, day: u32, month: u32) -> Option<CalendarDate> {
        CalendarDate::new(self.year_for_month(month), month, day)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CalendarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl CalendarDate {
    pub fn new(year: i32, month: u32, day: u32) -> Option<Self> {
        if !(1..=31).contains(&day) || !(1..=12).contains(&month) {
            return None;
        }
        Some(Self { year, month, day })
    }

    /// Returns the chrono date, or `None` for combinations like 31/02 that
    /// pass the coarse range check but do not exist in the calendar.
    pub fn to_naive(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}/{}", self.day, self.month, self.year)
    }
}

/// Parses a `D/M` or `D/M/YYYY` token (leading/trailing whitespace ignored).
/// An explicit year wins over the academic-year rule.
pub fn parse_date_string(input: &str, year: AcademicYear) -> Option<CalendarDate> {
    let caps = DATE_TOKEN.captures(input.trim())?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let resolved_year = match caps.get(3) {
        Some(y) => y.as_str().parse().ok()?,
        None => year.year_for_month(month),
    };
    let date = CalendarDate::new(resolved_year, month, day);
    if date.is_none() {
        log::warn!("Invalid date: {:02}/{:02}/{}", day, month, resolved_year);
    }
    date
}

/// True when the cell holds something that looks like a `D/M` pair.
pub fn contains_day_month(cell: &str) -> bool {
    DAY_MONTH.is_match(cell)
}

/// Resolves the first `D/M` pair of a grid cell. Any explicit year in the
/// cell is ignored; the year always comes from the month.
pub fn first_day_month(cell: &str, year: AcademicYear) -> Option<CalendarDate> {
    let caps = DAY_MONTH.captures(cell)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    year.resolve(day, month)
}

/// Resolves every word-bounded `D/M` pair in a date cell of the markup table.
pub fn all_day_months(cell: &str, year: AcademicYear) -> Vec<CalendarDate> {
    DAY_MONTH_BOUNDED
        .captures_iter(cell)
        .filter_map(|caps| {
            let day: u32 = caps[1].parse().ok()?;
            let month: u32 = caps[2].parse().ok()?;
            year.resolve(day, month)
        })
        .collect()
}
