// src/date_week.rs
use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    #[error("Date calculation overflow near {date}")]
    Overflow { date: NaiveDate },
}

/// A Monday-start, seven day window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekRange {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub days: [NaiveDate; 7],
}

impl WeekRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.week_start <= date && date <= self.week_end
    }
}

/// Monday of the week containing `date`. Weeks start on Monday regardless of locale.
pub fn week_start_of(date: NaiveDate) -> Result<NaiveDate, DateError> {
    // (weekday + 6) % 7 with 0 = Sunday: Sunday goes back 6 days, Monday stays.
    let sunday_based = date.weekday().num_days_from_sunday();
    let back = (sunday_based + 6) % 7;
    date.checked_sub_days(Days::new(u64::from(back)))
        .ok_or(DateError::Overflow { date })
}

pub fn week_range(date: NaiveDate) -> Result<WeekRange, DateError> {
    let week_start = week_start_of(date)?;
    let mut days = [week_start; 7];
    for (offset, slot) in days.iter_mut().enumerate() {
        *slot = week_start
            .checked_add_days(Days::new(offset as u64))
            .ok_or(DateError::Overflow { date: week_start })?;
    }
    Ok(WeekRange {
        week_start,
        week_end: days[6],
        days,
    })
}

/// All dates from `start` to `end`, both inclusive, ascending.
/// An inverted range yields an empty sequence.
pub fn days_in_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    if end < start {
        return Vec::new();
    }
    start.iter_days().take_while(|d| *d <= end).collect()
}
