// src/submission_validation.rs
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::{collections::BTreeMap, str::FromStr};
use thiserror::Error;
use tracing::debug;

use crate::date_week::{days_in_range, week_range, DateError};
use crate::timesheet_entry::ProjectId;

// --- Constants ---

pub const MIN_DAY_HOURS: Decimal = dec!(0.5);
pub const MAX_DAY_HOURS: Decimal = dec!(24);
/// Notes travel as both `notes` and `description`; the tighter backend limit applies.
pub const MAX_NOTES_LEN: usize = 500;

// --- Error Types ---

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("Please select a project")]
    MissingProject,
    #[error("Hours for {date} must be a number, got '{raw}'")]
    InvalidHours { date: NaiveDate, raw: String },
    #[error("Hours for {date} must be between {MIN_DAY_HOURS} and {MAX_DAY_HOURS} (got {hours})")]
    HoursOutOfRange { date: NaiveDate, hours: Decimal },
    #[error("{date} is outside the submission range {start} to {end}")]
    DateOutsideRange {
        date: NaiveDate,
        start: NaiveDate,
        end: NaiveDate,
    },
    #[error("Hours cannot be reported for a future date ({date})")]
    FutureDate { date: NaiveDate },
    #[error("Notes for {date} must not exceed {MAX_NOTES_LEN} characters")]
    NotesTooLong { date: NaiveDate },
    #[error("Please enter hours for at least one day")]
    NoHoursEntered,
    #[error(transparent)]
    Date(#[from] DateError),
}

// --- Submission Draft ---

/// Hours typed into the weekly submission form, keyed by date, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklySubmission {
    pub project_id: Option<ProjectId>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub hours: BTreeMap<NaiveDate, String>,
    pub notes: BTreeMap<NaiveDate, String>,
}

impl WeeklySubmission {
    /// Draft covering the Monday to Sunday week that contains `any_date`.
    pub fn for_week(project_id: Option<&str>, any_date: NaiveDate) -> Result<Self, DateError> {
        let range = week_range(any_date)?;
        Ok(Self::custom_range(project_id, range.week_start, range.week_end))
    }

    pub fn custom_range(project_id: Option<&str>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            project_id: project_id.map(String::from),
            start,
            end,
            hours: BTreeMap::new(),
            notes: BTreeMap::new(),
        }
    }

    pub fn set_hours(&mut self, date: NaiveDate, raw: &str) -> &mut Self {
        self.hours.insert(date, raw.to_string());
        self
    }

    pub fn set_notes(&mut self, date: NaiveDate, notes: &str) -> &mut Self {
        self.notes.insert(date, notes.to_string());
        self
    }

    pub fn days(&self) -> Vec<NaiveDate> {
        days_in_range(self.start, self.end)
    }

    /// Running total shown beside the form; unparseable cells count as zero.
    pub fn total_hours(&self) -> Decimal {
        self.hours
            .values()
            .filter_map(|raw| Decimal::from_str(raw.trim()).ok())
            .sum()
    }
}

/// A validated day ready to be sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDayEntry {
    pub project_id: ProjectId,
    pub date: NaiveDate,
    pub hours: Decimal,
    pub notes: Option<String>,
}

/// Validate a draft and turn every populated day into a [`NewDayEntry`], ascending by date.
pub fn validate_submission(
    draft: &WeeklySubmission,
    today: NaiveDate,
) -> Result<Vec<NewDayEntry>, SubmissionError> {
    let project_id = draft
        .project_id
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or(SubmissionError::MissingProject)?;

    let outside = draft
        .hours
        .keys()
        .chain(draft.notes.keys())
        .find(|date| **date < draft.start || **date > draft.end);
    if let Some(date) = outside {
        return Err(SubmissionError::DateOutsideRange {
            date: *date,
            start: draft.start,
            end: draft.end,
        });
    }

    let mut accepted = Vec::new();
    for date in draft.days() {
        let Some(raw) = draft.hours.get(&date).map(|h| h.trim()).filter(|h| !h.is_empty()) else {
            continue;
        };
        let hours = Decimal::from_str(raw).map_err(|_| SubmissionError::InvalidHours {
            date,
            raw: raw.to_string(),
        })?;
        if hours < MIN_DAY_HOURS || hours > MAX_DAY_HOURS {
            return Err(SubmissionError::HoursOutOfRange { date, hours });
        }
        if date > today {
            return Err(SubmissionError::FutureDate { date });
        }

        let notes = draft
            .notes
            .get(&date)
            .map(|n| n.trim())
            .filter(|n| !n.is_empty());
        if notes.is_some_and(|n| n.chars().count() > MAX_NOTES_LEN) {
            return Err(SubmissionError::NotesTooLong { date });
        }

        accepted.push(NewDayEntry {
            project_id: project_id.to_string(),
            date,
            hours,
            notes: notes.map(String::from),
        });
    }

    if accepted.is_empty() {
        return Err(SubmissionError::NoHoursEntered);
    }
    debug!(
        "Submission for project {} validated: {} day(s)",
        project_id,
        accepted.len()
    );
    Ok(accepted)
}
