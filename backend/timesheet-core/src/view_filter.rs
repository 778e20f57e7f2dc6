// src/view_filter.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::timesheet_entry::{parse_date, DayEntry, EmployeeId, ProjectId, TimesheetStatus, UnknownStatus};
use crate::week_aggregation::WeekBucket;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid {field} date '{raw}', expected YYYY-MM-DD")]
    InvalidDate { field: &'static str, raw: String },
    #[error(transparent)]
    InvalidStatus(#[from] UnknownStatus),
}

/// Active filter selection. `None` on an axis means no filtering on that axis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    pub project_id: Option<ProjectId>,
    pub employee_id: Option<EmployeeId>,
    pub status: Option<TimesheetStatus>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl FilterCriteria {
    /// Build criteria from form-style string inputs, where an empty value means "any".
    pub fn from_form(
        project_id: Option<&str>,
        employee_id: Option<&str>,
        status: Option<&str>,
        date_from: Option<&str>,
        date_to: Option<&str>,
    ) -> Result<Self, FilterError> {
        Ok(Self {
            project_id: non_empty(project_id).map(String::from),
            employee_id: non_empty(employee_id).map(String::from),
            status: non_empty(status)
                .map(|s| s.parse::<TimesheetStatus>())
                .transpose()?,
            date_from: parse_form_date("dateFrom", date_from)?,
            date_to: parse_form_date("dateTo", date_to)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn matches<T: Filterable + ?Sized>(&self, item: &T) -> bool {
        if let Some(project_id) = non_empty(self.project_id.as_deref()) {
            if item.project_id() != project_id {
                return false;
            }
        }
        if let Some(employee_id) = non_empty(self.employee_id.as_deref()) {
            if item.employee_id() != employee_id {
                return false;
            }
        }
        if let Some(status) = self.status {
            if item.status() != status {
                return false;
            }
        }
        if self.date_from.is_some() || self.date_to.is_some() {
            return item.overlaps(self.date_from, self.date_to);
        }
        true
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_form_date(field: &'static str, raw: Option<&str>) -> Result<Option<NaiveDate>, FilterError> {
    non_empty(raw)
        .map(|s| {
            parse_date(s).ok_or_else(|| FilterError::InvalidDate {
                field,
                raw: s.to_string(),
            })
        })
        .transpose()
}

fn within(date: NaiveDate, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
    from.map_or(true, |f| date >= f) && to.map_or(true, |t| date <= t)
}

/// Something the view filter can select on.
pub trait Filterable {
    fn project_id(&self) -> &str;
    fn employee_id(&self) -> &str;
    fn status(&self) -> TimesheetStatus;
    /// Whether the item touches the inclusive `[from, to]` range.
    fn overlaps(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool;
}

impl Filterable for DayEntry {
    fn project_id(&self) -> &str {
        &self.project_id
    }

    fn employee_id(&self) -> &str {
        &self.employee_id
    }

    fn status(&self) -> TimesheetStatus {
        self.status
    }

    fn overlaps(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
        within(self.date, from, to)
    }
}

impl Filterable for WeekBucket {
    fn project_id(&self) -> &str {
        &self.project_id
    }

    fn employee_id(&self) -> &str {
        &self.employee_id
    }

    fn status(&self) -> TimesheetStatus {
        self.overall_status
    }

    fn overlaps(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
        self.days.iter().any(|d| within(d.date, from, to))
    }
}

/// Keep the items matching every criterion, preserving input order.
pub fn filter<T: Filterable + Clone>(items: &[T], criteria: &FilterCriteria) -> Vec<T> {
    items
        .iter()
        .filter(|item| criteria.matches(*item))
        .cloned()
        .collect()
}

// --- Filter Options ---

/// An `(id, name)` pair offered in a filter dropdown.
///
/// Also the shape read from the project and employee directory endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    #[serde(deserialize_with = "crate::session::id_as_string")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

pub fn distinct_projects(entries: &[DayEntry]) -> Vec<FilterOption> {
    distinct_by(entries, |e| (&e.project_id, &e.project_name))
}

pub fn distinct_employees(entries: &[DayEntry]) -> Vec<FilterOption> {
    distinct_by(entries, |e| (&e.employee_id, &e.employee_name))
}

fn distinct_by<F>(entries: &[DayEntry], pick: F) -> Vec<FilterOption>
where
    F: Fn(&DayEntry) -> (&String, &Option<String>),
{
    let mut seen = HashSet::new();
    entries
        .iter()
        .map(pick)
        .filter(|(id, _)| seen.insert(*id))
        .map(|(id, name)| FilterOption {
            id: id.clone(),
            name: name.clone(),
        })
        .collect()
}
