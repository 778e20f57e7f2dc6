// src/week_aggregation.rs
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{btree_map::Entry, BTreeMap};
use tracing::{debug, warn};

use crate::date_week::week_range;
use crate::timesheet_entry::{DayEntry, EmployeeId, ProjectId, TimesheetStatus};

/// Identity of a week bucket: one employee, one project, one Monday.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WeekKey {
    pub employee_id: EmployeeId,
    pub project_id: ProjectId,
    pub week_start: NaiveDate,
}

/// Derived view over the day entries of one employee/project week. Never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekBucket {
    pub employee_id: EmployeeId,
    pub employee_name: Option<String>,
    pub project_id: ProjectId,
    pub project_name: Option<String>,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    /// Populated days only, ascending by date.
    pub days: Vec<DayEntry>,
    pub total_hours: Decimal,
    pub overall_status: TimesheetStatus,
}

impl WeekBucket {
    pub fn key(&self) -> WeekKey {
        WeekKey {
            employee_id: self.employee_id.clone(),
            project_id: self.project_id.clone(),
            week_start: self.week_start,
        }
    }
}

/// Overall status over the populated days of a week:
/// any REJECTED wins, then all APPROVED (at least one day), otherwise PENDING.
pub fn overall_status<'a, I>(days: I) -> TimesheetStatus
where
    I: IntoIterator<Item = &'a DayEntry>,
{
    let mut populated = 0usize;
    let mut all_approved = true;
    for day in days.into_iter().filter(|d| d.is_populated()) {
        match day.status {
            TimesheetStatus::Rejected => return TimesheetStatus::Rejected,
            TimesheetStatus::Approved => {}
            TimesheetStatus::Pending => all_approved = false,
        }
        populated += 1;
    }
    if populated > 0 && all_approved {
        TimesheetStatus::Approved
    } else {
        TimesheetStatus::Pending
    }
}

#[derive(Debug, Default)]
struct BucketBuilder {
    employee_name: Option<String>,
    project_name: Option<String>,
    week_end: Option<NaiveDate>,
    by_date: BTreeMap<NaiveDate, DayEntry>,
}

/// Group day entries into (employee, project, week) buckets.
///
/// A second entry for the same employee, project and date replaces the first
/// (last occurrence in input order wins). Buckets are returned ordered by
/// employee, project and week start.
pub fn aggregate(entries: &[DayEntry]) -> Vec<WeekBucket> {
    let mut builders: BTreeMap<WeekKey, BucketBuilder> = BTreeMap::new();

    for entry in entries {
        let range = match week_range(entry.date) {
            Ok(range) => range,
            Err(e) => {
                warn!("Skipping entry {} in aggregation: {}", entry.id, e);
                continue;
            }
        };
        let key = WeekKey {
            employee_id: entry.employee_id.clone(),
            project_id: entry.project_id.clone(),
            week_start: range.week_start,
        };
        let builder = builders.entry(key).or_default();
        builder.week_end = Some(range.week_end);
        if entry.employee_name.is_some() {
            builder.employee_name = entry.employee_name.clone();
        }
        if entry.project_name.is_some() {
            builder.project_name = entry.project_name.clone();
        }
        match builder.by_date.entry(entry.date) {
            Entry::Occupied(mut slot) => {
                debug!(
                    "Duplicate entry for employee {} project {} on {}: {} replaces {}",
                    entry.employee_id,
                    entry.project_id,
                    entry.date,
                    entry.id,
                    slot.get().id
                );
                slot.insert(entry.clone());
            }
            Entry::Vacant(slot) => {
                slot.insert(entry.clone());
            }
        }
    }

    let buckets: Vec<WeekBucket> = builders
        .into_iter()
        .map(|(key, builder)| {
            let days: Vec<DayEntry> = builder
                .by_date
                .into_values()
                .filter(DayEntry::is_populated)
                .collect();
            let total_hours = days.iter().map(DayEntry::hours_or_zero).sum();
            let overall_status = overall_status(&days);
            WeekBucket {
                week_end: builder.week_end.unwrap_or(key.week_start),
                employee_id: key.employee_id,
                employee_name: builder.employee_name,
                project_id: key.project_id,
                project_name: builder.project_name,
                week_start: key.week_start,
                days,
                total_hours,
                overall_status,
            }
        })
        .collect();

    debug!(
        "Aggregated {} entries into {} week buckets",
        entries.len(),
        buckets.len()
    );
    buckets
}

// --- Project Summary ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeHours {
    pub employee_id: EmployeeId,
    pub employee_name: Option<String>,
    pub total_hours: Decimal,
    pub entry_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub project_id: ProjectId,
    pub project_name: Option<String>,
    pub total_hours: Decimal,
    pub employees: Vec<EmployeeHours>,
}

/// Project → employee → hours rollup over populated entries.
pub fn summarize_by_project(entries: &[DayEntry]) -> Vec<ProjectSummary> {
    let mut projects: BTreeMap<&str, (Option<String>, BTreeMap<&str, EmployeeHours>)> =
        BTreeMap::new();

    for entry in entries.iter().filter(|e| e.is_populated()) {
        let (project_name, employees) = projects.entry(entry.project_id.as_str()).or_default();
        if project_name.is_none() {
            project_name.clone_from(&entry.project_name);
        }
        let employee = employees
            .entry(entry.employee_id.as_str())
            .or_insert_with(|| EmployeeHours {
                employee_id: entry.employee_id.clone(),
                employee_name: None,
                total_hours: Decimal::ZERO,
                entry_count: 0,
            });
        if employee.employee_name.is_none() {
            employee.employee_name.clone_from(&entry.employee_name);
        }
        employee.total_hours += entry.hours_or_zero();
        employee.entry_count += 1;
    }

    projects
        .into_iter()
        .map(|(project_id, (project_name, employees))| {
            let employees: Vec<EmployeeHours> = employees.into_values().collect();
            ProjectSummary {
                project_id: project_id.to_string(),
                project_name,
                total_hours: employees.iter().map(|e| e.total_hours).sum(),
                employees,
            }
        })
        .collect()
}
