// src/timesheet_entry.rs
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::{fmt, str::FromStr};
use thiserror::Error;
use tracing::{debug, warn};

// --- Core Data Structures ---

pub type EntryId = String;
pub type EmployeeId = String;
pub type ProjectId = String;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimesheetStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl TimesheetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimesheetStatus::Pending => "PENDING",
            TimesheetStatus::Approved => "APPROVED",
            TimesheetStatus::Rejected => "REJECTED",
        }
    }

    /// Absent status means PENDING. Unrecognised values are logged and also read as PENDING.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => TimesheetStatus::Pending,
            Some(s) => s.parse().unwrap_or_else(|e| {
                warn!("{}; treating as PENDING", e);
                TimesheetStatus::Pending
            }),
        }
    }
}

impl fmt::Display for TimesheetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown timesheet status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for TimesheetStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(TimesheetStatus::Pending),
            "APPROVED" => Ok(TimesheetStatus::Approved),
            "REJECTED" => Ok(TimesheetStatus::Rejected),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

/// One employee's reported hours for one project on one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayEntry {
    pub id: EntryId,
    pub date: NaiveDate,
    /// `None` means nothing was entered for the day.
    pub hours: Option<Decimal>,
    pub status: TimesheetStatus,
    pub notes: Option<String>,
    pub employee_id: EmployeeId,
    pub employee_name: Option<String>,
    pub project_id: ProjectId,
    pub project_name: Option<String>,
    pub rejection_reason: Option<String>,
}

impl DayEntry {
    pub fn new(id: &str, employee_id: &str, project_id: &str, date: NaiveDate) -> Self {
        Self {
            id: id.to_string(),
            date,
            hours: None,
            status: TimesheetStatus::Pending,
            notes: None,
            employee_id: employee_id.to_string(),
            employee_name: None,
            project_id: project_id.to_string(),
            project_name: None,
            rejection_reason: None,
        }
    }

    pub fn hours(mut self, hours: Decimal) -> Self {
        self.hours = Some(hours);
        self
    }

    pub fn status(mut self, status: TimesheetStatus) -> Self {
        self.status = status;
        self
    }

    pub fn notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    pub fn employee_name(mut self, name: &str) -> Self {
        self.employee_name = Some(name.to_string());
        self
    }

    pub fn project_name(mut self, name: &str) -> Self {
        self.project_name = Some(name.to_string());
        self
    }

    pub fn is_populated(&self) -> bool {
        self.hours.is_some()
    }

    pub fn hours_or_zero(&self) -> Decimal {
        self.hours.unwrap_or(Decimal::ZERO)
    }
}

// --- Raw API Shapes ---

/// Employee key for days whose employee reference is missing.
pub const UNKNOWN_EMPLOYEE_ID: &str = "unknown";
/// Project key for days with neither a project id nor a project name.
pub const UNGROUPED_PROJECT_ID: &str = "ungrouped";

/// A single day as returned by the flat listing endpoints. Every field is optional
/// and read leniently, since the backend has served several variants of this record.
/// Any JSON object deserializes; a field of the wrong type reads as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDay {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: Option<String>,
    #[serde(default)]
    pub hours: Option<Value>,
    #[serde(default)]
    pub hours_worked: Option<Value>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(default)]
    pub employee_id: Option<Value>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub employee_name: Option<String>,
    #[serde(default)]
    pub user_id: Option<Value>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub user_name: Option<String>,
    /// Nested `{ id, name }` user object.
    #[serde(default)]
    pub user: Option<Value>,
    #[serde(default)]
    pub project_id: Option<Value>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub project_name: Option<String>,
    /// Either a nested `{ id, name }` object or a bare project name.
    #[serde(default)]
    pub project: Option<Value>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub rejection_reason: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub review_comments: Option<String>,
}

/// A week group from the grouped pending endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawWeekGroup {
    /// Each inner day is read on its own; a non-object day becomes an empty day and is dropped later.
    #[serde(default, deserialize_with = "lenient_days")]
    pub days: Vec<RawDay>,
    #[serde(default)]
    pub employee_id: Option<Value>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub employee_name: Option<String>,
    #[serde(default)]
    pub project_id: Option<Value>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub project_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub week_start: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub week_end: Option<String>,
}

/// One item of a listing response, with its shape resolved once.
///
/// An object carrying a `days` array is a week group, any other object is a flat
/// day, and anything else is kept as `Unreadable` so normalization can count it.
/// Deserializing a `RawRecord` never fails.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RawRecord {
    GroupedWeek(RawWeekGroup),
    FlatDay(RawDay),
    Unreadable(Value),
}

impl RawRecord {
    pub fn from_value(value: Value) -> Self {
        let grouped = match &value {
            Value::Object(map) => map.get("days").is_some_and(Value::is_array),
            _ => return RawRecord::Unreadable(value),
        };
        let parsed = if grouped {
            serde_json::from_value::<RawWeekGroup>(value.clone()).map(RawRecord::GroupedWeek)
        } else {
            serde_json::from_value::<RawDay>(value.clone()).map(RawRecord::FlatDay)
        };
        parsed.unwrap_or_else(|e| {
            debug!("Unreadable timesheet record: {}", e);
            RawRecord::Unreadable(value)
        })
    }
}

impl<'de> Deserialize<'de> for RawRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(RawRecord::from_value(Value::deserialize(deserializer)?))
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
        other => {
            debug!("Ignoring non-text field value {}", other);
            None
        }
    })
}

fn lenient_days<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<RawDay>, D::Error> {
    let values = match Value::deserialize(deserializer)? {
        Value::Array(values) => values,
        _ => return Ok(Vec::new()),
    };
    Ok(values
        .into_iter()
        .map(|value| match value {
            Value::Object(_) => serde_json::from_value::<RawDay>(value).unwrap_or_else(|e| {
                debug!("Unreadable day inside week group: {}", e);
                RawDay::default()
            }),
            other => {
                debug!("Week group day is not an object: {}", other);
                RawDay::default()
            }
        })
        .collect())
}

// --- Normalization ---

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("Record {record} has no date")]
    MissingDate { record: String },
    #[error("Record {record} has an unparseable date '{raw}'")]
    InvalidDate { record: String, raw: String },
    #[error("Record dated {date} has no id")]
    MissingId { date: NaiveDate },
    #[error("Record is not a JSON object: {raw}")]
    NotAnObject { raw: String },
}

/// Output of a normalization pass: the usable entries plus the reason each dropped record was skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedBatch {
    pub entries: Vec<DayEntry>,
    pub dropped: Vec<NormalizeError>,
}

impl NormalizedBatch {
    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }

    fn push(&mut self, result: Result<DayEntry, NormalizeError>) {
        match result {
            Ok(entry) => self.entries.push(entry),
            Err(e) => {
                warn!("Dropping timesheet record: {}", e);
                self.dropped.push(e);
            }
        }
    }

    fn extend(&mut self, other: NormalizedBatch) {
        self.entries.extend(other.entries);
        self.dropped.extend(other.dropped);
    }
}

pub fn normalize(record: &RawRecord) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();
    match record {
        RawRecord::FlatDay(day) => batch.push(normalize_day(day, None)),
        RawRecord::GroupedWeek(group) => {
            for day in &group.days {
                batch.push(normalize_day(day, Some(group)));
            }
        }
        RawRecord::Unreadable(value) => batch.push(Err(NormalizeError::NotAnObject {
            raw: truncate_for_log(value),
        })),
    }
    batch
}

pub fn normalize_all<'a, I>(records: I) -> NormalizedBatch
where
    I: IntoIterator<Item = &'a RawRecord>,
{
    let mut batch = NormalizedBatch::default();
    for record in records {
        batch.extend(normalize(record));
    }
    debug!(
        "Normalized {} day entries ({} dropped)",
        batch.entries.len(),
        batch.dropped.len()
    );
    batch
}

/// Map one raw day onto the canonical entry. Employee and project references the
/// day lacks are inherited from `parent` when the day came out of a week group.
pub fn normalize_day(day: &RawDay, parent: Option<&RawWeekGroup>) -> Result<DayEntry, NormalizeError> {
    let id = day.id.as_ref().and_then(value_to_id);
    let record_label = || id.clone().unwrap_or_else(|| "<no id>".to_string());

    let raw_date = day
        .date
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| NormalizeError::MissingDate { record: record_label() })?;
    let date = parse_date(raw_date).ok_or_else(|| NormalizeError::InvalidDate {
        record: record_label(),
        raw: raw_date.to_string(),
    })?;

    let id = id.ok_or(NormalizeError::MissingId { date })?;

    let user_ref = day.user.as_ref().and_then(RefParts::from_value);
    let project_ref = day.project.as_ref().and_then(RefParts::from_value);

    let employee_id = first_id([
        day.employee_id.as_ref(),
        user_ref.as_ref().and_then(|r| r.id.as_ref()),
        day.user_id.as_ref(),
        parent.and_then(|g| g.employee_id.as_ref()),
    ])
    .unwrap_or_else(|| {
        debug!("Record {} has no employee reference, keeping it as {}", id, UNKNOWN_EMPLOYEE_ID);
        UNKNOWN_EMPLOYEE_ID.to_string()
    });

    let project_id = first_id([
        day.project_id.as_ref(),
        project_ref.as_ref().and_then(|r| r.id.as_ref()),
        parent.and_then(|g| g.project_id.as_ref()),
    ]);

    let employee_name = first_text([
        day.employee_name.as_deref(),
        user_ref.as_ref().and_then(|r| r.name.as_deref()),
        day.user_name.as_deref(),
        parent.and_then(|g| g.employee_name.as_deref()),
    ]);
    let project_name = first_text([
        day.project_name.as_deref(),
        project_ref.as_ref().and_then(|r| r.name.as_deref()),
        parent.and_then(|g| g.project_name.as_deref()),
    ]);
    // A bare project name still groups its days; only a record with neither is ungrouped
    let project_id = project_id
        .or_else(|| project_name.clone())
        .unwrap_or_else(|| UNGROUPED_PROJECT_ID.to_string());

    let hours = [day.hours.as_ref(), day.hours_worked.as_ref()]
        .into_iter()
        .flatten()
        .find(|v| !v.is_null())
        .and_then(value_to_hours);

    let status = TimesheetStatus::from_raw(day.status.as_deref());
    let rejection_reason = match status {
        TimesheetStatus::Rejected => {
            first_text([day.rejection_reason.as_deref(), day.review_comments.as_deref()])
        }
        _ => None,
    };

    Ok(DayEntry {
        id,
        date,
        hours,
        status,
        notes: first_text([day.notes.as_deref(), day.description.as_deref()]),
        employee_id,
        employee_name,
        project_id,
        project_name,
        rejection_reason,
    })
}

/// `{ id, name }` pulled out of a nested reference. A bare string is taken as the name.
struct RefParts {
    id: Option<Value>,
    name: Option<String>,
}

impl RefParts {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self {
                id: map.get("id").cloned(),
                name: map.get("name").and_then(Value::as_str).map(String::from),
            }),
            Value::String(name) => Some(Self {
                id: None,
                name: Some(name.clone()),
            }),
            _ => None,
        }
    }
}

pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    // Accept both "2025-04-01" and datetime strings starting with the date.
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

fn truncate_for_log(value: &Value) -> String {
    let raw = value.to_string();
    match raw.char_indices().nth(80) {
        Some((cut, _)) => format!("{}...", &raw[..cut]),
        None => raw,
    }
}

fn value_to_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_to_hours(value: &Value) -> Option<Decimal> {
    let parsed = match value {
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::String(s) if !s.trim().is_empty() => Decimal::from_str(s.trim()).ok(),
        _ => None,
    };
    if parsed.is_none() && !value.is_null() {
        debug!("Ignoring non-numeric hours value {}", value);
    }
    parsed
}

fn first_id<const N: usize>(candidates: [Option<&Value>; N]) -> Option<String> {
    candidates.into_iter().flatten().find_map(value_to_id)
}

fn first_text<const N: usize>(candidates: [Option<&str>; N]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find(|s| !s.trim().is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn record(value: Value) -> RawRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn flat_record_with_primary_field_names() {
        let raw = record(json!({
            "id": 42,
            "date": "2025-04-01",
            "hours": 7.5,
            "status": "APPROVED",
            "notes": "API work",
            "employeeId": 1,
            "employeeName": "Dana",
            "projectId": 5,
            "projectName": "Apollo"
        }));
        assert!(matches!(raw, RawRecord::FlatDay(_)));

        let batch = normalize(&raw);
        assert_eq!(batch.dropped_count(), 0);
        let entry = &batch.entries[0];
        assert_eq!(entry.id, "42");
        assert_eq!(entry.date, d("2025-04-01"));
        assert_eq!(entry.hours, Some(dec!(7.5)));
        assert_eq!(entry.status, TimesheetStatus::Approved);
        assert_eq!(entry.notes.as_deref(), Some("API work"));
        assert_eq!(entry.employee_id, "1");
        assert_eq!(entry.project_id, "5");
        assert_eq!(entry.project_name.as_deref(), Some("Apollo"));
    }

    #[test]
    fn alternate_field_names_are_used_as_fallbacks() {
        let raw = record(json!({
            "id": "a-1",
            "date": "2025-04-02T00:00:00",
            "hoursWorked": "6",
            "description": "Reviews",
            "user": { "id": 9, "name": "Ida" },
            "project": { "id": 3, "name": "Hermes" }
        }));
        let entry = normalize(&raw).entries.remove(0);
        assert_eq!(entry.date, d("2025-04-02"));
        assert_eq!(entry.hours, Some(dec!(6)));
        assert_eq!(entry.notes.as_deref(), Some("Reviews"));
        assert_eq!(entry.employee_id, "9");
        assert_eq!(entry.employee_name.as_deref(), Some("Ida"));
        assert_eq!(entry.project_id, "3");
        assert_eq!(entry.project_name.as_deref(), Some("Hermes"));
        assert_eq!(entry.status, TimesheetStatus::Pending);
    }

    #[test]
    fn primary_hours_field_wins_over_alternate() {
        let raw = record(json!({
            "id": 1, "date": "2025-04-01", "hours": 4, "hoursWorked": 8,
            "employeeId": 1, "projectId": 1
        }));
        assert_eq!(normalize(&raw).entries[0].hours, Some(dec!(4)));
    }

    #[test]
    fn missing_or_blank_hours_mean_no_entry_not_zero() {
        let blank = record(json!({
            "id": 1, "date": "2025-04-01", "hours": "", "employeeId": 1, "projectId": 1
        }));
        let absent = record(json!({
            "id": 2, "date": "2025-04-01", "employeeId": 1, "projectId": 1
        }));
        assert_eq!(normalize(&blank).entries[0].hours, None);
        assert_eq!(normalize(&absent).entries[0].hours, None);
        assert!(!normalize(&absent).entries[0].is_populated());
    }

    #[test]
    fn grouped_days_inherit_references_from_the_group() {
        let raw = record(json!({
            "employeeId": 1,
            "employeeName": "Dana",
            "projectId": 5,
            "projectName": "Apollo",
            "weekStart": "2025-03-31",
            "days": [
                { "id": 10, "date": "2025-03-31", "hours": 8, "status": "PENDING" },
                { "id": 11, "date": "2025-04-01", "hours": 8, "projectId": 6 }
            ]
        }));
        assert!(matches!(raw, RawRecord::GroupedWeek(_)));

        let batch = normalize(&raw);
        assert_eq!(batch.entries.len(), 2);
        assert_eq!(batch.entries[0].employee_id, "1");
        assert_eq!(batch.entries[0].project_id, "5");
        assert_eq!(batch.entries[0].employee_name.as_deref(), Some("Dana"));
        // An inner reference takes precedence over the group's
        assert_eq!(batch.entries[1].project_id, "6");
    }

    #[test]
    fn records_without_usable_date_are_dropped_and_counted() {
        let records = vec![
            record(json!({ "id": 1, "hours": 8, "employeeId": 1, "projectId": 1 })),
            record(json!({ "id": 2, "date": "not-a-date", "employeeId": 1, "projectId": 1 })),
            record(json!({ "id": 3, "date": "2025-04-03", "employeeId": 1, "projectId": 1 })),
        ];
        let batch = normalize_all(&records);
        assert_eq!(batch.entries.len(), 1);
        assert_eq!(batch.dropped_count(), 2);
        assert_eq!(
            batch.dropped[0],
            NormalizeError::MissingDate { record: "1".to_string() }
        );
        assert_eq!(
            batch.dropped[1],
            NormalizeError::InvalidDate { record: "2".to_string(), raw: "not-a-date".to_string() }
        );
    }

    #[test]
    fn records_without_join_keys_fall_back_to_sentinels() {
        let no_project = record(json!({ "id": 1, "date": "2025-04-01", "employeeId": 1 }));
        let no_employee = record(json!({ "id": 2, "date": "2025-04-01", "projectId": 1 }));

        let batch = normalize(&no_project);
        assert_eq!(batch.dropped_count(), 0);
        assert_eq!(batch.entries[0].project_id, UNGROUPED_PROJECT_ID);

        let batch = normalize(&no_employee);
        assert_eq!(batch.dropped_count(), 0);
        assert_eq!(batch.entries[0].employee_id, UNKNOWN_EMPLOYEE_ID);
        assert_eq!(batch.entries[0].project_id, "1");
    }

    #[test]
    fn bare_project_name_groups_the_day() {
        let raw = record(json!({
            "id": 1, "date": "2025-04-01", "hours": 8, "userId": 3, "project": "Apollo"
        }));
        let entry = normalize(&raw).entries.remove(0);
        assert_eq!(entry.employee_id, "3");
        assert_eq!(entry.project_id, "Apollo");
        assert_eq!(entry.project_name.as_deref(), Some("Apollo"));
    }

    #[test]
    fn mistyped_field_does_not_fail_the_batch() {
        let records: Vec<RawRecord> = serde_json::from_value(json!([
            { "id": 1, "date": "2025-04-01", "hours": 8, "notes": 42, "employeeId": 1, "projectId": 1 },
            { "id": 2, "date": "2025-04-02", "hours": 8, "status": ["odd"], "employeeId": 1, "projectId": 1 }
        ]))
        .unwrap();
        let batch = normalize_all(&records);
        assert_eq!(batch.dropped_count(), 0);
        assert_eq!(batch.entries.len(), 2);
        assert_eq!(batch.entries[0].notes.as_deref(), Some("42"));
        assert_eq!(batch.entries[1].status, TimesheetStatus::Pending);
    }

    #[test]
    fn bad_inner_day_keeps_the_rest_of_the_week() {
        let raw = record(json!({
            "employeeId": 1,
            "projectId": 5,
            "days": [
                { "id": 10, "date": "2025-03-31", "hours": 8, "status": 1 },
                "garbage",
                { "id": 12, "date": "2025-04-02", "hours": 6, "notes": { "text": "x" } }
            ]
        }));
        assert!(matches!(raw, RawRecord::GroupedWeek(_)));

        let batch = normalize(&raw);
        assert_eq!(batch.entries.len(), 2);
        assert_eq!(batch.dropped_count(), 1);
        assert!(matches!(batch.dropped[0], NormalizeError::MissingDate { .. }));
        assert!(batch.entries.iter().all(|e| e.project_id == "5" && e.employee_id == "1"));
        assert_eq!(batch.entries[1].notes, None);
    }

    #[test]
    fn non_object_items_are_dropped_and_counted() {
        let records: Vec<RawRecord> = serde_json::from_value(json!([
            "not a record",
            17,
            { "id": 1, "date": "2025-04-01", "employeeId": 1, "projectId": 1 }
        ]))
        .unwrap();
        assert!(matches!(records[0], RawRecord::Unreadable(_)));

        let batch = normalize_all(&records);
        assert_eq!(batch.entries.len(), 1);
        assert_eq!(batch.dropped_count(), 2);
        assert_eq!(
            batch.dropped[1],
            NormalizeError::NotAnObject { raw: "17".to_string() }
        );
    }

    #[test]
    fn rejection_reason_only_kept_for_rejected_days() {
        let rejected = record(json!({
            "id": 1, "date": "2025-04-01", "status": "REJECTED",
            "reviewComments": "late submission", "employeeId": 1, "projectId": 1
        }));
        let approved = record(json!({
            "id": 2, "date": "2025-04-01", "status": "APPROVED",
            "rejectionReason": "stale", "employeeId": 1, "projectId": 1
        }));
        assert_eq!(
            normalize(&rejected).entries[0].rejection_reason.as_deref(),
            Some("late submission")
        );
        assert_eq!(normalize(&approved).entries[0].rejection_reason, None);
    }

    #[test]
    fn status_parsing_is_lenient() {
        assert_eq!(TimesheetStatus::from_raw(None), TimesheetStatus::Pending);
        assert_eq!(TimesheetStatus::from_raw(Some("")), TimesheetStatus::Pending);
        assert_eq!(TimesheetStatus::from_raw(Some("approved")), TimesheetStatus::Approved);
        assert_eq!(TimesheetStatus::from_raw(Some("NONE")), TimesheetStatus::Pending);
        assert!("bogus".parse::<TimesheetStatus>().is_err());
    }
}
