// src/approval_workflow.rs
use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::session::{Identity, TimesheetScope};
use crate::status_reconcile::{apply_status_change, ReconcileError};
use crate::submission_validation::{validate_submission, SubmissionError, WeeklySubmission};
use crate::timesheet_client::{ApiError, TimesheetApi, PENDING_GROUPED_ENDPOINT};
use crate::timesheet_entry::{normalize_all, DayEntry, EntryId, RawRecord, TimesheetStatus};
use crate::view_filter::{distinct_employees, distinct_projects, filter, FilterCriteria, FilterOption};
use crate::week_aggregation::{aggregate, summarize_by_project, ProjectSummary, WeekBucket};

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Timesheet API call failed")]
    Api(#[from] ApiError),
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

/// Result of pushing a validated submission to the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub created: Vec<EntryId>,
    /// Days the backend accepted without reporting an id; they appear on the next load.
    pub unassigned: usize,
}

/// In-memory timesheet state kept consistent with the backend.
///
/// Every mutation talks to the API first and only touches local state once the
/// call succeeded, so a failed request leaves the board exactly as it was.
pub struct TimesheetBoard<A: TimesheetApi> {
    api: A,
    entries: Vec<DayEntry>,
    dropped: usize,
}

impl<A: TimesheetApi> TimesheetBoard<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            entries: Vec::new(),
            dropped: 0,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn entries(&self) -> &[DayEntry] {
        &self.entries
    }

    /// Records skipped by the last load because they had no usable date or id, or were not objects.
    pub fn dropped_count(&self) -> usize {
        self.dropped
    }

    /// Replace local state with the listing visible to `scope`.
    pub async fn load(&mut self, scope: &TimesheetScope) -> Result<usize, WorkflowError> {
        let records = self.api.fetch_timesheets(scope).await.map_err(|e| {
            error!("Failed to load timesheets from {}: {}", scope.endpoint(), e);
            e
        })?;
        Ok(self.load_records(&records))
    }

    /// Replace local state with the manager's pending weeks, as grouped by the backend.
    pub async fn load_pending(&mut self) -> Result<usize, WorkflowError> {
        let records = self.api.fetch_pending_grouped().await.map_err(|e| {
            error!("Failed to load pending weeks from {}: {}", PENDING_GROUPED_ENDPOINT, e);
            e
        })?;
        Ok(self.load_records(&records))
    }

    /// Replace local state with already fetched raw records.
    pub fn load_records(&mut self, records: &[RawRecord]) -> usize {
        let batch = normalize_all(records);
        if !batch.dropped.is_empty() {
            warn!(
                "{} of {} record(s) dropped during normalization",
                batch.dropped_count(),
                batch.entries.len() + batch.dropped_count()
            );
        }
        self.dropped = batch.dropped_count();
        self.entries = batch.entries;
        info!("Loaded {} timesheet entries", self.entries.len());
        self.entries.len()
    }

    /// Weekly buckets matching `criteria`, ordered by employee, project and week.
    pub fn weeks(&self, criteria: &FilterCriteria) -> Vec<WeekBucket> {
        filter(&aggregate(&self.entries), criteria)
    }

    pub fn summary(&self, criteria: &FilterCriteria) -> Vec<ProjectSummary> {
        summarize_by_project(&filter(&self.entries, criteria))
    }

    /// Project dropdown options, falling back to the loaded entries when the directory is empty or unreachable.
    pub async fn project_options(&self) -> Vec<FilterOption> {
        match self.api.fetch_projects().await {
            Ok(options) if !options.is_empty() => options,
            Ok(_) => distinct_projects(&self.entries),
            Err(e) => {
                warn!("Project directory unavailable, using loaded entries: {}", e);
                distinct_projects(&self.entries)
            }
        }
    }

    pub async fn employee_options(&self) -> Vec<FilterOption> {
        match self.api.fetch_employees().await {
            Ok(options) if !options.is_empty() => options,
            Ok(_) => distinct_employees(&self.entries),
            Err(e) => {
                warn!("Employee directory unavailable, using loaded entries: {}", e);
                distinct_employees(&self.entries)
            }
        }
    }

    pub async fn approve(&mut self, day_id: &str) -> Result<&DayEntry, WorkflowError> {
        self.change_status(day_id, TimesheetStatus::Approved, None).await
    }

    pub async fn reject(&mut self, day_id: &str, reason: &str) -> Result<&DayEntry, WorkflowError> {
        self.change_status(day_id, TimesheetStatus::Rejected, Some(reason))
            .await
    }

    async fn change_status(
        &mut self,
        day_id: &str,
        status: TimesheetStatus,
        reason: Option<&str>,
    ) -> Result<&DayEntry, WorkflowError> {
        // Local checks run before any request: unknown ids and blank reasons never reach the API
        let updated = apply_status_change(&self.entries, day_id, status, reason)?;
        let comments = reason.map(str::trim).filter(|r| !r.is_empty());

        if let Err(e) = self.api.update_status(day_id, status, comments).await {
            error!("Status update for entry {} to {} failed: {}", day_id, status, e);
            return Err(e.into());
        }

        self.entries = updated;
        info!("Entry {} marked {}", day_id, status);
        let position = self
            .entries
            .iter()
            .position(|e| e.id == day_id)
            .ok_or_else(|| ReconcileError::NotFound {
                day_id: day_id.to_string(),
            })?;
        Ok(&self.entries[position])
    }

    /// Validate a weekly draft and create one entry per populated day.
    ///
    /// Days are sent in date order. If a request fails, the days already created stay
    /// on the board and the error is returned.
    pub async fn submit(
        &mut self,
        draft: &WeeklySubmission,
        today: NaiveDate,
        submitter: &Identity,
    ) -> Result<SubmitReceipt, WorkflowError> {
        let new_entries = validate_submission(draft, today)?;
        let mut receipt = SubmitReceipt::default();

        for entry in &new_entries {
            let created = self.api.submit_entry(entry).await.map_err(|e| {
                error!("Submitting hours for {} failed: {}", entry.date, e);
                e
            })?;
            match created {
                Some(id) => {
                    let mut local = DayEntry::new(&id, &submitter.id, &entry.project_id, entry.date)
                        .hours(entry.hours)
                        .employee_name(&submitter.name);
                    local.notes.clone_from(&entry.notes);
                    self.entries.push(local);
                    receipt.created.push(id);
                }
                None => {
                    debug!("Entry for {} accepted without an id", entry.date);
                    receipt.unassigned += 1;
                }
            }
        }

        info!(
            "Submitted {} day(s) for project {}",
            new_entries.len(),
            new_entries
                .first()
                .map(|e| e.project_id.as_str())
                .unwrap_or_default()
        );
        Ok(receipt)
    }
}
