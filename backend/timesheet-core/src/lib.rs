// src/lib.rs
pub mod approval_workflow;
pub mod config;
pub mod csv_export;
pub mod date_week;
pub mod session;
pub mod status_reconcile;
pub mod submission_validation;
pub mod timesheet_client;
pub mod timesheet_entry;
pub mod view_filter;
pub mod week_aggregation;


pub use approval_workflow::{SubmitReceipt, TimesheetBoard, WorkflowError};
pub use config::{Config, ConfigError};
pub use csv_export::{write_weeks_csv, ExportError};
pub use date_week::{days_in_range, week_range, week_start_of, DateError, WeekRange};
pub use session::{Identity, Role, Session, SessionError, TimesheetScope};
pub use status_reconcile::{apply_status_change, revert_status_change, ReconcileError};
pub use submission_validation::{validate_submission, NewDayEntry, SubmissionError, WeeklySubmission};
pub use timesheet_client::{ApiError, HttpTimesheetApi, TimesheetApi, PENDING_GROUPED_ENDPOINT};
pub use timesheet_entry::{
    normalize, normalize_all, normalize_day, DayEntry, EmployeeId, EntryId, NormalizeError,
    NormalizedBatch, ProjectId, RawDay, RawRecord, RawWeekGroup, TimesheetStatus, UnknownStatus,
    UNGROUPED_PROJECT_ID, UNKNOWN_EMPLOYEE_ID,
};
pub use view_filter::{
    distinct_employees, distinct_projects, filter, FilterCriteria, FilterError, FilterOption,
    Filterable,
};
pub use week_aggregation::{
    aggregate, overall_status, summarize_by_project, EmployeeHours, ProjectSummary, WeekBucket,
    WeekKey,
};
