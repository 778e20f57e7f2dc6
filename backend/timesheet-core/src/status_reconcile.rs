// src/status_reconcile.rs
use thiserror::Error;
use tracing::debug;

use crate::timesheet_entry::{DayEntry, EntryId, TimesheetStatus};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("Timesheet entry {day_id} not found")]
    NotFound { day_id: EntryId },
    #[error("A rejection reason is required to reject entry {day_id}")]
    ReasonRequired { day_id: EntryId },
}

/// Return a copy of `entries` where the entry with `day_id` carries `new_status`.
///
/// The rejection reason is stored only for `REJECTED` and cleared for every other
/// status. All other entries are cloned unchanged; `entries` itself is never touched,
/// so a caller can keep it as the rollback snapshot.
pub fn apply_status_change(
    entries: &[DayEntry],
    day_id: &str,
    new_status: TimesheetStatus,
    reason: Option<&str>,
) -> Result<Vec<DayEntry>, ReconcileError> {
    let position = entries
        .iter()
        .position(|e| e.id == day_id)
        .ok_or_else(|| ReconcileError::NotFound {
            day_id: day_id.to_string(),
        })?;

    let rejection_reason = match new_status {
        TimesheetStatus::Rejected => Some(
            reason
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .ok_or_else(|| ReconcileError::ReasonRequired {
                    day_id: day_id.to_string(),
                })?
                .to_string(),
        ),
        _ => None,
    };

    let mut updated = entries.to_vec();
    let target = &mut updated[position];
    debug!(
        "Reconciling entry {}: {} -> {}",
        target.id, target.status, new_status
    );
    target.status = new_status;
    target.rejection_reason = rejection_reason;
    Ok(updated)
}

/// Undo a local status patch by restoring the status and rejection reason captured in `original`.
pub fn revert_status_change(
    entries: &[DayEntry],
    original: &DayEntry,
) -> Result<Vec<DayEntry>, ReconcileError> {
    let position = entries
        .iter()
        .position(|e| e.id == original.id)
        .ok_or_else(|| ReconcileError::NotFound {
            day_id: original.id.clone(),
        })?;

    let mut restored = entries.to_vec();
    let target = &mut restored[position];
    target.status = original.status;
    target.rejection_reason.clone_from(&original.rejection_reason);
    debug!("Reverted entry {} to {}", target.id, target.status);
    Ok(restored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::week_aggregation::aggregate;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn entries() -> Vec<DayEntry> {
        let date = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        vec![
            DayEntry::new("41", "1", "5", date("2025-04-07")).hours(dec!(8)),
            DayEntry::new("42", "1", "5", date("2025-04-08")).hours(dec!(8)),
            DayEntry::new("43", "1", "5", date("2025-04-09"))
                .hours(dec!(8))
                .status(TimesheetStatus::Approved),
        ]
    }

    #[test]
    fn rejecting_one_entry_changes_only_that_entry() {
        let before = entries();
        let after =
            apply_status_change(&before, "42", TimesheetStatus::Rejected, Some("late submission"))
                .unwrap();

        assert_eq!(after.len(), before.len());
        assert_eq!(after[0], before[0]);
        assert_eq!(after[2], before[2]);
        assert_eq!(after[1].status, TimesheetStatus::Rejected);
        assert_eq!(after[1].rejection_reason.as_deref(), Some("late submission"));

        let mut expected = before[1].clone();
        expected.status = TimesheetStatus::Rejected;
        expected.rejection_reason = Some("late submission".to_string());
        assert_eq!(after[1], expected);

        // The snapshot the caller holds is untouched
        assert_eq!(before, entries());
    }

    #[test]
    fn unknown_id_is_not_found() {
        let before = entries();
        let result = apply_status_change(&before, "999", TimesheetStatus::Approved, None);
        assert_eq!(
            result,
            Err(ReconcileError::NotFound { day_id: "999".to_string() })
        );
        assert_eq!(before, entries());
    }

    #[test]
    fn reject_without_reason_fails() {
        let result = apply_status_change(&entries(), "42", TimesheetStatus::Rejected, Some("   "));
        assert_eq!(
            result,
            Err(ReconcileError::ReasonRequired { day_id: "42".to_string() })
        );
    }

    #[test]
    fn approving_clears_a_previous_rejection_reason() {
        let rejected =
            apply_status_change(&entries(), "42", TimesheetStatus::Rejected, Some("wrong project"))
                .unwrap();
        let approved =
            apply_status_change(&rejected, "42", TimesheetStatus::Approved, Some("ignored")).unwrap();
        assert_eq!(approved[1].status, TimesheetStatus::Approved);
        assert_eq!(approved[1].rejection_reason, None);
    }

    #[test]
    fn week_status_follows_reconciled_entries() {
        let start = entries();
        assert_eq!(aggregate(&start)[0].overall_status, TimesheetStatus::Pending);

        let step = apply_status_change(&start, "41", TimesheetStatus::Approved, None).unwrap();
        let step = apply_status_change(&step, "42", TimesheetStatus::Approved, None).unwrap();
        assert_eq!(aggregate(&step)[0].overall_status, TimesheetStatus::Approved);

        let step = apply_status_change(&step, "43", TimesheetStatus::Rejected, Some("typo")).unwrap();
        assert_eq!(aggregate(&step)[0].overall_status, TimesheetStatus::Rejected);
    }

    #[test]
    fn patches_on_different_entries_commute() {
        let base = entries();
        let ab = apply_status_change(&base, "41", TimesheetStatus::Approved, None)
            .and_then(|e| apply_status_change(&e, "42", TimesheetStatus::Rejected, Some("x")))
            .unwrap();
        let ba = apply_status_change(&base, "42", TimesheetStatus::Rejected, Some("x"))
            .and_then(|e| apply_status_change(&e, "41", TimesheetStatus::Approved, None))
            .unwrap();
        assert_eq!(ab, ba);
    }

    #[test]
    fn revert_restores_the_original_entry() {
        let before = entries();
        let original = before[1].clone();
        let patched =
            apply_status_change(&before, "42", TimesheetStatus::Rejected, Some("oops")).unwrap();
        let reverted = revert_status_change(&patched, &original).unwrap();
        assert_eq!(reverted, before);
    }

    #[test]
    fn revert_of_missing_entry_is_not_found() {
        let mut ghost = entries()[0].clone();
        ghost.id = "nope".to_string();
        assert_eq!(
            revert_status_change(&entries(), &ghost),
            Err(ReconcileError::NotFound { day_id: "nope".to_string() })
        );
    }
}
