// src/csv_export.rs
use std::io::Write;
use thiserror::Error;

use crate::week_aggregation::WeekBucket;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV write failed")]
    Csv(#[from] csv::Error),
    #[error("Failed to flush CSV output")]
    Io(#[from] std::io::Error),
}

const HEADER: [&str; 9] = [
    "employee_id",
    "employee_name",
    "project_id",
    "project_name",
    "week_start",
    "week_end",
    "days",
    "total_hours",
    "status",
];

/// One row per week bucket, in the order given.
pub fn write_weeks_csv<W: Write>(writer: W, buckets: &[WeekBucket]) -> Result<usize, ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)?;

    for bucket in buckets {
        let week_start = bucket.week_start.to_string();
        let week_end = bucket.week_end.to_string();
        let days = bucket.days.len().to_string();
        let total_hours = bucket.total_hours.normalize().to_string();
        wtr.write_record([
            bucket.employee_id.as_str(),
            bucket.employee_name.as_deref().unwrap_or(""),
            bucket.project_id.as_str(),
            bucket.project_name.as_deref().unwrap_or(""),
            week_start.as_str(),
            week_end.as_str(),
            days.as_str(),
            total_hours.as_str(),
            bucket.overall_status.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(buckets.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timesheet_entry::{DayEntry, TimesheetStatus};
    use crate::week_aggregation::aggregate;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn writes_header_and_one_row_per_bucket() {
        let d = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        let entries = vec![
            DayEntry::new("1", "1", "5", d("2025-04-07"))
                .hours(dec!(8.0))
                .employee_name("Alva")
                .project_name("Apollo, phase 2"),
            DayEntry::new("2", "1", "5", d("2025-04-08")).hours(dec!(7.5)),
            DayEntry::new("3", "2", "5", d("2025-04-15"))
                .hours(dec!(4))
                .status(TimesheetStatus::Approved),
        ];

        let mut out = Vec::new();
        let rows = write_weeks_csv(&mut out, &aggregate(&entries)).unwrap();
        assert_eq!(rows, 2);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "employee_id,employee_name,project_id,project_name,week_start,week_end,days,total_hours,status",
                "1,Alva,5,\"Apollo, phase 2\",2025-04-07,2025-04-13,2,15.5,PENDING",
                "2,,5,,2025-04-14,2025-04-20,1,4,APPROVED",
            ]
        );
    }

    #[test]
    fn empty_input_writes_only_the_header() {
        let mut out = Vec::new();
        assert_eq!(write_weeks_csv(&mut out, &[]).unwrap(), 0);
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
    }
}
