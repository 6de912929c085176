// src/absence.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::calendar::{month_bounds, CalendarService};
use crate::config::EngineConfig;
use crate::names::NameNormalizer;

const FACTORIAL_DATE_FORMAT: &str = "%Y-%m-%d";

/// One absence record as Factorial returns it. Dates stay as raw
/// strings so one malformed record cannot reject the whole snapshot;
/// they are parsed leniently at classification time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawLeave {
    pub employee_full_name: String,
    /// ISO date, "YYYY-MM-DD".
    pub start_on: String,
    /// Inclusive end date, same format.
    pub finish_on: String,
    pub leave_type_id: i64,
}

/// Working-day counts for one employee-month, split by leave category.
/// Counts can be fractional once partial-day leaves exist upstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AbsenceBreakdown {
    pub vacation_days: f64,
    pub other_absence_days: f64,
    /// Remote-work credit: recorded but never deducts available hours.
    pub remote_credit_days: f64,
}

/// Classifies a leave snapshot into per-employee-month working-day
/// counts. The snapshot is fetched once per refresh cycle by the caller
/// and the same slice is passed to every invocation.
pub struct AbsenceClassifier<'a> {
    calendar: &'a CalendarService,
    normalizer: &'a NameNormalizer,
    vacation_type_id: i64,
    remote_credit_type_ids: &'a HashSet<i64>,
}

impl<'a> AbsenceClassifier<'a> {
    pub fn new(
        config: &'a EngineConfig,
        calendar: &'a CalendarService,
        normalizer: &'a NameNormalizer,
    ) -> Self {
        Self {
            calendar,
            normalizer,
            vacation_type_id: config.vacation_leave_type_id,
            remote_credit_type_ids: &config.remote_credit_leave_type_ids,
        }
    }

    /// Counts the working days of each matching leave that fall inside
    /// the target month. Leaves spanning several months contribute only
    /// the days within `[year, month]`, so a leave is apportioned
    /// exactly once across the months it covers.
    pub fn classify(
        &self,
        employee_canonical: &str,
        year: i32,
        month: u32,
        leaves: &[RawLeave],
    ) -> AbsenceBreakdown {
        let mut breakdown = AbsenceBreakdown::default();
        let (month_start, month_end) = month_bounds(year, month);

        for leave in leaves {
            if self.normalizer.normalize(&leave.employee_full_name) != employee_canonical {
                continue;
            }
            let Some((start_on, finish_on)) = parse_leave_dates(leave) else {
                continue;
            };
            if start_on > finish_on {
                warn!(
                    "Skipping leave with inverted range {}..{} for {}",
                    start_on, finish_on, leave.employee_full_name
                );
                continue;
            }
            if finish_on < month_start || start_on > month_end {
                continue;
            }

            // Intersect the leave with the month before counting.
            let from = start_on.max(month_start);
            let to = finish_on.min(month_end);
            let days = self.calendar.business_days_in_range(from, to).len() as f64;
            if days == 0.0 {
                continue;
            }

            if self.remote_credit_type_ids.contains(&leave.leave_type_id) {
                breakdown.remote_credit_days += days;
            } else if leave.leave_type_id == self.vacation_type_id {
                breakdown.vacation_days += days;
            } else {
                // Unknown types count against capacity like any other
                // paid/unpaid absence.
                debug!(
                    "Leave type {} not in configured buckets; counting as other absence",
                    leave.leave_type_id
                );
                breakdown.other_absence_days += days;
            }
        }

        breakdown
    }
}

/// Parses both leave dates, warning and yielding `None` on a malformed
/// record so the rest of the snapshot keeps processing.
fn parse_leave_dates(leave: &RawLeave) -> Option<(NaiveDate, NaiveDate)> {
    let start_on = parse_leave_date(&leave.start_on, "start_on", &leave.employee_full_name)?;
    let finish_on = parse_leave_date(&leave.finish_on, "finish_on", &leave.employee_full_name)?;
    Some((start_on, finish_on))
}

fn parse_leave_date(raw: &str, field: &str, employee: &str) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(raw, FACTORIAL_DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(e) => {
            warn!(
                "Skipping leave with unparseable {} '{}' for {}: {}",
                field, raw, employee, e
            );
            None
        }
    }
}
