// src/capacity.rs
use serde::{Deserialize, Serialize};

use crate::calendar::CalendarService;
use crate::config::EngineConfig;

/// How the safety buffer is computed. The legacy pipeline used a flat
/// cut of gross hours; the current one scales the buffer down for
/// employees who are mostly absent that month. Both stay selectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BufferPolicy {
    #[default]
    Proportional,
    Flat,
}

/// Contracted hours per working day. August runs on reduced summer
/// hours; the rest of the year is a standard 8-hour day.
pub fn hours_per_day(month: u32) -> f64 {
    if month == 8 {
        7.0
    } else {
        8.0
    }
}

/// Converts net business days, absence days and the safety buffer into
/// net available hours for one employee-month.
pub struct CapacityCalculator<'a> {
    calendar: &'a CalendarService,
    buffer_fraction: f64,
    buffer_policy: BufferPolicy,
}

impl<'a> CapacityCalculator<'a> {
    pub fn new(config: &EngineConfig, calendar: &'a CalendarService) -> Self {
        Self {
            calendar,
            buffer_fraction: config.buffer_fraction,
            buffer_policy: config.buffer_policy,
        }
    }

    /// Available hours after vacation, other absences and the buffer.
    /// Remote-credit days are not an input: they never deduct hours.
    pub fn available_hours(
        &self,
        year: i32,
        month: u32,
        vacation_days: f64,
        other_absence_days: f64,
    ) -> f64 {
        let net_days = self.calendar.net_business_days(year, month) as f64;
        let per_day = hours_per_day(month);
        let absent_days = vacation_days + other_absence_days;

        let gross_hours = net_days * per_day;
        let absence_hours = absent_days * per_day;
        let net_hours = gross_hours - absence_hours;

        let buffer = match self.buffer_policy {
            BufferPolicy::Flat => gross_hours * self.buffer_fraction,
            BufferPolicy::Proportional => {
                // A month with no business days counts as fully absent.
                let fraction_absent = if net_days > 0.0 {
                    absent_days / net_days
                } else {
                    1.0
                };
                net_hours * self.buffer_fraction * (1.0 - fraction_absent)
            }
        };

        (net_hours - buffer).max(0.0)
    }
}
