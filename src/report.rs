// src/report.rs
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

use crate::absence::{AbsenceClassifier, RawLeave};
use crate::calendar::CalendarService;
use crate::capacity::{hours_per_day, CapacityCalculator};
use crate::config::EngineConfig;
use crate::names::NameNormalizer;
use crate::tasks::{MonthKey, RawTask, TaskAggregator};

/// Calendar facts for one report month, as shown in the dashboard
/// header cards.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MonthContext {
    pub working_days: u32,
    pub working_holidays: u32,
    pub net_business_days: u32,
    pub hours_per_day: f64,
}

/// The aggregate output entity for one (employee, month) pair.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EmployeeMonthRecord {
    pub charged_hours: f64,
    pub estimated_hours: f64,
    pub vacation_days: f64,
    pub other_absence_days: f64,
    pub remote_credit_days: f64,
    /// Net capacity after absences and buffer.
    pub available_hours: f64,
    /// Estimated vs available, capped at 100.
    pub load_pct: f64,
    /// Available hours not yet claimed by estimates.
    pub remaining_hours: f64,
}

/// Month totals over productive employees only.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct MonthSummary {
    pub available_hours: f64,
    pub estimated_hours: f64,
    pub charged_hours: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthReport {
    pub context: MonthContext,
    pub summary: MonthSummary,
    pub employees: BTreeMap<String, EmployeeMonthRecord>,
}

/// Snapshot produced by one refresh cycle. Built once, then read-only;
/// the next refresh replaces it wholesale.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub months: BTreeMap<MonthKey, MonthReport>,
}

impl Report {
    /// True when the refresh saw no usable task data at all. Callers
    /// should surface "no data" rather than an empty table.
    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }
}

/// Composes the pipeline: aggregate tasks, classify absences against
/// one shared leave snapshot, compute available hours, and merge into
/// the per-month, per-employee record set.
pub struct ReportBuilder {
    config: EngineConfig,
    calendar: CalendarService,
    normalizer: NameNormalizer,
    non_productive: HashSet<String>,
}

impl ReportBuilder {
    pub fn new(config: EngineConfig) -> Self {
        let calendar = CalendarService::new(config.region);
        let normalizer = NameNormalizer::new(config.name_aliases.clone());
        // The denylist goes through the same normalizer as task and
        // leave names, so config entries with stray casing still match.
        let non_productive = config
            .non_productive_employees
            .iter()
            .map(|name| normalizer.normalize(name))
            .collect();
        Self {
            config,
            calendar,
            normalizer,
            non_productive,
        }
    }

    /// Runs one refresh over already-fetched snapshots. Per-record
    /// problems degrade to zero-valued results inside the components;
    /// nothing here aborts the rest of the build.
    pub fn build(&self, tasks: &[RawTask], leaves: &[RawLeave]) -> Report {
        let aggregator = TaskAggregator::new(&self.normalizer);
        let classifier = AbsenceClassifier::new(&self.config, &self.calendar, &self.normalizer);
        let capacity = CapacityCalculator::new(&self.config, &self.calendar);

        let task_totals = aggregator.aggregate(tasks);
        info!(
            "Building report for {} months from {} tasks and {} leaves",
            task_totals.len(),
            tasks.len(),
            leaves.len()
        );

        let mut months = BTreeMap::new();
        for (key, per_employee) in task_totals {
            let (working_days, working_holidays) =
                self.calendar.working_days_and_holidays(key.year, key.month);
            let context = MonthContext {
                working_days,
                working_holidays,
                net_business_days: working_days - working_holidays,
                hours_per_day: hours_per_day(key.month),
            };

            let mut summary = MonthSummary::default();
            let mut employees = BTreeMap::new();

            for (name, totals) in per_employee {
                // Equal-split already happened in the aggregator, so
                // dropping a denylisted employee here leaves their
                // co-workers' shares intact.
                if self.non_productive.contains(&name) {
                    debug!("Excluding non-productive employee {} from {}", name, key);
                    continue;
                }

                let absences = classifier.classify(&name, key.year, key.month, leaves);
                let available_hours = capacity.available_hours(
                    key.year,
                    key.month,
                    absences.vacation_days,
                    absences.other_absence_days,
                );

                let load_pct = if available_hours > 0.0 {
                    (totals.estimated_hours / available_hours * 100.0).min(100.0)
                } else {
                    0.0
                };

                summary.available_hours += available_hours;
                summary.estimated_hours += totals.estimated_hours;
                summary.charged_hours += totals.charged_hours;

                employees.insert(
                    name,
                    EmployeeMonthRecord {
                        charged_hours: totals.charged_hours,
                        estimated_hours: totals.estimated_hours,
                        vacation_days: absences.vacation_days,
                        other_absence_days: absences.other_absence_days,
                        remote_credit_days: absences.remote_credit_days,
                        available_hours,
                        load_pct,
                        remaining_hours: available_hours - totals.estimated_hours,
                    },
                );
            }

            months.insert(
                key,
                MonthReport {
                    context,
                    summary,
                    employees,
                },
            );
        }

        Report { months }
    }
}
