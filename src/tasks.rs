// src/tasks.rs
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::{debug, warn};

use crate::error::EngineError;
use crate::names::NameNormalizer;

const COR_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Month names as they appear in report labels ("marzo-2025").
const MONTH_NAMES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// The (year, month) grouping unit used across the whole report.
/// Orders chronologically (year first), unlike its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Display label, e.g. "marzo-2025".
    pub fn label(&self) -> String {
        format!("{}-{}", MONTH_NAMES[self.month as usize - 1], self.year)
    }

    /// Parses a "marzo-2025" style label back into a key.
    pub fn from_label(label: &str) -> Result<Self, EngineError> {
        let (name, year_str) = label
            .split_once('-')
            .ok_or_else(|| EngineError::BadMonthLabel(label.to_string()))?;
        let month = MONTH_NAMES
            .iter()
            .position(|m| *m == name)
            .map(|idx| idx as u32 + 1)
            .ok_or_else(|| EngineError::BadMonthLabel(label.to_string()))?;
        let year = year_str
            .parse::<i32>()
            .map_err(|_| EngineError::BadMonthLabel(label.to_string()))?;
        Ok(Self { year, month })
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// Serialized as the display label so the report JSON keys read as
// "marzo-2025" like the dashboard expects.
impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LabelVisitor;

        impl Visitor<'_> for LabelVisitor {
            type Value = MonthKey;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a month label like \"marzo-2025\"")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<MonthKey, E> {
                MonthKey::from_label(value).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_str(LabelVisitor)
    }
}

/// Task collaborator as COR returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collaborator {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl Collaborator {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// One unit of work from COR: actual hours charged, estimated minutes,
/// and the people who worked on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTask {
    /// "YYYY-MM-DD HH:MM:SS"; tasks without a timestamp cannot be
    /// bucketed into a month and are skipped.
    #[serde(default)]
    pub datetime: Option<String>,
    #[serde(default)]
    pub hour_charged: f64,
    /// Estimated effort in minutes.
    #[serde(default)]
    pub estimated: f64,
    #[serde(default)]
    pub collaborators: Vec<Collaborator>,
}

/// Accumulated equal-split task shares for one employee-month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TaskTotals {
    pub charged_hours: f64,
    pub estimated_hours: f64,
}

/// Splits each task's hours evenly across its collaborators and sums
/// them per employee-month. Equal split is a deliberate approximation:
/// COR records no per-collaborator effort fractions.
pub struct TaskAggregator<'a> {
    normalizer: &'a NameNormalizer,
}

impl<'a> TaskAggregator<'a> {
    pub fn new(normalizer: &'a NameNormalizer) -> Self {
        Self { normalizer }
    }

    /// Order-independent accumulation: any permutation of `tasks` yields
    /// identical totals.
    pub fn aggregate(
        &self,
        tasks: &[RawTask],
    ) -> BTreeMap<MonthKey, HashMap<String, TaskTotals>> {
        let mut totals: BTreeMap<MonthKey, HashMap<String, TaskTotals>> = BTreeMap::new();

        for task in tasks {
            let Some(dt_str) = task.datetime.as_deref() else {
                debug!("Skipping task without timestamp");
                continue;
            };
            let timestamp = match NaiveDateTime::parse_from_str(dt_str, COR_TIMESTAMP_FORMAT) {
                Ok(timestamp) => timestamp,
                Err(e) => {
                    warn!("Skipping task with unparseable timestamp '{}': {}", dt_str, e);
                    continue;
                }
            };
            if task.collaborators.is_empty() {
                continue;
            }

            let key = MonthKey::from_date(timestamp.date());
            let split = task.collaborators.len() as f64;
            let charged_share = task.hour_charged / split;
            let estimated_share = task.estimated / 60.0 / split;

            let month_totals = totals.entry(key).or_default();
            for collaborator in &task.collaborators {
                let name = self.normalizer.normalize(&collaborator.display_name());
                if name.is_empty() {
                    warn!("Skipping nameless collaborator on task dated {}", dt_str);
                    continue;
                }
                let entry = month_totals.entry(name).or_default();
                entry.charged_hours += charged_share;
                entry.estimated_hours += estimated_share;
            }
        }

        totals
    }
}
