// src/config.rs
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use crate::capacity::BufferPolicy;
use crate::error::EngineError;

// Holiday region for the calendar service. Only Catalonia is wired up
// today; the enum exists so other regions can be added without touching
// the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    #[default]
    Catalonia,
}

/// Immutable engine configuration, passed into each component at
/// construction. `Default` carries the reference organization's values;
/// a JSON config file can override any subset of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Factorial leave type representing vacation.
    pub vacation_leave_type_id: i64,
    /// Factorial leave types that do NOT deduct available hours
    /// (remote-work credit days).
    pub remote_credit_leave_type_ids: HashSet<i64>,
    /// Canonical names excluded from totals and the detail table.
    pub non_productive_employees: HashSet<String>,
    /// Raw-name -> canonical-name alias table.
    pub name_aliases: HashMap<String, String>,
    /// Fraction of net capacity reserved for unplanned work.
    pub buffer_fraction: f64,
    pub buffer_policy: BufferPolicy,
    pub region: Region,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let name_aliases: HashMap<String, String> = [
            ("albert sunyer", "albert sunyer vilafranca"),
            ("david collado", "david collado preciado"),
            ("esther janer", "esther janer roig"),
            ("vanessa dueñas", "vanessa dueñas moga"),
            ("ariadna de angulo", "ariadna de angulo villa"),
            ("norma vila", "norma vila muñoz"),
            ("mar esteva", "mar esteva fabrega"),
            ("mar esteva fàbrega", "mar esteva fabrega"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let non_productive_employees: HashSet<String> =
            ["celia henriquez", "andrea martínez"]
                .into_iter()
                .map(String::from)
                .collect();

        Self {
            vacation_leave_type_id: 2_276_680,
            remote_credit_leave_type_ids: HashSet::from([2_280_065]),
            non_productive_employees,
            name_aliases,
            buffer_fraction: 0.10,
            buffer_policy: BufferPolicy::default(),
            region: Region::default(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from a JSON file. Fields missing from the
    /// file fall back to the defaults above.
    pub fn from_file(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path).map_err(|source| EngineError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self =
            serde_json::from_str(&contents).map_err(|source| EngineError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if !(0.0..1.0).contains(&self.buffer_fraction) {
            return Err(EngineError::Config(format!(
                "buffer_fraction must be in [0, 1), got {}",
                self.buffer_fraction
            )));
        }
        if self
            .remote_credit_leave_type_ids
            .contains(&self.vacation_leave_type_id)
        {
            return Err(EngineError::Config(format!(
                "leave type {} cannot be both vacation and remote credit",
                self.vacation_leave_type_id
            )));
        }
        Ok(())
    }
}
