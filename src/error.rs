// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

// Error type for the capacity engine. Per-record problems (bad
// timestamps, inverted leave ranges) are not represented here: those
// are recovered locally with a zero-valued result and a log line.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read configuration file {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse configuration file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Unrecognized month label: {0}")]
    BadMonthLabel(String),
}
