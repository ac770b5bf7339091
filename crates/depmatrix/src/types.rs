//! Shared data types: thresholds, locks, suppressed changes, and errors.

use serde::{Deserialize, Serialize};

/// Discovery thresholds, both in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub temporal: f64,
    pub existential: f64,
}

impl Thresholds {
    pub fn new(temporal: f64, existential: f64) -> DependencyResult<Self> {
        for (name, value) in [("temporal", temporal), ("existential", existential)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(DependencyError::InvalidParams(format!(
                    "{name} threshold must be within [0, 1], got {value}"
                )));
            }
        }
        Ok(Self {
            temporal,
            existential,
        })
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            temporal: 1.0,
            existential: 1.0,
        }
    }
}

/// Marks one or both sub-relations of `(from, to)` as immutable for a single
/// edit operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lock {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub temporal: bool,
    #[serde(default)]
    pub existential: bool,
}

impl Lock {
    pub fn new(from: &str, to: &str, temporal: bool, existential: bool) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            temporal,
            existential,
        }
    }

    pub fn touches(&self, activity: &str) -> bool {
        self.from == activity || self.to == activity
    }
}

/// Which half of a relation cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubRelation {
    Temporal,
    Existential,
}

/// A change an operation wanted to make but a lock prevented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuppressedChange {
    pub from: String,
    pub to: String,
    pub part: SubRelation,
    /// Cell value that was kept.
    pub kept: String,
    /// Cell value the operation would have written.
    pub wanted: String,
}

impl std::fmt::Display for SuppressedChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let part = match self.part {
            SubRelation::Temporal => "temporal",
            SubRelation::Existential => "existential",
        };
        write!(
            f,
            "{part} relation {} → {} locked (kept {:?}, wanted {:?})",
            self.from, self.to, self.kept, self.wanted
        )
    }
}

fn describe_suppressed(suppressed: &[SuppressedChange]) -> String {
    suppressed
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors that can occur in the dependency engine.
#[derive(thiserror::Error, Debug)]
pub enum DependencyError {
    #[error("Input error: {0}")]
    InputError(String),

    #[error("No matrix available yet, discover dependencies first")]
    NotReady,

    #[error("Unknown activity: {0}")]
    UnknownActivity(String),

    #[error("Lock conflict: {}", describe_suppressed(.suppressed))]
    LockConflict { suppressed: Vec<SuppressedChange> },

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Internal inconsistency: {0}")]
    InternalInconsistency(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result type.
pub type DependencyResult<T> = Result<T, DependencyError>;
