//! Edit operation catalog.
//!
//! Every operation takes a source matrix, the locks for this edit, and its
//! own parameters, and returns a new matrix. The source is never modified,
//! and a failing operation publishes nothing.

mod collapse;
mod condition_update;
mod decollapse;
mod delete;
mod insert;
mod modify;
mod move_activity;
mod parallelize;
mod replace;
mod skip;
mod swap;

use serde::{Deserialize, Serialize};

use crate::consistency;
use crate::locks::{Draft, LockPolicy};
use crate::matrix::DependencyMatrix;
use crate::notation::{Adjacency, Existential, Temporal};
use crate::types::{DependencyError, DependencyResult, Lock, SuppressedChange};

pub use collapse::{collapse_relation, CollapsedGroup};

/// Which way a stated relation reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Stated from `from` to `to`.
    #[default]
    Forward,
    /// Stated from `to` to `from`.
    Backward,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalKind {
    Direct,
    Eventual,
    Independence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExistentialKind {
    Implication,
    Equivalence,
    #[serde(rename = "negated equivalence", alias = "negated_equivalence")]
    NegatedEquivalence,
    And,
    Nand,
    Or,
    Independence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalSpec {
    #[serde(rename = "type")]
    pub kind: TemporalKind,
    #[serde(default)]
    pub direction: Direction,
}

impl TemporalSpec {
    /// The relation as seen on the `(from, to)` cell.
    pub fn relation(&self) -> Temporal {
        let adjacency = match self.kind {
            TemporalKind::Independence => return Temporal::Independent,
            TemporalKind::Direct => Adjacency::Direct,
            TemporalKind::Eventual => Adjacency::Eventual,
        };
        match self.direction {
            Direction::Forward | Direction::Both => Temporal::Before(adjacency),
            Direction::Backward => Temporal::After(adjacency),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistentialSpec {
    #[serde(rename = "type")]
    pub kind: ExistentialKind,
    #[serde(default)]
    pub direction: Direction,
}

impl ExistentialSpec {
    /// The relation as seen on the `(from, to)` cell.
    pub fn relation(&self) -> Existential {
        match self.kind {
            ExistentialKind::Implication => match self.direction {
                Direction::Forward | Direction::Both => Existential::Implies,
                Direction::Backward => Existential::ImpliedBy,
            },
            ExistentialKind::Equivalence => Existential::Equivalence,
            ExistentialKind::NegatedEquivalence => Existential::NegatedEquivalence,
            ExistentialKind::And => Existential::And,
            ExistentialKind::Nand => Existential::Nand,
            ExistentialKind::Or => Existential::Or,
            ExistentialKind::Independence => Existential::Independent,
        }
    }
}

/// A dependency to install between two activities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencySpec {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub temporal: Option<TemporalSpec>,
    #[serde(default)]
    pub existential: Option<ExistentialSpec>,
}

fn default_true() -> bool {
    true
}

/// A fully parsed edit request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum Operation {
    Delete {
        activity: String,
        #[serde(default = "default_true")]
        preserve_incoming: bool,
        #[serde(default = "default_true")]
        preserve_outgoing: bool,
    },
    Insert {
        activity: String,
        #[serde(default)]
        dependencies: Vec<DependencySpec>,
    },
    Replace {
        old_activity: String,
        new_activity: String,
    },
    Skip {
        activity: String,
    },
    Swap {
        activity1: String,
        activity2: String,
    },
    Modify {
        from_activity: String,
        to_activity: String,
        #[serde(default)]
        temporal: Option<TemporalSpec>,
        #[serde(default)]
        existential: Option<ExistentialSpec>,
    },
    Move {
        activity: String,
        #[serde(default)]
        dependencies: Vec<DependencySpec>,
    },
    Collapse {
        collapsed_activity: String,
        collapse_activities: Vec<String>,
    },
    #[serde(rename = "de-collapse", alias = "decollapse", alias = "de_collapse")]
    Decollapse {
        collapsed_activity: String,
        #[serde(default)]
        group: Option<CollapsedGroup>,
    },
    Parallelize {
        parallel_activities: Vec<String>,
    },
    ConditionUpdate {
        condition_activity: String,
        depending_activity: String,
        #[serde(default)]
        clear: bool,
    },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Delete { .. } => "delete",
            Operation::Insert { .. } => "insert",
            Operation::Replace { .. } => "replace",
            Operation::Skip { .. } => "skip",
            Operation::Swap { .. } => "swap",
            Operation::Modify { .. } => "modify",
            Operation::Move { .. } => "move",
            Operation::Collapse { .. } => "collapse",
            Operation::Decollapse { .. } => "de-collapse",
            Operation::Parallelize { .. } => "parallelize",
            Operation::ConditionUpdate { .. } => "condition_update",
        }
    }

    /// Every operation name accepted by [`apply_operation`].
    pub fn names() -> [&'static str; 11] {
        [
            "delete",
            "insert",
            "replace",
            "skip",
            "swap",
            "modify",
            "move",
            "collapse",
            "de-collapse",
            "parallelize",
            "condition_update",
        ]
    }
}

/// Result of a successful edit.
#[derive(Debug, Clone)]
pub struct EditOutcome {
    pub matrix: DependencyMatrix,
    /// Changes a lock prevented. The rest of the operation was applied.
    pub suppressed: Vec<SuppressedChange>,
    /// Set by `collapse`: what `de-collapse` needs to undo it.
    pub collapsed: Option<CollapsedGroup>,
}

impl EditOutcome {
    fn from_draft(draft: Draft<'_>) -> DependencyResult<Self> {
        let (matrix, suppressed) = draft.finish()?;
        Ok(Self {
            matrix,
            suppressed,
            collapsed: None,
        })
    }
}

/// Parse `params` as operation `name` and apply it.
pub fn apply_operation(
    name: &str,
    source: &DependencyMatrix,
    locks: &[Lock],
    params: serde_json::Value,
) -> DependencyResult<EditOutcome> {
    let mut fields = match params {
        serde_json::Value::Object(map) => map,
        serde_json::Value::Null => serde_json::Map::new(),
        other => {
            return Err(DependencyError::InvalidParams(format!(
                "Parameters for '{name}' must be an object, got {other}"
            )))
        }
    };
    fields.insert(
        "operation".to_string(),
        serde_json::Value::String(name.to_string()),
    );
    let operation: Operation = serde_json::from_value(serde_json::Value::Object(fields))
        .map_err(|e| DependencyError::InvalidParams(format!("Invalid '{name}' request: {e}")))?;
    apply(&operation, source, locks)
}

/// Apply an already parsed operation.
pub fn apply(
    operation: &Operation,
    source: &DependencyMatrix,
    locks: &[Lock],
) -> DependencyResult<EditOutcome> {
    let policy = LockPolicy::new(locks, source)?;
    let outcome = match operation {
        Operation::Delete {
            activity,
            preserve_incoming,
            preserve_outgoing,
        } => delete::apply(
            source,
            &policy,
            activity,
            *preserve_incoming && *preserve_outgoing,
        ),
        Operation::Insert {
            activity,
            dependencies,
        } => insert::apply(source, &policy, activity, dependencies),
        Operation::Replace {
            old_activity,
            new_activity,
        } => replace::apply(source, &policy, old_activity, new_activity),
        Operation::Skip { activity } => skip::apply(source, &policy, activity),
        Operation::Swap {
            activity1,
            activity2,
        } => swap::apply(source, &policy, activity1, activity2),
        Operation::Modify {
            from_activity,
            to_activity,
            temporal,
            existential,
        } => modify::apply(
            source,
            &policy,
            from_activity,
            to_activity,
            temporal.as_ref(),
            existential.as_ref(),
        ),
        Operation::Move {
            activity,
            dependencies,
        } => move_activity::apply(source, &policy, activity, dependencies),
        Operation::Collapse {
            collapsed_activity,
            collapse_activities,
        } => collapse::apply(source, &policy, collapsed_activity, collapse_activities),
        Operation::Decollapse {
            collapsed_activity,
            group,
        } => {
            let group = group.as_ref().ok_or_else(|| {
                DependencyError::InvalidParams(format!(
                    "No collapsed group recorded for '{collapsed_activity}'"
                ))
            })?;
            decollapse::apply(source, &policy, collapsed_activity, group)
        }
        Operation::Parallelize {
            parallel_activities,
        } => parallelize::apply(source, &policy, parallel_activities),
        Operation::ConditionUpdate {
            condition_activity,
            depending_activity,
            clear,
        } => condition_update::apply(source, &policy, condition_activity, depending_activity, *clear),
    };

    match &outcome {
        Ok(result) => tracing::info!(
            operation = operation.name(),
            activities = result.matrix.len(),
            suppressed = result.suppressed.len(),
            "Applied edit operation"
        ),
        Err(e) => tracing::debug!(operation = operation.name(), error = %e, "Edit operation failed"),
    }
    outcome
}

/// Check that every spec names two distinct known activities, one of them
/// `activity`.
fn validate_specs(
    matrix: &DependencyMatrix,
    activity: &str,
    specs: &[DependencySpec],
) -> DependencyResult<()> {
    for spec in specs {
        matrix.require(&spec.from)?;
        matrix.require(&spec.to)?;
        if spec.from == spec.to {
            return Err(DependencyError::InvalidParams(format!(
                "Dependency from '{}' to itself",
                spec.from
            )));
        }
        if spec.from != activity && spec.to != activity {
            return Err(DependencyError::InvalidParams(format!(
                "Dependency ({}, {}) does not involve '{activity}'",
                spec.from, spec.to
            )));
        }
    }
    Ok(())
}

fn install_specs(draft: &mut Draft<'_>, specs: &[DependencySpec]) -> DependencyResult<()> {
    for spec in specs {
        if let Some(temporal) = &spec.temporal {
            draft.write_temporal(&spec.from, &spec.to, temporal.relation())?;
        }
        if let Some(existential) = &spec.existential {
            draft.write_existential(&spec.from, &spec.to, existential.relation())?;
        }
    }
    Ok(())
}

/// Reject a result whose new dependencies on `activity` contradict each
/// other or the rest of the matrix.
fn check_placement(
    before: &DependencyMatrix,
    after: &DependencyMatrix,
    activity: &str,
) -> DependencyResult<()> {
    if let Some(cycle) = consistency::temporal_cycle_through(after, activity) {
        return Err(DependencyError::InvalidParams(format!(
            "Temporal dependencies cause a contradiction: {}",
            cycle.join(" ≺ ")
        )));
    }
    if let Some((a, b)) = consistency::direct_neighbour_conflict(after, activity) {
        return Err(DependencyError::InvalidParams(format!(
            "Temporal dependencies cause a contradiction: '{a}' and '{b}' both directly neighbour '{activity}'"
        )));
    }
    if !consistency::existential_satisfiable(after) && consistency::existential_satisfiable(before) {
        return Err(DependencyError::InvalidParams(
            "Existential dependencies cause a contradiction".to_string(),
        ));
    }
    Ok(())
}

/// Activities `p` with `p ≺d activity`, and `s` with `activity ≺d s`.
fn direct_neighbours(matrix: &DependencyMatrix, activity: &str) -> (Vec<String>, Vec<String>) {
    let mut predecessors = Vec::new();
    let mut successors = Vec::new();
    for other in matrix.activities() {
        match matrix.relation(activity, other).temporal {
            Temporal::After(Adjacency::Direct) => predecessors.push(other.clone()),
            Temporal::Before(Adjacency::Direct) => successors.push(other.clone()),
            _ => {}
        }
    }
    (predecessors, successors)
}

/// Distinct activity names, at least `min` of them, all present.
fn require_group(matrix: &DependencyMatrix, names: &[String], min: usize) -> DependencyResult<()> {
    if names.len() < min {
        return Err(DependencyError::InvalidParams(format!(
            "At least {min} activities are required, got {}",
            names.len()
        )));
    }
    for (i, name) in names.iter().enumerate() {
        matrix.require(name)?;
        if names[..i].contains(name) {
            return Err(DependencyError::InvalidParams(format!(
                "Activity '{name}' listed twice"
            )));
        }
    }
    Ok(())
}
