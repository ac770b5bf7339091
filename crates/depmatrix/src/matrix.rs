//! The dependency matrix: activity × activity → relation cell.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::notation::{Cell, Relation};
use crate::types::{DependencyError, DependencyResult};

/// Square mapping from ordered activity pairs to relations.
///
/// Both halves of a pair are always stored together (`(b, a)` holds the
/// inverse of `(a, b)`), self pairs are never stored, and every key names a
/// member of the activity list. Published matrices are never mutated; edit
/// operations clone and return a new instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    into = "crate::storage::MatrixDocument",
    try_from = "crate::storage::MatrixDocument"
)]
pub struct DependencyMatrix {
    activities: Vec<String>,
    cells: BTreeMap<String, BTreeMap<String, Relation>>,
}

impl DependencyMatrix {
    /// Create a matrix over the given activities with no cells.
    pub fn new(activities: Vec<String>) -> DependencyResult<Self> {
        let mut seen = HashSet::new();
        for activity in &activities {
            check_name(activity)?;
            if !seen.insert(activity.as_str()) {
                return Err(DependencyError::InvalidParams(format!(
                    "Duplicate activity: {activity}"
                )));
            }
        }
        Ok(Self {
            activities,
            cells: BTreeMap::new(),
        })
    }

    /// Create a matrix where every pair is computed and independent.
    pub fn independent(activities: Vec<String>) -> DependencyResult<Self> {
        let mut matrix = Self::new(activities)?;
        let names = matrix.activities.clone();
        for (i, a) in names.iter().enumerate() {
            for b in &names[i + 1..] {
                matrix.insert_pair(a, b, Relation::INDEPENDENT);
            }
        }
        Ok(matrix)
    }

    pub fn activities(&self) -> &[String] {
        &self.activities
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    pub fn contains(&self, activity: &str) -> bool {
        self.activities.iter().any(|a| a == activity)
    }

    pub fn position(&self, activity: &str) -> Option<usize> {
        self.activities.iter().position(|a| a == activity)
    }

    /// Fail with `UnknownActivity` unless the activity is present.
    pub fn require(&self, activity: &str) -> DependencyResult<()> {
        if self.contains(activity) {
            Ok(())
        } else {
            Err(DependencyError::UnknownActivity(activity.to_string()))
        }
    }

    /// Look up a cell. Never fails: unknown pairs and the diagonal are absent.
    pub fn get(&self, from: &str, to: &str) -> Cell {
        match self.cells.get(from).and_then(|row| row.get(to)) {
            Some(relation) => Cell::Present(*relation),
            None => Cell::Absent,
        }
    }

    /// Look up a relation, treating absence as independence.
    pub fn relation(&self, from: &str, to: &str) -> Relation {
        self.get(from, to).relation().unwrap_or_default()
    }

    /// Write `(from, to)` and its inverse half.
    pub fn set(&mut self, from: &str, to: &str, relation: Relation) -> DependencyResult<()> {
        self.check_pair(from, to)?;
        self.insert_pair(from, to, relation);
        Ok(())
    }

    /// Remove both halves of a pair, making it absent.
    pub fn clear(&mut self, from: &str, to: &str) -> DependencyResult<()> {
        self.check_pair(from, to)?;
        self.remove_half(from, to);
        self.remove_half(to, from);
        Ok(())
    }

    /// A copy with `added` appended; its pairs with every other activity are
    /// computed as independent.
    pub fn with_activity(&self, added: &str) -> DependencyResult<Self> {
        self.with_activity_at(added, self.activities.len())
    }

    /// Like [`with_activity`](Self::with_activity) but inserted at `index`.
    pub fn with_activity_at(&self, added: &str, index: usize) -> DependencyResult<Self> {
        check_name(added)?;
        if self.contains(added) {
            return Err(DependencyError::InvalidParams(format!(
                "The activity '{added}' is already present in the matrix"
            )));
        }
        let mut next = self.clone();
        next.activities
            .insert(index.min(next.activities.len()), added.to_string());
        for other in &self.activities {
            next.insert_pair(added, other, Relation::INDEPENDENT);
        }
        Ok(next)
    }

    /// A copy without `removed` and without any of its row/column entries.
    pub fn without_activity(&self, removed: &str) -> DependencyResult<Self> {
        self.require(removed)?;
        let mut next = self.clone();
        next.activities.retain(|a| a != removed);
        next.cells.remove(removed);
        for row in next.cells.values_mut() {
            row.remove(removed);
        }
        next.cells.retain(|_, row| !row.is_empty());
        Ok(next)
    }

    /// A copy where `old` is re-keyed to `new` in place.
    pub fn renamed(&self, old: &str, new: &str) -> DependencyResult<Self> {
        self.require(old)?;
        check_name(new)?;
        if old == new {
            return Err(DependencyError::InvalidParams(
                "Old and new activity names are identical".to_string(),
            ));
        }
        if self.contains(new) {
            return Err(DependencyError::InvalidParams(format!(
                "The activity '{new}' is already present in the matrix"
            )));
        }
        let rename = |name: &str| {
            if name == old {
                new.to_string()
            } else {
                name.to_string()
            }
        };
        let activities = self.activities.iter().map(|a| rename(a.as_str())).collect();
        let cells = self
            .cells
            .iter()
            .map(|(from, row)| {
                let row = row.iter().map(|(to, r)| (rename(to.as_str()), *r)).collect();
                (rename(from.as_str()), row)
            })
            .collect();
        Ok(Self { activities, cells })
    }

    /// The same cells with the activities listed in a different order.
    pub fn reordered(&self, order: Vec<String>) -> DependencyResult<Self> {
        let mut expected: Vec<&String> = self.activities.iter().collect();
        let mut given: Vec<&String> = order.iter().collect();
        expected.sort();
        given.sort();
        if expected != given {
            return Err(DependencyError::InvalidParams(
                "New order must list exactly the current activities".to_string(),
            ));
        }
        Ok(Self {
            activities: order,
            cells: self.cells.clone(),
        })
    }

    /// The matrix restricted to `keep`, preserving this matrix's order.
    pub fn sub_matrix(&self, keep: &[String]) -> Self {
        let activities: Vec<String> = self
            .activities
            .iter()
            .filter(|a| keep.contains(*a))
            .cloned()
            .collect();
        let mut sub = Self {
            activities: activities.clone(),
            cells: BTreeMap::new(),
        };
        for (i, a) in activities.iter().enumerate() {
            for b in &activities[i + 1..] {
                if let Cell::Present(relation) = self.get(a, b) {
                    sub.insert_pair(a, b, relation);
                }
            }
        }
        sub
    }

    /// Every stored cell in display order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str, Relation)> + '_ {
        self.activities.iter().flat_map(move |from| {
            self.activities.iter().filter_map(move |to| match self.get(from, to) {
                Cell::Present(relation) => Some((from.as_str(), to.as_str(), relation)),
                Cell::Absent => None,
            })
        })
    }

    /// Number of stored cells (both halves counted).
    pub fn cell_count(&self) -> usize {
        self.cells.values().map(|row| row.len()).sum()
    }

    /// Verify the structural invariants. A failure is a defect in the engine.
    pub fn check_invariants(&self) -> DependencyResult<()> {
        for (from, row) in &self.cells {
            if !self.contains(from) {
                return Err(DependencyError::InternalInconsistency(format!(
                    "row key '{from}' is not an activity"
                )));
            }
            for (to, relation) in row {
                if from == to {
                    return Err(DependencyError::InternalInconsistency(format!(
                        "self pair stored for '{from}'"
                    )));
                }
                if !self.contains(to) {
                    return Err(DependencyError::InternalInconsistency(format!(
                        "column key '{to}' is not an activity"
                    )));
                }
                if self.get(to, from) != Cell::Present(relation.inverse()) {
                    return Err(DependencyError::InternalInconsistency(format!(
                        "pair ({from}, {to}) is not mirrored by ({to}, {from})"
                    )));
                }
            }
        }
        Ok(())
    }

    fn check_pair(&self, from: &str, to: &str) -> DependencyResult<()> {
        self.require(from)?;
        self.require(to)?;
        if from == to {
            return Err(DependencyError::InvalidParams(format!(
                "Self dependency on '{from}' is not allowed"
            )));
        }
        Ok(())
    }

    fn insert_pair(&mut self, from: &str, to: &str, relation: Relation) {
        self.cells
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string(), relation);
        self.cells
            .entry(to.to_string())
            .or_default()
            .insert(from.to_string(), relation.inverse());
    }

    fn remove_half(&mut self, from: &str, to: &str) {
        if let Some(row) = self.cells.get_mut(from) {
            row.remove(to);
            if row.is_empty() {
                self.cells.remove(from);
            }
        }
    }
}

fn check_name(name: &str) -> DependencyResult<()> {
    if name.trim().is_empty() {
        return Err(DependencyError::InvalidParams(
            "Activity names must not be empty".to_string(),
        ));
    }
    Ok(())
}
