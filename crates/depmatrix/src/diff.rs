//! Change detection between two versions of a dependency matrix.

use serde::{Deserialize, Serialize};

use crate::matrix::DependencyMatrix;
use crate::notation::Cell;

/// One cell that differs between the two matrices. `before`/`after` hold
/// the encoded cell, empty when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellChange {
    pub from: String,
    pub to: String,
    pub before: String,
    pub after: String,
}

/// Everything that changed from one matrix to another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffReport {
    pub added_activities: Vec<String>,
    pub removed_activities: Vec<String>,
    pub added_cells: Vec<CellChange>,
    pub removed_cells: Vec<CellChange>,
    pub modified_cells: Vec<CellChange>,
}

impl DiffReport {
    pub fn is_empty(&self) -> bool {
        self.change_count() == 0
    }

    pub fn change_count(&self) -> usize {
        self.added_activities.len()
            + self.removed_activities.len()
            + self.added_cells.len()
            + self.removed_cells.len()
            + self.modified_cells.len()
    }
}

/// Compare `before` with `after`.
///
/// A cell counts as a constraint when it is present and not independent.
/// Changes between independence and absence are not reported. A change
/// that swaps one kind of constraint for another (temporal only to
/// existential only) is reported as a removal plus an addition rather
/// than a modification.
pub fn diff(before: &DependencyMatrix, after: &DependencyMatrix) -> DiffReport {
    let mut report = DiffReport {
        added_activities: after
            .activities()
            .iter()
            .filter(|a| !before.contains(a))
            .cloned()
            .collect(),
        removed_activities: before
            .activities()
            .iter()
            .filter(|a| !after.contains(a))
            .cloned()
            .collect(),
        ..DiffReport::default()
    };

    let names: Vec<&String> = before
        .activities()
        .iter()
        .chain(report.added_activities.iter())
        .collect();

    for from in &names {
        for to in &names {
            if from == to {
                continue;
            }
            let old = before.get(from, to);
            let new = after.get(from, to);
            let change = || CellChange {
                from: from.to_string(),
                to: to.to_string(),
                before: old.encode(),
                after: new.encode(),
            };
            match (old, new) {
                (Cell::Present(o), Cell::Present(n)) if o != n => {
                    if o.is_compatible_with(n) {
                        report.modified_cells.push(change());
                    } else {
                        report.removed_cells.push(change());
                        report.added_cells.push(change());
                    }
                }
                (Cell::Present(o), Cell::Absent) if !o.is_independent() => {
                    report.removed_cells.push(change())
                }
                (Cell::Absent, Cell::Present(n)) if !n.is_independent() => {
                    report.added_cells.push(change())
                }
                _ => {}
            }
        }
    }

    tracing::debug!(changes = report.change_count(), "Computed matrix diff");
    report
}
