use crate::locks::{Draft, LockPolicy};
use crate::matrix::DependencyMatrix;
use crate::notation::{Adjacency, Temporal};
use crate::types::{DependencyError, DependencyResult};

use super::{direct_neighbours, EditOutcome};

/// Remove `activity`. With `bypass`, each of its direct predecessors is
/// relinked directly before each of its direct successors.
pub(super) fn apply(
    source: &DependencyMatrix,
    policy: &LockPolicy,
    activity: &str,
    bypass: bool,
) -> DependencyResult<EditOutcome> {
    source.require(activity)?;
    if source.len() == 1 {
        return Err(DependencyError::InvalidParams(format!(
            "Deleting '{activity}' would leave an empty process"
        )));
    }

    let (predecessors, successors) = direct_neighbours(source, activity);
    let mut draft = Draft::new(source, policy);
    draft.remove_activity(activity)?;

    if bypass {
        for p in &predecessors {
            for s in successors.iter().filter(|s| *s != p) {
                tracing::debug!(from = %p, to = %s, "Relinking around removed activity");
                draft.write_temporal(p, s, Temporal::Before(Adjacency::Direct))?;
            }
        }
    }
    EditOutcome::from_draft(draft)
}
