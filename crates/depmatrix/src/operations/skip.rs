use crate::locks::LockPolicy;
use crate::matrix::DependencyMatrix;
use crate::types::DependencyResult;

use super::EditOutcome;

/// Take `activity` out of the process and route its direct predecessors
/// straight to its direct successors. Existential relations among the
/// remaining activities are left as they are.
pub(super) fn apply(
    source: &DependencyMatrix,
    policy: &LockPolicy,
    activity: &str,
) -> DependencyResult<EditOutcome> {
    super::delete::apply(source, policy, activity, true)
}
