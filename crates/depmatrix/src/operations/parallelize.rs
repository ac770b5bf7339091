use crate::locks::{Draft, LockPolicy};
use crate::matrix::DependencyMatrix;
use crate::notation::Temporal;
use crate::types::{DependencyError, DependencyResult};

use super::{require_group, EditOutcome};

/// Drop every ordering among `activities`, keeping their existential
/// relations.
pub(super) fn apply(
    source: &DependencyMatrix,
    policy: &LockPolicy,
    activities: &[String],
) -> DependencyResult<EditOutcome> {
    require_group(source, activities, 2)?;
    if let Some((a, outsider, b)) = ordered_between(source, activities) {
        return Err(DependencyError::InvalidParams(format!(
            "Cannot parallelize: '{outsider}' must happen between '{a}' and '{b}'"
        )));
    }

    let mut draft = Draft::new(source, policy);
    for (i, a) in activities.iter().enumerate() {
        for b in &activities[i + 1..] {
            draft.write_temporal(a, b, Temporal::Independent)?;
        }
    }
    EditOutcome::from_draft(draft)
}

/// An activity outside the group that is ordered after one member and
/// before another.
fn ordered_between(
    matrix: &DependencyMatrix,
    group: &[String],
) -> Option<(String, String, String)> {
    let before = |x: &str, y: &str| matches!(matrix.relation(x, y).temporal, Temporal::Before(_));
    for a in group {
        for b in group.iter().filter(|b| *b != a) {
            for outsider in matrix.activities().iter().filter(|o| !group.contains(*o)) {
                if before(a.as_str(), outsider.as_str()) && before(outsider.as_str(), b.as_str()) {
                    return Some((a.clone(), outsider.clone(), b.clone()));
                }
            }
        }
    }
    None
}
