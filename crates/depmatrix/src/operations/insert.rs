use crate::locks::{Draft, LockPolicy};
use crate::matrix::DependencyMatrix;
use crate::types::DependencyResult;

use super::{check_placement, install_specs, validate_specs, DependencySpec, EditOutcome};

/// Add `activity`, independent of everything, then install `dependencies`.
pub(super) fn apply(
    source: &DependencyMatrix,
    policy: &LockPolicy,
    activity: &str,
    dependencies: &[DependencySpec],
) -> DependencyResult<EditOutcome> {
    let grown = source.with_activity(activity)?;
    validate_specs(&grown, activity, dependencies)?;

    let mut draft = Draft::new(source, policy);
    draft.restructure(grown.clone());
    install_specs(&mut draft, dependencies)?;
    let outcome = EditOutcome::from_draft(draft)?;
    check_placement(&grown, &outcome.matrix, activity)?;
    Ok(outcome)
}
