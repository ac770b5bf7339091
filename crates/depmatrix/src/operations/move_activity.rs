use crate::locks::{Draft, LockPolicy};
use crate::matrix::DependencyMatrix;
use crate::notation::Relation;
use crate::types::DependencyResult;

use super::{check_placement, install_specs, validate_specs, DependencySpec, EditOutcome};

/// Detach `activity` from everything it relates to, then install
/// `dependencies` as its new placement.
pub(super) fn apply(
    source: &DependencyMatrix,
    policy: &LockPolicy,
    activity: &str,
    dependencies: &[DependencySpec],
) -> DependencyResult<EditOutcome> {
    source.require(activity)?;
    validate_specs(source, activity, dependencies)?;

    let mut draft = Draft::new(source, policy);
    for other in source.activities().iter().filter(|a| *a != activity) {
        draft.write(activity, other, Relation::INDEPENDENT)?;
    }
    let detached = draft.matrix().clone();
    install_specs(&mut draft, dependencies)?;
    let outcome = EditOutcome::from_draft(draft)?;
    check_placement(&detached, &outcome.matrix, activity)?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::super::apply_operation;
    use crate::discovery::discover;
    use crate::types::{DependencyError, Lock};
    use serde_json::json;

    fn chain() -> crate::matrix::DependencyMatrix {
        discover(&[vec!["A".into(), "B".into(), "C".into()]], 1.0, 1.0).unwrap()
    }

    #[test]
    fn test_move_to_front() {
        let out = apply_operation(
            "move",
            &chain(),
            &[],
            json!({"activity": "C", "dependencies": [
                {"from": "C", "to": "A", "temporal": {"type": "direct"}, "existential": {"type": "equivalence"}}
            ]}),
        )
        .unwrap();
        let m = out.matrix;
        assert_eq!(m.get("C", "A").encode(), "≺d,⇔");
        assert_eq!(m.get("C", "B").encode(), "-,-");
        assert_eq!(m.get("A", "B").encode(), "≺d,⇔");
        assert_eq!(m.activities(), &["A", "B", "C"]);
    }

    #[test]
    fn test_move_cycle_rejected() {
        let err = apply_operation(
            "move",
            &chain(),
            &[],
            json!({"activity": "B", "dependencies": [
                {"from": "C", "to": "B", "temporal": {"type": "eventual"}},
                {"from": "B", "to": "A", "temporal": {"type": "eventual"}}
            ]}),
        )
        .unwrap_err();
        assert!(matches!(err, DependencyError::InvalidParams(_)));
    }

    #[test]
    fn test_move_respects_lock() {
        let locks = [Lock::new("A", "B", true, false)];
        let out = apply_operation(
            "move",
            &chain(),
            &locks,
            json!({"activity": "B", "dependencies": [
                {"from": "B", "to": "C", "temporal": {"type": "direct"}}
            ]}),
        )
        .unwrap();
        assert_eq!(out.matrix.get("A", "B").encode(), "≺d,-");
        assert_eq!(out.matrix.get("B", "C").encode(), "≺d,-");
        assert!(!out.suppressed.is_empty());
    }
}
