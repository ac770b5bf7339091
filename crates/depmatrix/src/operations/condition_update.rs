use crate::locks::{Draft, LockPolicy};
use crate::matrix::DependencyMatrix;
use crate::notation::Existential;
use crate::types::{DependencyError, DependencyResult};

use super::EditOutcome;

/// Make `depending` conditional on `condition` (`depending ⇒ condition`), or
/// lift that condition again.
pub(super) fn apply(
    source: &DependencyMatrix,
    policy: &LockPolicy,
    condition: &str,
    depending: &str,
    clear: bool,
) -> DependencyResult<EditOutcome> {
    source.require(condition)?;
    source.require(depending)?;
    if condition == depending {
        return Err(DependencyError::InvalidParams(format!(
            "'{condition}' cannot be its own condition"
        )));
    }

    let mut draft = Draft::new(source, policy);
    if clear {
        if source.relation(depending, condition).existential != Existential::Implies {
            return Err(DependencyError::InvalidParams(format!(
                "'{depending}' is not conditional on '{condition}'"
            )));
        }
        draft.write_existential(depending, condition, Existential::Independent)?;
    } else {
        draft.write_existential(depending, condition, Existential::Implies)?;
    }
    EditOutcome::from_draft(draft)
}

#[cfg(test)]
mod tests {
    use super::super::apply_operation;
    use crate::discovery::discover;
    use crate::types::{DependencyError, Lock, SubRelation};
    use serde_json::json;

    fn pair() -> crate::matrix::DependencyMatrix {
        discover(&[vec!["A".into(), "B".into()], vec!["C".into()]], 1.0, 1.0).unwrap()
    }

    #[test]
    fn test_add_and_clear_condition() {
        let m = pair();
        let params = json!({"condition_activity": "A", "depending_activity": "C"});
        let added = apply_operation("condition_update", &m, &[], params).unwrap().matrix;
        assert_eq!(added.get("C", "A").encode(), "-,=>");
        assert_eq!(added.get("A", "C").encode(), "-,<=");

        let cleared = apply_operation(
            "condition_update",
            &added,
            &[],
            json!({"condition_activity": "A", "depending_activity": "C", "clear": true}),
        )
        .unwrap()
        .matrix;
        assert_eq!(cleared.get("C", "A").encode(), "-,-");
    }

    #[test]
    fn test_clear_missing_condition() {
        let err = apply_operation(
            "condition_update",
            &pair(),
            &[],
            json!({"condition_activity": "B", "depending_activity": "A", "clear": true}),
        )
        .unwrap_err();
        assert!(matches!(err, DependencyError::InvalidParams(_)));
    }

    #[test]
    fn test_existential_lock_blocks_condition() {
        let locks = [Lock::new("A", "C", false, true)];
        let err = apply_operation(
            "condition_update",
            &pair(),
            &locks,
            json!({"condition_activity": "A", "depending_activity": "C"}),
        )
        .unwrap_err();
        let suppressed = match err {
            DependencyError::LockConflict { suppressed } => suppressed,
            other => panic!("expected lock conflict, got {other:?}"),
        };
        assert_eq!(suppressed.len(), 1);
        assert_eq!(suppressed[0].part, SubRelation::Existential);
        assert_eq!(suppressed[0].wanted, "-,=>");

        // A temporal lock on the same pair does not get in the way.
        let locks = [Lock::new("A", "C", true, false)];
        let out = apply_operation(
            "condition_update",
            &pair(),
            &locks,
            json!({"condition_activity": "A", "depending_activity": "C"}),
        )
        .unwrap();
        assert_eq!(out.matrix.get("C", "A").encode(), "-,=>");
    }
}
