use crate::locks::{Draft, LockPolicy};
use crate::matrix::DependencyMatrix;
use crate::types::{DependencyError, DependencyResult};

use super::{EditOutcome, ExistentialSpec, TemporalSpec};

/// Overwrite the given sub-relations of one pair.
pub(super) fn apply(
    source: &DependencyMatrix,
    policy: &LockPolicy,
    from: &str,
    to: &str,
    temporal: Option<&TemporalSpec>,
    existential: Option<&ExistentialSpec>,
) -> DependencyResult<EditOutcome> {
    source.require(from)?;
    source.require(to)?;
    if from == to {
        return Err(DependencyError::InvalidParams(format!(
            "Cannot relate '{from}' to itself"
        )));
    }
    if temporal.is_none() && existential.is_none() {
        return Err(DependencyError::InvalidParams(
            "Nothing to modify: give a temporal or existential dependency".to_string(),
        ));
    }

    let mut draft = Draft::new(source, policy);
    if let Some(spec) = temporal {
        draft.write_temporal(from, to, spec.relation())?;
    }
    if let Some(spec) = existential {
        draft.write_existential(from, to, spec.relation())?;
    }
    EditOutcome::from_draft(draft)
}

#[cfg(test)]
mod tests {
    use super::super::apply_operation;
    use crate::discovery::discover;
    use crate::types::{DependencyError, Lock};
    use serde_json::json;

    fn pair() -> crate::matrix::DependencyMatrix {
        discover(&[vec!["A".into(), "B".into()]], 1.0, 1.0).unwrap()
    }

    #[test]
    fn test_modify_one_part() {
        let out = apply_operation(
            "modify",
            &pair(),
            &[],
            json!({"from_activity": "B", "to_activity": "A", "existential": {"type": "nand"}}),
        )
        .unwrap();
        assert_eq!(out.matrix.get("A", "B").encode(), "≺d,⊼");
    }

    #[test]
    fn test_modify_nothing() {
        let err = apply_operation(
            "modify",
            &pair(),
            &[],
            json!({"from_activity": "A", "to_activity": "B"}),
        )
        .unwrap_err();
        assert!(matches!(err, DependencyError::InvalidParams(_)));
    }

    #[test]
    fn test_modify_locked_pair() {
        let locks = [Lock::new("A", "B", true, false)];
        let err = apply_operation(
            "modify",
            &pair(),
            &locks,
            json!({"from_activity": "A", "to_activity": "B", "temporal": {"type": "independence"}}),
        )
        .unwrap_err();
        match err {
            DependencyError::LockConflict { suppressed } => {
                assert_eq!(suppressed.len(), 1);
                assert_eq!(suppressed[0].kept, "≺d,⇔");
                assert_eq!(suppressed[0].wanted, "-,⇔");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
