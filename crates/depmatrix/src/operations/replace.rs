use crate::locks::{Draft, LockPolicy};
use crate::matrix::DependencyMatrix;
use crate::types::DependencyResult;

use super::EditOutcome;

pub(super) fn apply(
    source: &DependencyMatrix,
    policy: &LockPolicy,
    old_activity: &str,
    new_activity: &str,
) -> DependencyResult<EditOutcome> {
    let renamed = source.renamed(old_activity, new_activity.trim())?;
    let mut draft = Draft::new(source, policy);
    draft.restructure(renamed);
    EditOutcome::from_draft(draft)
}

#[cfg(test)]
mod tests {
    use super::super::apply_operation;
    use crate::discovery::discover;
    use crate::types::DependencyError;
    use serde_json::json;

    fn chain() -> crate::matrix::DependencyMatrix {
        discover(&[vec!["A".into(), "B".into(), "C".into()]], 1.0, 1.0).unwrap()
    }

    #[test]
    fn test_replace_in_place() {
        let out = apply_operation(
            "replace",
            &chain(),
            &[],
            json!({"old_activity": "B", "new_activity": "Review"}),
        )
        .unwrap();
        assert_eq!(out.matrix.activities(), &["A", "Review", "C"]);
        assert_eq!(out.matrix.get("A", "Review").encode(), "≺d,⇔");
        assert_eq!(out.matrix.get("Review", "C").encode(), "≺d,⇔");
    }

    #[test]
    fn test_replace_with_existing_name() {
        let err = apply_operation(
            "replace",
            &chain(),
            &[],
            json!({"old_activity": "B", "new_activity": "C"}),
        )
        .unwrap_err();
        assert!(matches!(err, DependencyError::InvalidParams(_)));
    }

    #[test]
    fn test_replace_with_blank_name() {
        let source = chain();
        let err = apply_operation(
            "replace",
            &source,
            &[],
            json!({"old_activity": "B", "new_activity": "   "}),
        )
        .unwrap_err();
        assert!(matches!(err, DependencyError::InvalidParams(_)));
        assert_eq!(source.activities(), &["A", "B", "C"]);
    }
}
