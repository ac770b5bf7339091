use crate::locks::{Draft, LockPolicy};
use crate::matrix::DependencyMatrix;
use crate::notation::Cell;
use crate::types::{DependencyError, DependencyResult};

use super::EditOutcome;

/// Exchange the positions and relations of two activities.
pub(super) fn apply(
    source: &DependencyMatrix,
    policy: &LockPolicy,
    first: &str,
    second: &str,
) -> DependencyResult<EditOutcome> {
    source.require(first)?;
    source.require(second)?;
    if first == second {
        return Err(DependencyError::InvalidParams(format!(
            "Cannot swap '{first}' with itself"
        )));
    }

    let swap = |name: &str| -> String {
        if name == first {
            second.to_string()
        } else if name == second {
            first.to_string()
        } else {
            name.to_string()
        }
    };

    let mut draft = Draft::new(source, policy);
    let names = source.activities();
    for (i, from) in names.iter().enumerate() {
        for to in &names[i + 1..] {
            match source.get(&swap(from.as_str()), &swap(to.as_str())) {
                Cell::Present(relation) => draft.write(from, to, relation)?,
                Cell::Absent => draft.clear(from, to)?,
            }
        }
    }
    let order = names.iter().map(|a| swap(a.as_str())).collect();
    let reordered = draft.matrix().reordered(order)?;
    draft.restructure(reordered);
    EditOutcome::from_draft(draft)
}

#[cfg(test)]
mod tests {
    use super::super::apply_operation;
    use crate::discovery::discover;
    use crate::types::{DependencyError, Lock, SubRelation};
    use serde_json::json;

    fn sample() -> crate::matrix::DependencyMatrix {
        discover(
            &[
                vec!["A".into(), "B".into(), "C".into(), "D".into()],
                vec!["A".into(), "C".into(), "D".into()],
            ],
            1.0,
            1.0,
        )
        .unwrap()
    }

    #[test]
    fn test_swap_exchanges_relations() {
        let m = sample();
        let out = apply_operation("swap", &m, &[], json!({"activity1": "B", "activity2": "C"})).unwrap();
        let s = out.matrix;
        assert_eq!(s.activities(), &["A", "C", "B", "D"]);
        assert_eq!(s.get("A", "C"), m.get("A", "B"));
        assert_eq!(s.get("C", "B"), m.get("B", "C"));
        assert_eq!(s.get("C", "D"), m.get("B", "D"));
        assert_eq!(s.get("A", "D"), m.get("A", "D"));
        s.check_invariants().unwrap();
    }

    #[test]
    fn test_swap_is_involutive() {
        let m = sample();
        let params = json!({"activity1": "A", "activity2": "D"});
        let once = apply_operation("swap", &m, &[], params.clone()).unwrap().matrix;
        assert_ne!(once, m);
        let twice = apply_operation("swap", &once, &[], params).unwrap().matrix;
        assert_eq!(twice, m);
    }

    #[test]
    fn test_swap_same_activity() {
        let err = apply_operation("swap", &sample(), &[], json!({"activity1": "A", "activity2": "A"}))
            .unwrap_err();
        assert!(matches!(err, DependencyError::InvalidParams(_)));
    }

    #[test]
    fn test_locked_cell_keeps_its_value() {
        let m = sample();
        let locks = [Lock::new("A", "B", true, false)];
        let out = apply_operation("swap", &m, &locks, json!({"activity1": "B", "activity2": "C"}))
            .unwrap();

        // The temporal half of (A, B) stays; its existential half is swapped in.
        assert_eq!(m.get("A", "B").encode(), "≺d,<=");
        assert_eq!(m.get("A", "C").encode(), "≺,⇔");
        assert_eq!(out.matrix.get("A", "B").encode(), "≺d,⇔");
        assert_eq!(out.matrix.get("A", "C"), m.get("A", "B"));

        assert_eq!(out.suppressed.len(), 1);
        let blocked = &out.suppressed[0];
        assert_eq!((blocked.from.as_str(), blocked.to.as_str()), ("A", "B"));
        assert_eq!(blocked.part, SubRelation::Temporal);
        assert_eq!(blocked.kept, "≺d,<=");
        assert_eq!(blocked.wanted, "≺,<=");
        out.matrix.check_invariants().unwrap();
    }
}
