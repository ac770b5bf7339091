use crate::locks::{Draft, LockPolicy};
use crate::matrix::DependencyMatrix;
use crate::notation::Cell;
use crate::types::{DependencyError, DependencyResult};

use super::{collapse_relation, CollapsedGroup, EditOutcome};

/// Expand `collapsed` back into the members recorded in `group`.
///
/// A member keeps its saved relation to an outsider as long as the group's
/// relation to that outsider has not been edited since the collapse.
/// Otherwise it takes over the group's current relation.
pub(super) fn apply(
    source: &DependencyMatrix,
    policy: &LockPolicy,
    collapsed: &str,
    group: &CollapsedGroup,
) -> DependencyResult<EditOutcome> {
    if group.collapsed_activity != collapsed {
        return Err(DependencyError::InvalidParams(format!(
            "Group was recorded for '{}', not '{collapsed}'",
            group.collapsed_activity
        )));
    }
    let anchor = source
        .position(collapsed)
        .ok_or_else(|| DependencyError::UnknownActivity(collapsed.to_string()))?;
    if let Some(taken) = group
        .members
        .iter()
        .find(|m| *m != collapsed && source.contains(m))
    {
        return Err(DependencyError::InvalidParams(format!(
            "The activity '{taken}' is already present in the matrix"
        )));
    }
    let is_member = |a: &str| group.members.iter().any(|m| m == a);

    let mut order: Vec<String> = source
        .activities()
        .iter()
        .filter(|a| *a != collapsed)
        .cloned()
        .collect();
    let recorded = group.matrix.activities();
    for (i, member) in recorded.iter().enumerate() {
        if !is_member(member.as_str()) {
            continue;
        }
        let after = recorded[..i]
            .iter()
            .rev()
            .find_map(|prev| order.iter().position(|a| a == prev));
        let index = match after {
            Some(pos) => pos + 1,
            None => anchor.min(order.len()),
        };
        order.insert(index, member.clone());
    }

    let mut next = DependencyMatrix::new(order)?;
    for (from, to, relation) in source.pairs() {
        if from != collapsed && to != collapsed {
            next.set(from, to, relation)?;
        }
    }
    for (from, to, relation) in group.matrix.pairs() {
        if is_member(from) && is_member(to) {
            next.set(from, to, relation)?;
        }
    }

    let outsiders: Vec<String> = next
        .activities()
        .iter()
        .filter(|a| !is_member(a.as_str()))
        .cloned()
        .collect();
    for outsider in &outsiders {
        let current = source.get(collapsed, outsider);
        let unchanged = group.matrix.contains(outsider)
            && collapse_relation(&group.matrix, &group.members, outsider) == current;
        for member in &group.members {
            let cell = if unchanged {
                group.matrix.get(member, outsider)
            } else {
                current
            };
            if let Cell::Present(relation) = cell {
                next.set(member, outsider, relation)?;
            }
        }
    }

    tracing::debug!(collapsed, members = ?group.members, "Expanding collapsed activity");
    let mut draft = Draft::new(source, policy);
    draft.restructure(next);
    EditOutcome::from_draft(draft)
}

#[cfg(test)]
mod tests {
    use crate::discovery::discover;
    use crate::matrix::DependencyMatrix;
    use crate::operations::apply_operation;
    use crate::types::DependencyError;
    use serde_json::json;

    fn chain() -> DependencyMatrix {
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

    fn collapse(m: &DependencyMatrix, members: serde_json::Value) -> (DependencyMatrix, serde_json::Value) {
        let out = apply_operation(
            "collapse",
            m,
            &[],
            json!({"collapsed_activity": "G", "collapse_activities": members}),
        )
        .unwrap();
        let group = serde_json::to_value(out.collapsed.unwrap()).unwrap();
        (out.matrix, group)
    }

    #[test]
    fn test_round_trip_contiguous() {
        let m = chain();
        let (collapsed, group) = collapse(&m, json!(["B", "C"]));
        let out = apply_operation(
            "de-collapse",
            &collapsed,
            &[],
            json!({"collapsed_activity": "G", "group": group}),
        )
        .unwrap();
        assert_eq!(out.matrix, m);
    }

    #[test]
    fn test_round_trip_scattered_members() {
        let m = chain();
        let (collapsed, group) = collapse(&m, json!(["D", "B"]));
        assert_eq!(collapsed.activities(), &["A", "G", "C"]);
        let out = apply_operation(
            "de-collapse",
            &collapsed,
            &[],
            json!({"collapsed_activity": "G", "group": group}),
        )
        .unwrap();
        assert_eq!(out.matrix, m);
    }

    #[test]
    fn test_edited_group_relation_is_inherited() {
        let m = chain();
        let (collapsed, group) = collapse(&m, json!(["B", "C"]));
        let edited = apply_operation(
            "modify",
            &collapsed,
            &[],
            json!({"from_activity": "G", "to_activity": "D", "existential": {"type": "or"}}),
        )
        .unwrap()
        .matrix;
        let out = apply_operation(
            "de-collapse",
            &edited,
            &[],
            json!({"collapsed_activity": "G", "group": group}),
        )
        .unwrap();
        assert_eq!(out.matrix.get("B", "D"), edited.get("G", "D"));
        assert_eq!(out.matrix.get("C", "D"), edited.get("G", "D"));
        // Untouched boundary keeps the saved member cells.
        assert_eq!(out.matrix.get("A", "B"), m.get("A", "B"));
        assert_eq!(out.matrix.get("A", "C"), m.get("A", "C"));
    }

    #[test]
    fn test_member_name_taken() {
        let m = chain();
        let (collapsed, group) = collapse(&m, json!(["B", "C"]));
        let renamed = apply_operation(
            "replace",
            &collapsed,
            &[],
            json!({"old_activity": "A", "new_activity": "B"}),
        )
        .unwrap()
        .matrix;
        let err = apply_operation(
            "de-collapse",
            &renamed,
            &[],
            json!({"collapsed_activity": "G", "group": group}),
        )
        .unwrap_err();
        assert!(matches!(err, DependencyError::InvalidParams(_)));
    }
}
