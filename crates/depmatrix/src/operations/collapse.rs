use serde::{Deserialize, Serialize};

use crate::locks::{Draft, LockPolicy};
use crate::matrix::DependencyMatrix;
use crate::notation::{Adjacency, Cell, Existential, Relation, Temporal};
use crate::types::{DependencyError, DependencyResult};

use super::{require_group, EditOutcome};

/// What a collapse replaced: the member activities and every cell that
/// touched one of them, in the order the activities had before the collapse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollapsedGroup {
    pub collapsed_activity: String,
    pub members: Vec<String>,
    pub matrix: DependencyMatrix,
}

/// The relation a collapsed group has to `outsider`, derived from its
/// members' relations.
///
/// Orderings survive when every ordered member points the same way; the
/// result is direct if any member is direct. An existential relation
/// survives only when all members share it.
pub fn collapse_relation(matrix: &DependencyMatrix, members: &[String], outsider: &str) -> Cell {
    let relations: Vec<Relation> = members
        .iter()
        .filter_map(|m| matrix.get(m, outsider).relation())
        .collect();
    let Some(first) = relations.first() else {
        return Cell::Absent;
    };

    let mut before = None;
    let mut mixed = false;
    let mut direct = false;
    for temporal in relations.iter().map(|r| r.temporal) {
        let (is_before, adjacency) = match temporal {
            Temporal::Independent => continue,
            Temporal::Before(adj) => (true, adj),
            Temporal::After(adj) => (false, adj),
        };
        match before {
            None => before = Some(is_before),
            Some(b) if b != is_before => mixed = true,
            Some(_) => {}
        }
        direct |= adjacency == Adjacency::Direct;
    }
    let adjacency = if direct {
        Adjacency::Direct
    } else {
        Adjacency::Eventual
    };
    let temporal = match (before, mixed) {
        (Some(true), false) => Temporal::Before(adjacency),
        (Some(false), false) => Temporal::After(adjacency),
        _ => Temporal::Independent,
    };

    let shared = relations.len() == members.len()
        && relations.iter().all(|r| r.existential == first.existential);
    let existential = if shared {
        first.existential
    } else {
        Existential::Independent
    };
    Cell::Present(Relation::new(temporal, existential))
}

pub(super) fn apply(
    source: &DependencyMatrix,
    policy: &LockPolicy,
    collapsed: &str,
    members: &[String],
) -> DependencyResult<EditOutcome> {
    require_group(source, members, 2)?;
    let collapsed = collapsed.trim();
    if collapsed.is_empty() {
        return Err(DependencyError::InvalidParams(
            "Collapsed activity name must not be empty".to_string(),
        ));
    }
    if source.contains(collapsed) && !members.iter().any(|m| m == collapsed) {
        return Err(DependencyError::InvalidParams(format!(
            "The activity '{collapsed}' is already present in the matrix"
        )));
    }

    let is_member = |a: &str| members.iter().any(|m| m == a);

    let mut saved = DependencyMatrix::new(source.activities().to_vec())?;
    for (from, to, relation) in source.pairs() {
        if is_member(from) {
            saved.set(from, to, relation)?;
        }
    }

    let anchor = members
        .iter()
        .filter_map(|m| source.position(m))
        .min()
        .unwrap_or(0);
    let outsiders: Vec<String> = source
        .activities()
        .iter()
        .filter(|a| !is_member(a.as_str()))
        .cloned()
        .collect();
    let mut order = outsiders.clone();
    order.insert(anchor.min(order.len()), collapsed.to_string());

    let mut next = DependencyMatrix::new(order)?;
    for (from, to, relation) in source.pairs() {
        if !is_member(from) && !is_member(to) {
            next.set(from, to, relation)?;
        }
    }
    for outsider in &outsiders {
        if let Cell::Present(relation) = collapse_relation(source, members, outsider) {
            next.set(collapsed, outsider, relation)?;
        }
    }

    tracing::debug!(collapsed, members = ?members, "Collapsing activities");
    let mut draft = Draft::new(source, policy);
    draft.restructure(next);
    let mut outcome = EditOutcome::from_draft(draft)?;
    outcome.collapsed = Some(CollapsedGroup {
        collapsed_activity: collapsed.to_string(),
        members: source
            .activities()
            .iter()
            .filter(|a| is_member(a.as_str()))
            .cloned()
            .collect(),
        matrix: saved,
    });
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::discover;
    use crate::operations::apply_operation;
    use serde_json::json;

    fn chain() -> DependencyMatrix {
        discover(
            &[vec!["A".into(), "B".into(), "C".into(), "D".into()]],
            1.0,
            1.0,
        )
        .unwrap()
    }

    #[test]
    fn test_collapse_rule() {
        let m = chain();
        let members = vec!["B".to_string(), "D".to_string()];
        // B ≻d A and D ≻ A: same direction, one direct.
        assert_eq!(collapse_relation(&m, &members, "A").encode(), "≻d,⇔");
        // B ≺d C but D ≻d C: mixed.
        assert_eq!(collapse_relation(&m, &members, "C").encode(), "-,⇔");
        assert_eq!(collapse_relation(&m, &members, "Z"), Cell::Absent);
    }

    #[test]
    fn test_collapse_replaces_members() {
        let out = apply_operation(
            "collapse",
            &chain(),
            &[],
            json!({"collapsed_activity": "BC", "collapse_activities": ["C", "B"]}),
        )
        .unwrap();
        assert_eq!(out.matrix.activities(), &["A", "BC", "D"]);
        assert_eq!(out.matrix.get("A", "BC").encode(), "≺d,⇔");
        assert_eq!(out.matrix.get("BC", "D").encode(), "≺d,⇔");
        let group = out.collapsed.unwrap();
        assert_eq!(group.members, vec!["B", "C"]);
        assert_eq!(group.matrix.get("B", "C").encode(), "≺d,⇔");
        assert_eq!(group.matrix.get("A", "D"), Cell::Absent);
    }

    #[test]
    fn test_collapse_existing_name() {
        let err = apply_operation(
            "collapse",
            &chain(),
            &[],
            json!({"collapsed_activity": "A", "collapse_activities": ["B", "C"]}),
        )
        .unwrap_err();
        assert!(matches!(err, DependencyError::InvalidParams(_)));
    }

    #[test]
    fn test_collapsed_group_serializes() {
        let out = apply_operation(
            "collapse",
            &chain(),
            &[],
            json!({"collapsed_activity": "G", "collapse_activities": ["A", "B"]}),
        )
        .unwrap();
        let group = out.collapsed.unwrap();
        let text = serde_json::to_string(&group).unwrap();
        let back: CollapsedGroup = serde_json::from_str(&text).unwrap();
        assert_eq!(back, group);
    }
}
