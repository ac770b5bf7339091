//! Acceptance variants: the activity sequences a dependency matrix admits,
//! and the matrix a set of sequences implies.
//!
//! A variant is one process instance. Its activities form a subset allowed by
//! every existential relation, and they appear in an order allowed by every
//! temporal relation between two of them. Enumeration is exponential in the
//! number of activities and is capped at [`MAX_VARIANT_ACTIVITIES`].

use std::collections::{BTreeSet, HashSet};

use crate::discovery::EXISTENTIAL_PRECEDENCE;
use crate::matrix::DependencyMatrix;
use crate::notation::{Adjacency, Existential, Relation, Temporal};
use crate::types::{DependencyError, DependencyResult};

/// Largest matrix whose variants will be enumerated.
pub const MAX_VARIANT_ACTIVITIES: usize = 12;

/// Every variant `matrix` accepts, including the empty one when nothing is
/// required.
///
/// Subsets come in bitmask order over the matrix's activity order. Orderings
/// of one subset come in lexicographic order of activity positions.
pub fn acceptance_variants(matrix: &DependencyMatrix) -> DependencyResult<Vec<Vec<String>>> {
    let n = matrix.len();
    if n > MAX_VARIANT_ACTIVITIES {
        return Err(DependencyError::InvalidParams(format!(
            "Cannot enumerate the variants of {n} activities (limit {MAX_VARIANT_ACTIVITIES})"
        )));
    }

    let names = matrix.activities();
    let relations: Vec<Vec<Relation>> = names
        .iter()
        .map(|a| names.iter().map(|b| matrix.relation(a, b)).collect())
        .collect();

    let mut variants = Vec::new();
    for mask in 0u32..(1u32 << n) {
        let present = |i: usize| mask & (1 << i) != 0;
        let admitted = (0..n).all(|i| {
            (i + 1..n).all(|j| relations[i][j].existential.holds(present(i), present(j)))
        });
        if !admitted {
            continue;
        }
        let members: Vec<usize> = (0..n).filter(|&i| present(i)).collect();
        let mut found = Vec::new();
        orderings(&relations, &members, &mut Vec::with_capacity(members.len()), &mut found);
        variants.extend(
            found
                .into_iter()
                .map(|order| order.into_iter().map(|i| names[i].clone()).collect::<Vec<_>>()),
        );
    }

    tracing::debug!(activities = n, variants = variants.len(), "Enumerated acceptance variants");
    Ok(variants)
}

fn orderings(
    relations: &[Vec<Relation>],
    members: &[usize],
    placed: &mut Vec<usize>,
    found: &mut Vec<Vec<usize>>,
) {
    if placed.len() == members.len() {
        found.push(placed.clone());
        return;
    }
    for &next in members {
        if placed.contains(&next) || !fits(relations, members, placed, next) {
            continue;
        }
        placed.push(next);
        orderings(relations, members, placed, found);
        placed.pop();
    }
}

/// Whether `next` can be appended to `placed`, with the rest of `members`
/// still to come.
fn fits(relations: &[Vec<Relation>], members: &[usize], placed: &[usize], next: usize) -> bool {
    let last = placed.len().checked_sub(1);
    for (pos, &earlier) in placed.iter().enumerate() {
        match relations[earlier][next].temporal {
            Temporal::After(_) => return false,
            Temporal::Before(Adjacency::Direct) if Some(pos) != last => return false,
            _ => {}
        }
    }
    if let Some(&prev) = placed.last() {
        let owed_elsewhere = members.iter().any(|&m| {
            m != next && relations[prev][m].temporal == Temporal::Before(Adjacency::Direct)
        });
        if owed_elsewhere {
            return false;
        }
    }
    members
        .iter()
        .filter(|&&m| m != next && !placed.contains(&m))
        .all(|&m| !matches!(relations[next][m].temporal, Temporal::After(_)))
}

/// The strongest matrix every one of `variants` satisfies.
///
/// Activities are listed in sorted order. A pair is ordered only when every
/// variant containing both agrees on the order, and direct only when they are
/// always adjacent. The existential relation is the first, in discovery
/// precedence, that holds in every variant.
pub fn matrix_from_variants(variants: &[Vec<String>]) -> DependencyResult<DependencyMatrix> {
    let activities: Vec<String> = variants
        .iter()
        .flatten()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let occurrences: Vec<HashSet<&str>> = variants
        .iter()
        .map(|v| v.iter().map(String::as_str).collect())
        .collect();

    let mut matrix = DependencyMatrix::independent(activities.clone())?;
    for (i, a) in activities.iter().enumerate() {
        for b in &activities[i + 1..] {
            let relation = Relation::new(
                observed_temporal(variants, a, b),
                observed_existential(&occurrences, a, b),
            );
            matrix.set(a, b, relation)?;
        }
    }
    Ok(matrix)
}

fn observed_existential(occurrences: &[HashSet<&str>], a: &str, b: &str) -> Existential {
    EXISTENTIAL_PRECEDENCE
        .into_iter()
        .find(|relation| {
            occurrences
                .iter()
                .all(|seen| relation.holds(seen.contains(a), seen.contains(b)))
        })
        .unwrap_or(Existential::Independent)
}

#[derive(Debug, Default, Clone, Copy)]
struct Sightings {
    any: bool,
    gapped: bool,
}

impl Sightings {
    fn record(&mut self, adjacent: bool) {
        self.any = true;
        self.gapped |= !adjacent;
    }

    fn adjacency(self) -> Adjacency {
        if self.gapped {
            Adjacency::Eventual
        } else {
            Adjacency::Direct
        }
    }
}

fn observed_temporal(variants: &[Vec<String>], a: &str, b: &str) -> Temporal {
    let mut forward = Sightings::default();
    let mut backward = Sightings::default();
    for variant in variants {
        let position = |name: &str| variant.iter().position(|x| x == name);
        let (Some(pa), Some(pb)) = (position(a), position(b)) else {
            continue;
        };
        if pa < pb {
            forward.record(pa + 1 == pb);
        } else {
            backward.record(pb + 1 == pa);
        }
    }
    match (forward.any, backward.any) {
        (true, false) => Temporal::Before(forward.adjacency()),
        (false, true) => Temporal::After(backward.adjacency()),
        _ => Temporal::Independent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::discover;
    use crate::notation::decode;
    use crate::operations::apply_operation;
    use serde_json::json;

    fn traces(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|t| t.iter().map(|a| a.to_string()).collect())
            .collect()
    }

    fn chain() -> DependencyMatrix {
        discover(&traces(&[&["A", "B", "C", "D"]]), 1.0, 1.0).unwrap()
    }

    /// The matrix implied by `matrix`'s variants after `edit` is applied to
    /// each of them, listed in `order`.
    fn rederived(
        matrix: &DependencyMatrix,
        order: &[String],
        edit: impl Fn(Vec<String>) -> Vec<String>,
    ) -> DependencyMatrix {
        let edited: Vec<Vec<String>> = acceptance_variants(matrix)
            .unwrap()
            .into_iter()
            .map(edit)
            .collect();
        matrix_from_variants(&edited)
            .unwrap()
            .reordered(order.to_vec())
            .unwrap()
    }

    #[test]
    fn test_variants_of_discovered_matrix_are_the_traces() {
        let t = traces(&[&["A", "B", "C"], &["A", "B", "D"]]);
        let m = discover(&t, 0.5, 1.0).unwrap();
        let variants = acceptance_variants(&m).unwrap();
        assert_eq!(variants, t);
        assert_eq!(matrix_from_variants(&variants).unwrap(), m);
    }

    #[test]
    fn test_chain_admits_empty_and_full_run() {
        let variants = acceptance_variants(&chain()).unwrap();
        assert_eq!(variants, traces(&[&[], &["A", "B", "C", "D"]]));
        assert_eq!(matrix_from_variants(&variants).unwrap(), chain());
    }

    #[test]
    fn test_existential_filters_subsets() {
        let mut m = DependencyMatrix::independent(vec!["A".into(), "B".into()]).unwrap();
        m.set("A", "B", decode("-,⇎").relation().unwrap()).unwrap();
        assert_eq!(acceptance_variants(&m).unwrap(), traces(&[&["A"], &["B"]]));

        m.set("A", "B", decode("-,∨").relation().unwrap()).unwrap();
        assert_eq!(
            acceptance_variants(&m).unwrap(),
            traces(&[&["A"], &["B"], &["A", "B"], &["B", "A"]])
        );
    }

    #[test]
    fn test_direct_successor_must_follow_immediately() {
        let mut m =
            DependencyMatrix::independent(vec!["A".into(), "B".into(), "C".into()]).unwrap();
        m.set("A", "B", decode("≺d,∧").relation().unwrap()).unwrap();
        m.set("A", "C", decode("-,∧").relation().unwrap()).unwrap();
        let variants = acceptance_variants(&m).unwrap();
        assert_eq!(variants, traces(&[&["A", "B", "C"], &["C", "A", "B"]]));
    }

    #[test]
    fn test_observed_relations() {
        let m = matrix_from_variants(&traces(&[&["A", "B", "C"], &["A", "C"], &["C", "A"]])).unwrap();
        assert_eq!(m.get("A", "B").encode(), "≺d,<=");
        assert_eq!(m.get("B", "C").encode(), "≺d,=>");
        assert_eq!(m.get("A", "C").encode(), "-,⇔");
        assert!(matrix_from_variants(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_too_many_activities() {
        let names: Vec<String> = (0..=MAX_VARIANT_ACTIVITIES).map(|i| format!("T{i}")).collect();
        let m = DependencyMatrix::independent(names).unwrap();
        assert!(matches!(
            acceptance_variants(&m),
            Err(DependencyError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_delete_agrees_with_variants() {
        let m = chain();
        let out = apply_operation("delete", &m, &[], json!({"activity": "B"})).unwrap();
        let expected = rederived(&m, out.matrix.activities(), |v| {
            v.into_iter().filter(|a| a != "B").collect()
        });
        assert_eq!(out.matrix, expected);
    }

    #[test]
    fn test_skip_agrees_with_variants() {
        let m = chain();
        let out = apply_operation("skip", &m, &[], json!({"activity": "C"})).unwrap();
        let expected = rederived(&m, out.matrix.activities(), |v| {
            v.into_iter().filter(|a| a != "C").collect()
        });
        assert_eq!(out.matrix, expected);
    }

    #[test]
    fn test_swap_agrees_with_variants() {
        let m = chain();
        let out = apply_operation("swap", &m, &[], json!({"activity1": "B", "activity2": "C"})).unwrap();
        let expected = rederived(&m, out.matrix.activities(), |v| {
            v.into_iter()
                .map(|a| match a.as_str() {
                    "B" => "C".to_string(),
                    "C" => "B".to_string(),
                    _ => a,
                })
                .collect()
        });
        assert_eq!(out.matrix, expected);
    }

    #[test]
    fn test_replace_agrees_with_variants() {
        let m = chain();
        let out = apply_operation(
            "replace",
            &m,
            &[],
            json!({"old_activity": "B", "new_activity": "Review"}),
        )
        .unwrap();
        let expected = rederived(&m, out.matrix.activities(), |v| {
            v.into_iter()
                .map(|a| if a == "B" { "Review".to_string() } else { a })
                .collect()
        });
        assert_eq!(out.matrix, expected);
    }
}
