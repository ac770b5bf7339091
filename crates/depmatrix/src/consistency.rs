//! Contradiction checks used when an operation installs new dependencies.

use std::collections::HashMap;

use crate::matrix::DependencyMatrix;
use crate::notation::{Adjacency, Existential, Temporal};

/// Find a chain of "before" relations that leaves `activity` and returns to it.
pub fn temporal_cycle_through(matrix: &DependencyMatrix, activity: &str) -> Option<Vec<String>> {
    let successors = |node: &str| -> Vec<String> {
        matrix
            .activities()
            .iter()
            .filter(|other| matches!(matrix.relation(node, other).temporal, Temporal::Before(_)))
            .cloned()
            .collect()
    };

    let mut path = vec![activity.to_string()];
    let mut visited = vec![activity.to_string()];
    let mut frontier = vec![successors(activity)];
    while let Some(next) = frontier.last_mut() {
        let Some(node) = next.pop() else {
            frontier.pop();
            path.pop();
            continue;
        };
        if node == activity {
            path.push(node);
            return Some(path);
        }
        if visited.contains(&node) {
            continue;
        }
        visited.push(node.clone());
        frontier.push(successors(&node));
        path.push(node);
    }
    None
}

/// Two activities placed directly before (or directly after) `activity`
/// that are allowed to occur together.
pub fn direct_neighbour_conflict(
    matrix: &DependencyMatrix,
    activity: &str,
) -> Option<(String, String)> {
    let mut predecessors = Vec::new();
    let mut successors = Vec::new();
    for other in matrix.activities() {
        match matrix.relation(activity, other).temporal {
            Temporal::After(Adjacency::Direct) => predecessors.push(other),
            Temporal::Before(Adjacency::Direct) => successors.push(other),
            _ => {}
        }
    }
    for group in [predecessors, successors] {
        for (i, a) in group.iter().enumerate() {
            for b in &group[i + 1..] {
                let exclusive = matches!(
                    matrix.relation(a, b).existential,
                    Existential::Nand | Existential::NegatedEquivalence
                );
                if !exclusive {
                    return Some((a.to_string(), b.to_string()));
                }
            }
        }
    }
    None
}

/// Whether some choice of present/absent activities satisfies every
/// existential relation in the matrix.
///
/// Every pairwise boolean constraint fits in two-literal clauses, so this is
/// a 2-SAT instance solved through strongly connected components.
pub fn existential_satisfiable(matrix: &DependencyMatrix) -> bool {
    let index: HashMap<&str, usize> = matrix
        .activities()
        .iter()
        .enumerate()
        .map(|(i, a)| (a.as_str(), i))
        .collect();
    let mut sat = TwoSat::new(index.len());
    for (from, to, relation) in matrix.pairs() {
        let (Some(&a), Some(&b)) = (index.get(from), index.get(to)) else {
            continue;
        };
        // Each unordered pair once.
        if a > b {
            continue;
        }
        match relation.existential {
            Existential::Independent => {}
            Existential::Implies => sat.clause((a, false), (b, true)),
            Existential::ImpliedBy => sat.clause((a, true), (b, false)),
            Existential::Equivalence => {
                sat.clause((a, false), (b, true));
                sat.clause((a, true), (b, false));
            }
            Existential::NegatedEquivalence => {
                sat.clause((a, true), (b, true));
                sat.clause((a, false), (b, false));
            }
            Existential::And => {
                sat.clause((a, true), (a, true));
                sat.clause((b, true), (b, true));
            }
            Existential::Nand => sat.clause((a, false), (b, false)),
            Existential::Or => sat.clause((a, true), (b, true)),
        }
    }
    sat.satisfiable()
}

/// Implication graph over literals `2v` (present) and `2v + 1` (absent).
struct TwoSat {
    graph: Vec<Vec<usize>>,
}

impl TwoSat {
    fn new(vars: usize) -> Self {
        Self {
            graph: vec![Vec::new(); vars * 2],
        }
    }

    fn literal((var, present): (usize, bool)) -> usize {
        if present {
            2 * var
        } else {
            2 * var + 1
        }
    }

    /// Add `x ∨ y`.
    fn clause(&mut self, x: (usize, bool), y: (usize, bool)) {
        let (x, y) = (Self::literal(x), Self::literal(y));
        self.graph[x ^ 1].push(y);
        self.graph[y ^ 1].push(x);
    }

    fn satisfiable(&self) -> bool {
        let n = self.graph.len();
        let mut visited = vec![false; n];
        let mut order = Vec::with_capacity(n);
        for start in 0..n {
            if visited[start] {
                continue;
            }
            visited[start] = true;
            let mut stack = vec![(start, 0usize)];
            while let Some(top) = stack.last_mut() {
                let node = top.0;
                if let Some(&next) = self.graph[node].get(top.1) {
                    top.1 += 1;
                    if !visited[next] {
                        visited[next] = true;
                        stack.push((next, 0));
                    }
                } else {
                    order.push(node);
                    stack.pop();
                }
            }
        }

        let mut reverse = vec![Vec::new(); n];
        for (from, edges) in self.graph.iter().enumerate() {
            for &to in edges {
                reverse[to].push(from);
            }
        }
        let mut component = vec![usize::MAX; n];
        let mut next_id = 0;
        for &start in order.iter().rev() {
            if component[start] != usize::MAX {
                continue;
            }
            component[start] = next_id;
            let mut stack = vec![start];
            while let Some(node) = stack.pop() {
                for &prev in &reverse[node] {
                    if component[prev] == usize::MAX {
                        component[prev] = next_id;
                        stack.push(prev);
                    }
                }
            }
            next_id += 1;
        }

        (0..n / 2).all(|v| component[2 * v] != component[2 * v + 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notation::{Relation, Temporal};

    fn matrix(names: &[&str]) -> DependencyMatrix {
        DependencyMatrix::independent(names.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    #[test]
    fn test_cycle_detected() {
        let mut m = matrix(&["A", "B", "C"]);
        let before = Relation::temporal(Temporal::Before(Adjacency::Eventual));
        m.set("A", "B", before).unwrap();
        m.set("B", "C", before).unwrap();
        assert!(temporal_cycle_through(&m, "A").is_none());
        m.set("C", "A", before).unwrap();
        let cycle = temporal_cycle_through(&m, "A").unwrap();
        assert_eq!(cycle.first().map(String::as_str), Some("A"));
        assert_eq!(cycle.last().map(String::as_str), Some("A"));
        assert_eq!(cycle.len(), 4);
    }

    #[test]
    fn test_existential_contradiction() {
        let mut m = matrix(&["A", "B", "C"]);
        m.set("A", "B", Relation::existential(Existential::Equivalence)).unwrap();
        m.set("B", "C", Relation::existential(Existential::Equivalence)).unwrap();
        assert!(existential_satisfiable(&m));
        m.set("A", "C", Relation::existential(Existential::NegatedEquivalence)).unwrap();
        assert!(!existential_satisfiable(&m));
    }

    #[test]
    fn test_and_with_nand_is_contradiction() {
        let mut m = matrix(&["A", "B"]);
        m.set("A", "B", Relation::existential(Existential::And)).unwrap();
        assert!(existential_satisfiable(&m));
        let mut c = matrix(&["A", "B", "C"]);
        c.set("A", "B", Relation::existential(Existential::And)).unwrap();
        c.set("B", "C", Relation::existential(Existential::Implies)).unwrap();
        c.set("A", "C", Relation::existential(Existential::Nand)).unwrap();
        assert!(!existential_satisfiable(&c));
    }

    #[test]
    fn test_direct_neighbours() {
        let mut m = matrix(&["A", "B", "X"]);
        let direct = Relation::temporal(Temporal::Before(Adjacency::Direct));
        m.set("A", "X", direct).unwrap();
        m.set("B", "X", direct).unwrap();
        assert!(direct_neighbour_conflict(&m, "X").is_some());
        m.set("A", "B", Relation::existential(Existential::Nand)).unwrap();
        assert!(direct_neighbour_conflict(&m, "X").is_none());
    }
}
