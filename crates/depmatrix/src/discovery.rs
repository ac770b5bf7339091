//! Dependency discovery from execution traces.
//!
//! Temporal frequencies are taken over the traces that contain both
//! activities of a pair: in such a trace `a` is before `b` when the first
//! occurrence of `a` precedes the first occurrence of `b`, and directly
//! before when some occurrence of `a` is immediately followed by `b`.
//!
//! Existential support for an implication is the share of traces containing
//! the antecedent that also contain the consequent; symmetric relations are
//! measured over the traces containing either activity (see
//! `ExistentialCounts::support`).

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::matrix::DependencyMatrix;
use crate::notation::{Adjacency, Existential, Relation, Temporal};
use crate::traces::normalize_traces;
use crate::types::{DependencyResult, Thresholds};

/// Precedence when several existential relations satisfy the threshold.
pub(crate) const EXISTENTIAL_PRECEDENCE: [Existential; 7] = [
    Existential::Equivalence,
    Existential::NegatedEquivalence,
    Existential::Implies,
    Existential::ImpliedBy,
    Existential::And,
    Existential::Nand,
    Existential::Or,
];

/// Discover the dependency matrix for `traces`.
pub fn discover(
    traces: &[Vec<String>],
    temporal_threshold: f64,
    existential_threshold: f64,
) -> DependencyResult<DependencyMatrix> {
    let thresholds = Thresholds::new(temporal_threshold, existential_threshold)?;
    discover_with(traces, thresholds)
}

/// Discover with already validated thresholds.
pub fn discover_with(
    traces: &[Vec<String>],
    thresholds: Thresholds,
) -> DependencyResult<DependencyMatrix> {
    let traces = normalize_traces(traces);
    let activities: Vec<String> = traces
        .iter()
        .flatten()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    if activities.is_empty() {
        tracing::info!("No activities in traces, producing empty matrix");
        return DependencyMatrix::new(Vec::new());
    }

    let index: HashMap<&str, usize> = activities
        .iter()
        .enumerate()
        .map(|(i, a)| (a.as_str(), i))
        .collect();
    let profiles: Vec<TraceProfile> = traces
        .iter()
        .map(|t| TraceProfile::build(t, &index, activities.len()))
        .collect();

    let mut matrix = DependencyMatrix::independent(activities.clone())?;
    for a in 0..activities.len() {
        for b in (a + 1)..activities.len() {
            let temporal = select_temporal(&TemporalCounts::tally(&profiles, a, b), thresholds.temporal);
            let existential =
                select_existential(&ExistentialCounts::tally(&profiles, a, b), thresholds.existential);
            matrix.set(&activities[a], &activities[b], Relation::new(temporal, existential))?;
        }
    }

    tracing::info!(
        activities = activities.len(),
        traces = traces.len(),
        temporal_threshold = thresholds.temporal,
        existential_threshold = thresholds.existential,
        "Discovered dependency matrix"
    );
    Ok(matrix)
}

/// Per-trace facts needed for every pair.
struct TraceProfile {
    first: Vec<Option<usize>>,
    follows: HashSet<(usize, usize)>,
}

impl TraceProfile {
    fn build(trace: &[String], index: &HashMap<&str, usize>, n: usize) -> Self {
        let ids: Vec<usize> = trace
            .iter()
            .filter_map(|a| index.get(a.as_str()).copied())
            .collect();
        let mut first = vec![None; n];
        for (pos, &id) in ids.iter().enumerate() {
            first[id].get_or_insert(pos);
        }
        let follows = ids.windows(2).map(|w| (w[0], w[1])).collect();
        Self { first, follows }
    }

    fn contains(&self, id: usize) -> bool {
        self.first[id].is_some()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct TemporalCounts {
    together: usize,
    before: usize,
    direct_before: usize,
    after: usize,
    direct_after: usize,
}

impl TemporalCounts {
    fn tally(profiles: &[TraceProfile], a: usize, b: usize) -> Self {
        let mut counts = Self::default();
        for p in profiles {
            let (Some(pa), Some(pb)) = (p.first[a], p.first[b]) else {
                continue;
            };
            counts.together += 1;
            if pa < pb {
                counts.before += 1;
                if p.follows.contains(&(a, b)) {
                    counts.direct_before += 1;
                }
            } else {
                counts.after += 1;
                if p.follows.contains(&(b, a)) {
                    counts.direct_after += 1;
                }
            }
        }
        counts
    }
}

/// A direction that passed the threshold.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    adjacency: Adjacency,
    ordering: f64,
    direct: f64,
}

fn candidate(ordered: usize, direct: usize, together: usize, threshold: f64) -> Option<Candidate> {
    let ordering = ordered as f64 / together as f64;
    let direct = direct as f64 / together as f64;
    if ordered == 0 || ordering < threshold {
        return None;
    }
    let adjacency = if direct > 0.0 && direct >= threshold {
        Adjacency::Direct
    } else {
        Adjacency::Eventual
    };
    Some(Candidate {
        adjacency,
        ordering,
        direct,
    })
}

fn select_temporal(counts: &TemporalCounts, threshold: f64) -> Temporal {
    if counts.together == 0 {
        return Temporal::Independent;
    }
    let forward = candidate(counts.before, counts.direct_before, counts.together, threshold);
    let backward = candidate(counts.after, counts.direct_after, counts.together, threshold);
    match (forward, backward) {
        (None, None) => Temporal::Independent,
        (Some(f), None) => Temporal::Before(f.adjacency),
        (None, Some(b)) => Temporal::After(b.adjacency),
        (Some(f), Some(b)) => {
            // Stronger ordering wins; ties go to the more often adjacent side.
            match (f.ordering, f.direct).partial_cmp(&(b.ordering, b.direct)) {
                Some(std::cmp::Ordering::Greater) => Temporal::Before(f.adjacency),
                Some(std::cmp::Ordering::Less) => Temporal::After(b.adjacency),
                _ => Temporal::Independent,
            }
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct ExistentialCounts {
    total: usize,
    both: usize,
    only_a: usize,
    only_b: usize,
    neither: usize,
}

impl ExistentialCounts {
    fn tally(profiles: &[TraceProfile], a: usize, b: usize) -> Self {
        let mut counts = Self {
            total: profiles.len(),
            ..Self::default()
        };
        for p in profiles {
            match (p.contains(a), p.contains(b)) {
                (true, true) => counts.both += 1,
                (true, false) => counts.only_a += 1,
                (false, true) => counts.only_b += 1,
                (false, false) => counts.neither += 1,
            }
        }
        counts
    }

    /// Support for `a relation b`.
    ///
    /// An implication is measured over the traces that contain its
    /// antecedent and holds vacuously when the antecedent never occurs.
    /// Equivalence needs both implications. The remaining symmetric relations
    /// are measured over the traces containing `a` or `b`, except `∨`, which
    /// is only violated by traces lacking both and so is measured over all.
    fn support(&self, relation: Existential) -> f64 {
        let either = self.both + self.only_a + self.only_b;
        match relation {
            Existential::Independent => 0.0,
            Existential::Implies => ratio(self.both, self.both + self.only_a),
            Existential::ImpliedBy => ratio(self.both, self.both + self.only_b),
            Existential::Equivalence => self
                .support(Existential::Implies)
                .min(self.support(Existential::ImpliedBy)),
            Existential::NegatedEquivalence | Existential::Nand => {
                ratio(self.only_a + self.only_b, either)
            }
            Existential::And => ratio(self.both, either),
            Existential::Or => ratio(self.total - self.neither, self.total),
        }
    }
}

/// `hits / over`, vacuously 1 when there is nothing to measure.
fn ratio(hits: usize, over: usize) -> f64 {
    if over == 0 {
        1.0
    } else {
        hits as f64 / over as f64
    }
}

fn select_existential(counts: &ExistentialCounts, threshold: f64) -> Existential {
    let passes = |support: f64| support > 0.0 && support >= threshold;
    EXISTENTIAL_PRECEDENCE
        .into_iter()
        .find(|relation| passes(counts.support(*relation)))
        .unwrap_or(Existential::Independent)
}
