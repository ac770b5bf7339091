//! Lock policy and the lock-aware working copy used by edit operations.

use crate::matrix::DependencyMatrix;
use crate::notation::{Cell, Existential, Relation, Temporal};
use crate::types::{DependencyError, DependencyResult, Lock, SubRelation, SuppressedChange};

/// The locks supplied with one edit operation.
#[derive(Debug, Clone, Default)]
pub struct LockPolicy {
    locks: Vec<Lock>,
}

impl LockPolicy {
    /// Build a policy, rejecting locks that name activities not in `matrix`.
    pub fn new(locks: &[Lock], matrix: &DependencyMatrix) -> DependencyResult<Self> {
        for lock in locks {
            matrix.require(&lock.from)?;
            matrix.require(&lock.to)?;
        }
        Ok(Self {
            locks: locks.to_vec(),
        })
    }

    fn on_pair<'a>(&'a self, a: &'a str, b: &'a str) -> impl Iterator<Item = &'a Lock> + 'a {
        self.locks
            .iter()
            .filter(move |l| (l.from == a && l.to == b) || (l.from == b && l.to == a))
    }

    pub fn is_locked(&self, a: &str, b: &str, part: SubRelation) -> bool {
        self.on_pair(a, b).any(|l| match part {
            SubRelation::Temporal => l.temporal,
            SubRelation::Existential => l.existential,
        })
    }

    /// Existential locks that would be violated if `activity` disappeared.
    pub fn existence_locks(&self, activity: &str) -> Vec<&Lock> {
        self.locks
            .iter()
            .filter(|l| l.existential && l.touches(activity))
            .collect()
    }
}

/// A working copy of a matrix where every cell write is checked against a
/// [`LockPolicy`].
///
/// Writes that lock rules block are recorded instead of applied. Calling
/// [`finish`](Draft::finish) yields the new matrix, or `LockConflict` when the
/// operation tried to change something and nothing got through.
#[derive(Debug)]
pub struct Draft<'p> {
    matrix: DependencyMatrix,
    policy: &'p LockPolicy,
    suppressed: Vec<SuppressedChange>,
    applied: usize,
}

impl<'p> Draft<'p> {
    pub fn new(source: &DependencyMatrix, policy: &'p LockPolicy) -> Self {
        Self {
            matrix: source.clone(),
            policy,
            suppressed: Vec::new(),
            applied: 0,
        }
    }

    pub fn matrix(&self) -> &DependencyMatrix {
        &self.matrix
    }

    /// Write both sub-relations of `(from, to)`, each subject to its lock.
    pub fn write(&mut self, from: &str, to: &str, relation: Relation) -> DependencyResult<()> {
        self.write_temporal(from, to, relation.temporal)?;
        self.write_existential(from, to, relation.existential)
    }

    pub fn write_temporal(&mut self, from: &str, to: &str, temporal: Temporal) -> DependencyResult<()> {
        let current = self.matrix.get(from, to);
        let kept = current.relation().unwrap_or_default();
        if current.relation().is_some() && kept.temporal == temporal {
            return Ok(());
        }
        let wanted = Relation::new(temporal, kept.existential);
        self.commit(from, to, SubRelation::Temporal, kept, wanted, current.relation().is_none())
    }

    pub fn write_existential(
        &mut self,
        from: &str,
        to: &str,
        existential: Existential,
    ) -> DependencyResult<()> {
        let current = self.matrix.get(from, to);
        let kept = current.relation().unwrap_or_default();
        if current.relation().is_some() && kept.existential == existential {
            return Ok(());
        }
        let wanted = Relation::new(kept.temporal, existential);
        self.commit(from, to, SubRelation::Existential, kept, wanted, current.relation().is_none())
    }

    fn commit(
        &mut self,
        from: &str,
        to: &str,
        part: SubRelation,
        kept: Relation,
        wanted: Relation,
        was_absent: bool,
    ) -> DependencyResult<()> {
        if self.policy.is_locked(from, to, part) && !(was_absent && kept == wanted) {
            tracing::debug!(from, to, ?part, "Write blocked by lock");
            self.suppressed.push(SuppressedChange {
                from: from.to_string(),
                to: to.to_string(),
                part,
                kept: if was_absent { String::new() } else { kept.encode() },
                wanted: wanted.encode(),
            });
            return Ok(());
        }
        self.matrix.set(from, to, wanted)?;
        self.applied += 1;
        Ok(())
    }

    /// Make `(from, to)` absent. Blocked when either part is locked.
    pub fn clear(&mut self, from: &str, to: &str) -> DependencyResult<()> {
        let Cell::Present(kept) = self.matrix.get(from, to) else {
            return Ok(());
        };
        let locked: Vec<SubRelation> = [SubRelation::Temporal, SubRelation::Existential]
            .into_iter()
            .filter(|part| self.policy.is_locked(from, to, *part))
            .collect();
        if locked.is_empty() {
            self.matrix.clear(from, to)?;
            self.applied += 1;
            return Ok(());
        }
        for part in locked {
            self.suppressed.push(SuppressedChange {
                from: from.to_string(),
                to: to.to_string(),
                part,
                kept: kept.encode(),
                wanted: String::new(),
            });
        }
        Ok(())
    }

    /// Remove an activity outright. Refused when an existential lock touches it.
    pub fn remove_activity(&mut self, activity: &str) -> DependencyResult<()> {
        self.matrix.require(activity)?;
        let locks = self.policy.existence_locks(activity);
        if !locks.is_empty() {
            let suppressed = locks
                .iter()
                .map(|l| {
                    let kept = self.matrix.get(&l.from, &l.to).encode();
                    SuppressedChange {
                        from: l.from.clone(),
                        to: l.to.clone(),
                        part: SubRelation::Existential,
                        kept,
                        wanted: String::new(),
                    }
                })
                .collect();
            return Err(DependencyError::LockConflict { suppressed });
        }
        self.matrix = self.matrix.without_activity(activity)?;
        self.applied += 1;
        Ok(())
    }

    /// Replace the working matrix with a structural rewrite (re-keying,
    /// permutation, added activity). Not subject to locks.
    pub fn restructure(&mut self, next: DependencyMatrix) {
        if next != self.matrix {
            self.applied += 1;
        }
        self.matrix = next;
    }

    /// Close the draft.
    pub fn finish(self) -> DependencyResult<(DependencyMatrix, Vec<SuppressedChange>)> {
        if self.applied == 0 && !self.suppressed.is_empty() {
            return Err(DependencyError::LockConflict {
                suppressed: self.suppressed,
            });
        }
        self.matrix.check_invariants()?;
        Ok((self.matrix, self.suppressed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notation::{decode, Adjacency};

    fn matrix() -> DependencyMatrix {
        let mut m = DependencyMatrix::independent(vec!["A".into(), "B".into(), "C".into()]).unwrap();
        m.set("A", "B", decode("≺d,⇔").relation().unwrap()).unwrap();
        m
    }

    #[test]
    fn test_unknown_activity_in_lock() {
        let m = matrix();
        let err = LockPolicy::new(&[Lock::new("A", "Z", true, false)], &m).unwrap_err();
        assert!(matches!(err, DependencyError::UnknownActivity(ref a) if a == "Z"));
    }

    #[test]
    fn test_lock_guards_both_halves() {
        let m = matrix();
        let policy = LockPolicy::new(&[Lock::new("A", "B", true, false)], &m).unwrap();
        assert!(policy.is_locked("B", "A", SubRelation::Temporal));
        assert!(!policy.is_locked("B", "A", SubRelation::Existential));
        assert!(!policy.is_locked("A", "C", SubRelation::Temporal));
    }

    #[test]
    fn test_partial_write_keeps_unlocked_part() {
        let m = matrix();
        let policy = LockPolicy::new(&[Lock::new("B", "A", true, false)], &m).unwrap();
        let mut draft = Draft::new(&m, &policy);
        draft.write("A", "B", Relation::INDEPENDENT).unwrap();
        let (next, suppressed) = draft.finish().unwrap();
        assert_eq!(next.get("A", "B").encode(), "≺d,-");
        assert_eq!(suppressed.len(), 1);
        assert_eq!(suppressed[0].part, SubRelation::Temporal);
        assert_eq!(suppressed[0].kept, "≺d,⇔");
        assert_eq!(m.get("A", "B").encode(), "≺d,⇔", "source untouched");
    }

    #[test]
    fn test_fully_blocked_is_conflict() {
        let m = matrix();
        let policy = LockPolicy::new(&[Lock::new("A", "B", true, true)], &m).unwrap();
        let mut draft = Draft::new(&m, &policy);
        draft
            .write("A", "B", Relation::temporal(Temporal::After(Adjacency::Eventual)))
            .unwrap();
        assert!(matches!(
            draft.finish(),
            Err(DependencyError::LockConflict { ref suppressed }) if suppressed.len() == 2
        ));
    }

    #[test]
    fn test_no_op_write_is_not_conflict() {
        let m = matrix();
        let policy = LockPolicy::new(&[Lock::new("A", "B", true, true)], &m).unwrap();
        let mut draft = Draft::new(&m, &policy);
        draft.write("A", "B", decode("≺d,⇔").relation().unwrap()).unwrap();
        let (next, suppressed) = draft.finish().unwrap();
        assert_eq!(next, m);
        assert!(suppressed.is_empty());
    }

    #[test]
    fn test_existential_lock_blocks_removal() {
        let m = matrix();
        let policy = LockPolicy::new(&[Lock::new("C", "A", false, true)], &m).unwrap();
        let mut draft = Draft::new(&m, &policy);
        assert!(matches!(
            draft.remove_activity("A"),
            Err(DependencyError::LockConflict { .. })
        ));
        draft.remove_activity("B").unwrap();
        let (next, _) = draft.finish().unwrap();
        assert!(!next.contains("B"));
    }
}
