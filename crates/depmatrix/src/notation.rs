//! Relation notation: the temporal/existential vocabulary and its two-field
//! cell encoding (`"<temporal>,<existential>"`).
//!
//! The string form only exists at the serialization boundary. Inside the
//! engine a cell is either [`Cell::Absent`] (never computed, or removed) or
//! [`Cell::Present`] carrying a [`Relation`], which may itself be independent
//! (`"-,-"`).

use std::fmt;

/// Whether an ordering admits intervening activities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Adjacency {
    Direct,
    Eventual,
}

/// Ordering of `from` relative to `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Temporal {
    #[default]
    Independent,
    Before(Adjacency),
    After(Adjacency),
}

/// Co-occurrence constraint between `from` and `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Existential {
    #[default]
    Independent,
    /// from ⇒ to
    Implies,
    /// to ⇒ from
    ImpliedBy,
    Equivalence,
    NegatedEquivalence,
    And,
    Nand,
    Or,
}

/// Coarse classification of a relation, used when deciding whether a change
/// is a refinement or a change of category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Independent,
    Temporal,
    Existential,
    Combined,
}

/// The pairwise descriptor for an ordered pair `(from, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Relation {
    pub temporal: Temporal,
    pub existential: Existential,
}

/// A matrix entry as seen from outside: absent, or a computed relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Absent,
    Present(Relation),
}

const NONE_SYMBOL: &str = "-";

impl Temporal {
    pub fn symbol(self) -> &'static str {
        match self {
            Temporal::Independent => NONE_SYMBOL,
            Temporal::Before(Adjacency::Eventual) => "≺",
            Temporal::Before(Adjacency::Direct) => "≺d",
            Temporal::After(Adjacency::Eventual) => "≻",
            Temporal::After(Adjacency::Direct) => "≻d",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "-" => Some(Temporal::Independent),
            "≺" => Some(Temporal::Before(Adjacency::Eventual)),
            "≺d" => Some(Temporal::Before(Adjacency::Direct)),
            "≻" => Some(Temporal::After(Adjacency::Eventual)),
            "≻d" => Some(Temporal::After(Adjacency::Direct)),
            _ => None,
        }
    }

    /// The same ordering seen from `to`.
    pub fn inverse(self) -> Self {
        match self {
            Temporal::Independent => Temporal::Independent,
            Temporal::Before(adj) => Temporal::After(adj),
            Temporal::After(adj) => Temporal::Before(adj),
        }
    }

    pub fn is_independent(self) -> bool {
        self == Temporal::Independent
    }

    pub fn all() -> [Temporal; 5] {
        [
            Temporal::Independent,
            Temporal::Before(Adjacency::Direct),
            Temporal::Before(Adjacency::Eventual),
            Temporal::After(Adjacency::Direct),
            Temporal::After(Adjacency::Eventual),
        ]
    }
}

impl Existential {
    pub fn symbol(self) -> &'static str {
        match self {
            Existential::Independent => NONE_SYMBOL,
            Existential::Implies => "=>",
            Existential::ImpliedBy => "<=",
            Existential::Equivalence => "⇔",
            Existential::NegatedEquivalence => "⇎",
            Existential::And => "∧",
            Existential::Nand => "⊼",
            Existential::Or => "∨",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "-" => Some(Existential::Independent),
            "=>" => Some(Existential::Implies),
            "<=" => Some(Existential::ImpliedBy),
            "⇔" => Some(Existential::Equivalence),
            "⇎" => Some(Existential::NegatedEquivalence),
            "∧" => Some(Existential::And),
            "⊼" => Some(Existential::Nand),
            "∨" => Some(Existential::Or),
            _ => None,
        }
    }

    /// The same constraint seen from `to`. Only implication has a direction.
    pub fn inverse(self) -> Self {
        match self {
            Existential::Implies => Existential::ImpliedBy,
            Existential::ImpliedBy => Existential::Implies,
            other => other,
        }
    }

    pub fn is_independent(self) -> bool {
        self == Existential::Independent
    }

    /// Truth of the constraint for one process instance.
    pub fn holds(self, from_present: bool, to_present: bool) -> bool {
        match self {
            Existential::Independent => true,
            Existential::Implies => !from_present || to_present,
            Existential::ImpliedBy => !to_present || from_present,
            Existential::Equivalence => from_present == to_present,
            Existential::NegatedEquivalence => from_present != to_present,
            Existential::And => from_present && to_present,
            Existential::Nand => !(from_present && to_present),
            Existential::Or => from_present || to_present,
        }
    }

    pub fn all() -> [Existential; 8] {
        [
            Existential::Independent,
            Existential::Implies,
            Existential::ImpliedBy,
            Existential::Equivalence,
            Existential::NegatedEquivalence,
            Existential::And,
            Existential::Nand,
            Existential::Or,
        ]
    }
}

impl Relation {
    pub const INDEPENDENT: Relation = Relation {
        temporal: Temporal::Independent,
        existential: Existential::Independent,
    };

    pub fn new(temporal: Temporal, existential: Existential) -> Self {
        Self {
            temporal,
            existential,
        }
    }

    pub fn temporal(temporal: Temporal) -> Self {
        Self::new(temporal, Existential::Independent)
    }

    pub fn existential(existential: Existential) -> Self {
        Self::new(Temporal::Independent, existential)
    }

    pub fn inverse(self) -> Self {
        Self::new(self.temporal.inverse(), self.existential.inverse())
    }

    pub fn is_independent(self) -> bool {
        self.temporal.is_independent() && self.existential.is_independent()
    }

    pub fn category(self) -> Category {
        match (self.temporal.is_independent(), self.existential.is_independent()) {
            (true, true) => Category::Independent,
            (false, true) => Category::Temporal,
            (true, false) => Category::Existential,
            (false, false) => Category::Combined,
        }
    }

    /// A change from `self` to `other` refines the relation rather than
    /// swapping one kind of constraint for another.
    pub fn is_compatible_with(self, other: Relation) -> bool {
        !matches!(
            (self.category(), other.category()),
            (Category::Temporal, Category::Existential) | (Category::Existential, Category::Temporal)
        )
    }

    pub fn encode(self) -> String {
        encode(self.temporal, self.existential)
    }

    /// Plain-language reading of the relation for the pair `(from, to)`.
    pub fn describe(self, from: &str, to: &str) -> String {
        let mut parts = Vec::new();
        match self.temporal {
            Temporal::Independent => {}
            Temporal::Before(Adjacency::Direct) => {
                parts.push(format!("{from} happens directly before {to}"))
            }
            Temporal::Before(Adjacency::Eventual) => {
                parts.push(format!("{from} happens before {to}"))
            }
            Temporal::After(Adjacency::Direct) => {
                parts.push(format!("{from} happens directly after {to}"))
            }
            Temporal::After(Adjacency::Eventual) => {
                parts.push(format!("{from} happens after {to}"))
            }
        }
        match self.existential {
            Existential::Independent => {}
            Existential::Implies => parts.push(format!("if {from} occurs, {to} must occur")),
            Existential::ImpliedBy => parts.push(format!("if {to} occurs, {from} must occur")),
            Existential::Equivalence => {
                parts.push(format!("{from} occurs if and only if {to} occurs"))
            }
            Existential::NegatedEquivalence => parts.push(format!("{from} or {to}, not both")),
            Existential::And => parts.push(format!("{from} and {to} must occur")),
            Existential::Nand => parts.push(format!("{from} and {to} cannot both occur")),
            Existential::Or => parts.push(format!("{from} or {to} must occur")),
        }
        if parts.is_empty() {
            "no constraint".to_string()
        } else {
            parts.join(", ")
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.temporal.symbol(), self.existential.symbol())
    }
}

impl Cell {
    pub fn relation(self) -> Option<Relation> {
        match self {
            Cell::Absent => None,
            Cell::Present(relation) => Some(relation),
        }
    }

    /// Present and carrying an actual constraint.
    pub fn is_constraint(self) -> bool {
        matches!(self, Cell::Present(r) if !r.is_independent())
    }

    pub fn encode(self) -> String {
        match self {
            Cell::Absent => String::new(),
            Cell::Present(relation) => relation.encode(),
        }
    }
}

/// Encode a pair of sub-relations as a cell string.
pub fn encode(temporal: Temporal, existential: Existential) -> String {
    format!("{},{}", temporal.symbol(), existential.symbol())
}

/// Decode a cell string. Empty or malformed input decodes to [`Cell::Absent`].
pub fn decode(cell: &str) -> Cell {
    let Some((temporal, existential)) = cell.trim().split_once(',') else {
        return Cell::Absent;
    };
    match (
        Temporal::from_symbol(temporal.trim()),
        Existential::from_symbol(existential.trim()),
    ) {
        (Some(t), Some(e)) => Cell::Present(Relation::new(t, e)),
        _ => Cell::Absent,
    }
}
