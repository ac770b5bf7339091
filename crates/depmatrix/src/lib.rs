//! depmatrix: dependency discovery and editing for process models.
//!
//! Discovers pairwise temporal and existential dependencies between
//! activities from execution traces, edits the resulting matrix through a
//! catalog of structural operations, and diffs two matrices. A matrix can
//! also be expanded into the process variants it accepts.

pub mod consistency;
pub mod diff;
pub mod discovery;
pub mod locks;
pub mod matrix;
pub mod notation;
pub mod operations;
pub mod storage;
pub mod traces;
pub mod types;
pub mod variants;

pub use diff::{diff, CellChange, DiffReport};
pub use discovery::{discover, discover_with};
pub use locks::{Draft, LockPolicy};
pub use matrix::DependencyMatrix;
pub use notation::{decode, encode, Adjacency, Cell, Existential, Relation, Temporal};
pub use operations::{apply, apply_operation, CollapsedGroup, EditOutcome, Operation};
pub use storage::{deserialize_matrix, serialize_matrix, MatrixDocument, MatrixReader, MatrixWriter};
pub use traces::{normalize_traces, parse_traces};
pub use types::*;
pub use variants::{acceptance_variants, matrix_from_variants, MAX_VARIANT_ACTIVITIES};
