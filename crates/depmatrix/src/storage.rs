//! JSON matrix document reader/writer.
//!
//! ```json
//! { "activities": ["A", "B"], "matrix": { "A": { "B": "≺d,⇔" }, "B": { "A": "≻d,⇔" } } }
//! ```

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::matrix::DependencyMatrix;
use crate::notation::{decode, Cell};
use crate::types::{DependencyError, DependencyResult};

/// The serialized form of a [`DependencyMatrix`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixDocument {
    pub activities: Vec<String>,
    #[serde(default)]
    pub matrix: BTreeMap<String, BTreeMap<String, String>>,
}

impl From<DependencyMatrix> for MatrixDocument {
    fn from(matrix: DependencyMatrix) -> Self {
        let mut cells: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        for (from, to, relation) in matrix.pairs() {
            cells
                .entry(from.to_string())
                .or_default()
                .insert(to.to_string(), relation.encode());
        }
        Self {
            activities: matrix.activities().to_vec(),
            matrix: cells,
        }
    }
}

impl TryFrom<MatrixDocument> for DependencyMatrix {
    type Error = DependencyError;

    fn try_from(doc: MatrixDocument) -> DependencyResult<Self> {
        let mut matrix = DependencyMatrix::new(doc.activities)
            .map_err(|e| DependencyError::InputError(e.to_string()))?;

        for (from, row) in &doc.matrix {
            if !matrix.contains(from) {
                return Err(DependencyError::InputError(format!(
                    "Matrix row '{from}' is not a listed activity"
                )));
            }
            for (to, text) in row {
                if !matrix.contains(to) {
                    return Err(DependencyError::InputError(format!(
                        "Matrix column '{to}' is not a listed activity"
                    )));
                }
                let relation = match decode(text) {
                    Cell::Present(relation) => relation,
                    Cell::Absent => {
                        if !text.trim().is_empty() {
                            tracing::warn!(from = %from, to = %to, cell = %text, "Skipping malformed cell");
                        }
                        continue;
                    }
                };
                if from == to {
                    tracing::warn!(activity = %from, "Ignoring self dependency");
                    continue;
                }
                // Anything already stored here was written by the partner half.
                if let Cell::Present(existing) = matrix.get(from, to) {
                    if existing != relation {
                        return Err(DependencyError::InputError(format!(
                            "Cells ({from}, {to}) = {relation} and ({to}, {from}) = {} contradict each other",
                            existing.inverse()
                        )));
                    }
                    continue;
                }
                matrix.set(from, to, relation)?;
            }
        }
        Ok(matrix)
    }
}

/// Encode a matrix as a JSON document.
pub fn serialize_matrix(matrix: &DependencyMatrix) -> DependencyResult<String> {
    Ok(serde_json::to_string_pretty(&MatrixDocument::from(
        matrix.clone(),
    ))?)
}

/// Decode a JSON document produced by [`serialize_matrix`] or by hand.
pub fn deserialize_matrix(text: &str) -> DependencyResult<DependencyMatrix> {
    let doc: MatrixDocument = serde_json::from_str(text)
        .map_err(|e| DependencyError::InputError(format!("Invalid matrix document: {e}")))?;
    DependencyMatrix::try_from(doc)
}

/// Writer for matrix documents.
pub struct MatrixWriter;

/// Reader for matrix documents.
pub struct MatrixReader;

impl MatrixWriter {
    /// Write a matrix to a file, creating parent directories.
    pub fn write_to_file(matrix: &DependencyMatrix, path: &Path) -> DependencyResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::File::create(path)?;
        Self::write_to(matrix, &mut file)
    }

    /// Write a matrix to any writer.
    pub fn write_to<W: Write>(matrix: &DependencyMatrix, writer: &mut W) -> DependencyResult<()> {
        let text = serialize_matrix(matrix)?;
        writer.write_all(text.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

impl MatrixReader {
    /// Read a matrix from a file.
    pub fn read_from_file(path: &Path) -> DependencyResult<DependencyMatrix> {
        let mut file = std::fs::File::open(path)?;
        Self::read_from(&mut file)
    }

    /// Read a matrix from any reader.
    pub fn read_from<R: Read>(reader: &mut R) -> DependencyResult<DependencyMatrix> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        deserialize_matrix(&text)
    }
}
