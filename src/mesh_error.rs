//! UgridError: unified error type for the ugrid public APIs.
//!
//! Every fallible operation in this crate reports failure through this
//! enum; nothing panics on malformed input.

use crate::data::Location;
use thiserror::Error;

/// Unified error type for ugrid operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UgridError {
    /// No variable in the dataset satisfies the mesh-topology predicate.
    #[error("no standard-conforming mesh found in the dataset")]
    NoMeshFound,
    /// More than one conforming mesh exists and none was named.
    #[error("more than one mesh in the dataset ({0:?}); specify a mesh name")]
    AmbiguousMesh(Vec<String>),
    /// An explicitly requested mesh is absent or fails the predicate.
    #[error("`{0}` is not a valid mesh-topology variable in the dataset")]
    MeshNotFound(String),
    /// A required attribute is missing from a variable.
    #[error("variable `{variable}` is missing required attribute `{attribute}`")]
    MissingAttribute {
        variable: String,
        attribute: &'static str,
    },
    /// A cross-referenced variable name does not exist in the dataset.
    #[error("dataset has no variable `{0}` named by the mesh-topology variable")]
    MissingVariable(String),
    /// A coordinate variable's `standard_name` is not longitude/latitude.
    #[error(
        "coordinate variable `{variable}` has standard_name {found:?}; \
         expected \"longitude\" or \"latitude\""
    )]
    BadStandardName {
        variable: String,
        found: Option<String>,
    },
    /// A variable's array has the wrong kind or shape for its role.
    #[error("variable `{variable}`: expected {expected}")]
    BadArray {
        variable: String,
        expected: &'static str,
    },
    /// A connectivity entry references an element outside the valid range.
    #[error("{kind} entry {entry} references {value}, outside 0..{count}")]
    IndexOutOfRange {
        kind: &'static str,
        entry: usize,
        value: i64,
        count: usize,
    },
    /// Face-face adjacency rows must match the face count.
    #[error("face-face adjacency has {rows} rows for {faces} faces")]
    AdjacencyShape { rows: usize, faces: usize },
    /// Face-face adjacency must be symmetric for in-range entries.
    #[error("face {face} lists face {neighbor} as a neighbor, but not vice versa")]
    AsymmetricAdjacency { face: usize, neighbor: usize },
    /// A data field's length does not match its location's element count.
    #[error("field `{name}` on {location}s has {actual} values; expected {expected}")]
    FieldSizeMismatch {
        name: String,
        location: Location,
        expected: usize,
        actual: usize,
    },
    /// The operation needs face connectivity but the mesh has none.
    #[error("mesh has no faces")]
    NoFaces,
    /// A dimension was redeclared with a different length.
    #[error("dimension `{name}` already declared with length {existing}, requested {requested}")]
    DimensionMismatch {
        name: String,
        existing: usize,
        requested: usize,
    },
    /// Underlying I/O failure, propagated unmodified from the provider.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for UgridError {
    fn from(err: std::io::Error) -> Self {
        UgridError::Io(err.to_string())
    }
}
