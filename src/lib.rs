//! # ugrid
//!
//! ugrid is a Rust library for working with unstructured 2-D model
//! grids (triangular meshes) and the data fields attached to their
//! elements, following the UGRID conventions for unstructured-grid
//! netCDF data.
//!
//! ## Features
//! - [`Mesh`](mesh::Mesh): in-memory model of nodes, edges, faces,
//!   face-face adjacency, and name-keyed data fields, with the shape
//!   and cross-reference invariants validated at construction.
//! - Connectivity derivation: edges and face-neighbor adjacency built
//!   from the face set when a file does not supply them.
//! - Convention marshalling: table-driven load/save of the UGRID
//!   mesh-topology layout through the [`Dataset`](io::Dataset) trait,
//!   including index-base normalization and flag-value handling.
//! - Point location: a simple linear-scan "which face contains P"
//!   query.
//!
//! ## Concurrency
//! Everything is single-threaded and synchronous. The mesh is not
//! thread-safe by contract; callers needing concurrent access must
//! serialize externally.
//!
//! ## Usage
//! ```rust
//! # fn try_main() -> Result<(), ugrid::mesh_error::UgridError> {
//! use ugrid::prelude::*;
//!
//! let mut mesh = Mesh::builder(vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]])
//!     .faces(vec![[0, 1, 2], [0, 2, 3]])
//!     .build()?;
//! mesh.build_edges()?;
//! mesh.build_face_face_connectivity()?;
//!
//! let mut dataset = MemoryDataset::new();
//! UgridWriter.save(&mesh, &mut dataset)?;
//! let reloaded = UgridReader.load(&dataset, None)?;
//! assert_eq!(reloaded.num_faces(), 2);
//! # Ok(())
//! # }
//! # try_main().unwrap();
//! ```

pub mod data;
pub mod io;
pub mod mesh;
pub mod mesh_error;

/// A convenient prelude to import the most-used types:
pub mod prelude {
    pub use crate::data::{AttrValue, Attributes, DataField, Location};
    pub use crate::io::memory::MemoryDataset;
    pub use crate::io::ugrid::{UgridReader, UgridWriter, find_mesh_names, is_valid_mesh};
    pub use crate::io::{Array, Dataset, Variable};
    pub use crate::mesh::{
        Edge, Face, FaceNeighbors, IndexInt, Mesh, MeshBuilder, NO_NEIGHBOR, Node,
        TRIANGLE_VERTICES,
    };
    pub use crate::mesh_error::UgridError;
}
