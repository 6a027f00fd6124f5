//! In-memory model of an unstructured 2-D triangular grid.
//!
//! The [`Mesh`] aggregate owns the node coordinates, the (optional)
//! face/edge/boundary connectivity, the (optional) face-face adjacency,
//! and a name-keyed collection of [`DataField`]s. Its internal layout
//! mirrors the UGRID netCDF convention so marshalling stays a direct
//! mapping.
//!
//! Construction goes through [`MeshBuilder`], which validates every
//! cross-reference atomically; the setters re-validate and leave the
//! mesh untouched on error. The mesh is not thread-safe by contract:
//! callers needing concurrent access must serialize externally.

pub mod connectivity;
pub mod locate;

use crate::data::{DataField, Location};
use crate::mesh_error::UgridError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Index width used for all connectivity entries.
pub type IndexInt = i32;

/// Sentinel marking "no neighbor" in face-face adjacency.
pub const NO_NEIGHBOR: IndexInt = -1;

/// Vertices per face; only triangular faces are modeled.
pub const TRIANGLE_VERTICES: usize = 3;

/// A node position as (longitude, latitude).
pub type Node = [f64; 2];
/// An edge as a pair of node indices.
pub type Edge = [IndexInt; 2];
/// A face as a triple of node indices.
pub type Face = [IndexInt; TRIANGLE_VERTICES];
/// Per-face neighbor indices, one per local edge, [`NO_NEIGHBOR`] on boundaries.
pub type FaceNeighbors = [IndexInt; TRIANGLE_VERTICES];

/// An unstructured triangular grid and its attached data fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    nodes: Vec<Node>,
    faces: Option<Vec<Face>>,
    edges: Option<Vec<Edge>>,
    face_face: Option<Vec<FaceNeighbors>>,
    boundaries: Option<Vec<Edge>>,
    face_coordinates: Option<Vec<Node>>,
    edge_coordinates: Option<Vec<Node>>,
    boundary_coordinates: Option<Vec<Node>>,
    mesh_name: Option<String>,
    fields: BTreeMap<String, DataField>,
}

/// Builder that validates the full set of cross-references atomically.
///
/// ```rust
/// # fn try_main() -> Result<(), ugrid::mesh_error::UgridError> {
/// use ugrid::mesh::Mesh;
/// let mesh = Mesh::builder(vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]])
///     .faces(vec![[0, 1, 2]])
///     .build()?;
/// assert_eq!(mesh.num_faces(), 1);
/// # Ok(())
/// # }
/// # try_main().unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct MeshBuilder {
    nodes: Vec<Node>,
    faces: Option<Vec<Face>>,
    edges: Option<Vec<Edge>>,
    face_face: Option<Vec<FaceNeighbors>>,
    boundaries: Option<Vec<Edge>>,
    face_coordinates: Option<Vec<Node>>,
    edge_coordinates: Option<Vec<Node>>,
    boundary_coordinates: Option<Vec<Node>>,
    mesh_name: Option<String>,
}

impl MeshBuilder {
    /// Start a builder from node coordinates.
    pub fn new(nodes: Vec<Node>) -> Self {
        Self {
            nodes,
            ..Self::default()
        }
    }

    /// Replace the node coordinates.
    pub fn nodes(mut self, nodes: Vec<Node>) -> Self {
        self.nodes = nodes;
        self
    }

    /// Face-node connectivity, one node triple per face.
    pub fn faces(mut self, faces: Vec<Face>) -> Self {
        self.faces = Some(faces);
        self
    }

    /// Edge-node connectivity, one node pair per edge.
    pub fn edges(mut self, edges: Vec<Edge>) -> Self {
        self.edges = Some(edges);
        self
    }

    /// Face-face adjacency, shaped `(num_faces, 3)`.
    pub fn face_face_connectivity(mut self, face_face: Vec<FaceNeighbors>) -> Self {
        self.face_face = Some(face_face);
        self
    }

    /// Boundary-node connectivity, one node pair per boundary segment.
    pub fn boundaries(mut self, boundaries: Vec<Edge>) -> Self {
        self.boundaries = Some(boundaries);
        self
    }

    /// Representative coordinates for faces (optional UGRID role).
    pub fn face_coordinates(mut self, coords: Vec<Node>) -> Self {
        self.face_coordinates = Some(coords);
        self
    }

    /// Representative coordinates for edges (optional UGRID role).
    pub fn edge_coordinates(mut self, coords: Vec<Node>) -> Self {
        self.edge_coordinates = Some(coords);
        self
    }

    /// Representative coordinates for boundary segments (optional UGRID role).
    pub fn boundary_coordinates(mut self, coords: Vec<Node>) -> Self {
        self.boundary_coordinates = Some(coords);
        self
    }

    /// Name of the mesh-topology variable this mesh corresponds to.
    pub fn mesh_name(mut self, name: impl Into<String>) -> Self {
        self.mesh_name = Some(name.into());
        self
    }

    /// Validate all cross-references and produce the mesh.
    ///
    /// # Errors
    /// [`UgridError::IndexOutOfRange`] if any face/edge/boundary entry
    /// references a node outside `0..nodes.len()`,
    /// [`UgridError::AdjacencyShape`]/[`UgridError::AsymmetricAdjacency`]
    /// if the face-face adjacency is malformed.
    pub fn build(self) -> Result<Mesh, UgridError> {
        let num_nodes = self.nodes.len();
        if let Some(faces) = &self.faces {
            check_indices("face", faces, num_nodes)?;
        }
        if let Some(edges) = &self.edges {
            check_indices("edge", edges, num_nodes)?;
        }
        if let Some(boundaries) = &self.boundaries {
            check_indices("boundary", boundaries, num_nodes)?;
        }
        if let Some(face_face) = &self.face_face {
            check_face_face(face_face, self.faces.as_deref().unwrap_or(&[]))?;
        }
        Ok(Mesh {
            nodes: self.nodes,
            faces: self.faces,
            edges: self.edges,
            face_face: self.face_face,
            boundaries: self.boundaries,
            face_coordinates: self.face_coordinates,
            edge_coordinates: self.edge_coordinates,
            boundary_coordinates: self.boundary_coordinates,
            mesh_name: self.mesh_name,
            fields: BTreeMap::new(),
        })
    }
}

impl Mesh {
    /// A mesh with nodes only; topology can be set afterwards.
    pub fn new(nodes: Vec<Node>) -> Self {
        Self {
            nodes,
            ..Self::default()
        }
    }

    /// Start a [`MeshBuilder`] from node coordinates.
    pub fn builder(nodes: Vec<Node>) -> MeshBuilder {
        MeshBuilder::new(nodes)
    }

    /// Node coordinates, longitude in column 0, latitude in column 1.
    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Face-node connectivity, if present.
    #[inline]
    pub fn faces(&self) -> Option<&[Face]> {
        self.faces.as_deref()
    }

    /// Edge-node connectivity, if present.
    #[inline]
    pub fn edges(&self) -> Option<&[Edge]> {
        self.edges.as_deref()
    }

    /// Face-face adjacency, if present.
    #[inline]
    pub fn face_face_connectivity(&self) -> Option<&[FaceNeighbors]> {
        self.face_face.as_deref()
    }

    /// Boundary-node connectivity, if present.
    #[inline]
    pub fn boundaries(&self) -> Option<&[Edge]> {
        self.boundaries.as_deref()
    }

    /// Representative face coordinates, if present.
    #[inline]
    pub fn face_coordinates(&self) -> Option<&[Node]> {
        self.face_coordinates.as_deref()
    }

    /// Representative edge coordinates, if present.
    #[inline]
    pub fn edge_coordinates(&self) -> Option<&[Node]> {
        self.edge_coordinates.as_deref()
    }

    /// Representative boundary coordinates, if present.
    #[inline]
    pub fn boundary_coordinates(&self) -> Option<&[Node]> {
        self.boundary_coordinates.as_deref()
    }

    /// The mesh-topology variable name this mesh was loaded from, if any.
    #[inline]
    pub fn mesh_name(&self) -> Option<&str> {
        self.mesh_name.as_deref()
    }

    /// Set or replace the mesh name used when saving.
    pub fn set_mesh_name(&mut self, name: impl Into<String>) {
        self.mesh_name = Some(name.into());
    }

    /// Number of nodes.
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges; 0 when edges are absent.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.as_ref().map_or(0, Vec::len)
    }

    /// Number of faces; 0 when faces are absent.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.as_ref().map_or(0, Vec::len)
    }

    /// Vertices per face; `Some(3)` iff faces are present.
    #[inline]
    pub fn num_vertices(&self) -> Option<usize> {
        self.faces.as_ref().map(|_| TRIANGLE_VERTICES)
    }

    /// Element count for a field location.
    pub fn element_count(&self, location: Location) -> usize {
        match location {
            Location::Node => self.num_nodes(),
            Location::Edge => self.num_edges(),
            Location::Face => self.num_faces(),
        }
    }

    /// Replace the node coordinates.
    ///
    /// Existing connectivity and node-located fields are re-validated
    /// against the new node count; the mesh is unchanged on error.
    pub fn set_nodes(&mut self, nodes: Vec<Node>) -> Result<(), UgridError> {
        let count = nodes.len();
        if let Some(faces) = &self.faces {
            check_indices("face", faces, count)?;
        }
        if let Some(edges) = &self.edges {
            check_indices("edge", edges, count)?;
        }
        if let Some(boundaries) = &self.boundaries {
            check_indices("boundary", boundaries, count)?;
        }
        self.check_fields(Location::Node, count)?;
        self.nodes = nodes;
        Ok(())
    }

    /// Drop the nodes. With no nodes there can be no topology, so
    /// faces, edges, boundaries, and adjacency are dropped as well.
    pub fn clear_nodes(&mut self) {
        self.nodes.clear();
        self.faces = None;
        self.edges = None;
        self.face_face = None;
        self.boundaries = None;
    }

    /// Replace the face-node connectivity.
    ///
    /// Any existing face-face adjacency is dropped (it is derived data
    /// and no longer describes the new faces); face-located fields are
    /// re-validated. The mesh is unchanged on error.
    pub fn set_faces(&mut self, faces: Vec<Face>) -> Result<(), UgridError> {
        check_indices("face", &faces, self.nodes.len())?;
        self.check_fields(Location::Face, faces.len())?;
        self.faces = Some(faces);
        self.face_face = None;
        Ok(())
    }

    /// Replace the edge-node connectivity; unchanged on error.
    pub fn set_edges(&mut self, edges: Vec<Edge>) -> Result<(), UgridError> {
        check_indices("edge", &edges, self.nodes.len())?;
        self.check_fields(Location::Edge, edges.len())?;
        self.edges = Some(edges);
        Ok(())
    }

    /// Replace the boundary-node connectivity; unchanged on error.
    pub fn set_boundaries(&mut self, boundaries: Vec<Edge>) -> Result<(), UgridError> {
        check_indices("boundary", &boundaries, self.nodes.len())?;
        self.boundaries = Some(boundaries);
        Ok(())
    }

    /// Replace the face-face adjacency; unchanged on error.
    ///
    /// The array must have one row per face; [`NO_NEIGHBOR`] entries
    /// mark boundary edges, and every other entry must name a valid
    /// face that lists this one back across the shared edge.
    pub fn set_face_face_connectivity(
        &mut self,
        face_face: Vec<FaceNeighbors>,
    ) -> Result<(), UgridError> {
        check_face_face(&face_face, self.faces.as_deref().unwrap_or(&[]))?;
        self.face_face = Some(face_face);
        Ok(())
    }

    /// Derive the edge set from the faces, overwriting any prior edges.
    ///
    /// # Errors
    /// [`UgridError::NoFaces`] if the mesh has no face connectivity.
    pub fn build_edges(&mut self) -> Result<(), UgridError> {
        let faces = self.faces.as_deref().ok_or(UgridError::NoFaces)?;
        let edges = connectivity::build_edges(faces);
        self.check_fields(Location::Edge, edges.len())?;
        self.edges = Some(edges);
        Ok(())
    }

    /// Derive the face-face adjacency from the faces, overwriting any
    /// prior adjacency.
    ///
    /// # Errors
    /// [`UgridError::NoFaces`] if the mesh has no face connectivity.
    pub fn build_face_face_connectivity(&mut self) -> Result<(), UgridError> {
        let faces = self.faces.as_deref().ok_or(UgridError::NoFaces)?;
        self.face_face = Some(connectivity::build_face_face_connectivity(faces));
        Ok(())
    }

    /// The attached data fields, keyed by field name.
    #[inline]
    pub fn fields(&self) -> &BTreeMap<String, DataField> {
        &self.fields
    }

    /// Look up a field by name.
    #[inline]
    pub fn field(&self, name: &str) -> Option<&DataField> {
        self.fields.get(name)
    }

    /// Add (or replace) a data field.
    ///
    /// # Errors
    /// [`UgridError::FieldSizeMismatch`] if the value count does not
    /// match the element count of the field's location; the field
    /// collection is unchanged in that case.
    pub fn add_field(&mut self, field: DataField) -> Result<(), UgridError> {
        let expected = self.element_count(field.location);
        if field.values.len() != expected {
            return Err(UgridError::FieldSizeMismatch {
                name: field.name,
                location: field.location,
                expected,
                actual: field.values.len(),
            });
        }
        self.fields.insert(field.name.clone(), field);
        Ok(())
    }

    /// Remove a field by name, returning it if present.
    pub fn remove_field(&mut self, name: &str) -> Option<DataField> {
        self.fields.remove(name)
    }

    /// Check that fields on `location` still match `count` elements.
    fn check_fields(&self, location: Location, count: usize) -> Result<(), UgridError> {
        for field in self.fields.values() {
            if field.location == location && field.values.len() != count {
                return Err(UgridError::FieldSizeMismatch {
                    name: field.name.clone(),
                    location,
                    expected: count,
                    actual: field.values.len(),
                });
            }
        }
        Ok(())
    }
}

/// Every entry of `conn` must index into `0..count`.
fn check_indices<const N: usize>(
    kind: &'static str,
    conn: &[[IndexInt; N]],
    count: usize,
) -> Result<(), UgridError> {
    for (entry, indices) in conn.iter().enumerate() {
        for &value in indices {
            if value < 0 || value as usize >= count {
                return Err(UgridError::IndexOutOfRange {
                    kind,
                    entry,
                    value: value as i64,
                    count,
                });
            }
        }
    }
    Ok(())
}

/// Shape, range, and symmetry checks for face-face adjacency.
///
/// Negative entries are [`NO_NEIGHBOR`] sentinels and are skipped. A
/// non-negative entry at slot `j` of face `i` must name a valid face
/// that lists `i` back in its own slot for the shared edge, so two
/// faces that happen to mention each other across unrelated edges do
/// not pass as neighbors.
fn check_face_face(face_face: &[FaceNeighbors], faces: &[Face]) -> Result<(), UgridError> {
    if face_face.len() != faces.len() {
        return Err(UgridError::AdjacencyShape {
            rows: face_face.len(),
            faces: faces.len(),
        });
    }
    for (face, neighbors) in face_face.iter().enumerate() {
        for (slot, &value) in neighbors.iter().enumerate() {
            if value < 0 {
                continue;
            }
            let neighbor = value as usize;
            if neighbor >= faces.len() {
                return Err(UgridError::IndexOutOfRange {
                    kind: "face-face",
                    entry: face,
                    value: value as i64,
                    count: faces.len(),
                });
            }
            let edge = connectivity::local_edge(&faces[face], slot);
            let mirrored = (0..TRIANGLE_VERTICES)
                .find(|&j| connectivity::local_edge(&faces[neighbor], j) == edge)
                .map(|j| face_face[neighbor][j]);
            if mirrored != Some(face as IndexInt) {
                return Err(UgridError::AsymmetricAdjacency { face, neighbor });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataField;

    fn quad_nodes() -> Vec<Node> {
        vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]
    }

    #[test]
    fn builder_validates_face_indices() {
        let err = Mesh::builder(quad_nodes())
            .faces(vec![[0, 1, 4]])
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            UgridError::IndexOutOfRange {
                kind: "face",
                value: 4,
                ..
            }
        ));
    }

    #[test]
    fn builder_validates_adjacency_shape_and_symmetry() {
        let faces = vec![[0, 1, 2], [0, 2, 3]];
        let err = Mesh::builder(quad_nodes())
            .faces(faces.clone())
            .face_face_connectivity(vec![[NO_NEIGHBOR; 3]])
            .build()
            .unwrap_err();
        assert!(matches!(err, UgridError::AdjacencyShape { rows: 1, faces: 2 }));

        // face 0 claims face 1 as neighbor but face 1 lists nobody
        let err = Mesh::builder(quad_nodes())
            .faces(faces)
            .face_face_connectivity(vec![[-1, 1, -1], [-1, -1, -1]])
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            UgridError::AsymmetricAdjacency { face: 0, neighbor: 1 }
        ));
    }

    #[test]
    fn adjacency_neighbor_must_mirror_across_the_shared_edge() {
        // the faces mention each other, but face 1 puts face 0 in the
        // slot of its (0,3) boundary edge instead of the shared (0,2)
        // diagonal; row-membership alone must not pass as symmetry
        let err = Mesh::builder(quad_nodes())
            .faces(vec![[0, 1, 2], [0, 2, 3]])
            .face_face_connectivity(vec![[1, -1, -1], [0, -1, -1]])
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            UgridError::AsymmetricAdjacency { face: 0, neighbor: 1 }
        ));
    }

    #[test]
    fn field_size_guard_leaves_collection_unchanged() {
        let mut mesh = Mesh::builder(quad_nodes())
            .faces(vec![[0, 1, 2], [0, 2, 3]])
            .build()
            .unwrap();
        let err = mesh
            .add_field(DataField::new("depth", Location::Face, vec![1.0, 2.0, 3.0]))
            .unwrap_err();
        assert!(matches!(
            err,
            UgridError::FieldSizeMismatch {
                expected: 2,
                actual: 3,
                ..
            }
        ));
        assert!(mesh.fields().is_empty());

        mesh.add_field(DataField::new("depth", Location::Face, vec![1.0, 2.0]))
            .unwrap();
        assert_eq!(mesh.field("depth").unwrap().values, vec![1.0, 2.0]);
    }

    #[test]
    fn edge_field_without_edges_is_rejected() {
        let mut mesh = Mesh::new(quad_nodes());
        let err = mesh
            .add_field(DataField::new("flux", Location::Edge, vec![0.5]))
            .unwrap_err();
        assert!(matches!(err, UgridError::FieldSizeMismatch { expected: 0, .. }));
    }

    #[test]
    fn set_faces_drops_stale_adjacency() {
        let mut mesh = Mesh::builder(quad_nodes())
            .faces(vec![[0, 1, 2], [0, 2, 3]])
            .build()
            .unwrap();
        mesh.build_face_face_connectivity().unwrap();
        assert!(mesh.face_face_connectivity().is_some());
        mesh.set_faces(vec![[0, 1, 2]]).unwrap();
        assert!(mesh.face_face_connectivity().is_none());
    }

    #[test]
    fn clear_nodes_drops_topology() {
        let mut mesh = Mesh::builder(quad_nodes())
            .faces(vec![[0, 1, 2], [0, 2, 3]])
            .edges(vec![[0, 1]])
            .build()
            .unwrap();
        mesh.clear_nodes();
        assert_eq!(mesh.num_nodes(), 0);
        assert!(mesh.faces().is_none());
        assert!(mesh.edges().is_none());
    }

    #[test]
    fn num_vertices_requires_faces() {
        let mut mesh = Mesh::new(quad_nodes());
        assert_eq!(mesh.num_vertices(), None);
        mesh.set_faces(vec![[0, 1, 2]]).unwrap();
        assert_eq!(mesh.num_vertices(), Some(TRIANGLE_VERTICES));
    }

    #[test]
    fn setter_failure_leaves_mesh_unmodified() {
        let mut mesh = Mesh::builder(quad_nodes())
            .faces(vec![[0, 1, 2], [0, 2, 3]])
            .build()
            .unwrap();
        let before = mesh.clone();
        assert!(mesh.set_faces(vec![[0, 1, 9]]).is_err());
        assert!(mesh.set_nodes(vec![[0.0, 0.0]]).is_err());
        assert_eq!(mesh, before);
    }
}
