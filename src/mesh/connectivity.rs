//! Derivation of edges and face-face adjacency from face connectivity.
//!
//! Both derivations walk the same cyclic local-edge enumeration: the
//! edge at local position `j` connects local vertices `j-1` and `j`
//! (wrapping), canonicalized to ascending node order so the same edge
//! is recognized regardless of traversal direction.

use super::{Edge, Face, FaceNeighbors, IndexInt, NO_NEIGHBOR, TRIANGLE_VERTICES};
use hashbrown::HashMap;
use itertools::Itertools;

/// Canonical edge at local position `j` of `face` (cyclic, ascending).
#[inline]
pub(crate) fn local_edge(face: &Face, j: usize) -> Edge {
    let a = face[(j + TRIANGLE_VERTICES - 1) % TRIANGLE_VERTICES];
    let b = face[j];
    if a <= b { [a, b] } else { [b, a] }
}

/// All unique edges defined by the faces.
///
/// Output order is unspecified (set semantics); callers must not rely
/// on it tracking face traversal order.
pub fn build_edges(faces: &[Face]) -> Vec<Edge> {
    faces
        .iter()
        .flat_map(|face| (0..TRIANGLE_VERTICES).map(move |j| local_edge(face, j)))
        .unique()
        .collect()
}

/// The neighbor of each face across each of its local edges.
///
/// Maintains a working map from canonical edge to the
/// `(face, local position)` that last produced it: the second face to
/// touch an edge pairs up with the pending one and both adjacency
/// slots are set; edges touched only once stay at [`NO_NEIGHBOR`].
///
/// Non-manifold input (an edge shared by three or more faces) is not
/// validated; the last writer wins.
pub fn build_face_face_connectivity(faces: &[Face]) -> Vec<FaceNeighbors> {
    let mut face_face = vec![[NO_NEIGHBOR; TRIANGLE_VERTICES]; faces.len()];
    let mut pending: HashMap<Edge, (usize, usize)> = HashMap::new();
    for (i, face) in faces.iter().enumerate() {
        for j in 0..TRIANGLE_VERTICES {
            let edge = local_edge(face, j);
            if let Some((other, slot)) = pending.remove(&edge) {
                face_face[i][j] = other as IndexInt;
                face_face[other][slot] = i as IndexInt;
            } else {
                pending.insert(edge, (i, j));
            }
        }
    }
    face_face
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Unit square split along the (0, 2) diagonal.
    fn split_quad() -> Vec<Face> {
        vec![[0, 1, 2], [0, 2, 3]]
    }

    #[test]
    fn split_quad_has_five_unique_edges() {
        let mut edges = build_edges(&split_quad());
        edges.sort();
        assert_eq!(edges, vec![[0, 1], [0, 2], [0, 3], [1, 2], [2, 3]]);
    }

    #[test]
    fn split_quad_neighbors_across_diagonal() {
        let face_face = build_face_face_connectivity(&split_quad());
        // the shared (0,2) diagonal is local edge 0 of face 0 and local
        // edge 1 of face 1; everything else is boundary
        assert_eq!(face_face[0], [1, NO_NEIGHBOR, NO_NEIGHBOR]);
        assert_eq!(face_face[1], [NO_NEIGHBOR, 0, NO_NEIGHBOR]);
    }

    #[test]
    fn single_face_is_all_boundary() {
        let face_face = build_face_face_connectivity(&[[0, 1, 2]]);
        assert_eq!(face_face, vec![[NO_NEIGHBOR; 3]]);
    }

    #[test]
    fn edges_are_deduplicated_and_canonical() {
        // both faces traverse the shared edge, in opposite directions
        let edges = build_edges(&split_quad());
        assert_eq!(edges.len(), 5);
        for [a, b] in edges {
            assert!(a <= b);
        }
    }

    #[test]
    fn non_manifold_edge_last_writer_wins() {
        // three faces all share edge (0,1); the third occurrence
        // re-pends the edge rather than erroring
        let faces = vec![[0, 1, 2], [0, 1, 3], [0, 1, 4]];
        let face_face = build_face_face_connectivity(&faces);
        assert_eq!(face_face[0][1], 1);
        assert_eq!(face_face[1][1], 0);
        assert_eq!(face_face[2], [NO_NEIGHBOR; 3]);
    }
}
