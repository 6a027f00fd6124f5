//! Brute-force point location over the face set.

use super::{Mesh, Node, TRIANGLE_VERTICES};

/// Crossing-number point-in-polygon test.
///
/// Points exactly on a polygon edge may land on either side; callers
/// that care about boundary points must not rely on the outcome.
fn point_in_poly(vertices: &[Node], point: Node) -> bool {
    let [x, y] = point;
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let [xi, yi] = vertices[i];
        let [xj, yj] = vertices[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

impl Mesh {
    /// Index of the face containing `point`, or `None` if the point is
    /// outside the mesh (or the mesh has no faces).
    ///
    /// Linear scan in face storage order, O(num_faces) per query; no
    /// spatial index is built. When a point lies exactly on a shared
    /// edge, whichever face is tested first wins.
    pub fn locate_face(&self, point: Node) -> Option<usize> {
        let faces = self.faces()?;
        let nodes = self.nodes();
        let mut vertices = [[0.0f64; 2]; TRIANGLE_VERTICES];
        for (i, face) in faces.iter().enumerate() {
            for (v, &n) in vertices.iter_mut().zip(face.iter()) {
                *v = nodes[n as usize];
            }
            if point_in_poly(&vertices, point) {
                return Some(i);
            }
        }
        None
    }
}
