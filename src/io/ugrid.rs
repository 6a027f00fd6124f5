//! UGRID convention marshalling.
//!
//! Implements the mesh-topology subset of the UGRID conventions for
//! unstructured-grid netCDF data
//! (<https://github.com/ugrid-conventions/ugrid-conventions>):
//! resolution of mesh-topology variables, loading a [`Mesh`] and its
//! attached data fields from a [`Dataset`], and writing the inverse
//! layout back out.
//!
//! # Supported subset
//! - 2-D topology (`topology_dimension == 2`), triangular faces.
//! - Connectivity stored `(count, arity)` or transposed `(arity, count)`.
//! - `start_index` of 0 or 1 (or greater), with a single `flag_values`
//!   sentinel.
//!
//! # Limitations
//! - Only one flag value per connectivity variable is honored.
//! - Optional face/edge/boundary coordinate arrays are read but not
//!   written back.

use crate::data::{DataField, Location};
use crate::io::{Array, Dataset, Variable};
use crate::mesh::{
    Edge, Face, FaceNeighbors, IndexInt, Mesh, NO_NEIGHBOR, Node, TRIANGLE_VERTICES, connectivity,
};
use crate::mesh_error::UgridError;

const MESH_TOPOLOGY: &str = "mesh_topology";
const TOPOLOGY_DIMENSION: i64 = 2;

/// Where a loaded coordinate array lands in the mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CoordTarget {
    Nodes,
    FaceCoordinates,
    EdgeCoordinates,
    BoundaryCoordinates,
}

/// A coordinate role of the mesh-topology variable.
struct CoordRole {
    /// Attribute on the mesh variable holding the coordinate names.
    attr: &'static str,
    required: bool,
    target: CoordTarget,
}

const COORD_ROLES: [CoordRole; 4] = [
    CoordRole {
        attr: "node_coordinates",
        required: true,
        target: CoordTarget::Nodes,
    },
    CoordRole {
        attr: "face_coordinates",
        required: false,
        target: CoordTarget::FaceCoordinates,
    },
    CoordRole {
        attr: "edge_coordinates",
        required: false,
        target: CoordTarget::EdgeCoordinates,
    },
    CoordRole {
        attr: "boundary_coordinates",
        required: false,
        target: CoordTarget::BoundaryCoordinates,
    },
];

/// Where a loaded connectivity array lands in the mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ConnTarget {
    Faces,
    FaceFace,
    Boundaries,
    Edges,
}

/// A connectivity role of the mesh-topology variable.
struct ConnRole {
    /// Attribute on the mesh variable naming the connectivity variable.
    attr: &'static str,
    /// Expected minor dimension (3 for face-like, 2 for edge-like).
    width: usize,
    target: ConnTarget,
}

const CONN_ROLES: [ConnRole; 4] = [
    ConnRole {
        attr: "face_node_connectivity",
        width: TRIANGLE_VERTICES,
        target: ConnTarget::Faces,
    },
    ConnRole {
        attr: "face_face_connectivity",
        width: TRIANGLE_VERTICES,
        target: ConnTarget::FaceFace,
    },
    ConnRole {
        attr: "boundary_node_connectivity",
        width: 2,
        target: ConnTarget::Boundaries,
    },
    ConnRole {
        attr: "edge_node_connectivity",
        width: 2,
        target: ConnTarget::Edges,
    },
];

/// Whether `name` is a conforming 2-D mesh-topology variable.
///
/// Requires `cf_role == "mesh_topology"` (whitespace-trimmed) and an
/// int-coercible `topology_dimension` of exactly 2. A variable missing
/// either attribute simply fails the predicate; that is never an error.
pub fn is_valid_mesh(dataset: &dyn Dataset, name: &str) -> bool {
    let Some(var) = dataset.variable(name) else {
        return false;
    };
    var.attr_str("cf_role").map(str::trim) == Some(MESH_TOPOLOGY)
        && var.attr_int("topology_dimension") == Some(TOPOLOGY_DIMENSION)
}

/// Names of all conforming mesh-topology variables, in dataset order.
pub fn find_mesh_names(dataset: &dyn Dataset) -> Vec<String> {
    dataset
        .variable_names()
        .into_iter()
        .filter(|name| is_valid_mesh(dataset, name))
        .collect()
}

/// Pick the mesh to load: a requested name must validate; with no name
/// the dataset must contain exactly one candidate.
fn resolve_mesh_name(
    dataset: &dyn Dataset,
    requested: Option<&str>,
) -> Result<String, UgridError> {
    match requested {
        Some(name) => {
            if is_valid_mesh(dataset, name) {
                Ok(name.to_string())
            } else {
                Err(UgridError::MeshNotFound(name.to_string()))
            }
        }
        None => {
            let mut candidates = find_mesh_names(dataset);
            match candidates.len() {
                0 => Err(UgridError::NoMeshFound),
                1 => Ok(candidates.remove(0)),
                _ => Err(UgridError::AmbiguousMesh(candidates)),
            }
        }
    }
}

/// Normalize raw connectivity entries to 0-based addressing.
///
/// When `start_index >= 1` every entry is shifted down by it; entries
/// that were the raw `flag_value` sentinel are then restored so the
/// sentinel is never shifted into a valid index range.
fn normalize_indices(values: &mut [i64], start_index: i64, flag_value: Option<i64>) {
    if start_index < 1 {
        return;
    }
    for v in values.iter_mut() {
        *v -= start_index;
    }
    if let Some(flag) = flag_value {
        for v in values.iter_mut() {
            if *v == flag - start_index {
                *v = flag;
            }
        }
    }
}

/// Convert row-major i64 rows into fixed-width index rows.
fn rows_to_arrays<const N: usize>(
    variable: &str,
    shape: [usize; 2],
    values: &[i64],
) -> Result<Vec<[IndexInt; N]>, UgridError> {
    if shape[1] != N {
        return Err(UgridError::BadArray {
            variable: variable.to_string(),
            expected: "connectivity with the role's expected minor dimension",
        });
    }
    let mut rows = Vec::with_capacity(shape[0]);
    for chunk in values.chunks_exact(N) {
        let mut row = [0 as IndexInt; N];
        for (slot, &value) in row.iter_mut().zip(chunk) {
            *slot = IndexInt::try_from(value).map_err(|_| UgridError::BadArray {
                variable: variable.to_string(),
                expected: "indices representable as 32-bit integers",
            })?;
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Transpose a row-major `(rows, cols)` array.
fn transpose(shape: [usize; 2], values: &[i64]) -> ([usize; 2], Vec<i64>) {
    let [rows, cols] = shape;
    let mut out = vec![0i64; values.len()];
    for r in 0..rows {
        for c in 0..cols {
            out[c * rows + r] = values[r * cols + c];
        }
    }
    ([cols, rows], out)
}

/// Assembled connectivity arrays waiting to go into the builder.
#[derive(Default)]
struct LoadedConnectivity {
    faces: Option<Vec<Face>>,
    face_face: Option<Vec<FaceNeighbors>>,
    boundaries: Option<Vec<Edge>>,
    edges: Option<Vec<Edge>>,
}

/// UGRID reader: assembles a [`Mesh`] from a dataset.
#[derive(Debug, Default, Clone)]
pub struct UgridReader;

impl UgridReader {
    /// Load a mesh (and its attached data fields) from `dataset`.
    ///
    /// With `mesh_name = None` the dataset must contain exactly one
    /// conforming mesh; otherwise the named mesh must validate.
    ///
    /// # Errors
    /// Resolution errors ([`UgridError::NoMeshFound`],
    /// [`UgridError::AmbiguousMesh`], [`UgridError::MeshNotFound`]) and
    /// schema errors (missing required attributes or referenced
    /// variables, unrecognized `standard_name`, malformed arrays). No
    /// partially populated mesh escapes on failure.
    pub fn load(
        &self,
        dataset: &dyn Dataset,
        mesh_name: Option<&str>,
    ) -> Result<Mesh, UgridError> {
        let mesh_name = resolve_mesh_name(dataset, mesh_name)?;
        log::debug!("loading UGRID mesh `{mesh_name}`");
        let mesh_var = dataset
            .variable(&mesh_name)
            .ok_or_else(|| UgridError::MeshNotFound(mesh_name.clone()))?;

        let mut builder = Mesh::builder(Vec::new()).mesh_name(&mesh_name);
        for role in &COORD_ROLES {
            let Some(coords) = self.load_coordinates(dataset, mesh_var, &mesh_name, role)? else {
                continue;
            };
            builder = match role.target {
                CoordTarget::Nodes => builder.nodes(coords),
                CoordTarget::FaceCoordinates => builder.face_coordinates(coords),
                CoordTarget::EdgeCoordinates => builder.edge_coordinates(coords),
                CoordTarget::BoundaryCoordinates => builder.boundary_coordinates(coords),
            };
        }

        let conn = self.load_connectivity(dataset, mesh_var)?;
        if let Some(faces) = conn.faces {
            builder = builder.faces(faces);
        }
        if let Some(face_face) = conn.face_face {
            builder = builder.face_face_connectivity(face_face);
        }
        if let Some(boundaries) = conn.boundaries {
            builder = builder.boundaries(boundaries);
        }
        if let Some(edges) = conn.edges {
            builder = builder.edges(edges);
        }
        let mut mesh = builder.build()?;

        for field in self.collect_fields(dataset, &mesh_name)? {
            log::debug!(
                "found data variable `{}` on {}s",
                field.name,
                field.location
            );
            mesh.add_field(field)?;
        }
        Ok(mesh)
    }

    /// Load one coordinate role into an `(N, 2)` lon/lat array.
    fn load_coordinates(
        &self,
        dataset: &dyn Dataset,
        mesh_var: &Variable,
        mesh_name: &str,
        role: &CoordRole,
    ) -> Result<Option<Vec<Node>>, UgridError> {
        let Some(names) = mesh_var.attr_str(role.attr) else {
            if role.required {
                return Err(UgridError::MissingAttribute {
                    variable: mesh_name.to_string(),
                    attribute: role.attr,
                });
            }
            log::trace!("mesh `{mesh_name}` has no optional {} role", role.attr);
            return Ok(None);
        };

        let mut coords: Option<Vec<Node>> = None;
        for name in names.split_whitespace() {
            let var = dataset
                .variable(name)
                .ok_or_else(|| UgridError::MissingVariable(name.to_string()))?;
            let values = var.data.as_float().ok_or_else(|| UgridError::BadArray {
                variable: name.to_string(),
                expected: "a 1-D float coordinate array",
            })?;
            let column = match var.attr_str("standard_name") {
                Some("longitude") => 0,
                Some("latitude") => 1,
                other => {
                    return Err(UgridError::BadStandardName {
                        variable: name.to_string(),
                        found: other.map(str::to_string),
                    });
                }
            };
            let coords = coords.get_or_insert_with(|| vec![[0.0; 2]; values.len()]);
            if coords.len() != values.len() {
                return Err(UgridError::BadArray {
                    variable: name.to_string(),
                    expected: "coordinate arrays of equal length",
                });
            }
            for (slot, &value) in coords.iter_mut().zip(values) {
                slot[column] = value;
            }
        }
        Ok(coords)
    }

    /// Load every declared connectivity role, normalized to 0-based
    /// indices. Flag sentinels in the face-face role are mapped to
    /// [`NO_NEIGHBOR`]; the raw flag value (which may collide with a
    /// valid index, e.g. `flag_values = 0`) never enters the mesh.
    fn load_connectivity(
        &self,
        dataset: &dyn Dataset,
        mesh_var: &Variable,
    ) -> Result<LoadedConnectivity, UgridError> {
        let mut out = LoadedConnectivity::default();
        for role in &CONN_ROLES {
            let Some(name) = mesh_var.attr_str(role.attr).map(str::trim) else {
                continue; // not all roles are required
            };
            let var = dataset
                .variable(name)
                .ok_or_else(|| UgridError::MissingVariable(name.to_string()))?;
            let (shape, values) = var.data.as_int2().ok_or_else(|| UgridError::BadArray {
                variable: name.to_string(),
                expected: "a 2-D integer connectivity array",
            })?;
            if shape[0] * shape[1] != values.len() {
                return Err(UgridError::BadArray {
                    variable: name.to_string(),
                    expected: "a 2-D integer array whose shape matches its value count",
                });
            }
            // stored transposed when the leading dimension is the arity
            let (shape, mut values) = if shape[0] == role.width {
                transpose(shape, values)
            } else {
                (shape, values.to_vec())
            };
            let start_index = var.attr_int("start_index").unwrap_or(0);
            let flag_value = var.attr_int("flag_values");
            normalize_indices(&mut values, start_index, flag_value);
            match role.target {
                ConnTarget::Faces => out.faces = Some(rows_to_arrays(name, shape, &values)?),
                ConnTarget::FaceFace => {
                    if let Some(flag) = flag_value {
                        for v in values.iter_mut() {
                            if *v == flag {
                                *v = i64::from(NO_NEIGHBOR);
                            }
                        }
                    }
                    out.face_face = Some(rows_to_arrays(name, shape, &values)?)
                }
                ConnTarget::Boundaries => {
                    out.boundaries = Some(rows_to_arrays(name, shape, &values)?)
                }
                ConnTarget::Edges => out.edges = Some(rows_to_arrays(name, shape, &values)?),
            }
        }
        Ok(out)
    }

    /// Scan the dataset for data fields attached to `mesh_name`.
    ///
    /// A variable qualifies iff it carries a `location` attribute in
    /// {node, edge, face} and a `mesh` attribute equal to the selected
    /// mesh name. The field name is the variable name with the mesh
    /// name and a leading `_` separator stripped; all attributes except
    /// the `location` marker are carried through.
    fn collect_fields(
        &self,
        dataset: &dyn Dataset,
        mesh_name: &str,
    ) -> Result<Vec<DataField>, UgridError> {
        let mut fields = Vec::new();
        for name in dataset.variable_names() {
            let Some(var) = dataset.variable(&name) else {
                continue;
            };
            let Some(location) = var.attr_str("location").and_then(Location::parse) else {
                continue;
            };
            if var.attr_str("mesh") != Some(mesh_name) {
                continue;
            }
            let values = var.data.as_float().ok_or_else(|| UgridError::BadArray {
                variable: name.clone(),
                expected: "a 1-D float data array",
            })?;
            let field_name = name
                .strip_prefix(mesh_name)
                .map(|rest| rest.trim_start_matches('_'))
                .unwrap_or(&name);
            let attributes = var
                .attributes
                .iter()
                .filter(|(key, _)| key.as_str() != "location")
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();
            fields.push(
                DataField::new(field_name, location, values.to_vec())
                    .with_attributes(attributes),
            );
        }
        Ok(fields)
    }
}

/// UGRID writer: lays a [`Mesh`] out into a dataset.
#[derive(Debug, Default, Clone)]
pub struct UgridWriter;

impl UgridWriter {
    /// Write `mesh` into `dataset` following the UGRID layout.
    ///
    /// Declares the element-count dimensions, writes the zero-sized
    /// mesh-topology marker with cross-references by name, the
    /// face-node / edge-node connectivity with `start_index = 0`, the
    /// node longitude/latitude variables, the face-face adjacency
    /// (with `flag_values = -1`) when present, and every attached data
    /// field. Edges are derived from the faces when absent.
    ///
    /// # Errors
    /// [`UgridError::NoFaces`] if the mesh has no face connectivity;
    /// otherwise whatever the dataset backend reports.
    pub fn save(&self, mesh: &Mesh, dataset: &mut dyn Dataset) -> Result<(), UgridError> {
        let faces = mesh.faces().ok_or(UgridError::NoFaces)?;
        let name = mesh.mesh_name().unwrap_or("mesh").to_string();
        let edges: Vec<Edge> = match mesh.edges() {
            Some(edges) => edges.to_vec(),
            None => connectivity::build_edges(faces),
        };
        log::debug!(
            "saving mesh `{name}`: {} nodes, {} edges, {} faces",
            mesh.num_nodes(),
            edges.len(),
            faces.len()
        );

        dataset.add_dimension("num_nodes", mesh.num_nodes())?;
        dataset.add_dimension("num_edges", edges.len())?;
        dataset.add_dimension("num_faces", faces.len())?;
        dataset.add_dimension("num_vertices", TRIANGLE_VERTICES)?;
        dataset.add_dimension("two", 2)?;

        let mut marker = Variable::new(Array::Empty)
            .with_attr("cf_role", MESH_TOPOLOGY)
            .with_attr("long_name", "Topology data of 2D unstructured mesh")
            .with_attr("topology_dimension", TOPOLOGY_DIMENSION)
            .with_attr("node_coordinates", format!("{name}_node_lon {name}_node_lat"))
            .with_attr("face_node_connectivity", format!("{name}_face_nodes"))
            .with_attr("edge_node_connectivity", format!("{name}_edge_nodes"));
        if mesh.face_face_connectivity().is_some() {
            marker = marker.with_attr("face_face_connectivity", format!("{name}_face_links"));
        }
        dataset.put_variable(&name, marker)?;

        dataset.put_variable(
            &format!("{name}_face_nodes"),
            Variable::new(connectivity_array(faces))
                .with_dimensions(&["num_faces", "num_vertices"])
                .with_attr("cf_role", "face_node_connectivity")
                .with_attr(
                    "long_name",
                    "Maps every triangular face to its three corner nodes.",
                )
                .with_attr("start_index", 0i64),
        )?;

        dataset.put_variable(
            &format!("{name}_edge_nodes"),
            Variable::new(connectivity_array(&edges))
                .with_dimensions(&["num_edges", "two"])
                .with_attr("cf_role", "edge_node_connectivity")
                .with_attr(
                    "long_name",
                    "Maps every edge to the two nodes that it connects.",
                )
                .with_attr("start_index", 0i64),
        )?;

        if let Some(face_face) = mesh.face_face_connectivity() {
            // in-memory sentinels are NO_NEIGHBOR, matching the
            // declared flag value
            let values = face_face
                .iter()
                .flatten()
                .map(|&v| if v < 0 { -1i64 } else { v as i64 })
                .collect();
            dataset.put_variable(
                &format!("{name}_face_links"),
                Variable::new(Array::int2([face_face.len(), TRIANGLE_VERTICES], values))
                    .with_dimensions(&["num_faces", "num_vertices"])
                    .with_attr("cf_role", "face_face_connectivity")
                    .with_attr("long_name", "Neighbor face across each face edge.")
                    .with_attr("start_index", 0i64)
                    .with_attr("flag_values", -1i64),
            )?;
        }

        let lon: Vec<f64> = mesh.nodes().iter().map(|n| n[0]).collect();
        let lat: Vec<f64> = mesh.nodes().iter().map(|n| n[1]).collect();
        dataset.put_variable(
            &format!("{name}_node_lon"),
            Variable::new(Array::Float(lon))
                .with_dimensions(&["num_nodes"])
                .with_attr("standard_name", "longitude")
                .with_attr("long_name", "Longitude of 2D mesh nodes.")
                .with_attr("units", "degrees_east"),
        )?;
        dataset.put_variable(
            &format!("{name}_node_lat"),
            Variable::new(Array::Float(lat))
                .with_dimensions(&["num_nodes"])
                .with_attr("standard_name", "latitude")
                .with_attr("long_name", "Latitude of 2D mesh nodes.")
                .with_attr("units", "degrees_north"),
        )?;

        for field in mesh.fields().values() {
            let dim = match field.location {
                Location::Node => "num_nodes",
                Location::Edge => "num_edges",
                Location::Face => "num_faces",
            };
            let mut var = Variable::new(Array::Float(field.values.clone()))
                .with_dimensions(&[dim])
                .with_attr("location", field.location.as_str())
                .with_attr("mesh", name.as_str());
            for (key, value) in &field.attributes {
                if key != "location" && key != "mesh" {
                    var.attributes.insert(key.clone(), value.clone());
                }
            }
            dataset.put_variable(&format!("{name}_{}", field.name), var)?;
        }
        Ok(())
    }
}

/// Flatten fixed-width index rows into a row-major i64 array.
fn connectivity_array<const N: usize>(rows: &[[IndexInt; N]]) -> Array {
    let values = rows.iter().flatten().map(|&v| v as i64).collect();
    Array::int2([rows.len(), N], values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_shifts_one_based_indices() {
        let mut values = vec![1, 2, 3, 4];
        normalize_indices(&mut values, 1, None);
        assert_eq!(values, vec![0, 1, 2, 3]);
    }

    #[test]
    fn normalize_is_identity_for_zero_base() {
        let mut values = vec![0, 1, 2, 3];
        normalize_indices(&mut values, 0, Some(-999));
        assert_eq!(values, vec![0, 1, 2, 3]);
    }

    #[test]
    fn normalize_preserves_flag_sentinels() {
        // a raw -999 sentinel must survive the shift untouched
        let mut values = vec![1, -999, 3];
        normalize_indices(&mut values, 1, Some(-999));
        assert_eq!(values, vec![0, -999, 2]);
    }

    #[test]
    fn transpose_swaps_axes() {
        // (2, 3) row-major -> (3, 2)
        let (shape, values) = transpose([2, 3], &[1, 2, 3, 4, 5, 6]);
        assert_eq!(shape, [3, 2]);
        assert_eq!(values, vec![1, 4, 2, 5, 3, 6]);
    }
}
