//! Save → load round-trip over an in-memory dataset.

use ugrid::prelude::*;

fn populated_mesh() -> Mesh {
    let mut mesh = Mesh::builder(vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]])
        .faces(vec![[0, 1, 2], [0, 2, 3]])
        .mesh_name("mesh2")
        .build()
        .unwrap();
    mesh.build_edges().unwrap();
    mesh.build_face_face_connectivity().unwrap();
    mesh.add_field(
        DataField::new("depth", Location::Node, vec![1.0, 2.0, 3.0, 4.0])
            .with_attr("units", "m"),
    )
    .unwrap();
    mesh.add_field(DataField::new("u", Location::Face, vec![0.1, 0.2]))
        .unwrap();
    mesh
}

#[test]
fn save_declares_dimensions_and_marker() {
    let mesh = populated_mesh();
    let mut ds = MemoryDataset::new();
    UgridWriter.save(&mesh, &mut ds).unwrap();

    assert_eq!(ds.dimension("num_nodes"), Some(4));
    assert_eq!(ds.dimension("num_edges"), Some(5));
    assert_eq!(ds.dimension("num_faces"), Some(2));
    assert_eq!(ds.dimension("num_vertices"), Some(3));

    let marker = ds.variable("mesh2").expect("marker variable");
    assert_eq!(marker.data, Array::Empty);
    assert_eq!(marker.attr_str("cf_role"), Some("mesh_topology"));
    assert_eq!(marker.attr_int("topology_dimension"), Some(2));
    assert_eq!(
        marker.attr_str("face_node_connectivity"),
        Some("mesh2_face_nodes")
    );

    let face_nodes = ds.variable("mesh2_face_nodes").expect("face nodes");
    assert_eq!(face_nodes.attr_int("start_index"), Some(0));
    assert_eq!(face_nodes.dimensions, vec!["num_faces", "num_vertices"]);
}

#[test]
fn save_load_round_trip_preserves_the_model() {
    let mesh = populated_mesh();
    let mut ds = MemoryDataset::new();
    UgridWriter.save(&mesh, &mut ds).unwrap();

    let reloaded = UgridReader.load(&ds, None).unwrap();
    assert_eq!(reloaded.mesh_name(), Some("mesh2"));
    assert_eq!(reloaded.nodes(), mesh.nodes());
    assert_eq!(reloaded.faces(), mesh.faces());
    assert_eq!(reloaded.edges(), mesh.edges());
    assert_eq!(
        reloaded.face_face_connectivity(),
        mesh.face_face_connectivity()
    );

    assert_eq!(reloaded.fields().len(), 2);
    let depth = reloaded.field("depth").expect("depth survives");
    assert_eq!(depth.location, Location::Node);
    assert_eq!(depth.values, vec![1.0, 2.0, 3.0, 4.0]);
    assert_eq!(depth.attributes.get("units"), Some(&AttrValue::from("m")));
    let u = reloaded.field("u").expect("u survives");
    assert_eq!(u.location, Location::Face);
    assert_eq!(u.values, vec![0.1, 0.2]);
}

#[test]
fn save_derives_edges_when_absent() {
    let mesh = Mesh::builder(vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]])
        .faces(vec![[0, 1, 2], [0, 2, 3]])
        .build()
        .unwrap();
    let mut ds = MemoryDataset::new();
    UgridWriter.save(&mesh, &mut ds).unwrap();
    assert_eq!(ds.dimension("num_edges"), Some(5));
    // the writer falls back to the default mesh name
    assert!(ds.variable("mesh_edge_nodes").is_some());
}

#[test]
fn save_without_faces_is_rejected() {
    let mesh = Mesh::new(vec![[0.0, 0.0]]);
    let mut ds = MemoryDataset::new();
    assert!(matches!(
        UgridWriter.save(&mesh, &mut ds),
        Err(UgridError::NoFaces)
    ));
}

#[test]
fn mesh_serde_round_trip() {
    let mesh = populated_mesh();
    let json = serde_json::to_string(&mesh).unwrap();
    let back: Mesh = serde_json::from_str(&json).unwrap();
    assert_eq!(back, mesh);
}
