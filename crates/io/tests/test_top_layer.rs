//! Integration test: 3D layered files and end-to-end top-layer extraction.

use chrono::{NaiveDate, TimeDelta};
use ndarray::Array2;

use flexmesh_geometry::{
    Element, LayerInfo, MeshGeometry, Node, Projection, top_layer_geometry,
};
use flexmesh_io::{
    Dataset, ItemInfo, MeshDataFile, ReadRequest, WriteOptions, write_data_file,
};
use flexmesh_time::TimeAxis;

const N_STEPS: usize = 3;

/// Layered mesh with two triangular columns over a shared edge.
///
/// Column 1 spans layers 0..=1 (two prisms), column 2 only the top layer
/// (the bed is shallower there). Nodes come in three z-levels of four.
fn mesh_3d() -> MeshGeometry {
    let mut nodes = Vec::new();
    let mut id = 1;
    for &z in &[-2.0, -1.0, 0.0] {
        nodes.push(Node::new(id, 0.0, 0.0, z, 1));
        nodes.push(Node::new(id + 1, 1.0, 0.0, z, 1));
        nodes.push(Node::new(id + 2, 0.0, 1.0, z, 2));
        nodes.push(Node::new(id + 3, 1.0, 1.0, z, 3));
        id += 4;
    }
    let elements = vec![
        Element::new(1, vec![1, 2, 3, 5, 6, 7]).unwrap(),
        Element::new(2, vec![5, 6, 7, 9, 10, 11]).unwrap(),
        Element::new(3, vec![6, 8, 7, 10, 12, 11]).unwrap(),
    ];
    let layers = LayerInfo::new(2, 2, vec![0, 1, 1]).unwrap();
    MeshGeometry::new(nodes, elements, Some(layers), Projection::new("UTM-33")).unwrap()
}

fn value(item: usize, step: usize, element: usize) -> f32 {
    (item * 1000 + step * 10 + element) as f32
}

fn write_source(dir: &tempfile::TempDir) -> MeshDataFile {
    let mesh = mesh_3d();
    let start = NaiveDate::from_ymd_opt(2002, 3, 1)
        .unwrap()
        .and_hms_opt(6, 0, 0)
        .unwrap();
    let time = TimeAxis::equidistant(start, TimeDelta::hours(1), N_STEPS).unwrap();
    let items = vec![
        ItemInfo::instantaneous("Z coordinate", "meter"),
        ItemInfo::instantaneous("Salinity", "PSU"),
    ];
    let data = (0..items.len())
        .map(|k| Array2::from_shape_fn((N_STEPS, mesh.n_elements()), |(t, e)| value(k, t, e)))
        .collect();
    let ds = Dataset::new(items, time, data).unwrap();

    let path = dir.path().join("basin_3d.fmdf");
    write_data_file(&path, &mesh, &ds, &WriteOptions::all()).expect("write 3d source");
    MeshDataFile::open(&path).expect("open 3d source")
}

#[test]
fn layered_header_round_trips() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let dfs = write_source(&dir);

    let geometry = dfs.geometry();
    assert!(!geometry.is_2d());
    assert_eq!(geometry.n_layers(), 2);
    assert_eq!(geometry.n_sigma_layers(), 2);
    assert_eq!(geometry.n_z_layers(), 0);
    assert_eq!(geometry.boundary_codes(), vec![1, 2, 3]);
}

#[test]
fn top_element_ids_one_per_column() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let dfs = write_source(&dir);

    let top_ids = dfs.geometry().top_element_ids();
    assert_eq!(top_ids, vec![2, 3]);
}

#[test]
fn to_2d_geometry_reports_flat_mesh() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let dfs = write_source(&dir);

    let geometry = dfs.geometry();
    let (flat, mapping) = top_layer_geometry(&geometry).expect("project top layer");

    assert!(flat.is_2d());
    assert_eq!(flat.n_elements(), 2);
    assert_eq!(mapping.len(), 2);
}

#[test]
fn read_top_elements_gathers_columns() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let dfs = write_source(&dir);

    let top_ids = dfs.geometry().top_element_ids();
    let ds = dfs
        .read(&ReadRequest::all().with_element_ids(top_ids))
        .expect("read top elements");

    assert_eq!(ds.n_elements(), 2);
    assert_eq!(ds.array(0).unwrap().dim(), (N_STEPS, 2));
    // Top elements sit at element-axis positions 1 and 2.
    assert_eq!(ds.array(1).unwrap()[[2, 0]], value(1, 2, 1));
    assert_eq!(ds.array(1).unwrap()[[2, 1]], value(1, 2, 2));
}

#[test]
fn extract_top_layer_to_2d_end_to_end() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let dfs = write_source(&dir);

    let top_ids = dfs.geometry().top_element_ids();
    let ds = dfs
        .read(&ReadRequest::all().with_element_ids(top_ids.clone()))
        .expect("read top elements");

    let out = dir.path().join("toplayer.fmdf");
    dfs.write(&out, &ds, &WriteOptions::all().with_element_ids(top_ids))
        .expect("write top layer");
    assert!(out.exists());

    let flat = MeshDataFile::open(&out).expect("open top layer file");
    let geometry = flat.geometry();

    assert!(geometry.is_2d());
    assert_eq!(geometry.n_layers(), 0);
    assert_eq!(flat.n_elements(), 2);
    assert_eq!(flat.items(), dfs.items());

    // The written values are the top-element columns of the source.
    let flat_ds = flat.read(&ReadRequest::all()).expect("read flat file");
    for k in 0..2 {
        for t in 0..N_STEPS {
            assert_eq!(flat_ds.array(k).unwrap()[[t, 0]], value(k, t, 1));
            assert_eq!(flat_ds.array(k).unwrap()[[t, 1]], value(k, t, 2));
        }
    }
}

#[test]
fn top_layer_file_has_surface_nodes_only() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let dfs = write_source(&dir);

    let top_ids = dfs.geometry().top_element_ids();
    let ds = dfs
        .read(&ReadRequest::all().with_element_ids(top_ids.clone()))
        .expect("read top elements");

    let out = dir.path().join("toplayer.fmdf");
    dfs.write(&out, &ds, &WriteOptions::all().with_element_ids(top_ids))
        .expect("write top layer");

    let flat = MeshDataFile::open(&out).expect("open top layer file");
    let geometry = flat.geometry();
    assert_eq!(geometry.n_nodes(), 4);
    for node in geometry.nodes() {
        assert_eq!(node.z, 0.0);
    }
}
