//! Top-layer extraction: derive a 2D mesh from a layered 3D mesh.

use tracing::debug;

use crate::error::GeometryError;
use crate::mesh::{MeshGeometry, rebuild_from_faces};

/// Derive the 2D top-layer geometry of a layered 3D mesh.
///
/// Per vertical column the topmost element is kept and reduced to its top
/// horizontal face (the upper half of a prism/hexahedron node ring). The
/// used nodes are renumbered contiguously preserving ascending source id
/// order, and the returned mapping gives the source element-axis index of
/// each 2D element, for re-indexing datasets read with
/// `element_ids = top_element_ids`.
///
/// The result has one element per column and reports `is_2d() == true`.
///
/// # Errors
///
/// Returns [`GeometryError::NotLayered`] when the mesh has no vertical
/// structure.
pub fn top_layer_geometry(
    mesh: &MeshGeometry,
) -> Result<(MeshGeometry, Vec<usize>), GeometryError> {
    let layers = match mesh.layers() {
        Some(info) if info.n_layers() > 1 => info,
        _ => return Err(GeometryError::NotLayered),
    };

    let faces: Vec<(usize, Vec<u32>)> = layers
        .top_elements()
        .iter()
        .map(|&index| (index, mesh.elements()[index].top_face().to_vec()))
        .collect();

    debug!(
        n_columns = faces.len(),
        n_elements_3d = mesh.n_elements(),
        "projecting top layer to 2D"
    );

    rebuild_from_faces(mesh, &faces, mesh.projection().clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Element, ElementKind};
    use crate::layers::LayerInfo;
    use crate::mesh::Projection;
    use crate::node::Node;

    /// One triangular column of two prism layers stacked on a second
    /// column of a single prism.
    ///
    /// Horizontal footprint: triangles (1,2,3) and (2,4,3); the first
    /// column has nodes at z = -2, -1, 0, the second at z = -1, 0.
    fn layered_mesh() -> MeshGeometry {
        let mut nodes = Vec::new();
        let mut id = 1;
        for &z in &[-2.0, -1.0, 0.0] {
            nodes.push(Node::new(id, 0.0, 0.0, z, 1));
            nodes.push(Node::new(id + 1, 1.0, 0.0, z, 1));
            nodes.push(Node::new(id + 2, 0.0, 1.0, z, 1));
            nodes.push(Node::new(id + 3, 1.0, 1.0, z, 0));
            id += 4;
        }
        // Node layout: ids 1-4 at z=-2, 5-8 at z=-1, 9-12 at z=0.
        let elements = vec![
            // Column 1: triangle (x ring 1,2,3), layers 0 and 1.
            Element::new(1, vec![1, 2, 3, 5, 6, 7]).unwrap(),
            Element::new(2, vec![5, 6, 7, 9, 10, 11]).unwrap(),
            // Column 2: triangle (x ring 2,4,3), top layer only.
            Element::new(3, vec![6, 8, 7, 10, 12, 11]).unwrap(),
        ];
        let layers = LayerInfo::new(2, 2, vec![0, 1, 1]).unwrap();
        MeshGeometry::new(nodes, elements, Some(layers), Projection::new("UTM-33")).unwrap()
    }

    #[test]
    fn one_element_per_column() {
        let mesh = layered_mesh();
        let (flat, mapping) = top_layer_geometry(&mesh).unwrap();
        assert_eq!(flat.n_elements(), 2);
        assert_eq!(mapping, vec![1, 2]);
        assert!(flat.is_2d());
    }

    #[test]
    fn top_faces_become_triangles() {
        let mesh = layered_mesh();
        let (flat, _) = top_layer_geometry(&mesh).unwrap();
        for element in flat.elements() {
            assert_eq!(element.kind(), ElementKind::Triangle);
        }
    }

    #[test]
    fn nodes_renumbered_contiguously() {
        let mesh = layered_mesh();
        let (flat, _) = top_layer_geometry(&mesh).unwrap();
        // Top faces use source nodes 9,10,11 and 10,12,11 → four distinct
        // nodes renumbered 1..=4.
        assert_eq!(flat.n_nodes(), 4);
        let ids: Vec<u32> = flat.nodes().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        // Surface nodes keep their coordinates.
        for node in flat.nodes() {
            assert_eq!(node.z, 0.0);
        }
    }

    #[test]
    fn mapping_matches_top_element_ids() {
        let mesh = layered_mesh();
        let top_ids = mesh.top_element_ids();
        assert_eq!(top_ids, vec![2, 3]);
        let (_, mapping) = top_layer_geometry(&mesh).unwrap();
        let mapped_ids: Vec<u32> = mapping.iter().map(|&i| mesh.elements()[i].id()).collect();
        assert_eq!(mapped_ids, top_ids);
    }

    #[test]
    fn projection_preserved() {
        let mesh = layered_mesh();
        let (flat, _) = top_layer_geometry(&mesh).unwrap();
        assert_eq!(flat.projection().text(), "UTM-33");
    }

    #[test]
    fn fails_on_2d_mesh() {
        let nodes = vec![
            Node::new(1, 0.0, 0.0, 0.0, 0),
            Node::new(2, 1.0, 0.0, 0.0, 0),
            Node::new(3, 0.0, 1.0, 0.0, 0),
        ];
        let elements = vec![Element::new(1, vec![1, 2, 3]).unwrap()];
        let mesh = MeshGeometry::new(nodes, elements, None, Projection::long_lat()).unwrap();
        assert_eq!(
            top_layer_geometry(&mesh).unwrap_err(),
            GeometryError::NotLayered
        );
    }

    #[test]
    fn extract_top_ids_delegates_to_projector() {
        let mesh = layered_mesh();
        let top_ids = mesh.top_element_ids();
        let (via_extract, map_a) = mesh.extract_elements(&top_ids).unwrap();
        let (via_projector, map_b) = top_layer_geometry(&mesh).unwrap();
        assert_eq!(via_extract, via_projector);
        assert_eq!(map_a, map_b);
    }

    #[test]
    fn extract_non_top_subset_of_3d_fails() {
        let mesh = layered_mesh();
        assert_eq!(
            mesh.extract_elements(&[1, 2]).unwrap_err(),
            GeometryError::UnsupportedSubset
        );
    }
}
