//! The validated mesh container and its derived queries.

use std::collections::BTreeSet;

use crate::area;
use crate::element::Element;
use crate::error::GeometryError;
use crate::layers::LayerInfo;
use crate::node::Node;
use crate::spatial;

/// Projection string of a mesh.
///
/// `"LONG/LAT"` marks geographic lon/lat coordinates; anything else (a WKT
/// string or a named projected CRS such as `"UTM-33"`) is treated as
/// projected metric coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    text: String,
}

/// The projection string that marks geographic coordinates.
const LONG_LAT: &str = "LONG/LAT";

impl Projection {
    /// Wrap a projection string as read from a file header.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The geographic lon/lat projection.
    pub fn long_lat() -> Self {
        Self::new(LONG_LAT)
    }

    /// The raw projection string.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// `true` when coordinates are geographic lon/lat degrees.
    pub fn is_geo(&self) -> bool {
        self.text == LONG_LAT
    }
}

/// Authoritative topology of a flexible mesh plus derived geometric
/// queries.
///
/// Validated once at construction and immutable afterwards; share across
/// readers via `Arc`. Element storage order is stable and defines the
/// element axis used by all data arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshGeometry {
    nodes: Vec<Node>,
    elements: Vec<Element>,
    layers: Option<LayerInfo>,
    projection: Projection,
}

impl MeshGeometry {
    /// Build a mesh, validating topology.
    ///
    /// Nodes and elements must be stored in strictly increasing id order,
    /// every element node id must resolve to a node, and a layer array (if
    /// present) must cover every element.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::EmptyMesh`], [`GeometryError::NodesNotSorted`],
    /// [`GeometryError::ElementsNotSorted`], [`GeometryError::UnknownNode`]
    /// or [`GeometryError::LayerMismatch`] accordingly.
    pub fn new(
        nodes: Vec<Node>,
        elements: Vec<Element>,
        layers: Option<LayerInfo>,
        projection: Projection,
    ) -> Result<Self, GeometryError> {
        if nodes.is_empty() || elements.is_empty() {
            return Err(GeometryError::EmptyMesh);
        }

        for (i, pair) in nodes.windows(2).enumerate() {
            if pair[1].id <= pair[0].id {
                return Err(GeometryError::NodesNotSorted { position: i + 1 });
            }
        }
        for (i, pair) in elements.windows(2).enumerate() {
            if pair[1].id() <= pair[0].id() {
                return Err(GeometryError::ElementsNotSorted { position: i + 1 });
            }
        }

        let mesh = Self {
            nodes,
            elements,
            layers: None,
            projection,
        };

        for element in &mesh.elements {
            for &node_id in element.node_ids() {
                if mesh.node_index(node_id).is_none() {
                    return Err(GeometryError::UnknownNode {
                        element_id: element.id(),
                        node_id,
                    });
                }
            }
        }

        if let Some(info) = &layers
            && info.elem_layer().len() != mesh.elements.len()
        {
            return Err(GeometryError::LayerMismatch {
                expected: mesh.elements.len(),
                got: info.elem_layer().len(),
            });
        }

        Ok(Self { layers, ..mesh })
    }

    /// Number of nodes.
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of elements; the length of the element axis.
    pub fn n_elements(&self) -> usize {
        self.elements.len()
    }

    /// Nodes in id order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Elements in storage (element-axis) order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Layer structure, `None` for pure 2D meshes.
    pub fn layers(&self) -> Option<&LayerInfo> {
        self.layers.as_ref()
    }

    /// Projection of the node coordinates.
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// `true` when coordinates are geographic lon/lat degrees.
    pub fn is_geo(&self) -> bool {
        self.projection.is_geo()
    }

    /// `true` when the mesh has no vertical structure (no layers, or a
    /// single layer).
    pub fn is_2d(&self) -> bool {
        self.layers.as_ref().is_none_or(|info| info.n_layers() <= 1)
    }

    /// Total layer count; 0 for 2D meshes.
    pub fn n_layers(&self) -> u32 {
        self.layers.as_ref().map_or(0, LayerInfo::n_layers)
    }

    /// Sigma layer count; 0 for 2D meshes.
    pub fn n_sigma_layers(&self) -> u32 {
        self.layers.as_ref().map_or(0, LayerInfo::n_sigma_layers)
    }

    /// Z layer count; 0 for 2D meshes.
    pub fn n_z_layers(&self) -> u32 {
        self.layers.as_ref().map_or(0, LayerInfo::n_z_layers)
    }

    /// Position of the node with `id`, if present.
    pub fn node_index(&self, id: u32) -> Option<usize> {
        self.nodes.binary_search_by_key(&id, |n| n.id).ok()
    }

    /// Element-axis position of the element with `id`, if present.
    pub fn element_index(&self, id: u32) -> Option<usize> {
        self.elements.binary_search_by_key(&id, Element::id).ok()
    }

    /// Node coordinates ordered by node id.
    pub fn node_coordinates(&self) -> Vec<(f64, f64, f64)> {
        self.nodes.iter().map(|n| (n.x, n.y, n.z)).collect()
    }

    /// Centroid of the element at `index`: arithmetic mean of its node
    /// coordinates (z averaged too, giving the vertical element centre in
    /// 3D meshes).
    ///
    /// # Panics
    ///
    /// Panics if `index` is past the element axis; construction guarantees
    /// every stored node id resolves.
    pub fn element_centroid(&self, index: usize) -> (f64, f64, f64) {
        let element = &self.elements[index];
        let n = element.node_ids().len() as f64;
        let (mut x, mut y, mut z) = (0.0, 0.0, 0.0);
        for &node_id in element.node_ids() {
            let node = self.node(node_id);
            x += node.x;
            y += node.y;
            z += node.z;
        }
        (x / n, y / n, z / n)
    }

    /// Element centroids in element-axis order.
    pub fn element_coordinates(&self) -> Vec<(f64, f64, f64)> {
        (0..self.elements.len())
            .map(|i| self.element_centroid(i))
            .collect()
    }

    /// Horizontal area of the element at `index` in square metres (or
    /// squared coordinate units for projected meshes).
    ///
    /// Uses the shoelace formula over the element's horizontal face ring
    /// (the bottom face for volume kinds); geographic coordinates are
    /// reprojected to a local equal-area frame first.
    pub fn element_area(&self, index: usize) -> f64 {
        let element = &self.elements[index];
        let face = element.bottom_face();
        let xs: Vec<f64> = face.iter().map(|&id| self.node(id).x).collect();
        let ys: Vec<f64> = face.iter().map(|&id| self.node(id).y).collect();
        if self.is_geo() {
            area::ring_area_geographic(&xs, &ys)
        } else {
            area::ring_area_projected(&xs, &ys)
        }
    }

    /// Horizontal areas of all elements in element-axis order.
    pub fn element_areas(&self) -> Vec<f64> {
        (0..self.elements.len())
            .map(|i| self.element_area(i))
            .collect()
    }

    /// Element-axis index of the element whose centroid is closest to
    /// `(x, y)` in planar Euclidean distance; ties resolve to the lowest
    /// index.
    ///
    /// In geographic meshes the metric is planar degree distance, an
    /// approximation consistent over small extents.
    pub fn find_closest_element_index(&self, x: f64, y: f64) -> usize {
        let centroids: Vec<(f64, f64)> = self
            .element_coordinates()
            .into_iter()
            .map(|(cx, cy, _)| (cx, cy))
            .collect();
        spatial::closest_point_index(&centroids, x, y)
    }

    /// Distinct non-zero boundary codes present in the mesh, ascending.
    pub fn boundary_codes(&self) -> Vec<i32> {
        let codes: BTreeSet<i32> = self
            .nodes
            .iter()
            .filter(|n| n.is_boundary())
            .map(|n| n.code)
            .collect();
        codes.into_iter().collect()
    }

    /// Ids of the topmost element of each vertical column, in column
    /// order; empty for 2D meshes.
    pub fn top_element_ids(&self) -> Vec<u32> {
        match &self.layers {
            Some(info) if info.n_layers() > 1 => info
                .top_elements()
                .iter()
                .map(|&i| self.elements[i].id())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Extract the sub-mesh spanned by `element_ids`, preserving the
    /// caller-given element order and renumbering nodes contiguously.
    ///
    /// Returns the sub-mesh together with the source element-axis index of
    /// each extracted element. On a layered 3D mesh only the exact
    /// top-layer id set is supported, and the result is the projected 2D
    /// geometry (see [`crate::top_layer_geometry`]).
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::UnknownElement`] for an unresolvable id and
    /// [`GeometryError::UnsupportedSubset`] for a non-top-layer subset of a
    /// 3D mesh.
    pub fn extract_elements(
        &self,
        element_ids: &[u32],
    ) -> Result<(MeshGeometry, Vec<usize>), GeometryError> {
        if !self.is_2d() {
            for &id in element_ids {
                if self.element_index(id).is_none() {
                    return Err(GeometryError::UnknownElement { id });
                }
            }
            if element_ids == self.top_element_ids() {
                return crate::projector::top_layer_geometry(self);
            }
            return Err(GeometryError::UnsupportedSubset);
        }

        let mut faces = Vec::with_capacity(element_ids.len());
        for &id in element_ids {
            let index = self
                .element_index(id)
                .ok_or(GeometryError::UnknownElement { id })?;
            faces.push((index, self.elements[index].node_ids().to_vec()));
        }
        rebuild_from_faces(self, &faces, self.projection.clone())
    }

    fn node(&self, id: u32) -> &Node {
        let index = self
            .node_index(id)
            .expect("validated at construction: every element node id resolves");
        &self.nodes[index]
    }
}

/// Rebuild a standalone 2D mesh from per-element horizontal faces of a
/// source mesh.
///
/// The used nodes are renumbered contiguously preserving ascending source
/// id order; elements get ids `1..` in the given face order. Returns the
/// mesh together with the source element-axis index of each face.
pub(crate) fn rebuild_from_faces(
    source: &MeshGeometry,
    faces: &[(usize, Vec<u32>)],
    projection: Projection,
) -> Result<(MeshGeometry, Vec<usize>), GeometryError> {
    let used: BTreeSet<u32> = faces
        .iter()
        .flat_map(|(_, ids)| ids.iter().copied())
        .collect();

    let mut nodes = Vec::with_capacity(used.len());
    let mut remap = std::collections::BTreeMap::new();
    for (new_index, old_id) in used.iter().enumerate() {
        let old = &source.nodes[source
            .node_index(*old_id)
            .expect("face node ids originate from the source mesh")];
        let new_id = new_index as u32 + 1;
        remap.insert(*old_id, new_id);
        nodes.push(Node::new(new_id, old.x, old.y, old.z, old.code));
    }

    let mut elements = Vec::with_capacity(faces.len());
    let mut mapping = Vec::with_capacity(faces.len());
    for (new_index, (source_index, face)) in faces.iter().enumerate() {
        let node_ids: Vec<u32> = face.iter().map(|id| remap[id]).collect();
        elements.push(Element::new(new_index as u32 + 1, node_ids)?);
        mapping.push(*source_index);
    }

    let mesh = MeshGeometry::new(nodes, elements, None, projection)?;
    Ok((mesh, mapping))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// Two triangles sharing an edge:
    ///
    /// ```text
    /// 3----4
    /// | \  |
    /// |  \ |
    /// 1----2
    /// ```
    fn two_triangles() -> MeshGeometry {
        let nodes = vec![
            Node::new(1, 0.0, 0.0, -5.0, 1),
            Node::new(2, 1.0, 0.0, -5.0, 1),
            Node::new(3, 0.0, 1.0, -5.0, 2),
            Node::new(4, 1.0, 1.0, -5.0, 0),
        ];
        let elements = vec![
            Element::new(1, vec![1, 2, 3]).unwrap(),
            Element::new(2, vec![2, 4, 3]).unwrap(),
        ];
        MeshGeometry::new(nodes, elements, None, Projection::new("UTM-33")).unwrap()
    }

    #[test]
    fn construction_and_counts() {
        let mesh = two_triangles();
        assert_eq!(mesh.n_nodes(), 4);
        assert_eq!(mesh.n_elements(), 2);
        assert!(mesh.is_2d());
        assert!(!mesh.is_geo());
        assert_eq!(mesh.n_layers(), 0);
    }

    #[test]
    fn empty_mesh_fails() {
        let err = MeshGeometry::new(Vec::new(), Vec::new(), None, Projection::long_lat());
        assert_eq!(err.unwrap_err(), GeometryError::EmptyMesh);
    }

    #[test]
    fn unsorted_nodes_fail() {
        let nodes = vec![Node::new(2, 0.0, 0.0, 0.0, 0), Node::new(1, 1.0, 0.0, 0.0, 0)];
        let elements = vec![Element::new(1, vec![2, 1, 2]).unwrap()];
        let err = MeshGeometry::new(nodes, elements, None, Projection::long_lat()).unwrap_err();
        assert_eq!(err, GeometryError::NodesNotSorted { position: 1 });
    }

    #[test]
    fn unknown_node_reference_fails() {
        let nodes = vec![
            Node::new(1, 0.0, 0.0, 0.0, 0),
            Node::new(2, 1.0, 0.0, 0.0, 0),
            Node::new(3, 0.0, 1.0, 0.0, 0),
        ];
        let elements = vec![Element::new(1, vec![1, 2, 9]).unwrap()];
        let err = MeshGeometry::new(nodes, elements, None, Projection::long_lat()).unwrap_err();
        assert_eq!(
            err,
            GeometryError::UnknownNode {
                element_id: 1,
                node_id: 9
            }
        );
    }

    #[test]
    fn layer_array_length_checked() {
        let nodes = vec![
            Node::new(1, 0.0, 0.0, 0.0, 0),
            Node::new(2, 1.0, 0.0, 0.0, 0),
            Node::new(3, 0.0, 1.0, 0.0, 0),
        ];
        let elements = vec![Element::new(1, vec![1, 2, 3]).unwrap()];
        let layers = LayerInfo::new(2, 2, vec![0, 1]).unwrap();
        let err =
            MeshGeometry::new(nodes, elements, Some(layers), Projection::long_lat()).unwrap_err();
        assert_eq!(err, GeometryError::LayerMismatch { expected: 1, got: 2 });
    }

    #[test]
    fn centroids() {
        let mesh = two_triangles();
        let coords = mesh.element_coordinates();
        assert_eq!(coords.len(), 2);
        let (x, y, z) = coords[0];
        assert_abs_diff_eq!(x, 1.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(y, 1.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(z, -5.0, epsilon = 1e-12);
    }

    #[test]
    fn node_coordinates_ordered_by_id() {
        let mesh = two_triangles();
        let coords = mesh.node_coordinates();
        assert_eq!(coords[0], (0.0, 0.0, -5.0));
        assert_eq!(coords[3], (1.0, 1.0, -5.0));
    }

    #[test]
    fn areas() {
        let mesh = two_triangles();
        let areas = mesh.element_areas();
        assert_abs_diff_eq!(areas[0], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(areas[1], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn closest_element() {
        let mesh = two_triangles();
        // Centroids: (1/3, 1/3) and (2/3, 2/3).
        assert_eq!(mesh.find_closest_element_index(0.0, 0.0), 0);
        assert_eq!(mesh.find_closest_element_index(1.0, 1.0), 1);
        // Repeated queries are stable.
        assert_eq!(
            mesh.find_closest_element_index(0.0, 0.0),
            mesh.find_closest_element_index(0.0, 0.0)
        );
    }

    #[test]
    fn boundary_codes_distinct_nonzero_sorted() {
        let mesh = two_triangles();
        assert_eq!(mesh.boundary_codes(), vec![1, 2]);
    }

    #[test]
    fn top_element_ids_empty_for_2d() {
        let mesh = two_triangles();
        assert!(mesh.top_element_ids().is_empty());
    }

    #[test]
    fn extract_subset_of_2d_mesh() {
        let mesh = two_triangles();
        let (sub, mapping) = mesh.extract_elements(&[2]).unwrap();
        assert_eq!(sub.n_elements(), 1);
        assert_eq!(mapping, vec![1]);
        // Nodes 2, 3, 4 survive, renumbered 1..=3.
        assert_eq!(sub.n_nodes(), 3);
        assert_eq!(sub.nodes()[0].x, 1.0);
        assert_abs_diff_eq!(sub.element_area(0), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn extract_unknown_element_fails() {
        let mesh = two_triangles();
        let err = mesh.extract_elements(&[7]).unwrap_err();
        assert_eq!(err, GeometryError::UnknownElement { id: 7 });
    }

    #[test]
    fn geometry_is_send_and_sync() {
        fn assert_bounds<T: Send + Sync>() {}
        assert_bounds::<MeshGeometry>();
    }

    #[test]
    fn geographic_projection_flag() {
        assert!(Projection::long_lat().is_geo());
        assert!(!Projection::new("UTM-33").is_geo());
        assert_eq!(Projection::long_lat().text(), "LONG/LAT");
    }
}
