//! Element kinds and the element record.

use crate::error::GeometryError;

/// Element kind, tagged by node count.
///
/// Triangles and quadrilaterals are horizontal 2D faces; prisms and
/// hexahedra are the volume elements of layered 3D meshes (a triangle or
/// quadrilateral extruded between two layer surfaces). Centroid and area
/// algorithms are parameterised over the node ring rather than dispatched
/// per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// 3-node horizontal face.
    Triangle,
    /// 4-node horizontal face.
    Quadrilateral,
    /// 6-node volume element: triangular face extruded over one layer.
    Prism,
    /// 8-node volume element: quadrilateral face extruded over one layer.
    Hexahedron,
}

impl ElementKind {
    /// Map a node count to its element kind, if any.
    pub fn from_node_count(n_nodes: usize) -> Option<Self> {
        match n_nodes {
            3 => Some(Self::Triangle),
            4 => Some(Self::Quadrilateral),
            6 => Some(Self::Prism),
            8 => Some(Self::Hexahedron),
            _ => None,
        }
    }

    /// Number of nodes of this kind.
    pub fn node_count(self) -> usize {
        match self {
            Self::Triangle => 3,
            Self::Quadrilateral => 4,
            Self::Prism => 6,
            Self::Hexahedron => 8,
        }
    }

    /// `true` for the volume kinds found in layered 3D meshes.
    pub fn is_volume(self) -> bool {
        matches!(self, Self::Prism | Self::Hexahedron)
    }

    /// Number of nodes in one horizontal face of this kind.
    ///
    /// For volume kinds the node ring is the bottom face followed by the
    /// top face, so a face holds half the nodes; for 2D kinds the whole
    /// ring is the face.
    pub fn face_node_count(self) -> usize {
        match self {
            Self::Triangle | Self::Quadrilateral => self.node_count(),
            Self::Prism | Self::Hexahedron => self.node_count() / 2,
        }
    }
}

/// A single mesh element: 1-based id, ordered node ids, kind tag.
///
/// The node order defines the ring winding used for area and centroid
/// computation. For volume kinds the first half of the ring is the bottom
/// face and the second half the top face.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    id: u32,
    kind: ElementKind,
    node_ids: Vec<u32>,
}

impl Element {
    /// Create an element, deriving its kind from the node count.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::UnsupportedNodeCount`] when the node count
    /// is not 3, 4, 6 or 8.
    pub fn new(id: u32, node_ids: Vec<u32>) -> Result<Self, GeometryError> {
        let kind = ElementKind::from_node_count(node_ids.len()).ok_or(
            GeometryError::UnsupportedNodeCount {
                element_id: id,
                n_nodes: node_ids.len(),
            },
        )?;
        Ok(Self { id, kind, node_ids })
    }

    /// 1-based element id.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Kind tag derived from the node count.
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Ordered node ids forming the element ring.
    pub fn node_ids(&self) -> &[u32] {
        &self.node_ids
    }

    /// Node ids of the bottom horizontal face (whole ring for 2D kinds).
    pub fn bottom_face(&self) -> &[u32] {
        &self.node_ids[..self.kind.face_node_count()]
    }

    /// Node ids of the top horizontal face (whole ring for 2D kinds).
    pub fn top_face(&self) -> &[u32] {
        let n = self.kind.face_node_count();
        &self.node_ids[self.node_ids.len() - n..]
    }
}
