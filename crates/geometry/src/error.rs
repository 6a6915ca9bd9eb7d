//! Error types for the flexmesh-geometry crate.

/// Error type for all fallible operations in the flexmesh-geometry crate.
///
/// Covers construction-time topology validation (node/element ordering,
/// connectivity, layer structure) and failures of the derived operations
/// (element extraction, top-layer projection).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    /// Returned when a mesh is constructed without nodes or elements.
    #[error("mesh must contain at least one node and one element")]
    EmptyMesh,

    /// Returned when node ids are not strictly increasing in storage order.
    #[error("node ids not strictly increasing at position {position}")]
    NodesNotSorted {
        /// Index of the first node whose id is <= its predecessor's.
        position: usize,
    },

    /// Returned when element ids are not strictly increasing in storage order.
    #[error("element ids not strictly increasing at position {position}")]
    ElementsNotSorted {
        /// Index of the first element whose id is <= its predecessor's.
        position: usize,
    },

    /// Returned when an element references a node id that does not exist.
    #[error("element {element_id} references unknown node {node_id}")]
    UnknownNode {
        /// Id of the referencing element.
        element_id: u32,
        /// The unresolvable node id.
        node_id: u32,
    },

    /// Returned when an element has a node count with no known element kind.
    #[error("element {element_id} has unsupported node count {n_nodes} (expected 3, 4, 6 or 8)")]
    UnsupportedNodeCount {
        /// Id of the offending element.
        element_id: u32,
        /// The unsupported node count.
        n_nodes: usize,
    },

    /// Returned when the per-element layer array length disagrees with the
    /// element count.
    #[error("layer index array has {got} entries, mesh has {expected} elements")]
    LayerMismatch {
        /// Number of elements in the mesh.
        expected: usize,
        /// Number of per-element layer entries supplied.
        got: usize,
    },

    /// Returned when a per-element layer index is >= the layer count.
    #[error("layer index {layer} at element position {position} exceeds layer count {n_layers}")]
    InvalidLayerIndex {
        /// Position of the element on the element axis.
        position: usize,
        /// The offending layer index.
        layer: u32,
        /// Total number of layers.
        n_layers: u32,
    },

    /// Returned when the sigma-layer count exceeds the total layer count.
    #[error("sigma layer count {sigma} exceeds total layer count {total}")]
    SigmaExceedsTotal {
        /// Number of sigma layers supplied.
        sigma: u32,
        /// Total number of layers.
        total: u32,
    },

    /// Returned when a layered-mesh operation is applied to a 2D mesh.
    #[error("operation requires a layered 3D mesh")]
    NotLayered,

    /// Returned when an element id cannot be resolved in the mesh.
    #[error("unknown element id {id}")]
    UnknownElement {
        /// The unresolvable element id.
        id: u32,
    },

    /// Returned when a 3D mesh is asked to extract an element subset other
    /// than its top-layer element set.
    #[error("3D meshes support extraction of the top-layer element set only")]
    UnsupportedSubset,
}
