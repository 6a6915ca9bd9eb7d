//! Vertical layer structure of 3D meshes.

use crate::error::GeometryError;

/// Layer structure of a layered 3D mesh.
///
/// The element table of a layered mesh is ordered column by column, bottom
/// to top: within one vertical column the per-element layer index is
/// strictly increasing, and a drop (or repeat) starts the next column.
/// Layer index 0 is the bottom layer; index `n_layers - 1` is the surface.
/// Sigma layers occupy the top of each column, z-layers (if any) the
/// bottom, so `n_z_layers = n_layers - n_sigma_layers`.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerInfo {
    n_layers: u32,
    n_sigma_layers: u32,
    elem_layer: Vec<u32>,
    top_elements: Vec<usize>,
    bottom_elements: Vec<usize>,
}

impl LayerInfo {
    /// Build the layer structure from the per-element layer index array.
    ///
    /// Top and bottom element positions per column are derived here once.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::SigmaExceedsTotal`] when
    /// `n_sigma_layers > n_layers` and [`GeometryError::InvalidLayerIndex`]
    /// when an entry is `>= n_layers`.
    pub fn new(
        n_layers: u32,
        n_sigma_layers: u32,
        elem_layer: Vec<u32>,
    ) -> Result<Self, GeometryError> {
        if n_sigma_layers > n_layers {
            return Err(GeometryError::SigmaExceedsTotal {
                sigma: n_sigma_layers,
                total: n_layers,
            });
        }
        for (position, &layer) in elem_layer.iter().enumerate() {
            if layer >= n_layers {
                return Err(GeometryError::InvalidLayerIndex {
                    position,
                    layer,
                    n_layers,
                });
            }
        }

        let (top_elements, bottom_elements) = derive_columns(&elem_layer);

        Ok(Self {
            n_layers,
            n_sigma_layers,
            elem_layer,
            top_elements,
            bottom_elements,
        })
    }

    /// Total number of layers.
    pub fn n_layers(&self) -> u32 {
        self.n_layers
    }

    /// Number of terrain-following sigma layers at the top of each column.
    pub fn n_sigma_layers(&self) -> u32 {
        self.n_sigma_layers
    }

    /// Number of fixed-elevation z layers below the sigma region.
    pub fn n_z_layers(&self) -> u32 {
        self.n_layers - self.n_sigma_layers
    }

    /// Per-element layer index, 0 = bottom.
    pub fn elem_layer(&self) -> &[u32] {
        &self.elem_layer
    }

    /// Element-axis positions of the topmost element of each column.
    pub fn top_elements(&self) -> &[usize] {
        &self.top_elements
    }

    /// Element-axis positions of the bottommost element of each column.
    pub fn bottom_elements(&self) -> &[usize] {
        &self.bottom_elements
    }

    /// Number of vertical columns.
    pub fn n_columns(&self) -> usize {
        self.top_elements.len()
    }
}

/// Split the layer index sequence into columns.
///
/// A column is a maximal run of strictly increasing layer indices; element
/// `i` tops its column when the next index does not increase, and bottoms
/// a column when the previous one did not increase into it.
fn derive_columns(elem_layer: &[u32]) -> (Vec<usize>, Vec<usize>) {
    let mut top = Vec::new();
    let mut bottom = Vec::new();

    for i in 0..elem_layer.len() {
        if i == 0 || elem_layer[i] <= elem_layer[i - 1] {
            bottom.push(i);
        }
        if i + 1 == elem_layer.len() || elem_layer[i + 1] <= elem_layer[i] {
            top.push(i);
        }
    }

    (top, bottom)
}
