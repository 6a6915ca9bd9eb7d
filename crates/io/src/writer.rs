//! Validated writing of mesh data files.

use std::path::Path;

use tracing::debug;

use flexmesh_geometry::MeshGeometry;

use crate::block::BlockWriter;
use crate::dataset::Dataset;
use crate::error::IoError;
use crate::guard::ScopedFile;
use crate::header;
use crate::items::ItemCatalog;

/// Options for [`write_data_file`].
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Restrict the written geometry to these element ids.
    element_ids: Option<Vec<u32>>,
    /// Catalog the dataset's items must match (existing-item context).
    expected_items: Option<ItemCatalog>,
}

impl WriteOptions {
    /// Write everything against the full target geometry.
    pub fn all() -> Self {
        Self::default()
    }

    /// Write the sub-geometry spanned by `element_ids`; the dataset's
    /// element axis must have exactly this length. On a layered 3D mesh
    /// the top-layer id set produces the projected 2D geometry.
    pub fn with_element_ids(mut self, element_ids: Vec<u32>) -> Self {
        self.element_ids = Some(element_ids);
        self
    }

    /// Require the dataset's items to match `catalog` in count and name,
    /// for appending/overwriting items of a pre-existing catalog.
    pub fn with_expected_items(mut self, catalog: ItemCatalog) -> Self {
        self.expected_items = Some(catalog);
        self
    }
}

/// Write `dataset` onto `geometry` at `path`, producing a valid file or
/// none at all.
///
/// Validation happens before the destination is created: the element-axis
/// length of every array must equal the target element count (or
/// `element_ids.len()` when given), the time axis must be equidistant, and
/// an expected catalog (when supplied) must match in count and names. Any
/// failure after creation unwinds through a scoped guard that deletes the
/// partial file, so `path` never holds a truncated file.
///
/// Blocks are emitted in (time-step, item) nested order after the header.
///
/// # Errors
///
/// Returns [`IoError::ShapeMismatch`], [`IoError::UnsupportedTimeAxis`],
/// [`IoError::UnknownItem`], [`IoError::Geometry`] for an invalid element
/// subset, or [`IoError::Io`] on device failure.
pub fn write_data_file(
    path: impl AsRef<Path>,
    geometry: &MeshGeometry,
    dataset: &Dataset,
    options: &WriteOptions,
) -> Result<(), IoError> {
    let path = path.as_ref();

    // -- Validation, all before any byte is committed -----------------------

    if !dataset.time().is_equidistant() {
        return Err(IoError::UnsupportedTimeAxis);
    }

    let expected_elements = options
        .element_ids
        .as_ref()
        .map_or(geometry.n_elements(), Vec::len);
    for (item, array) in dataset.items().iter().zip(dataset.data()) {
        if array.ncols() != expected_elements {
            return Err(IoError::ShapeMismatch {
                what: format!("item '{}' element axis", item.name()),
                expected: expected_elements,
                got: array.ncols(),
            });
        }
    }

    if let Some(expected) = &options.expected_items {
        if expected.len() != dataset.n_items() {
            return Err(IoError::ShapeMismatch {
                what: "item count vs target catalog".to_string(),
                expected: expected.len(),
                got: dataset.n_items(),
            });
        }
        for (target, item) in expected.items().iter().zip(dataset.items()) {
            if target.name() != item.name() {
                return Err(IoError::UnknownItem {
                    name: item.name().to_string(),
                });
            }
        }
    }

    // Deriving the sub-geometry can fail too; still before file creation.
    let extracted = options
        .element_ids
        .as_ref()
        .map(|ids| geometry.extract_elements(ids).map(|(mesh, _)| mesh))
        .transpose()?;
    let target = extracted.as_ref().unwrap_or(geometry);

    debug!(
        path = %path.display(),
        n_items = dataset.n_items(),
        n_steps = dataset.n_time_steps(),
        n_elements = target.n_elements(),
        "writing mesh data file"
    );

    // -- Header + blocks through the delete-on-failure guard ----------------

    let items = ItemCatalog::new(dataset.items().to_vec());
    let mut guard = ScopedFile::create(path)?;
    write_payload(&mut guard, target, &items, dataset)?;
    guard.commit()
}

fn write_payload(
    guard: &mut ScopedFile,
    geometry: &MeshGeometry,
    items: &ItemCatalog,
    dataset: &Dataset,
) -> Result<(), IoError> {
    let writer = guard.writer();
    header::write_header(writer, geometry, items, dataset.time())?;

    let mut blocks = BlockWriter::new(writer, dataset.n_elements());
    for step in 0..dataset.n_time_steps() {
        for array in dataset.data() {
            blocks.write_block(&array.row(step).to_vec())?;
        }
    }
    Ok(())
}
