//! File opening and selected reading.

use std::fs::File;
use std::io::{BufReader, Seek};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ndarray::Array2;
use tracing::debug;

use flexmesh_geometry::MeshGeometry;
use flexmesh_time::{TimeAxis, TimeSelection};

use crate::block::BlockReader;
use crate::dataset::Dataset;
use crate::error::IoError;
use crate::header;
use crate::items::{ItemCatalog, ItemSelection};
use crate::writer::{self, WriteOptions};

// ---------------------------------------------------------------------------
// ReadRequest
// ---------------------------------------------------------------------------

/// What to read from an open file: items, time steps, and optionally a
/// restricted element-id set.
///
/// The default request reads everything. Use the builder methods to
/// narrow it; all selections are resolved against the file's catalog,
/// axis and geometry before any block I/O begins.
#[derive(Debug, Clone, Default)]
pub struct ReadRequest {
    /// Which items to read, in the given order.
    items: ItemSelection,
    /// Which time steps to read.
    time_steps: TimeSelection,
    /// Optional element ids restricting the element axis, caller order
    /// preserved.
    element_ids: Option<Vec<u32>>,
}

impl ReadRequest {
    /// Read everything: all items, all time steps, all elements.
    pub fn all() -> Self {
        Self::default()
    }

    /// Set the item selection.
    pub fn with_items(mut self, items: ItemSelection) -> Self {
        self.items = items;
        self
    }

    /// Set the time-step selection.
    pub fn with_time_steps(mut self, time_steps: impl Into<TimeSelection>) -> Self {
        self.time_steps = time_steps.into();
        self
    }

    /// Restrict the element axis to exactly these ids, in this order.
    pub fn with_element_ids(mut self, element_ids: Vec<u32>) -> Self {
        self.element_ids = Some(element_ids);
        self
    }
}

// ---------------------------------------------------------------------------
// MeshDataFile
// ---------------------------------------------------------------------------

/// An opened flexible-mesh data file.
///
/// Opening parses the header once into an immutable geometry (shared via
/// `Arc`), item catalog and time axis. Each [`read`](Self::read) call
/// opens its own device handle, so concurrent reads against the same
/// opened file are safe; the returned geometry is never mutated.
#[derive(Debug)]
pub struct MeshDataFile {
    path: PathBuf,
    geometry: Arc<MeshGeometry>,
    items: ItemCatalog,
    time: TimeAxis,
    data_offset: u64,
}

impl MeshDataFile {
    /// Open a file and parse its header.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::FileNotFound`] when the path does not exist,
    /// [`IoError::CorruptHeader`] on magic/version mismatch or malformed
    /// header fields, and [`IoError::Geometry`] when the stored topology
    /// is invalid.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(IoError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let mut file = BufReader::new(File::open(path)?);
        let header = header::read_header(&mut file)?;
        let data_offset = file.stream_position()?;

        debug!(
            path = %path.display(),
            n_items = header.items.len(),
            n_steps = header.time.len(),
            n_elements = header.geometry.n_elements(),
            "opened mesh data file"
        );

        Ok(Self {
            path: path.to_path_buf(),
            geometry: Arc::new(header.geometry),
            items: header.items,
            time: header.time,
            data_offset,
        })
    }

    /// Path the file was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The immutable mesh geometry, shareable across readers.
    pub fn geometry(&self) -> Arc<MeshGeometry> {
        Arc::clone(&self.geometry)
    }

    /// The item catalog declared by the header.
    pub fn items(&self) -> &ItemCatalog {
        &self.items
    }

    /// The time axis declared by the header.
    pub fn time(&self) -> &TimeAxis {
        &self.time
    }

    /// Number of time steps declared by the header.
    pub fn n_time_steps(&self) -> usize {
        self.time.len()
    }

    /// Number of elements on the element axis.
    pub fn n_elements(&self) -> usize {
        self.geometry.n_elements()
    }

    /// Read the selected items/time steps/elements into a [`Dataset`].
    ///
    /// Returned arrays are laid out time-step-major (axis 0 = time,
    /// axis 1 = element) regardless of on-disk order. Only the selected
    /// (item, time-step) blocks are fetched, traversed in file order;
    /// element restriction gathers from each decoded block and preserves
    /// the caller-given id order.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::UnknownItem`] for an unmatched item name,
    /// [`IoError::IndexOutOfRange`] for item/time-step/element selections
    /// outside the file's bounds (wrapped time errors keep their own
    /// variant), and [`IoError::Io`] when the data stream is truncated.
    pub fn read(&self, request: &ReadRequest) -> Result<Dataset, IoError> {
        let item_indices = self.items.resolve(&request.items)?;
        let step_indices = request.time_steps.resolve(self.time.len())?;
        let time = self.time.subset(&step_indices)?;

        let element_indices = request
            .element_ids
            .as_ref()
            .map(|ids| {
                ids.iter()
                    .map(|&id| {
                        self.geometry
                            .element_index(id)
                            .ok_or(IoError::IndexOutOfRange {
                                index: id as usize,
                                len: self.geometry.n_elements(),
                            })
                    })
                    .collect::<Result<Vec<usize>, IoError>>()
            })
            .transpose()?;

        let n_rows = step_indices.len();
        let n_cols = element_indices
            .as_ref()
            .map_or(self.geometry.n_elements(), Vec::len);

        let mut arrays: Vec<Array2<f32>> = (0..item_indices.len())
            .map(|_| Array2::zeros((n_rows, n_cols)))
            .collect();

        // Blocks are fetched in file order (ascending step, then ascending
        // item) and scattered into the caller-ordered output slots.
        let mut slots: Vec<(usize, usize)> = item_indices
            .iter()
            .copied()
            .enumerate()
            .map(|(slot, item)| (item, slot))
            .collect();
        slots.sort_by_key(|&(item, _)| item);

        let file = BufReader::new(File::open(&self.path)?);
        let mut device = BlockReader::new(
            file,
            self.data_offset,
            self.items.len(),
            self.time.len(),
            self.geometry.n_elements(),
        );
        let mut block = vec![0f32; self.geometry.n_elements()];

        debug!(
            n_steps = n_rows,
            n_items = slots.len(),
            n_elements = n_cols,
            "reading data blocks"
        );

        for (row, &step) in step_indices.iter().enumerate() {
            for &(item, slot) in &slots {
                device.read_block(item, step, &mut block)?;
                match &element_indices {
                    None => {
                        for (value, &v) in arrays[slot].row_mut(row).iter_mut().zip(&block) {
                            *value = v;
                        }
                    }
                    Some(indices) => {
                        for (col, &element) in indices.iter().enumerate() {
                            arrays[slot][[row, col]] = block[element];
                        }
                    }
                }
            }
        }

        let items = item_indices
            .iter()
            .map(|&i| self.items.items()[i].clone())
            .collect();
        Dataset::new(items, time, arrays)
    }

    /// Write `dataset` to `path` against this file's geometry.
    ///
    /// Convenience for [`write_data_file`](crate::write_data_file); see it
    /// for validation and atomicity guarantees.
    ///
    /// # Errors
    ///
    /// Propagates every error of [`write_data_file`](crate::write_data_file).
    pub fn write(
        &self,
        path: impl AsRef<Path>,
        dataset: &Dataset,
        options: &WriteOptions,
    ) -> Result<(), IoError> {
        writer::write_data_file(path, &self.geometry, dataset, options)
    }
}
