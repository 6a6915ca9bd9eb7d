//! Data-block device.
//!
//! The stream after the header holds `n_steps x n_items` blocks of
//! `n_elements` little-endian `f32` values, ordered time-step-major then
//! item-major. The format has no random-access index, so readers compute
//! block offsets from the fixed block size and must request blocks in
//! non-decreasing file order; the writer emits them strictly in order.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom, Write};

use crate::error::IoError;

/// Size in bytes of one stored value.
const VALUE_SIZE: u64 = 4;

/// Seeking reader over the data-block stream of an open file.
pub(crate) struct BlockReader {
    file: BufReader<File>,
    data_offset: u64,
    n_items: usize,
    n_steps: usize,
    n_elements: usize,
    scratch: Vec<u8>,
}

impl BlockReader {
    pub(crate) fn new(
        file: BufReader<File>,
        data_offset: u64,
        n_items: usize,
        n_steps: usize,
        n_elements: usize,
    ) -> Self {
        Self {
            file,
            data_offset,
            n_items,
            n_steps,
            n_elements,
            scratch: vec![0u8; n_elements * VALUE_SIZE as usize],
        }
    }

    /// Read the block for `(item, step)` into `out`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Io`] on seek/read failure (including truncation).
    ///
    /// # Panics
    ///
    /// Debug-asserts that `item`/`step` are in range and `out` has the
    /// element-axis length; callers resolve selections before any I/O.
    pub(crate) fn read_block(
        &mut self,
        item: usize,
        step: usize,
        out: &mut [f32],
    ) -> Result<(), IoError> {
        debug_assert!(item < self.n_items);
        debug_assert!(step < self.n_steps);
        debug_assert_eq!(out.len(), self.n_elements);

        let block_index = (step * self.n_items + item) as u64;
        let offset = self.data_offset + block_index * self.n_elements as u64 * VALUE_SIZE;
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read_exact(&mut self.scratch)?;

        for (value, chunk) in out.iter_mut().zip(self.scratch.chunks_exact(4)) {
            *value = f32::from_le_bytes(chunk.try_into().expect("chunks_exact yields 4 bytes"));
        }
        Ok(())
    }
}

/// Sequential writer for the data-block stream.
///
/// Blocks must be supplied in (time-step, item) nested order; the writer
/// only appends.
pub(crate) struct BlockWriter<'a, W: Write> {
    inner: &'a mut W,
    n_elements: usize,
}

impl<'a, W: Write> BlockWriter<'a, W> {
    pub(crate) fn new(inner: &'a mut W, n_elements: usize) -> Self {
        Self { inner, n_elements }
    }

    /// Append one block.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::ShapeMismatch`] when `values` does not have the
    /// element-axis length, and [`IoError::Io`] on write failure.
    pub(crate) fn write_block(&mut self, values: &[f32]) -> Result<(), IoError> {
        if values.len() != self.n_elements {
            return Err(IoError::ShapeMismatch {
                what: "data block element axis".to_string(),
                expected: self.n_elements,
                got: values.len(),
            });
        }
        for value in values {
            self.inner.write_all(&value.to_le_bytes())?;
        }
        Ok(())
    }
}
