//! Delete-on-failure scoped output file.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::IoError;

/// Output file that deletes itself unless explicitly committed.
///
/// The writer acquires the destination through this guard; if the guard is
/// dropped before [`commit`](Self::commit) — validation failure, I/O
/// failure, panic, or caller cancellation — the partially written file is
/// closed and removed, so callers never observe a truncated file.
#[derive(Debug)]
pub(crate) struct ScopedFile {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    committed: bool,
}

impl ScopedFile {
    /// Create the destination file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Io`] when the file cannot be created.
    pub(crate) fn create(path: &Path) -> Result<Self, IoError> {
        let file = File::create(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: Some(BufWriter::new(file)),
            committed: false,
        })
    }

    /// The buffered writer over the destination.
    ///
    /// # Panics
    ///
    /// Never panics in practice: the writer is only taken by `commit`,
    /// which consumes the guard.
    pub(crate) fn writer(&mut self) -> &mut BufWriter<File> {
        self.writer
            .as_mut()
            .expect("writer present until commit consumes the guard")
    }

    /// Flush and keep the file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Io`] when the final flush fails; the file is
    /// deleted in that case, exactly as for any earlier failure.
    pub(crate) fn commit(mut self) -> Result<(), IoError> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        self.writer = None;
        self.committed = true;
        Ok(())
    }
}

impl Drop for ScopedFile {
    fn drop(&mut self) {
        if !self.committed {
            // Close before unlinking.
            self.writer = None;
            if std::fs::remove_file(&self.path).is_ok() {
                debug!(path = %self.path.display(), "removed partial output file");
            }
        }
    }
}
