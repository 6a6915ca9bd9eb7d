//! Error types for flexmesh-io.

use std::path::PathBuf;

use flexmesh_geometry::GeometryError;
use flexmesh_time::TimeError;

/// Error type for all fallible operations in the flexmesh-io crate.
///
/// Covers missing and corrupt files, item-name resolution failures,
/// out-of-range indices, write-time shape validation, the equidistant-axis
/// requirement of the on-disk format, and wrapped errors from the geometry
/// and time crates and the operating system.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when a required file does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// Returned when the file header is unreadable or unrecognised.
    #[error("corrupt header: {reason}")]
    CorruptHeader {
        /// Description of the first problem encountered.
        reason: String,
    },

    /// Returned when an item name has no exact match in the catalog.
    #[error("unknown item '{name}'")]
    UnknownItem {
        /// The unresolvable item name.
        name: String,
    },

    /// Returned when an item, time-step or element index is outside the
    /// valid range.
    #[error("index {index} out of range (valid 0..{len})")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Length of the axis being indexed.
        len: usize,
    },

    /// Returned when a dataset array shape disagrees with the target
    /// geometry or item count at write time.
    #[error("shape mismatch for {what}: expected {expected}, got {got}")]
    ShapeMismatch {
        /// What was being checked (item name or axis description).
        what: String,
        /// Expected length.
        expected: usize,
        /// Actual length.
        got: usize,
    },

    /// Returned when a non-equidistant time axis is supplied to the
    /// writer; the format has no representation for irregular spacing.
    #[error("cannot write non-equidistant time axis")]
    UnsupportedTimeAxis,

    /// Wraps an underlying operating-system I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wraps an error from the time crate.
    #[error(transparent)]
    Time(#[from] TimeError),

    /// Wraps an error from the geometry crate.
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}
