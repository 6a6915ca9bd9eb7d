//! Error types for the flexmesh-time crate.

/// Error type for all fallible operations in the flexmesh-time crate.
///
/// Covers axis construction failures (empty or unordered timestamp lists,
/// non-positive steps) and time-step selection failures (out-of-range or
/// unordered indices).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimeError {
    /// Returned when an axis or a selection would contain no time steps.
    #[error("time axis must contain at least one time step")]
    EmptyAxis,

    /// Returned when a timestamp list is not strictly increasing.
    #[error("timestamps not strictly increasing at position {position}")]
    NotIncreasing {
        /// Index of the first timestamp that is <= its predecessor.
        position: usize,
    },

    /// Returned when an equidistant axis is given a zero or negative step.
    #[error("time step must be positive, got {seconds} s")]
    NonPositiveStep {
        /// The offending step length in seconds.
        seconds: f64,
    },

    /// Returned when a time-step index is outside the valid range.
    #[error("time step index {index} out of range (axis has {len} steps, valid 0..{len})")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of steps on the axis.
        len: usize,
    },

    /// Returned when an explicit index list is not strictly increasing.
    #[error("time step selection not strictly increasing at position {position}")]
    UnorderedSelection {
        /// Index into the selection list of the first violation.
        position: usize,
    },
}
