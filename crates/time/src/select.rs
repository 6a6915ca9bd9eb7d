//! Time-step selection.

use crate::error::TimeError;

/// Which time steps of an axis to read.
///
/// Resolved once into a concrete index list before any I/O begins.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TimeSelection {
    /// Every time step on the axis.
    #[default]
    All,
    /// A single time step by index.
    Single(usize),
    /// An explicit, strictly increasing list of indices.
    List(Vec<usize>),
}

impl TimeSelection {
    /// Resolve this selection against an axis of `len` steps.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::IndexOutOfRange`] when an index is `>= len`,
    /// [`TimeError::UnorderedSelection`] when a list is not strictly
    /// increasing, and [`TimeError::EmptyAxis`] for an empty list.
    pub fn resolve(&self, len: usize) -> Result<Vec<usize>, TimeError> {
        match self {
            Self::All => Ok((0..len).collect()),
            Self::Single(index) => {
                if *index >= len {
                    return Err(TimeError::IndexOutOfRange { index: *index, len });
                }
                Ok(vec![*index])
            }
            Self::List(indices) => {
                if indices.is_empty() {
                    return Err(TimeError::EmptyAxis);
                }
                for (i, pair) in indices.windows(2).enumerate() {
                    if pair[1] <= pair[0] {
                        return Err(TimeError::UnorderedSelection { position: i + 1 });
                    }
                }
                for &index in indices {
                    if index >= len {
                        return Err(TimeError::IndexOutOfRange { index, len });
                    }
                }
                Ok(indices.clone())
            }
        }
    }
}

impl From<usize> for TimeSelection {
    fn from(index: usize) -> Self {
        Self::Single(index)
    }
}

impl From<Vec<usize>> for TimeSelection {
    fn from(indices: Vec<usize>) -> Self {
        Self::List(indices)
    }
}
