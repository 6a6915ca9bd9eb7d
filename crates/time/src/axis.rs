//! Equidistant / non-equidistant time axis.

use chrono::{NaiveDateTime, TimeDelta};

use crate::error::TimeError;
use crate::select::TimeSelection;

/// Fallback step assumed for an axis built from a single timestamp, so
/// one-step datasets stay writable.
fn default_single_step() -> TimeDelta {
    TimeDelta::seconds(1)
}

#[derive(Debug, Clone, PartialEq)]
enum Repr {
    /// Start timestamp, fixed step, step count.
    Equidistant {
        start: NaiveDateTime,
        step: TimeDelta,
        n_steps: usize,
    },
    /// Explicit strictly increasing timestamps with irregular spacing.
    Explicit { timestamps: Vec<NaiveDateTime> },
}

/// Time axis of a flexible-mesh result file.
///
/// Always holds at least one time step. An axis is either *equidistant*
/// (start, fixed step, count) or *non-equidistant* (explicit timestamps);
/// only equidistant axes can be written back to a file.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeAxis {
    repr: Repr,
}

impl TimeAxis {
    /// Create an equidistant axis from a start timestamp, step and count.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::EmptyAxis`] when `n_steps` is zero and
    /// [`TimeError::NonPositiveStep`] when `step` is zero or negative.
    pub fn equidistant(
        start: NaiveDateTime,
        step: TimeDelta,
        n_steps: usize,
    ) -> Result<Self, TimeError> {
        if n_steps == 0 {
            return Err(TimeError::EmptyAxis);
        }
        if step <= TimeDelta::zero() {
            return Err(TimeError::NonPositiveStep {
                seconds: delta_to_seconds(step),
            });
        }
        Ok(Self {
            repr: Repr::Equidistant {
                start,
                step,
                n_steps,
            },
        })
    }

    /// Create an axis from an explicit timestamp list.
    ///
    /// Uniform spacing is detected and collapses to an equidistant axis; a
    /// single timestamp becomes an equidistant axis with a 1 s step.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::EmptyAxis`] for an empty list and
    /// [`TimeError::NotIncreasing`] when the list is not strictly
    /// increasing.
    pub fn from_timestamps(timestamps: Vec<NaiveDateTime>) -> Result<Self, TimeError> {
        let first = *timestamps.first().ok_or(TimeError::EmptyAxis)?;

        for (i, pair) in timestamps.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(TimeError::NotIncreasing { position: i + 1 });
            }
        }

        if timestamps.len() == 1 {
            return Self::equidistant(first, default_single_step(), 1);
        }

        let step = timestamps[1] - timestamps[0];
        let uniform = timestamps.windows(2).all(|pair| pair[1] - pair[0] == step);
        if uniform {
            return Self::equidistant(first, step, timestamps.len());
        }

        Ok(Self {
            repr: Repr::Explicit { timestamps },
        })
    }

    /// Number of time steps. Always at least one.
    pub fn len(&self) -> usize {
        match &self.repr {
            Repr::Equidistant { n_steps, .. } => *n_steps,
            Repr::Explicit { timestamps } => timestamps.len(),
        }
    }

    /// Always `false`; present for clippy's `len`/`is_empty` convention.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// `true` when the axis has a constant step and can be written to file.
    pub fn is_equidistant(&self) -> bool {
        matches!(self.repr, Repr::Equidistant { .. })
    }

    /// Timestamp of the first step.
    pub fn start(&self) -> NaiveDateTime {
        match &self.repr {
            Repr::Equidistant { start, .. } => *start,
            Repr::Explicit { timestamps } => timestamps[0],
        }
    }

    /// Step duration for equidistant axes, `None` otherwise.
    pub fn step(&self) -> Option<TimeDelta> {
        match &self.repr {
            Repr::Equidistant { step, .. } => Some(*step),
            Repr::Explicit { .. } => None,
        }
    }

    /// Step duration in seconds for equidistant axes, `None` otherwise.
    pub fn step_seconds(&self) -> Option<f64> {
        self.step().map(delta_to_seconds)
    }

    /// Timestamp of step `index`.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::IndexOutOfRange`] when `index >= len()`.
    pub fn timestamp(&self, index: usize) -> Result<NaiveDateTime, TimeError> {
        if index >= self.len() {
            return Err(TimeError::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        Ok(match &self.repr {
            Repr::Equidistant { start, step, .. } => *start + *step * index as i32,
            Repr::Explicit { timestamps } => timestamps[index],
        })
    }

    /// Materialise all timestamps in step order.
    pub fn timestamps(&self) -> Vec<NaiveDateTime> {
        match &self.repr {
            Repr::Equidistant { start, step, n_steps } => {
                (0..*n_steps).map(|i| *start + *step * i as i32).collect()
            }
            Repr::Explicit { timestamps } => timestamps.clone(),
        }
    }

    /// Resolve a selection against this axis and return the subset axis.
    ///
    /// # Errors
    ///
    /// Propagates resolution errors from [`TimeSelection::resolve`].
    pub fn select(&self, selection: &TimeSelection) -> Result<Self, TimeError> {
        let indices = selection.resolve(self.len())?;
        self.subset(&indices)
    }

    /// Build the axis spanned by `indices` (strictly increasing, in range).
    ///
    /// A uniformly strided subset of an equidistant axis stays equidistant
    /// with the step scaled by the stride; a single index keeps the
    /// original step. Anything else becomes non-equidistant.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::EmptyAxis`] for an empty index list,
    /// [`TimeError::UnorderedSelection`] for a non-increasing list, and
    /// [`TimeError::IndexOutOfRange`] for indices past the end.
    pub fn subset(&self, indices: &[usize]) -> Result<Self, TimeError> {
        if indices.is_empty() {
            return Err(TimeError::EmptyAxis);
        }
        for (i, pair) in indices.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(TimeError::UnorderedSelection { position: i + 1 });
            }
        }
        if let Some(&max) = indices.last()
            && max >= self.len()
        {
            return Err(TimeError::IndexOutOfRange {
                index: max,
                len: self.len(),
            });
        }

        if let Repr::Equidistant { start, step, .. } = &self.repr {
            let sub_start = *start + *step * indices[0] as i32;
            if indices.len() == 1 {
                return Self::equidistant(sub_start, *step, 1);
            }
            let stride = indices[1] - indices[0];
            let strided = indices.windows(2).all(|pair| pair[1] - pair[0] == stride);
            if strided {
                return Self::equidistant(sub_start, *step * stride as i32, indices.len());
            }
        }

        let timestamps = indices
            .iter()
            .map(|&i| self.timestamp(i))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_timestamps(timestamps)
    }
}

fn delta_to_seconds(delta: TimeDelta) -> f64 {
    delta
        .num_microseconds()
        .map_or_else(|| delta.num_seconds() as f64, |us| us as f64 / 1e6)
}
