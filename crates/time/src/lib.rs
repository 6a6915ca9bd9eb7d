//! # flexmesh-time
//!
//! Time axis model for flexible-mesh result files: either an equidistant
//! axis (start, fixed step, step count) or an explicit list of strictly
//! increasing timestamps, plus time-step selection.
//!
//! Selecting a uniformly strided subset of an equidistant axis stays
//! equidistant with a scaled step; any irregular subset degrades to a
//! non-equidistant axis, which the file writer rejects because the format
//! has no representation for irregular spacing.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `axis` | The `TimeAxis` type and subsetting |
//! | `select` | Scalar/list/all time-step selection |
//! | `error` | Error types |

mod axis;
mod error;
mod select;

pub use axis::TimeAxis;
pub use error::TimeError;
pub use select::TimeSelection;
