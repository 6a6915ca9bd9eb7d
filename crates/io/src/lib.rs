//! # flexmesh-io
//!
//! Reader and writer for the flexible-mesh binary time-series format: a
//! header block (projection, node/element topology, layer structure, item
//! descriptors, time-axis parameters) followed by a sequential stream of
//! little-endian `f32` data blocks ordered time-step-major, then
//! item-major.
//!
//! [`MeshDataFile::open`] parses the header into an immutable
//! [`MeshGeometry`](flexmesh_geometry::MeshGeometry) (shared via `Arc`),
//! an [`ItemCatalog`] and a [`TimeAxis`](flexmesh_time::TimeAxis);
//! [`MeshDataFile::read`] streams selected blocks into a [`Dataset`].
//! [`write_data_file`] validates a dataset against a target geometry and
//! either produces a complete file or none at all: any failure after the
//! destination has been created deletes the partial output before the
//! error is returned.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `items` | Item descriptors, catalog and name/index selection |
//! | `dataset` | In-memory (time x element) arrays per item |
//! | `header` | Binary header encode/decode |
//! | `block` | Data-block device: seeking reader, sequential writer |
//! | `reader` | `MeshDataFile` and `ReadRequest` |
//! | `writer` | Validated writing and `WriteOptions` |
//! | `guard` | Delete-on-failure scoped file |
//! | `mesh_ascii` | Plain-text mesh reader (write-source workflow) |
//! | `error` | Error types |

mod block;
mod dataset;
mod error;
mod guard;
mod header;
mod items;
mod mesh_ascii;
mod reader;
mod writer;

pub use dataset::Dataset;
pub use error::IoError;
pub use items::{ItemCatalog, ItemInfo, ItemSelection, ItemSelector, ValueType};
pub use mesh_ascii::read_mesh_ascii;
pub use reader::{MeshDataFile, ReadRequest};
pub use writer::{WriteOptions, write_data_file};
