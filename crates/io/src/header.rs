//! Binary header encode/decode.
//!
//! Layout (all integers and floats little-endian):
//!
//! ```text
//! magic           [u8; 4] = b"FMDF"
//! version         u16     = 1
//! is_geo          u8
//! projection      u16 len + UTF-8 bytes
//! n_nodes         u32
//! n_elements      u32
//! n_layers        u32
//! n_sigma_layers  u32
//! nodes           n_nodes x (id u32, x f64, y f64, z f64, code i32)
//! elements        n_elements x (id u32, n u8, n x node-id u32)
//! elem_layers     n_elements x u32            (only when n_layers > 0)
//! n_items         u32
//! items           n_items x (name, unit, value_type u8)
//! start_time      i64 unix seconds
//! step_seconds    f64
//! n_steps         u32
//! ```
//!
//! The data-block stream starts immediately after the header.

use std::io::{Read, Write};

use chrono::{DateTime, TimeDelta};

use flexmesh_geometry::{Element, LayerInfo, MeshGeometry, Node, Projection};
use flexmesh_time::TimeAxis;

use crate::error::IoError;
use crate::items::{ItemCatalog, ItemInfo, ValueType};

pub(crate) const MAGIC: [u8; 4] = *b"FMDF";
pub(crate) const VERSION: u16 = 1;

/// Upper bound on node/element/item counts accepted from a header; counts
/// beyond this are treated as corruption rather than allocated.
const MAX_COUNT: u32 = 100_000_000;

/// Everything the header describes: topology, item catalog, time axis.
#[derive(Debug)]
pub(crate) struct FileHeader {
    pub(crate) geometry: MeshGeometry,
    pub(crate) items: ItemCatalog,
    pub(crate) time: TimeAxis,
}

/// Parse a header from the start of `reader`.
///
/// # Errors
///
/// Returns [`IoError::CorruptHeader`] on magic/version mismatch or
/// malformed fields, [`IoError::Geometry`] when the decoded topology is
/// invalid, and [`IoError::Io`] on truncation.
pub(crate) fn read_header<R: Read>(reader: &mut R) -> Result<FileHeader, IoError> {
    let magic: [u8; 4] = read_array(reader)?;
    if magic != MAGIC {
        return Err(IoError::CorruptHeader {
            reason: format!("bad magic {magic:02x?}, expected {MAGIC:02x?}"),
        });
    }
    let version = read_u16(reader)?;
    if version != VERSION {
        return Err(IoError::CorruptHeader {
            reason: format!("unsupported format version {version}, expected {VERSION}"),
        });
    }

    let is_geo = read_u8(reader)?;
    let projection_text = read_string(reader)?;
    let projection = Projection::new(projection_text);
    if (is_geo != 0) != projection.is_geo() {
        return Err(IoError::CorruptHeader {
            reason: format!(
                "is_geo flag {is_geo} disagrees with projection '{}'",
                projection.text()
            ),
        });
    }

    let n_nodes = read_count(reader, "node count")?;
    let n_elements = read_count(reader, "element count")?;
    let n_layers = read_u32(reader)?;
    let n_sigma_layers = read_u32(reader)?;

    let mut nodes = Vec::with_capacity(n_nodes);
    for _ in 0..n_nodes {
        let id = read_u32(reader)?;
        let x = read_f64(reader)?;
        let y = read_f64(reader)?;
        let z = read_f64(reader)?;
        let code = read_i32(reader)?;
        nodes.push(Node::new(id, x, y, z, code));
    }

    let mut elements = Vec::with_capacity(n_elements);
    for _ in 0..n_elements {
        let id = read_u32(reader)?;
        let n = read_u8(reader)? as usize;
        let mut node_ids = Vec::with_capacity(n);
        for _ in 0..n {
            node_ids.push(read_u32(reader)?);
        }
        elements.push(Element::new(id, node_ids)?);
    }

    let layers = if n_layers > 0 {
        let mut elem_layer = Vec::with_capacity(n_elements);
        for _ in 0..n_elements {
            elem_layer.push(read_u32(reader)?);
        }
        Some(LayerInfo::new(n_layers, n_sigma_layers, elem_layer)?)
    } else {
        None
    };

    let geometry = MeshGeometry::new(nodes, elements, layers, projection)?;

    let n_items = read_count(reader, "item count")?;
    let mut items = Vec::with_capacity(n_items);
    for _ in 0..n_items {
        let name = read_string(reader)?;
        let unit = read_string(reader)?;
        let tag = read_u8(reader)?;
        let value_type = ValueType::from_tag(tag).ok_or_else(|| IoError::CorruptHeader {
            reason: format!("unknown value type tag {tag} for item '{name}'"),
        })?;
        items.push(ItemInfo::new(name, unit, value_type));
    }

    let start_secs = read_i64(reader)?;
    let step_seconds = read_f64(reader)?;
    let n_steps = read_count(reader, "time step count")?;

    let start = DateTime::from_timestamp(start_secs, 0)
        .ok_or_else(|| IoError::CorruptHeader {
            reason: format!("start time {start_secs} outside representable range"),
        })?
        .naive_utc();
    if !step_seconds.is_finite() || step_seconds <= 0.0 {
        return Err(IoError::CorruptHeader {
            reason: format!("non-positive time step {step_seconds} s"),
        });
    }
    let step = TimeDelta::microseconds((step_seconds * 1e6).round() as i64);
    let time = TimeAxis::equidistant(start, step, n_steps)?;

    Ok(FileHeader {
        geometry,
        items: ItemCatalog::new(items),
        time,
    })
}

/// Encode the header for `geometry` + `items` + `time`.
///
/// # Errors
///
/// Returns [`IoError::UnsupportedTimeAxis`] when `time` has no fixed step
/// and [`IoError::Io`] on write failure.
pub(crate) fn write_header<W: Write>(
    writer: &mut W,
    geometry: &MeshGeometry,
    items: &ItemCatalog,
    time: &TimeAxis,
) -> Result<(), IoError> {
    let step_seconds = time.step_seconds().ok_or(IoError::UnsupportedTimeAxis)?;

    writer.write_all(&MAGIC)?;
    writer.write_all(&VERSION.to_le_bytes())?;
    writer.write_all(&[u8::from(geometry.is_geo())])?;
    write_string(writer, geometry.projection().text())?;

    writer.write_all(&(geometry.n_nodes() as u32).to_le_bytes())?;
    writer.write_all(&(geometry.n_elements() as u32).to_le_bytes())?;
    writer.write_all(&geometry.n_layers().to_le_bytes())?;
    writer.write_all(&geometry.n_sigma_layers().to_le_bytes())?;

    for node in geometry.nodes() {
        writer.write_all(&node.id.to_le_bytes())?;
        writer.write_all(&node.x.to_le_bytes())?;
        writer.write_all(&node.y.to_le_bytes())?;
        writer.write_all(&node.z.to_le_bytes())?;
        writer.write_all(&node.code.to_le_bytes())?;
    }

    for element in geometry.elements() {
        writer.write_all(&element.id().to_le_bytes())?;
        writer.write_all(&[element.node_ids().len() as u8])?;
        for &node_id in element.node_ids() {
            writer.write_all(&node_id.to_le_bytes())?;
        }
    }

    if let Some(info) = geometry.layers()
        && geometry.n_layers() > 0
    {
        for &layer in info.elem_layer() {
            writer.write_all(&layer.to_le_bytes())?;
        }
    }

    writer.write_all(&(items.len() as u32).to_le_bytes())?;
    for item in items.items() {
        write_string(writer, item.name())?;
        write_string(writer, item.unit())?;
        writer.write_all(&[item.value_type().to_tag()])?;
    }

    writer.write_all(&time.start().and_utc().timestamp().to_le_bytes())?;
    writer.write_all(&step_seconds.to_le_bytes())?;
    writer.write_all(&(time.len() as u32).to_le_bytes())?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Primitive field codecs
// ---------------------------------------------------------------------------

fn read_array<const N: usize, R: Read>(reader: &mut R) -> Result<[u8; N], IoError> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

fn read_u8<R: Read>(reader: &mut R) -> Result<u8, IoError> {
    Ok(read_array::<1, _>(reader)?[0])
}

fn read_u16<R: Read>(reader: &mut R) -> Result<u16, IoError> {
    Ok(u16::from_le_bytes(read_array(reader)?))
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32, IoError> {
    Ok(u32::from_le_bytes(read_array(reader)?))
}

fn read_i32<R: Read>(reader: &mut R) -> Result<i32, IoError> {
    Ok(i32::from_le_bytes(read_array(reader)?))
}

fn read_i64<R: Read>(reader: &mut R) -> Result<i64, IoError> {
    Ok(i64::from_le_bytes(read_array(reader)?))
}

fn read_f64<R: Read>(reader: &mut R) -> Result<f64, IoError> {
    Ok(f64::from_le_bytes(read_array(reader)?))
}

fn read_count<R: Read>(reader: &mut R, what: &str) -> Result<usize, IoError> {
    let count = read_u32(reader)?;
    if count > MAX_COUNT {
        return Err(IoError::CorruptHeader {
            reason: format!("{what} {count} exceeds limit {MAX_COUNT}"),
        });
    }
    Ok(count as usize)
}

fn read_string<R: Read>(reader: &mut R) -> Result<String, IoError> {
    let len = read_u16(reader)? as usize;
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;
    String::from_utf8(buf).map_err(|e| IoError::CorruptHeader {
        reason: format!("string field is not valid UTF-8: {e}"),
    })
}

fn write_string<W: Write>(writer: &mut W, s: &str) -> Result<(), IoError> {
    let len = u16::try_from(s.len()).map_err(|_| {
        IoError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("string field of {} bytes exceeds u16 length prefix", s.len()),
        ))
    })?;
    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(s.as_bytes())?;
    Ok(())
}
