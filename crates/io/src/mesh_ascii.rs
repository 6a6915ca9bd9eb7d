//! Plain-text mesh reader.
//!
//! Layout of the `.mesh` text format used as a write source:
//!
//! ```text
//! <n_nodes> <projection>
//! <id> <x> <y> <z> <code>        (one line per node)
//! <n_elements>
//! <id> <n1> <n2> <n3> [<n4>]     (one line per element)
//! ```
//!
//! Bare meshes carry no items or time axis; pair one with a caller-built
//! [`Dataset`](crate::Dataset) and [`write_data_file`](crate::write_data_file)
//! to produce a data file.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use flexmesh_geometry::{Element, MeshGeometry, Node, Projection};

use crate::error::IoError;

/// Read a plain-text mesh file into a 2D [`MeshGeometry`].
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] when the path does not exist,
/// [`IoError::CorruptHeader`] naming the offending line for malformed
/// content, and [`IoError::Geometry`] when the parsed topology is invalid.
pub fn read_mesh_ascii(path: impl AsRef<Path>) -> Result<MeshGeometry, IoError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let reader = BufReader::new(File::open(path)?);
    let mut lines = reader.lines().enumerate();

    let (line_no, first) = next_line(&mut lines)?;
    let mut fields = first.split_whitespace();
    let n_nodes: usize = parse_field(fields.next(), line_no, "node count")?;
    let projection_text = fields.collect::<Vec<_>>().join(" ");
    if projection_text.is_empty() {
        return Err(corrupt(line_no, "missing projection string"));
    }

    let mut nodes = Vec::with_capacity(n_nodes);
    for _ in 0..n_nodes {
        let (line_no, line) = next_line(&mut lines)?;
        let mut fields = line.split_whitespace();
        let id = parse_field(fields.next(), line_no, "node id")?;
        let x = parse_field(fields.next(), line_no, "x coordinate")?;
        let y = parse_field(fields.next(), line_no, "y coordinate")?;
        let z = parse_field(fields.next(), line_no, "z coordinate")?;
        let code = parse_field(fields.next(), line_no, "boundary code")?;
        nodes.push(Node::new(id, x, y, z, code));
    }

    let (line_no, count_line) = next_line(&mut lines)?;
    let n_elements: usize =
        parse_field(count_line.split_whitespace().next(), line_no, "element count")?;

    let mut elements = Vec::with_capacity(n_elements);
    for _ in 0..n_elements {
        let (line_no, line) = next_line(&mut lines)?;
        let mut fields = line.split_whitespace();
        let id = parse_field(fields.next(), line_no, "element id")?;
        let mut node_ids = Vec::new();
        for field in fields {
            node_ids.push(field.parse::<u32>().map_err(|_| {
                corrupt(line_no, &format!("invalid node id '{field}'"))
            })?);
        }
        if node_ids.is_empty() {
            return Err(corrupt(line_no, "element line has no node ids"));
        }
        elements.push(Element::new(id, node_ids)?);
    }

    Ok(MeshGeometry::new(
        nodes,
        elements,
        None,
        Projection::new(projection_text),
    )?)
}

type Lines = std::iter::Enumerate<std::io::Lines<BufReader<File>>>;

fn next_line(lines: &mut Lines) -> Result<(usize, String), IoError> {
    loop {
        match lines.next() {
            None => {
                return Err(IoError::CorruptHeader {
                    reason: "unexpected end of mesh file".to_string(),
                });
            }
            Some((index, line)) => {
                let line = line?;
                if !line.trim().is_empty() {
                    return Ok((index + 1, line));
                }
            }
        }
    }
}

fn parse_field<T: FromStr>(field: Option<&str>, line_no: usize, what: &str) -> Result<T, IoError> {
    let field = field.ok_or_else(|| corrupt(line_no, &format!("missing {what}")))?;
    field
        .parse::<T>()
        .map_err(|_| corrupt(line_no, &format!("invalid {what} '{field}'")))
}

fn corrupt(line_no: usize, reason: &str) -> IoError {
    IoError::CorruptHeader {
        reason: format!("line {line_no}: {reason}"),
    }
}
