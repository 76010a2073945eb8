//! The ASQG format: reads and their pairwise overlaps.
//!
//! An ASQG file is a text file with one record per line. Each record starts
//! with a two-character type token:
//!
//! * `HT`: a header record; zero or more, before all other records.
//! * `VT\t<id>\t<seq>`: a read; ids must be unique within the file.
//! * `ED\t<id1>\t<id2>\t<s1>\t<e1>\t<len1>\t<s2>\t<e2>\t<len2>\t<rc>`: an
//!   overlap between two reads. The matched intervals are inclusive
//!   `[start, end]` pairs followed by the total read length, and `rc` is `1`
//!   when the second read is reverse-complemented.
//!
//! The stages must appear in order: headers, then reads, then overlaps.
//! Additional fields after the required ones are ignored.
//!
//! [`load_file`] decompresses gzipped input transparently when the file name
//! ends in `.gz`.

use std::io::BufRead;
use std::path::Path;

use crate::bigraph::{Bigraph, EdgeCreator, Vertex};
use crate::coord::SeqCoord;
use crate::overlap::Overlap;
use crate::utils;


//-----------------------------------------------------------------------------

// Record type tokens.
const HEADER_TOKEN: &str = "HT";
const VERTEX_TOKEN: &str = "VT";
const EDGE_TOKEN: &str = "ED";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RecordType {
    Header,
    Vertex,
    Edge,
}

// Classifies a line by its record type token.
fn record_type(line: &str) -> Option<RecordType> {
    match line.split('\t').next() {
        Some(HEADER_TOKEN) => Some(RecordType::Header),
        Some(VERTEX_TOKEN) => Some(RecordType::Vertex),
        Some(EDGE_TOKEN) => Some(RecordType::Edge),
        _ => None,
    }
}

//-----------------------------------------------------------------------------

/// A header record: a list of uninterpreted tags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderRecord {
    /// The tag fields of the record.
    pub tags: Vec<String>,
}

impl HeaderRecord {
    /// Parses a header record from a line.
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut fields = line.split('\t');
        if fields.next() != Some(HEADER_TOKEN) {
            return Err(format!("Invalid header record: {}", line));
        }
        Ok(HeaderRecord { tags: fields.map(String::from).collect() })
    }
}

/// A vertex record: a read id and its sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VertexRecord {
    /// Identifier of the read.
    pub id: String,
    /// The read sequence.
    pub seq: String,
}

impl VertexRecord {
    /// Parses a vertex record from a line.
    pub fn parse(line: &str) -> Result<Self, String> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 3 || fields[0] != VERTEX_TOKEN {
            return Err(format!("Invalid vertex record: {}", line));
        }
        if fields[1].is_empty() {
            return Err(format!("Invalid vertex record without an id: {}", line));
        }
        // Sequence transforms work byte by byte.
        if !fields[2].is_ascii() {
            return Err(format!("Invalid sequence characters in read {}", fields[1]));
        }
        Ok(VertexRecord { id: String::from(fields[1]), seq: String::from(fields[2]) })
    }
}

/// An edge record: an overlap between two reads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeRecord {
    /// The overlap described by the record.
    pub overlap: Overlap,
}

impl EdgeRecord {
    // Parses an unsigned integer field.
    fn parse_usize(field: &str, field_name: &str) -> Result<usize, String> {
        field.parse().map_err(|err| {
            format!("Invalid {}: {}", field_name, err)
        })
    }

    // Parses an inclusive interval and a read length into a coordinate.
    fn parse_coord(start: &str, end: &str, len: &str) -> Result<SeqCoord, String> {
        let start = Self::parse_usize(start, "interval start")?;
        let end = Self::parse_usize(end, "interval end")?;
        let len = Self::parse_usize(len, "read length")?;
        if start > end || end >= len {
            return Err(format!("Invalid interval [{}, {}] on a read of length {}", start, end, len));
        }
        Ok(SeqCoord::new(start, end + 1, len))
    }

    /// Parses an edge record from a line.
    pub fn parse(line: &str) -> Result<Self, String> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 10 || fields[0] != EDGE_TOKEN {
            return Err(format!("Invalid edge record: {}", line));
        }
        let coord_a = Self::parse_coord(fields[3], fields[4], fields[5])?;
        let coord_b = Self::parse_coord(fields[6], fields[7], fields[8])?;
        if coord_a.len() != coord_b.len() {
            return Err(format!("Mismatching interval lengths in edge record: {}", line));
        }
        let is_rc = match fields[9] {
            "0" => false,
            "1" => true,
            _ => return Err(format!("Invalid orientation flag: {}", fields[9])),
        };
        Ok(EdgeRecord {
            overlap: Overlap::new(fields[1], coord_a, fields[2], coord_b, is_rc),
        })
    }
}

//-----------------------------------------------------------------------------

/// Parameters for loading an ASQG file into a graph.
#[derive(Clone, Copy, Debug)]
pub struct LoadParams {
    /// Overlaps shorter than this are skipped.
    pub min_overlap: usize,
    /// Informational; containment edges are always materialized.
    pub allow_containments: bool,
    /// Overlaps touching a vertex with more edges than this are skipped.
    pub max_edges: usize,
}

impl Default for LoadParams {
    fn default() -> Self {
        LoadParams {
            min_overlap: 0,
            allow_containments: true,
            max_edges: 128,
        }
    }
}

//-----------------------------------------------------------------------------

// The stages of an ASQG file, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Head,
    Vertex,
    Edge,
}

/// Loads an ASQG stream into the graph.
///
/// The graph should be empty; a partially loaded graph is not cleaned up on
/// error and should be discarded by the caller.
pub fn load<R: BufRead>(reader: R, params: &LoadParams, graph: &mut Bigraph) -> Result<(), String> {
    graph.set_min_overlap(params.min_overlap);
    let mut stage = Stage::Head;
    for (number, line) in reader.lines().enumerate() {
        let line = line.map_err(|x| x.to_string())?;
        match record_type(&line) {
            Some(RecordType::Header) => {
                if stage != Stage::Head {
                    return Err(format!("Unexpected header record at line {}", number + 1));
                }
                HeaderRecord::parse(&line)?;
            }
            Some(RecordType::Vertex) => {
                if stage == Stage::Head {
                    stage = Stage::Vertex;
                }
                if stage != Stage::Vertex {
                    return Err(format!("Unexpected vertex record at line {}", number + 1));
                }
                let record = VertexRecord::parse(&line)?;
                let vertex = Vertex::new(&record.id, &record.seq);
                if graph.add_vertex(vertex).is_none() {
                    return Err(format!("Duplicate read id at line {}: {}", number + 1, record.id));
                }
            }
            Some(RecordType::Edge) => {
                if stage == Stage::Vertex {
                    stage = Stage::Edge;
                }
                if stage != Stage::Edge {
                    return Err(format!("Unexpected edge record at line {}", number + 1));
                }
                let record = EdgeRecord::parse(&line)?;
                if record.overlap.len() >= params.min_overlap {
                    // Overlaps the creator cannot use are dropped silently.
                    let mut creator = EdgeCreator::new(graph, params.max_edges);
                    creator.create(&record.overlap);
                }
            }
            None => {
                return Err(format!("Invalid record at line {}: {}", number + 1, line));
            }
        }
    }
    Ok(())
}

/// Loads an ASQG file into the graph, decompressing transparently if the file
/// name ends in `.gz`.
///
/// See [`load`].
pub fn load_file<P: AsRef<Path>>(filename: P, params: &LoadParams, graph: &mut Bigraph) -> Result<(), String> {
    let reader = utils::open_file(filename)?;
    load(reader, params, graph)
}

//-----------------------------------------------------------------------------
