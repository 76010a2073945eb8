//! # sgraph: string overlap graphs and run-length FM-indexes
//!
//! This crate implements the core data structures of a short-read sequence
//! assembler: a bidirected string overlap graph with cleanup passes, and a
//! run-length encoded Burrows-Wheeler transform with a sampled rank index.
//!
//! ### Overlap graphs
//!
//! A [`Bigraph`] stores one vertex per read and a pair of twinned directed
//! edges per pairwise overlap. Graphs are built from ASQG files (see
//! [`asqg`]), cleaned up with the passes in [`visitors`], and compacted into
//! unitigs with [`Bigraph::simplify`]. The assembled sequences are emitted as
//! FASTA with [`FastaVisitor`].
//!
//! ### Run-length BWT and FM-index
//!
//! A [`BWT`] is built from a [`SuffixArray`] over a read collection and
//! stored on disk as run-length encoded units (see [`bwt`] for the format).
//! An [`FMIndex`] adds two levels of sampled markers on top of the runs and
//! answers `occ` rank queries and backward searches without decoding the
//! transform.
//!
//! ### Binaries
//!
//! * `asqg2fasta`: load an overlap graph, clean it up, and write unitigs.
//! * `fa2bwt`: build the BWT of a read set and write it to disk.
//! * `bwtstat`: report statistics of a BWT file and its rank index.

pub mod asqg;
pub mod bigraph;
pub mod bwt;
pub mod coord;
pub mod fmindex;
pub mod overlap;
pub mod sequence;
pub mod suffix_array;
pub mod utils;
pub mod visitors;

pub use bigraph::{Bigraph, Color, Comp, Dir, Edge, EdgeCreator, Vertex};
pub use bwt::{BWT, BWTReader, BWTWriter, RLUnit};
pub use coord::SeqCoord;
pub use fmindex::FMIndex;
pub use overlap::Overlap;
pub use sequence::DnaSeq;
pub use suffix_array::SuffixArray;
pub use visitors::{
    BigraphVisitor, ChimericVisitor, ContainRemoveVisitor, FastaVisitor,
    MaximalOverlapVisitor, StatisticsVisitor, TrimVisitor,
};
