//! Pairwise overlaps between reads.

use crate::coord::SeqCoord;

//-----------------------------------------------------------------------------

/// A pairwise overlap between two reads.
///
/// The overlap stores the matched interval on each read. When `is_rc` is set,
/// the second read takes part in the overlap as its reverse complement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Overlap {
    /// Identifiers of the two reads.
    pub ids: [String; 2],
    /// Matched interval on each read.
    pub coords: [SeqCoord; 2],
    /// `true` if the second read is reverse-complemented in the overlap.
    pub is_rc: bool,
}

impl Overlap {
    /// Creates a new overlap record.
    ///
    /// # Panics
    ///
    /// Panics if the matched intervals have different lengths.
    pub fn new(id_a: &str, coord_a: SeqCoord, id_b: &str, coord_b: SeqCoord, is_rc: bool) -> Self {
        assert_eq!(coord_a.len(), coord_b.len(),
            "Matched intervals of an overlap must have the same length");
        Overlap {
            ids: [String::from(id_a), String::from(id_b)],
            coords: [coord_a, coord_b],
            is_rc,
        }
    }

    /// Returns the number of matched positions.
    pub fn len(&self) -> usize {
        self.coords[0].len()
    }

    /// Returns `true` if the overlap matches no positions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if one of the reads is fully covered by the overlap.
    pub fn is_containment(&self) -> bool {
        self.coords[0].is_full() || self.coords[1].is_full()
    }
}

//-----------------------------------------------------------------------------


//-----------------------------------------------------------------------------
