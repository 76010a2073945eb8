//! FM-indexes over run-length BWT strings.
//!
//! An [`FMIndex`] answers rank queries over a [`BWT`] without decoding it.
//! It samples cumulative symbol counts at two densities:
//!
//! * [`LargeMarker`]s every [`LARGE_SAMPLE_RATE`] positions store absolute
//!   counts and an absolute index into the run stream.
//! * [`SmallMarker`]s every `sample_rate` positions store the same values as
//!   16-bit deltas against the nearest preceding large marker. The large rate
//!   bounds the deltas, so 16 bits are always enough.
//!
//! A rank query interpolates an absolute marker from the two tables and scans
//! at most half a sample interval of runs. Markers sit on run boundaries: a
//! marker is placed once the run crossing its position has been processed, so
//! a scan never starts in the middle of a run.

use std::mem;
use std::ops::Range;

use crate::bwt::BWT;
use crate::sequence::{self, ALPHABET, ALPHABET_SIZE};


//-----------------------------------------------------------------------------

/// Spacing of the absolute markers.
pub const LARGE_SAMPLE_RATE: usize = 8192;

/// Default spacing of the relative markers.
pub const DEFAULT_SAMPLE_RATE: usize = 128;

//-----------------------------------------------------------------------------

/// An absolute marker: cumulative symbol counts for a prefix of the BWT.
///
/// `unit_index` is the index of the first run after the marker position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LargeMarker {
    /// Index of the next run to process.
    pub unit_index: usize,
    /// Cumulative count of each symbol, by rank.
    pub counts: [usize; ALPHABET_SIZE],
}

impl LargeMarker {
    /// Returns the position of the marker in the BWT.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// A relative marker: the same values as a [`LargeMarker`], stored as deltas
/// against the nearest preceding large marker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SmallMarker {
    /// Delta of the run index.
    pub unit_index: u16,
    /// Delta of the cumulative count of each symbol, by rank.
    pub counts: [u16; ALPHABET_SIZE],
}

// Markers are placed at the start of the data, then every sample_rate
// positions, and one more carries the totals if the length is not a multiple
// of the rate.
fn required_markers(len: usize, sample_rate: usize) -> usize {
    if len % sample_rate == 0 {
        len / sample_rate + 1
    } else {
        len / sample_rate + 2
    }
}

//-----------------------------------------------------------------------------

/// A rank index over a run-length encoded BWT.
pub struct FMIndex {
    bwt: BWT,
    sample_rate: usize,
    large_markers: Vec<LargeMarker>,
    small_markers: Vec<SmallMarker>,
    pred: [usize; ALPHABET_SIZE],
}

impl FMIndex {
    /// Builds the index with the default sample rate.
    pub fn new(bwt: BWT) -> Self {
        Self::with_sample_rate(bwt, DEFAULT_SAMPLE_RATE)
    }

    /// Builds the index with the given sample rate for the relative markers.
    ///
    /// # Panics
    ///
    /// Panics if the sample rate is not a power of two in
    /// `2..=LARGE_SAMPLE_RATE`.
    pub fn with_sample_rate(bwt: BWT, sample_rate: usize) -> Self {
        assert!(sample_rate.is_power_of_two() && sample_rate >= 2 && sample_rate <= LARGE_SAMPLE_RATE,
            "Sample rate must be a power of two in 2..={}", LARGE_SAMPLE_RATE);
        let (large_markers, small_markers) = Self::build_markers(&bwt, sample_rate);

        // C[c]: the number of symbols in the BWT that are strictly smaller
        // than c, taken from the final marker.
        let totals = large_markers.last().map_or([0; ALPHABET_SIZE], |marker| marker.counts);
        let mut pred = [0; ALPHABET_SIZE];
        let mut acc = 0;
        for rank in 0..ALPHABET_SIZE {
            pred[rank] = acc;
            acc += totals[rank];
        }

        FMIndex { bwt, sample_rate, large_markers, small_markers, pred }
    }

    // Walks the run stream once, placing both marker levels. Markers are
    // placed after the run crossing their position ends, so a run never
    // straddles a marker.
    fn build_markers(bwt: &BWT, sample_rate: usize) -> (Vec<LargeMarker>, Vec<SmallMarker>) {
        let len = bwt.len();
        let mut large = vec![LargeMarker::default(); required_markers(len, LARGE_SAMPLE_RATE)];
        let mut small = vec![SmallMarker::default(); required_markers(len, sample_rate)];

        let mut counts = [0usize; ALPHABET_SIZE];
        let mut total = 0;
        let mut large_idx = 1;
        let mut next_large = LARGE_SAMPLE_RATE;
        let mut small_idx = 1;
        let mut next_small = sample_rate;

        let runs = bwt.runs();
        for (i, run) in runs.iter().enumerate() {
            counts[sequence::rank(run.symbol()) as usize] += run.count() as usize;
            total += run.count() as usize;
            let unit_index = i + 1;
            let is_last = i == runs.len() - 1;

            let mut place_large = is_last;
            while total >= next_large || place_large {
                assert!(large_idx < large.len(), "Marker index out of range");
                large[large_idx] = LargeMarker { unit_index, counts };
                large_idx += 1;
                next_large += LARGE_SAMPLE_RATE;
                place_large = place_large && total >= next_large;
            }

            let mut place_small = is_last;
            while total >= next_small || place_small {
                assert!(small_idx < small.len(), "Marker index out of range");
                // The reference is the large marker preceding the expected
                // position of this marker; it has already been placed above.
                let expected_pos = small_idx * sample_rate;
                let reference = &large[expected_pos / LARGE_SAMPLE_RATE];
                let mut deltas = [0u16; ALPHABET_SIZE];
                for rank in 0..ALPHABET_SIZE {
                    deltas[rank] = (counts[rank] - reference.counts[rank]) as u16;
                }
                small[small_idx] = SmallMarker {
                    unit_index: (unit_index - reference.unit_index) as u16,
                    counts: deltas,
                };
                small_idx += 1;
                next_small += sample_rate;
                place_small = place_small && total >= next_small;
            }
        }

        assert_eq!(large_idx, large.len(), "Unfilled large markers");
        assert_eq!(small_idx, small.len(), "Unfilled small markers");
        (large, small)
    }

    //-------------------------------------------------------------------------

    /// Returns the underlying BWT.
    pub fn bwt(&self) -> &BWT {
        &self.bwt
    }

    /// Returns the sample rate of the relative markers.
    pub fn sample_rate(&self) -> usize {
        self.sample_rate
    }

    /// Returns the number of absolute markers.
    pub fn large_marker_count(&self) -> usize {
        self.large_markers.len()
    }

    /// Returns the number of relative markers.
    pub fn small_marker_count(&self) -> usize {
        self.small_markers.len()
    }

    /// Returns the number of bytes used by the marker tables.
    pub fn marker_bytes(&self) -> usize {
        self.large_markers.len() * mem::size_of::<LargeMarker>()
            + self.small_markers.len() * mem::size_of::<SmallMarker>()
    }

    /// Returns the total number of occurrences of each symbol, by rank.
    pub fn symbol_counts(&self) -> [usize; ALPHABET_SIZE] {
        self.large_markers.last().map_or([0; ALPHABET_SIZE], |marker| marker.counts)
    }

    /// Returns the number of symbols in the BWT that are strictly smaller
    /// than the given symbol.
    pub fn pred_count(&self, symbol: u8) -> usize {
        self.pred[sequence::rank(symbol) as usize]
    }

    //-------------------------------------------------------------------------

    // Returns an absolute marker close to the given position, interpolated by
    // adding the deltas of the nearest relative marker to its reference.
    fn nearest_marker(&self, position: usize) -> LargeMarker {
        let mut small_idx = position / self.sample_rate;
        // The sample rate is a power of two.
        let offset = position & (self.sample_rate - 1);
        if offset >= self.sample_rate / 2 {
            small_idx += 1;
        }
        assert!(small_idx < self.small_markers.len(), "Marker index out of range");

        let large_idx = small_idx * self.sample_rate / LARGE_SAMPLE_RATE;
        let mut absolute = self.large_markers[large_idx];
        let relative = &self.small_markers[small_idx];
        for rank in 0..ALPHABET_SIZE {
            absolute.counts[rank] += relative.counts[rank] as usize;
        }
        absolute.unit_index += relative.unit_index as usize;
        absolute
    }

    /// Returns the number of occurrences of the symbol in the BWT prefix of
    /// length `i + 1`.
    pub fn occ(&self, symbol: u8, i: usize) -> usize {
        // The marker counts are not inclusive, so the query position is one
        // past the index.
        let target = i + 1;
        let marker = self.nearest_marker(target);
        let runs = self.bwt.runs();

        let mut position = marker.total();
        let mut result = marker.counts[sequence::rank(symbol) as usize];
        let mut unit_index = marker.unit_index;

        // Scan forwards: the runs after the marker are not yet counted.
        while position < target {
            assert!(unit_index < runs.len(), "Rank scan past the end of the run stream");
            let run = runs[unit_index];
            unit_index += 1;
            let n = (run.count() as usize).min(target - position);
            if run.symbol() == symbol {
                result += n;
            }
            position += n;
        }
        // Scan backwards: the runs below the marker are counted and must be
        // subtracted, ending with the run just below the boundary.
        while position > target {
            assert!(unit_index > 0, "Rank scan past the start of the run stream");
            unit_index -= 1;
            let run = runs[unit_index];
            let n = (run.count() as usize).min(position - target);
            if run.symbol() == symbol {
                result -= n;
            }
            position -= n;
        }

        debug_assert_eq!(position, target, "Rank scan ended at the wrong position");
        result
    }

    //-------------------------------------------------------------------------

    /// Maps a suffix array interval to the interval obtained by prepending
    /// the symbol to the matched pattern.
    pub fn update_range(&self, symbol: u8, range: Range<usize>) -> Range<usize> {
        let pred = self.pred_count(symbol);
        let start = pred + if range.start > 0 { self.occ(symbol, range.start - 1) } else { 0 };
        let end = pred + if range.end > 0 { self.occ(symbol, range.end - 1) } else { 0 };
        start..end
    }

    /// Returns the suffix array interval matching the pattern, or [`None`] if
    /// the pattern does not occur.
    pub fn backward_search(&self, pattern: &[u8]) -> Option<Range<usize>> {
        if self.bwt.is_empty() {
            return None;
        }
        let mut range = 0..self.bwt.len();
        for symbol in pattern.iter().rev() {
            range = self.update_range(*symbol, range);
            if range.is_empty() {
                return None;
            }
        }
        Some(range)
    }

    /// Returns a short description of the index for reporting.
    pub fn statistics(&self) -> String {
        let runs = self.bwt.runs().len();
        let symbols_per_run = if runs == 0 { 0.0 } else { self.bwt.len() as f64 / runs as f64 };
        let mut result = format!(
            "{} symbols in {} runs ({:.4} symbols per run)\n",
            self.bwt.len(), runs, symbols_per_run
        );
        result.push_str(&format!(
            "Markers: {} large, {} small (every {} symbols)\n",
            self.large_markers.len(), self.small_markers.len(), self.sample_rate
        ));
        let counts = self.symbol_counts();
        for rank in 0..ALPHABET_SIZE {
            result.push_str(&format!("{}: {} ", ALPHABET[rank] as char, counts[rank]));
        }
        result.push('\n');
        result
    }
}

//-----------------------------------------------------------------------------
