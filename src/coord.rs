//! Coordinates on sequences.

//-----------------------------------------------------------------------------

/// A half-open interval `[start, end)` on a sequence of known total length.
///
/// The interval remembers the length of the sequence it refers to, so it can
/// tell whether it touches either end of the sequence and compute the
/// remaining part.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeqCoord {
    start: usize,
    end: usize,
    seq_len: usize,
}

impl SeqCoord {
    /// Creates a new interval `[start, end)` on a sequence of length `seq_len`.
    ///
    /// # Panics
    ///
    /// Panics if `start > end` or `end > seq_len`.
    pub fn new(start: usize, end: usize, seq_len: usize) -> Self {
        assert!(start <= end && end <= seq_len,
            "Invalid coordinate [{}, {}) on a sequence of length {}", start, end, seq_len);
        SeqCoord { start, end, seq_len }
    }

    /// Returns the start of the interval.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Returns the past-the-end position of the interval.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Returns the length of the underlying sequence.
    pub fn seq_len(&self) -> usize {
        self.seq_len
    }

    /// Returns the number of positions in the interval.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns `true` if the interval is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` if the interval starts at the beginning of the sequence.
    pub fn is_left_extreme(&self) -> bool {
        self.start == 0
    }

    /// Returns `true` if the interval ends at the end of the sequence.
    pub fn is_right_extreme(&self) -> bool {
        self.end == self.seq_len
    }

    /// Returns `true` if the interval touches either end of the sequence.
    pub fn is_extreme(&self) -> bool {
        self.is_left_extreme() || self.is_right_extreme()
    }

    /// Returns `true` if the interval covers the entire sequence.
    pub fn is_full(&self) -> bool {
        self.is_left_extreme() && self.is_right_extreme()
    }

    /// Returns the single remaining maximal sub-interval of the sequence.
    ///
    /// # Panics
    ///
    /// Panics if the interval is not extreme, as the remainder would not be
    /// a single interval.
    pub fn complement(&self) -> SeqCoord {
        assert!(self.is_extreme(), "Complement of a non-extreme coordinate");
        if self.is_left_extreme() {
            SeqCoord::new(self.end, self.seq_len, self.seq_len)
        } else {
            SeqCoord::new(0, self.start, self.seq_len)
        }
    }
}

//-----------------------------------------------------------------------------


//-----------------------------------------------------------------------------
