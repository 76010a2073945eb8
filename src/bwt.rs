//! Run-length encoded Burrows-Wheeler transforms and their on-disk format.
//!
//! The BWT of a read collection is stored as a sequence of runs, each packed
//! into a single byte. The on-disk format is little-endian:
//!
//! ```text
//! u16  magic = 0xCACA
//! u64  number of reads
//! u64  number of suffixes (BWT length)
//! u64  number of runs (backpatched by the writer)
//! u32  flags (only BWF_NOFMI is produced)
//! u8 * number of runs
//! ```
//!
//! [`BWTWriter`] streams the BWT out of a suffix array and the reads without
//! materializing the transform; [`BWTReader`] loads the runs back. Rank
//! queries over the runs are provided by [`crate::fmindex::FMIndex`].

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::sequence::{self, DnaSeq};
use crate::suffix_array::SuffixArray;


//-----------------------------------------------------------------------------

/// Magic number identifying a BWT file.
pub const FILE_MAGIC: u16 = 0xCACA;

/// Flag value for a BWT file without an embedded FM-index.
pub const BWF_NOFMI: u32 = 0;

//-----------------------------------------------------------------------------

/// A single run of equal symbols: the symbol rank in the high 3 bits and the
/// count in the low 5 bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RLUnit(u8);

impl RLUnit {
    /// Largest count a single run can hold.
    pub const MAX_COUNT: u8 = 31;

    const COUNT_MASK: u8 = 0b0001_1111;
    const RANK_SHIFT: u32 = 5;

    /// Creates a run of length 1 for the given symbol.
    pub fn new(symbol: u8) -> Self {
        RLUnit((sequence::rank(symbol) << Self::RANK_SHIFT) | 1)
    }

    /// Creates a run from its packed byte representation.
    pub fn from_byte(data: u8) -> Self {
        RLUnit(data)
    }

    /// Returns the packed byte representation.
    pub fn to_byte(self) -> u8 {
        self.0
    }

    /// Returns the length of the run.
    pub fn count(self) -> u8 {
        self.0 & Self::COUNT_MASK
    }

    /// Returns the symbol of the run.
    pub fn symbol(self) -> u8 {
        sequence::symbol(self.0 >> Self::RANK_SHIFT)
    }

    /// Returns `true` if the run holds at least one symbol.
    pub fn is_initialized(self) -> bool {
        self.count() > 0
    }

    /// Returns `true` if the run cannot be extended.
    pub fn is_full(self) -> bool {
        self.count() == Self::MAX_COUNT
    }

    /// Extends the run by one symbol.
    ///
    /// # Panics
    ///
    /// Panics if the run is full.
    pub fn increment(&mut self) {
        assert!(!self.is_full(), "Cannot extend a full run");
        self.0 += 1;
    }
}

/// The run string of a BWT.
pub type RLString = Vec<RLUnit>;

//-----------------------------------------------------------------------------

/// A run-length encoded BWT with its header fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BWT {
    num_strings: usize,
    num_suffixes: usize,
    runs: RLString,
}

impl BWT {
    /// Creates a BWT from its parts.
    pub fn new(num_strings: usize, num_suffixes: usize, runs: RLString) -> Self {
        BWT { num_strings, num_suffixes, runs }
    }

    /// Returns the number of reads behind the transform.
    pub fn num_strings(&self) -> usize {
        self.num_strings
    }

    /// Returns the number of suffixes, i.e. the length of the transform.
    pub fn len(&self) -> usize {
        self.num_suffixes
    }

    /// Returns `true` if the transform is empty.
    pub fn is_empty(&self) -> bool {
        self.num_suffixes == 0
    }

    /// Returns the run string.
    pub fn runs(&self) -> &[RLUnit] {
        &self.runs
    }

    /// Decodes the transform into a string of symbols.
    pub fn decode(&self) -> String {
        let mut result = String::with_capacity(self.num_suffixes);
        for run in self.runs.iter() {
            for _ in 0..run.count() {
                result.push(run.symbol() as char);
            }
        }
        result
    }
}

//-----------------------------------------------------------------------------

/// A streaming writer for BWT files.
///
/// The number of runs is not known until the whole transform has been
/// written, so the writer leaves a placeholder in the header and backpatches
/// it in [`BWTWriter::write`] once the run stream is complete.
pub struct BWTWriter<W: Write + Seek> {
    stream: W,
    run: RLUnit,
    num_runs: u64,
    run_count_offset: u64,
}

impl<W: Write + Seek> BWTWriter<W> {
    /// Creates a new writer over the stream.
    pub fn new(stream: W) -> Self {
        BWTWriter {
            stream,
            run: RLUnit::default(),
            num_runs: 0,
            run_count_offset: 0,
        }
    }

    /// Writes the BWT of the reads in the order given by the suffix array.
    pub fn write(&mut self, sa: &SuffixArray, sequences: &[DnaSeq]) -> Result<(), String> {
        self.write_header(sa.strings() as u64, sa.len() as u64, BWF_NOFMI)?;
        for elem in sa.iter() {
            let read = &sequences[elem.i];
            let symbol = if elem.j == 0 { b'$' } else { read.seq.as_bytes()[elem.j - 1] };
            self.write_symbol(symbol)?;
        }
        self.finalize()
    }

    /// Returns the number of runs written so far.
    pub fn runs_written(&self) -> u64 {
        self.num_runs
    }

    fn write_header(&mut self, num_strings: u64, num_suffixes: u64, flag: u32) -> Result<(), String> {
        self.stream.write_all(&FILE_MAGIC.to_le_bytes()).map_err(|x| x.to_string())?;
        self.stream.write_all(&num_strings.to_le_bytes()).map_err(|x| x.to_string())?;
        self.stream.write_all(&num_suffixes.to_le_bytes()).map_err(|x| x.to_string())?;

        // The number of runs is not known yet. Remember the offset, write a
        // placeholder, and come back to it in finalize.
        self.run_count_offset = self.stream.stream_position().map_err(|x| x.to_string())?;
        self.stream.write_all(&0u64.to_le_bytes()).map_err(|x| x.to_string())?;

        assert_eq!(flag, BWF_NOFMI, "Only BWF_NOFMI files are produced");
        self.stream.write_all(&flag.to_le_bytes()).map_err(|x| x.to_string())?;
        Ok(())
    }

    fn write_symbol(&mut self, symbol: u8) -> Result<(), String> {
        if self.run.is_initialized() {
            if self.run.symbol() == symbol && !self.run.is_full() {
                self.run.increment();
            } else {
                self.write_run()?;
                self.run = RLUnit::new(symbol);
            }
        } else {
            self.run = RLUnit::new(symbol);
        }
        Ok(())
    }

    fn write_run(&mut self) -> Result<(), String> {
        self.stream.write_all(&[self.run.to_byte()]).map_err(|x| x.to_string())?;
        self.num_runs += 1;
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), String> {
        if self.run.is_initialized() {
            self.write_run()?;
            self.run = RLUnit::default();
        }
        self.stream.seek(SeekFrom::Start(self.run_count_offset)).map_err(|x| x.to_string())?;
        self.stream.write_all(&self.num_runs.to_le_bytes()).map_err(|x| x.to_string())?;
        self.stream.seek(SeekFrom::End(0)).map_err(|x| x.to_string())?;
        self.stream.flush().map_err(|x| x.to_string())?;
        Ok(())
    }
}

/// Writes the BWT of the reads to the given file.
pub fn write_bwt_file<P: AsRef<Path>>(
    filename: P, sa: &SuffixArray, sequences: &[DnaSeq]
) -> Result<u64, String> {
    let file = File::create(&filename).map_err(|x| x.to_string())?;
    let mut writer = BWTWriter::new(BufWriter::new(file));
    writer.write(sa, sequences)?;
    Ok(writer.runs_written())
}

//-----------------------------------------------------------------------------

/// A reader for BWT files.
pub struct BWTReader<R: Read> {
    stream: R,
}

impl<R: Read> BWTReader<R> {
    /// Creates a new reader over the stream.
    pub fn new(stream: R) -> Self {
        BWTReader { stream }
    }

    /// Reads a BWT from the stream.
    ///
    /// Fails without side effects on a bad magic number, an unsupported flag,
    /// or a truncated stream; the caller decides how to proceed.
    pub fn read(&mut self) -> Result<BWT, String> {
        let magic = self.read_u16()?;
        if magic != FILE_MAGIC {
            return Err(format!("Invalid BWT file: bad magic number 0x{:04X}", magic));
        }
        let num_strings = self.read_u64()? as usize;
        let num_suffixes = self.read_u64()? as usize;
        let num_runs = self.read_u64()? as usize;
        let flag = self.read_u32()?;
        if flag != BWF_NOFMI {
            return Err(format!("Unsupported BWT file flags: 0x{:08X}", flag));
        }

        let mut bytes = vec![0u8; num_runs];
        self.stream.read_exact(&mut bytes).map_err(|x| x.to_string())?;
        let runs: RLString = bytes.into_iter().map(RLUnit::from_byte).collect();
        Ok(BWT::new(num_strings, num_suffixes, runs))
    }

    fn read_u16(&mut self) -> Result<u16, String> {
        let mut buf = [0u8; 2];
        self.stream.read_exact(&mut buf).map_err(|x| x.to_string())?;
        Ok(u16::from_le_bytes(buf))
    }

    fn read_u32(&mut self) -> Result<u32, String> {
        let mut buf = [0u8; 4];
        self.stream.read_exact(&mut buf).map_err(|x| x.to_string())?;
        Ok(u32::from_le_bytes(buf))
    }

    fn read_u64(&mut self) -> Result<u64, String> {
        let mut buf = [0u8; 8];
        self.stream.read_exact(&mut buf).map_err(|x| x.to_string())?;
        Ok(u64::from_le_bytes(buf))
    }
}

/// Reads a BWT from the given file.
pub fn load_bwt_file<P: AsRef<Path>>(filename: P) -> Result<BWT, String> {
    let file = File::open(&filename).map_err(|x| x.to_string())?;
    let mut reader = BWTReader::new(BufReader::new(file));
    reader.read()
}

//-----------------------------------------------------------------------------
