//! Reference sequence access using noodles.
//!
//! Two [`ReferenceSource`] implementations are provided:
//!
//! - [`FastaReference`]: sequences loaded from a FASTA file
//! - [`ContigLengths`]: lengths only (e.g. from VCF `##contig` lines), with
//!   sequences withheld
//!
//! Supported extensions:
//! - `.fa`, `.fasta`, `.fna` (uncompressed)
//! - `.fa.gz`, `.fasta.gz`, `.fna.gz` (gzip compressed)
//! - `.fa.bgz`, `.fasta.bgz`, `.fna.bgz` (bgzip compressed)

use std::collections::HashMap;
use std::ffi::OsStr;
use std::io::BufRead;
use std::path::Path;

use noodles::fasta;

use crate::parsing::{open_text, ParseError};

/// Filler used for positions outside a contig
pub const UNKNOWN_BASE: u8 = b'N';

/// Random access to reference bases.
///
/// Coordinates are 1-based and half-open: `fetch("chr1", 1, 3)` returns the
/// first two bases.
pub trait ReferenceSource: Sync {
    /// Bases in `[start, end)`, padded with `N` outside the contig.
    ///
    /// Returns `None` when sequences are withheld.
    fn fetch(&self, chrom: &str, start: u64, end: u64) -> Option<String>;

    fn chrom_length(&self, chrom: &str) -> Option<u64>;

    /// Whether [`ReferenceSource::fetch`] returns actual bases
    fn has_sequences(&self) -> bool;
}

/// Check if the path has a FASTA extension
pub fn is_fasta_file(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();

    if [".fa", ".fasta", ".fna"]
        .iter()
        .any(|ext| path_str.ends_with(&format!("{ext}.gz")) || path_str.ends_with(&format!("{ext}.bgz")))
    {
        return true;
    }

    matches!(
        path.extension()
            .and_then(OsStr::to_str)
            .map(str::to_lowercase)
            .as_deref(),
        Some("fa" | "fasta" | "fna")
    )
}

/// A reference genome held in memory
#[derive(Debug, Default)]
pub struct FastaReference {
    names: Vec<String>,
    sequences: HashMap<String, Vec<u8>>,
}

impl FastaReference {
    /// Load every sequence of a FASTA file.
    ///
    /// Sequence names are truncated at the first whitespace and bases are
    /// upper-cased.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Io` if the file cannot be read, `ParseError::Noodles` if
    /// parsing fails, or `ParseError::InvalidFormat` if no sequences are found.
    pub fn from_path(path: &Path) -> Result<Self, ParseError> {
        let mut reader = fasta::io::Reader::new(open_text(path)?);
        Self::from_reader(&mut reader)
    }

    /// Load from a noodles FASTA reader
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Noodles` if a record cannot be parsed, or
    /// `ParseError::InvalidFormat` if no sequences are found.
    pub fn from_reader<R: BufRead>(reader: &mut fasta::io::Reader<R>) -> Result<Self, ParseError> {
        let mut reference = FastaReference::default();

        for result in reader.records() {
            let record = result
                .map_err(|e| ParseError::Noodles(format!("Failed to parse FASTA record: {e}")))?;

            let name = String::from_utf8_lossy(record.name()).to_string();
            let bases: Vec<u8> = record
                .sequence()
                .as_ref()
                .iter()
                .map(u8::to_ascii_uppercase)
                .collect();

            if !reference.sequences.contains_key(&name) {
                reference.names.push(name.clone());
            }
            reference.sequences.insert(name, bases);
        }

        if reference.names.is_empty() {
            return Err(ParseError::InvalidFormat(
                "No sequences found in FASTA file".to_string(),
            ));
        }

        Ok(reference)
    }

    /// Sequence names in file order
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl ReferenceSource for FastaReference {
    fn fetch(&self, chrom: &str, start: u64, end: u64) -> Option<String> {
        let bases = self.sequences.get(chrom).map_or(&[][..], Vec::as_slice);
        Some(padded_slice(bases, start, end))
    }

    fn chrom_length(&self, chrom: &str) -> Option<u64> {
        self.sequences.get(chrom).map(|s| s.len() as u64)
    }

    fn has_sequences(&self) -> bool {
        true
    }
}

/// Contig lengths without sequences
#[derive(Debug, Default, Clone)]
pub struct ContigLengths {
    lengths: HashMap<String, u64>,
}

impl ContigLengths {
    pub fn new(contigs: &[(String, u64)]) -> Self {
        Self {
            lengths: contigs.iter().cloned().collect(),
        }
    }
}

impl ReferenceSource for ContigLengths {
    fn fetch(&self, _chrom: &str, _start: u64, _end: u64) -> Option<String> {
        None
    }

    fn chrom_length(&self, chrom: &str) -> Option<u64> {
        self.lengths.get(chrom).copied()
    }

    fn has_sequences(&self) -> bool {
        false
    }
}

/// Copy `[start, end)` (1-based) out of `bases`, filling gaps with `N`
fn padded_slice(bases: &[u8], start: u64, end: u64) -> String {
    if end <= start {
        return String::new();
    }

    let out: Vec<u8> = (start..end)
        .map(|pos| {
            pos.checked_sub(1)
                .and_then(|i| usize::try_from(i).ok())
                .and_then(|i| bases.get(i).copied())
                .unwrap_or(UNKNOWN_BASE)
        })
        .collect();

    String::from_utf8_lossy(&out).into_owned()
}
