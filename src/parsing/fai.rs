//! Reader for FASTA index (.fai) files using noodles.
//!
//! An index gives contig names and lengths without reading the sequences, which
//! lets the converter validate chromosome names before loading a large FASTA.
//! Format: `name\tlength\toffset\tline_bases\tline_width`

use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::parsing::ParseError;

/// Path of the index that sits next to a FASTA file (`ref.fa` -> `ref.fa.fai`)
pub fn fai_path_for(fasta: &Path) -> PathBuf {
    let mut path = fasta.as_os_str().to_owned();
    path.push(".fai");
    PathBuf::from(path)
}

/// Read contig names and lengths from a .fai file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, `ParseError::Noodles` if
/// parsing fails, or `ParseError::InvalidFormat` if no contigs are found.
pub fn read_contig_lengths(path: &Path) -> Result<Vec<(String, u64)>, ParseError> {
    use noodles::fasta;

    let reader = std::fs::File::open(path).map(BufReader::new)?;

    let index = fasta::fai::io::Reader::new(reader)
        .read_index()
        .map_err(|e| ParseError::Noodles(format!("Failed to parse FAI file: {e}")))?;

    let contigs: Vec<(String, u64)> = index
        .as_ref()
        .iter()
        .map(|record| {
            (
                String::from_utf8_lossy(record.name()).to_string(),
                record.length(),
            )
        })
        .collect();

    if contigs.is_empty() {
        return Err(ParseError::InvalidFormat(
            "No contigs found in FAI file".to_string(),
        ));
    }

    Ok(contigs)
}
