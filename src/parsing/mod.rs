//! Readers and writers for the file formats the converter and graph engine touch.
//!
//! This module provides:
//!
//! - **VCF files**: Sample columns, `##contig` lengths and variant records
//! - **FASTA files**: In-memory reference sequences for segment extraction
//! - **FASTA index (.fai) files**: Contig lengths for fast preflight checks
//! - **rGFA files**: Segment (`S`) and link (`L`) line parsing and writing
//! - **BED files**: Target regions for variant export
//!
//! Plain and gzip/bgzip compressed inputs are both accepted.
//!
//! ## Supported rGFA Tags
//!
//! | Tag | Description | Required |
//! |-----|-------------|----------|
//! | LN  | Segment length | No (defaults to sequence length) |
//! | SN  | `sample<DELIM>contig` | Yes |
//! | SO  | Offset within the contig | Yes |
//! | SR  | Rank (0 = backbone) | Yes |
//! | INF | Variant descriptor | No |

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use thiserror::Error;

pub mod bed;
pub mod fai;
pub mod fasta;
pub mod rgfa;
pub mod vcf;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("noodles error: {0}")]
    Noodles(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
}

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
pub fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Open a text file for buffered reading, decompressing gzip/bgzip input.
///
/// # Errors
///
/// Returns an IO error if the file cannot be opened.
pub fn open_text(path: &Path) -> std::io::Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    if is_gzipped(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Create `path` and hand a writer to `write`, gzip compressing when the path
/// ends in `.gz`. The file is removed again if `write` or the final flush fails.
///
/// # Errors
///
/// Returns the error from `write`, or an IO error converted into `E`.
pub fn write_text<T, E, F>(path: &Path, write: F) -> Result<T, E>
where
    E: From<std::io::Error>,
    F: FnOnce(&mut dyn Write) -> Result<T, E>,
{
    let written = (|| -> Result<T, E> {
        let file = File::create(path)?;
        if is_gzipped(path) {
            let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
            let value = write(&mut encoder)?;
            encoder.finish()?.flush()?;
            Ok(value)
        } else {
            let mut writer = BufWriter::new(file);
            let value = write(&mut writer)?;
            writer.flush()?;
            Ok(value)
        }
    })();

    if written.is_err() {
        let _ = std::fs::remove_file(path);
    }
    written
}
