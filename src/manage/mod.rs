//! Whole-file rGFA maintenance.
//!
//! Unlike [`crate::graph`], which canonicalizes links and builds an indexed
//! graph for queries, these operations work on the records as written and
//! write them back with every tag preserved:
//!
//! - [`merge`]: combine several rGFA files, offsetting numeric ids so they
//!   stay unique
//! - [`backbone`]: drop one backbone and everything left hanging off it
//! - [`export`]: write variant segments as VCF records, optionally limited to
//!   a backbone and to BED regions
//!
//! ## Example
//!
//! ```rust,no_run
//! use pangraph::manage::{merge::merge, RgfaDocument};
//! use std::path::Path;
//!
//! let first = RgfaDocument::from_path(Path::new("chr1.gfa")).unwrap();
//! let second = RgfaDocument::from_path(Path::new("chr2.gfa")).unwrap();
//! let merged = merge(vec![first, second], "#").unwrap();
//!
//! let mut out = std::fs::File::create("merged.gfa").unwrap();
//! merged.write(&mut out).unwrap();
//! ```

use std::io::{BufRead, Write};
use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::core::segment::Link;
use crate::parsing::rgfa::{parse_line, write_link, write_segment_line, GfaLine, SegmentLine};
use crate::parsing::{open_text, ParseError};

pub mod backbone;
pub mod export;
pub mod merge;

#[derive(Error, Debug)]
pub enum ManageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Invalid rGFA at line {line}: {source}")]
    InvalidLine {
        line: usize,
        #[source]
        source: ParseError,
    },

    #[error("Segment id '{0}' occurs in more than one input and has no number to offset")]
    DuplicateSegment(String),
}

/// Segment and link records of one rGFA file, in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RgfaDocument {
    pub segments: Vec<SegmentLine>,
    pub links: Vec<Link<String>>,
}

impl RgfaDocument {
    /// # Errors
    ///
    /// Returns `ManageError::Io` if the file cannot be read or
    /// `ManageError::InvalidLine` for the first malformed segment or link.
    pub fn from_path(path: &Path) -> Result<Self, ManageError> {
        debug!("Reading rGFA {}", path.display());
        Self::from_reader(open_text(path)?)
    }

    /// Read every `S` and `L` record; other record types are dropped.
    ///
    /// # Errors
    ///
    /// Returns `ManageError::Io` on read failure or `ManageError::InvalidLine`
    /// for the first malformed segment or link.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, ManageError> {
        let mut document = RgfaDocument::default();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match parse_line(&line).map_err(|source| ManageError::InvalidLine { line: i + 1, source })? {
                GfaLine::Segment(segment) => document.segments.push(segment),
                GfaLine::Link(link) => document.links.push(link),
                GfaLine::Other => {}
            }
        }

        Ok(document)
    }

    /// Write all segments, then all links
    ///
    /// # Errors
    ///
    /// Returns any IO error from the writer.
    pub fn write<W: Write + ?Sized>(&self, writer: &mut W) -> std::io::Result<()> {
        for segment in &self.segments {
            write_segment_line(writer, segment)?;
        }
        for link in &self.links {
            write_link(writer, link)?;
        }
        Ok(())
    }

    pub fn segment(&self, id: &str) -> Option<&SegmentLine> {
        self.segments.iter().find(|s| s.id == id)
    }
}

/// Sample and contig of a segment's `SN` tag
pub fn sample_and_contig<'a>(segment: &'a SegmentLine, delimiter: &str) -> Option<(&'a str, &'a str)> {
    segment.tags.sample_name.as_deref()?.split_once(delimiter)
}

/// Backbone segments have rank 0, or no rank at all
pub fn is_backbone(segment: &SegmentLine) -> bool {
    segment.tags.rank.unwrap_or(0) == 0
}
