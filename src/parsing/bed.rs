//! Parser for BED region files.
//!
//! Only the first three columns are read. Coordinates are 0-based and
//! half-open, as in the BED format; [`RegionSet::overlaps`] takes 1-based
//! inclusive positions so callers can pass VCF-style coordinates directly.

use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use tracing::debug;

use crate::parsing::{open_text, ParseError};

/// Target regions grouped by chromosome
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionSet {
    regions: HashMap<String, Vec<(u64, u64)>>,
}

impl RegionSet {
    /// Read a BED file (plain or gzip compressed)
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Io` if the file cannot be read or
    /// `ParseError::InvalidFormat` if a coordinate is not a number or a region
    /// ends before it starts.
    pub fn from_path(path: &Path) -> Result<Self, ParseError> {
        Self::from_reader(open_text(path)?)
    }

    /// # Errors
    ///
    /// Returns `ParseError::Io` on read failure or `ParseError::InvalidFormat`
    /// for malformed coordinates.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, ParseError> {
        let mut set = RegionSet::default();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty()
                || trimmed.starts_with('#')
                || trimmed.starts_with("track")
                || trimmed.starts_with("browser")
            {
                continue;
            }

            let fields: Vec<&str> = trimmed.split_whitespace().collect();
            if fields.len() < 3 {
                debug!("Skipping BED line {} with {} fields", i + 1, fields.len());
                continue;
            }

            let coordinate = |value: &str| {
                value.parse::<u64>().map_err(|_| {
                    ParseError::InvalidFormat(format!("BED line {}: invalid coordinate '{value}'", i + 1))
                })
            };
            let start = coordinate(fields[1])?;
            let end = coordinate(fields[2])?;
            if end < start {
                return Err(ParseError::InvalidFormat(format!(
                    "BED line {}: end {end} is before start {start}",
                    i + 1
                )));
            }

            set.insert(fields[0], start, end);
        }

        Ok(set)
    }

    /// Add a 0-based half-open region
    pub fn insert(&mut self, chrom: &str, start: u64, end: u64) {
        self.regions
            .entry(chrom.to_string())
            .or_default()
            .push((start, end));
    }

    /// Whether the 1-based inclusive span `[first, last]` touches any region
    pub fn overlaps(&self, chrom: &str, first: u64, last: u64) -> bool {
        self.regions.get(chrom).is_some_and(|regions| {
            regions
                .iter()
                .any(|&(start, end)| first <= end && last > start)
        })
    }

    /// Number of regions
    pub fn len(&self) -> usize {
        self.regions.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
