//! VCF + reference to rGFA conversion.
//!
//! Conversion runs in three stages:
//!
//! 1. **Classification and synthesis** ([`classify`], [`synth`]): each
//!    chromosome's variant records become backbone and variant segments with
//!    chromosome-local placeholder ids.
//! 2. **Parallel coordination** ([`coordinator`]): a fixed-size rayon pool
//!    synthesizes one chromosome per task, stealing work as threads go idle.
//! 3. **Global renumbering** ([`remap`]): once every worker has joined,
//!    placeholders are replaced by `s1, s2, ...` in an order that depends only
//!    on the input, never on which worker finished first.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pangraph::convert::{ConvertConfig, Converter};
//! use pangraph::parsing::fasta::FastaReference;
//! use pangraph::parsing::vcf::VcfSource;
//! use std::path::Path;
//!
//! let variants = VcfSource::from_path(Path::new("calls.vcf.gz")).unwrap();
//! let reference = FastaReference::from_path(Path::new("ref.fa")).unwrap();
//!
//! let config = ConvertConfig {
//!     backbone: "GRCh38".to_string(),
//!     ..ConvertConfig::default()
//! };
//! let converter = Converter::new(config).unwrap();
//! let mut out = std::fs::File::create("graph.gfa").unwrap();
//! let report = converter.run(&variants, &reference, &mut out).unwrap();
//! println!("{} segments, {} warnings", report.segments, report.warnings.len());
//! ```

use std::io::Write;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::core::types::{VariantType, CARRIER_SEPARATOR, DEFAULT_DELIMITER};
use crate::parsing::fasta::ReferenceSource;
use crate::parsing::ParseError;
use crate::parsing::vcf::VariantSource;

pub mod classify;
pub mod coordinator;
pub mod remap;
pub mod synth;

pub use remap::ChromosomeOutput;

/// Default number of conversion worker threads
pub const DEFAULT_THREADS: usize = 4;

/// Length of the partner-side sequence attached to a breakend
pub const DEFAULT_FLANK_LENGTH: u64 = 100;

/// Settings for one conversion run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertConfig {
    /// Sample name written on backbone segments
    pub backbone: String,
    pub threads: usize,
    /// Chromosomes to convert, in output order; all VCF chromosomes when `None`
    pub chromosomes: Option<Vec<String>>,
    /// Separator inside `SN` and `INF` tags
    pub delimiter: String,
    pub flank_length: u64,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            backbone: "backbone".to_string(),
            threads: DEFAULT_THREADS,
            chromosomes: None,
            delimiter: DEFAULT_DELIMITER.to_string(),
            flank_length: DEFAULT_FLANK_LENGTH,
        }
    }
}

impl ConvertConfig {
    /// Check that the delimiter cannot collide with tag or token syntax.
    ///
    /// # Errors
    ///
    /// Returns `ConvertError::InvalidDelimiter` if the delimiter is empty or
    /// contains `:`, `|`, `~` or whitespace.
    pub fn validate(&self) -> Result<(), ConvertError> {
        let reserved = |c: char| c == ':' || c == '|' || c == CARRIER_SEPARATOR || c.is_whitespace();
        if self.delimiter.is_empty() || self.delimiter.chars().any(reserved) {
            return Err(ConvertError::InvalidDelimiter(self.delimiter.clone()));
        }
        Ok(())
    }
}

/// A problem with a single VCF record; the record is skipped
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VariantIssue {
    #[error("{chrom}:{pos} ({id}): malformed breakend '{alt}'")]
    MalformedBreakend {
        chrom: String,
        pos: u64,
        id: String,
        alt: String,
    },

    #[error("{chrom}:{pos} ({id}): {variant_type} spanning {start}-{end} is outside the chromosome (length {length})")]
    OutOfBounds {
        chrom: String,
        pos: u64,
        id: String,
        variant_type: VariantType,
        start: u64,
        end: u64,
        length: u64,
    },

    #[error("{chrom}:{pos} ({id}): unsupported SVTYPE '{sv_type}'")]
    UnsupportedSvType {
        chrom: String,
        pos: u64,
        id: String,
        sv_type: String,
    },

    #[error("{chrom}:{pos} ({id}): {alleles} alternate alleles, only the first is converted")]
    ExtraAlleles {
        chrom: String,
        pos: u64,
        id: String,
        alleles: usize,
    },

    #[error("{chrom}:{pos} ({id}): {reason}")]
    MalformedRecord {
        chrom: String,
        pos: u64,
        id: String,
        reason: String,
    },
}

/// A non-fatal condition attached to a conversion result
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionWarning {
    #[error("Variant ignored: {0}")]
    Variant(#[from] VariantIssue),

    /// The record was converted with reduced detail
    #[error("Variant simplified: {0}")]
    Simplified(VariantIssue),

    #[error("Illegal chromosome name '{0}': not in the reference, skipped")]
    ChromosomeSkipped(String),
}

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("No sample columns found in VCF")]
    NoSamples,

    #[error("Some chromosomes in VCF are missing in the reference: {}", .0.join(", "))]
    ChromosomeMissing(Vec<String>),

    #[error("Please provide a reference FASTA as contig lengths are missing from the VCF header: {}", .0.join(", "))]
    ReferenceRequired(Vec<String>),

    #[error("Invalid delimiter '{0}': must be non-empty and free of ':', '|', '~' and whitespace")]
    InvalidDelimiter(String),

    #[error("Unresolved placeholder id {0}")]
    UnresolvedPlaceholder(String),

    #[error("Failed to start the conversion thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

/// Summary of a finished conversion
#[derive(Debug, Clone, Default)]
pub struct ConversionReport {
    /// Chromosomes written, in output order
    pub chromosomes: Vec<String>,
    pub segments: usize,
    pub links: usize,
    pub warnings: Vec<ConversionWarning>,
}

impl ConversionReport {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// The renumbered graph, ready to serialize
#[derive(Debug, Clone, Default)]
pub struct ConvertedGraph {
    pub chromosomes: Vec<ChromosomeOutput>,
    pub warnings: Vec<ConversionWarning>,
}

/// Drives a conversion with a fixed configuration
#[derive(Debug, Clone)]
pub struct Converter {
    config: ConvertConfig,
}

impl Converter {
    /// # Errors
    ///
    /// Returns `ConvertError::InvalidDelimiter` if the configuration is invalid.
    pub fn new(config: ConvertConfig) -> Result<Self, ConvertError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// Synthesize every chromosome and renumber into global ids.
    ///
    /// # Errors
    ///
    /// Returns `ConvertError::NoSamples`, `ChromosomeMissing` or
    /// `ReferenceRequired` before any work is scheduled, and
    /// `ThreadPool` if the worker pool cannot be started.
    pub fn build(
        &self,
        variants: &dyn VariantSource,
        reference: &dyn ReferenceSource,
    ) -> Result<ConvertedGraph, ConvertError> {
        coordinator::preflight(variants, reference, self.config.chromosomes.as_deref())?;

        let chromosomes = self
            .config
            .chromosomes
            .clone()
            .unwrap_or_else(|| variants.chromosomes());
        info!("Chromosomes to be converted: {}", chromosomes.join(", "));

        let outcome =
            coordinator::convert_chromosomes(&chromosomes, variants, reference, &self.config)?;

        let table = remap::GlobalIdTable::build(&outcome.graphs);
        let mut warnings = outcome.warnings;
        for graph in &outcome.graphs {
            warnings.extend(graph.warnings.iter().cloned());
        }
        let chromosomes = remap::apply(outcome.graphs, &table)?;

        Ok(ConvertedGraph {
            chromosomes,
            warnings,
        })
    }

    /// Convert and write the rGFA text to `writer`.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Converter::build`] or from writing.
    pub fn run<W: Write>(
        &self,
        variants: &dyn VariantSource,
        reference: &dyn ReferenceSource,
        writer: &mut W,
    ) -> Result<ConversionReport, ConvertError> {
        let graph = self.build(variants, reference)?;
        self.write(graph, writer)
    }

    /// Write an already built graph as rGFA text.
    ///
    /// # Errors
    ///
    /// Returns `ConvertError::Io` if writing fails.
    pub fn write<W: Write>(
        &self,
        graph: ConvertedGraph,
        writer: &mut W,
    ) -> Result<ConversionReport, ConvertError> {
        info!("Generating rGFA ...");
        remap::write_rgfa(writer, &graph.chromosomes, &self.config.delimiter)?;
        writer.flush()?;

        Ok(ConversionReport {
            chromosomes: graph.chromosomes.iter().map(|c| c.chrom.clone()).collect(),
            segments: graph.chromosomes.iter().map(|c| c.segments.len()).sum(),
            links: graph.chromosomes.iter().map(|c| c.links.len()).sum(),
            warnings: graph.warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConvertConfig::default();
        assert_eq!(config.delimiter, "#");
        assert_eq!(config.threads, 4);
        assert_eq!(config.flank_length, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_reserved_delimiters_rejected() {
        for delimiter in ["", ":", "|", "~", "a b", "\t"] {
            let config = ConvertConfig {
                delimiter: delimiter.to_string(),
                ..ConvertConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(ConvertError::InvalidDelimiter(_))),
                "delimiter {delimiter:?} should be rejected"
            );
        }
        assert!(Converter::new(ConvertConfig {
            delimiter: "||".to_string(),
            ..ConvertConfig::default()
        })
        .is_err());
    }

    #[test]
    fn test_error_messages() {
        let err = ConvertError::ChromosomeMissing(vec!["chr3".to_string(), "chr4".to_string()]);
        assert!(err.to_string().contains("chr3, chr4"));
        assert_eq!(
            ConversionWarning::ChromosomeSkipped("chrZ".to_string()).to_string(),
            "Illegal chromosome name 'chrZ': not in the reference, skipped"
        );
    }
}
