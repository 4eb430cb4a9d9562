//! Thread pool that synthesizes chromosomes in parallel.
//!
//! Each chromosome is one task on a dedicated rayon pool of `config.threads`
//! workers; idle workers steal pending chromosomes, so one long chromosome
//! never holds up the rest. Results are collected through an indexed parallel
//! iterator and come back in the caller's chromosome order, so nothing
//! downstream can observe which worker finished first.

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::{debug, warn};

use crate::convert::synth::{synthesize, ChromosomeGraph};
use crate::convert::{ConversionWarning, ConvertConfig, ConvertError};
use crate::parsing::fasta::ReferenceSource;
use crate::parsing::vcf::VariantSource;

/// Per-chromosome results in caller order, plus chromosome-level warnings
#[derive(Debug, Default)]
pub struct PoolOutcome {
    pub graphs: Vec<ChromosomeGraph>,
    pub warnings: Vec<ConversionWarning>,
}

/// Checks that must pass before any work is scheduled.
///
/// With an explicit chromosome list only sample columns are checked here;
/// requested chromosomes missing from the reference are skipped later.
///
/// # Errors
///
/// Returns `ConvertError::NoSamples` if the VCF has no genotype columns,
/// `ConvertError::ChromosomeMissing` if a VCF chromosome is absent from a
/// reference with sequences, or `ConvertError::ReferenceRequired` if contig
/// lengths are missing and no reference was given.
pub fn preflight(
    variants: &dyn VariantSource,
    reference: &dyn ReferenceSource,
    requested: Option<&[String]>,
) -> Result<(), ConvertError> {
    if variants.samples().is_empty() {
        return Err(ConvertError::NoSamples);
    }

    if requested.is_some() {
        return Ok(());
    }

    let missing: Vec<String> = variants
        .chromosomes()
        .into_iter()
        .filter(|chrom| reference.chrom_length(chrom).is_none())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else if reference.has_sequences() {
        Err(ConvertError::ChromosomeMissing(missing))
    } else {
        Err(ConvertError::ReferenceRequired(missing))
    }
}

/// Synthesize every chromosome on a pool of `config.threads` workers.
///
/// A chromosome the reference does not know is skipped with a warning.
///
/// # Errors
///
/// Returns `ConvertError::ThreadPool` if the worker pool cannot be started.
pub fn convert_chromosomes(
    chromosomes: &[String],
    variants: &dyn VariantSource,
    reference: &dyn ReferenceSource,
    config: &ConvertConfig,
) -> Result<PoolOutcome, ConvertError> {
    let mut outcome = PoolOutcome::default();

    let mut jobs = Vec::with_capacity(chromosomes.len());
    for chrom in chromosomes {
        match reference.chrom_length(chrom) {
            Some(length) => jobs.push((chrom.as_str(), length)),
            None => {
                warn!("Illegal chromosome name: {chrom}");
                outcome
                    .warnings
                    .push(ConversionWarning::ChromosomeSkipped(chrom.clone()));
            }
        }
    }

    if jobs.is_empty() {
        return Ok(outcome);
    }

    let workers = config.threads.clamp(1, jobs.len());
    let pool = ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("pangraph-convert-{i}"))
        .build()?;
    debug!("Converting {} chromosomes on {workers} threads", jobs.len());

    let samples = variants.samples();
    outcome.graphs = pool.install(|| {
        jobs.par_iter()
            .map(|&(chrom, length)| {
                let records = variants.records_in_range(chrom, 0, u64::MAX);
                synthesize(chrom, length, records, samples, reference, config)
            })
            .collect()
    });

    Ok(outcome)
}
