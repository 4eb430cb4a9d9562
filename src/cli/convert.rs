use std::path::{Path, PathBuf};

use clap::Args;
use tracing::info;

use crate::cli::OutputFormat;
use crate::convert::{ConversionReport, ConvertConfig, ConvertError, Converter, DEFAULT_THREADS};
use crate::core::types::DEFAULT_DELIMITER;
use crate::parsing::fai::{fai_path_for, read_contig_lengths};
use crate::parsing::fasta::{is_fasta_file, ContigLengths, FastaReference, ReferenceSource};
use crate::parsing::{write_text, ParseError};
use crate::parsing::vcf::{VariantSource, VcfSource};

#[derive(Args)]
pub struct ConvertArgs {
    /// Multi-sample VCF (plain or gzip compressed)
    #[arg(required = true)]
    pub vcf: PathBuf,

    /// Sample name written on backbone segments
    #[arg(short, long)]
    pub backbone: String,

    /// Output rGFA file (gzip compressed when it ends in .gz)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Reference FASTA; without it segment sequences are written as '*'
    #[arg(short, long)]
    pub reference: Option<PathBuf>,

    /// Chromosomes to convert, in output order (default: all VCF chromosomes)
    #[arg(short = 'c', long = "chr", num_args = 1..)]
    pub chromosomes: Vec<String>,

    /// Number of worker threads
    #[arg(short = 'n', long, default_value_t = DEFAULT_THREADS)]
    pub threads: usize,

    /// Separator inside SN and INF tags
    #[arg(long, default_value = DEFAULT_DELIMITER)]
    pub delimiter: String,
}

impl ConvertArgs {
    fn config(&self) -> ConvertConfig {
        ConvertConfig {
            backbone: self.backbone.clone(),
            threads: self.threads,
            chromosomes: (!self.chromosomes.is_empty()).then(|| self.chromosomes.clone()),
            delimiter: self.delimiter.clone(),
            ..ConvertConfig::default()
        }
    }
}

pub fn run(args: ConvertArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let converter = Converter::new(args.config())?;

    info!("Parsing VCF {} ...", args.vcf.display());
    let variants = VcfSource::from_path(&args.vcf)?;

    if verbose {
        eprintln!(
            "VCF: {} samples, {} records on {} chromosomes",
            variants.samples().len(),
            variants.record_count(),
            variants.chromosomes().len()
        );
    }

    let reference: Box<dyn ReferenceSource> = match &args.reference {
        Some(path) => {
            if !is_fasta_file(path) {
                return Err(ParseError::UnsupportedFormat(format!(
                    "{} is not a FASTA file (.fa, .fasta, .fna)",
                    path.display()
                ))
                .into());
            }
            check_fai(path, &variants, converter.config())?;
            info!("Parsing reference {} ...", path.display());
            Box::new(FastaReference::from_path(path)?)
        }
        None => {
            info!("No reference given; contig lengths come from the VCF header");
            Box::new(ContigLengths::new(variants.header_contigs()))
        }
    };

    let report = write_graph(&converter, &variants, reference.as_ref(), &args.output)?;
    info!("Wrote {}", args.output.display());

    match format {
        OutputFormat::Text => print_text_report(&report, &args.output),
        OutputFormat::Json => print_json_report(&report, &args.output)?,
        OutputFormat::Tsv => print_tsv_report(&report),
    }

    Ok(())
}

/// Fail before loading a FASTA whose index already shows missing chromosomes
fn check_fai(fasta: &Path, variants: &VcfSource, config: &ConvertConfig) -> anyhow::Result<()> {
    let fai = fai_path_for(fasta);
    if config.chromosomes.is_some() || !fai.exists() {
        return Ok(());
    }

    let lengths = read_contig_lengths(&fai)?;
    let missing: Vec<String> = variants
        .chromosomes()
        .into_iter()
        .filter(|chrom| !lengths.iter().any(|(name, _)| name == chrom))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ConvertError::ChromosomeMissing(missing).into())
    }
}

/// Build the whole graph before touching `output`, so a fatal input error
/// leaves no file behind
fn write_graph(
    converter: &Converter,
    variants: &VcfSource,
    reference: &dyn ReferenceSource,
    output: &Path,
) -> anyhow::Result<ConversionReport> {
    let graph = converter.build(variants, reference)?;
    let report = write_text(output, |mut writer| converter.write(graph, &mut writer))?;
    Ok(report)
}

fn print_text_report(report: &ConversionReport, output: &Path) {
    println!("Conversion Result");
    println!("{}", "=".repeat(60));
    println!();
    println!("Output:      {}", output.display());
    println!("Chromosomes: {}", report.chromosomes.join(", "));
    println!("Segments:    {}", report.segments);
    println!("Links:       {}", report.links);

    if report.has_warnings() {
        println!();
        println!("Warnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            println!("  - {warning}");
        }
    }
}

fn print_json_report(report: &ConversionReport, output: &Path) -> anyhow::Result<()> {
    let warnings: Vec<String> = report.warnings.iter().map(ToString::to_string).collect();
    let output = serde_json::json!({
        "output": output.display().to_string(),
        "chromosomes": report.chromosomes,
        "segments": report.segments,
        "links": report.links,
        "warnings": warnings,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_report(report: &ConversionReport) {
    println!("chromosomes\tsegments\tlinks\twarnings");
    println!(
        "{}\t{}\t{}\t{}",
        report.chromosomes.join(","),
        report.segments,
        report.links,
        report.warnings.len()
    );
}
