use std::path::{Path, PathBuf};

use clap::Args;
use tracing::info;

use crate::cli::OutputFormat;
use crate::core::types::DEFAULT_DELIMITER;
use crate::manage::export::{collect_variants, write_vcf, ExportFilter, VariantExport};
use crate::manage::RgfaDocument;
use crate::parsing::bed::RegionSet;
use crate::parsing::write_text;

#[derive(Args)]
pub struct ExportSvArgs {
    /// rGFA file (plain or gzip compressed)
    #[arg(required = true)]
    pub gfa: PathBuf,

    /// Output VCF (gzip compressed when it ends in .gz)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Only export variants anchored on this backbone
    #[arg(short, long)]
    pub backbone: Option<String>,

    /// Only export variants overlapping the regions of this BED file
    #[arg(short = 'R', long)]
    pub regions: Option<PathBuf>,

    /// Separator inside SN and INF tags
    #[arg(long, default_value = DEFAULT_DELIMITER)]
    pub delimiter: String,
}

pub fn run(args: ExportSvArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let document = RgfaDocument::from_path(&args.gfa)?;

    let regions = match &args.regions {
        Some(path) => {
            let regions = RegionSet::from_path(path)?;
            info!("Loaded {} target regions from {}", regions.len(), path.display());
            Some(regions)
        }
        None => None,
    };

    let filter = ExportFilter {
        backbone: args.backbone.as_deref(),
        regions: regions.as_ref(),
    };
    let export = collect_variants(&document, &filter, &args.delimiter);

    if verbose {
        eprintln!(
            "{} variants for {} samples",
            export.rows.len(),
            export.samples.len()
        );
    }

    write_text(&args.output, |writer| write_vcf(writer, &export))?;

    match format {
        OutputFormat::Text => print_text_export(&export, &args.output),
        OutputFormat::Json => print_json_export(&export, &args.output)?,
        OutputFormat::Tsv => print_tsv_export(&export),
    }

    Ok(())
}

fn print_text_export(export: &VariantExport, output: &Path) {
    println!("Variant Export");
    println!("{}", "=".repeat(60));
    println!();
    println!("Output:      {}", output.display());
    println!("Variants:    {}", export.rows.len());
    println!("Samples:     {}", export.samples.join(", "));
}

fn print_json_export(export: &VariantExport, output: &Path) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "output": output.display().to_string(),
        "variants": export.rows.len(),
        "samples": export.samples,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_export(export: &VariantExport) {
    println!("chrom\tpos\tid\ttype\tlength\tend\tcarriers");
    for row in &export.rows {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            row.chrom,
            row.pos,
            row.id,
            row.variant_type,
            row.length,
            row.end,
            row.carriers.join(",")
        );
    }
}
