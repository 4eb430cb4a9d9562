use std::path::PathBuf;

use clap::Args;

use crate::cli::OutputFormat;
use crate::core::types::DEFAULT_DELIMITER;
use crate::graph::summary::GraphSummary;
use crate::graph::GraphConfig;

#[derive(Args)]
pub struct InspectArgs {
    /// rGFA file (plain or gzip compressed)
    #[arg(required = true)]
    pub gfa: PathBuf,

    /// Separator inside SN and INF tags
    #[arg(long, default_value = DEFAULT_DELIMITER)]
    pub delimiter: String,
}

pub fn run(args: InspectArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let config = GraphConfig {
        delimiter: args.delimiter.clone(),
        ..GraphConfig::default()
    };
    let summary = GraphSummary::scan(&args.gfa, &config)?;

    match format {
        OutputFormat::Text => print_text_summary(&summary, verbose),
        OutputFormat::Json => print_json_summary(&summary)?,
        OutputFormat::Tsv => print_tsv_summary(&summary),
    }

    Ok(())
}

fn print_text_summary(summary: &GraphSummary, verbose: bool) {
    println!("Graph Summary");
    println!("{}", "=".repeat(60));
    println!();

    for backbone in &summary.backbones {
        println!("Backbone: {}", backbone.name);
        println!("  Contigs: {}", backbone.contigs.join(", "));
    }
    println!("Backbone length:  {}", summary.backbone_length);
    println!();

    println!("Segments:         {}", summary.segments);
    println!("  Backbone:       {}", summary.backbone_segments);
    println!("  Variant:        {}", summary.variant_segments());
    println!("Links:            {}", summary.links);
    println!();

    println!("Samples ({}):", summary.samples.len());
    if verbose || summary.samples.len() <= 20 {
        for sample in &summary.samples {
            println!("  {sample}");
        }
    } else {
        for sample in summary.samples.iter().take(20) {
            println!("  {sample}");
        }
        println!("  ... and {} more", summary.samples.len() - 20);
    }

    if !summary.variant_types.is_empty() {
        println!();
        println!("Variant types:");
        for (variant_type, count) in &summary.variant_types {
            println!("  {:<4} {count}", variant_type.as_str());
        }
    }

    if summary.needs_normalization {
        println!();
        println!("WARNING: SN tags lack the sample/contig separator; the file needs to be normalized");
    }

    if summary.has_warnings() {
        println!();
        println!("Issues ({}):", summary.issues.len());
        for issue in &summary.issues {
            println!("  - {issue}");
        }
    }
}

fn print_json_summary(summary: &GraphSummary) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}

fn print_tsv_summary(summary: &GraphSummary) {
    println!("backbone\tcontigs\tsegments\tlinks\tsamples\tneeds_normalization");
    for backbone in &summary.backbones {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            backbone.name,
            backbone.contigs.join(","),
            summary.segments,
            summary.links,
            summary.samples.len(),
            summary.needs_normalization
        );
    }
}
