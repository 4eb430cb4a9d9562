use std::path::PathBuf;

use clap::Args;

use crate::cli::OutputFormat;
use crate::core::types::DEFAULT_DELIMITER;
use crate::manage::backbone::{remove_backbone, Removal};
use crate::manage::RgfaDocument;
use crate::parsing::write_text;

#[derive(Args)]
pub struct RemoveBackboneArgs {
    /// rGFA file (plain or gzip compressed)
    #[arg(required = true)]
    pub gfa: PathBuf,

    /// Backbone sample to remove
    #[arg(short, long = "backbone", required = true, num_args = 1..)]
    pub backbones: Vec<String>,

    /// Output rGFA file (gzip compressed when it ends in .gz)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Separator inside SN and INF tags
    #[arg(long, default_value = DEFAULT_DELIMITER)]
    pub delimiter: String,
}

pub fn run(args: RemoveBackboneArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let mut document = RgfaDocument::from_path(&args.gfa)?;

    let mut removals = Vec::with_capacity(args.backbones.len());
    for backbone in &args.backbones {
        let removal = remove_backbone(&mut document, backbone, &args.delimiter);
        if removal.is_empty() {
            anyhow::bail!("Backbone {backbone} not found in {}", args.gfa.display());
        }
        if verbose {
            eprintln!(
                "{backbone}: {} backbone segments, {} variants, {} links removed",
                removal.backbone_segments, removal.variant_segments, removal.links
            );
        }
        removals.push((backbone.as_str(), removal));
    }

    write_text(&args.output, |writer| document.write(writer))?;

    match format {
        OutputFormat::Text => print_text_removals(&removals, &document),
        OutputFormat::Json => print_json_removals(&removals, &document)?,
        OutputFormat::Tsv => print_tsv_removals(&removals),
    }

    Ok(())
}

fn print_text_removals(removals: &[(&str, Removal)], document: &RgfaDocument) {
    println!("Removed Backbones");
    println!("{}", "=".repeat(60));
    println!();
    for (backbone, removal) in removals {
        println!(
            "  {:<15} {} segments, {} variants, {} links",
            backbone, removal.backbone_segments, removal.variant_segments, removal.links
        );
    }
    println!();
    println!("Remaining:   {} segments, {} links", document.segments.len(), document.links.len());
}

fn print_json_removals(removals: &[(&str, Removal)], document: &RgfaDocument) -> anyhow::Result<()> {
    let removed: Vec<_> = removals
        .iter()
        .map(|(backbone, removal)| {
            serde_json::json!({
                "backbone": backbone,
                "backbone_segments": removal.backbone_segments,
                "variant_segments": removal.variant_segments,
                "links": removal.links,
            })
        })
        .collect();
    let output = serde_json::json!({
        "removed": removed,
        "segments": document.segments.len(),
        "links": document.links.len(),
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_removals(removals: &[(&str, Removal)]) {
    println!("backbone\tbackbone_segments\tvariant_segments\tlinks");
    for (backbone, removal) in removals {
        println!(
            "{}\t{}\t{}\t{}",
            backbone, removal.backbone_segments, removal.variant_segments, removal.links
        );
    }
}
