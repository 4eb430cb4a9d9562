use std::path::{Path, PathBuf};

use clap::Args;
use tracing::info;

use crate::cli::OutputFormat;
use crate::core::types::DEFAULT_DELIMITER;
use crate::manage::merge::merge;
use crate::manage::RgfaDocument;
use crate::parsing::write_text;

#[derive(Args)]
pub struct MergeArgs {
    /// rGFA files to merge, in output order (plain or gzip compressed)
    #[arg(required = true, num_args = 2..)]
    pub inputs: Vec<PathBuf>,

    /// Merged rGFA file (gzip compressed when it ends in .gz)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Separator inside SN and INF tags
    #[arg(long, default_value = DEFAULT_DELIMITER)]
    pub delimiter: String,
}

pub fn run(args: MergeArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let mut documents = Vec::with_capacity(args.inputs.len());
    for path in &args.inputs {
        info!("Loading rGFA file {} ...", path.display());
        let document = RgfaDocument::from_path(path)?;
        if verbose {
            eprintln!(
                "{}: {} segments, {} links",
                path.display(),
                document.segments.len(),
                document.links.len()
            );
        }
        documents.push(document);
    }

    let merged = merge(documents, &args.delimiter)?;
    write_text(&args.output, |writer| merged.write(writer))?;

    match format {
        OutputFormat::Text => print_text_merge(&args.inputs, &merged, &args.output),
        OutputFormat::Json => print_json_merge(&args.inputs, &merged, &args.output)?,
        OutputFormat::Tsv => print_tsv_merge(&args.inputs, &merged),
    }

    Ok(())
}

fn print_text_merge(inputs: &[PathBuf], merged: &RgfaDocument, output: &Path) {
    println!("Merge Result");
    println!("{}", "=".repeat(60));
    println!();
    println!("Inputs:      {}", inputs.len());
    println!("Output:      {}", output.display());
    println!("Segments:    {}", merged.segments.len());
    println!("Links:       {}", merged.links.len());
}

fn print_json_merge(inputs: &[PathBuf], merged: &RgfaDocument, output: &Path) -> anyhow::Result<()> {
    let inputs: Vec<String> = inputs.iter().map(|p| p.display().to_string()).collect();
    let output = serde_json::json!({
        "inputs": inputs,
        "output": output.display().to_string(),
        "segments": merged.segments.len(),
        "links": merged.links.len(),
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_merge(inputs: &[PathBuf], merged: &RgfaDocument) {
    println!("inputs\tsegments\tlinks");
    println!("{}\t{}\t{}", inputs.len(), merged.segments.len(), merged.links.len());
}
