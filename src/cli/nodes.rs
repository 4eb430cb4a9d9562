use std::path::PathBuf;

use clap::Args;

use crate::cli::OutputFormat;
use crate::core::types::DEFAULT_DELIMITER;
use crate::graph::nodes::{find_nodes, format_records, NodeRecord};
use crate::graph::GraphConfig;

#[derive(Args)]
pub struct NodesArgs {
    /// rGFA file (plain or gzip compressed)
    #[arg(required = true)]
    pub gfa: PathBuf,

    /// Segment ids to print
    #[arg(required = true, num_args = 1..)]
    pub ids: Vec<String>,

    /// Separator inside SN and INF tags
    #[arg(long, default_value = DEFAULT_DELIMITER)]
    pub delimiter: String,
}

pub fn run(args: NodesArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let config = GraphConfig {
        delimiter: args.delimiter.clone(),
        ..GraphConfig::default()
    };
    let records = find_nodes(&args.gfa, &args.ids, &config)?;

    if verbose {
        let missing: Vec<&str> = args
            .ids
            .iter()
            .filter(|id| !records.iter().any(|r| &r.id == *id))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            eprintln!("Not found: {}", missing.join(", "));
        }
    }

    match format {
        OutputFormat::Text => {
            if !records.is_empty() {
                println!("{}", format_records(&records));
            }
        }
        OutputFormat::Json => print_json_records(&records)?,
        OutputFormat::Tsv => print_tsv_records(&records),
    }

    Ok(())
}

fn print_json_records(records: &[NodeRecord]) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(records)?);
    Ok(())
}

fn print_tsv_records(records: &[NodeRecord]) {
    println!("id\ttitle\tsequence");
    for record in records {
        println!("{}\t{}\t{}", record.id, record.title, record.sequence);
    }
}
