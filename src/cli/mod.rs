//! Command-line interface for pangraph.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **convert**: Build an rGFA graph from a multi-sample VCF and a reference
//! - **inspect**: Summarize an rGFA file (backbones, samples, counts)
//! - **subgraph**: Select a region of one contig and emit render data
//! - **nodes**: Print segments by id as FASTA-like records
//! - **merge**: Combine several rGFA files into one with unique ids
//! - **export-sv**: Write variant segments as VCF records
//! - **remove-backbone**: Drop a backbone and the variants anchored only on it
//! - **serve**: Start the JSON API over one rGFA file
//!
//! ## Usage
//!
//! ```text
//! # Convert with 8 worker threads
//! pangraph convert calls.vcf.gz -b GRCh38 -r GRCh38.fa -o graph.gfa -n 8
//!
//! # Without a FASTA, lengths come from ##contig lines and sequences are '*'
//! pangraph convert calls.vcf -b GRCh38 -o graph.gfa
//!
//! # Region of chr1 restricted to two samples, as JSON
//! pangraph subgraph graph.gfa -c chr1 -s 10000 -e 20000 -l S1 -l S2 --format json
//!
//! # Merge per-chromosome graphs, then export the variants of one backbone
//! pangraph merge chr1.gfa chr2.gfa -o merged.gfa
//! pangraph export-sv merged.gfa -b GRCh38 -R targets.bed -o variants.vcf
//!
//! # Start the API
//! pangraph serve graph.gfa --port 8080 --open
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod convert;
pub mod export_sv;
pub mod inspect;
pub mod merge;
pub mod nodes;
pub mod remove_backbone;
pub mod subgraph;

#[derive(Parser)]
#[command(name = "pangraph")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Build and query pangenome variation graphs (rGFA) from VCF and FASTA")]
#[command(
    long_about = "pangraph turns a multi-sample VCF and a reference genome into a reference-anchored GFA (rGFA) graph.\n\nThe backbone follows the reference; every distinct variant becomes a segment named after the samples carrying it. The resulting graph can then be:\n- Summarized (backbones, samples, variant counts)\n- Queried by region and sample for visualization\n- Merged with other graphs, trimmed of a backbone or exported back to VCF\n- Served over a small JSON API"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a VCF and reference into an rGFA graph
    Convert(convert::ConvertArgs),

    /// Summarize an rGFA file
    Inspect(inspect::InspectArgs),

    /// Extract a region of one contig as render data
    Subgraph(subgraph::SubgraphArgs),

    /// Print segments by id
    Nodes(nodes::NodesArgs),

    /// Merge rGFA files, offsetting ids so they stay unique
    Merge(merge::MergeArgs),

    /// Export variant segments to VCF
    ExportSv(export_sv::ExportSvArgs),

    /// Remove a backbone from an rGFA file
    RemoveBackbone(remove_backbone::RemoveBackboneArgs),

    /// Start the web server
    Serve(ServeArgs),
}

#[derive(clap::Args)]
pub struct ServeArgs {
    /// rGFA file to serve
    #[arg(required = true)]
    pub gfa: PathBuf,

    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Address to bind to
    #[arg(short, long, default_value = "127.0.0.1")]
    pub address: String,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,

    /// Separator inside SN and INF tags
    #[arg(long, default_value = crate::core::types::DEFAULT_DELIMITER)]
    pub delimiter: String,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
