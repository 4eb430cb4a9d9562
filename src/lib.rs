//! # pangraph
//!
//! A library for building and querying pangenome variation graphs in the
//! reference-anchored GFA (rGFA) format.
//!
//! A multi-sample VCF describes how each sample differs from one reference.
//! `pangraph` turns those records into a graph: the reference becomes a chain of
//! backbone segments split wherever a variant attaches, and every distinct
//! variant becomes a segment labelled with the samples that carry it.
//!
//! ## Features
//!
//! - **Parallel conversion**: Chromosomes are converted on a fixed-size rayon pool
//! - **Deterministic ids**: Segment ids never depend on thread scheduling
//! - **Sample collapsing**: Identical variants share one segment
//! - **Canonical loading**: Link orientation is normalized and mirror nodes are
//!   synthesized for reverse-strand variant ends
//! - **File maintenance**: Merge graphs, drop a backbone, export variants to VCF
//! - **Region queries**: Backbone selection plus iterative variant absorption,
//!   optionally restricted to some samples
//!
//! ## Example
//!
//! ```rust,no_run
//! use pangraph::graph::{load_region, GraphConfig, RegionQuery};
//! use std::path::Path;
//!
//! let query = RegionQuery {
//!     from: Some(1),
//!     to: Some(5_000),
//!     ..RegionQuery::new("chr1")
//! };
//! let config = GraphConfig::default();
//! let (graph, selection) = load_region(Path::new("graph.gfa"), &query, None, &config).unwrap();
//!
//! for &i in &selection.nodes {
//!     let node = graph.node(i);
//!     println!("{} {}:{:?}-{:?}", node.id, node.contig, node.pos_start, node.pos_end);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Segment, link and variant descriptor types
//! - [`parsing`]: VCF, FASTA, FASTA index and rGFA line readers/writers
//! - [`convert`]: VCF + reference to rGFA conversion
//! - [`graph`]: rGFA loading, coordinate propagation, subgraphs and render data
//! - [`manage`]: Merging, backbone removal and variant export on whole files
//! - [`cli`]: Command-line interface implementation
//! - [`web`]: JSON API server

pub mod cli;
pub mod convert;
pub mod core;
pub mod graph;
pub mod manage;
pub mod parsing;
pub mod web;

// Re-export commonly used types for convenience
pub use convert::{ConversionReport, ConvertConfig, ConvertError, Converter};
pub use core::segment::{Link, Segment, VariantDescriptor};
pub use core::types::*;
pub use graph::{GraphConfig, GraphError, LoadIssue, LoadOptions, PanGenomeGraph, RegionQuery, Subgraph};
