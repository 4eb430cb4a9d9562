//! In-memory pangenome graph built from an rGFA file.
//!
//! A graph is loaded fresh for every query and dropped afterwards:
//!
//! 1. [`loader`] streams the file once, applies the caller's filters,
//!    canonicalizes link orientation and synthesizes mirror nodes.
//! 2. [`coords`] walks each contig from its first backbone segment and assigns
//!    display coordinates.
//! 3. [`subgraph`] selects a region or an explicit node set.
//! 4. [`render`] turns the selection into colored, sized node/edge records.
//!
//! [`summary`] and [`nodes`] are lighter single-pass scans that never build
//! the graph.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::DEFAULT_DELIMITER;
use crate::parsing::ParseError;

pub mod coords;
pub mod loader;
pub mod nodes;
pub mod render;
pub mod subgraph;
pub mod summary;

pub use loader::{LoadOptions, PanGenomeGraph};
pub use subgraph::{RegionQuery, Subgraph};

/// Number of leading/trailing bases kept as a sequence preview
pub const DEFAULT_PREVIEW_LENGTH: usize = 10;

/// Selections above this size are refused for rendering
pub const DEFAULT_MAX_NODES: usize = 20_000;

/// Selections above this size render slowly in an interactive view
pub const DEFAULT_DISPLAY_LIMIT: usize = 1_000;

/// Settings shared by the loader, extractor and renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Separator inside `SN` and `INF` tags
    pub delimiter: String,
    pub preview_length: usize,
    pub max_nodes: usize,
    pub display_limit: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
            preview_length: DEFAULT_PREVIEW_LENGTH,
            max_nodes: DEFAULT_MAX_NODES,
            display_limit: DEFAULT_DISPLAY_LIMIT,
        }
    }
}

/// A non-fatal problem found while loading or querying a graph
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadIssue {
    #[error("Invalid format at line {line}: {message}")]
    FormatError { line: usize, message: String },

    #[error("Segment {id} at line {line}: SN value '{value}' has no '{delimiter}' separator; the file needs to be normalized")]
    SchemaViolation {
        line: usize,
        id: String,
        value: String,
        delimiter: String,
    },

    #[error("Segment {id}: stored start {stored} disagrees with propagated start {propagated}")]
    CoordinateMismatch {
        id: String,
        stored: u64,
        propagated: u64,
    },

    #[error("Contig {contig} not found in GFA. Contig ignored")]
    ContigNotFound { contig: String },
}

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

/// Load the component of `query.contig`, place coordinates and select the
/// region.
///
/// # Errors
///
/// Returns `GraphError::Io` if the file cannot be read.
pub fn load_region(
    path: &Path,
    query: &RegionQuery,
    backbone: Option<&str>,
    config: &GraphConfig,
) -> Result<(PanGenomeGraph, Subgraph), GraphError> {
    let options = LoadOptions {
        contig: Some(query.contig.clone()),
        backbone: backbone.map(str::to_string),
        samples: query.samples.clone(),
        ..LoadOptions::default()
    };
    let mut graph = PanGenomeGraph::load(path, &options, config)?;
    coords::propagate(&mut graph);

    let mut selection = subgraph::extract_region(&graph, query, config);
    let mut issues = graph.issues().to_vec();
    for issue in selection.issues.drain(..) {
        if !issues.contains(&issue) {
            issues.push(issue);
        }
    }
    selection.issues = issues;
    Ok((graph, selection))
}

/// Load exactly the given segments (plus mirrors) and select all of them.
///
/// # Errors
///
/// Returns `GraphError::Io` if the file cannot be read.
pub fn load_node_set(
    path: &Path,
    ids: &[String],
    config: &GraphConfig,
) -> Result<(PanGenomeGraph, Subgraph), GraphError> {
    let options = LoadOptions {
        node_ids: Some(ids.iter().cloned().collect::<HashSet<_>>()),
        ..LoadOptions::default()
    };
    let mut graph = PanGenomeGraph::load(path, &options, config)?;
    coords::propagate(&mut graph);

    let mut selection = Subgraph::whole(&graph, config);
    selection.issues = graph.issues().to_vec();
    Ok((graph, selection))
}
