//! Segment lookup by id, written as FASTA-like records.

use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::graph::loader::Node;
use crate::graph::render::node_title;
use crate::graph::{GraphConfig, GraphError};
use crate::parsing::open_text;
use crate::parsing::rgfa::{parse_line, GfaLine};

/// One requested segment with its full sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeRecord {
    pub id: String,
    pub title: String,
    /// `*` when the file withholds the sequence
    pub sequence: String,
}

impl std::fmt::Display for NodeRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, ">{}\t{}\n{}", self.id, self.title, self.sequence)
    }
}

/// Find the given segments, returned in request order; unknown ids are
/// left out.
///
/// # Errors
///
/// Returns `GraphError::Io` if the file cannot be read.
pub fn find_nodes(path: &Path, ids: &[String], config: &GraphConfig) -> Result<Vec<NodeRecord>, GraphError> {
    find_nodes_in(open_text(path)?, ids, config)
}

/// # Errors
///
/// Returns `GraphError::Io` on read failure.
pub fn find_nodes_in<R: BufRead>(
    reader: R,
    ids: &[String],
    config: &GraphConfig,
) -> Result<Vec<NodeRecord>, GraphError> {
    let mut wanted: HashMap<&str, Option<NodeRecord>> =
        ids.iter().map(|id| (id.as_str(), None)).collect();
    let mut remaining = wanted.len();
    let mut issues = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        if remaining == 0 {
            break;
        }
        let line = line?;
        if !line.starts_with("S\t") {
            continue;
        }
        let Ok(GfaLine::Segment(segment)) = parse_line(&line) else {
            continue;
        };
        let Some(slot) = wanted.get_mut(segment.id.as_str()) else {
            continue;
        };
        if slot.is_some() {
            continue;
        }

        let node = Node::from_segment_line(segment, i + 1, config, true, &mut issues);
        *slot = Some(NodeRecord {
            title: node_title(&node, None, false),
            sequence: node.sequence.clone().unwrap_or_else(|| "*".to_string()),
            id: node.id,
        });
        remaining -= 1;
    }

    debug!("Found {} of {} requested nodes", wanted.len() - remaining, wanted.len());

    Ok(ids
        .iter()
        .filter_map(|id| wanted.get_mut(id.as_str()).and_then(Option::take))
        .collect())
}

/// Records joined as `>id\ttitle\nsequence` blocks
pub fn format_records(records: &[NodeRecord]) -> String {
    records
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const GFA: &str = "\
S\ts1\tACGTACGTACGTA\tLN:i:13\tSN:Z:ref#chr1\tSO:i:0\tSR:i:0
S\ts2\t*\tLN:i:10\tSN:Z:S1#chr1\tSO:i:4\tSR:i:1\tINF:Z:SV#DEL#chr1#5#chr1#15#d#S1#s1#s1
L\ts1\t+\ts2\t+\t0M
";

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_find_in_request_order() {
        let records =
            find_nodes_in(GFA.as_bytes(), &ids(&["s2", "missing", "s1"]), &GraphConfig::default()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "s2");
        assert_eq!(records[0].sequence, "*");
        assert_eq!(records[1].sequence, "ACGTACGTACGTA");
    }

    #[test]
    fn test_format_records() {
        let records = find_nodes_in(GFA.as_bytes(), &ids(&["s1"]), &GraphConfig::default()).unwrap();
        assert_eq!(
            format_records(&records),
            ">s1\tNodeId: s1; Resource: ref_chr1; Len: 13; Pos: 1 - 13\nACGTACGTACGTA"
        );
    }

    #[test]
    fn test_duplicate_request() {
        let records = find_nodes_in(GFA.as_bytes(), &ids(&["s1", "s1"]), &GraphConfig::default()).unwrap();
        assert_eq!(records.len(), 1);
    }
}
