//! Region and node-set selection over a loaded graph.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::graph::loader::PanGenomeGraph;
use crate::graph::{GraphConfig, LoadIssue};

/// A region of one contig, optionally limited to some samples
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionQuery {
    pub contig: String,
    /// 1-based inclusive bounds; `None` is unbounded
    pub from: Option<u64>,
    pub to: Option<u64>,
    /// Variant nodes must be carried by one of these; `None` allows all
    pub samples: Option<Vec<String>>,
}

impl RegionQuery {
    pub fn new(contig: &str) -> Self {
        Self {
            contig: contig.to_string(),
            ..Self::default()
        }
    }

    fn overlaps(&self, start: u64, end: u64) -> bool {
        self.to.map_or(true, |to| start <= to) && self.from.map_or(true, |from| end >= from)
    }

    fn contains(&self, pos: u64) -> bool {
        self.overlaps(pos, pos)
    }

    fn allows(&self, carriers: &[String]) -> bool {
        match &self.samples {
            Some(samples) => carriers.iter().any(|c| samples.contains(c)),
            None => true,
        }
    }
}

/// Size signals for whoever renders the selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SubgraphSignals {
    pub empty: bool,
    /// More nodes than can be rendered at all
    pub exceeds_max_nodes: bool,
    /// More nodes than an interactive view handles comfortably
    pub exceeds_display_limit: bool,
}

impl SubgraphSignals {
    fn for_size(size: usize, config: &GraphConfig) -> Self {
        Self {
            empty: size == 0,
            exceeds_max_nodes: size > config.max_nodes,
            exceeds_display_limit: size > config.display_limit,
        }
    }
}

/// An induced subgraph, as arena positions into the source graph
#[derive(Debug, Clone, Default)]
pub struct Subgraph {
    /// Node positions in arena order
    pub nodes: Vec<usize>,
    /// Edge positions whose endpoints are both selected
    pub edges: Vec<usize>,
    pub signals: SubgraphSignals,
    pub issues: Vec<LoadIssue>,
}

impl Subgraph {
    fn induced(graph: &PanGenomeGraph, selected: &HashSet<usize>, config: &GraphConfig) -> Self {
        let mut nodes: Vec<usize> = selected.iter().copied().collect();
        nodes.sort_unstable();

        let edges = graph
            .edges()
            .iter()
            .enumerate()
            .filter(|(_, e)| selected.contains(&e.from) && selected.contains(&e.to))
            .map(|(i, _)| i)
            .collect();

        let signals = SubgraphSignals::for_size(nodes.len(), config);
        if signals.empty {
            info!("No nodes in the selected region");
        }

        Self {
            nodes,
            edges,
            signals,
            issues: Vec::new(),
        }
    }

    /// Every node of the graph, e.g. after loading with a node-id allowlist
    pub fn whole(graph: &PanGenomeGraph, config: &GraphConfig) -> Self {
        let all: HashSet<usize> = (0..graph.node_count()).collect();
        Self::induced(graph, &all, config)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Select the backbone segments overlapping the region, then absorb variant
/// neighbours until nothing changes.
///
/// A variant neighbour is absorbed when it passes the sample filter and
/// either its point lies in the region or every backbone segment it touches
/// is already selected. Coordinates must have been propagated.
pub fn extract_region(graph: &PanGenomeGraph, query: &RegionQuery, config: &GraphConfig) -> Subgraph {
    let Some(start) = graph.first_backbone(&query.contig) else {
        warn!("Contig {} not found in GFA. Contig ignored", query.contig);
        let mut subgraph = Subgraph::induced(graph, &HashSet::new(), config);
        subgraph.issues.push(LoadIssue::ContigNotFound {
            contig: query.contig.clone(),
        });
        return subgraph;
    };

    let component: HashSet<usize> = graph.component(start).into_iter().collect();

    let mut selected: HashSet<usize> = component
        .iter()
        .copied()
        .filter(|&i| {
            let node = graph.node(i);
            if !node.is_backbone() || node.contig != query.contig {
                return false;
            }
            match (node.pos_start, node.pos_end) {
                (Some(s), Some(e)) => query.overlaps(s, e),
                _ => false,
            }
        })
        .collect();

    let mut frontier: Vec<usize> = selected.iter().copied().collect();
    let mut rounds = 0usize;
    while !frontier.is_empty() {
        rounds += 1;
        let mut added = Vec::new();
        for &i in &frontier {
            for &n in graph.neighbors(i) {
                if selected.contains(&n) || added.contains(&n) || !component.contains(&n) {
                    continue;
                }
                if absorbs(graph, query, &selected, n) {
                    added.push(n);
                }
            }
        }
        selected.extend(added.iter().copied());
        frontier = added;
    }

    info!(
        "Subgraph of {}: {} nodes after {rounds} rounds",
        query.contig,
        selected.len()
    );
    Subgraph::induced(graph, &selected, config)
}

fn absorbs(graph: &PanGenomeGraph, query: &RegionQuery, selected: &HashSet<usize>, n: usize) -> bool {
    let node = graph.node(n);
    if node.is_backbone() || !query.allows(&node.carriers()) {
        return false;
    }
    if node.pos_start.is_some_and(|p| query.contains(p)) {
        return true;
    }
    graph
        .neighbors(n)
        .filter(|&&m| graph.node(m).is_backbone())
        .all(|m| selected.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::coords::propagate;
    use crate::graph::LoadOptions;

    const GFA: &str = "\
S\ts1\t*\tLN:i:19\tSN:Z:ref#chr1\tSO:i:0\tSR:i:0
S\ts2\t*\tLN:i:10\tSN:Z:ref#chr1\tSO:i:19\tSR:i:0
S\ts3\t*\tLN:i:20\tSN:Z:ref#chr1\tSO:i:29\tSR:i:0
S\ts4\t*\tLN:i:1\tSN:Z:ref#chr1\tSO:i:49\tSR:i:0
S\ts5\t*\tLN:i:50\tSN:Z:ref#chr1\tSO:i:50\tSR:i:0
S\ts6\t*\tLN:i:10\tSN:Z:S2#chr1\tSO:i:19\tSR:i:1\tINF:Z:SV#DEL#chr1#20#chr1#30#d1#S2#s1#s3
S\ts7\tG\tLN:i:1\tSN:Z:S1#chr1\tSO:i:49\tSR:i:1\tINF:Z:SV#SNP#chr1#50#chr1#50#v1#S1#s3#s5
L\ts1\t+\ts2\t+\t0M
L\ts2\t+\ts3\t+\t0M
L\ts3\t+\ts4\t+\t0M
L\ts4\t+\ts5\t+\t0M
L\ts1\t+\ts6\t+\t0M
L\ts6\t+\ts3\t+\t0M
L\ts3\t+\ts7\t+\t0M
L\ts7\t+\ts5\t+\t0M
";

    fn graph() -> PanGenomeGraph {
        let mut graph =
            PanGenomeGraph::from_reader(GFA.as_bytes(), &LoadOptions::default(), &GraphConfig::default())
                .unwrap();
        propagate(&mut graph);
        graph
    }

    fn ids(graph: &PanGenomeGraph, subgraph: &Subgraph) -> Vec<String> {
        subgraph
            .nodes
            .iter()
            .map(|&i| graph.node(i).id.clone())
            .collect()
    }

    fn query(from: Option<u64>, to: Option<u64>) -> RegionQuery {
        RegionQuery {
            from,
            to,
            ..RegionQuery::new("chr1")
        }
    }

    #[test]
    fn test_region_before_variant() {
        let graph = graph();
        let sub = extract_region(&graph, &query(Some(1), Some(18)), &GraphConfig::default());
        assert_eq!(ids(&graph, &sub), vec!["s1"]);
        assert!(sub.edges.is_empty());
    }

    #[test]
    fn test_deletion_absorbed_when_both_sides_selected() {
        let graph = graph();
        let sub = extract_region(&graph, &query(Some(1), Some(45)), &GraphConfig::default());
        assert_eq!(ids(&graph, &sub), vec!["s1", "s2", "s3", "s6"]);
        assert_eq!(sub.edges.len(), 4);
    }

    #[test]
    fn test_variant_with_unselected_backbone_side_left_out() {
        let graph = graph();
        let sub = extract_region(&graph, &query(Some(30), Some(45)), &GraphConfig::default());
        assert_eq!(ids(&graph, &sub), vec!["s3"]);
    }

    #[test]
    fn test_point_inside_region_absorbed() {
        let graph = graph();
        let sub = extract_region(&graph, &query(Some(45), Some(50)), &GraphConfig::default());
        assert_eq!(ids(&graph, &sub), vec!["s3", "s4", "s7"]);
    }

    #[test]
    fn test_sample_filter() {
        let graph = graph();
        let q = RegionQuery {
            samples: Some(vec!["S1".to_string()]),
            ..query(None, None)
        };
        let sub = extract_region(&graph, &q, &GraphConfig::default());
        assert_eq!(ids(&graph, &sub), vec!["s1", "s2", "s3", "s4", "s5", "s7"]);
    }

    #[test]
    fn test_empty_and_limits() {
        let graph = graph();
        let sub = extract_region(&graph, &query(Some(500), Some(600)), &GraphConfig::default());
        assert!(sub.signals.empty);
        assert!(sub.is_empty());

        let config = GraphConfig {
            display_limit: 3,
            max_nodes: 5,
            ..GraphConfig::default()
        };
        let sub = extract_region(&graph, &query(None, None), &config);
        assert_eq!(sub.len(), 7);
        assert!(sub.signals.exceeds_display_limit);
        assert!(sub.signals.exceeds_max_nodes);
        assert!(!sub.signals.empty);
    }

    #[test]
    fn test_unknown_contig() {
        let graph = graph();
        let sub = extract_region(&graph, &RegionQuery::new("chr9"), &GraphConfig::default());
        assert!(sub.signals.empty);
        assert_eq!(sub.issues.len(), 1);
    }

    #[test]
    fn test_whole() {
        let graph = graph();
        let sub = Subgraph::whole(&graph, &GraphConfig::default());
        assert_eq!(sub.len(), 7);
        assert_eq!(sub.edges.len(), 8);
    }
}
