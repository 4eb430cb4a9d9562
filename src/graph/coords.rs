//! Display coordinates derived by walking each contig.
//!
//! Backbone segments take their coordinates from their stored offset and
//! length. Every other node reached from a contig's first backbone segment is
//! placed at a single point, one past the end of the backbone segment last
//! seen by the walk. These points are for drawing only.

use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::graph::loader::PanGenomeGraph;
use crate::graph::LoadIssue;

/// Assign `pos_start`/`pos_end` for every contig's component.
///
/// Stored backbone offsets always win; a backbone segment that does not start
/// right after the backbone segment it was reached from is recorded as a
/// `CoordinateMismatch`.
pub fn propagate(graph: &mut PanGenomeGraph) {
    let starts: Vec<(String, usize)> = graph
        .contigs()
        .filter_map(|c| graph.first_backbone(c).map(|i| (c.clone(), i)))
        .collect();

    for (contig, start) in starts {
        propagate_contig(graph, &contig, start);
    }
}

fn propagate_contig(graph: &mut PanGenomeGraph, contig: &str, start: usize) {
    let is_own_backbone = |g: &PanGenomeGraph, i: usize| {
        let node = g.node(i);
        node.is_backbone() && node.contig == contig
    };

    place_backbone(graph, start);

    let mut visited = vec![false; graph.node_count()];
    visited[start] = true;
    let mut queue = VecDeque::from([start]);
    let mut next_pos = 0u64;
    let mut placed = 1usize;

    while let Some(from) = queue.pop_front() {
        let successors = graph.successors(from).to_vec();
        for to in successors {
            if visited[to] {
                continue;
            }
            let to_node = graph.node(to);
            if to_node.is_backbone() && to_node.contig != contig {
                continue;
            }
            visited[to] = true;
            placed += 1;

            let from_end = if is_own_backbone(graph, from) {
                let end = place_backbone(graph, from);
                next_pos = end + 1;
                Some(end)
            } else {
                None
            };

            if is_own_backbone(graph, to) {
                let end = place_backbone(graph, to);
                check_contiguous(graph, to, from_end);
                next_pos = end + 1;
            } else {
                let node = graph.node_mut(to);
                node.pos_start = Some(next_pos);
                node.pos_end = Some(next_pos);
            }

            queue.push_back(to);
        }
    }

    debug!("Placed {placed} nodes on {contig}");
}

/// Set a backbone node's coordinates from its stored offset; returns posEnd
fn place_backbone(graph: &mut PanGenomeGraph, i: usize) -> u64 {
    let node = graph.node_mut(i);
    let start = node.offset + 1;
    let end = (start + node.length).saturating_sub(1);
    node.pos_start = Some(start);
    node.pos_end = Some(end);
    end
}

fn check_contiguous(graph: &mut PanGenomeGraph, to: usize, from_end: Option<u64>) {
    let Some(from_end) = from_end else {
        return;
    };
    let node = graph.node(to);
    let stored = node.offset + 1;
    let propagated = from_end + 1;
    if stored != propagated {
        warn!(
            "Segment {}: stored start {stored} disagrees with propagated start {propagated}",
            node.id
        );
        let issue = LoadIssue::CoordinateMismatch {
            id: node.id.clone(),
            stored,
            propagated,
        };
        graph.record_issue(issue);
    }
}
