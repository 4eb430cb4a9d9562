//! Structured node and edge records for a visualization layer.
//!
//! Nothing here produces markup; the output is plain serializable data.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::core::types::BACKBONE_SHAPE;
use crate::graph::loader::{Node, PanGenomeGraph};
use crate::graph::subgraph::{Subgraph, SubgraphSignals};

/// Color for nodes whose sample has no palette entry
pub const DEFAULT_COLOR: &str = "#A2A2A2";

pub const START_MARKER: &str = "start";
pub const END_MARKER: &str = "end";

const MARKER_SHAPE: &str = "star";
const MARKER_SIZE: f64 = 20.0;

const PALETTE: &[&str] = &[
    "#1F77B4", "#FF7F0E", "#2CA02C", "#D62728", "#9467BD", "#8C564B", "#E377C2", "#7F7F7F",
    "#BCBD22", "#17BECF", "#393B79", "#637939", "#8C6D31", "#843C39", "#7B4173", "#3182BD",
];

/// Sample name to display color, stable for a given set of samples
#[derive(Debug, Clone, Default)]
pub struct SamplePalette {
    colors: HashMap<String, String>,
}

impl SamplePalette {
    pub fn new<'a>(samples: impl IntoIterator<Item = &'a String>) -> Self {
        let sorted: BTreeSet<&String> = samples.into_iter().collect();
        let colors = sorted
            .into_iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), PALETTE[i % PALETTE.len()].to_string()))
            .collect();
        Self { colors }
    }

    /// Palette over every backbone and carrier sample in the graph
    pub fn from_graph(graph: &PanGenomeGraph) -> Self {
        let mut samples = BTreeSet::new();
        for node in graph.nodes() {
            if node.is_backbone() {
                samples.insert(node.sample.clone());
            } else {
                samples.extend(node.carriers());
            }
        }
        Self::new(samples.iter())
    }

    pub fn color(&self, sample: &str) -> &str {
        self.colors.get(sample).map_or(DEFAULT_COLOR, String::as_str)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderNode {
    pub id: String,
    pub label: String,
    pub color: String,
    /// Variant type, `BB` for backbone, `star` for markers
    pub shape: String,
    pub size: f64,
    pub title: String,
    pub sample: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderEdge {
    pub from: String,
    pub to: String,
    /// `<fromStrand>-><toStrand>`
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderData {
    pub nodes: Vec<RenderNode>,
    pub edges: Vec<RenderEdge>,
    pub signals: SubgraphSignals,
}

/// `log10(len) * 8 + 1`, one decimal; 1 for empty nodes
pub fn node_size(length: u64) -> f64 {
    if length == 0 {
        return 1.0;
    }
    (((length as f64).log10() * 8.0 + 1.0) * 10.0).round() / 10.0
}

/// Hover text for a node
pub fn node_title(node: &Node, backbone: Option<&str>, show_sequence: bool) -> String {
    let mut title = format!(
        "NodeId: {}; Resource: {}_{}; Len: {}",
        node.id, node.sample, node.contig, node.length
    );

    if node.is_backbone() && backbone.map_or(true, |b| b == node.sample) {
        let pos = node.pos_start.unwrap_or(node.offset + 1);
        let end = (pos + node.length).saturating_sub(1);
        title.push_str(&format!("; Pos: {pos} - {end}"));
    }

    if let Some(info) = &node.info {
        title.push_str(&format!("; Info: {}", info.raw));
    }

    if show_sequence {
        title.push_str(&format!("; Seq: {}", sequence_preview(node)));
    }

    title
}

fn sequence_preview(node: &Node) -> String {
    if node.head.is_empty() {
        return if node.length == 0 { String::new() } else { "*".to_string() };
    }
    if node.length > node.head.chars().count() as u64 {
        format!("{}...", node.head)
    } else {
        node.head.clone()
    }
}

/// Color key for a node: its sample, or its first carrier
fn color_key(node: &Node) -> String {
    if node.is_backbone() {
        return node.sample.clone();
    }
    node.carriers()
        .into_iter()
        .next()
        .unwrap_or_else(|| node.sample.clone())
}

/// Build render records for a selection, with start/end markers on the first
/// and last backbone segment.
pub fn build(graph: &PanGenomeGraph, subgraph: &Subgraph, palette: &SamplePalette) -> RenderData {
    let backbone = graph.backbone_name();

    let mut nodes: Vec<RenderNode> = subgraph
        .nodes
        .iter()
        .map(|&i| {
            let node = graph.node(i);
            RenderNode {
                id: node.id.clone(),
                label: node.id.clone(),
                color: palette.color(&color_key(node)).to_string(),
                shape: node
                    .variant_type()
                    .map_or_else(|| BACKBONE_SHAPE.to_string(), |t| t.to_string()),
                size: node_size(node.length),
                title: node_title(node, backbone, true),
                sample: node.sample.clone(),
            }
        })
        .collect();

    let mut edges: Vec<RenderEdge> = subgraph
        .edges
        .iter()
        .map(|&i| {
            let edge = graph.edges()[i];
            RenderEdge {
                from: graph.node(edge.from).id.clone(),
                to: graph.node(edge.to).id.clone(),
                title: format!("{}->{}", edge.from_strand, edge.to_strand),
            }
        })
        .collect();

    let backbone_nodes: Vec<&Node> = subgraph
        .nodes
        .iter()
        .map(|&i| graph.node(i))
        .filter(|n| n.is_backbone() && n.pos_start.is_some())
        .collect();

    let first = backbone_nodes.iter().min_by_key(|n| n.pos_start);
    let last = backbone_nodes.iter().max_by_key(|n| n.pos_end);

    if let Some(first) = first {
        nodes.push(marker(START_MARKER, "green"));
        edges.push(RenderEdge {
            from: START_MARKER.to_string(),
            to: first.id.clone(),
            title: String::new(),
        });
    }
    if let Some(last) = last {
        nodes.push(marker(END_MARKER, "red"));
        edges.push(RenderEdge {
            from: last.id.clone(),
            to: END_MARKER.to_string(),
            title: String::new(),
        });
    }

    RenderData {
        nodes,
        edges,
        signals: subgraph.signals,
    }
}

fn marker(id: &str, color: &str) -> RenderNode {
    RenderNode {
        id: id.to_string(),
        label: id.to_string(),
        color: color.to_string(),
        shape: MARKER_SHAPE.to_string(),
        size: MARKER_SIZE,
        title: id.to_string(),
        sample: String::new(),
    }
}
