//! Streaming rGFA loader with link canonicalization.
//!
//! Links are normalized so traversal always follows the backbone's forward
//! direction:
//!
//! | Link as written | Stored as |
//! |-----------------|-----------|
//! | `a - b -` | `b + a +` |
//! | `B - x +` (B backbone, x not) | `x - B +` |
//! | `x + B -` (B backbone, x not) | `B + x -` |
//! | anything else | unchanged |
//!
//! After that, a `-` endpoint on a non-backbone segment is redirected to a
//! mirror node `<id>*` carrying the reverse-complemented sequence. Mirrors only
//! exist in memory.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::io::BufRead;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::segment::{split_carriers, Link, VariantDescriptor};
use crate::core::types::{reverse_complement, Strand, VariantType};
use crate::graph::{GraphConfig, GraphError, LoadIssue};
use crate::parsing::open_text;
use crate::parsing::rgfa::{parse_line, GfaLine, SegmentLine};

/// Appended to a segment id to name its reverse-strand view
pub const MIRROR_SUFFIX: char = '*';

/// Parsed `INF` tag of a variant segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeInfo {
    pub raw: String,
    pub variant_type: Option<VariantType>,
    /// Present when `raw` is a complete descriptor
    pub descriptor: Option<VariantDescriptor<String>>,
}

impl NodeInfo {
    pub fn parse(raw: &str, delimiter: &str) -> Self {
        let descriptor = VariantDescriptor::decode(raw, delimiter);
        let variant_type = match &descriptor {
            Some(d) => Some(d.variant_type),
            None => {
                // Older files carry only `type<D>...` or `SV<D>type<D>...`
                let mut fields = raw.split(delimiter);
                match fields.next() {
                    Some("SV") => fields.next().and_then(VariantType::parse),
                    Some(first) => VariantType::parse(first),
                    None => None,
                }
            }
        };

        Self {
            raw: raw.to_string(),
            variant_type,
            descriptor,
        }
    }
}

/// One loaded segment, or the mirror of one
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub id: String,
    /// First bases of the sequence, empty when withheld
    pub head: String,
    /// Last bases of the sequence, empty when withheld
    pub tail: String,
    /// Full sequence, only kept on request
    pub sequence: Option<String>,
    pub length: u64,
    pub rank: u32,
    pub sample: String,
    pub contig: String,
    pub offset: u64,
    pub info: Option<NodeInfo>,
    /// Forward segment id when this node is a mirror
    pub mirror_of: Option<String>,
    pub pos_start: Option<u64>,
    pub pos_end: Option<u64>,
}

impl Node {
    /// Build a node from a parsed segment line.
    ///
    /// An `SN` value without the delimiter is recorded as a schema violation;
    /// the node is still returned with the whole value as sample and contig.
    pub fn from_segment_line(
        segment: SegmentLine,
        line: usize,
        config: &GraphConfig,
        keep_sequence: bool,
        issues: &mut Vec<LoadIssue>,
    ) -> Self {
        let length = segment.length();
        let rank = segment.tags.rank.unwrap_or(0);
        let sample_name = segment.tags.sample_name.unwrap_or_default();

        let (sample, contig) = match sample_name.split_once(config.delimiter.as_str()) {
            Some((sample, contig)) => (sample.to_string(), contig.to_string()),
            None => {
                issues.push(LoadIssue::SchemaViolation {
                    line,
                    id: segment.id.clone(),
                    value: sample_name.clone(),
                    delimiter: config.delimiter.clone(),
                });
                (sample_name.clone(), sample_name.clone())
            }
        };

        let (head, tail) = match &segment.sequence {
            Some(seq) => previews(seq, config.preview_length),
            None => (String::new(), String::new()),
        };

        Self {
            id: segment.id,
            head,
            tail,
            sequence: segment.sequence.filter(|_| keep_sequence),
            length,
            rank,
            sample,
            contig,
            offset: segment.tags.offset.unwrap_or(0),
            info: segment
                .tags
                .info
                .map(|raw| NodeInfo::parse(&raw, &config.delimiter)),
            mirror_of: None,
            pos_start: None,
            pos_end: None,
        }
    }

    pub fn is_backbone(&self) -> bool {
        self.rank == 0
    }

    pub fn is_mirror(&self) -> bool {
        self.mirror_of.is_some()
    }

    pub fn variant_type(&self) -> Option<VariantType> {
        self.info.as_ref().and_then(|i| i.variant_type)
    }

    /// Samples carrying this node: the descriptor's list, else the SN sample
    /// split on `~`
    pub fn carriers(&self) -> Vec<String> {
        match self.info.as_ref().and_then(|i| i.descriptor.as_ref()) {
            Some(descriptor) => descriptor.carriers.clone(),
            None => split_carriers(&self.sample),
        }
    }

    /// Reverse-strand view of this node
    pub fn mirror(&self) -> Self {
        Self {
            id: mirror_id(&self.id),
            head: reverse_complement(&self.tail),
            tail: reverse_complement(&self.head),
            sequence: self.sequence.as_deref().map(reverse_complement),
            mirror_of: Some(self.id.clone()),
            pos_start: None,
            pos_end: None,
            ..self.clone()
        }
    }
}

pub fn mirror_id(id: &str) -> String {
    format!("{id}{MIRROR_SUFFIX}")
}

fn previews(seq: &str, n: usize) -> (String, String) {
    let head: String = seq.chars().take(n).collect();
    let mut tail: Vec<char> = seq.chars().rev().take(n).collect();
    tail.reverse();
    (head, tail.into_iter().collect())
}

/// A canonical edge between two arena positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    /// Strands after canonicalization, kept for display
    pub from_strand: Strand,
    pub to_strand: Strand,
}

/// Normalize a link's orientation; applying it twice is a no-op
pub fn canonicalize<Id>(link: Link<Id>, is_backbone: impl Fn(&Id) -> bool) -> Link<Id> {
    let from_backbone = is_backbone(&link.from);
    let to_backbone = is_backbone(&link.to);

    match (link.from_strand, link.to_strand) {
        (Strand::Reverse, Strand::Reverse) => link.reversed(),
        (Strand::Reverse, Strand::Forward) if from_backbone && !to_backbone => link.reversed(),
        (Strand::Forward, Strand::Reverse) if to_backbone && !from_backbone => link.reversed(),
        _ => link,
    }
}

/// Which segments to load
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Only these segment ids
    pub node_ids: Option<HashSet<String>>,
    /// Only segments of this contig, restricted to the component of its first
    /// backbone segment
    pub contig: Option<String>,
    /// 0-based half-open window tested against `[SO, SO+LN)`
    pub start: Option<u64>,
    pub end: Option<u64>,
    /// Backbone segments of other samples are dropped
    pub backbone: Option<String>,
    /// Variant segments pass if any carrier is listed
    pub samples: Option<Vec<String>>,
    pub keep_sequences: bool,
}

impl LoadOptions {
    pub fn accepts(&self, node: &Node) -> bool {
        if let Some(ids) = &self.node_ids {
            if !ids.contains(&node.id) {
                return false;
            }
        }

        if node.is_backbone() {
            if let Some(backbone) = &self.backbone {
                if &node.sample != backbone {
                    return false;
                }
            }
        } else if let Some(samples) = &self.samples {
            if !node.carriers().iter().any(|c| samples.contains(c)) {
                return false;
            }
        }

        if let Some(contig) = &self.contig {
            if &node.contig != contig {
                return false;
            }
        }

        let last = node.offset + node.length.max(1);
        if self.start.is_some_and(|start| last <= start) {
            return false;
        }
        if self.end.is_some_and(|end| node.offset >= end) {
            return false;
        }

        true
    }
}

/// Arena of nodes and canonical edges with lookup indexes
#[derive(Debug, Clone, Default)]
pub struct PanGenomeGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,

    /// Index: node id -> arena position
    index: HashMap<String, usize>,

    /// Index: (from, to) -> edge position
    edge_index: HashMap<(usize, usize), usize>,

    successors: Vec<Vec<usize>>,
    predecessors: Vec<Vec<usize>>,

    /// Index: contig -> its lowest-offset backbone node
    first_backbone: BTreeMap<String, usize>,

    backbone_name: Option<String>,
    issues: Vec<LoadIssue>,
}

impl PanGenomeGraph {
    /// Load an rGFA file (plain or gzip compressed)
    ///
    /// # Errors
    ///
    /// Returns `GraphError::Io` if the file cannot be read. Malformed lines
    /// are recorded as issues instead.
    pub fn load(path: &Path, options: &LoadOptions, config: &GraphConfig) -> Result<Self, GraphError> {
        info!("Loading rGFA {} ...", path.display());
        Self::from_reader(open_text(path)?, options, config)
    }

    /// Load rGFA text from any buffered reader
    ///
    /// # Errors
    ///
    /// Returns `GraphError::Io` on read failure.
    pub fn from_reader<R: BufRead>(
        reader: R,
        options: &LoadOptions,
        config: &GraphConfig,
    ) -> Result<Self, GraphError> {
        let mut nodes = Vec::new();
        let mut links = Vec::new();
        let mut issues = Vec::new();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            match parse_line(&line) {
                Ok(GfaLine::Segment(segment)) => {
                    let node =
                        Node::from_segment_line(segment, i + 1, config, options.keep_sequences, &mut issues);
                    if options.accepts(&node) {
                        nodes.push(node);
                    }
                }
                Ok(GfaLine::Link(link)) => links.push(link),
                Ok(GfaLine::Other) => {}
                Err(e) => {
                    warn!("Invalid format at line {}: {e}", i + 1);
                    issues.push(LoadIssue::FormatError {
                        line: i + 1,
                        message: e.to_string(),
                    });
                }
            }
        }

        if issues
            .iter()
            .any(|issue| matches!(issue, LoadIssue::SchemaViolation { .. }))
        {
            warn!("Not the expected rGFA format; the file needs to be normalized");
        }

        let backbone_name = options.backbone.clone().or_else(|| {
            nodes
                .iter()
                .find(|n| n.is_backbone())
                .map(|n| n.sample.clone())
        });

        let mut graph = Self::assemble(nodes, links, backbone_name, issues);

        if let Some(contig) = &options.contig {
            graph = graph.restrict_to_contig(contig);
        }

        info!(
            "Loaded graph: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }

    /// Canonicalize links, add mirrors and index everything
    fn assemble(
        mut nodes: Vec<Node>,
        links: Vec<Link<String>>,
        backbone_name: Option<String>,
        issues: Vec<LoadIssue>,
    ) -> Self {
        let mut index: HashMap<String, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();

        let mut edges = Vec::new();
        let mut seen = HashSet::new();
        let mut skipped = 0usize;

        for link in links {
            if !index.contains_key(&link.from) || !index.contains_key(&link.to) {
                skipped += 1;
                continue;
            }
            let link = canonicalize(link, |id: &String| {
                index.get(id).is_some_and(|&i| nodes[i].is_backbone())
            });

            let from = endpoint(&mut nodes, &mut index, &link.from, link.from_strand);
            let to = endpoint(&mut nodes, &mut index, &link.to, link.to_strand);
            let (Some(from), Some(to)) = (from, to) else {
                continue;
            };

            if seen.insert((from, to)) {
                edges.push(Edge {
                    from,
                    to,
                    from_strand: link.from_strand,
                    to_strand: link.to_strand,
                });
            }
        }

        if skipped > 0 {
            debug!("Skipped {skipped} links to segments that were not loaded");
        }

        Self::from_arena(nodes, edges, backbone_name, issues)
    }

    fn from_arena(
        nodes: Vec<Node>,
        edges: Vec<Edge>,
        backbone_name: Option<String>,
        issues: Vec<LoadIssue>,
    ) -> Self {
        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();

        let mut successors = vec![Vec::new(); nodes.len()];
        let mut predecessors = vec![Vec::new(); nodes.len()];
        let mut edge_index = HashMap::new();
        for (i, edge) in edges.iter().enumerate() {
            successors[edge.from].push(edge.to);
            predecessors[edge.to].push(edge.from);
            edge_index.insert((edge.from, edge.to), i);
        }

        let mut first_backbone: BTreeMap<String, usize> = BTreeMap::new();
        for (i, node) in nodes.iter().enumerate() {
            if !node.is_backbone() || node.is_mirror() {
                continue;
            }
            let current = first_backbone.entry(node.contig.clone()).or_insert(i);
            if node.offset < nodes[*current].offset {
                *current = i;
            }
        }

        Self {
            nodes,
            edges,
            index,
            edge_index,
            successors,
            predecessors,
            first_backbone,
            backbone_name,
            issues,
        }
    }

    /// Keep only the undirected component of the contig's first backbone node
    fn restrict_to_contig(mut self, contig: &str) -> Self {
        let Some(&start) = self.first_backbone.get(contig) else {
            warn!("Contig {contig} not found in GFA. Contig ignored");
            let mut issues = std::mem::take(&mut self.issues);
            issues.push(LoadIssue::ContigNotFound {
                contig: contig.to_string(),
            });
            return Self::from_arena(Vec::new(), Vec::new(), self.backbone_name, issues);
        };

        let keep = self.component(start);
        self.induced(&keep)
    }

    /// A new graph over the given positions and the edges between them
    pub fn induced(&self, keep: &[usize]) -> Self {
        let mut keep = keep.to_vec();
        keep.sort_unstable();
        keep.dedup();

        let remap: HashMap<usize, usize> = keep
            .iter()
            .enumerate()
            .map(|(new, &old)| (old, new))
            .collect();

        let nodes = keep.iter().map(|&i| self.nodes[i].clone()).collect();
        let edges = self
            .edges
            .iter()
            .filter_map(|e| {
                Some(Edge {
                    from: *remap.get(&e.from)?,
                    to: *remap.get(&e.to)?,
                    ..*e
                })
            })
            .collect();

        Self::from_arena(nodes, edges, self.backbone_name.clone(), self.issues.clone())
    }

    /// Positions reachable from `start` ignoring edge direction, in BFS order
    pub fn component(&self, start: usize) -> Vec<usize> {
        let mut visited = vec![false; self.nodes.len()];
        let mut order = Vec::new();
        let mut queue = VecDeque::from([start]);
        visited[start] = true;

        while let Some(i) = queue.pop_front() {
            order.push(i);
            for &next in self.neighbors(i) {
                if !visited[next] {
                    visited[next] = true;
                    queue.push_back(next);
                }
            }
        }
        order
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, i: usize) -> &Node {
        &self.nodes[i]
    }

    pub(crate) fn node_mut(&mut self, i: usize) -> &mut Node {
        &mut self.nodes[i]
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge_between(&self, from: usize, to: usize) -> Option<&Edge> {
        self.edge_index.get(&(from, to)).map(|&i| &self.edges[i])
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.position(id).map(|i| &self.nodes[i])
    }

    pub fn successors(&self, i: usize) -> &[usize] {
        &self.successors[i]
    }

    pub fn predecessors(&self, i: usize) -> &[usize] {
        &self.predecessors[i]
    }

    /// Successors then predecessors
    pub fn neighbors(&self, i: usize) -> impl Iterator<Item = &usize> {
        self.successors[i].iter().chain(self.predecessors[i].iter())
    }

    pub fn first_backbone(&self, contig: &str) -> Option<usize> {
        self.first_backbone.get(contig).copied()
    }

    /// Contigs with at least one backbone node, sorted
    pub fn contigs(&self) -> impl Iterator<Item = &String> {
        self.first_backbone.keys()
    }

    pub fn backbone_name(&self) -> Option<&str> {
        self.backbone_name.as_deref()
    }

    pub fn issues(&self) -> &[LoadIssue] {
        &self.issues
    }

    pub(crate) fn record_issue(&mut self, issue: LoadIssue) {
        self.issues.push(issue);
    }

    pub fn has_warnings(&self) -> bool {
        !self.issues.is_empty()
    }

    /// Whether any `SN` tag lacked the delimiter
    pub fn needs_normalization(&self) -> bool {
        self.issues
            .iter()
            .any(|issue| matches!(issue, LoadIssue::SchemaViolation { .. }))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Arena position for one canonical endpoint, creating the mirror if needed
fn endpoint(
    nodes: &mut Vec<Node>,
    index: &mut HashMap<String, usize>,
    id: &str,
    strand: Strand,
) -> Option<usize> {
    let i = *index.get(id)?;
    if !strand.is_reverse() || nodes[i].is_backbone() {
        return Some(i);
    }

    let mirror = mirror_id(id);
    if let Some(&m) = index.get(&mirror) {
        return Some(m);
    }
    let node = nodes[i].mirror();
    nodes.push(node);
    index.insert(mirror, nodes.len() - 1);
    Some(nodes.len() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GFA: &str = "\
S\ts1\tAAAAAAAAAAAAAAAAAAAA\tLN:i:20\tSN:Z:ref#chr1\tSO:i:0\tSR:i:0
S\ts2\tCCCCCCCCCC\tLN:i:10\tSN:Z:ref#chr1\tSO:i:20\tSR:i:0
S\ts3\tGGGGG\tLN:i:5\tSN:Z:ref#chr1\tSO:i:30\tSR:i:0
S\ts4\tACGTT\tLN:i:5\tSN:Z:S1#chr1\tSO:i:19\tSR:i:1\tINF:Z:SV#INV#chr1#20#chr1#25#inv1#S1#s1#s3
S\ts5\tTTTT\tLN:i:4\tSN:Z:ref#chr2\tSO:i:0\tSR:i:0
L\ts1\t+\ts2\t+\t0M
L\ts2\t+\ts3\t+\t0M
L\ts1\t+\ts4\t-\t0M
L\ts4\t-\ts3\t+\t0M
";

    fn load(text: &str, options: &LoadOptions) -> PanGenomeGraph {
        PanGenomeGraph::from_reader(text.as_bytes(), options, &GraphConfig::default()).unwrap()
    }

    fn has_edge(graph: &PanGenomeGraph, from: &str, to: &str) -> bool {
        match (graph.position(from), graph.position(to)) {
            (Some(f), Some(t)) => graph.edge_between(f, t).is_some(),
            _ => false,
        }
    }

    #[test]
    fn test_load_nodes_and_tags() {
        let graph = load(GFA, &LoadOptions::default());
        assert_eq!(graph.backbone_name(), Some("ref"));
        assert!(!graph.needs_normalization());

        let s2 = graph.get("s2").unwrap();
        assert_eq!(s2.length, 10);
        assert_eq!(s2.contig, "chr1");
        assert_eq!(s2.offset, 20);
        assert!(s2.is_backbone());
        assert_eq!(s2.sequence, None);

        let s4 = graph.get("s4").unwrap();
        assert_eq!(s4.variant_type(), Some(VariantType::Inv));
        assert_eq!(s4.carriers(), vec!["S1"]);
        assert_eq!(graph.contigs().cloned().collect::<Vec<_>>(), vec!["chr1", "chr2"]);
        assert_eq!(graph.first_backbone("chr1"), graph.position("s1"));
    }

    #[test]
    fn test_reverse_variant_gets_mirror() {
        let graph = load(GFA, &LoadOptions::default());
        let mirror = graph.get("s4*").unwrap();
        assert_eq!(mirror.mirror_of.as_deref(), Some("s4"));
        assert_eq!(mirror.head, "AACGT");
        assert!(has_edge(&graph, "s1", "s4*"));
        assert!(has_edge(&graph, "s4*", "s3"));
        assert!(!has_edge(&graph, "s1", "s4"));
        // one mirror shared by both links
        assert_eq!(graph.node_count(), 6);
    }

    #[test]
    fn test_previews() {
        let text = "S\tx\tAAAAACCCCCGGGGGTTTTT\tSN:Z:ref#chr1\tSO:i:0\tSR:i:0\n";
        let graph = load(text, &LoadOptions::default());
        let node = graph.get("x").unwrap();
        assert_eq!(node.head, "AAAAACCCCC");
        assert_eq!(node.tail, "GGGGGTTTTT");
        assert_eq!(node.length, 20);
        let mirror = node.mirror();
        assert_eq!(mirror.head, "AAAAACCCCC");
        assert_eq!(mirror.tail, "GGGGGTTTTT");
    }

    #[test]
    fn test_canonicalize_rules() {
        let bb = |id: &&str| id.starts_with('b');
        let link = |f, fs, t, ts| Link::new(f, fs, t, ts);
        use Strand::{Forward as F, Reverse as R};

        assert_eq!(canonicalize(link("x", R, "y", R), bb), link("y", F, "x", F));
        assert_eq!(canonicalize(link("b1", R, "x", F), bb), link("x", R, "b1", F));
        assert_eq!(canonicalize(link("x", F, "b1", R), bb), link("b1", F, "x", R));
        assert_eq!(canonicalize(link("b1", F, "x", R), bb), link("b1", F, "x", R));
        assert_eq!(canonicalize(link("b1", R, "b2", F), bb), link("b1", R, "b2", F));
    }

    #[test]
    fn test_canonicalize_idempotent() {
        use Strand::{Forward as F, Reverse as R};
        let bb = |id: &&str| id.starts_with('b');
        for from in ["b1", "x"] {
            for to in ["b2", "y"] {
                for fs in [F, R] {
                    for ts in [F, R] {
                        let once = canonicalize(Link::new(from, fs, to, ts), bb);
                        let twice = canonicalize(once.clone(), bb);
                        assert_eq!(once, twice);
                    }
                }
            }
        }
    }

    #[test]
    fn test_links_to_missing_nodes_skipped() {
        let options = LoadOptions {
            node_ids: Some(["s1", "s2"].iter().map(|s| s.to_string()).collect()),
            ..LoadOptions::default()
        };
        let graph = load(GFA, &options);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_contig_filter_restricts_component() {
        let options = LoadOptions {
            contig: Some("chr2".to_string()),
            ..LoadOptions::default()
        };
        let graph = load(GFA, &options);
        assert_eq!(graph.node_count(), 1);
        assert!(graph.get("s5").is_some());
    }

    #[test]
    fn test_missing_contig_reported() {
        let options = LoadOptions {
            contig: Some("chrZ".to_string()),
            ..LoadOptions::default()
        };
        let graph = load(GFA, &options);
        assert!(graph.is_empty());
        assert_eq!(
            graph.issues(),
            &[LoadIssue::ContigNotFound {
                contig: "chrZ".to_string()
            }]
        );
    }

    #[test]
    fn test_sample_and_range_filters() {
        let options = LoadOptions {
            samples: Some(vec!["S9".to_string()]),
            start: Some(20),
            end: Some(30),
            ..LoadOptions::default()
        };
        let graph = load(GFA, &options);
        let ids: Vec<&str> = graph.nodes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["s2"]);
    }

    #[test]
    fn test_schema_violation_flags_normalization() {
        let text = "S\tx\tACGT\tSN:Z:chr1\tSO:i:0\tSR:i:0\n";
        let graph = load(text, &LoadOptions::default());
        assert!(graph.needs_normalization());
        let node = graph.get("x").unwrap();
        assert_eq!(node.sample, "chr1");
        assert_eq!(node.contig, "chr1");
    }

    #[test]
    fn test_format_errors_do_not_abort() {
        let text = "S\tx\n\
                    S\ty\tACGT\tLN:i:4\tSN:Z:ref#chr1\tSO:i:0\tSR:i:0\n\
                    L\ty\t?\ty\t+\t0M\n";
        let graph = load(text, &LoadOptions::default());
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.issues().len(), 2);
        assert!(matches!(graph.issues()[0], LoadIssue::FormatError { line: 1, .. }));
    }

    #[test]
    fn test_keep_sequences() {
        let options = LoadOptions {
            keep_sequences: true,
            ..LoadOptions::default()
        };
        let graph = load(GFA, &options);
        assert_eq!(graph.get("s3").unwrap().sequence.as_deref(), Some("GGGGG"));
        assert_eq!(graph.get("s4*").unwrap().sequence.as_deref(), Some("AACGT"));
    }

    #[test]
    fn test_legacy_info_type() {
        assert_eq!(NodeInfo::parse("DEL#20#30", "#").variant_type, Some(VariantType::Del));
        assert_eq!(NodeInfo::parse("SV#INS#chr1", "#").variant_type, Some(VariantType::Ins));
        assert_eq!(NodeInfo::parse("other", "#").variant_type, None);
    }
}
