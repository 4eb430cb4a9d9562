//! One-pass overview of an rGFA file without building the graph.

use std::collections::{BTreeMap, BTreeSet};
use std::io::BufRead;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::core::types::VariantType;
use crate::graph::loader::Node;
use crate::graph::{GraphConfig, GraphError, LoadIssue};
use crate::parsing::open_text;
use crate::parsing::rgfa::{parse_line, GfaLine};

/// A backbone sample and the contigs it covers, in file order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackboneInfo {
    pub name: String,
    pub contigs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphSummary {
    pub backbones: Vec<BackboneInfo>,
    /// Carrier samples, sorted
    pub samples: Vec<String>,
    pub segments: usize,
    pub backbone_segments: usize,
    pub links: usize,
    pub variant_types: BTreeMap<VariantType, usize>,
    pub backbone_length: u64,
    pub needs_normalization: bool,
    pub issues: Vec<LoadIssue>,
}

impl GraphSummary {
    /// # Errors
    ///
    /// Returns `GraphError::Io` if the file cannot be read.
    pub fn scan(path: &Path, config: &GraphConfig) -> Result<Self, GraphError> {
        info!("Parsing rGFA {} ...", path.display());
        Self::from_reader(open_text(path)?, config)
    }

    /// # Errors
    ///
    /// Returns `GraphError::Io` on read failure.
    pub fn from_reader<R: BufRead>(reader: R, config: &GraphConfig) -> Result<Self, GraphError> {
        let mut summary = GraphSummary::default();
        let mut samples = BTreeSet::new();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            match parse_line(&line) {
                Ok(GfaLine::Segment(segment)) => {
                    let node = Node::from_segment_line(segment, i + 1, config, false, &mut summary.issues);
                    summary.add_segment(&node, &mut samples);
                }
                Ok(GfaLine::Link(_)) => summary.links += 1,
                Ok(GfaLine::Other) => {}
                Err(e) => {
                    warn!("Invalid format at line {}: {e}", i + 1);
                    summary.issues.push(LoadIssue::FormatError {
                        line: i + 1,
                        message: e.to_string(),
                    });
                }
            }
        }

        summary.samples = samples.into_iter().collect();
        summary.needs_normalization = summary
            .issues
            .iter()
            .any(|issue| matches!(issue, LoadIssue::SchemaViolation { .. }));
        Ok(summary)
    }

    fn add_segment(&mut self, node: &Node, samples: &mut BTreeSet<String>) {
        self.segments += 1;

        if !node.is_backbone() {
            samples.extend(node.carriers());
            if let Some(t) = node.variant_type() {
                *self.variant_types.entry(t).or_insert(0) += 1;
            }
            return;
        }

        self.backbone_segments += 1;
        self.backbone_length += node.length;

        let backbone = match self.backbones.iter_mut().position(|b| b.name == node.sample) {
            Some(i) => &mut self.backbones[i],
            None => {
                self.backbones.push(BackboneInfo {
                    name: node.sample.clone(),
                    contigs: Vec::new(),
                });
                let last = self.backbones.len() - 1;
                &mut self.backbones[last]
            }
        };
        if !backbone.contigs.contains(&node.contig) {
            backbone.contigs.push(node.contig.clone());
        }
    }

    pub fn variant_segments(&self) -> usize {
        self.segments - self.backbone_segments
    }

    pub fn has_warnings(&self) -> bool {
        !self.issues.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GFA: &str = "\
H\tVN:Z:1.0
S\ts1\t*\tLN:i:49\tSN:Z:ref#chr1\tSO:i:0\tSR:i:0
S\ts2\t*\tLN:i:51\tSN:Z:ref#chr1\tSO:i:49\tSR:i:0
S\ts3\t*\tLN:i:30\tSN:Z:ref#chr2\tSO:i:0\tSR:i:0
S\ts4\tG\tLN:i:1\tSN:Z:S2~S1#chr1\tSO:i:48\tSR:i:1\tINF:Z:SV#SNP#chr1#49#chr1#49#v#S2~S1#s1#s2
S\ts5\t*\tLN:i:3\tSN:Z:S3#chr2\tSO:i:4\tSR:i:1\tINF:Z:SV#DEL#chr2#5#chr2#8#d#S3#s3#s3
L\ts1\t+\ts2\t+\t0M
L\ts1\t+\ts4\t+\t0M
";

    #[test]
    fn test_summary_counts() {
        let summary = GraphSummary::from_reader(GFA.as_bytes(), &GraphConfig::default()).unwrap();
        assert_eq!(summary.segments, 5);
        assert_eq!(summary.backbone_segments, 3);
        assert_eq!(summary.variant_segments(), 2);
        assert_eq!(summary.links, 2);
        assert_eq!(summary.backbone_length, 130);
        assert_eq!(
            summary.backbones,
            vec![BackboneInfo {
                name: "ref".to_string(),
                contigs: vec!["chr1".to_string(), "chr2".to_string()],
            }]
        );
        assert_eq!(summary.samples, vec!["S1", "S2", "S3"]);
        assert_eq!(summary.variant_types.get(&VariantType::Snp), Some(&1));
        assert_eq!(summary.variant_types.get(&VariantType::Del), Some(&1));
        assert!(!summary.needs_normalization);
        assert!(!summary.has_warnings());
    }

    #[test]
    fn test_summary_flags_normalization() {
        let text = "S\ts1\tACGT\tSN:Z:chr1\tSR:i:0\n";
        let summary = GraphSummary::from_reader(text.as_bytes(), &GraphConfig::default()).unwrap();
        assert!(summary.needs_normalization);
        assert_eq!(summary.backbones[0].contigs, vec!["chr1"]);
    }
}
