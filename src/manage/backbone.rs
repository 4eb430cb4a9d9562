//! Remove a backbone from an rGFA document.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::core::segment::VariantDescriptor;
use crate::manage::{is_backbone, sample_and_contig, RgfaDocument};

/// What [`remove_backbone`] dropped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Removal {
    pub backbone_segments: usize,
    pub variant_segments: usize,
    pub links: usize,
}

impl Removal {
    pub fn is_empty(&self) -> bool {
        self.backbone_segments == 0
    }
}

/// Drop the rank-0 segments named after `backbone`.
///
/// Variant segments whose descriptor anchors only on removed segments go with
/// them, as do all links touching a removed segment. Variants of other
/// backbones and segments without a descriptor are kept.
pub fn remove_backbone(document: &mut RgfaDocument, backbone: &str, delimiter: &str) -> Removal {
    let mut removed: HashSet<String> = document
        .segments
        .iter()
        .filter(|s| is_backbone(s) && sample_and_contig(s, delimiter).is_some_and(|(sample, _)| sample == backbone))
        .map(|s| s.id.clone())
        .collect();
    let backbone_segments = removed.len();

    if backbone_segments == 0 {
        warn!("Backbone {backbone} not found; nothing removed");
        return Removal::default();
    }

    let orphaned: Vec<String> = document
        .segments
        .iter()
        .filter(|s| !is_backbone(s))
        .filter(|s| {
            let Some(descriptor) = s
                .tags
                .info
                .as_deref()
                .and_then(|raw| VariantDescriptor::decode(raw, delimiter))
            else {
                return false;
            };
            let anchors: Vec<&String> = [&descriptor.origin_segment, &descriptor.partner_segment]
                .into_iter()
                .filter(|id| **id != s.id)
                .collect();
            !anchors.is_empty() && anchors.iter().all(|id| removed.contains(*id))
        })
        .map(|s| s.id.clone())
        .collect();
    let variant_segments = orphaned.len();
    removed.extend(orphaned);

    document.segments.retain(|s| !removed.contains(&s.id));
    let links_before = document.links.len();
    document
        .links
        .retain(|l| !removed.contains(&l.from) && !removed.contains(&l.to));
    let links = links_before - document.links.len();

    info!(
        "Removed backbone {backbone}: {backbone_segments} backbone segments, {variant_segments} variants, {links} links"
    );
    Removal {
        backbone_segments,
        variant_segments,
        links,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_BACKBONES: &str = "\
S\ts1\tACGT\tLN:i:4\tSN:Z:ref#chr1\tSO:i:0\tSR:i:0
S\ts2\tACGT\tLN:i:4\tSN:Z:ref#chr1\tSO:i:4\tSR:i:0
S\ts3\tG\tLN:i:1\tSN:Z:S1#chr1\tSO:i:4\tSR:i:1\tINF:Z:SV#INS#chr1#4#chr1#5#i1#S1#s1#s2
S\ts4\tTTTT\tLN:i:4\tSN:Z:alt#chr1\tSO:i:0\tSR:i:0
S\ts5\tC\tLN:i:1\tSN:Z:S2#chr1\tSO:i:2\tSR:i:1\tINF:Z:SV#SNP#chr1#3#chr1#4#v1#S2#s4#s4
L\ts1\t+\ts2\t+\t0M
L\ts1\t+\ts3\t+\t0M
L\ts3\t+\ts2\t+\t0M
L\ts4\t+\ts5\t+\t0M
";

    fn document() -> RgfaDocument {
        RgfaDocument::from_reader(TWO_BACKBONES.as_bytes()).unwrap()
    }

    #[test]
    fn test_remove_backbone_and_its_variants() {
        let mut doc = document();
        let removal = remove_backbone(&mut doc, "ref", "#");
        assert_eq!(
            removal,
            Removal {
                backbone_segments: 2,
                variant_segments: 1,
                links: 3,
            }
        );

        let ids: Vec<&str> = doc.segments.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["s4", "s5"]);
        assert_eq!(doc.links.len(), 1);
    }

    #[test]
    fn test_unknown_backbone_is_a_no_op() {
        let mut doc = document();
        let removal = remove_backbone(&mut doc, "missing", "#");
        assert!(removal.is_empty());
        assert_eq!(doc, document());
    }

    #[test]
    fn test_name_must_match_exactly() {
        let mut doc = document();
        assert!(remove_backbone(&mut doc, "re", "#").is_empty());
        assert_eq!(doc.segments.len(), 5);
    }
}
