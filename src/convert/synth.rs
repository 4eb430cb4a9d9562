//! Per-chromosome node and edge synthesis.
//!
//! Given one chromosome's records this builds:
//!
//! - the **backbone**: one rank-0 segment per span between split points, so
//!   every variant anchor falls on a segment boundary, chained `+`/`+`;
//! - one rank-1 **variant segment** per distinct variant, shared by all of its
//!   carriers, linked from its start-anchor segment and into its end-anchor
//!   segment (`-` on the variant side when it is reverse oriented).
//!
//! Adjacent single-base SNPs of the same carrier group are chained directly so
//! a dense cluster does not bounce through the backbone between every base.
//!
//! Ids are [`Placeholder`]s scoped by chromosome and role; they become global
//! ids in [`crate::convert::remap`].

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::convert::classify::{classify, ClassifiedVariant};
use crate::convert::{ConversionWarning, ConvertConfig, VariantIssue};
use crate::core::segment::{join_carriers, Link, Segment, VariantDescriptor};
use crate::core::types::{Strand, VariantType};
use crate::parsing::fasta::ReferenceSource;
use crate::parsing::vcf::VariantRecord;

/// Id namespace within one chromosome
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Backbone,
    /// Carrier sample names joined with `~`
    Carriers(String),
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Backbone => write!(f, "backbone"),
            Self::Carriers(token) => write!(f, "{token}"),
        }
    }
}

/// Chromosome-local segment id: `chrom|role|counter`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Placeholder {
    pub chrom: String,
    pub role: Role,
    pub counter: u32,
}

impl std::fmt::Display for Placeholder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}|{}|{}", self.chrom, self.role, self.counter)
    }
}

/// Everything one worker produces for one chromosome
#[derive(Debug, Clone, Default)]
pub struct ChromosomeGraph {
    pub chrom: String,
    /// Backbone segments in coordinate order, then variants in VCF order
    pub segments: Vec<Segment<Placeholder>>,
    pub links: Vec<Link<Placeholder>>,
    /// Number of placeholders allocated per role
    pub id_counts: BTreeMap<Role, u32>,
    pub warnings: Vec<ConversionWarning>,
}

/// Backbone segment ids keyed by their first and last 1-based position
#[derive(Debug, Clone, Default)]
pub struct BackboneAnchorMap {
    positions: BTreeMap<u64, Placeholder>,
}

impl BackboneAnchorMap {
    pub fn record(&mut self, start: u64, end: u64, id: &Placeholder) {
        self.positions.insert(start, id.clone());
        self.positions.insert(end, id.clone());
    }

    pub fn get(&self, pos: u64) -> Option<&Placeholder> {
        self.positions.get(&pos)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

struct IdAllocator {
    chrom: String,
    counts: BTreeMap<Role, u32>,
}

impl IdAllocator {
    fn new(chrom: &str) -> Self {
        Self {
            chrom: chrom.to_string(),
            counts: BTreeMap::new(),
        }
    }

    fn next(&mut self, role: Role) -> Placeholder {
        let counter = self.counts.entry(role.clone()).or_insert(0);
        let id = Placeholder {
            chrom: self.chrom.clone(),
            role,
            counter: *counter,
        };
        *counter += 1;
        id
    }
}

/// Identical variants from different records collapse onto one key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct VariantKey {
    variant_type: VariantType,
    start_anchor: Option<u64>,
    end_anchor: Option<u64>,
    sequence: Option<String>,
    length: u64,
    reverse: bool,
    partner_chrom: String,
    partner_pos: u64,
}

impl VariantKey {
    fn new(v: &ClassifiedVariant) -> Self {
        Self {
            variant_type: v.variant_type,
            start_anchor: v.start_anchor,
            end_anchor: v.end_anchor,
            sequence: v.sequence.clone(),
            length: v.length,
            reverse: v.reverse,
            partner_chrom: v.partner_chrom.clone(),
            partner_pos: v.partner_pos,
        }
    }
}

struct VariantGroup {
    variant: ClassifiedVariant,
    variant_id: String,
    /// Sample column indices, so carriers come out in VCF order
    carriers: BTreeSet<usize>,
}

struct AttachedVariant {
    id: Placeholder,
    in_link: Option<Link<Placeholder>>,
    out_link: Option<Link<Placeholder>>,
}

/// Build the segments and links of one chromosome
pub fn synthesize<'a>(
    chrom: &str,
    chrom_len: u64,
    records: impl Iterator<Item = &'a VariantRecord>,
    samples: &[String],
    reference: &dyn ReferenceSource,
    config: &ConvertConfig,
) -> ChromosomeGraph {
    info!("Start to convert chromosome {chrom} ({chrom_len} bp) ...");

    let mut warnings = Vec::new();
    let groups = group_variants(chrom_len, records, reference, config, &mut warnings);

    let mut ids = IdAllocator::new(chrom);
    let mut segments = Vec::new();
    let mut links = Vec::new();

    let anchors = build_backbone(chrom, chrom_len, &groups, reference, config, &mut ids, &mut segments, &mut links);

    let mut attached = Vec::with_capacity(groups.len());
    for group in &groups {
        let carriers: Vec<String> = group
            .carriers
            .iter()
            .filter_map(|&i| samples.get(i).cloned())
            .collect();
        let token = join_carriers(&carriers);
        let id = ids.next(Role::Carriers(token.clone()));
        let v = &group.variant;

        let origin = v.start_anchor.and_then(|s| anchors.get(s)).cloned();
        let partner = v.end_anchor.and_then(|e| anchors.get(e)).cloned();
        let variant_strand = if v.reverse {
            Strand::Reverse
        } else {
            Strand::Forward
        };

        let in_link = origin
            .clone()
            .map(|from| Link::new(from, Strand::Forward, id.clone(), variant_strand));
        let out_link = partner
            .clone()
            .map(|to| Link::new(id.clone(), variant_strand, to, Strand::Forward));

        segments.push(Segment {
            id: id.clone(),
            sequence: v.sequence.clone(),
            length: v.length,
            rank: 1,
            sample: token,
            contig: chrom.to_string(),
            offset: v.offset,
            descriptor: Some(VariantDescriptor {
                variant_type: v.variant_type,
                origin_chrom: chrom.to_string(),
                origin_pos: v.origin_pos,
                partner_chrom: v.partner_chrom.clone(),
                partner_pos: v.partner_pos,
                variant_id: group.variant_id.clone(),
                carriers,
                origin_segment: origin.unwrap_or_else(|| id.clone()),
                partner_segment: partner.unwrap_or_else(|| id.clone()),
            }),
        });

        attached.push(AttachedVariant {
            id,
            in_link,
            out_link,
        });
    }

    chain_adjacent_snps(&groups, &mut attached);

    let mut seen = HashSet::new();
    links.retain(|l: &Link<Placeholder>| seen.insert((l.from.clone(), l.to.clone())));
    for variant in attached {
        for link in [variant.in_link, variant.out_link].into_iter().flatten() {
            if seen.insert((link.from.clone(), link.to.clone())) {
                links.push(link);
            }
        }
    }

    info!(
        "Finished chromosome {chrom}: {} segments, {} links",
        segments.len(),
        links.len()
    );

    ChromosomeGraph {
        chrom: chrom.to_string(),
        segments,
        links,
        id_counts: ids.counts,
        warnings,
    }
}

/// Classify records and merge identical variants, keeping first-seen order
fn group_variants<'a>(
    chrom_len: u64,
    records: impl Iterator<Item = &'a VariantRecord>,
    reference: &dyn ReferenceSource,
    config: &ConvertConfig,
    warnings: &mut Vec<ConversionWarning>,
) -> Vec<VariantGroup> {
    let mut groups: Vec<VariantGroup> = Vec::new();
    let mut index: HashMap<VariantKey, usize> = HashMap::new();

    for record in records {
        let carriers = record.carrier_indices();
        if carriers.is_empty() {
            continue;
        }

        let variant = match classify(record, chrom_len, reference, config.flank_length) {
            Ok(variant) => variant,
            Err(issue) => {
                warn!("Variant ignored: {issue}");
                warnings.push(issue.into());
                continue;
            }
        };

        if record.alternates.len() > 1 {
            let issue = VariantIssue::ExtraAlleles {
                chrom: record.chrom.clone(),
                pos: record.pos,
                id: record.id.clone(),
                alleles: record.alternates.len(),
            };
            warn!("Variant simplified: {issue}");
            warnings.push(ConversionWarning::Simplified(issue));
        }

        let key = VariantKey::new(&variant);
        if let Some(&i) = index.get(&key) {
            debug!("Merging {} into an identical variant", record.id);
            groups[i].carriers.extend(carriers);
        } else {
            index.insert(key, groups.len());
            groups.push(VariantGroup {
                variant,
                variant_id: record.id.clone(),
                carriers: carriers.into_iter().collect(),
            });
        }
    }

    groups
}

/// Positions where a new backbone segment must start
fn split_points(chrom_len: u64, groups: &[VariantGroup]) -> BTreeSet<u64> {
    let mut cuts = BTreeSet::new();
    for group in groups {
        if let Some(s) = group.variant.start_anchor {
            if s < chrom_len {
                cuts.insert(s + 1);
            }
        }
        if let Some(e) = group.variant.end_anchor {
            if e > 1 {
                cuts.insert(e);
            }
        }
    }
    cuts
}

#[allow(clippy::too_many_arguments)]
fn build_backbone(
    chrom: &str,
    chrom_len: u64,
    groups: &[VariantGroup],
    reference: &dyn ReferenceSource,
    config: &ConvertConfig,
    ids: &mut IdAllocator,
    segments: &mut Vec<Segment<Placeholder>>,
    links: &mut Vec<Link<Placeholder>>,
) -> BackboneAnchorMap {
    let mut anchors = BackboneAnchorMap::default();
    if chrom_len == 0 {
        return anchors;
    }

    let starts: Vec<u64> = std::iter::once(1)
        .chain(split_points(chrom_len, groups))
        .collect();

    let mut previous: Option<Placeholder> = None;
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).map_or(chrom_len, |next| next - 1);
        let id = ids.next(Role::Backbone);

        segments.push(Segment {
            id: id.clone(),
            sequence: reference.fetch(chrom, start, end + 1),
            length: end - start + 1,
            rank: 0,
            sample: config.backbone.clone(),
            contig: chrom.to_string(),
            offset: start - 1,
            descriptor: None,
        });
        anchors.record(start, end, &id);

        if let Some(prev) = previous.replace(id.clone()) {
            links.push(Link::forward(prev, id));
        }
    }

    anchors
}

/// Rewire runs of single-base SNPs of the same carrier group into chains
fn chain_adjacent_snps(groups: &[VariantGroup], attached: &mut [AttachedVariant]) {
    let is_single_snp = |g: &VariantGroup| {
        g.variant.variant_type == VariantType::Snp && g.variant.length == 1
    };

    let mut by_position: HashMap<(&Role, u64), usize> = HashMap::new();
    for (i, group) in groups.iter().enumerate() {
        if is_single_snp(group) {
            by_position
                .entry((&attached[i].id.role, group.variant.offset))
                .or_insert(i);
        }
    }

    let mut rewires = Vec::new();
    for (i, group) in groups.iter().enumerate() {
        if !is_single_snp(group) || group.variant.offset == 0 {
            continue;
        }
        if let Some(&prev) = by_position.get(&(&attached[i].id.role, group.variant.offset - 1)) {
            rewires.push((prev, i));
        }
    }

    for (prev, current) in rewires {
        let from = attached[prev].id.clone();
        let to = attached[current].id.clone();
        attached[prev].out_link = Some(Link::forward(from, to));
        attached[current].in_link = None;
    }
}
