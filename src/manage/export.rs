//! Export variant segments as VCF records.
//!
//! Each segment with a complete `INF` descriptor becomes one record:
//!
//! | Column | Value |
//! |--------|-------|
//! | CHROM, POS | origin chromosome and position |
//! | ID | variant id |
//! | REF | backbone bases for SNP, else `N` |
//! | ALT | literal sequence for INS and SNP when stored, else `<TYPE>` |
//! | INFO | `SVTYPE`, `SVLEN`, `END` (partner position) |
//! | samples | `0/1` for carriers, `0/0` for everyone else |
//!
//! The written file is readable by [`crate::parsing::vcf::VcfSource`], so an
//! exported subset can be converted again.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::Write;

use serde::Serialize;
use tracing::{debug, info};

use crate::core::segment::VariantDescriptor;
use crate::core::types::VariantType;
use crate::manage::{is_backbone, sample_and_contig, RgfaDocument};
use crate::parsing::bed::RegionSet;

/// Limits applied while collecting variants
#[derive(Debug, Clone, Default)]
pub struct ExportFilter<'a> {
    /// Keep variants anchored on this backbone
    pub backbone: Option<&'a str>,
    /// Keep variants overlapping these regions
    pub regions: Option<&'a RegionSet>,
}

/// One exported VCF record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantRow {
    pub chrom: String,
    pub pos: u64,
    pub id: String,
    pub reference: String,
    pub alt: String,
    pub variant_type: VariantType,
    pub length: u64,
    pub end: u64,
    pub carriers: Vec<String>,
}

impl VariantRow {
    /// Last 1-based position the variant touches on its own chromosome
    fn last_position(&self, partner_chrom: &str) -> u64 {
        if partner_chrom == self.chrom {
            self.end.saturating_sub(1).max(self.pos)
        } else {
            self.pos
        }
    }
}

/// Backbone sequence spans by `(backbone, contig)`, for REF bases
#[derive(Default)]
struct BackboneBases<'a> {
    spans: HashMap<(&'a str, &'a str), Vec<(u64, &'a [u8])>>,
}

impl<'a> BackboneBases<'a> {
    fn insert(&mut self, backbone: &'a str, contig: &'a str, offset: u64, sequence: &'a str) {
        self.spans
            .entry((backbone, contig))
            .or_default()
            .push((offset, sequence.as_bytes()));
    }

    /// Bases `[pos, pos + len)` (1-based), `N` where the backbone has none
    fn fetch(&self, backbone: Option<&str>, contig: &str, pos: u64, len: u64) -> String {
        let spans = backbone.and_then(|b| self.spans.get(&(b, contig)));
        (pos..pos.saturating_add(len))
            .map(|p| {
                spans
                    .and_then(|spans| {
                        spans.iter().find_map(|&(offset, seq)| {
                            let i = p.checked_sub(offset + 1)?;
                            seq.get(usize::try_from(i).ok()?).copied()
                        })
                    })
                    .map_or('N', |b| char::from(b.to_ascii_uppercase()))
            })
            .collect()
    }
}

/// Records ready to write, plus the header material
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VariantExport {
    /// Every carrier in the document, sorted; one genotype column each
    pub samples: Vec<String>,
    /// Contig lengths from the backbone segments
    pub contigs: Vec<(String, u64)>,
    pub rows: Vec<VariantRow>,
}

/// Collect variant records in chromosome order (as first seen), then by
/// position.
pub fn collect_variants(document: &RgfaDocument, filter: &ExportFilter<'_>, delimiter: &str) -> VariantExport {
    let mut chrom_order: Vec<String> = Vec::new();
    let mut contig_ends: BTreeMap<String, u64> = BTreeMap::new();
    let mut backbone_of: HashMap<&str, &str> = HashMap::new();
    let mut bases = BackboneBases::default();

    for segment in document.segments.iter().filter(|s| is_backbone(s)) {
        let Some((sample, contig)) = sample_and_contig(segment, delimiter) else {
            continue;
        };
        backbone_of.insert(segment.id.as_str(), sample);
        if let Some(sequence) = &segment.sequence {
            bases.insert(sample, contig, segment.tags.offset.unwrap_or(0), sequence);
        }
        if filter.backbone.map_or(true, |b| b == sample) {
            let end = segment.tags.offset.unwrap_or(0) + segment.length();
            let slot = contig_ends.entry(contig.to_string()).or_default();
            *slot = (*slot).max(end);
        }
    }

    let mut samples: BTreeSet<String> = BTreeSet::new();
    let mut rows: Vec<(usize, VariantRow)> = Vec::new();

    for segment in &document.segments {
        let Some(descriptor) = segment
            .tags
            .info
            .as_deref()
            .and_then(|raw| VariantDescriptor::decode(raw, delimiter))
        else {
            continue;
        };
        samples.extend(descriptor.carriers.iter().cloned());

        let anchor_backbone = [&descriptor.origin_segment, &descriptor.partner_segment]
            .into_iter()
            .find_map(|id| backbone_of.get(id.as_str()).copied());
        if let Some(backbone) = filter.backbone {
            let anchored = [&descriptor.origin_segment, &descriptor.partner_segment]
                .into_iter()
                .any(|id| backbone_of.get(id.as_str()) == Some(&backbone));
            if !anchored {
                continue;
            }
        }

        let literal = matches!(descriptor.variant_type, VariantType::Ins | VariantType::Snp);
        let alt = match &segment.sequence {
            Some(seq) if literal && !seq.is_empty() => seq.clone(),
            _ => format!("<{}>", descriptor.variant_type),
        };
        let length = if descriptor.variant_type == VariantType::Ins {
            segment.length()
        } else {
            descriptor.partner_pos.saturating_sub(descriptor.origin_pos)
        };

        let reference = if descriptor.variant_type == VariantType::Snp {
            let backbone = filter.backbone.or(anchor_backbone);
            bases.fetch(backbone, &descriptor.origin_chrom, descriptor.origin_pos, length.max(1))
        } else {
            "N".to_string()
        };

        let row = VariantRow {
            chrom: descriptor.origin_chrom.clone(),
            pos: descriptor.origin_pos,
            id: if descriptor.variant_id.is_empty() {
                ".".to_string()
            } else {
                descriptor.variant_id.clone()
            },
            reference,
            alt,
            variant_type: descriptor.variant_type,
            length,
            end: descriptor.partner_pos,
            carriers: descriptor.carriers.clone(),
        };

        if let Some(regions) = filter.regions {
            let last = row.last_position(&descriptor.partner_chrom);
            if !regions.overlaps(&row.chrom, row.pos, last) {
                debug!("Variant {} outside the target regions", row.id);
                continue;
            }
        }

        let chrom_index = match chrom_order.iter().position(|c| *c == row.chrom) {
            Some(i) => i,
            None => {
                chrom_order.push(row.chrom.clone());
                chrom_order.len() - 1
            }
        };
        rows.push((chrom_index, row));
    }

    rows.sort_by_key(|(chrom_index, row)| (*chrom_index, row.pos));
    info!("{} variants selected for export", rows.len());

    VariantExport {
        samples: samples.into_iter().collect(),
        contigs: contig_ends.into_iter().collect(),
        rows: rows.into_iter().map(|(_, row)| row).collect(),
    }
}

/// Write the export as VCF 4.2 text
///
/// # Errors
///
/// Returns any IO error from the writer.
pub fn write_vcf<W: Write + ?Sized>(writer: &mut W, export: &VariantExport) -> std::io::Result<()> {
    writeln!(writer, "##fileformat=VCFv4.2")?;
    writeln!(writer, "##source=pangraph")?;
    for (contig, length) in &export.contigs {
        writeln!(writer, "##contig=<ID={contig},length={length}>")?;
    }
    writeln!(
        writer,
        "##INFO=<ID=SVTYPE,Number=1,Type=String,Description=\"Type of the variant\">"
    )?;
    writeln!(
        writer,
        "##INFO=<ID=SVLEN,Number=1,Type=Integer,Description=\"Length of the variant\">"
    )?;
    writeln!(
        writer,
        "##INFO=<ID=END,Number=1,Type=Integer,Description=\"Partner position of the variant\">"
    )?;
    writeln!(writer, "##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">")?;

    write!(writer, "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT")?;
    for sample in &export.samples {
        write!(writer, "\t{sample}")?;
    }
    writeln!(writer)?;

    for row in &export.rows {
        write!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t.\tPASS\tSVTYPE={};SVLEN={};END={}\tGT",
            row.chrom, row.pos, row.id, row.reference, row.alt, row.variant_type, row.length, row.end
        )?;
        for sample in &export.samples {
            let genotype = if row.carriers.contains(sample) { "0/1" } else { "0/0" };
            write!(writer, "\t{genotype}")?;
        }
        writeln!(writer)?;
    }

    Ok(())
}
