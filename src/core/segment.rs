//! Segment, link and variant descriptor types shared by the converter and the
//! graph engine.
//!
//! The identifier type is a parameter so the converter can build a
//! chromosome's graph with worker-local placeholders and later substitute
//! global ids in a single typed pass.

use serde::Serialize;

use crate::core::types::{Strand, VariantType, CARRIER_SEPARATOR};

/// Marker that starts every encoded variant descriptor
pub const DESCRIPTOR_PREFIX: &str = "SV";

/// Structured description of a variant segment, persisted in the `INF` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantDescriptor<Id> {
    pub variant_type: VariantType,
    pub origin_chrom: String,
    pub origin_pos: u64,
    pub partner_chrom: String,
    pub partner_pos: u64,
    pub variant_id: String,
    /// Carrier samples in VCF column order
    pub carriers: Vec<String>,
    /// Backbone segment the variant leaves from, or the variant itself
    pub origin_segment: Id,
    /// Backbone segment the variant rejoins, or the variant itself
    pub partner_segment: Id,
}

impl<Id> VariantDescriptor<Id> {
    /// Substitute both segment references, failing on the first unresolved id.
    ///
    /// # Errors
    ///
    /// Returns whatever error the resolver returns.
    pub fn try_map_ids<T, E, F>(self, mut f: F) -> Result<VariantDescriptor<T>, E>
    where
        F: FnMut(&Id) -> Result<T, E>,
    {
        let origin_segment = f(&self.origin_segment)?;
        let partner_segment = f(&self.partner_segment)?;
        Ok(VariantDescriptor {
            variant_type: self.variant_type,
            origin_chrom: self.origin_chrom,
            origin_pos: self.origin_pos,
            partner_chrom: self.partner_chrom,
            partner_pos: self.partner_pos,
            variant_id: self.variant_id,
            carriers: self.carriers,
            origin_segment,
            partner_segment,
        })
    }

    /// Carrier names joined into a single role token
    pub fn carrier_token(&self) -> String {
        join_carriers(&self.carriers)
    }
}

impl<Id: std::fmt::Display> VariantDescriptor<Id> {
    /// Encode as `SV<D>type<D>originChrom<D>originPos<D>partnerChrom<D>partnerPos<D>id<D>carriers<D>originSeg<D>partnerSeg`
    pub fn encode(&self, delimiter: &str) -> String {
        [
            DESCRIPTOR_PREFIX.to_string(),
            self.variant_type.to_string(),
            self.origin_chrom.clone(),
            self.origin_pos.to_string(),
            self.partner_chrom.clone(),
            self.partner_pos.to_string(),
            self.variant_id.clone(),
            self.carrier_token(),
            self.origin_segment.to_string(),
            self.partner_segment.to_string(),
        ]
        .join(delimiter)
    }
}

impl VariantDescriptor<String> {
    /// Decode a descriptor written by [`VariantDescriptor::encode`].
    ///
    /// Returns `None` when the text is not a complete descriptor.
    pub fn decode(raw: &str, delimiter: &str) -> Option<Self> {
        let fields: Vec<&str> = raw.split(delimiter).collect();
        if fields.len() != 10 || fields[0] != DESCRIPTOR_PREFIX {
            return None;
        }

        Some(VariantDescriptor {
            variant_type: VariantType::parse(fields[1])?,
            origin_chrom: fields[2].to_string(),
            origin_pos: fields[3].parse().ok()?,
            partner_chrom: fields[4].to_string(),
            partner_pos: fields[5].parse().ok()?,
            variant_id: fields[6].to_string(),
            carriers: split_carriers(fields[7]),
            origin_segment: fields[8].to_string(),
            partner_segment: fields[9].to_string(),
        })
    }
}

/// A graph node: one backbone span or one grouped variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<Id> {
    pub id: Id,
    /// `None` when the sequence is withheld (written as `*`)
    pub sequence: Option<String>,
    pub length: u64,
    /// 0 for backbone, 1 or more for variants
    pub rank: u32,
    pub sample: String,
    pub contig: String,
    pub offset: u64,
    pub descriptor: Option<VariantDescriptor<Id>>,
}

impl<Id> Segment<Id> {
    pub fn is_backbone(&self) -> bool {
        self.rank == 0
    }

    /// Substitute the segment id and any descriptor references.
    ///
    /// # Errors
    ///
    /// Returns whatever error the resolver returns.
    pub fn try_map_ids<T, E, F>(self, mut f: F) -> Result<Segment<T>, E>
    where
        F: FnMut(&Id) -> Result<T, E>,
    {
        let id = f(&self.id)?;
        let descriptor = match self.descriptor {
            Some(d) => Some(d.try_map_ids(&mut f)?),
            None => None,
        };
        Ok(Segment {
            id,
            sequence: self.sequence,
            length: self.length,
            rank: self.rank,
            sample: self.sample,
            contig: self.contig,
            offset: self.offset,
            descriptor,
        })
    }
}

/// A directed, stranded edge between two segments
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Link<Id> {
    pub from: Id,
    pub from_strand: Strand,
    pub to: Id,
    pub to_strand: Strand,
}

impl<Id> Link<Id> {
    pub fn new(from: Id, from_strand: Strand, to: Id, to_strand: Strand) -> Self {
        Self {
            from,
            from_strand,
            to,
            to_strand,
        }
    }

    /// Link between two forward-strand endpoints
    pub fn forward(from: Id, to: Id) -> Self {
        Self::new(from, Strand::Forward, to, Strand::Forward)
    }

    /// The same connection read from the other end: `(a,s1,b,s2)` becomes
    /// `(b,!s2,a,!s1)`
    #[must_use]
    pub fn reversed(self) -> Self {
        Self {
            from: self.to,
            from_strand: self.to_strand.flip(),
            to: self.from,
            to_strand: self.from_strand.flip(),
        }
    }

    /// Substitute both endpoints.
    ///
    /// # Errors
    ///
    /// Returns whatever error the resolver returns.
    pub fn try_map_ids<T, E, F>(self, mut f: F) -> Result<Link<T>, E>
    where
        F: FnMut(&Id) -> Result<T, E>,
    {
        Ok(Link {
            from: f(&self.from)?,
            from_strand: self.from_strand,
            to: f(&self.to)?,
            to_strand: self.to_strand,
        })
    }
}

pub fn join_carriers(carriers: &[String]) -> String {
    carriers.join(&CARRIER_SEPARATOR.to_string())
}

pub fn split_carriers(token: &str) -> Vec<String> {
    token
        .split(CARRIER_SEPARATOR)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
