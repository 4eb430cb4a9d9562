//! Global renumbering of placeholder ids and rGFA serialization.
//!
//! Ids are assigned from the per-chromosome counters alone: roles in order
//! (backbone first, then carrier tokens lexicographically), chromosomes in
//! caller order within each role, counters ascending. Two runs over the same
//! input therefore produce the same ids regardless of the worker count.

use std::collections::{BTreeSet, HashMap};
use std::io::Write;

use crate::convert::synth::{ChromosomeGraph, Placeholder, Role};
use crate::convert::ConvertError;
use crate::core::segment::{Link, Segment};
use crate::parsing::rgfa::{write_link, write_segment};

/// Prefix of every global segment id
pub const SEGMENT_ID_PREFIX: &str = "s";

/// Placeholder to global id, built once all chromosomes are done
#[derive(Debug, Clone, Default)]
pub struct GlobalIdTable {
    ids: HashMap<Placeholder, String>,
}

impl GlobalIdTable {
    pub fn build(graphs: &[ChromosomeGraph]) -> Self {
        let roles: BTreeSet<&Role> = graphs.iter().flat_map(|g| g.id_counts.keys()).collect();

        let mut ids = HashMap::new();
        let mut next = 1u64;
        for role in roles {
            for graph in graphs {
                let count = graph.id_counts.get(role).copied().unwrap_or(0);
                for counter in 0..count {
                    let placeholder = Placeholder {
                        chrom: graph.chrom.clone(),
                        role: role.clone(),
                        counter,
                    };
                    ids.insert(placeholder, format!("{SEGMENT_ID_PREFIX}{next}"));
                    next += 1;
                }
            }
        }

        Self { ids }
    }

    /// # Errors
    ///
    /// Returns `ConvertError::UnresolvedPlaceholder` if the placeholder was
    /// never counted.
    pub fn resolve(&self, placeholder: &Placeholder) -> Result<String, ConvertError> {
        self.ids
            .get(placeholder)
            .cloned()
            .ok_or_else(|| ConvertError::UnresolvedPlaceholder(placeholder.to_string()))
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// One chromosome's segments and links with global ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChromosomeOutput {
    pub chrom: String,
    pub segments: Vec<Segment<String>>,
    pub links: Vec<Link<String>>,
}

/// Replace every placeholder, in ids, descriptors and link endpoints.
///
/// # Errors
///
/// Returns `ConvertError::UnresolvedPlaceholder` on the first id missing from
/// the table.
pub fn apply(
    graphs: Vec<ChromosomeGraph>,
    table: &GlobalIdTable,
) -> Result<Vec<ChromosomeOutput>, ConvertError> {
    let resolve = |p: &Placeholder| table.resolve(p);

    graphs
        .into_iter()
        .map(|graph| {
            let segments = graph
                .segments
                .into_iter()
                .map(|s| s.try_map_ids(resolve))
                .collect::<Result<Vec<_>, _>>()?;
            let links = graph
                .links
                .into_iter()
                .map(|l| l.try_map_ids(resolve))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ChromosomeOutput {
                chrom: graph.chrom,
                segments,
                links,
            })
        })
        .collect()
}

/// Write all chromosomes, each as its segments followed by its links
///
/// # Errors
///
/// Returns any IO error from the writer.
pub fn write_rgfa<W: Write>(
    writer: &mut W,
    chromosomes: &[ChromosomeOutput],
    delimiter: &str,
) -> std::io::Result<()> {
    for chromosome in chromosomes {
        for segment in &chromosome.segments {
            write_segment(writer, segment, delimiter)?;
        }
        for link in &chromosome.links {
            write_link(writer, link)?;
        }
    }
    Ok(())
}
