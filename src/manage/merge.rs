//! Merge several rGFA files into one.
//!
//! The first input keeps its ids. Every later input is shifted past the
//! largest numeric id seen so far: with `s1..s7` already merged, the next
//! file's `s1` becomes `s8`. Links and the segment references inside `INF`
//! descriptors are rewritten the same way.

use std::collections::{HashMap, HashSet};
use std::convert::Infallible;

use tracing::info;

use crate::core::segment::VariantDescriptor;
use crate::manage::{ManageError, RgfaDocument};

/// Split an id such as `s42` into its prefix and number
pub fn split_id(id: &str) -> Option<(&str, u64)> {
    let digits = id.find(|c: char| c.is_ascii_digit())?;
    let (prefix, number) = id.split_at(digits);
    if prefix.is_empty() {
        return None;
    }
    number.parse().ok().map(|n| (prefix, n))
}

/// Largest numeric id among the document's segments
pub fn max_id(document: &RgfaDocument) -> u64 {
    document
        .segments
        .iter()
        .filter_map(|s| split_id(&s.id).map(|(_, n)| n))
        .max()
        .unwrap_or(0)
}

/// Shift every numeric id by `offset`. Ids without a number are kept.
pub fn offset_ids(mut document: RgfaDocument, offset: u64, delimiter: &str) -> RgfaDocument {
    if offset == 0 {
        return document;
    }

    let renamed: HashMap<String, String> = document
        .segments
        .iter()
        .filter_map(|s| {
            let (prefix, n) = split_id(&s.id)?;
            Some((s.id.clone(), format!("{prefix}{}", n.saturating_add(offset))))
        })
        .collect();
    let rename = |id: &String| renamed.get(id).cloned().unwrap_or_else(|| id.clone());

    for segment in &mut document.segments {
        segment.id = rename(&segment.id);
        if let Some(info) = segment.tags.info.as_mut() {
            if let Some(descriptor) = VariantDescriptor::decode(info, delimiter) {
                let descriptor = descriptor
                    .try_map_ids(|id| Ok::<_, Infallible>(rename(id)))
                    .unwrap_or_else(|never| match never {});
                *info = descriptor.encode(delimiter);
            }
        }
    }
    for link in &mut document.links {
        link.from = rename(&link.from);
        link.to = rename(&link.to);
    }

    document
}

/// Concatenate documents in order, offsetting ids so none collide.
///
/// # Errors
///
/// Returns `ManageError::DuplicateSegment` if an id without a number appears
/// in more than one input.
pub fn merge(documents: Vec<RgfaDocument>, delimiter: &str) -> Result<RgfaDocument, ManageError> {
    let mut merged = RgfaDocument::default();
    let mut seen: HashSet<String> = HashSet::new();
    let inputs = documents.len();

    for document in documents {
        let offset = max_id(&merged);
        let document = offset_ids(document, offset, delimiter);

        for segment in &document.segments {
            if !seen.insert(segment.id.clone()) {
                return Err(ManageError::DuplicateSegment(segment.id.clone()));
            }
        }
        merged.segments.extend(document.segments);
        merged.links.extend(document.links);
    }

    info!(
        "Merged {inputs} rGFA files: {} segments, {} links",
        merged.segments.len(),
        merged.links.len()
    );
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manage::tests::GFA;

    fn document(text: &str) -> RgfaDocument {
        RgfaDocument::from_reader(text.as_bytes()).unwrap()
    }

    #[test]
    fn test_split_id() {
        assert_eq!(split_id("s42"), Some(("s", 42)));
        assert_eq!(split_id("node7"), Some(("node", 7)));
        assert_eq!(split_id("42"), None);
        assert_eq!(split_id("start"), None);
        assert_eq!(split_id("s4x"), None);
    }

    #[test]
    fn test_merge_offsets_later_inputs() {
        let other = "\
S\ts1\tGG\tLN:i:2\tSN:Z:ref#chr2\tSO:i:0\tSR:i:0
S\ts2\tT\tLN:i:1\tSN:Z:S1#chr2\tSO:i:1\tSR:i:1\tINF:Z:SV#SNP#chr2#2#chr2#3#v9#S1#s1#s1
L\ts1\t+\ts2\t+\t0M
";
        let merged = merge(vec![document(GFA), document(other)], "#").unwrap();

        let ids: Vec<&str> = merged.segments.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s2", "s3", "s4", "s5", "s6"]);
        assert_eq!(merged.links.len(), 5);

        let last = merged.links.last().unwrap();
        assert_eq!((last.from.as_str(), last.to.as_str()), ("s5", "s6"));

        let s6 = merged.segment("s6").unwrap();
        assert_eq!(
            s6.tags.info.as_deref(),
            Some("SV#SNP#chr2#2#chr2#3#v9#S1#s5#s5")
        );
        // the first input is untouched
        assert_eq!(merged.segment("s4").unwrap().tags.info, document(GFA).segments[3].tags.info);
    }

    #[test]
    fn test_unnumbered_ids_must_be_unique() {
        let a = "S\tfoo\tA\tLN:i:1\tSN:Z:ref#chr1\tSO:i:0\tSR:i:0\n";
        let err = merge(vec![document(a), document(a)], "#").unwrap_err();
        assert!(matches!(err, ManageError::DuplicateSegment(id) if id == "foo"));
    }

    #[test]
    fn test_legacy_info_left_alone() {
        let text = "S\ts1\tA\tLN:i:1\tSN:Z:S1#chr1\tSO:i:0\tSR:i:1\tINF:Z:SNP#chr1#1\n";
        let shifted = offset_ids(document(text), 10, "#");
        assert_eq!(shifted.segments[0].id, "s11");
        assert_eq!(shifted.segments[0].tags.info.as_deref(), Some("SNP#chr1#1"));
    }
}
