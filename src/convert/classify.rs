//! Classification of VCF records into graph-ready variants.
//!
//! A classified variant carries an optional **start anchor** `s` (a backbone
//! segment must end at `s` and the variant is entered from it) and an optional
//! **end anchor** `e` (a backbone segment must start at `e` and the variant exits
//! into it). Anchors outside `[1, contig length]` are dropped.
//!
//! | Condition | Type | Sequence | Reverse | Anchors |
//! |-----------|------|----------|---------|---------|
//! | `SVTYPE=DUP` | DUP | reference `[pos, end)` | no | `pos-1`, `end` |
//! | `SVTYPE=DEL` | DEL | reference `[pos, end)` | no | `pos-1`, `end` |
//! | `SVTYPE=INV` | INV | revcomp of reference `[pos, end)` | yes | `pos-1`, `end` |
//! | `SVTYPE=INS` | INS | literal ALT without padding base | no | `pos`, `pos+1` |
//! | `SVTYPE=BND` | BND | partner flank | per bracket form | one side |
//! | equal allele lengths | SNP | ALT after shared prefix | no | around REF |
//! | REF shorter | INS | ALT after shared prefix | no | around REF |
//! | REF longer | DEL | REF after shared prefix | no | around REF |

use crate::convert::VariantIssue;
use crate::core::types::{reverse_complement, VariantType};
use crate::parsing::fasta::ReferenceSource;
use crate::parsing::vcf::VariantRecord;

/// A VCF record reduced to what the synthesizer needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedVariant {
    pub variant_type: VariantType,
    pub start_anchor: Option<u64>,
    pub end_anchor: Option<u64>,
    /// `None` when the reference withholds sequence
    pub sequence: Option<String>,
    pub length: u64,
    pub reverse: bool,
    /// `SO` value of the variant segment
    pub offset: u64,
    pub origin_pos: u64,
    pub partner_chrom: String,
    pub partner_pos: u64,
}

/// Bracket form of a breakend ALT allele
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakendForm {
    /// `]p]t`: the piece left of `p` joins before `t`
    LeftBefore,
    /// `t]p]`: the reverse complement of the piece left of `p` joins after `t`
    LeftAfter,
    /// `[p[t`: the reverse complement of the piece right of `p` joins before `t`
    RightBefore,
    /// `t[p[`: the piece right of `p` joins after `t`
    RightAfter,
}

/// A parsed breakend ALT allele
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakend {
    pub form: BreakendForm,
    pub partner_chrom: String,
    pub partner_pos: u64,
}

/// Parse `]p]t`, `t]p]`, `[p[t` or `t[p[` where `p` is `chrom:pos`
pub fn parse_breakend(alt: &str) -> Option<Breakend> {
    let open = alt.find([']', '['])?;
    let bracket = alt[open..].chars().next()?;
    let close = open + 1 + alt[open + 1..].find(bracket)?;

    let (partner_chrom, partner_pos) = alt[open + 1..close].rsplit_once(':')?;
    if partner_chrom.is_empty() {
        return None;
    }
    let partner_pos = partner_pos.parse().ok()?;

    let leading = open == 0;
    // The joined base must sit on exactly one side of the brackets
    if leading == (close + 1 == alt.len()) {
        return None;
    }

    let form = match (bracket, leading) {
        (']', true) => BreakendForm::LeftBefore,
        (']', false) => BreakendForm::LeftAfter,
        ('[', true) => BreakendForm::RightBefore,
        _ => BreakendForm::RightAfter,
    };

    Some(Breakend {
        form,
        partner_chrom: partner_chrom.to_string(),
        partner_pos,
    })
}

/// Classify one record on a chromosome of length `chrom_len`.
///
/// # Errors
///
/// Returns a `VariantIssue` when the record cannot be placed on the graph;
/// the caller skips the record and keeps the chromosome going.
pub fn classify(
    record: &VariantRecord,
    chrom_len: u64,
    reference: &dyn ReferenceSource,
    flank_length: u64,
) -> Result<ClassifiedVariant, VariantIssue> {
    if record.pos == 0 {
        return Err(malformed(record, "position must be at least 1"));
    }

    let classified = match record.sv_type() {
        Some(sv_type) => match VariantType::parse(sv_type) {
            Some(VariantType::Bnd) => classify_breakend(record, chrom_len, reference, flank_length)?,
            Some(VariantType::Ins) => classify_insertion(record),
            Some(t @ (VariantType::Dup | VariantType::Del | VariantType::Inv)) => {
                classify_region(record, t, chrom_len, reference)?
            }
            Some(VariantType::Snp) => classify_allele_change(record)?,
            None => {
                return Err(VariantIssue::UnsupportedSvType {
                    chrom: record.chrom.clone(),
                    pos: record.pos,
                    id: record.id.clone(),
                    sv_type: sv_type.to_string(),
                })
            }
        },
        None => classify_allele_change(record)?,
    };

    check_bounds(record, &classified, chrom_len)?;

    Ok(ClassifiedVariant {
        start_anchor: classified.start_anchor.filter(|&s| (1..=chrom_len).contains(&s)),
        end_anchor: classified.end_anchor.filter(|&e| (1..=chrom_len).contains(&e)),
        ..classified
    })
}

/// Exclusive end of a region SV: INFO `END`, else `pos + |SVLEN|`, else `pos + len(REF)`
fn region_end(record: &VariantRecord) -> u64 {
    if let Some(end) = record.info_int("END").filter(|&e| e > 0) {
        return end.unsigned_abs();
    }
    if let Some(len) = record.info_int("SVLEN").filter(|&l| l != 0) {
        return record.pos.saturating_add(len.unsigned_abs());
    }
    record.pos.saturating_add(record.reference.len() as u64)
}

/// The reference is only read once the span is known to fit the chromosome
fn classify_region(
    record: &VariantRecord,
    variant_type: VariantType,
    chrom_len: u64,
    reference: &dyn ReferenceSource,
) -> Result<ClassifiedVariant, VariantIssue> {
    let end = region_end(record);
    if end <= record.pos {
        return Err(malformed(record, &format!("end {end} is not after the start")));
    }

    let reverse = variant_type == VariantType::Inv;
    let mut variant = ClassifiedVariant {
        variant_type,
        start_anchor: Some(record.pos - 1),
        end_anchor: Some(end),
        sequence: None,
        length: end - record.pos,
        reverse,
        offset: record.pos - 1,
        origin_pos: record.pos,
        partner_chrom: record.chrom.clone(),
        partner_pos: end,
    };
    check_bounds(record, &variant, chrom_len)?;

    let region = reference.fetch(&record.chrom, record.pos, end);
    variant.sequence = if reverse {
        region.map(|seq| reverse_complement(&seq))
    } else {
        region
    };
    Ok(variant)
}

fn classify_insertion(record: &VariantRecord) -> ClassifiedVariant {
    let literal = record
        .first_alt()
        .filter(|alt| !alt.starts_with('<') && !alt.contains(['[', ']']));

    let sequence = literal.map(|alt| {
        match (alt.chars().next(), record.reference.chars().next()) {
            (Some(a), Some(r)) if a.eq_ignore_ascii_case(&r) => alt[a.len_utf8()..].to_string(),
            _ => alt.to_string(),
        }
    });
    let length = sequence.as_ref().map_or_else(
        || record.info_int("SVLEN").map_or(0, i64::unsigned_abs),
        |s| s.len() as u64,
    );

    ClassifiedVariant {
        variant_type: VariantType::Ins,
        start_anchor: Some(record.pos),
        end_anchor: Some(record.pos.saturating_add(1)),
        sequence,
        length,
        reverse: false,
        offset: record.pos,
        origin_pos: record.pos,
        partner_chrom: record.chrom.clone(),
        partner_pos: record.pos.saturating_add(1),
    }
}

fn classify_breakend(
    record: &VariantRecord,
    chrom_len: u64,
    reference: &dyn ReferenceSource,
    flank_length: u64,
) -> Result<ClassifiedVariant, VariantIssue> {
    let alt = record.first_alt().unwrap_or_default();
    let malformed_breakend = || VariantIssue::MalformedBreakend {
        chrom: record.chrom.clone(),
        pos: record.pos,
        id: record.id.clone(),
        alt: alt.to_string(),
    };
    let breakend = parse_breakend(alt).ok_or_else(malformed_breakend)?;

    if record.pos > chrom_len {
        return Err(out_of_bounds(record, VariantType::Bnd, record.pos, record.pos, chrom_len));
    }

    let p = breakend.partner_pos;
    let left = (p.saturating_sub(flank_length), p);
    let right = (p, p.checked_add(flank_length).ok_or_else(malformed_breakend)?);

    let (window, reverse, start_anchor, end_anchor) = match breakend.form {
        BreakendForm::LeftBefore => (left, false, None, Some(record.pos)),
        BreakendForm::LeftAfter => (left, true, Some(record.pos), None),
        BreakendForm::RightBefore => (right, true, None, Some(record.pos)),
        BreakendForm::RightAfter => (right, false, Some(record.pos), None),
    };

    let flank = reference.fetch(&breakend.partner_chrom, window.0, window.1);
    let sequence = if reverse {
        flank.map(|seq| reverse_complement(&seq))
    } else {
        flank
    };

    Ok(ClassifiedVariant {
        variant_type: VariantType::Bnd,
        start_anchor,
        end_anchor,
        sequence,
        length: window.1.saturating_sub(window.0),
        reverse,
        offset: start_anchor.unwrap_or(record.pos - 1),
        origin_pos: record.pos,
        partner_chrom: breakend.partner_chrom,
        partner_pos: breakend.partner_pos,
    })
}

/// SNP, small insertion or small deletion described by its alleles
fn classify_allele_change(record: &VariantRecord) -> Result<ClassifiedVariant, VariantIssue> {
    let alt = record
        .first_alt()
        .ok_or_else(|| malformed(record, "no alternate allele"))?;
    if alt.starts_with('<') || alt.contains(['[', ']']) {
        return Err(malformed(record, &format!("symbolic allele '{alt}' without SVTYPE")));
    }

    let variant_type = match record.reference.len().cmp(&alt.len()) {
        std::cmp::Ordering::Equal => VariantType::Snp,
        std::cmp::Ordering::Less => VariantType::Ins,
        std::cmp::Ordering::Greater => VariantType::Del,
    };

    let ref_allele = if record.reference == "N" {
        ""
    } else {
        record.reference.as_str()
    };

    let shared_prefix = !ref_allele.is_empty()
        && ref_allele.is_ascii()
        && alt.is_ascii()
        && ref_allele.as_bytes()[0].eq_ignore_ascii_case(&alt.as_bytes()[0]);
    let (ref_rest, alt_rest) = if shared_prefix {
        (&ref_allele[1..], &alt[1..])
    } else {
        (ref_allele, alt)
    };

    let start = record.pos - 1 + u64::from(shared_prefix);
    let end = start.saturating_add(ref_rest.len() as u64 + 1);

    let sequence = if variant_type == VariantType::Del {
        ref_rest
    } else {
        alt_rest
    };

    Ok(ClassifiedVariant {
        variant_type,
        start_anchor: Some(start),
        end_anchor: Some(end),
        sequence: Some(sequence.to_string()),
        length: sequence.len() as u64,
        reverse: false,
        offset: start,
        origin_pos: start.saturating_add(1),
        partner_chrom: record.chrom.clone(),
        partner_pos: end,
    })
}

/// Reject variants whose affected bases leave `[1, chrom_len]`
fn check_bounds(
    record: &VariantRecord,
    variant: &ClassifiedVariant,
    chrom_len: u64,
) -> Result<(), VariantIssue> {
    if variant.variant_type == VariantType::Bnd {
        return Ok(());
    }

    let first = variant.start_anchor.map_or(1, |s| s.saturating_add(1));
    let last = variant.end_anchor.map_or(first, |e| e.saturating_sub(1));
    if first > chrom_len.saturating_add(1) || last > chrom_len {
        return Err(out_of_bounds(
            record,
            variant.variant_type,
            first,
            last,
            chrom_len,
        ));
    }
    Ok(())
}

fn malformed(record: &VariantRecord, reason: &str) -> VariantIssue {
    VariantIssue::MalformedRecord {
        chrom: record.chrom.clone(),
        pos: record.pos,
        id: record.id.clone(),
        reason: reason.to_string(),
    }
}

fn out_of_bounds(
    record: &VariantRecord,
    variant_type: VariantType,
    start: u64,
    end: u64,
    length: u64,
) -> VariantIssue {
    VariantIssue::OutOfBounds {
        chrom: record.chrom.clone(),
        pos: record.pos,
        id: record.id.clone(),
        variant_type,
        start,
        end,
        length,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::fasta::ContigLengths;
    use std::collections::BTreeMap;

    /// 100 bases of `ACGT` repeats on chr1, 300 on chr2
    struct Repeats;

    impl ReferenceSource for Repeats {
        fn fetch(&self, chrom: &str, start: u64, end: u64) -> Option<String> {
            let len = self.chrom_length(chrom).unwrap_or(0);
            Some(
                (start..end)
                    .map(|p| {
                        if p == 0 || p > len {
                            'N'
                        } else {
                            ['A', 'C', 'G', 'T'][((p - 1) % 4) as usize]
                        }
                    })
                    .collect(),
            )
        }

        fn chrom_length(&self, chrom: &str) -> Option<u64> {
            match chrom {
                "chr1" => Some(100),
                "chr2" => Some(300),
                _ => None,
            }
        }

        fn has_sequences(&self) -> bool {
            true
        }
    }

    fn record(pos: u64, reference: &str, alt: &str, info: &[(&str, &str)]) -> VariantRecord {
        VariantRecord {
            chrom: "chr1".to_string(),
            pos,
            id: "v".to_string(),
            reference: reference.to_string(),
            alternates: vec![alt.to_string()],
            info: info
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
            genotypes: vec!["0/1".to_string()],
        }
    }

    #[test]
    fn test_snp() {
        let v = classify(&record(50, "A", "G", &[]), 100, &Repeats, 100).unwrap();
        assert_eq!(v.variant_type, VariantType::Snp);
        assert_eq!(v.start_anchor, Some(49));
        assert_eq!(v.end_anchor, Some(51));
        assert_eq!(v.sequence.as_deref(), Some("G"));
        assert_eq!(v.offset, 49);
        assert!(!v.reverse);
    }

    #[test]
    fn test_small_deletion_strips_shared_prefix() {
        let v = classify(&record(10, "ACG", "A", &[]), 100, &Repeats, 100).unwrap();
        assert_eq!(v.variant_type, VariantType::Del);
        assert_eq!(v.sequence.as_deref(), Some("CG"));
        assert_eq!(v.start_anchor, Some(10));
        assert_eq!(v.end_anchor, Some(13));
    }

    #[test]
    fn test_small_insertion() {
        let v = classify(&record(10, "A", "ATTT", &[]), 100, &Repeats, 100).unwrap();
        assert_eq!(v.variant_type, VariantType::Ins);
        assert_eq!(v.sequence.as_deref(), Some("TTT"));
        assert_eq!(v.start_anchor, Some(10));
        assert_eq!(v.end_anchor, Some(11));
    }

    #[test]
    fn test_tagged_deletion_uses_reference_region() {
        let v = classify(
            &record(20, "N", "<DEL>", &[("SVTYPE", "DEL"), ("SVLEN", "-10")]),
            100,
            &Repeats,
            100,
        )
        .unwrap();
        assert_eq!(v.variant_type, VariantType::Del);
        assert_eq!(v.sequence, Repeats.fetch("chr1", 20, 30));
        assert_eq!(v.length, 10);
        assert_eq!(v.start_anchor, Some(19));
        assert_eq!(v.end_anchor, Some(30));
    }

    #[test]
    fn test_inversion_is_reverse_complemented() {
        let v = classify(
            &record(5, "A", "<INV>", &[("SVTYPE", "INV"), ("END", "9")]),
            100,
            &Repeats,
            100,
        )
        .unwrap();
        // reference [5, 9) = ACGT
        assert_eq!(v.sequence.as_deref(), Some("ACGT"));
        assert!(v.reverse);

        let v = classify(
            &record(6, "C", "<INV>", &[("SVTYPE", "INV"), ("END", "9")]),
            100,
            &Repeats,
            100,
        )
        .unwrap();
        // reference [6, 9) = CGT
        assert_eq!(v.sequence.as_deref(), Some("ACG"));
    }

    #[test]
    fn test_duplication_with_withheld_sequence() {
        let lengths = ContigLengths::new(&[("chr1".to_string(), 100)]);
        let v = classify(
            &record(30, "N", "<DUP>", &[("SVTYPE", "DUP"), ("END", "40")]),
            100,
            &lengths,
            100,
        )
        .unwrap();
        assert_eq!(v.variant_type, VariantType::Dup);
        assert_eq!(v.sequence, None);
        assert_eq!(v.length, 10);
    }

    #[test]
    fn test_tagged_insertion() {
        let v = classify(
            &record(10, "A", "AGGG", &[("SVTYPE", "INS")]),
            100,
            &Repeats,
            100,
        )
        .unwrap();
        assert_eq!(v.sequence.as_deref(), Some("GGG"));
        assert_eq!(v.start_anchor, Some(10));
        assert_eq!(v.end_anchor, Some(11));

        let v = classify(
            &record(100, "A", "<INS>", &[("SVTYPE", "INS"), ("SVLEN", "250")]),
            100,
            &Repeats,
            100,
        )
        .unwrap();
        assert_eq!(v.sequence, None);
        assert_eq!(v.length, 250);
        assert_eq!(v.start_anchor, Some(100));
        assert_eq!(v.end_anchor, None);
    }

    #[test]
    fn test_anchors_outside_contig_are_dropped() {
        let v = classify(&record(1, "A", "G", &[]), 100, &Repeats, 100).unwrap();
        assert_eq!(v.start_anchor, None);
        assert_eq!(v.end_anchor, Some(2));

        let v = classify(&record(100, "T", "C", &[]), 100, &Repeats, 100).unwrap();
        assert_eq!(v.start_anchor, Some(99));
        assert_eq!(v.end_anchor, None);
    }

    #[test]
    fn test_out_of_bounds_is_rejected() {
        let err = classify(&record(101, "A", "G", &[]), 100, &Repeats, 100).unwrap_err();
        assert!(matches!(err, VariantIssue::OutOfBounds { .. }));

        let err = classify(
            &record(90, "N", "<DEL>", &[("SVTYPE", "DEL"), ("END", "120")]),
            100,
            &Repeats,
            100,
        )
        .unwrap_err();
        assert!(matches!(err, VariantIssue::OutOfBounds { end: 119, .. }));
    }

    #[test]
    fn test_unsupported_and_malformed() {
        let err = classify(
            &record(10, "A", "<CNV>", &[("SVTYPE", "CNV")]),
            100,
            &Repeats,
            100,
        )
        .unwrap_err();
        assert!(matches!(err, VariantIssue::UnsupportedSvType { .. }));

        let err = classify(&record(10, "A", "<DEL>", &[]), 100, &Repeats, 100).unwrap_err();
        assert!(matches!(err, VariantIssue::MalformedRecord { .. }));

        let err = classify(&record(10, "A", ".", &[]), 100, &Repeats, 100).unwrap_err();
        assert!(matches!(err, VariantIssue::MalformedRecord { .. }));
    }

    #[test]
    fn test_parse_breakend_forms() {
        let b = parse_breakend("]chr2:150]A").unwrap();
        assert_eq!(b.form, BreakendForm::LeftBefore);
        assert_eq!(b.partner_chrom, "chr2");
        assert_eq!(b.partner_pos, 150);

        assert_eq!(parse_breakend("A]chr2:150]").unwrap().form, BreakendForm::LeftAfter);
        assert_eq!(parse_breakend("[chr2:150[A").unwrap().form, BreakendForm::RightBefore);
        assert_eq!(parse_breakend("A[chr2:150[").unwrap().form, BreakendForm::RightAfter);

        assert!(parse_breakend("A").is_none());
        assert!(parse_breakend("]chr2:150A").is_none());
        assert!(parse_breakend("]chr2]A").is_none());
        assert!(parse_breakend("]chr2:x]A").is_none());
        assert!(parse_breakend("]chr2:150]").is_none());
    }

    #[test]
    fn test_breakend_flanks() {
        let bnd = |alt: &str| {
            classify(
                &record(40, "A", alt, &[("SVTYPE", "BND")]),
                100,
                &Repeats,
                10,
            )
            .unwrap()
        };

        // ]p]t: left flank, end anchor at own position
        let v = bnd("]chr2:21]A");
        assert_eq!(v.start_anchor, None);
        assert_eq!(v.end_anchor, Some(40));
        assert_eq!(v.sequence, Repeats.fetch("chr2", 11, 21));
        assert!(!v.reverse);
        assert_eq!(v.partner_chrom, "chr2");
        assert_eq!(v.partner_pos, 21);

        // t]p]: reverse-complemented left flank, start anchor
        let v = bnd("A]chr2:21]");
        assert_eq!(v.start_anchor, Some(40));
        assert_eq!(v.end_anchor, None);
        assert_eq!(
            v.sequence,
            Repeats.fetch("chr2", 11, 21).map(|s| reverse_complement(&s))
        );
        assert!(v.reverse);

        // [p[t: reverse-complemented right flank, end anchor
        let v = bnd("[chr2:21[A");
        assert_eq!(v.end_anchor, Some(40));
        assert!(v.reverse);

        // t[p[: right flank, start anchor
        let v = bnd("A[chr2:21[");
        assert_eq!(v.start_anchor, Some(40));
        assert_eq!(v.sequence, Repeats.fetch("chr2", 21, 31));
        assert_eq!(v.length, 10);
    }

    #[test]
    fn test_region_past_contig_is_rejected_before_fetch() {
        /// Panics on any sequence request
        struct NoFetch;

        impl ReferenceSource for NoFetch {
            fn fetch(&self, chrom: &str, start: u64, end: u64) -> Option<String> {
                panic!("unexpected fetch of {chrom}:{start}-{end}");
            }

            fn chrom_length(&self, _chrom: &str) -> Option<u64> {
                Some(100)
            }

            fn has_sequences(&self) -> bool {
                true
            }
        }

        let err = classify(
            &record(10, "N", "<DEL>", &[("SVTYPE", "DEL"), ("END", "600000000")]),
            100,
            &NoFetch,
            100,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            VariantIssue::OutOfBounds {
                end: 599_999_999,
                length: 100,
                ..
            }
        ));

        let err = classify(
            &record(10, "N", "<DUP>", &[("SVTYPE", "DUP"), ("SVLEN", "9223372036854775807")]),
            100,
            &NoFetch,
            100,
        )
        .unwrap_err();
        assert!(matches!(err, VariantIssue::OutOfBounds { .. }));
    }

    #[test]
    fn test_breakend_partner_at_max_position() {
        let err = classify(
            &record(40, "A", "A[chr1:18446744073709551615[", &[("SVTYPE", "BND")]),
            100,
            &Repeats,
            100,
        )
        .unwrap_err();
        assert!(matches!(err, VariantIssue::MalformedBreakend { .. }));

        // the left flank needs no addition and stays valid
        let v = classify(
            &record(40, "A", "]chr1:18446744073709551615]A", &[("SVTYPE", "BND")]),
            100,
            &Repeats,
            3,
        )
        .unwrap();
        assert_eq!(v.length, 3);
        assert_eq!(v.sequence.as_deref(), Some("NNN"));
    }

    #[test]
    fn test_position_at_max_is_out_of_bounds() {
        let err = classify(&record(u64::MAX, "A", "G", &[]), 100, &Repeats, 100).unwrap_err();
        assert!(matches!(err, VariantIssue::OutOfBounds { .. }));
    }

    #[test]
    fn test_malformed_breakend() {
        let err = classify(
            &record(40, "A", "A]chr2", &[("SVTYPE", "BND")]),
            100,
            &Repeats,
            100,
        )
        .unwrap_err();
        assert!(matches!(err, VariantIssue::MalformedBreakend { .. }));
    }
}
