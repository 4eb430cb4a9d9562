//! Line-level parsing and writing of rGFA segment and link records.
//!
//! ```text
//! S  <id>  <seq|*>  LN:i:<len>  SN:Z:<sample><D><contig>  SO:i:<offset>  SR:i:<rank>  [INF:Z:<descriptor>]
//! L  <from>  <+|->  <to>  <+|->  0M
//! ```
//!
//! Known tags map onto named fields of [`SegmentTags`]; anything else is kept
//! in an extension map so vendor tags survive a parse.

use std::collections::BTreeMap;
use std::io::Write;

use crate::core::segment::{Link, Segment};
use crate::core::types::Strand;
use crate::parsing::ParseError;

/// Overlap field written on every link
pub const LINK_OVERLAP: &str = "0M";

/// Optional tags of a segment line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentTags {
    pub length: Option<u64>,
    /// Raw `SN` value (`sample<D>contig`)
    pub sample_name: Option<String>,
    pub offset: Option<u64>,
    pub rank: Option<u32>,
    pub info: Option<String>,
    /// Unrecognized tags, keyed by tag name, as `(type, value)`
    pub extra: BTreeMap<String, (String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentLine {
    pub id: String,
    /// `None` for `*`
    pub sequence: Option<String>,
    pub tags: SegmentTags,
}

impl SegmentLine {
    /// `LN` when present, otherwise the length of the sequence
    pub fn length(&self) -> u64 {
        self.tags
            .length
            .unwrap_or_else(|| self.sequence.as_ref().map_or(0, |s| s.len() as u64))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GfaLine {
    Segment(SegmentLine),
    Link(Link<String>),
    /// Header, path, comment and other record types
    Other,
}

/// Parse one line of an rGFA file
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if a segment or link line has too few
/// fields, a malformed tag, a non-numeric integer tag or an invalid strand.
pub fn parse_line(line: &str) -> Result<GfaLine, ParseError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let fields: Vec<&str> = line.split('\t').collect();

    match fields[0] {
        "S" => parse_segment(&fields).map(GfaLine::Segment),
        "L" => parse_link(&fields).map(GfaLine::Link),
        _ => Ok(GfaLine::Other),
    }
}

fn parse_segment(fields: &[&str]) -> Result<SegmentLine, ParseError> {
    if fields.len() < 3 {
        return Err(ParseError::InvalidFormat(format!(
            "segment line has {} fields, expected at least 3",
            fields.len()
        )));
    }

    let sequence = match fields[2] {
        "*" => None,
        seq => Some(seq.to_string()),
    };

    let mut tags = SegmentTags::default();
    for tag in &fields[3..] {
        let mut parts = tag.splitn(3, ':');
        let (Some(name), Some(kind), Some(value)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(ParseError::InvalidFormat(format!("malformed tag '{tag}'")));
        };

        match name {
            "LN" => tags.length = Some(parse_int(name, value)?),
            "SN" => tags.sample_name = Some(value.to_string()),
            "SO" => tags.offset = Some(parse_int(name, value)?),
            "SR" => tags.rank = Some(parse_int(name, value)?),
            "INF" => tags.info = Some(value.to_string()),
            _ => {
                tags.extra
                    .insert(name.to_string(), (kind.to_string(), value.to_string()));
            }
        }
    }

    Ok(SegmentLine {
        id: fields[1].to_string(),
        sequence,
        tags,
    })
}

fn parse_link(fields: &[&str]) -> Result<Link<String>, ParseError> {
    if fields.len() < 5 {
        return Err(ParseError::InvalidFormat(format!(
            "link line has {} fields, expected at least 5",
            fields.len()
        )));
    }

    let strand = |s: &str| {
        Strand::parse(s).ok_or_else(|| ParseError::InvalidFormat(format!("invalid strand '{s}'")))
    };

    Ok(Link::new(
        fields[1].to_string(),
        strand(fields[2])?,
        fields[3].to_string(),
        strand(fields[4])?,
    ))
}

fn parse_int<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ParseError> {
    value
        .parse()
        .map_err(|_| ParseError::InvalidFormat(format!("invalid {name} value '{value}'")))
}

/// Write one `S` line
///
/// # Errors
///
/// Returns any IO error from the writer.
pub fn write_segment<W: Write>(
    writer: &mut W,
    segment: &Segment<String>,
    delimiter: &str,
) -> std::io::Result<()> {
    write!(
        writer,
        "S\t{}\t{}\tLN:i:{}\tSN:Z:{}{}{}\tSO:i:{}\tSR:i:{}",
        segment.id,
        segment.sequence.as_deref().unwrap_or("*"),
        segment.length,
        segment.sample,
        delimiter,
        segment.contig,
        segment.offset,
        segment.rank,
    )?;
    if let Some(descriptor) = &segment.descriptor {
        write!(writer, "\tINF:Z:{}", descriptor.encode(delimiter))?;
    }
    writeln!(writer)
}

/// Write a parsed segment line back out, keeping unrecognized tags
///
/// # Errors
///
/// Returns any IO error from the writer.
pub fn write_segment_line<W: Write + ?Sized>(writer: &mut W, segment: &SegmentLine) -> std::io::Result<()> {
    let tags = &segment.tags;
    write!(
        writer,
        "S\t{}\t{}",
        segment.id,
        segment.sequence.as_deref().unwrap_or("*")
    )?;
    if let Some(length) = tags.length {
        write!(writer, "\tLN:i:{length}")?;
    }
    if let Some(sample_name) = &tags.sample_name {
        write!(writer, "\tSN:Z:{sample_name}")?;
    }
    if let Some(offset) = tags.offset {
        write!(writer, "\tSO:i:{offset}")?;
    }
    if let Some(rank) = tags.rank {
        write!(writer, "\tSR:i:{rank}")?;
    }
    if let Some(info) = &tags.info {
        write!(writer, "\tINF:Z:{info}")?;
    }
    for (name, (kind, value)) in &tags.extra {
        write!(writer, "\t{name}:{kind}:{value}")?;
    }
    writeln!(writer)
}

/// Write one `L` line
///
/// # Errors
///
/// Returns any IO error from the writer.
pub fn write_link<W: Write + ?Sized>(writer: &mut W, link: &Link<String>) -> std::io::Result<()> {
    writeln!(
        writer,
        "L\t{}\t{}\t{}\t{}\t{LINK_OVERLAP}",
        link.from, link.from_strand, link.to, link.to_strand
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::segment::VariantDescriptor;
    use crate::core::types::VariantType;

    #[test]
    fn test_parse_segment_line() {
        let line = "S\ts1\tACGT\tLN:i:4\tSN:Z:ref#chr1\tSO:i:0\tSR:i:0\tXX:Z:a:b\n";
        let GfaLine::Segment(segment) = parse_line(line).unwrap() else {
            panic!("expected segment");
        };
        assert_eq!(segment.id, "s1");
        assert_eq!(segment.sequence.as_deref(), Some("ACGT"));
        assert_eq!(segment.tags.length, Some(4));
        assert_eq!(segment.tags.sample_name.as_deref(), Some("ref#chr1"));
        assert_eq!(segment.tags.offset, Some(0));
        assert_eq!(segment.tags.rank, Some(0));
        assert_eq!(
            segment.tags.extra.get("XX"),
            Some(&("Z".to_string(), "a:b".to_string()))
        );
    }

    #[test]
    fn test_segment_length_falls_back_to_sequence() {
        let GfaLine::Segment(segment) = parse_line("S\ts1\tACG\tSR:i:0").unwrap() else {
            panic!("expected segment");
        };
        assert_eq!(segment.length(), 3);

        let GfaLine::Segment(segment) = parse_line("S\ts2\t*").unwrap() else {
            panic!("expected segment");
        };
        assert_eq!(segment.sequence, None);
        assert_eq!(segment.length(), 0);
    }

    #[test]
    fn test_parse_link_line() {
        let link = parse_line("L\ts1\t+\ts2\t-\t0M").unwrap();
        assert_eq!(
            link,
            GfaLine::Link(Link::new(
                "s1".to_string(),
                Strand::Forward,
                "s2".to_string(),
                Strand::Reverse
            ))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_line("S\ts1").is_err());
        assert!(parse_line("S\ts1\tA\tLN:i:abc").is_err());
        assert!(parse_line("S\ts1\tA\tLN").is_err());
        assert!(parse_line("L\ts1\t+\ts2").is_err());
        assert!(parse_line("L\ts1\t?\ts2\t+\t0M").is_err());
        assert_eq!(parse_line("H\tVN:Z:1.0").unwrap(), GfaLine::Other);
    }

    #[test]
    fn test_write_lines() {
        let segment = Segment {
            id: "s4".to_string(),
            sequence: None,
            length: 10,
            rank: 1,
            sample: "S2".to_string(),
            contig: "chr1".to_string(),
            offset: 19,
            descriptor: Some(VariantDescriptor {
                variant_type: VariantType::Del,
                origin_chrom: "chr1".to_string(),
                origin_pos: 20,
                partner_chrom: "chr1".to_string(),
                partner_pos: 30,
                variant_id: "d1".to_string(),
                carriers: vec!["S2".to_string()],
                origin_segment: "s1".to_string(),
                partner_segment: "s3".to_string(),
            }),
        };

        let mut out = Vec::new();
        write_segment(&mut out, &segment, "#").unwrap();
        write_link(&mut out, &Link::forward("s1".to_string(), "s4".to_string())).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "S\ts4\t*\tLN:i:10\tSN:Z:S2#chr1\tSO:i:19\tSR:i:1\tINF:Z:SV#DEL#chr1#20#chr1#30#d1#S2#s1#s3\n\
             L\ts1\t+\ts4\t+\t0M\n"
        );
    }

    #[test]
    fn test_segment_line_written_back_unchanged() {
        let line = "S\ts7\tACGT\tLN:i:4\tSN:Z:S1~S2#chr1\tSO:i:10\tSR:i:1\tINF:Z:SV#INS#chr1#10#chr1#11#i1#S1~S2#s1#s2\tRC:i:3";
        let GfaLine::Segment(segment) = parse_line(line).unwrap() else {
            panic!("expected a segment");
        };

        let mut out = Vec::new();
        write_segment_line(&mut out, &segment).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), format!("{line}\n"));
    }
}
