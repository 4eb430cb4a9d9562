//! Reader for VCF variant calls.
//!
//! Extracts the three things the converter needs from a VCF file:
//!
//! - sample names from the `#CHROM` header line
//! - contig lengths from `##contig=<ID=chr1,length=248956422>` header lines
//! - variant records (position, alleles, INFO and per-sample `GT`)
//!
//! Records are held in memory grouped per chromosome and sorted by position, so
//! [`VariantSource::records_in_range`] can be restarted any number of times.

use std::collections::{BTreeMap, HashMap};
use std::io::BufRead;
use std::path::Path;

use crate::parsing::{open_text, ParseError};

/// One VCF data line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantRecord {
    pub chrom: String,
    /// 1-based position
    pub pos: u64,
    pub id: String,
    pub reference: String,
    pub alternates: Vec<String>,
    /// INFO key/value pairs; flags map to an empty string
    pub info: BTreeMap<String, String>,
    /// Raw `GT` value per sample, in header column order
    pub genotypes: Vec<String>,
}

impl VariantRecord {
    /// The `SVTYPE` INFO value, if present
    pub fn sv_type(&self) -> Option<&str> {
        self.info.get("SVTYPE").map(String::as_str)
    }

    /// Parse an integer INFO value (e.g. `END`, `SVLEN`)
    pub fn info_int(&self, key: &str) -> Option<i64> {
        self.info
            .get(key)
            .and_then(|v| v.split(',').next())
            .and_then(|v| v.trim().parse().ok())
    }

    /// First alternate allele, ignoring the missing value `.`
    pub fn first_alt(&self) -> Option<&str> {
        self.alternates
            .first()
            .map(String::as_str)
            .filter(|a| !a.is_empty() && *a != ".")
    }

    /// Indices of the samples carrying at least one non-reference allele
    pub fn carrier_indices(&self) -> Vec<usize> {
        self.genotypes
            .iter()
            .enumerate()
            .filter(|(_, gt)| is_carrier_genotype(gt))
            .map(|(i, _)| i)
            .collect()
    }
}

/// A genotype carries the variant when any called allele is non-reference
pub fn is_carrier_genotype(gt: &str) -> bool {
    gt.split(['/', '|'])
        .filter_map(|allele| allele.parse::<usize>().ok())
        .any(|allele| allele > 0)
}

/// Source of variant records for the converter.
///
/// Implementations must be shareable across the conversion worker threads.
pub trait VariantSource: Sync {
    /// Sample names with a genotype column
    fn samples(&self) -> &[String];

    /// Chromosomes with at least one record, in file order
    fn chromosomes(&self) -> Vec<String>;

    /// Records on `chrom` with `start <= pos < end`, ordered by position
    fn records_in_range<'a>(
        &'a self,
        chrom: &str,
        start: u64,
        end: u64,
    ) -> Box<dyn Iterator<Item = &'a VariantRecord> + 'a>;
}

/// An in-memory VCF
#[derive(Debug, Default)]
pub struct VcfSource {
    samples: Vec<String>,
    contigs: Vec<(String, u64)>,
    chromosomes: Vec<String>,
    records: HashMap<String, Vec<VariantRecord>>,
}

impl VcfSource {
    /// Read a VCF file (plain or gzip/bgzip compressed)
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Io` if the file cannot be read or
    /// `ParseError::InvalidFormat` if a line is malformed.
    pub fn from_path(path: &Path) -> Result<Self, ParseError> {
        Self::from_reader(open_text(path)?)
    }

    /// Read VCF text from any buffered reader
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Io` on read failure or `ParseError::InvalidFormat`
    /// if a line is malformed.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, ParseError> {
        let mut source = VcfSource::default();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }

            if let Some(header) = line.strip_prefix("##") {
                if header.starts_with("contig=") {
                    if let Some(contig) = parse_contig_line(line)? {
                        source.contigs.push(contig);
                    }
                }
                continue;
            }

            if line.starts_with("#CHROM") {
                source.samples = line.split('\t').skip(9).map(str::to_string).collect();
                continue;
            }

            let record = parse_record_line(line, line_num + 1)?;
            if !source.records.contains_key(&record.chrom) {
                source.chromosomes.push(record.chrom.clone());
            }
            source
                .records
                .entry(record.chrom.clone())
                .or_default()
                .push(record);
        }

        for records in source.records.values_mut() {
            records.sort_by_key(|r| r.pos);
        }

        Ok(source)
    }

    /// Contig lengths declared in `##contig` header lines, in header order
    pub fn header_contigs(&self) -> &[(String, u64)] {
        &self.contigs
    }

    pub fn record_count(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }
}

impl VariantSource for VcfSource {
    fn samples(&self) -> &[String] {
        &self.samples
    }

    fn chromosomes(&self) -> Vec<String> {
        self.chromosomes.clone()
    }

    fn records_in_range<'a>(
        &'a self,
        chrom: &str,
        start: u64,
        end: u64,
    ) -> Box<dyn Iterator<Item = &'a VariantRecord> + 'a> {
        let Some(records) = self.records.get(chrom) else {
            return Box::new(std::iter::empty());
        };
        let first = records.partition_point(|r| r.pos < start);
        Box::new(records[first..].iter().take_while(move |r| r.pos < end))
    }
}

/// Parse one tab-separated data line
fn parse_record_line(line: &str, line_num: usize) -> Result<VariantRecord, ParseError> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 8 {
        return Err(ParseError::InvalidFormat(format!(
            "VCF line {line_num} has {} fields, expected at least 8",
            fields.len()
        )));
    }

    let pos: u64 = fields[1].parse().map_err(|_| {
        ParseError::InvalidFormat(format!(
            "VCF line {line_num}: invalid position '{}'",
            fields[1]
        ))
    })?;

    let info = parse_info(fields[7]);

    let genotypes = if fields.len() > 9 {
        let gt_index = fields[8].split(':').position(|key| key == "GT");
        fields[9..]
            .iter()
            .map(|sample| {
                gt_index
                    .and_then(|i| sample.split(':').nth(i))
                    .unwrap_or(".")
                    .to_string()
            })
            .collect()
    } else {
        Vec::new()
    };

    Ok(VariantRecord {
        chrom: fields[0].to_string(),
        pos,
        id: fields[2].to_string(),
        reference: fields[3].to_string(),
        alternates: fields[4].split(',').map(str::to_string).collect(),
        info,
        genotypes,
    })
}

fn parse_info(field: &str) -> BTreeMap<String, String> {
    if field == "." {
        return BTreeMap::new();
    }
    field
        .split(';')
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((key, value)) => (key.to_string(), value.to_string()),
            None => (entry.to_string(), String::new()),
        })
        .collect()
}

/// Parse a single ##contig=<...> line into (name, length)
fn parse_contig_line(line: &str) -> Result<Option<(String, u64)>, ParseError> {
    // Format: ##contig=<ID=chr1,length=248956422,assembly=...>
    let content = line
        .strip_prefix("##contig=<")
        .and_then(|s| s.strip_suffix('>'))
        .ok_or_else(|| ParseError::InvalidFormat(format!("Invalid contig line format: {line}")))?;

    let mut name: Option<String> = None;
    let mut length: Option<u64> = None;

    for part in split_contig_fields(content) {
        if let Some((key, value)) = part.split_once('=') {
            let value = value.trim().trim_matches('"');
            match key.trim().to_lowercase().as_str() {
                "id" => name = Some(value.to_string()),
                "length" => length = value.parse().ok(),
                _ => {}
            }
        }
    }

    // Contigs without a length cannot serve as a reference
    Ok(name.zip(length))
}

/// Split contig fields on commas outside quoted values
fn split_contig_fields(content: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;

    for (i, c) in content.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(&content[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    fields.push(&content[start..]);

    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    const VCF: &str = "##fileformat=VCFv4.2
##contig=<ID=chr1,length=100>
##contig=<ID=chr2,length=80,assembly=\"test,asm\">
##contig=<ID=chrUn>
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tS1\tS2
chr2\t5\tv3\tA\tG\t.\tPASS\t.\tGT\t0/1\t0/0
chr1\t50\tv2\tA\tG\t.\tPASS\t.\tGT:DP\t1|0:10\t./.:0
chr1\t20\tv1\tN\t<DEL>\t.\tPASS\tSVTYPE=DEL;END=30;IMPRECISE\tGT\t0/0\t1/1
";

    #[test]
    fn test_parse_header() {
        let source = VcfSource::from_reader(VCF.as_bytes()).unwrap();
        assert_eq!(source.samples(), ["S1".to_string(), "S2".to_string()]);
        assert_eq!(
            source.header_contigs(),
            [("chr1".to_string(), 100), ("chr2".to_string(), 80)]
        );
        assert_eq!(source.chromosomes(), vec!["chr2", "chr1"]);
        assert_eq!(source.record_count(), 3);
    }

    #[test]
    fn test_records_sorted_and_ranged() {
        let source = VcfSource::from_reader(VCF.as_bytes()).unwrap();
        let all: Vec<u64> = source
            .records_in_range("chr1", 1, 101)
            .map(|r| r.pos)
            .collect();
        assert_eq!(all, vec![20, 50]);

        let ranged: Vec<u64> = source
            .records_in_range("chr1", 21, 50)
            .map(|r| r.pos)
            .collect();
        assert!(ranged.is_empty());

        // Restartable
        assert_eq!(source.records_in_range("chr1", 1, 101).count(), 2);
        assert_eq!(source.records_in_range("chrX", 1, 101).count(), 0);
    }

    #[test]
    fn test_info_and_genotypes() {
        let source = VcfSource::from_reader(VCF.as_bytes()).unwrap();
        let del = source.records_in_range("chr1", 20, 21).next().unwrap();
        assert_eq!(del.sv_type(), Some("DEL"));
        assert_eq!(del.info_int("END"), Some(30));
        assert_eq!(del.info.get("IMPRECISE").map(String::as_str), Some(""));
        assert_eq!(del.carrier_indices(), vec![1]);

        let snp = source.records_in_range("chr1", 50, 51).next().unwrap();
        assert_eq!(snp.genotypes, vec!["1|0", "./."]);
        assert_eq!(snp.carrier_indices(), vec![0]);
        assert_eq!(snp.first_alt(), Some("G"));
    }

    #[test]
    fn test_is_carrier_genotype() {
        assert!(is_carrier_genotype("0/1"));
        assert!(is_carrier_genotype("2|0"));
        assert!(is_carrier_genotype("1"));
        assert!(!is_carrier_genotype("0/0"));
        assert!(!is_carrier_genotype("./."));
        assert!(!is_carrier_genotype("."));
    }

    #[test]
    fn test_no_sample_columns() {
        let vcf = "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\nchr1\t5\t.\tA\tG\t.\t.\t.\n";
        let source = VcfSource::from_reader(vcf.as_bytes()).unwrap();
        assert!(source.samples().is_empty());
        let record = source.records_in_range("chr1", 1, 10).next().unwrap();
        assert!(record.carrier_indices().is_empty());
    }

    #[test]
    fn test_malformed_line() {
        let vcf = "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\nchr1\t5\t.\n";
        assert!(matches!(
            VcfSource::from_reader(vcf.as_bytes()),
            Err(ParseError::InvalidFormat(_))
        ));

        let vcf = "chr1\tfive\t.\tA\tG\t.\t.\t.\n";
        assert!(VcfSource::from_reader(vcf.as_bytes()).is_err());
    }

    #[test]
    fn test_split_contig_fields() {
        let fields = split_contig_fields(r#"ID=chr1,length=123,desc="foo,bar""#);
        assert_eq!(fields, vec!["ID=chr1", "length=123", r#"desc="foo,bar""#]);
        assert_eq!(split_contig_fields(""), vec![""]);
    }
}
