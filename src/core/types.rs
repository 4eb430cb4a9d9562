use serde::{Deserialize, Serialize};

/// Default separator between the sample and contig parts of an `SN` tag,
/// also used between the sub-fields of an `INF` descriptor.
pub const DEFAULT_DELIMITER: &str = "#";

/// Separator between carrier sample names in a role token or descriptor.
pub const CARRIER_SEPARATOR: char = '~';

/// Shape key used for backbone segments when rendering.
pub const BACKBONE_SHAPE: &str = "BB";

/// Orientation of a link endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strand {
    #[serde(rename = "+")]
    Forward,
    #[serde(rename = "-")]
    Reverse,
}

impl Strand {
    /// Parse a strand from its rGFA character (`+` or `-`)
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "+" => Some(Strand::Forward),
            "-" => Some(Strand::Reverse),
            _ => None,
        }
    }

    #[must_use]
    pub fn flip(self) -> Self {
        match self {
            Strand::Forward => Strand::Reverse,
            Strand::Reverse => Strand::Forward,
        }
    }

    pub fn is_reverse(self) -> bool {
        self == Strand::Reverse
    }
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Forward => write!(f, "+"),
            Self::Reverse => write!(f, "-"),
        }
    }
}

/// Kind of variation carried by a non-backbone segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VariantType {
    Snp,
    Ins,
    Del,
    Dup,
    Inv,
    Bnd,
}

impl VariantType {
    /// Parse a variant type from an `SVTYPE` value or descriptor field
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "SNP" => Some(VariantType::Snp),
            "INS" => Some(VariantType::Ins),
            "DEL" => Some(VariantType::Del),
            "DUP" => Some(VariantType::Dup),
            "INV" => Some(VariantType::Inv),
            "BND" => Some(VariantType::Bnd),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Snp => "SNP",
            Self::Ins => "INS",
            Self::Del => "DEL",
            Self::Dup => "DUP",
            Self::Inv => "INV",
            Self::Bnd => "BND",
        }
    }
}

impl std::fmt::Display for VariantType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reverse complement a nucleotide sequence.
///
/// Case is preserved and bases other than `ACGTN` are passed through unchanged.
pub fn reverse_complement(seq: &str) -> String {
    seq.chars()
        .rev()
        .map(|c| match c {
            'A' => 'T',
            'C' => 'G',
            'G' => 'C',
            'T' => 'A',
            'a' => 't',
            'c' => 'g',
            'g' => 'c',
            't' => 'a',
            other => other,
        })
        .collect()
}
