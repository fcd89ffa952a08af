use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SraMetaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    Genome,
    Transcriptome,
}

impl DataKind {
    /// Directory under a ToLID that holds this kind of data in the bucket.
    pub fn storage_dir(&self) -> &'static str {
        match self {
            DataKind::Genome => "genomic_data",
            DataKind::Transcriptome => "transcriptomic_data",
        }
    }

    pub fn output_dir(&self) -> &'static str {
        match self {
            DataKind::Genome => "sequence_metadata",
            DataKind::Transcriptome => "transcriptome_metadata",
        }
    }

    pub fn output_suffix(&self) -> &'static str {
        match self {
            DataKind::Genome => "SRA_sequence_metadata.tsv",
            DataKind::Transcriptome => "SRA_transcriptome_metadata.tsv",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataKind::Genome => write!(f, "genome"),
            DataKind::Transcriptome => write!(f, "transcriptome"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BiosampleAccession(String);

impl BiosampleAccession {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BiosampleAccession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BiosampleAccession {
    type Err = SraMetaError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_uppercase();
        let digits = normalized
            .strip_prefix("SAMN")
            .or_else(|| normalized.strip_prefix("SAME"))
            .or_else(|| normalized.strip_prefix("SAMD"))
            .map(|rest| rest.trim_start_matches(|ch: char| ch.is_ascii_uppercase()));
        let is_valid = digits
            .map(|rest| !rest.is_empty() && rest.chars().all(|ch| ch.is_ascii_digit()))
            .unwrap_or(false);
        if !is_valid {
            return Err(SraMetaError::InvalidBiosample(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

/// Tree of Life identifier, e.g. `bTaeGut1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tolid(String);

impl Tolid {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tolid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Tolid {
    type Err = SraMetaError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_string();
        let is_valid = normalized
            .chars()
            .next()
            .map(|ch| ch.is_ascii_alphabetic())
            .unwrap_or(false)
            && normalized.chars().all(|ch| ch.is_ascii_alphanumeric());
        if !is_valid {
            return Err(SraMetaError::InvalidTolid(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

/// Latin species name. Accepts either `Homo sapiens` or `Homo_sapiens`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Species(String);

impl Species {
    /// Name with spaces, as used in record titles.
    pub fn display_name(&self) -> &str {
        &self.0
    }

    /// Name with underscores, as used in bucket prefixes and output filenames.
    pub fn path_name(&self) -> String {
        self.0.replace(' ', "_")
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Species {
    type Err = SraMetaError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value
            .trim()
            .replace('_', " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        if normalized.is_empty() || normalized.contains('/') {
            return Err(SraMetaError::InvalidSpecies(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

/// Identifying triple for one sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRequest {
    pub biosample: BiosampleAccession,
    pub tolid: Tolid,
    pub species: Species,
}

impl SampleRequest {
    pub fn parse(biosample: &str, tolid: &str, species: &str) -> Result<Self, SraMetaError> {
        Ok(Self {
            biosample: biosample.parse()?,
            tolid: tolid.parse()?,
            species: species.parse()?,
        })
    }

    /// Bucket prefix holding this sample's data of the given kind.
    pub fn storage_prefix(&self, kind: DataKind) -> String {
        format!(
            "species/{}/{}/{}/",
            self.species.path_name(),
            self.tolid,
            kind.storage_dir()
        )
    }
}
