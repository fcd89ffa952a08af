//! Fixed library/platform templates for every sequencing category GenomeArk
//! stores, plus the PacBio instrument-serial table.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LibraryLayout {
    Single,
    Paired,
}

impl fmt::Display for LibraryLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibraryLayout::Single => write!(f, "single"),
            LibraryLayout::Paired => write!(f, "paired"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    FiveMc,
    Reads,
    Subreads,
    DemultiplexBam,
    HifiBam,
    Fastq,
    TenX,
    Arima,
    Illumina,
    Dovetail,
    Element,
    RnaSeq,
    IsoSeq,
}

impl Category {
    pub fn key(&self) -> &'static str {
        match self {
            Category::FiveMc => "5mC",
            Category::Reads => "reads",
            Category::Subreads => "subreads",
            Category::DemultiplexBam => "demultiplex_bam",
            Category::HifiBam => "hifi_bam",
            Category::Fastq => "fastq",
            Category::TenX => "10x",
            Category::Arima => "arima",
            Category::Illumina => "illumina",
            Category::Dovetail => "dovetail",
            Category::Element => "element",
            Category::RnaSeq => "RNA-Seq",
            Category::IsoSeq => "Iso-Seq",
        }
    }

    pub fn template(&self) -> &'static CategoryTemplate {
        match self {
            Category::FiveMc => &FIVE_MC,
            Category::Reads => &READS,
            Category::Subreads => &SUBREADS,
            Category::DemultiplexBam => &DEMULTIPLEX_BAM,
            Category::HifiBam => &HIFI_BAM,
            Category::Fastq => &HIFI_FASTQ,
            Category::TenX => &TEN_X,
            Category::Arima => &ARIMA,
            Category::Illumina => &ILLUMINA,
            Category::Dovetail => &DOVETAIL,
            Category::Element => &ELEMENT,
            Category::RnaSeq => &RNA_SEQ,
            Category::IsoSeq => &ISO_SEQ,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTemplate {
    pub library_name: &'static str,
    pub title_fragment: &'static str,
    pub library_strategy: &'static str,
    pub library_source: &'static str,
    pub library_selection: &'static str,
    pub library_layout: LibraryLayout,
    pub platform: &'static str,
    pub instrument_model: &'static str,
    pub design_description: &'static str,
    pub default_filetype: &'static str,
    pub default_assembly: &'static str,
}

const PACBIO_TITLE: &str = "PacBio HiFi sequencing";
const SEQUEL_II: &str = "Sequel II";
const REVIO: &str = "Revio";
const NOVASEQ_6000: &str = "Illumina NovaSeq 6000";
const SAGE_BLUE_PIPPIN: &str = "SAGE blue pippin";
const PIPPIN_HT: &str = "PippinHT size selection";

const fn pacbio_wgs(
    library_name: &'static str,
    title_fragment: &'static str,
    filetype: &'static str,
    assembly: &'static str,
) -> CategoryTemplate {
    CategoryTemplate {
        library_name,
        title_fragment,
        library_strategy: "WGS",
        library_source: "GENOMIC",
        library_selection: "size fractionation",
        library_layout: LibraryLayout::Single,
        platform: "PACBIO_SMRT",
        instrument_model: SEQUEL_II,
        design_description: SAGE_BLUE_PIPPIN,
        default_filetype: filetype,
        default_assembly: assembly,
    }
}

const fn illumina_paired(
    library_name: &'static str,
    title_fragment: &'static str,
    library_strategy: &'static str,
    library_selection: &'static str,
    design_description: &'static str,
) -> CategoryTemplate {
    CategoryTemplate {
        library_name,
        title_fragment,
        library_strategy,
        library_source: "GENOMIC",
        library_selection,
        library_layout: LibraryLayout::Paired,
        platform: "ILLUMINA",
        instrument_model: NOVASEQ_6000,
        design_description,
        default_filetype: "fastq",
        default_assembly: "",
    }
}

pub static FIVE_MC: CategoryTemplate =
    pacbio_wgs("PacBio_HiFi_5mC_bam", PACBIO_TITLE, "bam", "unaligned");

pub static READS: CategoryTemplate =
    pacbio_wgs("PacBio_reads", "PacBio sequencing", "bam", "unaligned");

pub static SUBREADS: CategoryTemplate =
    pacbio_wgs("PacBio_HiFi_subreads", PACBIO_TITLE, "bam", "unaligned");

pub static DEMULTIPLEX_BAM: CategoryTemplate =
    pacbio_wgs("PacBio_HiFi_demux_bam", PACBIO_TITLE, "bam", "unaligned");

pub static HIFI_BAM: CategoryTemplate = CategoryTemplate {
    instrument_model: REVIO,
    design_description: PIPPIN_HT,
    ..pacbio_wgs("PacBio_HiFi_bam", PACBIO_TITLE, "bam", "unaligned")
};

pub static HIFI_FASTQ: CategoryTemplate =
    pacbio_wgs("PacBio_HiFi_fastq", PACBIO_TITLE, "fastq", "");

pub static TEN_X: CategoryTemplate = illumina_paired(
    "10x",
    "whole genome sequencing with 10x linked reads",
    "WGS",
    "RANDOM",
    "10x manufacturer's protocol",
);

pub static ARIMA: CategoryTemplate = illumina_paired(
    "HiC",
    "Hi-C sequencing",
    "Hi-C",
    "Restriction Digest",
    "Arima Hi-C manufacturer's protocol",
);

pub static ILLUMINA: CategoryTemplate = illumina_paired(
    "Illumina",
    "whole genome shotgun sequencing with Illumina reads",
    "WGS",
    "RANDOM",
    "manufacturer's protocol",
);

pub static DOVETAIL: CategoryTemplate = illumina_paired(
    "HiC",
    "Hi-C sequencing",
    "Hi-C",
    "Restriction Digest",
    "Omni-C Dovetail manufacturer's protocol",
);

pub static ELEMENT: CategoryTemplate = illumina_paired(
    "HiC",
    "Hi-C sequencing",
    "Hi-C",
    "Restriction Digest",
    "Element Biosciences manufacturer's protocol",
);

pub static RNA_SEQ: CategoryTemplate = CategoryTemplate {
    library_name: "RNAseq",
    title_fragment: "RNA",
    library_strategy: "RNA-Seq",
    library_source: "TRANSCRIPTOMIC",
    library_selection: "PolyA",
    library_layout: LibraryLayout::Paired,
    platform: "ILLUMINA",
    instrument_model: NOVASEQ_6000,
    design_description: "RNAseq data generated with Illumina Stranded mRNA Prep",
    default_filetype: "fastq",
    default_assembly: "",
};

pub static ISO_SEQ: CategoryTemplate = CategoryTemplate {
    library_name: "isoseq",
    title_fragment: "Iso-Seq FLNC",
    library_strategy: "OTHER",
    library_source: "OTHER",
    library_selection: "cDNA_oligo_dT",
    library_layout: LibraryLayout::Single,
    platform: "PACBIO_SMRT",
    instrument_model: "Sequel IIe",
    design_description: "ISO-seq data generated with PacBio SMRTbell prep kit 3.0",
    default_filetype: "bam",
    default_assembly: "unaligned",
};

pub const DEFAULT_INSTRUMENT: &str = SEQUEL_II;

pub const DEFAULT_INSTRUMENTS: &[(&str, &str)] = &[
    ("m54306Ue", SEQUEL_II),
    ("m64330e", SEQUEL_II),
    ("m64334e", SEQUEL_II),
    ("m64055e", SEQUEL_II),
    ("m84091", REVIO),
];

/// Maps PacBio instrument serials (the movie-name prefix) to instrument models.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentTable {
    entries: BTreeMap<String, String>,
}

impl Default for InstrumentTable {
    fn default() -> Self {
        let entries = DEFAULT_INSTRUMENTS
            .iter()
            .map(|(serial, model)| (serial.to_string(), model.to_string()))
            .collect();
        Self { entries }
    }
}

impl InstrumentTable {
    /// Built-in table with `extra` layered on top; extra entries win.
    pub fn with_overrides<I>(extra: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut table = Self::default();
        table.entries.extend(extra);
        table
    }

    pub fn resolve(&self, serial: &str) -> &str {
        self.entries
            .get(serial)
            .map(String::as_str)
            .unwrap_or(DEFAULT_INSTRUMENT)
    }
}

pub fn design_description_for(instrument: &str) -> &'static str {
    if instrument == SEQUEL_II {
        SAGE_BLUE_PIPPIN
    } else {
        PIPPIN_HT
    }
}
