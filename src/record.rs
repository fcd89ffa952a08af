use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::catalog::{Category, CategoryTemplate, InstrumentTable, design_description_for};
use crate::classify::instrument_serial;
use crate::domain::SampleRequest;
use crate::pairing::MatePair;

/// Column order of the SRA metadata sheet.
pub const FIELD_ORDER: [&str; 17] = [
    "biosample_accession",
    "library_ID",
    "title",
    "library_strategy",
    "library_source",
    "library_selection",
    "library_layout",
    "platform",
    "instrument_model",
    "design_description",
    "filetype",
    "filename",
    "filename2",
    "filename3",
    "filename4",
    "assembly",
    "fasta_file",
];

/// One row of the SRA metadata sheet. Field order matches [`FIELD_ORDER`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub biosample_accession: String,
    #[serde(rename = "library_ID")]
    pub library_id: String,
    pub title: String,
    pub library_strategy: String,
    pub library_source: String,
    pub library_selection: String,
    pub library_layout: String,
    pub platform: String,
    pub instrument_model: String,
    pub design_description: String,
    pub filetype: String,
    pub filename: String,
    pub filename2: String,
    pub filename3: String,
    pub filename4: String,
    pub assembly: String,
    pub fasta_file: String,
}

/// Records keyed by the full bucket key of their group's primary file, in
/// insertion order.
pub type RecordSet = IndexMap<String, OutputRecord>;

/// Per-library running counters. Categories sharing a library name (the
/// Hi-C providers) share a counter so their library IDs never collide.
#[derive(Debug, Default)]
pub struct LibraryCounters {
    next: HashMap<&'static str, usize>,
}

impl LibraryCounters {
    pub fn next(&mut self, template: &CategoryTemplate) -> usize {
        let slot = self.next.entry(template.library_name).or_insert(1);
        let value = *slot;
        *slot += 1;
        value
    }
}

/// One sequencing unit: a single file or a forward/reverse mate pair, with
/// the bucket prefix it was listed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileGroup {
    pub subdir: String,
    pub primary: String,
    pub mate: Option<String>,
}

impl FileGroup {
    pub fn single(subdir: &str, filename: &str) -> Self {
        Self {
            subdir: subdir.to_string(),
            primary: filename.to_string(),
            mate: None,
        }
    }

    pub fn paired(subdir: &str, pair: MatePair) -> Self {
        Self {
            subdir: subdir.to_string(),
            primary: pair.forward,
            mate: Some(pair.reverse),
        }
    }

    /// Key of the group's record in a [`RecordSet`].
    pub fn key(&self) -> String {
        self.primary_path()
    }

    pub fn primary_path(&self) -> String {
        format!("{}{}", self.subdir, self.primary)
    }

    pub fn mate_path(&self) -> String {
        self.mate
            .as_ref()
            .map(|mate| format!("{}{mate}", self.subdir))
            .unwrap_or_default()
    }
}

/// `lung_tissue` -> `Lung tissue`.
pub fn tissue_label(tissue: &str) -> String {
    let spaced = tissue.replace('_', " ").to_lowercase();
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Builds output records for one sample, one data kind at a time.
pub struct RecordAssembler<'a> {
    request: &'a SampleRequest,
    instruments: &'a InstrumentTable,
    counters: LibraryCounters,
}

impl<'a> RecordAssembler<'a> {
    pub fn new(request: &'a SampleRequest, instruments: &'a InstrumentTable) -> Self {
        Self {
            request,
            instruments,
            counters: LibraryCounters::default(),
        }
    }

    /// Mate-paired genomic record (Hi-C, 10x, Illumina WGS).
    pub fn paired_genomic(&mut self, category: Category, group: &FileGroup) -> OutputRecord {
        let template = category.template();
        let counter = self.counters.next(template);
        self.base_record(
            template,
            format!("{}_{}_{}", self.request.tolid, template.library_name, counter),
            self.genome_title(template),
            group,
        )
    }

    /// Single-file PacBio HiFi genomic record. The instrument is resolved
    /// from the movie-name prefix of the file.
    pub fn pacbio_genomic(&mut self, category: Category, group: &FileGroup) -> OutputRecord {
        let template = category.template();
        let counter = self.counters.next(template);
        let instrument = self.instruments.resolve(instrument_serial(&group.primary));
        let mut record = self.base_record(
            template,
            format!("{}_{}_{}", self.request.tolid, template.library_name, counter),
            self.genome_title(template),
            group,
        );
        record.instrument_model = instrument.to_string();
        record.design_description = design_description_for(instrument).to_string();
        record
    }

    /// Illumina RNA-Seq record; the tissue stands in for a counter.
    pub fn rna_seq(&self, tissue: &str, group: &FileGroup) -> OutputRecord {
        let template = Category::RnaSeq.template();
        self.base_record(
            template,
            format!("{}_{}_{tissue}", self.request.tolid, template.library_name),
            self.tissue_title(template, tissue),
            group,
        )
    }

    /// Iso-Seq FLNC record. One library per sample, so no discriminator.
    pub fn iso_seq(&self, tissue: &str, group: &FileGroup) -> OutputRecord {
        let template = Category::IsoSeq.template();
        self.base_record(
            template,
            format!("{}_{}", self.request.tolid, template.library_name),
            self.tissue_title(template, tissue),
            group,
        )
    }

    fn genome_title(&self, template: &CategoryTemplate) -> String {
        format!(
            "{} {}",
            self.request.species.display_name(),
            template.title_fragment
        )
    }

    fn tissue_title(&self, template: &CategoryTemplate, tissue: &str) -> String {
        format!(
            "{} {} {}",
            self.request.species.display_name(),
            tissue_label(tissue),
            template.title_fragment
        )
    }

    fn base_record(
        &self,
        template: &CategoryTemplate,
        library_id: String,
        title: String,
        group: &FileGroup,
    ) -> OutputRecord {
        OutputRecord {
            biosample_accession: self.request.biosample.to_string(),
            library_id,
            title,
            library_strategy: template.library_strategy.to_string(),
            library_source: template.library_source.to_string(),
            library_selection: template.library_selection.to_string(),
            library_layout: template.library_layout.to_string(),
            platform: template.platform.to_string(),
            instrument_model: template.instrument_model.to_string(),
            design_description: template.design_description.to_string(),
            filetype: template.default_filetype.to_string(),
            filename: group.primary_path(),
            filename2: group.mate_path(),
            filename3: String::new(),
            filename4: String::new(),
            assembly: template.default_assembly.to_string(),
            fasta_file: String::new(),
        }
    }
}
