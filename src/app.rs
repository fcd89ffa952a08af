use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::{Category, InstrumentTable};
use crate::classify::{
    GenomicRoute, basename, classify_genomic, genomic_route, is_isoseq_bam, is_sequence_file,
    prefix_dir_name, transcriptomic_route,
};
use crate::domain::{DataKind, SampleRequest};
use crate::error::SraMetaError;
use crate::output::{output_path, write_records};
use crate::pairing::resolve_pairs;
use crate::record::{FileGroup, OutputRecord, RecordAssembler, RecordSet};
use crate::storage::ObjectStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    /// Nothing under the sample's data prefix.
    NotFound,
    /// Data directories exist but no file could be classified.
    NoRecords,
    Found,
}

impl SourceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceStatus::NotFound => "not_found",
            SourceStatus::NoRecords => "no_records",
            SourceStatus::Found => "found",
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetadataReport {
    pub kind: DataKind,
    pub status: SourceStatus,
    pub records: RecordSet,
    /// Keys that were listed but produced no record.
    pub skipped: Vec<String>,
}

impl MetadataReport {
    fn new(kind: DataKind) -> Self {
        Self {
            kind,
            status: SourceStatus::NotFound,
            records: RecordSet::new(),
            skipped: Vec::new(),
        }
    }

    fn insert(&mut self, group: &FileGroup, record: OutputRecord) {
        let key = group.key();
        if let Some(previous) = self.records.insert(key.clone(), record) {
            debug!(
                key = %key,
                replaced = %previous.filename,
                "object listed twice, keeping latest record"
            );
        }
    }

    fn skip(&mut self, subdir: &str, filename: &str) {
        self.skipped.push(format!("{subdir}{filename}"));
    }

    fn finish(&mut self) {
        self.status = if self.records.is_empty() {
            SourceStatus::NoRecords
        } else {
            SourceStatus::Found
        };
    }
}

#[derive(Debug, Clone)]
pub struct GenerateOutcome {
    pub report: MetadataReport,
    pub output: Option<Utf8PathBuf>,
}

/// Walks a sample's bucket prefixes and turns the listed files into SRA
/// metadata records.
pub struct App<S: ObjectStore> {
    store: S,
    instruments: InstrumentTable,
}

impl<S: ObjectStore> App<S> {
    pub fn new(store: S, instruments: InstrumentTable) -> Self {
        Self { store, instruments }
    }

    pub fn metadata(
        &self,
        request: &SampleRequest,
        kind: DataKind,
    ) -> Result<MetadataReport, SraMetaError> {
        match kind {
            DataKind::Genome => self.genome_metadata(request),
            DataKind::Transcriptome => self.transcriptome_metadata(request),
        }
    }

    pub fn genome_metadata(&self, request: &SampleRequest) -> Result<MetadataReport, SraMetaError> {
        let mut report = MetadataReport::new(DataKind::Genome);
        let prefix = request.storage_prefix(DataKind::Genome);
        let subdirs = self.store.list_subprefixes(&prefix)?;
        if subdirs.is_empty() {
            warn!(
                "Genome sequence data for {}, {} not found in GenomeArk",
                request.species, request.tolid
            );
            return Ok(report);
        }

        let mut assembler = RecordAssembler::new(request, &self.instruments);
        for subdir in &subdirs {
            let platform = prefix_dir_name(subdir);
            let mut filenames = Vec::new();
            for key in self.store.list_object_keys(subdir)? {
                let filename = basename(&key);
                if is_sequence_file(filename) {
                    filenames.push(filename.to_string());
                } else {
                    report.skip(subdir, filename);
                }
            }
            debug!(platform, files = filenames.len(), "classifying genomic directory");

            match genomic_route(platform) {
                GenomicRoute::Paired(category) => {
                    let resolution = resolve_pairs(filenames)?;
                    debug!(
                        platform,
                        category = %category,
                        pairs = resolution.pairs.len(),
                        "resolved mate pairs"
                    );
                    for name in &resolution.discarded {
                        report.skip(subdir, name);
                    }
                    for pair in resolution.pairs {
                        let group = FileGroup::paired(subdir, pair);
                        let record = assembler.paired_genomic(category, &group);
                        report.insert(&group, record);
                    }
                }
                GenomicRoute::PacbioHifi => {
                    for filename in &filenames {
                        let Some(category) = classify_genomic(filename, platform) else {
                            report.skip(subdir, filename);
                            continue;
                        };
                        debug!(filename = %filename, category = %category, "classified file");
                        let group = FileGroup::single(subdir, filename);
                        let record = assembler.pacbio_genomic(category, &group);
                        report.insert(&group, record);
                    }
                }
                GenomicRoute::Unsupported => {
                    debug!(platform, "no metadata template for platform directory");
                    for filename in &filenames {
                        report.skip(subdir, filename);
                    }
                }
            }
        }

        report.finish();
        log_report(request, &report);
        Ok(report)
    }

    pub fn transcriptome_metadata(
        &self,
        request: &SampleRequest,
    ) -> Result<MetadataReport, SraMetaError> {
        let mut report = MetadataReport::new(DataKind::Transcriptome);
        let prefix = request.storage_prefix(DataKind::Transcriptome);
        let tissue_dirs = self.store.list_subprefixes(&prefix)?;
        if tissue_dirs.is_empty() {
            warn!(
                "Transcriptome data for {}, {} not found in GenomeArk",
                request.species, request.tolid
            );
            return Ok(report);
        }

        let assembler = RecordAssembler::new(request, &self.instruments);
        for tissue_dir in &tissue_dirs {
            let tissue = prefix_dir_name(tissue_dir);
            for platform_dir in self.store.list_subprefixes(tissue_dir)? {
                let platform = prefix_dir_name(&platform_dir);
                let filenames = self
                    .store
                    .list_object_keys(&platform_dir)?
                    .iter()
                    .map(|key| basename(key).to_string())
                    .collect::<Vec<_>>();
                debug!(
                    tissue,
                    platform,
                    files = filenames.len(),
                    "classifying transcriptomic directory"
                );

                match transcriptomic_route(platform) {
                    Some(Category::RnaSeq) => {
                        let resolution = resolve_pairs(filenames)?;
                        for name in &resolution.discarded {
                            report.skip(&platform_dir, name);
                        }
                        for pair in resolution.pairs {
                            let group = FileGroup::paired(&platform_dir, pair);
                            let record = assembler.rna_seq(tissue, &group);
                            report.insert(&group, record);
                        }
                    }
                    Some(Category::IsoSeq) => {
                        for filename in &filenames {
                            if !is_isoseq_bam(filename) {
                                report.skip(&platform_dir, filename);
                                continue;
                            }
                            let group = FileGroup::single(&platform_dir, filename);
                            let record = assembler.iso_seq(tissue, &group);
                            report.insert(&group, record);
                        }
                    }
                    _ => {
                        debug!(tissue, platform, "no metadata template for platform directory");
                        for filename in &filenames {
                            report.skip(&platform_dir, filename);
                        }
                    }
                }
            }
        }

        report.finish();
        log_report(request, &report);
        Ok(report)
    }

    /// Builds the metadata for one sample and writes it under `output_dir`.
    /// Nothing is written when no record was produced.
    pub fn generate(
        &self,
        request: &SampleRequest,
        kind: DataKind,
        output_dir: &Utf8Path,
    ) -> Result<GenerateOutcome, SraMetaError> {
        let report = self.metadata(request, kind)?;
        if report.records.is_empty() {
            return Ok(GenerateOutcome {
                report,
                output: None,
            });
        }

        let path = output_path(output_dir, request, kind);
        write_records(&report.records, &path)?;
        info!("Metadata saved to {path}");
        Ok(GenerateOutcome {
            report,
            output: Some(path),
        })
    }
}

fn log_report(request: &SampleRequest, report: &MetadataReport) {
    match report.status {
        SourceStatus::NoRecords => warn!(
            tolid = %request.tolid,
            kind = %report.kind,
            skipped = report.skipped.len(),
            "data found but no file could be classified"
        ),
        _ => info!(
            tolid = %request.tolid,
            kind = %report.kind,
            records = report.records.len(),
            skipped = report.skipped.len(),
            "classified sample"
        ),
    }
}
