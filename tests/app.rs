use std::sync::Mutex;

use assert_matches::assert_matches;
use camino::Utf8PathBuf;
use tempfile::TempDir;

use genomeark_sra_metadata::app::{App, SourceStatus};
use genomeark_sra_metadata::catalog::InstrumentTable;
use genomeark_sra_metadata::domain::{DataKind, SampleRequest};
use genomeark_sra_metadata::error::SraMetaError;
use genomeark_sra_metadata::output::read_records;
use genomeark_sra_metadata::storage::{MemoryStore, ObjectStore};

const GENOMIC: &str = "species/Taeniopygia_guttata/bTaeGut1/genomic_data/";
const TRANSCRIPTOMIC: &str = "species/Taeniopygia_guttata/bTaeGut1/transcriptomic_data/";

fn request() -> SampleRequest {
    SampleRequest::parse("SAMN12345678", "bTaeGut1", "Taeniopygia_guttata").unwrap()
}

fn app(keys: &[String]) -> App<MemoryStore> {
    App::new(
        MemoryStore::new(keys.iter().cloned()),
        InstrumentTable::default(),
    )
}

fn genomic(rest: &str) -> String {
    format!("{GENOMIC}{rest}")
}

fn transcriptomic(rest: &str) -> String {
    format!("{TRANSCRIPTOMIC}{rest}")
}

struct FailingStore;

impl ObjectStore for FailingStore {
    fn list_subprefixes(&self, _prefix: &str) -> Result<Vec<String>, SraMetaError> {
        Err(SraMetaError::StorageStatus {
            status: 403,
            message: "AccessDenied".to_string(),
        })
    }

    fn list_object_keys(&self, _prefix: &str) -> Result<Vec<String>, SraMetaError> {
        Err(SraMetaError::StorageHttp("connection reset".to_string()))
    }
}

/// Lists directories fine, then fails when asked for the files of one of them.
struct FlakyStore {
    inner: MemoryStore,
    listed: Mutex<Vec<String>>,
}

impl ObjectStore for FlakyStore {
    fn list_subprefixes(&self, prefix: &str) -> Result<Vec<String>, SraMetaError> {
        self.inner.list_subprefixes(prefix)
    }

    fn list_object_keys(&self, prefix: &str) -> Result<Vec<String>, SraMetaError> {
        self.listed.lock().unwrap().push(prefix.to_string());
        if prefix.ends_with("pacbio_hifi/") {
            return Err(SraMetaError::StorageHttp("timed out".to_string()));
        }
        self.inner.list_object_keys(prefix)
    }
}

#[test]
fn pacbio_hifi_bams_get_sequential_ids_and_revio() {
    let app = app(&[
        genomic("pacbio_hifi/m84091_230101_hifi_reads.bam"),
        genomic("pacbio_hifi/m84091_230101_hifi_reads.bc1001.bam"),
    ]);
    let report = app.genome_metadata(&request()).unwrap();
    assert_eq!(report.status, SourceStatus::Found);
    assert_eq!(report.records.len(), 2);

    let first = &report.records[&genomic("pacbio_hifi/m84091_230101_hifi_reads.bam")];
    assert_eq!(first.library_id, "bTaeGut1_PacBio_HiFi_bam_1");
    assert_eq!(first.instrument_model, "Revio");
    assert_eq!(first.design_description, "PippinHT size selection");
    assert_eq!(first.title, "Taeniopygia guttata PacBio HiFi sequencing");
    assert_eq!(first.biosample_accession, "SAMN12345678");
    assert_eq!(first.library_layout, "single");
    assert_eq!(first.filetype, "bam");
    assert_eq!(first.assembly, "unaligned");
    assert_eq!(
        first.filename,
        genomic("pacbio_hifi/m84091_230101_hifi_reads.bam")
    );
    assert_eq!(first.filename2, "");

    let second = &report.records[&genomic("pacbio_hifi/m84091_230101_hifi_reads.bc1001.bam")];
    assert_eq!(second.library_id, "bTaeGut1_PacBio_HiFi_bam_2");
}

#[test]
fn unknown_instrument_serial_falls_back_to_sequel_ii() {
    let app = app(&[genomic("pacbio_hifi/m99999_230101.subreads.bam")]);
    let report = app.genome_metadata(&request()).unwrap();
    let record = &report.records[&genomic("pacbio_hifi/m99999_230101.subreads.bam")];
    assert_eq!(record.library_id, "bTaeGut1_PacBio_HiFi_subreads_1");
    assert_eq!(record.instrument_model, "Sequel II");
    assert_eq!(record.design_description, "SAGE blue pippin");
}

#[test]
fn instrument_overrides_apply_to_new_serials() {
    let instruments = InstrumentTable::with_overrides([("m84200".to_string(), "Revio".to_string())]);
    let app = App::new(
        MemoryStore::new([genomic("pacbio_hifi/m84200_240501_hifi_reads.bam")]),
        instruments,
    );
    let report = app.genome_metadata(&request()).unwrap();
    let record = &report.records[&genomic("pacbio_hifi/m84200_240501_hifi_reads.bam")];
    assert_eq!(record.instrument_model, "Revio");
    assert_eq!(record.design_description, "PippinHT size selection");
}

#[test]
fn arima_pair_becomes_one_hic_record() {
    let app = app(&[
        genomic("arima/lib_S1_L001_R1_001.fastq.gz"),
        genomic("arima/lib_S1_L001_R2_001.fastq.gz"),
    ]);
    let report = app.genome_metadata(&request()).unwrap();
    assert_eq!(report.records.len(), 1);
    let record = &report.records[&genomic("arima/lib_S1_L001_R1_001.fastq.gz")];
    assert_eq!(record.library_id, "bTaeGut1_HiC_1");
    assert_eq!(record.library_layout, "paired");
    assert_eq!(record.library_strategy, "Hi-C");
    assert_eq!(record.platform, "ILLUMINA");
    assert_eq!(record.filetype, "fastq");
    assert_eq!(record.filename, genomic("arima/lib_S1_L001_R1_001.fastq.gz"));
    assert_eq!(record.filename2, genomic("arima/lib_S1_L001_R2_001.fastq.gz"));
    assert!(report.skipped.is_empty());
}

#[test]
fn element_shares_the_hic_counter_with_arima() {
    let app = app(&[
        genomic("arima/hic_R1.fastq.gz"),
        genomic("arima/hic_R2.fastq.gz"),
        genomic("element/hic_R1.fastq.gz"),
        genomic("element/hic_R2.fastq.gz"),
    ]);
    let report = app.genome_metadata(&request()).unwrap();
    assert_eq!(report.records.len(), 2);

    let arima = &report.records[&genomic("arima/hic_R1.fastq.gz")];
    let element = &report.records[&genomic("element/hic_R1.fastq.gz")];
    assert_eq!(arima.library_id, "bTaeGut1_HiC_1");
    assert_eq!(element.library_id, "bTaeGut1_HiC_2");
    assert_eq!(element.library_strategy, "Hi-C");
    assert_eq!(
        element.design_description,
        "Element Biosciences manufacturer's protocol"
    );
    assert_eq!(element.filename2, genomic("element/hic_R2.fastq.gz"));
}

#[test]
fn counters_run_one_to_k_per_library() {
    let mut keys = Vec::new();
    for lane in 1..=3 {
        keys.push(genomic(&format!("illumina/wgs_L00{lane}_R1.fastq.gz")));
        keys.push(genomic(&format!("illumina/wgs_L00{lane}_R2.fastq.gz")));
    }
    keys.push(genomic("10x/tenx_S1_R1_001.fastq.gz"));
    keys.push(genomic("10x/tenx_S1_R2_001.fastq.gz"));
    let report = app(&keys).genome_metadata(&request()).unwrap();

    let mut illumina = report
        .records
        .values()
        .filter(|record| record.library_id.contains("_Illumina_"))
        .map(|record| record.library_id.clone())
        .collect::<Vec<_>>();
    illumina.sort();
    assert_eq!(
        illumina,
        vec![
            "bTaeGut1_Illumina_1",
            "bTaeGut1_Illumina_2",
            "bTaeGut1_Illumina_3",
        ]
    );
    assert_eq!(
        report.records[&genomic("10x/tenx_S1_R1_001.fastq.gz")].library_id,
        "bTaeGut1_10x_1"
    );
}

#[test]
fn non_sequence_files_are_reported_as_skipped() {
    let app = app(&[
        genomic("pacbio_hifi/m64055e_210101.subreads.bam"),
        genomic("pacbio_hifi/m64055e_210101.subreads.bam.pbi"),
        genomic("pacbio_hifi/README.txt"),
        genomic("pacbio_hifi/m64055e_210101.ccs.bam"),
    ]);
    let report = app.genome_metadata(&request()).unwrap();
    assert_eq!(report.records.len(), 1);
    assert!(report.skipped.contains(&genomic("pacbio_hifi/README.txt")));
    assert!(
        report
            .skipped
            .contains(&genomic("pacbio_hifi/m64055e_210101.subreads.bam.pbi"))
    );
    assert!(
        report
            .skipped
            .contains(&genomic("pacbio_hifi/m64055e_210101.ccs.bam"))
    );
}

#[test]
fn unsupported_platform_produces_no_records() {
    let app = app(&[genomic("ont/run1.fastq.gz")]);
    let report = app.genome_metadata(&request()).unwrap();
    assert_eq!(report.status, SourceStatus::NoRecords);
    assert!(report.records.is_empty());
    assert_eq!(report.skipped, vec![genomic("ont/run1.fastq.gz")]);
}

#[test]
fn missing_sample_is_not_found_and_writes_nothing() {
    let temp = TempDir::new().unwrap();
    let output_dir = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
    let app = app(&[genomic("arima/other_R1.fastq.gz")]);

    let other = SampleRequest::parse("SAMN1", "mHomSap1", "Homo sapiens").unwrap();
    let outcome = app.generate(&other, DataKind::Genome, &output_dir).unwrap();
    assert_eq!(outcome.report.status, SourceStatus::NotFound);
    assert!(outcome.output.is_none());
    assert!(!output_dir.join("sequence_metadata").exists());
}

#[test]
fn missing_mate_aborts_the_sample() {
    let app = app(&[
        genomic("dovetail/omni_R1.fastq.gz"),
        genomic("dovetail/omni_R3.fastq.gz"),
    ]);
    let err = app.genome_metadata(&request()).unwrap_err();
    assert_matches!(err, SraMetaError::MissingMate { orphan } if orphan == "omni_R1.fastq.gz");
}

#[test]
fn storage_errors_propagate() {
    let app = App::new(FailingStore, InstrumentTable::default());
    let err = app.genome_metadata(&request()).unwrap_err();
    assert_matches!(err, SraMetaError::StorageStatus { status: 403, .. });
    assert!(err.is_storage());

    let store = FlakyStore {
        inner: MemoryStore::new([
            genomic("arima/a_R1.fastq.gz"),
            genomic("arima/a_R2.fastq.gz"),
            genomic("pacbio_hifi/m64055e_210101.subreads.bam"),
        ]),
        listed: Mutex::new(Vec::new()),
    };
    let app = App::new(&store, InstrumentTable::default());
    let err = app.genome_metadata(&request()).unwrap_err();
    assert_matches!(err, SraMetaError::StorageHttp(_));
    assert_eq!(
        *store.listed.lock().unwrap(),
        vec![genomic("arima/"), genomic("pacbio_hifi/")]
    );
}

#[test]
fn transcriptome_rna_seq_and_iso_seq() {
    let app = app(&[
        transcriptomic("BRAIN_tissue/illumina/rna_L001_R1.fastq.gz"),
        transcriptomic("BRAIN_tissue/illumina/rna_L001_R2.fastq.gz"),
        transcriptomic("liver/pacbio_hifi/m64334e_220101.flnc.bam"),
        transcriptomic("liver/pacbio_hifi/m64334e_220101.flnc.bam.pbi"),
    ]);
    let report = app.transcriptome_metadata(&request()).unwrap();
    assert_eq!(report.kind, DataKind::Transcriptome);
    assert_eq!(report.records.len(), 2);

    let rna = &report.records[&transcriptomic("BRAIN_tissue/illumina/rna_L001_R1.fastq.gz")];
    assert_eq!(rna.library_id, "bTaeGut1_RNAseq_BRAIN_tissue");
    assert_eq!(rna.title, "Taeniopygia guttata Brain tissue RNA");
    assert_eq!(rna.library_strategy, "RNA-Seq");
    assert_eq!(rna.library_source, "TRANSCRIPTOMIC");
    assert_eq!(
        rna.filename2,
        transcriptomic("BRAIN_tissue/illumina/rna_L001_R2.fastq.gz")
    );

    let iso = &report.records[&transcriptomic("liver/pacbio_hifi/m64334e_220101.flnc.bam")];
    assert_eq!(iso.library_id, "bTaeGut1_isoseq");
    assert_eq!(iso.title, "Taeniopygia guttata Liver Iso-Seq FLNC");
    assert_eq!(iso.instrument_model, "Sequel IIe");
    assert_eq!(
        iso.filename,
        transcriptomic("liver/pacbio_hifi/m64334e_220101.flnc.bam")
    );
    assert_eq!(
        report.skipped,
        vec![transcriptomic("liver/pacbio_hifi/m64334e_220101.flnc.bam.pbi")]
    );
}

#[test]
fn tissues_sharing_filenames_keep_separate_records() {
    let app = app(&[
        transcriptomic("brain/illumina/RNA_R1.fastq.gz"),
        transcriptomic("brain/illumina/RNA_R2.fastq.gz"),
        transcriptomic("liver/illumina/RNA_R1.fastq.gz"),
        transcriptomic("liver/illumina/RNA_R2.fastq.gz"),
        transcriptomic("brain/pacbio_hifi/flnc.bam"),
        transcriptomic("liver/pacbio_hifi/flnc.bam"),
    ]);
    let report = app.transcriptome_metadata(&request()).unwrap();
    assert_eq!(report.records.len(), 4);
    assert!(report.skipped.is_empty());

    assert_eq!(
        report.records[&transcriptomic("brain/illumina/RNA_R1.fastq.gz")].library_id,
        "bTaeGut1_RNAseq_brain"
    );
    assert_eq!(
        report.records[&transcriptomic("liver/illumina/RNA_R1.fastq.gz")].library_id,
        "bTaeGut1_RNAseq_liver"
    );

    // Iso-Seq has one library per sample, whatever the tissue.
    let brain = &report.records[&transcriptomic("brain/pacbio_hifi/flnc.bam")];
    let liver = &report.records[&transcriptomic("liver/pacbio_hifi/flnc.bam")];
    assert_eq!(brain.library_id, "bTaeGut1_isoseq");
    assert_eq!(liver.library_id, "bTaeGut1_isoseq");
    assert_eq!(brain.title, "Taeniopygia guttata Brain Iso-Seq FLNC");
    assert_eq!(liver.title, "Taeniopygia guttata Liver Iso-Seq FLNC");
}

#[test]
fn transcriptome_absent_is_not_found() {
    let app = app(&[genomic("arima/a_R1.fastq.gz"), genomic("arima/a_R2.fastq.gz")]);
    let report = app.transcriptome_metadata(&request()).unwrap();
    assert_eq!(report.status, SourceStatus::NotFound);
    assert!(report.records.is_empty());
}

#[test]
fn generate_writes_a_readable_sheet() {
    let temp = TempDir::new().unwrap();
    let output_dir = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
    let app = app(&[
        genomic("arima/lib_R1.fastq.gz"),
        genomic("arima/lib_R2.fastq.gz"),
        genomic("pacbio_hifi/m64055e_210101.subreads.bam"),
    ]);

    let outcome = app
        .generate(&request(), DataKind::Genome, &output_dir)
        .unwrap();
    let path = outcome.output.expect("sheet written");
    assert_eq!(
        path,
        output_dir.join("sequence_metadata/Taeniopygia_guttata_bTaeGut1_SRA_sequence_metadata.tsv")
    );

    let rows = read_records(&path).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].library_id, "bTaeGut1_HiC_1");
    assert_eq!(rows[1].library_id, "bTaeGut1_PacBio_HiFi_subreads_1");
    assert_eq!(rows[1].instrument_model, "Sequel II");
}
