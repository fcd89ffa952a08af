use std::fs;
use std::io::{self, Write};

use camino::{Utf8Path, Utf8PathBuf};
use csv::{QuoteStyle, ReaderBuilder, WriterBuilder};
use serde::Serialize;

use crate::domain::{DataKind, SampleRequest};
use crate::error::SraMetaError;
use crate::record::{FIELD_ORDER, OutputRecord, RecordSet};

pub const DEFAULT_OUTPUT_DIR: &str = "submission_metadata";

/// `{output_dir}/sequence_metadata/Homo_sapiens_mHomSap1_SRA_sequence_metadata.tsv`
pub fn output_path(output_dir: &Utf8Path, request: &SampleRequest, kind: DataKind) -> Utf8PathBuf {
    output_dir.join(kind.output_dir()).join(format!(
        "{}_{}_{}",
        request.species.path_name(),
        request.tolid,
        kind.output_suffix()
    ))
}

fn write_error(path: &Utf8Path, err: impl ToString) -> SraMetaError {
    SraMetaError::OutputWrite {
        path: path.as_std_path().to_path_buf(),
        message: err.to_string(),
    }
}

/// Writes the tab-delimited metadata sheet. The file is staged next to its
/// destination and renamed into place, so a failure never leaves a partial
/// sheet behind.
pub fn write_records(records: &RecordSet, path: &Utf8Path) -> Result<(), SraMetaError> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    fs::create_dir_all(parent.as_std_path()).map_err(|err| write_error(path, err))?;

    let mut temp = tempfile::Builder::new()
        .prefix(".gark-sra")
        .suffix(".tsv.tmp")
        .tempfile_in(parent.as_std_path())
        .map_err(|err| write_error(path, err))?;
    {
        let mut writer = WriterBuilder::new()
            .delimiter(b'\t')
            .quote_style(QuoteStyle::Never)
            .has_headers(false)
            .from_writer(&mut temp);
        writer
            .write_record(FIELD_ORDER)
            .map_err(|err| write_error(path, err))?;
        for record in records.values() {
            writer
                .serialize(record)
                .map_err(|err| write_error(path, err))?;
        }
        writer.flush().map_err(|err| write_error(path, err))?;
    }
    temp.persist(path.as_std_path())
        .map_err(|err| write_error(path, err))?;
    Ok(())
}

/// Reads a sheet written by [`write_records`].
pub fn read_records(path: &Utf8Path) -> Result<Vec<OutputRecord>, SraMetaError> {
    let read_error = |err: &dyn ToString| SraMetaError::OutputRead {
        path: path.as_std_path().to_path_buf(),
        message: err.to_string(),
    };
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .has_headers(true)
        .from_path(path.as_std_path())
        .map_err(|err| read_error(&err))?;

    let headers = reader.headers().map_err(|err| read_error(&err))?;
    if !headers.iter().eq(FIELD_ORDER) {
        return Err(read_error(&"unexpected header row"));
    }

    reader
        .deserialize::<OutputRecord>()
        .map(|row| row.map_err(|err| read_error(&err)))
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub samples: Vec<SampleSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SampleSummary {
    pub tolid: String,
    pub species: String,
    pub kind: DataKind,
    pub status: String,
    pub records: usize,
    pub skipped: usize,
    pub output: Option<String>,
    pub error: Option<String>,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_summary(summary: &RunSummary) -> io::Result<()> {
        Self::print_json(summary)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}
