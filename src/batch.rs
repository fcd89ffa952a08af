use std::fs;
use std::path::Path;

use csv::ReaderBuilder;
use indexmap::IndexMap;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::{BiosampleAccession, SampleRequest};
use crate::error::SraMetaError;

#[derive(Debug, Deserialize)]
struct BatchRow {
    #[serde(rename = "BioSample", default)]
    biosample: String,
    #[serde(rename = "ToLID")]
    tolid: String,
    #[serde(rename = "Species")]
    species: String,
}

/// Reads a sample sheet with `BioSample`, `ToLID` and `Species` columns.
///
/// Rows without a BioSample, or with one that is not a BioSample accession,
/// are skipped. A repeated ToLID keeps its first position but takes the
/// values of its last row. A bad ToLID or species fails the whole sheet.
pub fn load_batch(path: &Path) -> Result<Vec<SampleRequest>, SraMetaError> {
    let batch_error = |message: String| SraMetaError::BatchRead {
        path: path.to_path_buf(),
        message,
    };
    let content = fs::read_to_string(path).map_err(|err| batch_error(err.to_string()))?;
    parse_batch(content.trim_start_matches('\u{feff}')).map_err(batch_error)
}

pub fn parse_batch(content: &str) -> Result<Vec<SampleRequest>, String> {
    let mut reader = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut samples = IndexMap::<String, SampleRequest>::new();
    for (index, row) in reader.deserialize::<BatchRow>().enumerate() {
        let line = index + 2;
        let row = row.map_err(|err| format!("line {line}: {err}"))?;
        if row.biosample.is_empty() {
            debug!(line, tolid = %row.tolid, "skipping row without BioSample");
            continue;
        }
        let biosample = match row.biosample.parse::<BiosampleAccession>() {
            Ok(biosample) => biosample,
            Err(err) => {
                warn!(line, tolid = %row.tolid, "{err}, skipping row");
                continue;
            }
        };
        let request = SampleRequest {
            biosample,
            tolid: row.tolid.parse().map_err(|err| format!("line {line}: {err}"))?,
            species: row
                .species
                .parse()
                .map_err(|err| format!("line {line}: {err}"))?,
        };
        samples.insert(request.tolid.to_string(), request);
    }
    Ok(samples.into_values().collect())
}
