use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum SraMetaError {
    #[error("invalid BioSample accession: {0}")]
    InvalidBiosample(String),

    #[error("invalid ToLID: {0}")]
    InvalidTolid(String),

    #[error("invalid species name: {0}")]
    InvalidSpecies(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("failed to read batch file {path}: {message}")]
    BatchRead { path: PathBuf, message: String },

    #[error("no reverse mate found for {orphan}")]
    #[diagnostic(help("paired platforms expect an R2 (or _2) file next to every R1 (or _1) file"))]
    MissingMate { orphan: String },

    #[error("storage request failed: {0}")]
    StorageHttp(String),

    #[error("storage returned status {status}: {message}")]
    StorageStatus { status: u16, message: String },

    #[error("failed to parse storage listing: {0}")]
    StorageParse(String),

    #[error("failed to write {path}: {message}")]
    OutputWrite { path: PathBuf, message: String },

    #[error("failed to read {path}: {message}")]
    OutputRead { path: PathBuf, message: String },

    #[error("{failed} of {total} samples failed")]
    BatchFailed { failed: usize, total: usize },
}

impl SraMetaError {
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            SraMetaError::StorageHttp(_)
                | SraMetaError::StorageStatus { .. }
                | SraMetaError::StorageParse(_)
        )
    }
}
