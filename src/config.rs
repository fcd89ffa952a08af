use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::catalog::InstrumentTable;
use crate::error::SraMetaError;
use crate::output::DEFAULT_OUTPUT_DIR;
use crate::storage::DEFAULT_BUCKET;

pub const DEFAULT_CONFIG_FILE: &str = "gark-sra.json";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub output_dir: Option<String>,
    /// Extra PacBio instrument serials, e.g. `{"m84200": "Revio"}`.
    #[serde(default)]
    pub instruments: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub bucket: String,
    pub endpoint: Option<String>,
    pub output_dir: Utf8PathBuf,
    pub instruments: InstrumentTable,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        ConfigLoader::resolve_config(Config::default())
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads `path`, or `gark-sra.json` in the current directory when no
    /// path is given. Only an explicitly requested file must exist.
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, SraMetaError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Ok(ResolvedConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| SraMetaError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| SraMetaError::ConfigParse(err.to_string()))?;

        Ok(Self::resolve_config(config))
    }

    pub fn resolve_config(config: Config) -> ResolvedConfig {
        let bucket = config
            .bucket
            .filter(|bucket| !bucket.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BUCKET.to_string());
        let output_dir = config
            .output_dir
            .map(Utf8PathBuf::from)
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_OUTPUT_DIR));

        ResolvedConfig {
            bucket,
            endpoint: config.endpoint,
            output_dir,
            instruments: InstrumentTable::with_overrides(config.instruments),
        }
    }
}
