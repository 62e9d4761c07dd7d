use std::path::PathBuf;

use log::warn;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use toml::{Table, Value};

/// A TOML config section. A missing section falls back to `Default`; a
/// present one must deserialize cleanly.
pub trait Config: DeserializeOwned + Default {
    /// Name of the top-level table this config is read from.
    const SECTION: &'static str;

    fn from_section(section: Option<&Value>) -> Result<Self, toml::de::Error> {
        match section {
            Some(value) => value.clone().try_into(),
            None => {
                warn!("[{}] not found, using defaults", Self::SECTION);
                Ok(Self::default())
            }
        }
    }

    fn load(table: &Table) -> Result<Self, toml::de::Error> {
        Self::from_section(table.get(Self::SECTION))
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SimConfig {
    /// Trace file to replay; `-` reads stdin.
    pub trace: Option<PathBuf>,
    pub log_level: u64,
    pub stats_json: Option<PathBuf>,
    pub quiet: bool,
}

impl Config for SimConfig {
    const SECTION: &'static str = "sim";
}

impl SimConfig {
    /// `log_level` straight from the raw table, so the logger can be set up
    /// before any section is parsed.
    pub fn peek_log_level(table: &Table) -> Option<u64> {
        table
            .get(Self::SECTION)?
            .get("log_level")?
            .as_integer()
            .and_then(|level| u64::try_from(level).ok())
    }
}
