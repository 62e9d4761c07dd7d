use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CacheError;

/// What a trace reference does, which decides the L1 it is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessKind {
    Instruction,
    DataLoad,
    DataStore,
}

impl AccessKind {
    pub fn is_data(self) -> bool {
        matches!(self, Self::DataLoad | Self::DataStore)
    }

    pub fn l1(self) -> LevelId {
        match self {
            Self::Instruction => LevelId::ICache,
            Self::DataLoad | Self::DataStore => LevelId::DCache,
        }
    }

    pub fn short(self) -> char {
        match self {
            Self::Instruction => 'I',
            Self::DataLoad => 'L',
            Self::DataStore => 'S',
        }
    }
}

impl FromStr for AccessKind {
    type Err = CacheError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "i" | "instr" | "instruction" => Ok(Self::Instruction),
            "l" | "load" => Ok(Self::DataLoad),
            "s" | "store" => Ok(Self::DataStore),
            _ => Err(CacheError::InvalidReference(value.to_string())),
        }
    }
}

impl TryFrom<char> for AccessKind {
    type Error = CacheError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value.to_ascii_uppercase() {
            'I' => Ok(Self::Instruction),
            'L' => Ok(Self::DataLoad),
            'S' => Ok(Self::DataStore),
            _ => Err(CacheError::InvalidReference(value.to_string())),
        }
    }
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LevelId {
    #[serde(rename = "icache")]
    ICache,
    #[serde(rename = "dcache")]
    DCache,
    #[serde(rename = "l2cache")]
    L2Cache,
}

impl LevelId {
    pub const ALL: [LevelId; 3] = [LevelId::ICache, LevelId::DCache, LevelId::L2Cache];

    pub fn index(self) -> usize {
        match self {
            Self::ICache => 0,
            Self::DCache => 1,
            Self::L2Cache => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::ICache => "ICACHE",
            Self::DCache => "DCACHE",
            Self::L2Cache => "L2CACHE",
        }
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
