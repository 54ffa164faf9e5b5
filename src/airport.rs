//! Airport reference lookup.
//!
//! The reference table is a static keyed lookup owned by the caller; the core
//! only needs the scale latitude and the airport position.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CorridorError, Result};

/// Position and elevation of one airport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirportReference {
    pub code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation_ft: f64,
}

/// Source of airport reference records.
pub trait AirportLookup: Send + Sync {
    fn lookup(&self, code: &str) -> Option<AirportReference>;

    /// Resolve `code`, failing with `ExternalLookupMissing` when absent.
    fn resolve(&self, code: &str) -> Result<AirportReference> {
        self.lookup(code)
            .ok_or_else(|| CorridorError::ExternalLookupMissing {
                code: code.to_string(),
            })
    }
}

/// In-memory airport table keyed by code.
#[derive(Debug, Clone, Default)]
pub struct AirportTable {
    airports: HashMap<String, AirportReference>,
}

impl AirportTable {
    pub fn new(airports: impl IntoIterator<Item = AirportReference>) -> Self {
        Self {
            airports: airports.into_iter().map(|a| (a.code.clone(), a)).collect(),
        }
    }

    /// Load a JSON array of airport records.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn from_json_str(data: &str) -> Result<Self> {
        let airports: Vec<AirportReference> = serde_json::from_str(data)?;
        Ok(Self::new(airports))
    }

    pub fn len(&self) -> usize {
        self.airports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }
}

impl AirportLookup for AirportTable {
    fn lookup(&self, code: &str) -> Option<AirportReference> {
        self.airports.get(code).cloned()
    }
}
