//! Datacenter directory: datacenter code -> geography.
//!
//! Loaded once before probing starts and never mutated afterwards, so probes
//! share it behind an `Arc` without locking.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One datacenter, as published by the locations endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    #[serde(rename = "iata")]
    pub code: String,
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lon")]
    pub longitude: f64,
    #[serde(rename = "cca2")]
    pub country: String,
    pub region: String,
    pub city: String,
}

#[derive(Debug, Clone, Default)]
pub struct Directory {
    entries: HashMap<String, DirectoryEntry>,
}

impl Directory {
    /// Later entries with the same code replace earlier ones.
    pub fn new(entries: impl IntoIterator<Item = DirectoryEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|entry| (entry.code.clone(), entry))
            .collect();
        Self { entries }
    }

    pub fn get(&self, code: &str) -> Option<&DirectoryEntry> {
        self.entries.get(code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<DirectoryEntry> for Directory {
    fn from_iter<I: IntoIterator<Item = DirectoryEntry>>(iter: I) -> Self {
        Self::new(iter)
    }
}
