//! On-disk state model.
//!
//! State is a single JSON document per workspace: a serial number, named
//! output values, and a flat list of resource records. A missing file reads
//! as the empty state so fresh working directories behave like initialized
//! ones with zero resources.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// One managed resource in the state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceRecord {
    /// Fully qualified address, e.g. `aws_instance.web`.
    pub address: String,
    /// Provider short name, e.g. `aws`.
    pub provider: String,
    /// Marked for forced recreation on the next apply.
    #[serde(default)]
    pub tainted: bool,
    /// Opaque provider attributes.
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl ResourceRecord {
    /// Provider short name derived from an address (`aws_instance.web` -> `aws`).
    pub fn provider_from_address(address: &str) -> String {
        let type_name = address.split('.').next().unwrap_or(address);
        type_name
            .split('_')
            .next()
            .unwrap_or(type_name)
            .to_string()
    }
}

/// The full state document for one workspace.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateFile {
    /// Monotonic counter bumped on every write.
    pub serial: u64,
    #[serde(default)]
    pub outputs: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub resources: Vec<ResourceRecord>,
}

impl StateFile {
    /// Load state from `path`. A missing file is the empty state.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read state {}", path.display()))
            }
        };
        serde_json::from_str(&raw)
            .with_context(|| format!("state file {} is not valid JSON", path.display()))
    }

    /// Write state to `path`, bumping the serial, creating parent dirs as needed.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.serial += 1;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create state dir {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(self).context("failed to serialize state")?;
        std::fs::write(path, raw)
            .with_context(|| format!("failed to write state {}", path.display()))
    }

    pub fn find(&self, address: &str) -> Option<&ResourceRecord> {
        self.resources.iter().find(|r| r.address == address)
    }

    pub fn find_mut(&mut self, address: &str) -> Option<&mut ResourceRecord> {
        self.resources.iter_mut().find(|r| r.address == address)
    }

    /// Remove the resource at `address`, returning it if present.
    pub fn remove(&mut self, address: &str) -> Option<ResourceRecord> {
        let idx = self.resources.iter().position(|r| r.address == address)?;
        Some(self.resources.remove(idx))
    }

    /// Distinct provider names across all resources, sorted.
    pub fn providers(&self) -> Vec<String> {
        let mut providers: Vec<String> =
            self.resources.iter().map(|r| r.provider.clone()).collect();
        providers.sort();
        providers.dedup();
        providers
    }
}
