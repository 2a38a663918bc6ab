//! Change detection and per-asset cache sidecars.
//!
//! Every asset gets a composite hash combining the generator and template
//! versions, the resolved class name and the input content hash. The last
//! successful write persists that hash (plus identity and output paths)
//! in a small JSON sidecar next to the manifest; the next run compares
//! against it to decide whether a write is needed at all.

use crate::asset::OutputPaths;
use crate::constants::{GENERATOR_VERSION, TEMPLATE_VERSION};
use crate::error::{Error, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The write decision for one asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteDecision {
    /// Hashes differ, the record is missing, or an output file is gone
    Update,
    /// Everything matches; files are left byte-for-byte as they are
    Skip,
    /// The force override bypassed change detection
    Force,
}

impl std::fmt::Display for WriteDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            WriteDecision::Update => "update",
            WriteDecision::Skip => "skip",
            WriteDecision::Force => "force",
        };
        write!(f, "{label}")
    }
}

/// Outcome of change detection for one asset.
#[derive(Debug, Clone)]
pub struct Decision {
    pub write: WriteDecision,
    pub hash_changed: bool,
    pub composite_hash: String,
    pub previous_composite: Option<String>,
}

impl Decision {
    pub fn should_write(&self) -> bool {
        !matches!(self.write, WriteDecision::Skip)
    }
}

/// Per-asset persisted cache state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheRecord {
    pub asset: String,
    pub source_path: PathBuf,
    pub input_hash: String,
    pub composite_hash: String,
    pub generator_version: String,
    pub template_version: String,
    pub outputs: OutputPaths,
}

/// SHA-256 of the raw file bytes. Hashing the bytes rather than the
/// parsed model means whitespace-only edits also invalidate the cache.
pub fn hash_file(path: &Path) -> Result<String> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Composite cache-invalidation key: generator version, template version,
/// resolved class name and input hash, concatenated in that order.
pub fn composite_hash(class_name: &str, input_hash: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!(
        "{GENERATOR_VERSION}|{TEMPLATE_VERSION}|{class_name}|{input_hash}"
    ));
    format!("{:x}", hasher.finalize())
}

/// Sidecar location for an asset, next to the manifest.
pub fn sidecar_path(cache_dir: &Path, file_basename: &str) -> PathBuf {
    cache_dir.join(format!("{file_basename}.generated.hash"))
}

/// Loads a sidecar record. A missing or unparseable sidecar is a cache
/// miss, never an error.
pub fn load_record(path: &Path) -> Option<CacheRecord> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(_) => return None,
    };
    match serde_json::from_str(&contents) {
        Ok(record) => Some(record),
        Err(err) => {
            warn!(
                "Discarding corrupt cache sidecar {}: {}",
                path.display(),
                err
            );
            None
        }
    }
}

/// Persists a sidecar record. Only called on successful non-dry-run
/// writes.
pub fn store_record(path: &Path, record: &CacheRecord) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let contents = serde_json::to_string_pretty(record)
        .map_err(|err| Error::Manifest(format!("Unable to serialize cache sidecar: {err}")))?;
    fs::write(path, contents + "\n")?;
    Ok(())
}

/// Classifies an asset as requiring a write, eligible to skip, or forced.
pub fn decide(
    record: Option<&CacheRecord>,
    outputs: &OutputPaths,
    composite: &str,
    force: bool,
) -> Decision {
    let previous_composite = record.map(|record| record.composite_hash.clone());
    let hash_changed = previous_composite.as_deref() != Some(composite);

    let write = if force {
        WriteDecision::Force
    } else if record.is_none() || hash_changed || !outputs.all_exist() {
        WriteDecision::Update
    } else {
        WriteDecision::Skip
    };
    debug!(
        "Decision {write} (hash_changed={hash_changed}, outputs_exist={})",
        outputs.all_exist()
    );

    Decision {
        write,
        hash_changed,
        composite_hash: composite.to_string(),
        previous_composite,
    }
}
