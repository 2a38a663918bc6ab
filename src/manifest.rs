//! Run manifest: the structured report of every asset's processing
//! outcome, serialized to JSON once per run.

use crate::asset::{AttributeSetAsset, OutputPaths};
use crate::cache::{Decision, WriteDecision};
use crate::config::GeneratorConfig;
use crate::error::{Error, Result};
use crate::preserve::RegionOutcome;
use indexmap::IndexMap;
use serde::Serialize;
use std::path::PathBuf;

/// Write status as reported in the manifest; extends the cache decision
/// with the per-asset failure status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteStatus {
    Update,
    Skip,
    Force,
    Failed,
}

impl From<WriteDecision> for WriteStatus {
    fn from(decision: WriteDecision) -> Self {
        match decision {
            WriteDecision::Update => WriteStatus::Update,
            WriteDecision::Skip => WriteStatus::Skip,
            WriteDecision::Force => WriteStatus::Force,
        }
    }
}

impl std::fmt::Display for WriteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            WriteStatus::Update => "update",
            WriteStatus::Skip => "skip",
            WriteStatus::Force => "force",
            WriteStatus::Failed => "failed",
        };
        write!(f, "{label}")
    }
}

/// The effective override flags of a run.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOptions {
    pub force: bool,
    pub dry_run: bool,
    pub no_preserve: bool,
}

impl From<&GeneratorConfig> for RunOptions {
    fn from(config: &GeneratorConfig) -> Self {
        Self {
            force: config.force,
            dry_run: config.dry_run,
            no_preserve: config.no_preserve,
        }
    }
}

/// The three hashes reported per asset.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HashReport {
    pub input: String,
    pub composite: String,
    pub previous_composite: Option<String>,
}

/// Status block of one manifest entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub write: WriteStatus,
    pub dry_run: bool,
    pub hash_changed: bool,
    pub writes_performed: bool,
}

/// One attribute as echoed into the manifest.
#[derive(Debug, Clone, Serialize)]
pub struct AttributeReport {
    pub name: String,
    pub metadata: IndexMap<String, serde_json::Value>,
    pub category: String,
}

/// One processed (or failed) asset.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub input: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs: Option<OutputPaths>,
    pub attributes: Vec<AttributeReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_api: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hashes: Option<HashReport>,
    pub status: StatusReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_sidecar: Option<PathBuf>,
    pub preserve_regions: IndexMap<String, IndexMap<String, RegionOutcome>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ManifestEntry {
    /// Entry for an asset that made it through the pipeline.
    #[allow(clippy::too_many_arguments)]
    pub fn processed(
        asset: &AttributeSetAsset,
        input_hash: String,
        outputs: OutputPaths,
        decision: &Decision,
        dry_run: bool,
        writes_performed: bool,
        cache_sidecar: PathBuf,
        preserve_regions: IndexMap<String, IndexMap<String, RegionOutcome>>,
    ) -> Self {
        Self {
            input: asset.source_path.clone(),
            input_hash: Some(input_hash.clone()),
            outputs: Some(outputs),
            attributes: asset
                .attributes
                .iter()
                .map(|attribute| AttributeReport {
                    name: attribute.name.clone(),
                    metadata: attribute.metadata.to_summary(),
                    category: attribute.category.clone(),
                })
                .collect(),
            class_name: Some(asset.class_name.clone()),
            module_api: Some(asset.module_api.clone()),
            hashes: Some(HashReport {
                input: input_hash,
                composite: decision.composite_hash.clone(),
                previous_composite: decision.previous_composite.clone(),
            }),
            status: StatusReport {
                write: decision.write.into(),
                dry_run,
                hash_changed: decision.hash_changed,
                writes_performed,
            },
            cache_sidecar: Some(cache_sidecar),
            preserve_regions,
            error: None,
        }
    }

    /// Entry for an asset whose parsing or I/O failed; the failure never
    /// aborts the rest of the run.
    pub fn failed(input: PathBuf, error: String, dry_run: bool) -> Self {
        Self {
            input,
            input_hash: None,
            outputs: None,
            attributes: Vec::new(),
            class_name: None,
            module_api: None,
            hashes: None,
            status: StatusReport {
                write: WriteStatus::Failed,
                dry_run,
                hash_changed: false,
                writes_performed: false,
            },
            cache_sidecar: None,
            preserve_regions: IndexMap::new(),
            error: Some(error),
        }
    }
}

/// The run-wide manifest document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub generator_version: String,
    pub template_version: String,
    pub elapsed_seconds: f64,
    pub options: RunOptions,
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map(|json| json + "\n")
            .map_err(|err| Error::Manifest(format!("Unable to serialize manifest: {err}")))
    }
}
