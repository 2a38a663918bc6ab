//! Value types for parsed attribute set assets.
//! These carry no behavior beyond normalization helpers; all validation
//! and coercion happens in the parser.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Per-attribute behavioral flags resolved from an asset document.
///
/// Boolean fields default to the documented values when absent; the clamp
/// bounds and the meta attribute name are genuinely optional.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeMetadata {
    pub replicate: bool,
    pub generate_hooks: bool,
    pub skip_on_rep: bool,
    pub clamp_min: Option<f64>,
    pub clamp_max: Option<f64>,
    pub meta_attribute: Option<String>,
}

impl Default for AttributeMetadata {
    fn default() -> Self {
        Self {
            replicate: true,
            generate_hooks: true,
            skip_on_rep: false,
            clamp_min: None,
            clamp_max: None,
            meta_attribute: None,
        }
    }
}

impl AttributeMetadata {
    /// Canonical manifest representation: the three flags always, the
    /// optional fields only when present.
    pub fn to_summary(&self) -> IndexMap<String, serde_json::Value> {
        let mut summary = IndexMap::new();
        summary.insert("Replicate".to_string(), self.replicate.into());
        summary.insert("GenerateHooks".to_string(), self.generate_hooks.into());
        summary.insert("SkipOnRep".to_string(), self.skip_on_rep.into());
        if let Some(clamp_min) = self.clamp_min {
            summary.insert("ClampMin".to_string(), clamp_min.into());
        }
        if let Some(clamp_max) = self.clamp_max {
            summary.insert("ClampMax".to_string(), clamp_max.into());
        }
        if let Some(meta_attribute) = &self.meta_attribute {
            summary.insert("MetaAttribute".to_string(), meta_attribute.clone().into());
        }
        summary
    }
}

/// One attribute of an attribute set.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDefinition {
    pub name: String,
    /// Display/grouping label only; never affects generation decisions
    pub category: String,
    pub comment: Option<String>,
    pub metadata: AttributeMetadata,
}

/// A fully parsed attribute set asset.
///
/// Attribute order is the document order and determines declaration order
/// in the rendered output.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSetAsset {
    pub name: String,
    pub class_name: String,
    pub module_api: String,
    pub attributes: Vec<AttributeDefinition>,
    pub source_path: PathBuf,
}

impl AttributeSetAsset {
    /// Base name shared by the three output files and the cache sidecar.
    pub fn file_basename(&self) -> String {
        format!("{}AttributeSet", self.name)
    }

    pub fn header_path(&self, output_root: &Path) -> PathBuf {
        output_root.join(format!("{}.h", self.file_basename()))
    }

    pub fn source_file_path(&self, output_root: &Path) -> PathBuf {
        output_root.join(format!("{}.cpp", self.file_basename()))
    }

    pub fn generated_header_path(&self, output_root: &Path) -> PathBuf {
        output_root.join(format!("{}.generated.h", self.file_basename()))
    }

    /// The three declared output files of this asset under `output_root`.
    pub fn output_paths(&self, output_root: &Path) -> OutputPaths {
        OutputPaths {
            header: self.header_path(output_root),
            source: self.source_file_path(output_root),
            generated_header: self.generated_header_path(output_root),
        }
    }

    /// True when any attribute declares a derived meta attribute, which
    /// adds a registry include to the rendered header.
    pub fn requires_meta_registry(&self) -> bool {
        self.attributes
            .iter()
            .any(|attribute| attribute.metadata.meta_attribute.is_some())
    }
}

/// The declared output files of one asset, as recorded in the manifest
/// and the cache sidecar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputPaths {
    pub header: PathBuf,
    pub source: PathBuf,
    pub generated_header: PathBuf,
}

impl OutputPaths {
    /// A missing output file invalidates the cache even when hashes match.
    pub fn all_exist(&self) -> bool {
        self.header.exists() && self.source.exists() && self.generated_header.exists()
    }
}
