//! Configuration handling for attrforge runs.
//!
//! An optional project file (attrforge.json / attrforge.yml /
//! attrforge.yaml) can provide the input roots and output locations; CLI
//! flags override the file, and documented defaults fill the rest. The
//! resolved [`GeneratorConfig`] is immutable and is the only
//! configuration the rest of the pipeline ever sees.

use crate::cli::Args;
use crate::constants::{
    CONFIG_FILES, DEFAULT_CONTENT_ROOT, DEFAULT_INPUT_ROOT, DEFAULT_LOG_PATH,
    DEFAULT_MANIFEST_PATH, DEFAULT_OUTPUT_ROOT,
};
use crate::discovery::discover_data_asset_roots;
use crate::error::{Error, Result};
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Process-wide configuration, constructed once per invocation.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Ordered, deduplicated input root directories
    pub input_roots: Vec<PathBuf>,
    pub output_root: PathBuf,
    pub manifest_path: PathBuf,
    pub log_path: PathBuf,
    /// Bypass change detection; every asset is written
    pub force: bool,
    /// Compute and report everything, write nothing
    pub dry_run: bool,
    /// Regenerate preserve regions from the template on writes
    pub no_preserve: bool,
}

impl GeneratorConfig {
    /// Cache sidecars live next to the manifest.
    pub fn cache_dir(&self) -> &Path {
        self.manifest_path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Resolves the effective configuration from CLI arguments, an
    /// optional project file and the documented defaults.
    pub fn resolve(args: &Args) -> Result<Self> {
        let project = load_project_config(args.config.as_deref())?;

        let mut input_roots = if !args.input.is_empty() {
            args.input.clone()
        } else if !project.input_roots.is_empty() {
            project.input_roots.clone()
        } else {
            let mut roots = vec![PathBuf::from(DEFAULT_INPUT_ROOT)];
            roots.extend(discover_data_asset_roots(Path::new(DEFAULT_CONTENT_ROOT)));
            roots
        };
        dedup_preserving_order(&mut input_roots);

        Ok(Self {
            input_roots,
            output_root: args
                .output
                .clone()
                .or(project.output_root)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_ROOT)),
            manifest_path: args
                .manifest
                .clone()
                .or(project.manifest_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MANIFEST_PATH)),
            log_path: args
                .log
                .clone()
                .or(project.log_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_PATH)),
            force: args.force,
            dry_run: args.dry_run,
            no_preserve: args.no_preserve,
        })
    }
}

/// Optional project configuration file contents.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectConfig {
    pub input_roots: Vec<PathBuf>,
    pub output_root: Option<PathBuf>,
    pub manifest_path: Option<PathBuf>,
    pub log_path: Option<PathBuf>,
}

/// Loads the project configuration, trying multiple file formats.
///
/// An explicitly given path must exist and parse; otherwise the default
/// file names are probed and a missing file simply yields defaults.
pub fn load_project_config(explicit: Option<&Path>) -> Result<ProjectConfig> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Configuration file {} does not exist",
                    path.display()
                )));
            }
            Some(path.to_path_buf())
        }
        None => CONFIG_FILES
            .iter()
            .map(PathBuf::from)
            .find(|candidate| candidate.exists()),
    };

    let Some(path) = path else {
        return Ok(ProjectConfig::default());
    };
    debug!("Loading configuration from {}", path.display());
    let contents = std::fs::read_to_string(&path)?;
    parse_project_config(&contents)
}

/// Parses configuration content, trying JSON first and YAML second.
pub fn parse_project_config(contents: &str) -> Result<ProjectConfig> {
    match serde_json::from_str(contents) {
        Ok(config) => Ok(config),
        Err(_) => serde_yaml::from_str(contents)
            .map_err(|err| Error::Config(format!("Invalid configuration format: {err}"))),
    }
}

fn dedup_preserving_order(roots: &mut Vec<PathBuf>) {
    let mut seen = Vec::new();
    roots.retain(|root| {
        if seen.contains(root) {
            false
        } else {
            seen.push(root.clone());
            true
        }
    });
}
