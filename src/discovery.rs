//! Input discovery: walking the configured roots for asset documents.
//!
//! A missing root is not an error, it simply contributes zero assets.
//! The returned list is sorted and deduplicated so the rest of the run
//! is deterministic regardless of filesystem iteration order.

use crate::constants::DATA_ASSET_DIR_NAME;
use log::debug;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Collects every `*.json` file under every existing input root.
pub fn discover_assets(input_roots: &[PathBuf]) -> Vec<PathBuf> {
    let mut found = Vec::new();
    for root in input_roots {
        if !root.exists() {
            debug!("Input root {} does not exist, skipping", root.display());
            continue;
        }
        for entry in WalkDir::new(root).into_iter().filter_map(|entry| entry.ok()) {
            let path = entry.path();
            if entry.file_type().is_file()
                && path.extension().is_some_and(|extension| extension == "json")
            {
                found.push(path.to_path_buf());
            }
        }
    }
    found.sort();
    found.dedup();
    found
}

/// Finds directories named `DataAssets` under the content root; used to
/// widen the default input roots when none are configured explicitly.
pub fn discover_data_asset_roots(content_root: &Path) -> Vec<PathBuf> {
    if !content_root.exists() {
        return Vec::new();
    }
    let mut discovered: Vec<PathBuf> = WalkDir::new(content_root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_dir() && entry.file_name() == DATA_ASSET_DIR_NAME
        })
        .map(|entry| entry.path().to_path_buf())
        .collect();
    discovered.sort();
    discovered
}
