//! Core processing orchestration.
//!
//! Sequences the pipeline per discovered asset: parse, render, decide,
//! merge, write, record. Assets are processed in ascending input path
//! order so the manifest and log are deterministic. A failure in one
//! asset is recorded as a failed manifest entry and never aborts the
//! processing of the remaining assets.

use crate::asset::AttributeSetAsset;
use crate::cache::{self, CacheRecord, Decision, WriteDecision};
use crate::config::GeneratorConfig;
use crate::constants::{GENERATOR_VERSION, TEMPLATE_VERSION};
use crate::discovery;
use crate::error::{Error, Result};
use crate::manifest::{Manifest, ManifestEntry, RunOptions};
use crate::parser;
use crate::preserve::{self, RegionOutcome, RegionStatus};
use crate::renderer;
use crate::template::RenderedFile;
use indexmap::IndexMap;
use log::{debug, warn};
use std::fs;
use std::path::Path;
use std::time::Instant;

/// Aggregated result of one generator run.
#[derive(Debug)]
pub struct RunReport {
    pub processed: usize,
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
    pub elapsed_seconds: f64,
    /// One human-readable line per asset, in processing order
    pub report_lines: Vec<String>,
    pub manifest: Manifest,
}

impl RunReport {
    /// One-line run summary for the console.
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Processed {} assets: {} updated, {} skipped, {} failed in {:.4}s.",
            self.processed, self.written, self.skipped, self.failed, self.elapsed_seconds
        );
        if self.manifest.options.dry_run {
            summary.push_str("\nDRY RUN: no files were written.");
        }
        summary
    }
}

struct AssetOutcome {
    entry: ManifestEntry,
    log_line: String,
    report_line: String,
    decision: WriteDecision,
}

/// Drives the generation pipeline for one immutable configuration.
pub struct Processor<'a> {
    config: &'a GeneratorConfig,
}

impl<'a> Processor<'a> {
    pub fn new(config: &'a GeneratorConfig) -> Self {
        Self { config }
    }

    /// Processes every discovered asset and persists the run artifacts
    /// (unless dry-run).
    pub fn run(&self) -> Result<RunReport> {
        let started = Instant::now();
        let asset_files = discovery::discover_assets(&self.config.input_roots);
        debug!("Discovered {} asset files", asset_files.len());

        let mut entries = Vec::new();
        let mut log_lines = Vec::new();
        let mut report_lines = Vec::new();
        let (mut written, mut skipped, mut failed) = (0usize, 0usize, 0usize);

        for path in &asset_files {
            match self.process_asset(path) {
                Ok(outcome) => {
                    match outcome.decision {
                        WriteDecision::Skip => skipped += 1,
                        WriteDecision::Update | WriteDecision::Force => written += 1,
                    }
                    entries.push(outcome.entry);
                    log_lines.push(outcome.log_line);
                    report_lines.push(outcome.report_line);
                }
                Err(err) => {
                    warn!("Failed to process {}: {err}", path.display());
                    failed += 1;
                    log_lines.push(format!("failed {} error={err}", path.display()));
                    report_lines.push(format!(
                        "{}failed {} ({err})",
                        self.dry_prefix(),
                        path.display()
                    ));
                    entries.push(ManifestEntry::failed(
                        path.clone(),
                        err.to_string(),
                        self.config.dry_run,
                    ));
                }
            }
        }

        let elapsed_seconds = round4(started.elapsed().as_secs_f64());
        let manifest = Manifest {
            generator_version: GENERATOR_VERSION.to_string(),
            template_version: TEMPLATE_VERSION.to_string(),
            elapsed_seconds,
            options: RunOptions::from(self.config),
            entries,
        };

        if !self.config.dry_run {
            write_file(&self.config.manifest_path, &manifest.to_json()?)?;
            let log_contents = if log_lines.is_empty() {
                String::new()
            } else {
                log_lines.join("\n") + "\n"
            };
            write_file(&self.config.log_path, &log_contents)?;
        }

        Ok(RunReport {
            processed: asset_files.len(),
            written,
            skipped,
            failed,
            elapsed_seconds,
            report_lines,
            manifest,
        })
    }

    fn process_asset(&self, path: &Path) -> Result<AssetOutcome> {
        debug!("Processing asset {}", path.display());
        let input_hash = cache::hash_file(path)?;
        let contents = fs::read_to_string(path)?;
        let document: serde_json::Value = serde_json::from_str(&contents).map_err(|err| {
            Error::Validation(format!("Invalid JSON in {}: {err}", path.display()))
        })?;
        let asset = parser::parse(&document, path)?;

        let outputs = asset.output_paths(&self.config.output_root);
        let sidecar = cache::sidecar_path(self.config.cache_dir(), &asset.file_basename());
        let record = cache::load_record(&sidecar);
        let composite = cache::composite_hash(&asset.class_name, &input_hash);
        let decision = cache::decide(record.as_ref(), &outputs, &composite, self.config.force);

        let mut preserve_regions = IndexMap::new();
        let writes_performed;
        if decision.should_write() {
            let rendered = renderer::render(&asset);
            preserve_regions.insert(
                rendered.header.kind.to_string(),
                self.emit_output(&outputs.header, &rendered.header)?,
            );
            preserve_regions.insert(
                rendered.source.kind.to_string(),
                self.emit_output(&outputs.source, &rendered.source)?,
            );
            preserve_regions.insert(
                rendered.generated_header.kind.to_string(),
                self.emit_output(&outputs.generated_header, &rendered.generated_header)?,
            );
            writes_performed = !self.config.dry_run;
            if writes_performed {
                let record = CacheRecord {
                    asset: asset.name.clone(),
                    source_path: path.to_path_buf(),
                    input_hash: input_hash.clone(),
                    composite_hash: composite.clone(),
                    generator_version: GENERATOR_VERSION.to_string(),
                    template_version: TEMPLATE_VERSION.to_string(),
                    outputs: outputs.clone(),
                };
                cache::store_record(&sidecar, &record)?;
            }
        } else {
            // Skip: report the regions already on disk for manifest
            // completeness without touching any file.
            for (kind, output) in [
                ("header", &outputs.header),
                ("source", &outputs.source),
                ("generatedHeader", &outputs.generated_header),
            ] {
                let existing = fs::read_to_string(output).unwrap_or_default();
                preserve_regions.insert(kind.to_string(), preserve::scan_existing(&existing));
            }
            writes_performed = false;
        }

        let log_line = format!(
            "{} {} {} composite={}",
            decision.write,
            asset.class_name,
            path.display(),
            short_hash(&composite)
        );
        let report_line = self.report_line(&asset, &decision, &preserve_regions);

        Ok(AssetOutcome {
            entry: ManifestEntry::processed(
                &asset,
                input_hash,
                outputs,
                &decision,
                self.config.dry_run,
                writes_performed,
                sidecar,
                preserve_regions,
            ),
            log_line,
            report_line,
            decision: decision.write,
        })
    }

    /// Merges one rendered file against its previous content and, unless
    /// dry-run, writes the result.
    fn emit_output(
        &self,
        output_path: &Path,
        rendered: &RenderedFile,
    ) -> Result<IndexMap<String, RegionOutcome>> {
        let previous = fs::read_to_string(output_path).ok();
        let (text, outcomes) =
            preserve::merge(previous.as_deref(), rendered, self.config.no_preserve);
        if !self.config.dry_run {
            write_file(output_path, &text)?;
        }
        Ok(outcomes)
    }

    fn report_line(
        &self,
        asset: &AttributeSetAsset,
        decision: &Decision,
        preserve_regions: &IndexMap<String, IndexMap<String, RegionOutcome>>,
    ) -> String {
        format!(
            "{}{} {} ({}) changed={} {}",
            self.dry_prefix(),
            decision.write,
            asset.class_name,
            short_hash(&decision.composite_hash),
            decision.hash_changed,
            summarize_regions(preserve_regions)
        )
    }

    fn dry_prefix(&self) -> &'static str {
        if self.config.dry_run {
            "DRY "
        } else {
            ""
        }
    }
}

/// Compact per-file preserve-region summary for the console report.
fn summarize_regions(
    preserve_regions: &IndexMap<String, IndexMap<String, RegionOutcome>>,
) -> String {
    let mut parts = Vec::new();
    for (kind, outcomes) in preserve_regions {
        if outcomes.is_empty() {
            continue;
        }
        let mut counts: IndexMap<RegionStatus, usize> = IndexMap::new();
        for outcome in outcomes.values() {
            *counts.entry(outcome.status).or_insert(0) += 1;
        }
        let statuses: Vec<String> = [
            (RegionStatus::Generated, "generated"),
            (RegionStatus::Preserved, "preserved"),
            (RegionStatus::Ignored, "ignored"),
            (RegionStatus::Unchanged, "unchanged"),
        ]
        .iter()
        .filter_map(|(status, label)| counts.get(status).map(|count| format!("{count} {label}")))
        .collect();
        parts.push(format!("{kind} {}", statuses.join(", ")));
    }
    if parts.is_empty() {
        return "regions: none".to_string();
    }
    format!("regions: {}", parts.join("; "))
}

fn short_hash(hash: &str) -> &str {
    &hash[..hash.len().min(12)]
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}
