use attrforge::config::GeneratorConfig;
use attrforge::manifest::WriteStatus;
use attrforge::preserve::RegionStatus;
use attrforge::processor::Processor;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PRE_CHANGE_KEY: &str = "UPrimaryAttributeSet.PreAttributeChange";

fn make_config(root: &Path) -> GeneratorConfig {
    GeneratorConfig {
        input_roots: vec![root.join("Content/Attributes")],
        output_root: root.join("Source/Attributes"),
        manifest_path: root.join("codegen/manifest.json"),
        log_path: root.join("codegen/logs/attrforge.log"),
        force: false,
        dry_run: false,
        no_preserve: false,
    }
}

fn write_asset(root: &Path, name: &str, clamp_max: f64) -> PathBuf {
    let dir = root.join("Content/Attributes");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(format!("{name}.json"));
    let payload = json!({
        "name": name,
        "className": format!("U{name}AttributeSet"),
        "attributes": [{
            "name": "Health",
            "metadata": {"Replicate": true, "ClampMin": 0, "ClampMax": clamp_max}
        }]
    });
    fs::write(&path, serde_json::to_string_pretty(&payload).unwrap()).unwrap();
    path
}

fn inject_custom_line(source_path: &Path, custom_line: &str) {
    let begin = format!("    // ATTRFORGE-PRESERVE BEGIN {PRE_CHANGE_KEY}");
    let end = format!("    // ATTRFORGE-PRESERVE END {PRE_CHANGE_KEY}");
    let placeholder =
        format!("{begin}\n    // Customize pre-attribute change logic here.\n{end}");
    let replacement = format!(
        "{begin}\n    // Customize pre-attribute change logic here.\n{custom_line}\n{end}"
    );
    let text = fs::read_to_string(source_path).unwrap();
    assert!(text.contains(&placeholder), "placeholder not found");
    fs::write(source_path, text.replace(&placeholder, &replacement)).unwrap();
}

#[test]
fn test_first_run_updates_and_second_run_skips() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_asset(root, "Primary", 125.0);
    let config = make_config(root);

    let first = Processor::new(&config).run().unwrap();
    assert_eq!(first.processed, 1);
    assert_eq!(first.written, 1);
    let entry = &first.manifest.entries[0];
    assert_eq!(entry.status.write, WriteStatus::Update);
    assert!(entry.status.writes_performed);

    let header_path = config.output_root.join("PrimaryAttributeSet.h");
    let source_path = config.output_root.join("PrimaryAttributeSet.cpp");
    let stub_path = config.output_root.join("PrimaryAttributeSet.generated.h");
    assert!(header_path.exists() && source_path.exists() && stub_path.exists());
    let header = fs::read_to_string(&header_path).unwrap();
    assert!(header.contains("ReplicatedUsing=OnRep_Health"));
    assert!(header.contains("void OnRep_Health(const FGameplayAttributeData& OldValue);"));

    let first_mtime = fs::metadata(&header_path).unwrap().modified().unwrap();
    let first_bytes = fs::read(&header_path).unwrap();

    let second = Processor::new(&config).run().unwrap();
    assert_eq!(second.skipped, 1);
    let entry = &second.manifest.entries[0];
    assert_eq!(entry.status.write, WriteStatus::Skip);
    assert!(!entry.status.hash_changed);
    assert!(!entry.status.writes_performed);
    assert_eq!(
        entry.preserve_regions["source"][PRE_CHANGE_KEY].status,
        RegionStatus::Unchanged
    );

    assert_eq!(
        fs::metadata(&header_path).unwrap().modified().unwrap(),
        first_mtime
    );
    assert_eq!(fs::read(&header_path).unwrap(), first_bytes);
}

#[test]
fn test_metadata_change_flips_composite_hash() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_asset(root, "Primary", 100.0);
    let config = make_config(root);

    let first = Processor::new(&config).run().unwrap();
    let first_composite = first.manifest.entries[0]
        .hashes
        .as_ref()
        .unwrap()
        .composite
        .clone();

    write_asset(root, "Primary", 200.0);
    let second = Processor::new(&config).run().unwrap();
    let entry = &second.manifest.entries[0];
    let hashes = entry.hashes.as_ref().unwrap();

    assert_ne!(hashes.composite, first_composite);
    assert_eq!(hashes.previous_composite.as_deref(), Some(first_composite.as_str()));
    assert_eq!(entry.status.write, WriteStatus::Update);
    assert!(entry.status.hash_changed);
}

#[test]
fn test_preserve_round_trip_across_regeneration() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_asset(root, "Primary", 150.0);
    let config = make_config(root);
    Processor::new(&config).run().unwrap();

    let source_path = config.output_root.join("PrimaryAttributeSet.cpp");
    inject_custom_line(&source_path, "    float CustomValue = 42.0f;");

    // An unrelated metadata change forces a rewrite of the whole file.
    write_asset(root, "Primary", 300.0);
    let report = Processor::new(&config).run().unwrap();

    let entry = &report.manifest.entries[0];
    assert_eq!(entry.status.write, WriteStatus::Update);
    assert_eq!(
        entry.preserve_regions["source"][PRE_CHANGE_KEY].status,
        RegionStatus::Preserved
    );
    let source = fs::read_to_string(&source_path).unwrap();
    assert!(source.contains("    float CustomValue = 42.0f;"));
    assert!(source.contains("FMath::Clamp(NewValue, 0.0, 300.0)"));
}

#[test]
fn test_no_preserve_discards_injected_content() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_asset(root, "Primary", 175.0);
    let config = make_config(root);
    Processor::new(&config).run().unwrap();

    let source_path = config.output_root.join("PrimaryAttributeSet.cpp");
    inject_custom_line(&source_path, "    float CustomValue = 99.0f;");

    let mut no_preserve_config = make_config(root);
    no_preserve_config.force = true;
    no_preserve_config.no_preserve = true;
    let report = Processor::new(&no_preserve_config).run().unwrap();

    let source = fs::read_to_string(&source_path).unwrap();
    assert!(!source.contains("CustomValue"));
    let entry = &report.manifest.entries[0];
    assert_eq!(
        entry.preserve_regions["source"][PRE_CHANGE_KEY].status,
        RegionStatus::Ignored
    );
}

#[test]
fn test_force_overrides_cached_hash() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_asset(root, "Primary", 125.0);
    let config = make_config(root);

    let first = Processor::new(&config).run().unwrap();
    let first_composite = first.manifest.entries[0]
        .hashes
        .as_ref()
        .unwrap()
        .composite
        .clone();

    let mut forced_config = make_config(root);
    forced_config.force = true;
    let second = Processor::new(&forced_config).run().unwrap();
    let entry = &second.manifest.entries[0];

    assert_eq!(entry.status.write, WriteStatus::Force);
    assert!(entry.status.writes_performed);
    assert_eq!(entry.hashes.as_ref().unwrap().composite, first_composite);
}

#[test]
fn test_dry_run_touches_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_asset(root, "Primary", 125.0);
    let mut config = make_config(root);
    config.dry_run = true;

    let report = Processor::new(&config).run().unwrap();

    assert!(!config.output_root.exists());
    assert!(!config.manifest_path.exists());
    assert!(!config.log_path.exists());
    let sidecar = root.join("codegen/PrimaryAttributeSet.generated.hash");
    assert!(!sidecar.exists());

    assert_eq!(report.processed, 1);
    assert!(report.report_lines[0].starts_with("DRY "));
    assert!(report.summary().contains("DRY RUN"));
    let entry = &report.manifest.entries[0];
    assert_eq!(entry.status.write, WriteStatus::Update);
    assert!(entry.status.dry_run);
    assert!(!entry.status.writes_performed);
}

#[test]
fn test_dry_run_after_real_run_still_skips() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_asset(root, "Primary", 125.0);
    let config = make_config(root);
    Processor::new(&config).run().unwrap();

    let manifest_bytes = fs::read(&config.manifest_path).unwrap();
    let mut dry_config = make_config(root);
    dry_config.dry_run = true;
    let report = Processor::new(&dry_config).run().unwrap();

    assert_eq!(report.manifest.entries[0].status.write, WriteStatus::Skip);
    // The persisted manifest is left exactly as the real run wrote it.
    assert_eq!(fs::read(&config.manifest_path).unwrap(), manifest_bytes);
}

#[test]
fn test_failed_asset_does_not_abort_the_run() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let dir = root.join("Content/Attributes");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("Broken.json"), "{ not json").unwrap();
    write_asset(root, "Primary", 125.0);
    let config = make_config(root);

    let report = Processor::new(&config).run().unwrap();
    assert_eq!(report.processed, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.written, 1);

    // Entries stay in input path order: Broken.json sorts first.
    let failed_entry = &report.manifest.entries[0];
    assert_eq!(failed_entry.status.write, WriteStatus::Failed);
    assert!(failed_entry.error.is_some());
    assert!(failed_entry.input.ends_with("Broken.json"));

    let ok_entry = &report.manifest.entries[1];
    assert_eq!(ok_entry.status.write, WriteStatus::Update);
    assert!(config.output_root.join("PrimaryAttributeSet.h").exists());

    let log = fs::read_to_string(&config.log_path).unwrap();
    assert!(log.contains("failed"));
    assert!(log.contains("UPrimaryAttributeSet"));
}

#[test]
fn test_input_hash_matches_raw_file_digest() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let asset_path = write_asset(root, "Primary", 125.0);
    let config = make_config(root);

    let report = Processor::new(&config).run().unwrap();

    let mut hasher = Sha256::new();
    hasher.update(fs::read(&asset_path).unwrap());
    let expected = format!("{:x}", hasher.finalize());
    let entry = &report.manifest.entries[0];
    assert_eq!(entry.input_hash.as_deref(), Some(expected.as_str()));
    assert_eq!(entry.hashes.as_ref().unwrap().input, expected);
}

#[test]
fn test_manifest_document_round_trips_through_json() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_asset(root, "Primary", 125.0);
    let config = make_config(root);
    Processor::new(&config).run().unwrap();

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&config.manifest_path).unwrap()).unwrap();
    assert_eq!(manifest["generatorVersion"], "1.0.0");
    assert_eq!(manifest["templateVersion"], "1.0.0");
    assert_eq!(manifest["options"]["dryRun"], false);

    let entry = &manifest["entries"][0];
    assert_eq!(entry["className"], "UPrimaryAttributeSet");
    assert_eq!(entry["status"]["write"], "update");
    assert_eq!(entry["attributes"][0]["name"], "Health");
    assert_eq!(entry["attributes"][0]["metadata"]["Replicate"], true);
    assert_eq!(entry["attributes"][0]["metadata"]["ClampMax"], 125.0);
    assert_eq!(
        entry["preserveRegions"]["source"][PRE_CHANGE_KEY]["status"],
        "generated"
    );
    assert!(entry["outputs"]["header"]
        .as_str()
        .unwrap()
        .ends_with("PrimaryAttributeSet.h"));
}

#[test]
fn test_sidecar_records_identity_and_hashes() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_asset(root, "Primary", 125.0);
    let config = make_config(root);
    let report = Processor::new(&config).run().unwrap();

    let sidecar_path = root.join("codegen/PrimaryAttributeSet.generated.hash");
    assert!(sidecar_path.exists());
    let sidecar: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&sidecar_path).unwrap()).unwrap();
    let entry = &report.manifest.entries[0];
    assert_eq!(sidecar["asset"], "Primary");
    assert_eq!(
        sidecar["compositeHash"].as_str().unwrap(),
        entry.hashes.as_ref().unwrap().composite
    );
    assert_eq!(sidecar["generatorVersion"], "1.0.0");
}

#[test]
fn test_corrupt_sidecar_forces_update() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_asset(root, "Primary", 125.0);
    let config = make_config(root);
    Processor::new(&config).run().unwrap();

    let sidecar_path = root.join("codegen/PrimaryAttributeSet.generated.hash");
    fs::write(&sidecar_path, "{ corrupted").unwrap();

    let report = Processor::new(&config).run().unwrap();
    assert_eq!(report.manifest.entries[0].status.write, WriteStatus::Update);
}

#[test]
fn test_deleted_output_file_forces_update() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_asset(root, "Primary", 125.0);
    let config = make_config(root);
    Processor::new(&config).run().unwrap();

    fs::remove_file(config.output_root.join("PrimaryAttributeSet.generated.h")).unwrap();
    let report = Processor::new(&config).run().unwrap();
    let entry = &report.manifest.entries[0];
    assert_eq!(entry.status.write, WriteStatus::Update);
    assert!(!entry.status.hash_changed);
    assert!(config
        .output_root
        .join("PrimaryAttributeSet.generated.h")
        .exists());
}

#[test]
fn test_assets_are_processed_in_lexical_order() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_asset(root, "Zulu", 10.0);
    write_asset(root, "Alpha", 10.0);
    let config = make_config(root);

    let report = Processor::new(&config).run().unwrap();
    let inputs: Vec<String> = report
        .manifest
        .entries
        .iter()
        .map(|entry| entry.input.display().to_string())
        .collect();
    assert!(inputs[0].ends_with("Alpha.json"));
    assert!(inputs[1].ends_with("Zulu.json"));
}

#[test]
fn test_missing_input_root_contributes_zero_assets() {
    let temp_dir = TempDir::new().unwrap();
    let config = make_config(temp_dir.path());

    let report = Processor::new(&config).run().unwrap();
    assert_eq!(report.processed, 0);
    assert!(report.manifest.entries.is_empty());
    assert!(report.summary().contains("Processed 0 assets"));
}
