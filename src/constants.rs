//! Common constants used throughout the attrforge application.

/// Supported project configuration file names
pub const CONFIG_FILES: [&str; 3] = ["attrforge.json", "attrforge.yml", "attrforge.yaml"];

/// Version stamp of the generator itself, part of every composite hash
pub const GENERATOR_VERSION: &str = "1.0.0";

/// Version stamp of the output template, part of every composite hash
pub const TEMPLATE_VERSION: &str = "1.0.0";

/// Input root used when neither the CLI nor a config file provides one
pub const DEFAULT_INPUT_ROOT: &str = "Content/Attributes";

/// Directory name scanned for under the content root when discovering extra input roots
pub const DATA_ASSET_DIR_NAME: &str = "DataAssets";

/// Content root searched for `DataAssets` directories
pub const DEFAULT_CONTENT_ROOT: &str = "Content";

/// Default directory for generated attribute set files
pub const DEFAULT_OUTPUT_ROOT: &str = "Source/Attributes";

/// Default run manifest location; cache sidecars live next to it
pub const DEFAULT_MANIFEST_PATH: &str = ".attrforge/manifest.json";

/// Default run log location
pub const DEFAULT_LOG_PATH: &str = ".attrforge/attrforge.log";

/// Export macro emitted on generated classes unless the asset overrides it
pub const DEFAULT_MODULE_API: &str = "ATTRIBUTES_API";
