//! attrforge is an incremental code generator for attribute sets.
//! It turns declarative JSON asset definitions into C++ attribute set
//! classes, preserves hand-edited regions across regenerations and skips
//! assets whose inputs have not changed.

/// Value types for parsed attribute set assets
pub mod asset;

/// Change detection and per-asset cache sidecars
pub mod cache;

/// Command-line interface module for the attrforge application
pub mod cli;

/// Configuration resolution from CLI flags, project files and defaults
pub mod config;

/// Common constants used throughout the application
pub mod constants;

/// Input discovery across the configured asset roots
pub mod discovery;

/// Error types and handling for the attrforge application
pub mod error;

/// Run manifest types and serialization
pub mod manifest;

/// Asset document parsing and validation
pub mod parser;

/// Preserve-region extraction and merge
pub mod preserve;

/// Core processing orchestration
/// Combines all components to generate the final output
pub mod processor;

/// Template rendering for attribute set assets
pub mod renderer;

/// Structured segment representation of rendered files
pub mod template;
