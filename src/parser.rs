//! Asset document parsing and validation.
//!
//! Turns a raw JSON document into an [`AttributeSetAsset`], applying the
//! defaulting and coercion rules for every recognized field. Input
//! documents are tolerated in two key spellings per logical field; all of
//! that loose handling is concentrated here so the rest of the pipeline
//! works with strongly typed values only.

use crate::asset::{AttributeDefinition, AttributeMetadata, AttributeSetAsset};
use crate::constants::DEFAULT_MODULE_API;
use crate::error::{Error, Result};
use serde_json::Value;
use std::path::Path;

/// Alias tables, canonical spelling first.
const NAME_ALIASES: [&str; 2] = ["name", "Name"];
const CLASS_NAME_ALIASES: [&str; 2] = ["className", "ClassName"];
const MODULE_API_ALIASES: [&str; 2] = ["moduleApi", "ModuleAPI"];
const ATTRIBUTES_ALIASES: [&str; 2] = ["attributes", "Attributes"];
const CATEGORY_ALIASES: [&str; 2] = ["category", "Category"];
const COMMENT_ALIASES: [&str; 2] = ["comment", "Comment"];
const METADATA_ALIASES: [&str; 2] = ["metadata", "Metadata"];
const REPLICATE_ALIASES: [&str; 2] = ["Replicate", "replicate"];
const GENERATE_HOOKS_ALIASES: [&str; 2] = ["GenerateHooks", "generateHooks"];
const SKIP_ON_REP_ALIASES: [&str; 2] = ["SkipOnRep", "skipOnRep"];
const CLAMP_MIN_ALIASES: [&str; 2] = ["ClampMin", "clampMin"];
const CLAMP_MAX_ALIASES: [&str; 2] = ["ClampMax", "clampMax"];
const META_ATTRIBUTE_ALIASES: [&str; 2] = ["MetaAttribute", "metaAttribute"];

/// Parses an asset document into an [`AttributeSetAsset`].
///
/// # Arguments
/// * `document` - The parsed JSON document of one asset file
/// * `source_path` - Identity of the originating file, used for the name
///   fallback and for error messages
///
/// # Errors
/// * `Error::Validation` when the document is not an object, the
///   attributes collection is missing/empty/not an array, an attribute
///   entry is not an object or lacks a name, or a metadata field cannot
///   be coerced to its declared type
pub fn parse(document: &Value, source_path: &Path) -> Result<AttributeSetAsset> {
    let root = document.as_object().ok_or_else(|| {
        Error::Validation(format!(
            "Asset document {} is not an object",
            source_path.display()
        ))
    })?;

    let name = match resolve_str(root, &NAME_ALIASES) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => source_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };
    if name.is_empty() {
        return Err(Error::Validation(format!(
            "Asset {} has no resolvable name",
            source_path.display()
        )));
    }

    let class_name = resolve_str(root, &CLASS_NAME_ALIASES)
        .map(str::to_string)
        .unwrap_or_else(|| format!("U{name}AttributeSet"));
    let module_api = resolve_str(root, &MODULE_API_ALIASES)
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_MODULE_API.to_string());

    let attributes_payload = match resolve(root, &ATTRIBUTES_ALIASES) {
        Some(Value::Array(entries)) if !entries.is_empty() => entries,
        _ => {
            return Err(Error::Validation(format!(
                "AttributeSet {} has no attributes defined in {}",
                name,
                source_path.display()
            )))
        }
    };

    let mut attributes = Vec::with_capacity(attributes_payload.len());
    for entry in attributes_payload {
        attributes.push(parse_attribute(entry, source_path)?);
    }

    Ok(AttributeSetAsset {
        name,
        class_name,
        module_api,
        attributes,
        source_path: source_path.to_path_buf(),
    })
}

fn parse_attribute(entry: &Value, source_path: &Path) -> Result<AttributeDefinition> {
    let fields = entry.as_object().ok_or_else(|| {
        Error::Validation(format!(
            "Attribute definition in {} is not an object: {}",
            source_path.display(),
            entry
        ))
    })?;

    let name = match resolve_str(fields, &NAME_ALIASES) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            return Err(Error::Validation(format!(
                "Attribute definition missing name in {}",
                source_path.display()
            )))
        }
    };

    let category = match resolve(fields, &CATEGORY_ALIASES) {
        None => "Attributes".to_string(),
        Some(Value::String(category)) => category.clone(),
        Some(other) => {
            return Err(Error::Validation(format!(
                "Attribute {} in {} has a non-string category: {}",
                name,
                source_path.display(),
                other
            )))
        }
    };

    let comment = match resolve(fields, &COMMENT_ALIASES) {
        None => None,
        Some(Value::String(comment)) => Some(comment.clone()),
        Some(other) => {
            return Err(Error::Validation(format!(
                "Attribute {} in {} has a non-string comment: {}",
                name,
                source_path.display(),
                other
            )))
        }
    };

    let metadata = match resolve(fields, &METADATA_ALIASES) {
        None => AttributeMetadata::default(),
        Some(value) => parse_metadata(value, &name, source_path)?,
    };

    Ok(AttributeDefinition {
        name,
        category,
        comment,
        metadata,
    })
}

fn parse_metadata(
    value: &Value,
    attribute_name: &str,
    source_path: &Path,
) -> Result<AttributeMetadata> {
    let fields = value.as_object().ok_or_else(|| {
        Error::Validation(format!(
            "Metadata of attribute {} in {} is not an object",
            attribute_name,
            source_path.display()
        ))
    })?;

    let defaults = AttributeMetadata::default();
    Ok(AttributeMetadata {
        replicate: coerce_bool(resolve(fields, &REPLICATE_ALIASES), defaults.replicate)
            .map_err(|raw| metadata_error("Replicate", attribute_name, source_path, &raw))?,
        generate_hooks: coerce_bool(
            resolve(fields, &GENERATE_HOOKS_ALIASES),
            defaults.generate_hooks,
        )
        .map_err(|raw| metadata_error("GenerateHooks", attribute_name, source_path, &raw))?,
        skip_on_rep: coerce_bool(resolve(fields, &SKIP_ON_REP_ALIASES), defaults.skip_on_rep)
            .map_err(|raw| metadata_error("SkipOnRep", attribute_name, source_path, &raw))?,
        clamp_min: coerce_float(resolve(fields, &CLAMP_MIN_ALIASES))
            .map_err(|raw| metadata_error("ClampMin", attribute_name, source_path, &raw))?,
        clamp_max: coerce_float(resolve(fields, &CLAMP_MAX_ALIASES))
            .map_err(|raw| metadata_error("ClampMax", attribute_name, source_path, &raw))?,
        meta_attribute: coerce_meta_attribute(resolve(fields, &META_ATTRIBUTE_ALIASES)),
    })
}

fn metadata_error(field: &str, attribute_name: &str, source_path: &Path, raw: &Value) -> Error {
    Error::Validation(format!(
        "Unable to coerce {} for attribute {} in {}: {}",
        field,
        attribute_name,
        source_path.display(),
        raw
    ))
}

/// Resolves the first alias present in `fields`, skipping explicit nulls.
fn resolve<'a>(fields: &'a serde_json::Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .find_map(|alias| fields.get(*alias))
        .filter(|value| !value.is_null())
}

fn resolve_str<'a>(fields: &'a serde_json::Map<String, Value>, aliases: &[&str]) -> Option<&'a str> {
    resolve(fields, aliases).and_then(Value::as_str)
}

/// Tri-state boolean coercion: absent uses the default, native booleans
/// pass through, and the case-insensitive tokens
/// true/false/yes/no/on/off/1/0 are accepted as strings.
fn coerce_bool(value: Option<&Value>, default: bool) -> std::result::Result<bool, Value> {
    let Some(value) = value else {
        return Ok(default);
    };
    match value {
        Value::Bool(flag) => Ok(*flag),
        Value::String(token) => match token.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(value.clone()),
        },
        _ => Err(value.clone()),
    }
}

/// Floats are accepted as JSON numbers or non-empty numeric strings.
fn coerce_float(value: Option<&Value>) -> std::result::Result<Option<f64>, Value> {
    let Some(value) = value else {
        return Ok(None);
    };
    match value {
        Value::Number(number) => number.as_f64().map(Some).ok_or_else(|| value.clone()),
        Value::String(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| value.clone()),
        _ => Err(value.clone()),
    }
}

/// Meta attribute names are trimmed strings; empty or non-string values
/// collapse to absent rather than failing validation.
fn coerce_meta_attribute(value: Option<&Value>) -> Option<String> {
    let trimmed = value?.as_str()?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
