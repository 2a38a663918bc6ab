//! Preserve-region extraction and merge.
//!
//! A preserve region is a contiguous span delimited by a begin and an end
//! marker carrying the same key. Previously written files are scanned
//! line by line for both marker variants; freshly rendered files are
//! never re-scanned because the renderer hands over their regions as
//! typed segments. An end marker only closes a region when its key and
//! indentation match the begin marker; a malformed or unterminated pair
//! simply contributes no region.

use crate::template::{RenderedFile, Segment};
use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Outcome of one preserve region in one output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionStatus {
    /// Fresh default body was emitted (no previous content for this key)
    Generated,
    /// Previous body was carried forward into the fresh output
    Preserved,
    /// Previous content existed but the no-preserve override discarded it
    Ignored,
    /// File was not rewritten; the region reports its on-disk content
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionOutcome {
    pub status: RegionStatus,
    pub line_count: usize,
}

enum MarkerKind {
    Begin,
    End,
}

struct MarkerPatterns {
    angle_begin: Regex,
    angle_end: Regex,
    bare_begin: Regex,
    bare_end: Regex,
}

fn marker_patterns() -> &'static MarkerPatterns {
    static PATTERNS: OnceLock<MarkerPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| MarkerPatterns {
        angle_begin: Regex::new(r"^([ \t]*)// <AttrForge::Preserve Begin: (.+?)>\s*$").unwrap(),
        angle_end: Regex::new(r"^([ \t]*)// <AttrForge::Preserve End: (.+?)>\s*$").unwrap(),
        bare_begin: Regex::new(r"^([ \t]*)// ATTRFORGE-PRESERVE BEGIN (\S+)\s*$").unwrap(),
        bare_end: Regex::new(r"^([ \t]*)// ATTRFORGE-PRESERVE END (\S+)\s*$").unwrap(),
    })
}

/// Classifies one line as a begin marker, an end marker, or plain text.
fn match_marker(line: &str) -> Option<(MarkerKind, String, String)> {
    let patterns = marker_patterns();
    for (pattern, kind) in [
        (&patterns.angle_begin, MarkerKind::Begin),
        (&patterns.bare_begin, MarkerKind::Begin),
        (&patterns.angle_end, MarkerKind::End),
        (&patterns.bare_end, MarkerKind::End),
    ] {
        if let Some(captures) = pattern.captures(line) {
            return Some((
                kind,
                captures[1].to_string(),
                captures[2].trim().to_string(),
            ));
        }
    }
    None
}

/// Scans text for complete preserve regions and returns a key -> body
/// table in first-occurrence order. Bodies keep their original
/// indentation and always end with a newline (unless empty).
pub fn collect_regions(text: &str) -> IndexMap<String, String> {
    let mut regions = IndexMap::new();
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    let mut index = 0;
    while index < lines.len() {
        let line = lines[index].trim_end_matches(['\n', '\r']);
        if let Some((MarkerKind::Begin, indent, key)) = match_marker(line) {
            let mut cursor = index + 1;
            let mut end_index = None;
            while cursor < lines.len() {
                let candidate = lines[cursor].trim_end_matches(['\n', '\r']);
                if let Some((MarkerKind::End, end_indent, end_key)) = match_marker(candidate) {
                    if end_key == key && end_indent == indent {
                        end_index = Some(cursor);
                        break;
                    }
                }
                cursor += 1;
            }
            if let Some(end_index) = end_index {
                let mut body: String = lines[index + 1..end_index].concat();
                if !body.is_empty() && !body.ends_with('\n') {
                    body.push('\n');
                }
                regions.insert(key, body);
                index = end_index + 1;
                continue;
            }
        }
        index += 1;
    }
    regions
}

/// Merges a freshly rendered file against the previous on-disk text.
///
/// For every region segment: a body found in `previous` under the same
/// key is substituted in place of the default body (`preserved`); keys
/// without previous content keep their default (`generated`). With
/// `no_preserve` set and a previous file present, previous bodies are
/// deliberately not looked up and every region reports `ignored`. Keys
/// present only in the previous text are dropped without report.
pub fn merge(
    previous: Option<&str>,
    fresh: &RenderedFile,
    no_preserve: bool,
) -> (String, IndexMap<String, RegionOutcome>) {
    let ignoring = no_preserve && previous.is_some();
    let previous_regions = match previous {
        Some(text) if !no_preserve => collect_regions(text),
        _ => IndexMap::new(),
    };

    let mut text = String::new();
    let mut outcomes = IndexMap::new();
    for segment in &fresh.segments {
        match segment {
            Segment::Literal(literal) => text.push_str(literal),
            Segment::Region {
                key,
                indent,
                style,
                default_body,
            } => {
                let (body, status) = if ignoring {
                    (default_body.as_str(), RegionStatus::Ignored)
                } else {
                    match previous_regions.get(key) {
                        Some(previous_body) => (previous_body.as_str(), RegionStatus::Preserved),
                        None => (default_body.as_str(), RegionStatus::Generated),
                    }
                };
                text.push_str(indent);
                text.push_str(&style.begin_marker(key));
                text.push('\n');
                text.push_str(body);
                text.push_str(indent);
                text.push_str(&style.end_marker(key));
                text.push('\n');
                outcomes.insert(
                    key.clone(),
                    RegionOutcome {
                        status,
                        line_count: body.lines().count(),
                    },
                );
            }
        }
    }
    (text, outcomes)
}

/// Reports the regions of an already-persisted file without rewriting it.
/// Used when change detection decides to skip an asset.
pub fn scan_existing(text: &str) -> IndexMap<String, RegionOutcome> {
    collect_regions(text)
        .into_iter()
        .map(|(key, body)| {
            (
                key,
                RegionOutcome {
                    status: RegionStatus::Unchanged,
                    line_count: body.lines().count(),
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{FileKind, RegionStyle};

    fn fresh_file() -> RenderedFile {
        RenderedFile::new(
            FileKind::Source,
            vec![
                Segment::literal("top\n"),
                Segment::region("Key", "    ", RegionStyle::Bare, "    // default\n"),
                Segment::literal("bottom\n"),
            ],
        )
    }

    #[test]
    fn test_collect_regions_both_variants() {
        let text = "// <AttrForge::Preserve Begin: A>\ncustom a\n// <AttrForge::Preserve End: A>\n    // ATTRFORGE-PRESERVE BEGIN B\n    custom b\n    // ATTRFORGE-PRESERVE END B\n";
        let regions = collect_regions(text);
        assert_eq!(regions["A"], "custom a\n");
        assert_eq!(regions["B"], "    custom b\n");
    }

    #[test]
    fn test_unterminated_region_is_not_collected() {
        let text = "// ATTRFORGE-PRESERVE BEGIN Lonely\nnever closed\n";
        assert!(collect_regions(text).is_empty());
    }

    #[test]
    fn test_indentation_mismatch_is_not_collected() {
        let text = "    // ATTRFORGE-PRESERVE BEGIN Key\n    body\n// ATTRFORGE-PRESERVE END Key\n";
        assert!(collect_regions(text).is_empty());
    }

    #[test]
    fn test_merge_substitutes_previous_body() {
        let previous = "    // ATTRFORGE-PRESERVE BEGIN Key\n    custom content\n    // ATTRFORGE-PRESERVE END Key\n";
        let (text, outcomes) = merge(Some(previous), &fresh_file(), false);
        assert!(text.contains("    custom content\n"));
        assert!(!text.contains("// default"));
        assert_eq!(outcomes["Key"].status, RegionStatus::Preserved);
        assert_eq!(outcomes["Key"].line_count, 1);
    }

    #[test]
    fn test_merge_without_previous_generates_defaults() {
        let (text, outcomes) = merge(None, &fresh_file(), false);
        assert!(text.contains("    // default\n"));
        assert_eq!(outcomes["Key"].status, RegionStatus::Generated);
    }

    #[test]
    fn test_merge_no_preserve_reports_ignored() {
        let previous = "    // ATTRFORGE-PRESERVE BEGIN Key\n    custom content\n    // ATTRFORGE-PRESERVE END Key\n";
        let (text, outcomes) = merge(Some(previous), &fresh_file(), true);
        assert!(text.contains("    // default\n"));
        assert!(!text.contains("custom content"));
        assert_eq!(outcomes["Key"].status, RegionStatus::Ignored);
    }

    #[test]
    fn test_scan_existing_reports_unchanged() {
        let text = "\
// ATTRFORGE-PRESERVE BEGIN Key\n\
one\n\
two\n\
// ATTRFORGE-PRESERVE END Key\n";
        let outcomes = scan_existing(text);
        assert_eq!(outcomes["Key"].status, RegionStatus::Unchanged);
        assert_eq!(outcomes["Key"].line_count, 2);
    }
}
