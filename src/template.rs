//! Structured representation of rendered output files.
//!
//! The renderer emits an ordered list of typed segments instead of flat
//! text: literal spans and named preserve regions. The merger then
//! operates on this segment list directly and never has to re-scan text
//! it just produced; only previously written files are scanned for
//! markers.

use serde::Serialize;
use std::fmt;

/// The two marker comment variants used across generated files. Both are
/// plain-text comments and byte-reproducible across regenerations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionStyle {
    /// `// <AttrForge::Preserve Begin: KEY>`
    Angle,
    /// `// ATTRFORGE-PRESERVE BEGIN KEY`
    Bare,
}

impl RegionStyle {
    pub fn begin_marker(&self, key: &str) -> String {
        match self {
            RegionStyle::Angle => format!("// <AttrForge::Preserve Begin: {key}>"),
            RegionStyle::Bare => format!("// ATTRFORGE-PRESERVE BEGIN {key}"),
        }
    }

    pub fn end_marker(&self, key: &str) -> String {
        match self {
            RegionStyle::Angle => format!("// <AttrForge::Preserve End: {key}>"),
            RegionStyle::Bare => format!("// ATTRFORGE-PRESERVE END {key}"),
        }
    }
}

/// One span of a rendered file.
#[derive(Debug, Clone)]
pub enum Segment {
    /// Verbatim text, newlines included.
    Literal(String),
    /// A named preserve region anchored at this position.
    ///
    /// `default_body` holds zero or more complete lines (each ending in a
    /// newline) emitted the first time the file is generated.
    Region {
        key: String,
        indent: String,
        style: RegionStyle,
        default_body: String,
    },
}

impl Segment {
    pub fn literal(text: impl Into<String>) -> Self {
        Segment::Literal(text.into())
    }

    pub fn region(
        key: impl Into<String>,
        indent: &str,
        style: RegionStyle,
        default_body: &str,
    ) -> Self {
        Segment::Region {
            key: key.into(),
            indent: indent.to_string(),
            style,
            default_body: default_body.to_string(),
        }
    }
}

/// Kinds of files produced per asset, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FileKind {
    Header,
    Source,
    GeneratedHeader,
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FileKind::Header => "header",
            FileKind::Source => "source",
            FileKind::GeneratedHeader => "generatedHeader",
        };
        write!(f, "{label}")
    }
}

/// An ordered segment list for one output file.
#[derive(Debug, Clone)]
pub struct RenderedFile {
    pub kind: FileKind,
    pub segments: Vec<Segment>,
}

impl RenderedFile {
    pub fn new(kind: FileKind, segments: Vec<Segment>) -> Self {
        Self { kind, segments }
    }

    /// Flattens the segment list into the text written on first
    /// generation, with every region carrying its default body.
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(literal) => text.push_str(literal),
                Segment::Region {
                    key,
                    indent,
                    style,
                    default_body,
                } => {
                    text.push_str(indent);
                    text.push_str(&style.begin_marker(key));
                    text.push('\n');
                    text.push_str(default_body);
                    text.push_str(indent);
                    text.push_str(&style.end_marker(key));
                    text.push('\n');
                }
            }
        }
        text
    }

    /// Region keys in file order.
    pub fn region_keys(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Region { key, .. } => Some(key.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }
}

/// All rendered files of one asset.
#[derive(Debug, Clone)]
pub struct RenderedSet {
    pub header: RenderedFile,
    pub source: RenderedFile,
    pub generated_header: RenderedFile,
}

impl RenderedSet {
    pub fn files(&self) -> [&RenderedFile; 3] {
        [&self.header, &self.source, &self.generated_header]
    }
}
