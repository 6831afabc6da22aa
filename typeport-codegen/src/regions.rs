//! Custom-region preservation: parsing marked zones out of previously
//! generated files so manual edits survive regeneration.
//!
//! Zones are delimited by whole-line comment markers:
//!
//! ```text
//! // begin-custom-body
//! ...user-authored lines, captured verbatim...
//! // end-custom-body
//! ```
//!
//! Malformed markers never block regeneration; the zone is simply treated
//! as absent and a warning is recorded.

use std::path::Path;

use indexmap::IndexMap;

use crate::Diagnostic;

/// A preserved region extracted from an existing output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreservedZone {
    pub tag: String,
    /// Verbatim lines between the markers, without the markers. Kept as
    /// lines so blank lines (including trailing ones) survive re-emission.
    pub content: Vec<String>,
    /// Leading whitespace of the begin marker line.
    pub indent: String,
}

/// The begin marker line (unindented) for a tag.
pub fn begin_marker(tag: &str) -> String {
    format!("// begin-{tag}")
}

/// The end marker line (unindented) for a tag.
pub fn end_marker(tag: &str) -> String {
    format!("// end-{tag}")
}

/// Extract preserved zones for `tags` from the file at `path`.
///
/// A missing file is the first-generation case and yields no zones and no
/// diagnostics. An unreadable file or malformed markers yield warnings.
pub fn parse_zones(
    path: &Path,
    tags: &[String],
) -> (IndexMap<String, PreservedZone>, Vec<Diagnostic>) {
    match std::fs::read_to_string(path) {
        Ok(content) => parse_zones_str(&content, tags),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => (IndexMap::new(), Vec::new()),
        Err(e) => (
            IndexMap::new(),
            vec![
                Diagnostic::warning("render", format!("could not read existing file: {e}"))
                    .on(path.display().to_string()),
            ],
        ),
    }
}

/// Extract preserved zones from file content.
///
/// Only the first zone per tag is honored; later same-tag zones are
/// ignored. A begin marker without a matching end marker invalidates that
/// zone only.
pub fn parse_zones_str(
    content: &str,
    tags: &[String],
) -> (IndexMap<String, PreservedZone>, Vec<Diagnostic>) {
    let mut zones = IndexMap::new();
    let mut diagnostics = Vec::new();
    let lines: Vec<&str> = content.lines().collect();

    for tag in tags {
        if zones.contains_key(tag) {
            continue;
        }
        let begin = begin_marker(tag);
        let end = end_marker(tag);

        let Some(begin_idx) = lines.iter().position(|line| line.trim() == begin) else {
            continue;
        };
        let indent_len = lines[begin_idx].len() - lines[begin_idx].trim_start().len();
        let indent = lines[begin_idx][..indent_len].to_string();

        let Some(end_offset) = lines[begin_idx + 1..]
            .iter()
            .position(|line| line.trim() == end)
        else {
            diagnostics.push(Diagnostic::warning(
                "render",
                format!("zone '{tag}' has a begin marker but no end marker"),
            ));
            continue;
        };

        let body = &lines[begin_idx + 1..begin_idx + 1 + end_offset];
        zones.insert(
            tag.clone(),
            PreservedZone {
                tag: tag.clone(),
                content: body.iter().map(|line| line.to_string()).collect(),
                indent,
            },
        );
    }

    (zones, diagnostics)
}
