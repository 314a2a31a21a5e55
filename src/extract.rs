//! Response extraction: scene document body plus path-tagged script edits.
//!
//! The scan is a finite pass over byte offsets using the delimiter sets in
//! [`crate::fence`]. Malformed or partial input never fails; missing blocks
//! simply yield an empty result.

use crate::fence::{block_at, find_fence, next_tagged_block, tag_at, DOCUMENT_TAGS, SOURCE_TAGS};
use crate::paths::{base_dir, basename, join, DEFAULT_NAMESPACE};

/// Line prefix declaring the destination of the following script block.
pub const PATH_MARKER: &str = "Path:";

/// Extension given to generated script paths.
pub const SOURCE_EXTENSION: &str = "gd";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathOrigin {
    /// Declared by a `Path:` line in the response.
    Declared,
    /// Synthesized for a script block that had no `Path:` line.
    Generated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEdit {
    pub path: String,
    pub content: String,
    pub origin: PathOrigin,
}

/// Structured result of one response. Source paths are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedEdit {
    pub document_body: Option<String>,
    pub source_edits: Vec<SourceEdit>,
}

impl ExtractedEdit {
    pub fn is_empty(&self) -> bool {
        self.document_body.is_none() && self.source_edits.is_empty()
    }

    pub fn clear(&mut self) {
        self.document_body = None;
        self.source_edits.clear();
    }

    /// Records an edit, replacing any earlier edit for the same path.
    fn push_source(&mut self, path: String, content: &str, origin: PathOrigin) {
        self.source_edits.retain(|edit| edit.path != path);
        self.source_edits.push(SourceEdit {
            path,
            content: content.trim().to_string(),
            origin,
        });
    }
}

/// Parses `text` into an [`ExtractedEdit`].
///
/// `active_path` names the current edit target and seeds generated script
/// paths when the response carries script blocks without `Path:` lines.
pub fn extract(text: &str, active_path: Option<&str>) -> ExtractedEdit {
    let mut edit = ExtractedEdit {
        document_body: extract_document_body(text),
        source_edits: Vec::new(),
    };

    extract_declared_sources(text, &mut edit);
    if edit.source_edits.is_empty() {
        extract_untagged_sources(text, active_path, &mut edit);
    }

    tracing::debug!(
        document = edit.document_body.is_some(),
        sources = edit.source_edits.len(),
        "extracted edits from response"
    );
    edit
}

fn extract_document_body(text: &str) -> Option<String> {
    let block = next_tagged_block(text, 0, DOCUMENT_TAGS)?;
    let body = block.content.trim();
    (!body.is_empty()).then(|| body.to_string())
}

fn extract_declared_sources(text: &str, edit: &mut ExtractedEdit) {
    let mut pos = 0;

    while let Some(offset) = text[pos..].find(PATH_MARKER) {
        let marker = pos + offset;
        let Some(line_end) = text[marker..].find('\n').map(|offset| marker + offset) else {
            break;
        };
        let path = text[marker + PATH_MARKER.len()..line_end].trim();
        let Some(fence) = find_fence(text, line_end) else {
            break;
        };

        if path.is_empty() {
            pos = line_end;
            continue;
        }

        let Some(tag) = tag_at(text, fence, SOURCE_TAGS) else {
            // The next block belongs to something else; keep scanning after this line.
            pos = line_end;
            continue;
        };
        let Some(block) = block_at(text, fence, tag) else {
            break;
        };

        edit.push_source(path.to_string(), block.content, PathOrigin::Declared);
        pos = block.end;
    }
}

fn extract_untagged_sources(text: &str, active_path: Option<&str>, edit: &mut ExtractedEdit) {
    let mut pos = 0;
    let mut index = 0;

    while let Some(block) = next_tagged_block(text, pos, SOURCE_TAGS) {
        index += 1;
        edit.push_source(
            generated_source_path(active_path, index),
            block.content,
            PathOrigin::Generated,
        );
        pos = block.end;
    }
}

/// Destination for the `index`th (1-based) script block without a `Path:` line.
pub fn generated_source_path(active_path: Option<&str>, index: usize) -> String {
    match active_path.filter(|path| !path.trim().is_empty()) {
        None => format!("{DEFAULT_NAMESPACE}generated_script_{index}.{SOURCE_EXTENSION}"),
        Some(active) => join(
            base_dir(active),
            &format!("{}_script_{index}.{SOURCE_EXTENSION}", basename(active)),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_paths_follow_active_document() {
        assert_eq!(
            generated_source_path(Some("proj/foo.scene"), 1),
            "proj/foo_script_1.gd"
        );
        assert_eq!(
            generated_source_path(Some("res://main.tscn"), 2),
            "res://main_script_2.gd"
        );
        assert_eq!(generated_source_path(Some("level.tscn"), 1), "level_script_1.gd");
        assert_eq!(generated_source_path(None, 3), "res://generated_script_3.gd");
        assert_eq!(generated_source_path(Some("  "), 1), "res://generated_script_1.gd");
    }

    #[test]
    fn clear_empties_both_parts() {
        let mut edit = extract("```tscn\n[gd_scene]\n```\n```gd\nx\n```", None);
        assert!(!edit.is_empty());

        edit.clear();

        assert!(edit.is_empty());
    }
}
