//! Literal fence scanning shared by the extractor and the sanitizer.
//!
//! A fence opens with [`FENCE`] immediately followed by a tag and closes at
//! the next [`FENCE`] occurrence. Matching is purely lexical: a delimiter
//! inside block content closes the block early.

/// Opening and closing delimiter token.
pub const FENCE: &str = "```";

/// Tags marking a scene document block.
pub const DOCUMENT_TAGS: &[&str] = &["tscn", "TSCN"];

/// Tags marking a script source block.
pub const SOURCE_TAGS: &[&str] = &["gdscript", "gd"];

/// A terminated, tagged fenced block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FencedBlock<'a> {
    /// Byte offset of the opening delimiter.
    pub start: usize,
    /// Byte offset just past the closing delimiter.
    pub end: usize,
    pub tag: &'static str,
    /// Raw text between the tag and the closing delimiter.
    pub content: &'a str,
}

/// Returns the offset of the next delimiter at or after `from`.
pub fn find_fence(text: &str, from: usize) -> Option<usize> {
    text.get(from..)?.find(FENCE).map(|offset| from + offset)
}

/// Returns the longest tag from `tags` directly following the delimiter at `fence_start`.
pub fn tag_at(text: &str, fence_start: usize, tags: &[&'static str]) -> Option<&'static str> {
    let after = text.get(fence_start + FENCE.len()..)?;
    tags.iter()
        .copied()
        .filter(|tag| after.starts_with(tag))
        .max_by_key(|tag| tag.len())
}

/// Finds the earliest block opened with one of `tags` at or after `from`.
///
/// Returns `None` when no such opening exists or when the first one found is
/// never closed.
pub fn next_tagged_block<'a>(
    text: &'a str,
    from: usize,
    tags: &[&'static str],
) -> Option<FencedBlock<'a>> {
    let mut pos = from;
    loop {
        let start = find_fence(text, pos)?;
        if let Some(tag) = tag_at(text, start, tags) {
            return block_at(text, start, tag);
        }
        pos = start + 1;
    }
}

/// Builds the block opened at `start` with `tag`, if it is closed.
pub fn block_at<'a>(text: &'a str, start: usize, tag: &'static str) -> Option<FencedBlock<'a>> {
    let content_start = start + FENCE.len() + tag.len();
    let close = find_fence(text, content_start)?;
    Some(FencedBlock {
        start,
        end: close + FENCE.len(),
        tag,
        content: &text[content_start..close],
    })
}
