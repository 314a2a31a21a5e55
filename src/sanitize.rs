//! Display-safe transcript text with extracted blocks elided.

use crate::fence::{block_at, find_fence, tag_at, DOCUMENT_TAGS, SOURCE_TAGS};

pub const DOCUMENT_MARKER: &str = "[TSCN code extracted]";
pub const SOURCE_MARKER: &str = "[GDScript code extracted]";

/// Replaces every scene and script fenced block with a short marker.
///
/// Uses the same tag sets as [`crate::extract::extract`]; prose and
/// foreign fences pass through unchanged. An unterminated block stops the
/// scan and the remainder is kept verbatim.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut pos = 0;

    while let Some(start) = find_fence(text, pos) {
        let opening = tag_at(text, start, DOCUMENT_TAGS)
            .map(|tag| (tag, DOCUMENT_MARKER))
            .or_else(|| tag_at(text, start, SOURCE_TAGS).map(|tag| (tag, SOURCE_MARKER)));

        let Some((tag, marker)) = opening else {
            pos = start + 1;
            continue;
        };
        let Some(block) = block_at(text, start, tag) else {
            break;
        };

        out.push_str(&text[copied..block.start]);
        out.push_str(marker);
        copied = block.end;
        pos = block.end;
    }

    out.push_str(&text[copied..]);
    out
}
