use pretty_assertions::assert_eq;
use scene_composer::sanitize;
use scene_composer::sanitize::{DOCUMENT_MARKER, SOURCE_MARKER};

#[test]
fn text_without_blocks_is_unchanged() {
    let inputs = [
        "",
        "Just an explanation.",
        "Inline `code` and ``` alone",
        "```python\nprint('hi')\n```",
    ];

    for input in inputs {
        assert_eq!(sanitize(input), input);
    }
}

#[test]
fn each_extracted_block_becomes_one_marker() {
    let text = concat!(
        "Before\n",
        "```tscn\n[gd_scene]\n```\n",
        "Middle\n",
        "Path: res://a.gd\n```gdscript\nextends Node\n```\n",
        "```gd\nvar x = 1\n```\n",
        "After",
    );

    let sanitized = sanitize(text);

    assert_eq!(
        sanitized,
        format!(
            "Before\n{DOCUMENT_MARKER}\nMiddle\nPath: res://a.gd\n{SOURCE_MARKER}\n{SOURCE_MARKER}\nAfter"
        )
    );
    assert_eq!(sanitized.matches(DOCUMENT_MARKER).count(), 1);
    assert_eq!(sanitized.matches(SOURCE_MARKER).count(), 2);
    assert!(!sanitized.contains("```"));
}

#[test]
fn foreign_blocks_survive_between_extracted_ones() {
    let text = "```json\n{}\n```\n```TSCN\n[gd_scene]\n```";
    assert_eq!(sanitize(text), format!("```json\n{{}}\n```\n{DOCUMENT_MARKER}"));
}

#[test]
fn unterminated_block_is_left_verbatim() {
    let text = "```gd\nok\n```\ntail ```tscn\n[gd_scene] cut off";
    assert_eq!(
        sanitize(text),
        format!("{SOURCE_MARKER}\ntail ```tscn\n[gd_scene] cut off")
    );
}
