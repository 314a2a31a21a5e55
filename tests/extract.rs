use pretty_assertions::assert_eq;
use scene_composer::{extract, ExtractedEdit, PathOrigin, SourceEdit};

fn declared(path: &str, content: &str) -> SourceEdit {
    SourceEdit {
        path: path.to_string(),
        content: content.to_string(),
        origin: PathOrigin::Declared,
    }
}

fn generated(path: &str, content: &str) -> SourceEdit {
    SourceEdit {
        path: path.to_string(),
        content: content.to_string(),
        origin: PathOrigin::Generated,
    }
}

#[test]
fn scene_body_and_declared_scripts_are_recovered() {
    let scene = "[gd_scene load_steps=2 format=3]\n\n[node name=\"Root\" type=\"Node2D\"]";
    let scripts = [
        ("res://scripts/player.gd", "extends CharacterBody2D\n\nvar speed = 200"),
        ("res://scripts/enemy.gd", "extends Area2D"),
    ];

    let mut text = format!("Here you go.\n\n```tscn\n{scene}\n```\n\nAnd the scripts:\n\n");
    for (path, body) in scripts {
        text.push_str(&format!("Path: {path}\n```gdscript\n{body}\n```\n\n"));
    }

    let edit = extract(&text, Some("res://main.tscn"));

    assert_eq!(
        edit,
        ExtractedEdit {
            document_body: Some(scene.to_string()),
            source_edits: scripts
                .iter()
                .map(|(path, body)| declared(path, body))
                .collect(),
        }
    );
}

#[test]
fn upper_case_scene_tag_is_accepted() {
    let edit = extract("```TSCN\n[gd_scene format=3]\n```", None);
    assert_eq!(edit.document_body.as_deref(), Some("[gd_scene format=3]"));
}

#[test]
fn first_scene_block_wins() {
    let text = "```tscn\n[gd_scene id=1]\n```\n```tscn\n[gd_scene id=2]\n```";
    let edit = extract(text, None);
    assert_eq!(edit.document_body.as_deref(), Some("[gd_scene id=1]"));
}

#[test]
fn blank_scene_block_yields_no_body() {
    let edit = extract("```tscn\n   \n```", None);
    assert_eq!(edit.document_body, None);
}

#[test]
fn declared_paths_suppress_untagged_fallback() {
    let text = "Path: res://a.gd\n```gd\na\n```\n\n```gd\nstray\n```\n";
    let edit = extract(text, Some("res://main.tscn"));
    assert_eq!(edit.source_edits, vec![declared("res://a.gd", "a")]);
}

#[test]
fn untagged_scripts_are_numbered_next_to_active_scene() {
    let text = "```gdscript\none\n```\nsome prose\n```gd\ntwo\n```";
    let edit = extract(text, Some("res://levels/forest.tscn"));
    assert_eq!(
        edit.source_edits,
        vec![
            generated("res://levels/forest_script_1.gd", "one"),
            generated("res://levels/forest_script_2.gd", "two"),
        ]
    );
}

#[test]
fn untagged_scripts_without_active_scene_use_default_namespace() {
    let edit = extract("```gd\nextends Node\n```", None);
    assert_eq!(
        edit.source_edits,
        vec![generated("res://generated_script_1.gd", "extends Node")]
    );
}

#[test]
fn repeated_path_keeps_only_the_later_content() {
    let text = concat!(
        "Path: res://a.gd\n```gd\nfirst\n```\n",
        "Path: res://b.gd\n```gd\nb\n```\n",
        "Path: res://a.gd\n```gd\nsecond\n```\n",
    );

    let edit = extract(text, None);

    assert_eq!(
        edit.source_edits,
        vec![declared("res://b.gd", "b"), declared("res://a.gd", "second")]
    );
}

#[test]
fn path_line_followed_by_foreign_block_is_skipped() {
    let text = "Path: res://a.gd\n```python\nprint()\n```\n```gd\nx\n```";
    let edit = extract(text, None);
    assert_eq!(
        edit.source_edits,
        vec![generated("res://generated_script_1.gd", "x")]
    );
}

#[test]
fn blank_path_line_is_skipped() {
    let edit = extract("Path:   \n```gd\nx\n```", None);
    assert_eq!(
        edit.source_edits,
        vec![generated("res://generated_script_1.gd", "x")]
    );
}

#[test]
fn malformed_input_yields_empty_edit() {
    let inputs = [
        "",
        "plain prose without any blocks",
        "```tscn\n[gd_scene] never closed",
        "Path: res://a.gd",
        "Path: res://a.gd\n```gd\nunterminated",
        "```\nuntagged\n```",
        "```python\nprint()\n```",
    ];

    for input in inputs {
        assert!(extract(input, None).is_empty(), "input: {input:?}");
    }
}

#[test]
fn unterminated_script_does_not_discard_scene() {
    let text = "```tscn\n[gd_scene]\n```\nPath: res://a.gd\n```gd\nextends";
    let edit = extract(text, None);
    assert_eq!(edit.document_body.as_deref(), Some("[gd_scene]"));
    assert!(edit.source_edits.is_empty());
}
