//! Helpers for project-style path strings.
//!
//! Paths exchanged with the model and the host are plain strings that may use
//! the `res://` namespace, so these helpers operate on `&str` rather than
//! [`std::path::Path`].

/// Namespace prefix mapped onto the project root directory.
pub const DEFAULT_NAMESPACE: &str = "res://";

/// Returns the final path component.
pub fn file_name(path: &str) -> &str {
    let path = path.strip_prefix(DEFAULT_NAMESPACE).unwrap_or(path);
    path.rsplit('/').next().unwrap_or(path)
}

/// Returns the file name without its last extension.
pub fn basename(path: &str) -> &str {
    let name = file_name(path);
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}

/// Returns the lower-cased extension of the file name, if any.
pub fn extension(path: &str) -> Option<String> {
    let name = file_name(path);
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext.to_ascii_lowercase()),
        _ => None,
    }
}

/// Returns the directory portion of `path`.
///
/// `res://scenes/main.tscn` yields `res://scenes`, `res://main.tscn` yields
/// `res://`, and a bare file name yields an empty string.
pub fn base_dir(path: &str) -> &str {
    if let Some(rest) = path.strip_prefix(DEFAULT_NAMESPACE) {
        return match rest.rfind('/') {
            Some(index) => &path[..DEFAULT_NAMESPACE.len() + index],
            None => DEFAULT_NAMESPACE,
        };
    }

    match path.rfind('/') {
        Some(0) => "/",
        Some(index) => &path[..index],
        None => "",
    }
}

/// Joins a directory and a file name with a single separator.
pub fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}
