//! Applies an [`ExtractedEdit`] to the filesystem.
//!
//! Every artifact is written independently: a failed document write never
//! blocks script writes and a failed script never blocks its siblings.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::thread;
use std::time::Duration;

use crate::error::ChatError;
use crate::extract::ExtractedEdit;
use crate::paths::{base_dir, DEFAULT_NAMESPACE};

pub const BACKUP_SUFFIX: &str = ".backup";

/// Prefixes accepted at the start of a scene document.
pub const DOCUMENT_ROOT_MARKERS: &[&str] = &["[gd_scene", "[gd_resource"];

/// Retry tunables for the document write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyPolicy {
    pub document_write_attempts: u32,
    pub retry_backoff: Duration,
}

impl Default for ApplyPolicy {
    fn default() -> Self {
        Self {
            document_write_attempts: 3,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

/// True when `content` starts with a scene root marker.
pub fn is_document_root(content: &str) -> bool {
    let content = content.trim_start();
    DOCUMENT_ROOT_MARKERS
        .iter()
        .any(|marker| content.starts_with(marker))
}

/// Sibling path receiving the previous content before an overwrite.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut backup = path.as_os_str().to_owned();
    backup.push(BACKUP_SUFFIX);
    PathBuf::from(backup)
}

#[derive(Debug)]
pub struct ArtifactFailure {
    pub path: String,
    pub error: ChatError,
}

/// Per-invocation summary of an apply.
#[derive(Debug, Default)]
pub struct ApplyOutcome {
    pub document_applied: bool,
    pub document_error: Option<ChatError>,
    /// Filesystem paths of scripts written, in edit order.
    pub applied_sources: Vec<PathBuf>,
    pub source_failures: Vec<ArtifactFailure>,
    pub backups_created: Vec<PathBuf>,
}

impl ApplyOutcome {
    pub fn sources_applied(&self) -> usize {
        self.applied_sources.len()
    }

    /// Edit paths of the scripts that failed, in edit order.
    pub fn sources_failed(&self) -> Vec<&str> {
        self.source_failures
            .iter()
            .map(|failure| failure.path.as_str())
            .collect()
    }

    pub fn any_success(&self) -> bool {
        self.document_applied || !self.applied_sources.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ApplyEngine {
    project_root: PathBuf,
    policy: ApplyPolicy,
}

impl ApplyEngine {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            policy: ApplyPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ApplyPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn policy(&self) -> ApplyPolicy {
        self.policy
    }

    /// Maps a project-style path onto the filesystem.
    ///
    /// `res://` paths resolve under the project root and absolute paths are
    /// kept. Other paths are relative to the active document's directory, or
    /// to the project root when there is no active document.
    pub fn resolve(&self, path: &str, active: Option<&str>) -> PathBuf {
        if let Some(rest) = path.strip_prefix(DEFAULT_NAMESPACE) {
            return self.project_root.join(rest);
        }
        if Path::new(path).is_absolute() {
            return PathBuf::from(path);
        }

        let base = active
            .map(base_dir)
            .filter(|dir| !dir.is_empty())
            .map(|dir| self.resolve(dir, None))
            .unwrap_or_else(|| self.project_root.clone());
        base.join(path)
    }

    /// Maps a script path from a response onto the filesystem.
    ///
    /// Only `res://` paths are rooted; every other path, absolute ones
    /// included, lands under the active document's directory. Parent
    /// components are rejected so the result never leaves the project.
    pub fn resolve_source(&self, path: &str, active: Option<&str>) -> Result<PathBuf, ChatError> {
        let (base, relative) = match path.strip_prefix(DEFAULT_NAMESPACE) {
            Some(rest) => (self.project_root.clone(), rest),
            None => {
                let base = active
                    .map(base_dir)
                    .filter(|dir| !dir.is_empty())
                    .map(|dir| self.resolve(dir, None))
                    .unwrap_or_else(|| self.project_root.clone());
                (base, path)
            }
        };

        let mut resolved = base;
        for component in Path::new(relative).components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
                Component::ParentDir => {
                    return Err(ChatError::PathOutsideProject {
                        path: path.to_string(),
                    });
                }
            }
        }
        Ok(resolved)
    }

    /// Writes the document body and every source edit.
    ///
    /// Fails with [`ChatError::NoActiveTarget`] before touching the
    /// filesystem when a document body is present without an active target.
    pub fn apply(
        &self,
        edit: &ExtractedEdit,
        active: Option<&str>,
    ) -> Result<ApplyOutcome, ChatError> {
        let active = active.filter(|path| !path.trim().is_empty());
        let mut outcome = ApplyOutcome::default();

        if let Some(body) = &edit.document_body {
            let target = self.resolve(active.ok_or(ChatError::NoActiveTarget)?, None);
            self.apply_document(&target, body, &mut outcome);
        }

        for source in &edit.source_edits {
            let written = self.resolve_source(&source.path, active).and_then(|target| {
                self.write_source(&target, &source.content, &mut outcome.backups_created)?;
                Ok(target)
            });
            match written {
                Ok(target) => {
                    tracing::info!(path = %target.display(), "wrote script");
                    outcome.applied_sources.push(target);
                }
                Err(error) => {
                    tracing::warn!(path = %source.path, %error, "script write failed");
                    outcome.source_failures.push(ArtifactFailure {
                        path: source.path.clone(),
                        error,
                    });
                }
            }
        }

        Ok(outcome)
    }

    fn apply_document(&self, target: &Path, body: &str, outcome: &mut ApplyOutcome) {
        if !is_document_root(body) {
            tracing::warn!(path = %target.display(), "rejected document without root marker");
            outcome.document_error = Some(ChatError::InvalidDocumentContent {
                path: target.to_path_buf(),
            });
            return;
        }

        if let Some(backup) = backup_existing(target) {
            outcome.backups_created.push(backup);
        }

        match self.write_with_retry(target, body) {
            Ok(()) => {
                tracing::info!(path = %target.display(), "wrote document");
                outcome.document_applied = true;
            }
            Err(error) => outcome.document_error = Some(error),
        }
    }

    fn write_with_retry(&self, path: &Path, content: &str) -> Result<(), ChatError> {
        retry_write(self.policy, path, || fs::write(path, content)).map(|_| ())
    }

    fn write_source(
        &self,
        target: &Path,
        content: &str,
        backups: &mut Vec<PathBuf>,
    ) -> Result<(), ChatError> {
        if let Some(parent) = target.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|source| ChatError::directory_creation(parent, source))?;
        }

        if let Some(backup) = backup_existing(target) {
            backups.push(backup);
        }

        fs::write(target, content).map_err(|source| ChatError::WriteFailed {
            path: target.to_path_buf(),
            attempts: 1,
            source,
        })
    }
}

/// Runs `write` up to `policy.document_write_attempts` times, sleeping the
/// backoff between attempts. Returns the attempt that succeeded.
fn retry_write<F>(policy: ApplyPolicy, path: &Path, mut write: F) -> Result<u32, ChatError>
where
    F: FnMut() -> io::Result<()>,
{
    let attempts = policy.document_write_attempts.max(1);
    let mut attempt = 1;

    loop {
        match write() {
            Ok(()) => return Ok(attempt),
            Err(source) if attempt >= attempts => {
                return Err(ChatError::WriteFailed {
                    path: path.to_path_buf(),
                    attempts,
                    source,
                });
            }
            Err(error) => {
                tracing::warn!(
                    path = %path.display(),
                    attempt,
                    %error,
                    "document write failed; retrying"
                );
                thread::sleep(policy.retry_backoff);
                attempt += 1;
            }
        }
    }
}

/// Copies an existing file to its backup sibling. Failures are logged only.
fn backup_existing(path: &Path) -> Option<PathBuf> {
    if !path.is_file() {
        return None;
    }

    let backup = backup_path(path);
    match fs::copy(path, &backup) {
        Ok(_) => Some(backup),
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "backup failed");
            None
        }
    }
}
