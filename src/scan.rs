//! Corpus discovery: walk a directory tree in natural order and yield the
//! documents a run should check.
//!
//! The scan is depth-first with entries sorted per directory level, so runs
//! over the same tree always visit documents in the same order. An unreadable
//! directory is fatal: a partial scan cannot stand in for the corpus.

use crate::natsort::NaturalKey;
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// How a discovered document is checked. Decided once here, from the file
/// extension, and matched exhaustively by the mode drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Convertible to runnable code (and to markdown for link checks).
    Notebook,
    /// Markdown page, checked for links only.
    Markdown,
}

/// One corpus item: a path plus the directory that contains it.
///
/// The containing directory doubles as the working directory for the
/// document's child process, so relative data references inside an example
/// resolve the way they do for an author running it in place.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    pub dir: PathBuf,
    pub kind: DocumentKind,
}

/// Which file kinds a scan yields. Link checking covers a superset of the
/// execution corpus (markdown pages carry links but nothing to run).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    Execution,
    Links,
}

/// Bare file names skipped unconditionally during a scan. Names, not paths:
/// an entry anywhere in the tree with a listed name is skipped.
#[derive(Debug, Clone, Default)]
pub struct IgnoreSet(BTreeSet<String>);

impl IgnoreSet {
    pub fn new<I>(names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        IgnoreSet(names.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }
}

/// Walk `root` and return every matching document in natural order.
pub fn scan(root: &Path, ignore: &IgnoreSet, mode: ScanMode) -> Result<Vec<Document>> {
    let mut documents = Vec::new();
    scan_dir(root, ignore, mode, &mut documents)?;
    tracing::debug!(
        root = %root.display(),
        count = documents.len(),
        "corpus scan complete"
    );
    Ok(documents)
}

fn scan_dir(
    dir: &Path,
    ignore: &IgnoreSet,
    mode: ScanMode,
    out: &mut Vec<Document>,
) -> Result<()> {
    let reader = fs::read_dir(dir)
        .with_context(|| format!("read corpus directory {}", dir.display()))?;
    let mut names = Vec::new();
    for entry in reader {
        let entry =
            entry.with_context(|| format!("read corpus directory {}", dir.display()))?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort_by_cached_key(|name| NaturalKey::new(name));

    for name in names {
        if ignore.contains(&name) {
            continue;
        }
        let path = dir.join(&name);
        if path.is_dir() {
            // Hidden directories are never entered.
            if name.starts_with('.') {
                continue;
            }
            scan_dir(&path, ignore, mode, out)?;
        } else if let Some(kind) = document_kind(&name, mode) {
            out.push(Document {
                path,
                dir: dir.to_path_buf(),
                kind,
            });
        }
    }
    Ok(())
}

fn document_kind(name: &str, mode: ScanMode) -> Option<DocumentKind> {
    let extension = Path::new(name).extension()?.to_str()?;
    match (extension, mode) {
        ("ipynb", _) => Some(DocumentKind::Notebook),
        ("md", ScanMode::Links) => Some(DocumentKind::Markdown),
        _ => None,
    }
}
