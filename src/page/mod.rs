//! Page model and collection.
//!
//! A `Page` is one static HTML file, read fresh from disk on every run.
//! Pages are never persisted; only the derived artifacts are.

pub mod extract;

use crate::utils::slug;
use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// One static HTML page loaded into memory.
#[derive(Debug, Clone)]
pub struct Page {
    pub path: PathBuf,
    pub slug: String,
    pub html: String,
}

impl Page {
    /// Read a page from disk.
    pub fn read(path: &Path) -> Result<Self> {
        let html = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            slug: slug::slug_of(path),
            html,
        })
    }

    /// Write the (possibly rewritten) page back to its file.
    pub fn write(&self) -> Result<()> {
        fs::write(&self.path, &self.html)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }

    /// File name for logs and skip lists.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Collect all `*.html` files under `dir`, minus excluded file names.
///
/// Sorted by path so every pass and artifact is deterministic.
pub fn collect_html_files(dir: &Path, exclude: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in jwalk::WalkDir::new(dir).sort(true) {
        let entry = entry.with_context(|| format!("failed to walk {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("html") {
            continue;
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if exclude.iter().any(|e| e == &name) {
            continue;
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}
