//! Finding the markdown files of a category.
//!
//! Flat categories only look at files directly in the root; hierarchical
//! ones walk every depth. Hidden entries are skipped and `.gitignore` is not
//! consulted: anything in the content tree is content.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use quire_core::Category;
use tracing::warn;

/// Restricts a pass to a subset of files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DocumentFilter {
    #[default]
    All,
    /// Only these files (canonical paths).
    Changed(HashSet<PathBuf>),
}

impl DocumentFilter {
    /// Build a change filter. Paths that no longer exist are dropped since
    /// there is nothing left to sync for them.
    pub fn changed<I>(paths: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        Self::Changed(
            paths
                .into_iter()
                .filter_map(|path| std::fs::canonicalize(path).ok())
                .collect(),
        )
    }

    #[must_use]
    pub fn admits(&self, path: &Path) -> bool {
        match self {
            Self::All => true,
            Self::Changed(paths) => {
                paths.contains(path)
                    || std::fs::canonicalize(path).is_ok_and(|canonical| paths.contains(&canonical))
            }
        }
    }
}

/// Markdown files of one category in processing order, or `None` when the
/// category root does not exist.
#[must_use]
pub fn discover_documents(
    category: Category,
    root: &Path,
    filter: &DocumentFilter,
) -> Option<Vec<PathBuf>> {
    if !root.is_dir() {
        return None;
    }

    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .hidden(true)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b));
    if !category.is_hierarchical() {
        builder.max_depth(Some(1));
    }

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                warn!(root = %root.display(), %error, "skipping unreadable entry");
                continue;
            }
        };
        let path = entry.path();
        let is_markdown = entry.file_type().is_some_and(|ft| ft.is_file())
            && path.extension().is_some_and(|ext| ext == "md");
        if is_markdown && filter.admits(path) {
            files.push(path.to_path_buf());
        }
    }
    Some(files)
}
