//! Parsed source documents and their typed metadata.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::category::Category;
use crate::rel_dir::RelDir;

/// Metadata recognised on blog posts.
///
/// Every field carries its default already applied; see `quire-parser` for
/// the front-matter keys and fallbacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostMeta {
    pub category: String,
    pub post_type: String,
    pub language: String,
    pub is_open_source: bool,
    pub project_name: String,
    pub thumbnail_url: String,
    /// `None` lets the store stamp the row with its own current time.
    pub published_at: Option<NaiveDateTime>,
}

/// Metadata recognised on wiki pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikiMeta {
    /// Explicit parent for files placed directly in the wiki root.
    pub parent_title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentMeta {
    Post(PostMeta),
    Wiki(WikiMeta),
}

/// A markdown source file, split and typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub category: Category,
    /// Trimmed, never empty.
    pub title: String,
    pub body: String,
    pub meta: DocumentMeta,
    pub source_path: PathBuf,
    /// Directory of the file relative to the category root.
    pub rel_dir: RelDir,
    /// Non-fatal parse notes (e.g. unreadable front matter that was ignored).
    pub notes: Vec<String>,
}

impl Document {
    /// Directory holding the file; image links resolve against it.
    #[must_use]
    pub fn document_dir(&self) -> &Path {
        self.source_path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Directory whose node chain becomes this page's ancestors.
    ///
    /// Root-level wiki pages may name a single parent through `parent_title`;
    /// nested pages always follow their directory.
    #[must_use]
    pub fn ancestor_dir(&self) -> RelDir {
        if self.rel_dir.is_root()
            && let DocumentMeta::Wiki(WikiMeta {
                parent_title: Some(parent),
            }) = &self.meta
        {
            return RelDir::from_segments([parent.trim().to_string()]);
        }
        self.rel_dir.clone()
    }

    #[must_use]
    pub const fn post_meta(&self) -> Option<&PostMeta> {
        match &self.meta {
            DocumentMeta::Post(meta) => Some(meta),
            DocumentMeta::Wiki(_) => None,
        }
    }
}
