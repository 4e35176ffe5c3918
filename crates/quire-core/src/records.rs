//! Rows owned by the remote store.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::document::PostMeta;

/// `parent_id` of top-level tree nodes.
pub const ROOT_PARENT_ID: i64 = 0;

/// Publication time of a post; `None` defers to the store clock.
pub type PublishedAt = Option<NaiveDateTime>;

/// One blog post row, keyed by its unique title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub title: String,
    pub category: String,
    pub post_type: String,
    pub language: String,
    pub is_open_source: bool,
    pub project_name: String,
    pub thumbnail_url: String,
    pub body: String,
    pub published_at: PublishedAt,
}

impl PostRecord {
    /// Assemble the row for a post whose body has already been rewritten.
    #[must_use]
    pub fn from_meta(title: &str, meta: &PostMeta, body: String) -> Self {
        Self {
            title: title.to_string(),
            category: meta.category.clone(),
            post_type: meta.post_type.clone(),
            language: meta.language.clone(),
            is_open_source: meta.is_open_source,
            project_name: meta.project_name.clone(),
            thumbnail_url: meta.thumbnail_url.clone(),
            body,
            published_at: meta.published_at,
        }
    }
}

/// A wiki tree node. `(title, parent_id)` is unique in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: i64,
    pub title: String,
    pub parent_id: i64,
    /// `false` for directory-only ancestors.
    pub has_content: bool,
}

/// Body of a content-bearing node, replaced wholesale on every sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeContent {
    pub node_id: i64,
    pub body: String,
}
