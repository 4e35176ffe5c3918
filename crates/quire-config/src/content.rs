//! Content layout and per-category defaults.

use quire_core::Category;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;

fn default_root() -> String {
    String::from(".")
}

fn default_blog_dir() -> String {
    String::from("blog")
}

fn default_wiki_dir() -> String {
    String::from("wiki")
}

fn default_post_category() -> String {
    String::from("thoughts")
}

fn default_thumbnail() -> String {
    String::from("backgrounds/wall1.jpg")
}

fn default_posts_table() -> String {
    String::from("posts")
}

fn default_nodes_table() -> String {
    String::from("wiki_nodes")
}

fn default_contents_table() -> String {
    String::from("wiki_contents")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContentConfig {
    /// Directory containing the category folders.
    #[serde(default = "default_root")]
    pub root: String,

    #[serde(default = "default_blog_dir")]
    pub blog_dir: String,

    #[serde(default = "default_wiki_dir")]
    pub wiki_dir: String,

    /// Post `category` when front matter has none.
    #[serde(default = "default_post_category")]
    pub default_post_category: String,

    /// Post `thumb` when front matter has none.
    #[serde(default = "default_thumbnail")]
    pub default_thumbnail: String,

    #[serde(default = "default_posts_table")]
    pub posts_table: String,

    #[serde(default = "default_nodes_table")]
    pub nodes_table: String,

    #[serde(default = "default_contents_table")]
    pub contents_table: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            blog_dir: default_blog_dir(),
            wiki_dir: default_wiki_dir(),
            default_post_category: default_post_category(),
            default_thumbnail: default_thumbnail(),
            posts_table: default_posts_table(),
            nodes_table: default_nodes_table(),
            contents_table: default_contents_table(),
        }
    }
}

impl ContentConfig {
    /// Directory holding one category's markdown files.
    pub fn category_root(&self, category: Category) -> PathBuf {
        let dir = match category {
            Category::Blog => &self.blog_dir,
            Category::Wiki => &self.wiki_dir,
        };
        PathBuf::from(&self.root).join(dir)
    }

    /// Reject table names that are not plain SQL identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first bad table.
    pub fn validate_tables(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("content.posts_table", &self.posts_table),
            ("content.nodes_table", &self.nodes_table),
            ("content.contents_table", &self.contents_table),
        ] {
            if !is_identifier(value) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: format!("'{value}' is not a plain SQL identifier"),
                });
            }
        }
        Ok(())
    }
}

fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_roots_join_content_root() {
        let config = ContentConfig {
            root: "/site".into(),
            ..Default::default()
        };
        assert_eq!(config.category_root(Category::Blog), PathBuf::from("/site/blog"));
        assert_eq!(config.category_root(Category::Wiki), PathBuf::from("/site/wiki"));
    }

    #[test]
    fn default_tables_are_valid() {
        assert!(ContentConfig::default().validate_tables().is_ok());
    }

    #[test]
    fn rejects_injected_table_name() {
        let config = ContentConfig {
            posts_table: "posts; DROP TABLE posts".into(),
            ..Default::default()
        };
        let err = config.validate_tables().unwrap_err();
        assert!(err.to_string().contains("content.posts_table"));
    }
}
