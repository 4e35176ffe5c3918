//! Table names and DDL for each category.
//!
//! Every statement uses `IF NOT EXISTS`, so applying the schema is safe to
//! repeat.

use quire_config::ContentConfig;
use quire_core::Category;

use crate::error::StoreError;
use crate::sql::{Command, CommandKind, Ident};

/// The validated table names one sync run writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    pub posts: Ident,
    pub nodes: Ident,
    pub contents: Ident,
}

impl TableNames {
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidIdentifier`] for the first bad name.
    pub fn new(posts: &str, nodes: &str, contents: &str) -> Result<Self, StoreError> {
        Ok(Self {
            posts: Ident::new(posts)?,
            nodes: Ident::new(nodes)?,
            contents: Ident::new(contents)?,
        })
    }

    /// # Errors
    ///
    /// Returns [`StoreError::InvalidIdentifier`] for the first bad name.
    pub fn from_config(config: &ContentConfig) -> Result<Self, StoreError> {
        Self::new(
            &config.posts_table,
            &config.nodes_table,
            &config.contents_table,
        )
    }

    /// DDL for the tables a category uses.
    #[must_use]
    pub fn schema_for(&self, category: Category) -> Command {
        let sql = match category {
            Category::Blog => format!(
                "CREATE TABLE IF NOT EXISTS {posts} (\n\
                 \x20   id INTEGER PRIMARY KEY AUTOINCREMENT,\n\
                 \x20   title TEXT UNIQUE NOT NULL,\n\
                 \x20   category TEXT,\n\
                 \x20   post_type TEXT,\n\
                 \x20   language TEXT,\n\
                 \x20   is_open_source INTEGER NOT NULL DEFAULT 0,\n\
                 \x20   project_name TEXT,\n\
                 \x20   content TEXT,\n\
                 \x20   thumb_url TEXT,\n\
                 \x20   date DATETIME DEFAULT CURRENT_TIMESTAMP\n\
                 );",
                posts = self.posts
            ),
            Category::Wiki => format!(
                "CREATE TABLE IF NOT EXISTS {nodes} (\n\
                 \x20   id INTEGER PRIMARY KEY AUTOINCREMENT,\n\
                 \x20   title TEXT NOT NULL,\n\
                 \x20   parent_id INTEGER NOT NULL DEFAULT 0,\n\
                 \x20   has_content INTEGER NOT NULL DEFAULT 0,\n\
                 \x20   sort_order INTEGER NOT NULL DEFAULT 0,\n\
                 \x20   UNIQUE(title, parent_id)\n\
                 );\n\
                 CREATE TABLE IF NOT EXISTS {contents} (\n\
                 \x20   node_id INTEGER PRIMARY KEY,\n\
                 \x20   content TEXT\n\
                 );",
                nodes = self.nodes,
                contents = self.contents
            ),
        };
        Command::new(sql, CommandKind::Schema)
    }
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            posts: Ident(String::from("posts")),
            nodes: Ident(String::from("wiki_nodes")),
            contents: Ident(String::from("wiki_contents")),
        }
    }
}
