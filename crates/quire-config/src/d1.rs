//! Cloudflare D1 (remote store) configuration.

use quire_core::Category;
use serde::{Deserialize, Serialize};

fn default_program() -> String {
    String::from("npx")
}

fn default_program_args() -> Vec<String> {
    vec![String::from("wrangler")]
}

fn default_database_prefix() -> String {
    String::from("quire")
}

const fn default_remote() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct D1Config {
    /// Executable that runs wrangler.
    #[serde(default = "default_program")]
    pub program: String,

    /// Arguments placed before `d1 execute` (e.g. `["wrangler"]` for `npx`).
    #[serde(default = "default_program_args")]
    pub program_args: Vec<String>,

    /// Databases are named `{prefix}-{category}` unless overridden.
    #[serde(default = "default_database_prefix")]
    pub database_prefix: String,

    /// Override for the blog database name.
    #[serde(default)]
    pub blog_database: String,

    /// Override for the wiki database name.
    #[serde(default)]
    pub wiki_database: String,

    /// Pass `--remote` (true) or `--local` (false) to wrangler.
    #[serde(default = "default_remote")]
    pub remote: bool,
}

impl Default for D1Config {
    fn default() -> Self {
        Self {
            program: default_program(),
            program_args: default_program_args(),
            database_prefix: default_database_prefix(),
            blog_database: String::new(),
            wiki_database: String::new(),
            remote: default_remote(),
        }
    }
}

impl D1Config {
    /// Database that holds a category's tables.
    pub fn database_for(&self, category: Category) -> String {
        let explicit = match category {
            Category::Blog => self.blog_database.trim(),
            Category::Wiki => self.wiki_database.trim(),
        };
        if explicit.is_empty() {
            format!("{}-{}", self.database_prefix.trim(), category.as_str())
        } else {
            explicit.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_npx_wrangler() {
        let config = D1Config::default();
        assert_eq!(config.program, "npx");
        assert_eq!(config.program_args, vec!["wrangler".to_string()]);
        assert!(config.remote);
    }

    #[test]
    fn database_names_follow_prefix() {
        let config = D1Config {
            database_prefix: "site".into(),
            ..Default::default()
        };
        assert_eq!(config.database_for(Category::Blog), "site-blog");
        assert_eq!(config.database_for(Category::Wiki), "site-wiki");
    }

    #[test]
    fn explicit_database_overrides_prefix() {
        let config = D1Config {
            wiki_database: "knowledge".into(),
            ..Default::default()
        };
        assert_eq!(config.database_for(Category::Wiki), "knowledge");
        assert_eq!(config.database_for(Category::Blog), "quire-blog");
    }
}
