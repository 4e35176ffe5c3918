//! Content categories.
//!
//! A category decides how a directory of markdown files maps onto the remote
//! store: `blog` files become flat rows keyed by title, `wiki` files become
//! nodes in a tree whose shape follows the directory nesting.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Flat posts, one row per file.
    Blog,
    /// Hierarchical tree, directories become ancestor nodes.
    Wiki,
}

impl Category {
    pub const ALL: [Self; 2] = [Self::Blog, Self::Wiki];

    /// Return the string representation used in keys, database names and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Blog => "blog",
            Self::Wiki => "wiki",
        }
    }

    /// Whether directory nesting is part of the content model.
    #[must_use]
    pub const fn is_hierarchical(self) -> bool {
        matches!(self, Self::Wiki)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blog" | "flat" | "posts" => Ok(Self::Blog),
            "wiki" | "hierarchical" | "tree" => Ok(Self::Wiki),
            other => Err(CoreError::Validation(format!("unknown category '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("blog", Category::Blog)]
    #[case("Flat", Category::Blog)]
    #[case("wiki", Category::Wiki)]
    #[case(" hierarchical ", Category::Wiki)]
    fn parses_aliases(#[case] input: &str, #[case] expected: Category) {
        assert_eq!(input.parse::<Category>().unwrap(), expected);
    }

    #[test]
    fn rejects_unknown() {
        assert!("pages".parse::<Category>().is_err());
    }

    #[test]
    fn only_wiki_is_hierarchical() {
        assert!(!Category::Blog.is_hierarchical());
        assert!(Category::Wiki.is_hierarchical());
    }

    #[test]
    fn serde_uses_snake_case() {
        assert_eq!(serde_json::to_string(&Category::Wiki).unwrap(), "\"wiki\"");
    }
}
