//! Directory paths relative to a category root.
//!
//! For wiki content the directory a file lives in *is* its ancestor chain, so
//! `RelDir` is the key of the parent-chain cache and of the tree plan. Only
//! normal path components are accepted; `..`, roots and prefixes are rejected
//! so a document can never address nodes outside its category.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path};

use crate::errors::CoreError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RelDir {
    segments: Vec<String>,
}

impl RelDir {
    /// The category root itself.
    #[must_use]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Build from explicit segments. Blank segments are dropped.
    #[must_use]
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments
                .into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.trim().is_empty())
                .collect(),
        }
    }

    /// Build from a path relative to the category root (a directory, not a file).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] for non-UTF-8 segments or any
    /// component other than a normal name or `.`.
    pub fn from_relative_path(path: &Path) -> Result<Self, CoreError> {
        let mut segments = Vec::new();
        for component in path.components() {
            match component {
                Component::Normal(name) => {
                    let name = name.to_str().ok_or_else(|| {
                        CoreError::Validation(format!(
                            "non UTF-8 directory name in '{}'",
                            path.display()
                        ))
                    })?;
                    segments.push(name.to_string());
                }
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(CoreError::Validation(format!(
                        "directory '{}' escapes the category root",
                        path.display()
                    )));
                }
            }
        }
        Ok(Self { segments })
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    #[must_use]
    pub const fn depth(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Last segment, i.e. the title of the node this directory resolves to.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Every non-root prefix, shortest first: `a/b/c` → `a`, `a/b`, `a/b/c`.
    #[must_use]
    pub fn prefixes(&self) -> Vec<Self> {
        (1..=self.segments.len())
            .map(|len| Self {
                segments: self.segments[..len].to_vec(),
            })
            .collect()
    }
}

impl fmt::Display for RelDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str(".");
        }
        f.write_str(&self.segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_nested_directory() {
        let dir = RelDir::from_relative_path(Path::new("guides/setup")).unwrap();
        assert_eq!(dir.segments(), &["guides".to_string(), "setup".to_string()]);
        assert_eq!(dir.depth(), 2);
        assert_eq!(dir.name(), Some("setup"));
        assert_eq!(dir.to_string(), "guides/setup");
    }

    #[test]
    fn empty_path_is_root() {
        let dir = RelDir::from_relative_path(Path::new("")).unwrap();
        assert!(dir.is_root());
        assert!(dir.prefixes().is_empty());
        assert_eq!(dir.to_string(), ".");
    }

    #[test]
    fn rejects_parent_components() {
        assert!(RelDir::from_relative_path(Path::new("../outside")).is_err());
        assert!(RelDir::from_relative_path(Path::new("/abs")).is_err());
    }

    #[test]
    fn prefixes_are_shortest_first() {
        let dir = RelDir::from_segments(["a", "b", "c"]);
        let prefixes: Vec<String> = dir.prefixes().iter().map(ToString::to_string).collect();
        assert_eq!(prefixes, vec!["a", "a/b", "a/b/c"]);
    }

    #[test]
    fn blank_segments_are_dropped() {
        let dir = RelDir::from_segments(["a", " ", ""]);
        assert_eq!(dir.depth(), 1);
    }
}
