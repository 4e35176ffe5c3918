//! Run summary: what was synced, warned about, aborted and skipped.

use std::fmt;
use std::path::PathBuf;

use quire_core::Category;
use serde::Serialize;

/// Stage of a document pipeline, reported with every abort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStep {
    Parse,
    ResolveParent,
    UpsertPost,
    UpsertNode,
    FindNode,
    UpsertContent,
}

impl SyncStep {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Parse => "parse",
            Self::ResolveParent => "resolve_parent",
            Self::UpsertPost => "upsert_post",
            Self::UpsertNode => "upsert_node",
            Self::FindNode => "find_node",
            Self::UpsertContent => "upsert_content",
        }
    }
}

impl fmt::Display for SyncStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// An image link was left unchanged.
    Asset,
    /// Front matter was ignored or a value was unusable.
    FrontMatter,
}

/// A non-fatal problem; the document was still synced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncWarning {
    pub document: String,
    pub path: PathBuf,
    pub kind: WarningKind,
    pub detail: String,
}

/// A document whose remaining steps were abandoned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbortedDocument {
    pub title: String,
    pub path: PathBuf,
    pub step: SyncStep,
    pub reason: String,
}

/// Outcome of one category pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub category: Category,
    pub database: String,
    /// `false` when the category directory does not exist.
    pub root_found: bool,
    pub discovered: usize,
    pub synced: usize,
    /// Documents never dispatched because the run was cancelled.
    pub skipped: usize,
    pub warnings: Vec<SyncWarning>,
    pub aborted: Vec<AbortedDocument>,
}

impl CategorySummary {
    #[must_use]
    pub fn new(category: Category, database: impl Into<String>) -> Self {
        Self {
            category,
            database: database.into(),
            root_found: true,
            discovered: 0,
            synced: 0,
            skipped: 0,
            warnings: Vec::new(),
            aborted: Vec::new(),
        }
    }

    /// Order warnings and aborts by path so concurrent passes report stably.
    pub(crate) fn sort(&mut self) {
        self.warnings
            .sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.detail.cmp(&b.detail)));
        self.aborted.sort_by(|a, b| a.path.cmp(&b.path));
    }
}

/// Outcome of a whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub synced: usize,
    pub skipped: usize,
    pub warnings: usize,
    pub aborted: usize,
    pub cancelled: bool,
    pub categories: Vec<CategorySummary>,
}

impl SyncSummary {
    #[must_use]
    pub fn from_categories(categories: Vec<CategorySummary>, cancelled: bool) -> Self {
        Self {
            synced: categories.iter().map(|c| c.synced).sum(),
            skipped: categories.iter().map(|c| c.skipped).sum(),
            warnings: categories.iter().map(|c| c.warnings.len()).sum(),
            aborted: categories.iter().map(|c| c.aborted.len()).sum(),
            cancelled,
            categories,
        }
    }

    #[must_use]
    pub fn category(&self, category: Category) -> Option<&CategorySummary> {
        self.categories.iter().find(|c| c.category == category)
    }

    /// `true` when no document was aborted.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.aborted == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn totals_add_up_across_categories() {
        let mut blog = CategorySummary::new(Category::Blog, "quire-blog");
        blog.synced = 3;
        blog.aborted.push(AbortedDocument {
            title: "x".into(),
            path: "blog/x.md".into(),
            step: SyncStep::UpsertPost,
            reason: "boom".into(),
        });
        let mut wiki = CategorySummary::new(Category::Wiki, "quire-wiki");
        wiki.synced = 2;
        wiki.skipped = 4;

        let summary = SyncSummary::from_categories(vec![blog, wiki], true);
        assert_eq!(summary.synced, 5);
        assert_eq!(summary.skipped, 4);
        assert_eq!(summary.aborted, 1);
        assert!(!summary.is_clean());
        assert_eq!(summary.category(Category::Wiki).unwrap().synced, 2);
    }

    #[rstest]
    #[case(SyncStep::Parse, "parse")]
    #[case(SyncStep::ResolveParent, "resolve_parent")]
    #[case(SyncStep::UpsertContent, "upsert_content")]
    fn steps_render_as_snake_case(#[case] step: SyncStep, #[case] expected: &str) {
        assert_eq!(serde_json::to_string(&step).unwrap(), format!("\"{expected}\""));
        assert_eq!(step.to_string(), expected);
    }
}
