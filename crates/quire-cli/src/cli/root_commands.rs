use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use quire_core::Category;

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Sync markdown documents into the remote stores.
    Sync(SyncArgs),
    /// Print or apply the table definitions.
    Schema(SchemaArgs),
    /// Print the effective configuration with secrets redacted.
    Config,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum CategoryArg {
    Blog,
    Wiki,
    #[default]
    All,
}

impl CategoryArg {
    #[must_use]
    pub fn categories(self) -> Vec<Category> {
        match self {
            Self::Blog => vec![Category::Blog],
            Self::Wiki => vec![Category::Wiki],
            Self::All => Category::ALL.to_vec(),
        }
    }
}

#[derive(Clone, Debug, Args)]
pub struct SyncArgs {
    /// Which categories to sync.
    #[arg(long, value_enum, default_value = "all")]
    pub category: CategoryArg,

    /// Directory holding the category folders (overrides `content.root`).
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Only sync markdown files changed between this git revision and HEAD.
    #[arg(long, value_name = "REV")]
    pub changed_since: Option<String>,

    /// Write to a local libSQL database file instead of D1.
    #[arg(long, value_name = "PATH")]
    pub local_db: Option<PathBuf>,

    /// Blog posts synced at once (overrides `sync.concurrency`).
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Exit non-zero when any document was aborted.
    #[arg(long)]
    pub fail_on_abort: bool,
}

#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    #[arg(long, value_enum, default_value = "all")]
    pub category: CategoryArg,

    /// Run the statements instead of printing them.
    #[arg(long)]
    pub apply: bool,

    /// Apply to a local libSQL database file instead of D1.
    #[arg(long, value_name = "PATH", requires = "apply")]
    pub local_db: Option<PathBuf>,
}
