//! # quire-sync
//!
//! The sync engine: finds documents, resolves wiki directories to tree
//! nodes and drives each document through parse, asset upload and remote
//! upserts.
//!
//! The engine is the only place with cross-document state for a run: the
//! directory → node id cache lives in [`ParentChainResolver`] and the upload
//! memo in the shared `Externalizer`. Nothing persists between runs.

pub mod discover;
pub mod engine;
pub mod error;
pub mod resolver;
pub mod summary;

pub use discover::{DocumentFilter, discover_documents};
pub use engine::{SilentObserver, SyncEngine, SyncObserver, SyncSettings};
pub use error::SyncError;
pub use resolver::{ParentChainResolver, TreePlan};
pub use summary::{
    AbortedDocument, CategorySummary, SyncStep, SyncSummary, SyncWarning, WarningKind,
};
