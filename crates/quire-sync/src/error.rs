//! Per-document sync failures.

use quire_parser::ParseError;
use quire_store::StoreError;
use thiserror::Error;

use crate::summary::SyncStep;

/// Why one document stopped. The run itself always continues.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The parsed metadata does not fit the category being synced.
    #[error("unexpected metadata: {0}")]
    Metadata(String),

    /// A remote command for this document failed.
    #[error("{step} failed: {source}")]
    Store {
        step: SyncStep,
        #[source]
        source: StoreError,
    },

    /// An ancestor directory could not be resolved to a node.
    #[error("parent '{dir}' unavailable: {reason}")]
    Parent { dir: String, reason: String },
}

impl SyncError {
    pub(crate) fn store(step: SyncStep) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::Store { step, source }
    }

    /// The step the document was on when it failed.
    #[must_use]
    pub const fn step(&self) -> SyncStep {
        match self {
            Self::Parse(_) | Self::Metadata(_) => SyncStep::Parse,
            Self::Store { step, .. } => *step,
            Self::Parent { .. } => SyncStep::ResolveParent,
        }
    }
}
