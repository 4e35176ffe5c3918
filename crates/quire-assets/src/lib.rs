//! # quire-assets
//!
//! Moves locally-referenced images into object storage.
//!
//! [`Externalizer::externalize`] finds `![alt](images/...)` links, uploads
//! each distinct file once per run through an [`ObjectStorage`] backend and
//! swaps the link target for the public URL. Anything that goes wrong with an
//! image is an [`AssetWarning`], never an error: the link is left as written.

mod error;
mod externalize;
mod scan;
mod storage;

pub use error::{AssetWarning, StorageError, WarningReason};
pub use externalize::{Externalized, Externalizer};
pub use scan::{AssetReference, content_type_for, rewrite_targets, scan_references};
pub use storage::{ObjectStorage, R2Storage, public_url};
