//! # quire-core
//!
//! Core types shared across all Quire crates:
//! - [`Category`]: the two content layouts (flat blog, hierarchical wiki)
//! - [`Document`] and its typed per-category metadata
//! - Remote store records ([`PostRecord`], [`TreeNode`], [`NodeContent`])
//! - [`RelDir`]: a document's directory relative to its category root
//! - Cross-cutting error types

pub mod category;
pub mod document;
pub mod errors;
pub mod records;
pub mod rel_dir;

pub use category::Category;
pub use document::{Document, DocumentMeta, PostMeta, WikiMeta};
pub use errors::CoreError;
pub use records::{NodeContent, PostRecord, PublishedAt, ROOT_PARENT_ID, TreeNode};
pub use rel_dir::RelDir;
