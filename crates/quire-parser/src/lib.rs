//! # quire-parser
//!
//! Splits markdown source files into typed metadata and body.
//!
//! Parsing is pure and lenient: missing keys fall back to documented
//! defaults, unreadable front matter is dropped with a note on the document.
//! The only hard failure is a file that cannot be read as UTF-8 text.

pub mod document;
pub mod error;
pub mod front_matter;
pub mod metadata;

pub use document::{parse_document, parse_source};
pub use error::ParseError;
pub use front_matter::{FrontMatter, MetaValue, SplitSource, split_front_matter};
pub use metadata::MetadataDefaults;
