//! Cross-cutting error types for Quire.
//!
//! Domain-specific errors (`ParseError`, `StoreError`, `ConfigError`) live in
//! their own crates. The binary converges everything into `anyhow`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Data failed validation (unknown category, unsafe relative path).
    #[error("Validation error: {0}")]
    Validation(String),
}
