//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`, so configuration failures surface unchanged.

use thiserror::Error;

/// Errors produced by `ai-core` configuration and validation helpers.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `ai-core`.
pub type CoreResult<T> = Result<T, CoreError>;
