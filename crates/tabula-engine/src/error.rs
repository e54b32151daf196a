//! Error types for the formula engine.
//!
//! Evaluation problems are never reported through this type: they become
//! in-band [`CellError`](crate::engine::CellError) values stored on the cell.

use thiserror::Error;

/// Errors surfaced to callers of the engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid cell reference: {0}")]
    InvalidAddress(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
