//! Error types for Tabula core.

use thiserror::Error;

use tabula_engine::EngineError;

/// Errors returned by sheet operations.
///
/// Formula problems are not errors here: they are stored on the cell as
/// [`CellError`](tabula_engine::engine::CellError) values.
#[derive(Error, Debug)]
pub enum SheetError {
    #[error(transparent)]
    InvalidAddress(#[from] EngineError),

    #[error("Clipboard is empty")]
    EmptyClipboard,

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Grid must have at least one {0}")]
    InvalidDimension(&'static str),
}

pub type Result<T> = std::result::Result<T, SheetError>;
