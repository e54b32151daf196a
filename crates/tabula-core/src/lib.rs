//! tabula-core - UI-agnostic sheet model: writes, recomputation and grid edits.

pub mod config;
pub mod document;
pub mod error;

pub use config::SheetConfig;
pub use document::{Clipboard, Sheet};
pub use error::{Result, SheetError};

pub use tabula_engine::builtins::FunctionRegistry;
pub use tabula_engine::engine::{
    Alignment, Cell, CellError, CellRange, CellRef, CellStyle, StylePatch, Value, decode_address,
    encode_address,
};
