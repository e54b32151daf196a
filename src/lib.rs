//! tabula - Spreadsheet formula engine.
//!
//! The sheet model lives in [`tabula_core`]; formula parsing and evaluation
//! live in [`tabula_engine`]. This crate re-exports both.
//!
//! ```
//! use tabula::{Sheet, Value};
//!
//! let mut sheet = Sheet::new();
//! sheet.set_cell_text("A1", "5").unwrap();
//! sheet.set_cell_text("B1", "=A1+3").unwrap();
//! assert_eq!(sheet.get_cell("B1").unwrap().computed, Value::Number(8.0));
//! ```

pub use tabula_core::*;
pub use tabula_engine::builtins::{BUILTINS, Builtin, FunctionImpl};
pub use tabula_engine::{EngineError, engine};
