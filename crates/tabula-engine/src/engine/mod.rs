//! Spreadsheet engine API.
//!
//! - [`CellRef`], [`CellRange`] - A1 addressing and rectangular ranges
//! - [`Cell`], [`CellStyle`], [`StylePatch`], [`Grid`] - Stored cell state
//! - [`Value`], [`CellError`] - Computed values and in-band error codes
//! - [`parse_formula`] - Split formula text into its syntactic form
//! - [`extract_dependencies`] - Cells a formula reads
//! - [`has_cycle`] - Circular reference detection
//! - [`evaluate`] - Formula evaluation against a [`ValueSource`]
//! - [`eval_expression`] - Closed-grammar arithmetic used by the fallback path

mod cell;
mod cell_ref;
mod cycle;
mod deps;
mod eval;
mod expr;
mod parse;
mod range;
mod value;

pub use cell::{Alignment, Cell, CellStyle, Grid, StylePatch};
pub use cell_ref::{CellRef, decode_address, encode_address};
pub use cycle::{FormulaSource, has_cycle};
pub use deps::{cell_ref_re, extract_dependencies};
pub use eval::{ValueSource, evaluate};
pub use expr::{ExprError, eval_expression};
pub use parse::{Formula, parse_formula, split_args};
pub use range::CellRange;
pub use value::{CellError, Value, coerce_literal, format_number};
