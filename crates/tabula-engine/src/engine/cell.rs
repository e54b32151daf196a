//! Cell data structures for the spreadsheet grid.
//!
//! - [`Cell`] - Raw text, optional formula, computed value and style
//! - [`CellStyle`] - Presentational attributes, never read by the evaluator
//! - [`StylePatch`] - A partial style merged field by field
//! - [`Grid`] - Sparse storage for cells (backed by `DashMap`)

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use super::cell_ref::CellRef;
use super::cycle::FormulaSource;
use super::eval::ValueSource;
use super::value::Value;

/// Horizontal text alignment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Presentational attributes owned by the UI layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellStyle {
    pub bold: bool,
    pub italic: bool,
    pub font_size: u32,
    pub color: String,
    pub background_color: String,
    pub text_align: Alignment,
}

impl Default for CellStyle {
    fn default() -> Self {
        CellStyle {
            bold: false,
            italic: false,
            font_size: 12,
            color: "#000000".to_string(),
            background_color: "#ffffff".to_string(),
            text_align: Alignment::Left,
        }
    }
}

/// Partial style update; `None` fields leave the current value untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StylePatch {
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub font_size: Option<u32>,
    pub color: Option<String>,
    pub background_color: Option<String>,
    pub text_align: Option<Alignment>,
}

impl CellStyle {
    pub fn apply(&mut self, patch: &StylePatch) {
        if let Some(bold) = patch.bold {
            self.bold = bold;
        }
        if let Some(italic) = patch.italic {
            self.italic = italic;
        }
        if let Some(size) = patch.font_size {
            self.font_size = size;
        }
        if let Some(color) = &patch.color {
            self.color = color.clone();
        }
        if let Some(background) = &patch.background_color {
            self.background_color = background.clone();
        }
        if let Some(align) = patch.text_align {
            self.text_align = align;
        }
    }
}

/// A cell in the spreadsheet grid.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Text exactly as entered.
    pub raw: String,
    /// The raw text again when it is a formula (starts with `=`).
    pub formula: Option<String>,
    /// Result of the last evaluation.
    pub computed: Value,
    pub style: CellStyle,
}

impl Cell {
    pub fn new_empty() -> Cell {
        Cell::default()
    }

    /// Replace the raw text, classifying it as formula or literal.
    /// The computed value is left for the caller to refresh.
    pub fn set_raw(&mut self, raw: &str) {
        self.raw = raw.to_string();
        self.formula = raw.starts_with('=').then(|| raw.to_string());
    }

    pub fn is_formula(&self) -> bool {
        self.formula.is_some()
    }
}

/// Sparse grid storage. Absent keys are empty cells.
pub type Grid = DashMap<CellRef, Cell>;

impl ValueSource for Grid {
    fn value(&self, cell: &CellRef) -> Value {
        self.get(cell)
            .map(|entry| entry.computed.clone())
            .unwrap_or_default()
    }
}

impl FormulaSource for Grid {
    fn formula(&self, cell: &CellRef) -> Option<String> {
        self.get(cell).and_then(|entry| entry.formula.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_raw_classifies_formulas() {
        let mut cell = Cell::new_empty();
        cell.set_raw("=A1+1");
        assert_eq!(cell.formula.as_deref(), Some("=A1+1"));
        assert!(cell.is_formula());

        cell.set_raw("hello");
        assert_eq!(cell.raw, "hello");
        assert_eq!(cell.formula, None);
    }

    #[test]
    fn test_style_patch_merges_only_given_fields() {
        let mut style = CellStyle::default();
        style.apply(&StylePatch {
            bold: Some(true),
            background_color: Some("#ffff00".into()),
            ..StylePatch::default()
        });

        assert_eq!(
            style,
            CellStyle {
                bold: true,
                background_color: "#ffff00".into(),
                ..CellStyle::default()
            }
        );
    }
}
