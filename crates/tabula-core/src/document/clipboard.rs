//! Range selection and copy/cut/paste.
//!
//! Pasting moves cells by the offset between the paste target and the
//! clipboard anchor. Formula text is carried verbatim: a pasted `=A1` still
//! reads `A1`. Computed values are carried as-is unless the pasted formula
//! now reads itself, in which case it becomes `#CIRCULAR!`.

use std::collections::BTreeMap;

use tabula_engine::engine::{Cell, CellError, CellRange, CellRef, has_cycle};
use tracing::debug;

use super::Sheet;
use super::state::parse_address;
use crate::error::{Result, SheetError};

/// Snapshot of copied cells, keyed by the address they were copied from.
#[derive(Clone, Debug, PartialEq)]
pub struct Clipboard {
    pub cells: BTreeMap<CellRef, Cell>,
    /// Address the copy is relative to (the first corner of the selection).
    pub anchor: CellRef,
}

impl Clipboard {
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }
}

impl Sheet {
    /// Every address in the rectangle between two corners, row-major,
    /// regardless of corner order.
    pub fn select_range(&self, first: &str, last: &str) -> Result<Vec<CellRef>> {
        Ok(self.range_between(first, last)?.cells().collect())
    }

    /// Addresses of a range written as text, e.g. `"A1:B3"`.
    pub fn cells_in_range(&self, range: &str) -> Result<Vec<CellRef>> {
        let range: CellRange = range.parse()?;
        Ok(range.cells().collect())
    }

    pub(crate) fn range_between(&self, first: &str, last: &str) -> Result<CellRange> {
        Ok(CellRange::new(parse_address(first)?, parse_address(last)?))
    }

    /// Copy the stored cells of a selection. Returns how many were copied.
    pub fn copy(&mut self, first: &str, last: &str) -> Result<usize> {
        let clipboard = self.snapshot(first, last)?;
        let count = clipboard.len();
        debug!(anchor = %clipboard.anchor, cells = count, "copied");
        self.clipboard = Some(clipboard);
        Ok(count)
    }

    /// Copy a selection, then remove the originals and refresh their dependents.
    pub fn cut(&mut self, first: &str, last: &str) -> Result<usize> {
        let clipboard = self.snapshot(first, last)?;
        let removed: Vec<CellRef> = clipboard.cells.keys().copied().collect();
        for cell_ref in &removed {
            self.grid.remove(cell_ref);
        }
        debug!(anchor = %clipboard.anchor, cells = removed.len(), "cut");
        self.clipboard = Some(clipboard);
        self.propagate_from(&removed);
        Ok(removed.len())
    }

    fn snapshot(&self, first: &str, last: &str) -> Result<Clipboard> {
        let anchor = parse_address(first)?;
        let range = self.range_between(first, last)?;
        let cells = range
            .cells()
            .filter_map(|at| self.cell_at(&at).map(|cell| (at, cell)))
            .collect();
        Ok(Clipboard { cells, anchor })
    }

    pub fn clipboard(&self) -> Option<&Clipboard> {
        self.clipboard.as_ref()
    }

    /// Paste the clipboard so its anchor lands on `target`.
    ///
    /// Cells that would land at a negative row or column are skipped.
    /// Returns how many cells were written.
    pub fn paste(&mut self, target: &str) -> Result<usize> {
        let target = parse_address(target)?;
        let clipboard = match &self.clipboard {
            Some(clipboard) if !clipboard.is_empty() => clipboard.clone(),
            _ => return Err(SheetError::EmptyClipboard),
        };

        let delta_row = target.row as isize - clipboard.anchor.row as isize;
        let delta_col = target.col as isize - clipboard.anchor.col as isize;

        let mut written = Vec::with_capacity(clipboard.len());
        for (source, cell) in clipboard.cells {
            let Some(dest) = source.offset(delta_row, delta_col) else {
                debug!(source = %source, "paste target out of grid, skipped");
                continue;
            };
            self.grid.insert(dest, cell);
            written.push(dest);
        }

        // Checked after the whole block is in place: pasted formulas may
        // read each other.
        for dest in &written {
            let formula = self.grid.get(dest).and_then(|cell| cell.formula.clone());
            if let Some(formula) = formula
                && has_cycle(dest, &formula, &self.grid)
                && let Some(mut cell) = self.grid.get_mut(dest)
            {
                cell.computed = CellError::Circular.into();
            }
        }

        debug!(target = %target, cells = written.len(), "pasted");
        self.propagate_from(&written);
        Ok(written.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tabula_engine::engine::{StylePatch, Value};

    fn labels(refs: &[CellRef]) -> Vec<String> {
        refs.iter().map(|r| r.to_string()).collect()
    }

    #[test]
    fn test_select_range_normalizes_corners() {
        let sheet = Sheet::new();
        let forward = sheet.select_range("A1", "B2").unwrap();
        let backward = sheet.select_range("B2", "A1").unwrap();
        assert_eq!(labels(&forward), vec!["A1", "B1", "A2", "B2"]);
        assert_eq!(forward, backward);
        assert_eq!(sheet.cells_in_range("A1:B2").unwrap(), forward);
    }

    #[test]
    fn test_copy_snapshots_by_value() {
        let mut sheet = Sheet::new();
        sheet.set_cell_text("A1", "1").unwrap();
        assert_eq!(sheet.copy("A1", "B2").unwrap(), 1);

        sheet.set_cell_text("A1", "changed").unwrap();
        let clipboard = sheet.clipboard().unwrap();
        assert_eq!(clipboard.cells[&CellRef::new(0, 0)].raw, "1");
        assert_eq!(clipboard.anchor, CellRef::new(0, 0));
    }

    #[test]
    fn test_cut_removes_originals_and_refreshes_dependents() {
        let mut sheet = Sheet::new();
        sheet.set_cell_text("A1", "2").unwrap();
        sheet.set_cell_text("C1", "=A1").unwrap();

        assert_eq!(sheet.cut("A1", "A1").unwrap(), 1);
        assert_eq!(sheet.cell_at(&CellRef::new(0, 0)), None);
        assert_eq!(sheet.get_cell("C1").unwrap().computed, Value::Null);
    }

    #[test]
    fn test_paste_translates_by_anchor_offset() {
        let mut sheet = Sheet::new();
        sheet.set_cell_text("A1", "1").unwrap();
        sheet.set_cell_text("B1", "two").unwrap();
        sheet.set_cell_text("A2", "=A1+1").unwrap();
        sheet.set_cell_text("B2", "4").unwrap();
        sheet
            .set_cell_style(
                "B2",
                &StylePatch {
                    bold: Some(true),
                    ..StylePatch::default()
                },
            )
            .unwrap();

        sheet.copy("A1", "B2").unwrap();
        assert_eq!(sheet.paste("C5").unwrap(), 4);

        for (from, to) in [("A1", "C5"), ("B1", "D5"), ("A2", "C6"), ("B2", "D6")] {
            assert_eq!(sheet.get_cell(from).unwrap(), sheet.get_cell(to).unwrap());
        }
        // Formula text is not rebased and the computed value is carried.
        let c6 = sheet.get_cell("C6").unwrap();
        assert_eq!(c6.raw, "=A1+1");
        assert_eq!(c6.computed, Value::Number(2.0));
        assert!(sheet.get_cell("D6").unwrap().style.bold);
        assert_eq!(sheet.len(), 8);
    }

    #[test]
    fn test_paste_refreshes_cells_reading_the_target() {
        let mut sheet = Sheet::new();
        sheet.set_cell_text("A1", "9").unwrap();
        sheet.set_cell_text("E1", "=C3*2").unwrap();
        assert_eq!(sheet.get_cell("E1").unwrap().computed, Value::Error(CellError::Ref));

        sheet.copy("A1", "A1").unwrap();
        sheet.paste("C3").unwrap();
        assert_eq!(sheet.get_cell("E1").unwrap().computed, Value::Number(18.0));
    }

    #[test]
    fn test_paste_onto_own_reference_is_circular() {
        let mut sheet = Sheet::new();
        sheet.set_cell_text("A1", "5").unwrap();
        sheet.set_cell_text("B1", "=A1").unwrap();

        sheet.copy("B1", "B1").unwrap();
        sheet.paste("A1").unwrap();
        assert_eq!(
            sheet.get_cell("A1").unwrap().computed,
            Value::Error(CellError::Circular)
        );
        assert_eq!(
            sheet.get_cell("B1").unwrap().computed,
            Value::Error(CellError::Circular)
        );
    }

    #[test]
    fn test_paste_skips_cells_left_of_the_grid() {
        let mut sheet = Sheet::new();
        sheet.set_cell_text("A1", "left").unwrap();
        sheet.set_cell_text("B1", "right").unwrap();
        sheet.copy("B1", "A1").unwrap();

        assert_eq!(sheet.paste("A3").unwrap(), 1);
        assert_eq!(sheet.get_cell("A3").unwrap().raw, "right");
    }

    #[test]
    fn test_paste_requires_clipboard() {
        let mut sheet = Sheet::new();
        assert!(matches!(sheet.paste("A1"), Err(SheetError::EmptyClipboard)));

        sheet.copy("A1", "C3").unwrap();
        assert!(matches!(sheet.paste("A1"), Err(SheetError::EmptyClipboard)));
    }
}
