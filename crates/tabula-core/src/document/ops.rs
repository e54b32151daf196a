//! Structural edits and bulk operations.
//!
//! Cells are remapped by coordinate only: formula text is never rewritten,
//! so a formula reading `A5` keeps reading `A5` after a row is inserted
//! above it. Every operation recomputes affected formulas before returning.

use std::collections::{BTreeMap, HashSet};

use tabula_engine::engine::{Cell, CellRef, Value, coerce_literal, format_number};
use tracing::debug;

use super::Sheet;
use crate::error::Result;

/// Dimension for row/column operations
#[derive(Copy, Clone, Debug)]
enum Dimension {
    Row,
    Column,
}

impl Dimension {
    fn get_coord(&self, cell_ref: &CellRef) -> usize {
        match self {
            Dimension::Row => cell_ref.row,
            Dimension::Column => cell_ref.col,
        }
    }

    fn with_coord(&self, cell_ref: &CellRef, coord: usize) -> CellRef {
        match self {
            Dimension::Row => CellRef::new(coord, cell_ref.col),
            Dimension::Column => CellRef::new(cell_ref.row, coord),
        }
    }
}

impl Sheet {
    fn sizes_mut(&mut self, dim: Dimension) -> (&mut Vec<u32>, u32) {
        match dim {
            Dimension::Row => (&mut self.row_heights, self.config.default_row_height),
            Dimension::Column => (&mut self.column_widths, self.config.default_column_width),
        }
    }

    fn take_cells_from(&mut self, dim: Dimension, from: usize) -> Vec<(CellRef, Cell)> {
        let moving: Vec<CellRef> = self
            .grid
            .iter()
            .filter(|entry| dim.get_coord(entry.key()) >= from)
            .map(|entry| *entry.key())
            .collect();
        moving
            .into_iter()
            .filter_map(|cell_ref| self.grid.remove(&cell_ref))
            .collect()
    }

    /// Generic insert operation for row or column
    fn insert_dimension(&mut self, dim: Dimension, at: usize) {
        let moved = self.take_cells_from(dim, at);
        let count = moved.len();
        for (cell_ref, cell) in moved {
            let Some(coord) = dim.get_coord(&cell_ref).checked_add(1) else {
                debug!(cell = %cell_ref, "pushed past the last addressable index, dropped");
                continue;
            };
            self.grid.insert(dim.with_coord(&cell_ref, coord), cell);
        }

        let (sizes, default) = self.sizes_mut(dim);
        if at < sizes.len() {
            sizes.insert(at, default);
            sizes.pop();
        }

        debug!(?dim, at, moved = count, "inserted");
        self.recalculate_all();
    }

    /// Generic delete operation for row or column
    fn delete_dimension(&mut self, dim: Dimension, at: usize) {
        let moved = self.take_cells_from(dim, at);
        let mut removed = 0usize;
        for (cell_ref, cell) in moved {
            let coord = dim.get_coord(&cell_ref);
            if coord == at {
                removed += 1;
                continue;
            }
            self.grid.insert(dim.with_coord(&cell_ref, coord - 1), cell);
        }

        let (sizes, default) = self.sizes_mut(dim);
        if at < sizes.len() {
            sizes.remove(at);
            sizes.push(default);
        }

        debug!(?dim, at, removed, "deleted");
        self.recalculate_all();
    }

    /// Insert an empty row before zero-based `at_row`.
    pub fn insert_row(&mut self, at_row: usize) {
        self.insert_dimension(Dimension::Row, at_row);
    }

    /// Delete zero-based `at_row`, moving later rows up.
    pub fn delete_row(&mut self, at_row: usize) {
        self.delete_dimension(Dimension::Row, at_row);
    }

    /// Insert an empty column before zero-based `at_col`.
    pub fn insert_column(&mut self, at_col: usize) {
        self.insert_dimension(Dimension::Column, at_col);
    }

    /// Delete zero-based `at_col`, moving later columns left.
    pub fn delete_column(&mut self, at_col: usize) {
        self.delete_dimension(Dimension::Column, at_col);
    }

    /// Remove later rows of a range whose raw values repeat an earlier row.
    ///
    /// Rows are compared by the raw text of each cell in the range, left to
    /// right, with missing cells as empty text. A duplicate row loses every
    /// stored cell on that row, including cells outside the range; nothing
    /// shifts. Returns the number of duplicate rows found.
    pub fn remove_duplicates(&mut self, first: &str, last: &str) -> Result<usize> {
        let range = self.range_between(first, last)?;

        let mut rows: BTreeMap<usize, Vec<CellRef>> = BTreeMap::new();
        for cell_ref in range.cells() {
            rows.entry(cell_ref.row).or_default().push(cell_ref);
        }

        let mut seen: HashSet<Vec<String>> = HashSet::new();
        let mut duplicates = HashSet::new();
        for (row, refs) in &rows {
            let signature: Vec<String> = refs
                .iter()
                .map(|cell_ref| {
                    self.grid
                        .get(cell_ref)
                        .map(|cell| cell.raw.clone())
                        .unwrap_or_default()
                })
                .collect();
            if !seen.insert(signature) {
                duplicates.insert(*row);
            }
        }

        let removed: Vec<CellRef> = self
            .grid
            .iter()
            .map(|entry| *entry.key())
            .filter(|cell_ref| duplicates.contains(&cell_ref.row))
            .collect();
        for cell_ref in &removed {
            self.grid.remove(cell_ref);
        }

        debug!(range = %range, rows = duplicates.len(), cells = removed.len(), "removed duplicates");
        self.propagate_from(&removed);
        Ok(duplicates.len())
    }

    /// Replace every literal occurrence of `find` in the raw text of cells in
    /// a range. Text values are replaced the same way; numeric values are
    /// replaced in their display form and coerced again. The stored formula
    /// is left as it was. Returns the number of cells changed.
    pub fn find_and_replace(
        &mut self,
        first: &str,
        last: &str,
        find: &str,
        replace: &str,
    ) -> Result<usize> {
        let range = self.range_between(first, last)?;
        if find.is_empty() {
            return Ok(0);
        }

        let mut changed = Vec::new();
        for cell_ref in range.cells() {
            let Some(mut cell) = self.grid.get_mut(&cell_ref) else {
                continue;
            };
            if !cell.raw.contains(find) {
                continue;
            }
            cell.raw = cell.raw.replace(find, replace);
            let computed = match &cell.computed {
                Value::Text(text) => Value::Text(text.replace(find, replace)),
                Value::Number(n) => coerce_literal(&format_number(*n).replace(find, replace)),
                other => other.clone(),
            };
            cell.computed = computed;
            changed.push(cell_ref);
        }

        debug!(range = %range, find, replace, cells = changed.len(), "replaced");
        self.propagate_from(&changed);
        Ok(changed.len())
    }
}
