//! Rectangular cell ranges.

use std::fmt;

use super::cell_ref::CellRef;
use crate::error::{EngineError, Result};

/// An inclusive rectangle of cells, normalized so `start` is the top-left
/// corner and `end` the bottom-right, whichever corners it was built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellRange {
    pub start: CellRef,
    pub end: CellRef,
}

impl CellRange {
    pub fn new(a: CellRef, b: CellRef) -> CellRange {
        CellRange {
            start: CellRef::new(a.row.min(b.row), a.col.min(b.col)),
            end: CellRef::new(a.row.max(b.row), a.col.max(b.col)),
        }
    }

    /// Parse "A1:B3" (either corner order).
    pub fn parse(text: &str) -> Option<CellRange> {
        let (a, b) = text.split_once(':')?;
        Some(CellRange::new(CellRef::parse(a)?, CellRef::parse(b)?))
    }

    pub fn rows(&self) -> usize {
        self.end.row - self.start.row + 1
    }

    pub fn cols(&self) -> usize {
        self.end.col - self.start.col + 1
    }

    /// Number of cells, or None if it does not fit in a usize.
    pub fn cell_count(&self) -> Option<usize> {
        self.rows().checked_mul(self.cols())
    }

    pub fn contains(&self, cell: &CellRef) -> bool {
        (self.start.row..=self.end.row).contains(&cell.row)
            && (self.start.col..=self.end.col).contains(&cell.col)
    }

    /// Cells in row-major order: rows outer, columns inner.
    pub fn cells(&self) -> impl Iterator<Item = CellRef> + use<> {
        let (start, end) = (self.start, self.end);
        (start.row..=end.row)
            .flat_map(move |row| (start.col..=end.col).map(move |col| CellRef::new(row, col)))
    }
}

impl std::str::FromStr for CellRange {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| EngineError::InvalidAddress(s.to_string()))
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn labels(range: &CellRange) -> Vec<String> {
        range.cells().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_cells_are_row_major() {
        let range = CellRange::parse("A1:B2").unwrap();
        assert_eq!(labels(&range), vec!["A1", "B1", "A2", "B2"]);
    }

    #[test]
    fn test_reversed_corners_are_normalized() {
        let range = CellRange::parse("B3:A1").unwrap();
        assert_eq!(range.to_string(), "A1:B3");
        assert_eq!(range.cell_count(), Some(6));
    }

    #[test]
    fn test_multi_letter_columns_expand_through_codec() {
        let range = CellRange::parse("Z1:AB1").unwrap();
        assert_eq!(labels(&range), vec!["Z1", "AA1", "AB1"]);
    }

    #[test]
    fn test_contains() {
        let range = CellRange::parse("B2:C4").unwrap();
        assert!(range.contains(&CellRef::new(3, 2)));
        assert!(!range.contains(&CellRef::new(0, 1)));
        assert!(!range.contains(&CellRef::new(1, 3)));
    }

    #[test]
    fn test_parse_rejects_non_ranges() {
        assert!(CellRange::parse("A1").is_none());
        assert!(CellRange::parse("A1:").is_none());
        assert!("A1-B2".parse::<CellRange>().is_err());
    }
}
