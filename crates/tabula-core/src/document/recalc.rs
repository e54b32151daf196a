//! Cell writes and dependency-driven recomputation.
//!
//! A write stores the raw text, evaluates it (or marks it circular) and then
//! recomputes every transitive dependent exactly once, precedents first.
//! Dependencies are re-derived from formula text for every write.

use std::collections::HashSet;

use tabula_engine::engine::{
    CellError, CellRef, FormulaSource, StylePatch, Value, evaluate, extract_dependencies,
    has_cycle,
};
use tracing::{debug, trace};

use super::Sheet;
use super::state::parse_address;
use crate::error::Result;

impl Sheet {
    /// Set a cell's text, evaluate it and refresh everything that depends on it.
    pub fn set_cell_text(&mut self, address: &str, text: &str) -> Result<()> {
        let at = parse_address(address)?;
        self.write_text(at, text);
        Ok(())
    }

    /// Merge a partial style into a cell, creating it if needed.
    /// Styles never affect evaluation.
    pub fn set_cell_style(&mut self, address: &str, patch: &StylePatch) -> Result<()> {
        let at = parse_address(address)?;
        self.grid.entry(at).or_default().style.apply(patch);
        Ok(())
    }

    /// Remove a cell from the store and refresh its dependents.
    /// Returns whether a cell was present.
    pub fn clear_cell(&mut self, address: &str) -> Result<bool> {
        let at = parse_address(address)?;
        let removed = self.grid.remove(&at).is_some();
        if removed {
            self.propagate_from(&[at]);
        }
        Ok(removed)
    }

    pub(crate) fn write_text(&mut self, at: CellRef, text: &str) {
        // The entry guard must be released before evaluation reads the grid.
        self.grid.entry(at).or_default().set_raw(text);

        let computed = self.compute(&at, text);
        if let Some(mut cell) = self.grid.get_mut(&at) {
            cell.computed = computed;
        }
        self.propagate_from(&[at]);
    }

    /// Evaluate `text` as if stored at `at`.
    fn compute(&self, at: &CellRef, text: &str) -> Value {
        if text.starts_with('=') && has_cycle(at, text, &self.grid) {
            debug!(cell = %at, formula = text, "circular reference");
            return CellError::Circular.into();
        }
        evaluate(text, &self.grid, &self.functions)
    }

    /// Re-evaluate a stored formula cell in place. Literal cells are left alone.
    fn recompute(&self, at: &CellRef) {
        let Some(formula) = self.grid.formula(at) else {
            return;
        };
        let computed = self.compute(at, &formula);
        trace!(cell = %at, value = %computed, "recomputed");
        if let Some(mut cell) = self.grid.get_mut(at) {
            cell.computed = computed;
        }
    }

    /// Recompute every cell that transitively reads one of `sources`.
    /// The sources themselves keep their current computed values.
    pub(crate) fn propagate_from(&mut self, sources: &[CellRef]) {
        let affected = self.transitive_dependents(sources);
        if affected.is_empty() {
            return;
        }
        debug!(sources = sources.len(), affected = affected.len(), "propagating");
        for cell in self.evaluation_order(&affected) {
            self.recompute(&cell);
        }
    }

    /// Recompute every formula in the sheet.
    pub fn recalculate_all(&mut self) {
        let formulas: HashSet<CellRef> = self
            .grid
            .iter()
            .filter(|entry| entry.is_formula())
            .map(|entry| *entry.key())
            .collect();
        debug!(formulas = formulas.len(), "recalculating sheet");
        for cell in self.evaluation_order(&formulas) {
            self.recompute(&cell);
        }
    }

    /// Order `targets` so each cell comes after the targets it reads.
    ///
    /// Depth-first post-order over dependencies, restricted to `targets`.
    /// Cells on a cycle end up in some order; they evaluate to `#CIRCULAR!`
    /// regardless.
    fn evaluation_order(&self, targets: &HashSet<CellRef>) -> Vec<CellRef> {
        let precedents = |cell: &CellRef| -> Vec<CellRef> {
            self.grid
                .formula(cell)
                .map(|f| {
                    extract_dependencies(&f)
                        .into_iter()
                        .filter(|dep| targets.contains(dep))
                        .collect()
                })
                .unwrap_or_default()
        };

        let mut starts: Vec<CellRef> = targets.iter().copied().collect();
        starts.sort_unstable();

        let mut order = Vec::with_capacity(targets.len());
        let mut visited = HashSet::new();
        for start in starts {
            if !visited.insert(start) {
                continue;
            }
            let mut stack = vec![(start, precedents(&start), 0usize)];
            while let Some((cell, deps, next)) = stack.last_mut() {
                if let Some(dep) = deps.get(*next).copied() {
                    *next += 1;
                    if visited.insert(dep) {
                        let dep_precedents = precedents(&dep);
                        stack.push((dep, dep_precedents, 0));
                    }
                } else {
                    order.push(*cell);
                    stack.pop();
                }
            }
        }
        order
    }
}
