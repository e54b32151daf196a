//! Circular dependency detection for formula cells.
//!
//! Before a formula is accepted we walk the formulas it reads, depth first,
//! looking for a path back to the cell being written. Dependencies come from
//! the formula text of each visited cell, so no graph has to be kept in sync.

use std::collections::HashSet;

use super::cell_ref::CellRef;
use super::deps::extract_dependencies;

/// Read access to the formula text stored at a cell.
pub trait FormulaSource {
    /// The cell's formula, or None for literals and absent cells.
    fn formula(&self, cell: &CellRef) -> Option<String>;
}

/// Report whether storing `formula` at `origin` would create a cycle.
///
/// Also reports true when the walk runs into a cycle that does not pass
/// through `origin`, since such a formula could never settle either.
pub fn has_cycle<S: FormulaSource + ?Sized>(origin: &CellRef, formula: &str, cells: &S) -> bool {
    let mut path = HashSet::from([*origin]);
    let mut cleared = HashSet::new();
    walk(origin, formula, cells, &mut path, &mut cleared)
}

fn walk<S: FormulaSource + ?Sized>(
    origin: &CellRef,
    formula: &str,
    cells: &S,
    path: &mut HashSet<CellRef>,
    cleared: &mut HashSet<CellRef>,
) -> bool {
    for dep in extract_dependencies(formula) {
        if dep == *origin || path.contains(&dep) {
            return true;
        }
        if cleared.contains(&dep) {
            continue;
        }
        let Some(dep_formula) = cells.formula(&dep) else {
            continue;
        };

        path.insert(dep);
        if walk(origin, &dep_formula, cells, path, cleared) {
            return true;
        }
        path.remove(&dep);
        // No route back to origin below this cell.
        cleared.insert(dep);
    }
    false
}
