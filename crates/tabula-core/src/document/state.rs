use crate::config::SheetConfig;
use crate::error::Result;
use std::collections::{HashMap, HashSet};
use tabula_engine::builtins::FunctionRegistry;
use tabula_engine::engine::{Cell, CellRef, Grid, extract_dependencies};

use super::Clipboard;

/// UI-agnostic state of a single sheet.
///
/// All mutating operations run to completion before returning, so callers
/// only ever observe fully recomputed values.
pub struct Sheet {
    /// Sparse cell storage; absent cells are empty.
    pub(crate) grid: Grid,
    /// Functions available to formulas.
    pub(crate) functions: FunctionRegistry,
    pub(crate) config: SheetConfig,
    /// Per-row heights, always `config.rows` long.
    pub(crate) row_heights: Vec<u32>,
    /// Per-column widths, always `config.columns` long.
    pub(crate) column_widths: Vec<u32>,
    pub(crate) clipboard: Option<Clipboard>,
}

/// Parse a label, mapping failures to [`SheetError::InvalidAddress`](crate::SheetError).
pub(crate) fn parse_address(label: &str) -> Result<CellRef> {
    Ok(label.parse::<CellRef>()?)
}

impl Sheet {
    /// Create a sheet with the default configuration and built-in functions.
    pub fn new() -> Self {
        Self::build(SheetConfig::default(), FunctionRegistry::default())
    }

    /// Create a sheet with custom dimensions.
    pub fn with_config(config: SheetConfig) -> Result<Self> {
        Self::with_functions(config, FunctionRegistry::default())
    }

    /// Create a sheet with custom dimensions and function set.
    pub fn with_functions(config: SheetConfig, functions: FunctionRegistry) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, functions))
    }

    fn build(config: SheetConfig, functions: FunctionRegistry) -> Self {
        Sheet {
            grid: Grid::new(),
            functions,
            row_heights: vec![config.default_row_height; config.rows],
            column_widths: vec![config.default_column_width; config.columns],
            config,
            clipboard: None,
        }
    }

    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    /// Mutable access for registering extra functions. Existing computed
    /// values are not refreshed until their cells recompute.
    pub fn functions_mut(&mut self) -> &mut FunctionRegistry {
        &mut self.functions
    }

    /// Get a copy of the cell at `address`, or a default empty cell.
    pub fn get_cell(&self, address: &str) -> Result<Cell> {
        let at = parse_address(address)?;
        Ok(self.cell_at(&at).unwrap_or_default())
    }

    /// The stored cell at `at`, if any.
    pub fn cell_at(&self, at: &CellRef) -> Option<Cell> {
        self.grid.get(at).map(|entry| entry.value().clone())
    }

    /// Display text of the computed value at `address`.
    pub fn display(&self, address: &str) -> Result<String> {
        let at = parse_address(address)?;
        Ok(self
            .grid
            .get(&at)
            .map(|entry| entry.computed.as_text())
            .unwrap_or_default())
    }

    /// Number of stored (non-default) cells.
    pub fn len(&self) -> usize {
        self.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    /// Addresses of all stored cells in row-major order.
    pub fn addresses(&self) -> Vec<CellRef> {
        let mut refs: Vec<CellRef> = self.grid.iter().map(|entry| *entry.key()).collect();
        refs.sort_unstable();
        refs
    }

    pub fn row_height(&self, row: usize) -> Option<u32> {
        self.row_heights.get(row).copied()
    }

    pub fn column_width(&self, col: usize) -> Option<u32> {
        self.column_widths.get(col).copied()
    }

    /// Set a row height. Rows outside the grid are ignored.
    pub fn set_row_height(&mut self, row: usize, height: u32) {
        if let Some(slot) = self.row_heights.get_mut(row) {
            *slot = height;
        }
    }

    /// Set a column width. Columns outside the grid are ignored.
    pub fn set_column_width(&mut self, col: usize, width: u32) {
        if let Some(slot) = self.column_widths.get_mut(col) {
            *slot = width;
        }
    }

    /// Reverse dependency map: cell -> formula cells that read it.
    /// Derived from formula text on every call.
    pub(crate) fn dependents_index(&self) -> HashMap<CellRef, Vec<CellRef>> {
        let mut index: HashMap<CellRef, Vec<CellRef>> = HashMap::new();
        for entry in self.grid.iter() {
            if let Some(formula) = &entry.formula {
                for dep in extract_dependencies(formula) {
                    index.entry(dep).or_default().push(*entry.key());
                }
            }
        }
        index
    }

    /// Every cell that transitively reads one of `sources`, excluding the sources.
    pub(crate) fn transitive_dependents(&self, sources: &[CellRef]) -> HashSet<CellRef> {
        let index = self.dependents_index();
        let origin: HashSet<CellRef> = sources.iter().copied().collect();
        let mut found = HashSet::new();
        let mut to_process = sources.to_vec();
        while let Some(cell_ref) = to_process.pop() {
            for dep in index.get(&cell_ref).into_iter().flatten() {
                if !origin.contains(dep) && found.insert(*dep) {
                    to_process.push(*dep);
                }
            }
        }
        found
    }
}

impl Default for Sheet {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Sheet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sheet")
            .field("cells", &self.grid.len())
            .field("config", &self.config)
            .field("functions", &self.functions)
            .finish()
    }
}
