//! Sheet type

use std::collections::BTreeMap;

use crate::addr::CellRef;
use crate::cell::Cell;
use crate::error::Result;
use crate::range::GridRange;
use crate::value::CellValue;

/// A single sheet in a workbook
///
/// Cells are stored sparsely, keyed by [`CellRef`] in row-major order.
/// Sheet-level metadata (the "!"-prefixed key space of workbook documents)
/// lives in a separate map and is preserved verbatim on copy; the populated
/// range is kept apart from both.
///
/// `Clone` produces a fully independent structural copy: no cell, metadata
/// entry, or string is shared with the original.
#[derive(Debug, Clone)]
pub struct Sheet {
    name: String,
    cells: BTreeMap<CellRef, Cell>,
    meta: BTreeMap<String, serde_json::Value>,
    range: Option<GridRange>,
}

impl Sheet {
    /// Create a new empty sheet with the given name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
            meta: BTreeMap::new(),
            range: None,
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the sheet name
    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    // === Cell access ===

    /// Get a cell by address string (e.g., "B2")
    pub fn cell(&self, address: &str) -> Result<Option<&Cell>> {
        let at = CellRef::parse(address)?;
        Ok(self.cells.get(&at))
    }

    /// Get a cell by reference
    pub fn cell_at(&self, at: CellRef) -> Option<&Cell> {
        self.cells.get(&at)
    }

    /// Get a mutable cell by reference
    pub fn cell_at_mut(&mut self, at: CellRef) -> Option<&mut Cell> {
        self.cells.get_mut(&at)
    }

    /// Get a cell value by address string
    pub fn value(&self, address: &str) -> Result<Option<&CellValue>> {
        Ok(self.cell(address)?.map(|c| &c.value))
    }

    // === Cell modification ===

    /// Write a value into a cell, creating the cell if absent
    ///
    /// A written value always wins over a stale formula, so any formula on
    /// the cell is cleared. Style metadata on the cell survives unchanged.
    pub fn write_value<V: Into<CellValue>>(&mut self, at: CellRef, value: V) {
        let cell = self.cells.entry(at).or_default();
        cell.value = value.into();
        cell.formula = None;
    }

    /// Write a value by address string
    pub fn set_value<V: Into<CellValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let at = CellRef::parse(address)?;
        self.write_value(at, value);
        Ok(())
    }

    /// Set a cell formula by address string
    pub fn set_formula(&mut self, address: &str, formula: &str) -> Result<()> {
        let at = CellRef::parse(address)?;

        // Ensure formula starts with '='
        let formula = if formula.starts_with('=') {
            formula.to_string()
        } else {
            format!("={}", formula)
        };

        self.cells.entry(at).or_default().formula = Some(formula);
        Ok(())
    }

    /// Set cell style metadata by address string
    pub fn set_style(&mut self, address: &str, style: serde_json::Value) -> Result<()> {
        let at = CellRef::parse(address)?;
        self.cells.entry(at).or_default().style = Some(style);
        Ok(())
    }

    /// Insert a fully built cell at a reference, replacing any existing cell
    pub fn insert_cell(&mut self, at: CellRef, cell: Cell) {
        self.cells.insert(at, cell);
    }

    /// Remove a cell
    pub fn remove_cell(&mut self, at: CellRef) -> Option<Cell> {
        self.cells.remove(&at)
    }

    // === Iteration ===

    /// Iterate over all cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (&CellRef, &Cell)> {
        self.cells.iter()
    }

    /// Number of populated cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Check if the sheet has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    // === Metadata ===

    /// Sheet-level metadata entries
    pub fn meta(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.meta
    }

    /// Set a sheet-level metadata entry
    pub fn set_meta<S: Into<String>>(&mut self, key: S, value: serde_json::Value) {
        self.meta.insert(key.into(), value);
    }

    // === Populated range ===

    /// The recorded populated range, if any
    pub fn range(&self) -> Option<GridRange> {
        self.range
    }

    /// Record the populated range
    pub fn set_range(&mut self, range: GridRange) {
        self.range = Some(range);
    }

    /// Bounding box of all populated cells
    pub fn used_bounds(&self) -> Option<GridRange> {
        let mut refs = self.cells.keys();
        let first = refs.next()?;

        let mut min_col = first.col;
        let mut max_col = first.col;
        // Row-major key order: the first key has the min row, the last the max
        let min_row = first.row;
        let mut max_row = first.row;

        for at in refs {
            max_row = at.row;
            if at.col < min_col {
                min_col = at.col;
            }
            if at.col > max_col {
                max_col = at.col;
            }
        }

        Some(GridRange::from_corners(
            CellRef::new(min_row, min_col),
            CellRef::new(max_row, max_col),
        ))
    }

    /// Recompute the populated range from the current cells
    ///
    /// A sheet with no cells keeps whatever range it already carried.
    pub fn recompute_range(&mut self) {
        if let Some(bounds) = self.used_bounds() {
            self.range = Some(bounds);
        }
    }
}
