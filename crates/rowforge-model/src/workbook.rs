//! Workbook type - the main document structure

use crate::error::{Error, Result};
use crate::sheet::Sheet;

/// A workbook: an ordered collection of named sheets
///
/// `Clone` deep-copies every sheet, so a cloned workbook can be mutated
/// freely without affecting the original.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    /// Create a new empty workbook with no sheets
    pub fn new() -> Self {
        Self { sheets: Vec::new() }
    }

    /// Get the number of sheets
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Check if the workbook has no sheets
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Get a sheet by index
    pub fn sheet(&self, index: usize) -> Option<&Sheet> {
        self.sheets.get(index)
    }

    /// Get a mutable sheet by index
    pub fn sheet_mut(&mut self, index: usize) -> Option<&mut Sheet> {
        self.sheets.get_mut(index)
    }

    /// Get a sheet by exact name
    pub fn sheet_by_name(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name() == name)
    }

    /// Get a mutable sheet by exact name
    pub fn sheet_by_name_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.name() == name)
    }

    /// Get a sheet by name, tolerating surrounding whitespace
    ///
    /// Exact matches win; otherwise the comparison retries with both sides
    /// trimmed, so "Invoice " finds a sheet named "Invoice" and vice versa.
    pub fn sheet_by_name_tolerant(&self, name: &str) -> Option<&Sheet> {
        self.sheet_by_name(name)
            .or_else(|| self.sheets.iter().find(|s| s.name().trim() == name.trim()))
    }

    /// Get the index of a sheet by exact name
    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        self.sheets.iter().position(|s| s.name() == name)
    }

    /// Iterate over all sheets in order
    pub fn sheets(&self) -> impl Iterator<Item = &Sheet> {
        self.sheets.iter()
    }

    /// Iterate over all sheets mutably
    pub fn sheets_mut(&mut self) -> impl Iterator<Item = &mut Sheet> {
        self.sheets.iter_mut()
    }

    /// Iterate over the sheet names in order
    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|s| s.name())
    }

    /// Add a new empty sheet with the given name
    pub fn add_sheet<S: Into<String>>(&mut self, name: S) -> Result<&mut Sheet> {
        let name = name.into();
        self.validate_sheet_name(&name)?;

        let index = self.sheets.len();
        self.sheets.push(Sheet::new(name));
        Ok(&mut self.sheets[index])
    }

    /// Add an existing sheet to the workbook
    pub fn add_existing_sheet(&mut self, sheet: Sheet) -> Result<usize> {
        self.validate_sheet_name(sheet.name())?;
        let index = self.sheets.len();
        self.sheets.push(sheet);
        Ok(index)
    }

    /// Remove a sheet by index
    pub fn remove_sheet(&mut self, index: usize) -> Result<Sheet> {
        if index >= self.sheets.len() {
            return Err(Error::SheetOutOfBounds(index, self.sheets.len()));
        }
        Ok(self.sheets.remove(index))
    }

    /// Remove a sheet by exact name, if present
    pub fn remove_sheet_by_name(&mut self, name: &str) -> Option<Sheet> {
        let index = self.sheet_index(name)?;
        Some(self.sheets.remove(index))
    }

    /// Rename a sheet
    pub fn rename_sheet(&mut self, index: usize, new_name: &str) -> Result<()> {
        if index >= self.sheets.len() {
            return Err(Error::SheetOutOfBounds(index, self.sheets.len()));
        }

        self.validate_sheet_name_excluding(new_name, Some(index))?;

        self.sheets[index].set_name(new_name);
        Ok(())
    }

    /// Validate a sheet name
    fn validate_sheet_name(&self, name: &str) -> Result<()> {
        self.validate_sheet_name_excluding(name, None)
    }

    /// Validate a sheet name, optionally excluding a sheet from duplicate check
    fn validate_sheet_name_excluding(
        &self,
        name: &str,
        exclude_index: Option<usize>,
    ) -> Result<()> {
        if name.is_empty() {
            return Err(Error::InvalidSheetName("Sheet name cannot be empty".into()));
        }

        // Check for duplicate names (case-insensitive)
        let name_lower = name.to_lowercase();
        for (i, sheet) in self.sheets.iter().enumerate() {
            if Some(i) != exclude_index && sheet.name().to_lowercase() == name_lower {
                return Err(Error::DuplicateSheetName(name.into()));
            }
        }

        Ok(())
    }
}
