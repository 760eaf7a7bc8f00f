//! Mapping sheet parsing into headers and row records

use ahash::AHashMap;
use rowforge_model::{CellRef, Sheet};

use crate::error::{EngineError, EngineResult};

/// One data row: mapping from record key to raw cell text
///
/// Record keys are the literal trimmed headers of the mapping sheet; a blank
/// header contributes its positional placeholder ("ColN", 1-indexed)
/// instead. Values keep the raw cell text untrimmed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowRecord {
    values: AHashMap<String, String>,
}

impl RowRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key/value pair
    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.values.insert(key.into(), value.into());
    }

    /// Get the value for a record key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|v| v.as_str())
    }

    /// Check whether a record key exists
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the record has no entries
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Two-tier header lookup: exact literal match first, then normalized
///
/// The normalized tier maps trimmed, lowercased header text back to the
/// literal header; when two headers normalize identically the later one
/// wins. Built once per mapping load.
#[derive(Debug, Clone, Default)]
pub struct HeaderLookup {
    normalized: AHashMap<String, String>,
}

impl HeaderLookup {
    /// Build the lookup from the literal header list
    pub fn from_headers(headers: &[String]) -> Self {
        let mut normalized = AHashMap::new();
        for header in headers {
            let norm = header.trim().to_lowercase();
            if !norm.is_empty() {
                normalized.insert(norm, header.clone());
            }
        }
        Self { normalized }
    }

    /// Resolve already-normalized text to the literal header it names
    pub fn literal(&self, normalized: &str) -> Option<&str> {
        self.normalized.get(normalized).map(|h| h.as_str())
    }
}

/// The parsed mapping sheet: headers, data rows, and the header lookup
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    headers: Vec<String>,
    rows: Vec<RowRecord>,
    lookup: HeaderLookup,
}

impl MappingTable {
    /// The literal trimmed headers, in sheet order (blank entries possible)
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// All data rows, in sheet order
    pub fn rows(&self) -> &[RowRecord] {
        &self.rows
    }

    /// Get one row by 0-based index
    pub fn row(&self, index: usize) -> Option<&RowRecord> {
        self.rows.get(index)
    }

    /// Number of data rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// The tolerant header lookup built at parse time
    pub fn lookup(&self) -> &HeaderLookup {
        &self.lookup
    }

    /// Edit one cell of one row
    ///
    /// `key` must be an existing record key (a literal header or a "ColN"
    /// placeholder).
    pub fn set_row_value(&mut self, row: usize, key: &str, value: &str) -> EngineResult<()> {
        let count = self.rows.len();
        let record = self
            .rows
            .get_mut(row)
            .ok_or(EngineError::RowOutOfBounds(row, count))?;

        if !record.contains(key) {
            return Err(EngineError::UnknownHeader(key.to_string()));
        }

        record.insert(key, value);
        Ok(())
    }
}

/// The record key for a header at column `index`
///
/// Blank headers take the positional placeholder "ColN" (1-indexed).
pub fn record_key(header: &str, index: usize) -> String {
    if header.is_empty() {
        format!("Col{}", index + 1)
    } else {
        header.to_string()
    }
}

/// Parse a raw mapping-sheet grid into a [`MappingTable`]
///
/// The first row with at least one non-blank cell (after trimming) is the
/// header row; rows before it are discarded. Later rows whose cells are all
/// blank are spacers and produce no record. Cells beyond the header width
/// are ignored; missing trailing cells map to the empty string.
pub fn parse_mapping_grid(grid: &[Vec<String>]) -> EngineResult<MappingTable> {
    let header_row = grid
        .iter()
        .position(|row| row.iter().any(|c| !c.trim().is_empty()))
        .ok_or(EngineError::EmptyMappingSheet)?;

    let headers: Vec<String> = grid[header_row]
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let lookup = HeaderLookup::from_headers(&headers);

    let mut rows = Vec::new();
    for cells in &grid[header_row + 1..] {
        if cells.iter().all(|c| c.trim().is_empty()) {
            continue;
        }

        let mut record = RowRecord::new();
        for (i, header) in headers.iter().enumerate() {
            let value = cells.get(i).cloned().unwrap_or_default();
            record.insert(record_key(header, i), value);
        }
        rows.push(record);
    }

    Ok(MappingTable {
        headers,
        rows,
        lookup,
    })
}

/// Flatten a sheet into the raw grid the row parser consumes
///
/// Rows and columns are taken from the sheet's recorded range, or from the
/// populated bounds when no range is recorded. Absent cells become empty
/// strings.
pub fn grid_from_sheet(sheet: &Sheet) -> Vec<Vec<String>> {
    let range = match sheet.range().or_else(|| sheet.used_bounds()) {
        Some(range) => range,
        None => return Vec::new(),
    };

    let mut grid = Vec::with_capacity(range.rows() as usize);
    for row in range.start.row..range.end.row {
        let mut cells = Vec::with_capacity(range.cols() as usize);
        for col in range.start.col..range.end.col {
            let text = sheet
                .cell_at(CellRef::new(row, col))
                .map(|c| c.value.to_string())
                .unwrap_or_default();
            cells.push(text);
        }
        grid.push(cells);
    }
    grid
}
