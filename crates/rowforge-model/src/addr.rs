//! Cell reference type and A1 notation parsing

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::fmt;
use std::str::FromStr;

/// A cell reference (e.g., "A1", "B12")
///
/// References use column letters (A-XFD) and 1-based row numbers in display
/// form, and 0-based indices internally. Absolute markers (`$`) are accepted
/// on parse and discarded; they carry no meaning for value writes.
///
/// Ordering is row-major: all cells of row 1 sort before any cell of row 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRef {
    /// Row index (0-based internally, 1-based in display)
    pub row: u32,
    /// Column index (0-based, A=0, B=1, ..., XFD=16383)
    pub col: u16,
}

impl CellRef {
    /// Create a new cell reference
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// Parse a cell reference from A1-style notation
    ///
    /// Accepts at most three column letters and rejects row numbers with a
    /// leading zero, so "B0" and "A01" are invalid while "$B$2" parses as B2.
    ///
    /// # Examples
    /// ```
    /// use rowforge_model::CellRef;
    ///
    /// let at = CellRef::parse("A1").unwrap();
    /// assert_eq!(at.row, 0);
    /// assert_eq!(at.col, 0);
    ///
    /// let at = CellRef::parse("$B$2").unwrap();
    /// assert_eq!(at.row, 1);
    /// assert_eq!(at.col, 1);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidAddress("empty address".into()));
        }

        let cleaned: String = trimmed.chars().filter(|&c| c != '$').collect();
        let bytes = cleaned.as_bytes();

        let mut pos = 0;
        while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
            pos += 1;
        }

        if pos == 0 {
            return Err(Error::InvalidAddress(format!(
                "no column letters in '{}'",
                s
            )));
        }

        if pos > 3 {
            return Err(Error::InvalidAddress(format!(
                "more than three column letters in '{}'",
                s
            )));
        }

        let col = Self::letters_to_column(&cleaned[..pos])?;

        let row_str = &cleaned[pos..];
        if row_str.is_empty() {
            return Err(Error::InvalidAddress(format!("no row number in '{}'", s)));
        }

        if row_str.starts_with('0') {
            return Err(Error::InvalidAddress(format!(
                "row number has a leading zero in '{}'",
                s
            )));
        }

        let row: u32 = row_str
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("invalid row number in '{}'", s)))?;

        // Display rows are 1-based, we use 0-based internally
        let row = row - 1;

        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }

        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
        }

        Ok(Self { row, col })
    }

    /// Convert column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
    pub fn column_to_letters(col: u16) -> String {
        let mut result = String::new();
        let mut n = col as u32 + 1; // 1-based for calculation

        while n > 0 {
            n -= 1;
            let c = ((n % 26) as u8 + b'A') as char;
            result.insert(0, c);
            n /= 26;
        }

        result
    }

    /// Convert column letters to index (A = 0, Z = 25, AA = 26, etc.)
    pub fn letters_to_column(letters: &str) -> Result<u16> {
        if letters.is_empty() {
            return Err(Error::InvalidAddress("empty column letters".into()));
        }

        let mut col: u32 = 0;
        for c in letters.chars() {
            if !c.is_ascii_alphabetic() {
                return Err(Error::InvalidAddress(format!(
                    "invalid column letter '{}'",
                    c
                )));
            }
            col = col * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
        }

        let col = col - 1; // Convert to 0-based

        if col >= MAX_COLS as u32 {
            let reported = col.min(u16::MAX as u32) as u16;
            return Err(Error::ColumnOutOfBounds(reported, MAX_COLS - 1));
        }

        Ok(col as u16)
    }

    /// Format as an A1-style string
    pub fn to_a1(&self) -> String {
        format!("{}{}", Self::column_to_letters(self.col), self.row + 1)
    }

    /// Check whether a string is a well-formed cell reference
    pub fn is_valid(s: &str) -> bool {
        Self::parse(s).is_ok()
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1())
    }
}

impl FromStr for CellRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
