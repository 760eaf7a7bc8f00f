//! Populated-range descriptor

use crate::addr::CellRef;
use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// The bounding rectangle of a sheet's populated cells
///
/// Stored half-open over (row, col): `start` is the top-left cell and `end`
/// is one past the bottom-right cell. The A1 display form ("A1:C3") is
/// inclusive, matching how workbook documents record a sheet's extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridRange {
    /// Top-left cell (inclusive)
    pub start: CellRef,
    /// One past the bottom-right cell (exclusive)
    pub end: CellRef,
}

impl GridRange {
    /// Create a range from two inclusive corner cells, in any order
    pub fn from_corners(a: CellRef, b: CellRef) -> Self {
        let start = CellRef::new(a.row.min(b.row), a.col.min(b.col));
        let far = CellRef::new(a.row.max(b.row), a.col.max(b.col));
        Self {
            start,
            end: CellRef::new(far.row + 1, far.col + 1),
        }
    }

    /// Create a range covering a single cell
    pub fn single(at: CellRef) -> Self {
        Self::from_corners(at, at)
    }

    /// Parse an inclusive A1-style range ("A1:C3") or single cell ("B2")
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if let Some(colon_pos) = s.find(':') {
            let start = CellRef::parse(&s[..colon_pos])
                .map_err(|_| Error::InvalidRange(s.to_string()))?;
            let end = CellRef::parse(&s[colon_pos + 1..])
                .map_err(|_| Error::InvalidRange(s.to_string()))?;
            Ok(Self::from_corners(start, end))
        } else {
            let at = CellRef::parse(s).map_err(|_| Error::InvalidRange(s.to_string()))?;
            Ok(Self::single(at))
        }
    }

    /// Check if the range covers no cells
    pub fn is_empty(&self) -> bool {
        self.end.row <= self.start.row || self.end.col <= self.start.col
    }

    /// Number of rows covered
    pub fn rows(&self) -> u32 {
        self.end.row.saturating_sub(self.start.row)
    }

    /// Number of columns covered
    pub fn cols(&self) -> u16 {
        self.end.col.saturating_sub(self.start.col)
    }

    /// Check if a cell lies within the range
    pub fn contains(&self, at: CellRef) -> bool {
        at.row >= self.start.row
            && at.row < self.end.row
            && at.col >= self.start.col
            && at.col < self.end.col
    }

    /// Format as an inclusive A1-style string
    pub fn to_a1(&self) -> String {
        if self.rows() == 1 && self.cols() == 1 {
            self.start.to_a1()
        } else {
            let last = CellRef::new(self.end.row - 1, self.end.col - 1);
            format!("{}:{}", self.start.to_a1(), last.to_a1())
        }
    }
}

impl fmt::Display for GridRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1())
    }
}

impl FromStr for GridRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
