//! # rowforge-model
//!
//! Workbook data model for the rowforge templating engine.
//!
//! This crate provides the fundamental types used throughout rowforge:
//! - [`CellValue`] and [`Cell`] - cell values with formula/style metadata
//! - [`CellRef`] and [`GridRange`] - cell addressing and populated ranges
//! - [`Sheet`] and [`Workbook`] - the document structures
//!
//! ## Example
//!
//! ```rust
//! use rowforge_model::{CellValue, Workbook};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.add_sheet("Invoice").unwrap();
//!
//! sheet.set_value("A1", "Total").unwrap();
//! sheet.set_value("B1", 42.0).unwrap();
//!
//! assert_eq!(sheet.value("B1").unwrap(), Some(&CellValue::Number(42.0)));
//! ```

pub mod addr;
pub mod cell;
pub mod error;
pub mod range;
pub mod sheet;
pub mod value;
pub mod workbook;

// Re-exports for convenience
pub use addr::CellRef;
pub use cell::Cell;
pub use error::{Error, Result};
pub use range::GridRange;
pub use sheet::Sheet;
pub use value::CellValue;
pub use workbook::Workbook;

/// Maximum number of rows in a sheet
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a sheet
pub const MAX_COLS: u16 = 16_384;
