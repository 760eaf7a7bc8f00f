//! # rowforge-jsonbook
//!
//! JSON workbook document reader and writer for rowforge.
//!
//! A document carries a `sheetNames` array fixing sheet order and a
//! `sheets` object keyed by sheet name. Within a sheet, keys starting
//! with `!` hold sheet-level entries (`!ref` is the populated range,
//! everything else passes through as opaque metadata) and all other keys
//! are A1 cell addresses:
//!
//! ```json
//! {
//!   "sheetNames": ["Data", "Invoice"],
//!   "sheets": {
//!     "Data": { "!ref": "A1:B2", "A1": { "v": "Name", "t": "s" },
//!               "A2": { "v": "Alice", "t": "s" },
//!               "B1": { "v": "Amount", "t": "s" },
//!               "B2": { "v": 150, "t": "n" } },
//!     "Invoice": { "!ref": "A1:B1",
//!                  "A1": { "v": "Total", "t": "s" },
//!                  "B1": { "v": 0, "t": "n", "f": "=SUM(B2:B9)" } }
//!   }
//! }
//! ```

mod reader;
mod writer;
mod options;
mod error;

pub use reader::JsonReader;
pub use writer::JsonWriter;
pub use options::{JsonReadOptions, JsonWriteOptions};
pub use error::{JsonError, JsonResult};
