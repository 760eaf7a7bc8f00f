//! # rowforge
//!
//! Fill a template workbook once per data row and deliver the results.
//!
//! A rowforge run starts from a single template workbook that carries both
//! the document being produced and a mapping sheet of data rows. Each
//! header of the mapping sheet can point at one or more target cells, and
//! every data row then produces one output workbook with those cells
//! filled in, named by a configurable pattern and delivered through an
//! ordered chain of output sinks.
//!
//! ## Features
//!
//! - Parse a mapping sheet into headers and row records
//! - Register and validate header-to-cell targets
//! - Clone the template per row, excluding the mapping sheet
//! - Pattern, prefix and fallback file naming with sanitization
//! - Ordered delivery: chosen directory, beside the template, fallback
//! - Read and write workbooks as JSON documents
//!
//! ## Example
//!
//! ```rust
//! use rowforge::prelude::*;
//!
//! let mut template = Workbook::new();
//! let data = template.add_sheet("Data").unwrap();
//! data.set_value("A1", "Name").unwrap();
//! data.set_value("B1", "Amount").unwrap();
//! data.set_value("A2", "Alice").unwrap();
//! data.set_value("B2", "150").unwrap();
//! template.add_sheet("Invoice").unwrap();
//!
//! let mut session = Session::new(template);
//! session.load_mapping("Data").unwrap();
//! session.set_naming(NamingRule::from_pattern("{Name}_invoice"));
//! session.add_target("Name", Target::new("Invoice", "B2")).unwrap();
//! session.add_target("Amount", Target::new("Invoice", "B3")).unwrap();
//!
//! assert_eq!(
//!     session.preview_filenames().unwrap(),
//!     vec!["Alice_invoice.xlsx"]
//! );
//!
//! // let outcome = run_batch(&session, &JsonSerializer::default(),
//! //                         &FsHost::default(), &BatchOptions::default());
//! ```

pub mod prelude;

// Re-export model types
pub use rowforge_model::{
    Cell,
    CellRef,
    // Value types
    CellValue,
    // Error types
    Error,
    GridRange,
    Result,
    Sheet,
    // Main types
    Workbook,

    MAX_COLS,
    // Constants
    MAX_ROWS,
};

// Re-export engine types
pub use rowforge_engine::{
    coerce,
    default_target_sheet,
    grid_from_sheet,
    instantiate_row,
    parse_mapping_grid,
    preflight,
    preview_filenames,
    record_key,
    resolve_filename,
    run_batch,
    sanitize,
    BatchOptions,
    BatchOutcome,
    BookSerializer,
    EngineError,
    EngineResult,
    FsHost,
    HeaderLookup,
    MappingState,
    MappingTable,
    NamingRule,
    RowRecord,
    SaveHost,
    // Main types
    Session,
    SinkChain,
    SinkKind,
    Target,
    TargetRegistry,
    TemplateName,
    WriteMode,
};

// Re-export I/O types
pub use rowforge_jsonbook::{
    JsonError, JsonReadOptions, JsonReader, JsonResult, JsonWriteOptions, JsonWriter,
};

use std::path::Path;

/// Extension trait for Workbook to add file I/O
pub trait WorkbookExt {
    /// Open a workbook from a file
    fn open<P: AsRef<Path>>(path: P) -> Result<Workbook>;

    /// Save the workbook to a file
    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()>;
}

impl WorkbookExt for Workbook {
    fn open<P: AsRef<Path>>(path: P) -> Result<Workbook> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match extension.as_deref() {
            Some("json") => JsonReader::read_file(path, &JsonReadOptions::default())
                .map_err(|e| Error::other(e.to_string())),
            _ => Err(Error::other(format!(
                "Unsupported file format: {}",
                path.display()
            ))),
        }
    }

    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match extension.as_deref() {
            Some("json") => JsonWriter::write_file(self, path, &JsonWriteOptions::default())
                .map_err(|e| Error::other(e.to_string())),
            _ => Err(Error::other(format!(
                "Unsupported file format: {}",
                path.display()
            ))),
        }
    }
}

/// [`BookSerializer`] producing JSON workbook documents
#[derive(Debug, Clone, Default)]
pub struct JsonSerializer {
    options: JsonWriteOptions,
}

impl JsonSerializer {
    pub fn new(options: JsonWriteOptions) -> Self {
        Self { options }
    }
}

impl BookSerializer for JsonSerializer {
    fn serialize(&self, workbook: &Workbook) -> EngineResult<Vec<u8>> {
        let mut bytes = Vec::new();
        JsonWriter::write(workbook, &mut bytes, &self.options)
            .map_err(|e| EngineError::Serialize(e.to_string()))?;
        Ok(bytes)
    }
}
