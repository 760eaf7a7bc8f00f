//! Prelude module - common imports for rowforge users
//!
//! ```rust
//! use rowforge::prelude::*;
//! ```

pub use crate::{
    // Batch types
    run_batch,
    BatchOptions,
    BatchOutcome,
    BookSerializer,
    Cell,
    CellRef,
    // Value types
    CellValue,
    // Engine error types
    EngineError,
    EngineResult,
    // Error types
    Error,
    // Output sinks
    FsHost,
    GridRange,
    // I/O types
    JsonReader,
    JsonSerializer,
    JsonWriter,
    MappingTable,
    // Naming types
    NamingRule,
    Result,
    RowRecord,
    SaveHost,
    // Main types
    Session,
    Sheet,
    Target,
    TargetRegistry,
    TemplateName,
    Workbook,
    // Extension traits
    WorkbookExt,
    WriteMode,
};
