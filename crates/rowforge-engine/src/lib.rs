//! # rowforge-engine
//!
//! Turns one template workbook plus one mapping sheet into a batch of
//! filled-in workbooks, one per data row.
//!
//! The pieces, in the order a run uses them:
//!
//! - [`Session`]: the loaded template and everything configured around it
//! - [`rows`]: parsing the mapping sheet into headers and row records
//! - [`registry`]: header-to-cell target registration and validation
//! - [`naming`]: output file name resolution and sanitization
//! - [`instantiate`]: per-row template cloning and cell writes
//! - [`sink`]: ordered delivery of finished bytes
//! - [`batch`]: preflight checks and the row loop
//!
//! # Examples
//!
//! ```
//! use rowforge_engine::{BatchOptions, NamingRule, Session, Target};
//! use rowforge_model::Workbook;
//!
//! let mut template = Workbook::new();
//! let data = template.add_sheet("Data")?;
//! data.set_value("A1", "Name")?;
//! data.set_value("A2", "Alice")?;
//! template.add_sheet("Invoice")?;
//!
//! let mut session = Session::new(template);
//! session.load_mapping("Data")?;
//! session.set_naming(NamingRule::from_pattern("{Name}"));
//! session.add_target("Name", Target::new("Invoice", "B2"))?;
//!
//! assert_eq!(session.preview_filenames()?, vec!["Alice.xlsx"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod batch;
pub mod error;
pub mod instantiate;
pub mod naming;
pub mod registry;
pub mod rows;
pub mod session;
pub mod sink;

pub use batch::{preflight, run_batch, BatchOptions, BatchOutcome, BookSerializer};
pub use error::{EngineError, EngineResult};
pub use instantiate::{coerce, instantiate_row, WriteMode};
pub use naming::{preview_filenames, resolve_filename, sanitize, NamingRule, TemplateName};
pub use registry::{default_target_sheet, Target, TargetRegistry};
pub use rows::{grid_from_sheet, parse_mapping_grid, record_key, HeaderLookup, MappingTable, RowRecord};
pub use session::{MappingState, Session};
pub use sink::{FsHost, SaveHost, SinkChain, SinkKind};
