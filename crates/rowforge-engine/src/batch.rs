//! Batch generation over every mapping row

use std::thread;
use std::time::Duration;

use log::{debug, info, warn};
use rowforge_model::Workbook;

use crate::error::{EngineError, EngineResult};
use crate::instantiate::{instantiate_row, WriteMode};
use crate::naming::resolve_filename;
use crate::session::Session;
use crate::sink::{SaveHost, SinkChain};

/// Serializes a finished workbook into output bytes
///
/// A serialization failure indicates a broken template or codec and aborts
/// the whole batch, unlike per-row delivery failures.
pub trait BookSerializer {
    fn serialize(&self, workbook: &Workbook) -> EngineResult<Vec<u8>>;
}

/// Options for one batch run
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// How empty row values treat destination cells
    pub mode: WriteMode,
    /// Proceed even when some headers have no targets
    pub allow_unmapped: bool,
    /// Pause inserted after every row
    pub pacing: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        BatchOptions {
            mode: WriteMode::Conditional,
            allow_unmapped: false,
            pacing: Duration::from_millis(80),
        }
    }
}

/// Counts from a completed batch run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchOutcome {
    /// Rows whose output reached a sink
    pub generated: usize,
    /// Rows for which every sink failed
    pub failed: usize,
}

/// Check every precondition of a batch run without generating anything
///
/// In order: a mapping must be loaded with at least one data row, the
/// naming inputs must be usable, every configured target must be valid
/// against the template, and every header must have a target unless
/// `allow_unmapped` is set.
pub fn preflight(session: &Session, options: &BatchOptions) -> EngineResult<()> {
    let mapping = session.mapping().ok_or(EngineError::MappingNotLoaded)?;
    if mapping.table().row_count() == 0 {
        return Err(EngineError::NoRows);
    }

    session.naming().validate()?;

    let headers = mapping.table().headers();
    mapping
        .registry()
        .validate(headers, session.template(), mapping.sheet_name())?;

    if !options.allow_unmapped {
        let unmapped = mapping.registry().unmapped_headers(headers);
        if !unmapped.is_empty() {
            return Err(EngineError::UnmappedHeaders(unmapped));
        }
    }

    Ok(())
}

/// Generate and deliver one output per mapping row
///
/// Rows are processed in sheet order. Serialization failures abort the
/// run; delivery failures are logged and counted, and later rows still
/// proceed. A pacing pause follows every row.
pub fn run_batch(
    session: &Session,
    serializer: &dyn BookSerializer,
    host: &dyn SaveHost,
    options: &BatchOptions,
) -> EngineResult<BatchOutcome> {
    preflight(session, options)?;

    let mapping = session.mapping().ok_or(EngineError::MappingNotLoaded)?;
    let table = mapping.table();
    let chain = SinkChain::resolve(session.output_dir(), session.template_path());

    let mut outcome = BatchOutcome::default();
    for (index, row) in table.rows().iter().enumerate() {
        let book = instantiate_row(
            session.template(),
            mapping.sheet_name(),
            table.headers(),
            mapping.registry(),
            row,
            options.mode,
        );
        let bytes = serializer.serialize(&book)?;
        let name = resolve_filename(
            session.naming(),
            row,
            table.lookup(),
            index,
            session.template_name(),
        );

        info!("Saving '{}'", name);
        match chain.deliver(host, &name, &bytes) {
            Ok(sink) => {
                debug!("Saved '{}' via {}", name, sink);
                outcome.generated += 1;
            }
            Err(err) => {
                warn!("{}", err);
                outcome.failed += 1;
            }
        }

        thread::sleep(options.pacing);
    }

    Ok(outcome)
}
