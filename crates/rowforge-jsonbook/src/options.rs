//! JSON document options

/// Options for reading JSON workbook documents
#[derive(Debug, Clone)]
pub struct JsonReadOptions {
    /// Skip malformed cell keys and ranges instead of failing
    pub lenient: bool,
}

impl Default for JsonReadOptions {
    fn default() -> Self {
        Self { lenient: true }
    }
}

/// Options for writing JSON workbook documents
#[derive(Debug, Clone, Default)]
pub struct JsonWriteOptions {
    /// Pretty-print the output
    pub pretty: bool,
}
