//! JSON document reader

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::warn;
use serde_json::{Map, Value};

use crate::error::{JsonError, JsonResult};
use crate::options::JsonReadOptions;
use rowforge_model::{Cell, CellRef, CellValue, GridRange, Sheet, Workbook};

/// JSON document reader
pub struct JsonReader;

impl JsonReader {
    /// Read a JSON workbook document from a file
    pub fn read_file<P: AsRef<Path>>(path: P, options: &JsonReadOptions) -> JsonResult<Workbook> {
        let file = File::open(path)?;
        Self::read(file, options)
    }

    /// Read a JSON workbook document from a reader
    pub fn read<R: Read>(reader: R, options: &JsonReadOptions) -> JsonResult<Workbook> {
        let doc: Value = serde_json::from_reader(reader)?;
        Self::from_value(&doc, options)
    }

    /// Build a workbook from an already parsed document
    ///
    /// Sheets appear in `sheetNames` order; every listed sheet must have a
    /// body under `sheets`. In lenient mode, malformed `!ref` strings and
    /// keys that are not valid cell addresses are skipped with a warning.
    pub fn from_value(doc: &Value, options: &JsonReadOptions) -> JsonResult<Workbook> {
        let root = doc
            .as_object()
            .ok_or_else(|| JsonError::document("the root is not an object"))?;
        let names = root
            .get("sheetNames")
            .and_then(Value::as_array)
            .ok_or_else(|| JsonError::document("missing 'sheetNames' array"))?;
        let sheets = root
            .get("sheets")
            .and_then(Value::as_object)
            .ok_or_else(|| JsonError::document("missing 'sheets' object"))?;

        let mut workbook = Workbook::new();
        for name in names {
            let name = name
                .as_str()
                .ok_or_else(|| JsonError::document("'sheetNames' entries must be strings"))?;
            let body = sheets.get(name).and_then(Value::as_object).ok_or_else(|| {
                JsonError::document(format!("sheet '{}' is listed but has no body", name))
            })?;
            let sheet = Self::read_sheet(name, body, options)?;
            workbook.add_existing_sheet(sheet)?;
        }
        Ok(workbook)
    }

    fn read_sheet(
        name: &str,
        body: &Map<String, Value>,
        options: &JsonReadOptions,
    ) -> JsonResult<Sheet> {
        let mut sheet = Sheet::new(name);

        for (key, value) in body {
            if key == "!ref" {
                let text = value.as_str().unwrap_or_default();
                match GridRange::parse(text) {
                    Ok(range) => sheet.set_range(range),
                    Err(_) if options.lenient => {
                        warn!("Ignoring malformed '!ref' '{}' on sheet '{}'", text, name);
                    }
                    Err(err) => return Err(err.into()),
                }
            } else if key.starts_with('!') {
                // Opaque sheet-level metadata, passed through untouched
                sheet.set_meta(key.clone(), value.clone());
            } else {
                match CellRef::parse(key) {
                    Ok(at) => sheet.insert_cell(at, Self::read_cell(key, value)?),
                    Err(_) if options.lenient => {
                        warn!("Skipping key '{}' on sheet '{}': not a cell address", key, name);
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        }
        Ok(sheet)
    }

    fn read_cell(key: &str, body: &Value) -> JsonResult<Cell> {
        let body = body
            .as_object()
            .ok_or_else(|| JsonError::document(format!("cell '{}' is not an object", key)))?;

        let tag = body.get("t").and_then(Value::as_str);
        let value = match body.get("v") {
            Some(Value::Number(n)) => CellValue::Number(n.as_f64().unwrap_or_default()),
            Some(Value::String(s)) => match tag {
                // A numeric tag on string content still reads as a number
                // when the content parses as one
                Some("n") => s
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .map(CellValue::Number)
                    .unwrap_or_else(|| CellValue::Text(s.clone())),
                _ => CellValue::Text(s.clone()),
            },
            Some(Value::Bool(b)) => CellValue::Text(b.to_string()),
            _ => CellValue::Text(String::new()),
        };

        let formula = body.get("f").and_then(Value::as_str).map(str::to_string);
        let style = body.get("s").cloned().filter(|s| !s.is_null());

        Ok(Cell {
            value,
            formula,
            style,
        })
    }
}
