//! JSON document writer

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::JsonResult;
use crate::options::JsonWriteOptions;
use rowforge_model::{Cell, CellValue, Workbook};

/// JSON document writer
pub struct JsonWriter;

impl JsonWriter {
    /// Write a workbook document to a file
    pub fn write_file<P: AsRef<Path>>(
        workbook: &Workbook,
        path: P,
        options: &JsonWriteOptions,
    ) -> JsonResult<()> {
        let file = File::create(path)?;
        Self::write(workbook, file, options)
    }

    /// Write a workbook document to a writer
    pub fn write<W: Write>(
        workbook: &Workbook,
        writer: W,
        options: &JsonWriteOptions,
    ) -> JsonResult<()> {
        let doc = Self::to_value(workbook);
        if options.pretty {
            serde_json::to_writer_pretty(writer, &doc)?;
        } else {
            serde_json::to_writer(writer, &doc)?;
        }
        Ok(())
    }

    /// Build the document value for a workbook
    pub fn to_value(workbook: &Workbook) -> Value {
        let names: Vec<Value> = workbook
            .sheet_names()
            .map(|n| Value::String(n.to_string()))
            .collect();

        let mut sheets = Map::new();
        for sheet in workbook.sheets() {
            let mut body = Map::new();
            if let Some(range) = sheet.range() {
                body.insert("!ref".to_string(), Value::String(range.to_a1()));
            }
            for (key, value) in sheet.meta() {
                body.insert(key.clone(), value.clone());
            }
            for (at, cell) in sheet.cells() {
                body.insert(at.to_a1(), Self::cell_body(cell));
            }
            sheets.insert(sheet.name().to_string(), Value::Object(body));
        }

        let mut root = Map::new();
        root.insert("sheetNames".to_string(), Value::Array(names));
        root.insert("sheets".to_string(), Value::Object(sheets));
        Value::Object(root)
    }

    fn cell_body(cell: &Cell) -> Value {
        let mut body = Map::new();
        let v = match &cell.value {
            CellValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                // Non-finite numbers have no JSON form; degrade to text
                .unwrap_or_else(|| Value::String(n.to_string())),
            CellValue::Text(s) => Value::String(s.clone()),
        };
        body.insert("v".to_string(), v);
        body.insert(
            "t".to_string(),
            Value::String(cell.value.type_tag().to_string()),
        );
        if let Some(formula) = &cell.formula {
            body.insert("f".to_string(), Value::String(formula.clone()));
        }
        if let Some(style) = &cell.style {
            body.insert("s".to_string(), style.clone());
        }
        Value::Object(body)
    }
}
