//! Per-row workbook instantiation

use log::warn;
use rowforge_model::{CellRef, CellValue, Workbook};

use crate::registry::TargetRegistry;
use crate::rows::RowRecord;

/// How empty row values treat destination cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// An empty value leaves the destination entirely untouched
    #[default]
    Conditional,
    /// An empty value is written, clearing the destination
    Overwrite,
}

/// Coerce raw row text into a cell value
///
/// Text whose trimmed form parses as a finite number becomes a numeric
/// cell; everything else stays text, keeping the raw content.
pub fn coerce(value: &str) -> CellValue {
    let trimmed = value.trim();
    if !trimmed.is_empty() {
        if let Ok(n) = trimmed.parse::<f64>() {
            if n.is_finite() {
                return CellValue::Number(n);
            }
        }
    }
    CellValue::Text(value.to_string())
}

/// Build one output workbook for one row
///
/// Deep-copies the template, removes the mapping sheet, then writes each
/// header's row value into its registered targets on every remaining sheet.
/// Target sheet names match raw or trimmed; targets with empty or malformed
/// addresses are skipped with a warning, never failing the row. Writes clear
/// any formula on the destination and leave style metadata alone. Each
/// sheet's populated range is recomputed after its writes.
///
/// No I/O happens here; the caller serializes and delivers the result.
pub fn instantiate_row(
    template: &Workbook,
    mapping_sheet: &str,
    headers: &[String],
    registry: &TargetRegistry,
    row: &RowRecord,
    mode: WriteMode,
) -> Workbook {
    let mut output = template.clone();
    output.remove_sheet_by_name(mapping_sheet);

    for sheet in output.sheets_mut() {
        let sheet_name = sheet.name().to_string();

        for header in headers {
            let value = row.get(header).unwrap_or("");
            if mode == WriteMode::Conditional && value.is_empty() {
                continue;
            }

            for target in registry.targets(header) {
                let target_sheet = target.sheet.trim();
                if target_sheet != sheet_name && target_sheet != sheet_name.trim() {
                    continue;
                }

                let address = target.address.trim();
                if address.is_empty() {
                    warn!(
                        "Skipping target with empty address (header '{}', sheet '{}')",
                        header, target.sheet
                    );
                    continue;
                }

                match CellRef::parse(address) {
                    Ok(at) => sheet.write_value(at, coerce(value)),
                    Err(_) => {
                        warn!(
                            "Skipping target with invalid address '{}' (header '{}')",
                            target.address, header
                        );
                    }
                }
            }
        }

        sheet.recompute_range();
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Target;
    use crate::rows::parse_mapping_grid;
    use pretty_assertions::assert_eq;
    use rowforge_model::Cell;

    fn template() -> Workbook {
        let mut wb = Workbook::new();
        let data = wb.add_sheet("Data").unwrap();
        data.set_value("A1", "Name").unwrap();
        data.set_value("B1", "Amount").unwrap();

        let invoice = wb.add_sheet("Invoice").unwrap();
        invoice.set_value("A1", "Total:").unwrap();
        invoice.insert_cell(
            CellRef::parse("B2").unwrap(),
            Cell::new(0.0)
                .with_formula("=SUM(B3:B9)")
                .with_style(serde_json::json!({"numFmt": "0.00"})),
        );
        wb
    }

    fn setup(rows: &[&[&str]]) -> (Workbook, Vec<String>, TargetRegistry, Vec<RowRecord>) {
        let grid: Vec<Vec<String>> = rows
            .iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect();
        let table = parse_mapping_grid(&grid).unwrap();
        let registry = TargetRegistry::for_headers(table.headers());
        (
            template(),
            table.headers().to_vec(),
            registry,
            table.rows().to_vec(),
        )
    }

    #[test]
    fn test_mapping_sheet_removed() {
        let (wb, headers, registry, rows) = setup(&[&["Name"], &["Alice"]]);
        let out = instantiate_row(&wb, "Data", &headers, &registry, &rows[0], WriteMode::Conditional);

        assert_eq!(out.sheet_names().collect::<Vec<_>>(), vec!["Invoice"]);
        // The template itself is untouched
        assert_eq!(wb.sheet_count(), 2);
    }

    #[test]
    fn test_numeric_coercion_and_formula_clearing() {
        let (wb, headers, mut registry, rows) =
            setup(&[&["Name", "Amount"], &["Alice", "150"]]);
        registry
            .add_target("Amount", Target::new("Invoice", "B2"))
            .unwrap();

        let out = instantiate_row(&wb, "Data", &headers, &registry, &rows[0], WriteMode::Conditional);
        let cell = out
            .sheet_by_name("Invoice")
            .unwrap()
            .cell("B2")
            .unwrap()
            .unwrap();

        assert_eq!(cell.value, CellValue::Number(150.0));
        assert_eq!(cell.formula, None);
        // Style metadata survives the write
        assert_eq!(cell.style, Some(serde_json::json!({"numFmt": "0.00"})));
    }

    #[test]
    fn test_text_written_raw() {
        let (wb, headers, mut registry, rows) =
            setup(&[&["Name", "Amount"], &[" Alice ", "pending"]]);
        registry
            .add_target("Name", Target::new("Invoice", "C1"))
            .unwrap();
        registry
            .add_target("Amount", Target::new("Invoice", "C2"))
            .unwrap();

        let out = instantiate_row(&wb, "Data", &headers, &registry, &rows[0], WriteMode::Conditional);
        let invoice = out.sheet_by_name("Invoice").unwrap();

        assert_eq!(
            invoice.value("C1").unwrap(),
            Some(&CellValue::text(" Alice "))
        );
        assert_eq!(
            invoice.value("C2").unwrap(),
            Some(&CellValue::text("pending"))
        );
    }

    #[test]
    fn test_conditional_skips_empty() {
        let (wb, headers, mut registry, rows) =
            setup(&[&["Name", "Amount"], &["Alice", ""]]);
        registry
            .add_target("Amount", Target::new("Invoice", "B2"))
            .unwrap();

        let out = instantiate_row(&wb, "Data", &headers, &registry, &rows[0], WriteMode::Conditional);
        let cell = out
            .sheet_by_name("Invoice")
            .unwrap()
            .cell("B2")
            .unwrap()
            .unwrap();

        // Untouched: formula and value as in the template
        assert_eq!(cell.value, CellValue::Number(0.0));
        assert_eq!(cell.formula.as_deref(), Some("=SUM(B3:B9)"));
    }

    #[test]
    fn test_overwrite_clears_with_empty() {
        let (wb, headers, mut registry, rows) =
            setup(&[&["Name", "Amount"], &["Alice", ""]]);
        registry
            .add_target("Amount", Target::new("Invoice", "B2"))
            .unwrap();

        let out = instantiate_row(&wb, "Data", &headers, &registry, &rows[0], WriteMode::Overwrite);
        let cell = out
            .sheet_by_name("Invoice")
            .unwrap()
            .cell("B2")
            .unwrap()
            .unwrap();

        assert_eq!(cell.value, CellValue::text(""));
        assert_eq!(cell.formula, None);
        assert!(cell.style.is_some());
    }

    #[test]
    fn test_invalid_address_skipped_others_applied() {
        let (wb, headers, mut registry, rows) =
            setup(&[&["Name", "Amount"], &["Alice", "150"]]);
        registry
            .add_target("Amount", Target::new("Invoice", "B0"))
            .unwrap();
        registry
            .add_target("Amount", Target::new("Invoice", "C5"))
            .unwrap();
        registry
            .add_target("Name", Target::new("Invoice", ""))
            .unwrap();

        let out = instantiate_row(&wb, "Data", &headers, &registry, &rows[0], WriteMode::Conditional);
        let invoice = out.sheet_by_name("Invoice").unwrap();

        assert_eq!(invoice.value("C5").unwrap(), Some(&CellValue::Number(150.0)));
        // Nothing landed anywhere else for the bad targets
        assert_eq!(invoice.cell_count(), 3); // A1, B2 from template, C5 written
    }

    #[test]
    fn test_tolerant_sheet_match() {
        let (wb, headers, mut registry, rows) = setup(&[&["Name"], &["Alice"]]);
        registry
            .add_target("Name", Target::new(" Invoice ", "D1"))
            .unwrap();

        let out = instantiate_row(&wb, "Data", &headers, &registry, &rows[0], WriteMode::Conditional);
        assert_eq!(
            out.sheet_by_name("Invoice").unwrap().value("D1").unwrap(),
            Some(&CellValue::text("Alice"))
        );
    }

    #[test]
    fn test_range_recomputed() {
        let (wb, headers, mut registry, rows) =
            setup(&[&["Name", "Amount"], &["Alice", "150"]]);
        registry
            .add_target("Amount", Target::new("Invoice", "E9"))
            .unwrap();

        let out = instantiate_row(&wb, "Data", &headers, &registry, &rows[0], WriteMode::Conditional);
        let range = out.sheet_by_name("Invoice").unwrap().range().unwrap();
        assert_eq!(range.to_a1(), "A1:E9");
    }

    #[test]
    fn test_case_and_dollar_in_address() {
        let (wb, headers, mut registry, rows) = setup(&[&["Name"], &["Alice"]]);
        registry
            .add_target("Name", Target::new("Invoice", "$d$3"))
            .unwrap();

        let out = instantiate_row(&wb, "Data", &headers, &registry, &rows[0], WriteMode::Conditional);
        assert_eq!(
            out.sheet_by_name("Invoice").unwrap().value("D3").unwrap(),
            Some(&CellValue::text("Alice"))
        );
    }

    #[test]
    fn test_coerce() {
        assert_eq!(coerce("150"), CellValue::Number(150.0));
        assert_eq!(coerce(" 150 "), CellValue::Number(150.0));
        assert_eq!(coerce("-2.5"), CellValue::Number(-2.5));
        assert_eq!(coerce("1e3"), CellValue::Number(1000.0));
        assert_eq!(coerce("abc"), CellValue::text("abc"));
        assert_eq!(coerce(""), CellValue::text(""));
        assert_eq!(coerce("  "), CellValue::text("  "));
        assert_eq!(coerce("inf"), CellValue::text("inf"));
        assert_eq!(coerce("NaN"), CellValue::text("NaN"));
        assert_eq!(coerce("12abc"), CellValue::text("12abc"));
    }
}
