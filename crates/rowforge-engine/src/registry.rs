//! Header-to-target mapping registry

use ahash::AHashMap;
use rowforge_model::{CellRef, Workbook};

use crate::error::{EngineError, EngineResult};

/// A destination for one header's value
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Target {
    /// Destination sheet name
    pub sheet: String,
    /// Destination cell address; empty means "not yet configured"
    pub address: String,
}

impl Target {
    /// Create a target
    pub fn new<S: Into<String>, A: Into<String>>(sheet: S, address: A) -> Self {
        Self {
            sheet: sheet.into(),
            address: address.into(),
        }
    }
}

/// Per-header target lists, keyed by the literal header string
///
/// Duplicate literal headers share one entry. Targets keep insertion order;
/// removing one preserves the order of the survivors.
#[derive(Debug, Clone, Default)]
pub struct TargetRegistry {
    targets: AHashMap<String, Vec<Target>>,
}

impl TargetRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with one empty entry per distinct literal header
    pub fn for_headers(headers: &[String]) -> Self {
        let mut targets = AHashMap::new();
        for header in headers {
            targets.entry(header.clone()).or_insert_with(Vec::new);
        }
        Self { targets }
    }

    /// The targets registered for a header (empty for unknown headers)
    pub fn targets(&self, header: &str) -> &[Target] {
        self.targets.get(header).map(|t| t.as_slice()).unwrap_or(&[])
    }

    /// Append a target to a header's list
    pub fn add_target(&mut self, header: &str, target: Target) -> EngineResult<()> {
        let list = self
            .targets
            .get_mut(header)
            .ok_or_else(|| EngineError::UnknownHeader(header.to_string()))?;
        list.push(target);
        Ok(())
    }

    /// Remove one target from a header's list by index
    pub fn remove_target(&mut self, header: &str, index: usize) -> EngineResult<Target> {
        let list = self
            .targets
            .get_mut(header)
            .ok_or_else(|| EngineError::UnknownHeader(header.to_string()))?;

        if index >= list.len() {
            return Err(EngineError::TargetOutOfBounds(
                header.to_string(),
                index,
                list.len(),
            ));
        }

        Ok(list.remove(index))
    }

    /// Get a target for editing
    pub fn target_mut(&mut self, header: &str, index: usize) -> Option<&mut Target> {
        self.targets.get_mut(header)?.get_mut(index)
    }

    /// Headers with zero configured targets, deduplicated, in given order
    pub fn unmapped_headers(&self, headers: &[String]) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for header in headers {
            if self.targets(header).is_empty() && !out.contains(header) {
                out.push(header.clone());
            }
        }
        out
    }

    /// Validate every configured target against the template
    ///
    /// For each header in order, each target with a non-empty address must
    /// name an existing non-mapping sheet (tolerating surrounding
    /// whitespace) and carry a well-formed cell address. The first violation
    /// is returned. Headers with zero targets are not an error here; see
    /// [`TargetRegistry::unmapped_headers`].
    pub fn validate(
        &self,
        headers: &[String],
        workbook: &Workbook,
        mapping_sheet: &str,
    ) -> EngineResult<()> {
        for header in headers {
            for target in self.targets(header) {
                if target.address.is_empty() {
                    continue;
                }

                let resolved = workbook.sheet_by_name_tolerant(&target.sheet);
                let sheet_ok = match resolved {
                    Some(sheet) => sheet.name().trim() != mapping_sheet.trim(),
                    None => false,
                };
                if !sheet_ok {
                    return Err(EngineError::InvalidTargetSheet {
                        header: header.clone(),
                        sheet: target.sheet.clone(),
                    });
                }

                if !CellRef::is_valid(&target.address) {
                    return Err(EngineError::InvalidTargetAddress {
                        header: header.clone(),
                        address: target.address.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// The default sheet for a newly added target
///
/// The first sheet that is not the mapping sheet, else the first sheet.
pub fn default_target_sheet<'a>(workbook: &'a Workbook, mapping_sheet: &str) -> Option<&'a str> {
    workbook
        .sheet_names()
        .find(|name| *name != mapping_sheet)
        .or_else(|| workbook.sheet_names().next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn template() -> Workbook {
        let mut wb = Workbook::new();
        wb.add_sheet("Data").unwrap();
        wb.add_sheet("Invoice").unwrap();
        wb
    }

    #[test]
    fn test_add_and_remove() {
        let hs = headers(&["Name", "Amount"]);
        let mut reg = TargetRegistry::for_headers(&hs);

        reg.add_target("Amount", Target::new("Invoice", "B2")).unwrap();
        reg.add_target("Amount", Target::new("Invoice", "C5")).unwrap();
        assert_eq!(reg.targets("Amount").len(), 2);

        let removed = reg.remove_target("Amount", 0).unwrap();
        assert_eq!(removed.address, "B2");
        // Survivor order preserved
        assert_eq!(reg.targets("Amount")[0].address, "C5");

        assert!(matches!(
            reg.add_target("Missing", Target::default()),
            Err(EngineError::UnknownHeader(_))
        ));
        assert!(matches!(
            reg.remove_target("Amount", 7),
            Err(EngineError::TargetOutOfBounds(_, 7, 1))
        ));
    }

    #[test]
    fn test_target_mut() {
        let hs = headers(&["Name"]);
        let mut reg = TargetRegistry::for_headers(&hs);
        reg.add_target("Name", Target::new("Invoice", "")).unwrap();

        reg.target_mut("Name", 0).unwrap().address = "A1".to_string();
        assert_eq!(reg.targets("Name")[0].address, "A1");
        assert!(reg.target_mut("Name", 1).is_none());
    }

    #[test]
    fn test_unmapped_headers() {
        let hs = headers(&["Name", "Amount", "Name", "City"]);
        let mut reg = TargetRegistry::for_headers(&hs);
        reg.add_target("Amount", Target::new("Invoice", "B2")).unwrap();

        // Deduplicated, in header order
        assert_eq!(reg.unmapped_headers(&hs), vec!["Name", "City"]);
    }

    #[test]
    fn test_validate_ok() {
        let hs = headers(&["Name", "Amount"]);
        let mut reg = TargetRegistry::for_headers(&hs);
        reg.add_target("Amount", Target::new("Invoice", "B2")).unwrap();
        // Empty addresses are "not yet configured" and skipped
        reg.add_target("Name", Target::new("Invoice", "")).unwrap();

        assert!(reg.validate(&hs, &template(), "Data").is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_sheet() {
        let hs = headers(&["Amount"]);
        let mut reg = TargetRegistry::for_headers(&hs);
        reg.add_target("Amount", Target::new("Receipt", "B2")).unwrap();

        assert!(matches!(
            reg.validate(&hs, &template(), "Data"),
            Err(EngineError::InvalidTargetSheet { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_mapping_sheet() {
        let hs = headers(&["Amount"]);
        let mut reg = TargetRegistry::for_headers(&hs);
        reg.add_target("Amount", Target::new("Data", "B2")).unwrap();

        assert!(matches!(
            reg.validate(&hs, &template(), "Data"),
            Err(EngineError::InvalidTargetSheet { .. })
        ));
    }

    #[test]
    fn test_validate_tolerates_trimmed_sheet_names() {
        let hs = headers(&["Amount"]);
        let mut reg = TargetRegistry::for_headers(&hs);
        reg.add_target("Amount", Target::new("Invoice ", "B2")).unwrap();

        assert!(reg.validate(&hs, &template(), "Data").is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_address() {
        let hs = headers(&["Amount"]);
        let mut reg = TargetRegistry::for_headers(&hs);
        reg.add_target("Amount", Target::new("Invoice", "B0")).unwrap();

        let err = reg.validate(&hs, &template(), "Data").unwrap_err();
        match err {
            EngineError::InvalidTargetAddress { header, address } => {
                assert_eq!(header, "Amount");
                assert_eq!(address, "B0");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_default_target_sheet() {
        let wb = template();
        assert_eq!(default_target_sheet(&wb, "Data"), Some("Invoice"));
        assert_eq!(default_target_sheet(&wb, "Missing"), Some("Data"));

        let mut only_mapping = Workbook::new();
        only_mapping.add_sheet("Data").unwrap();
        assert_eq!(default_target_sheet(&only_mapping, "Data"), Some("Data"));
        assert_eq!(default_target_sheet(&Workbook::new(), "Data"), None);
    }
}
