//! Output filename resolution

use std::path::Path;

use lazy_regex::{regex_is_match, regex_replace_all};

use crate::error::{EngineError, EngineResult};
use crate::rows::{HeaderLookup, MappingTable, RowRecord};

/// Naming configuration: a placeholder pattern and/or prefix + name column
///
/// Prefix+column naming is tried first when fully configured and the row
/// carries the chosen column; the pattern is the other path and is by
/// itself sufficient configuration. The prefix is trimmed before use; the
/// pattern counts as active whenever it is non-empty.
#[derive(Debug, Clone, Default)]
pub struct NamingRule {
    /// Placeholder pattern, e.g. "{Name}_invoice"
    pub pattern: String,
    /// Literal prefix for prefix+column naming
    pub prefix: String,
    /// Record key of the column supplying the per-row name
    pub name_column: Option<String>,
}

impl NamingRule {
    /// A rule using only a placeholder pattern
    pub fn from_pattern<S: Into<String>>(pattern: S) -> Self {
        Self {
            pattern: pattern.into(),
            ..Self::default()
        }
    }

    /// A rule using a prefix and a name column
    pub fn from_prefix<P: Into<String>, C: Into<String>>(prefix: P, column: C) -> Self {
        Self {
            prefix: prefix.into(),
            name_column: Some(column.into()),
            ..Self::default()
        }
    }

    /// Check that one resolution path is fully configured
    ///
    /// Either a non-empty pattern, or a non-empty prefix together with a
    /// chosen name column. The error names what is absent.
    pub fn validate(&self) -> EngineResult<()> {
        if !self.pattern.is_empty() {
            return Ok(());
        }

        let no_column = self.name_column.as_deref().map_or(true, |c| c.is_empty());
        let missing = match (self.prefix.trim().is_empty(), no_column) {
            (false, false) => return Ok(()),
            (true, true) => "a filename pattern, or a prefix and a name column",
            (true, false) => "a filename pattern, or a prefix to go with the name column",
            (false, true) => "a filename pattern, or a name column to go with the prefix",
        };
        Err(EngineError::MissingNamingRule(missing.to_string()))
    }
}

/// The template's original file name, split into stem and extension
///
/// Used for the fallback base name and for extension completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateName {
    /// File name without its extension
    pub stem: String,
    /// Extension including the leading dot
    pub ext: String,
}

impl TemplateName {
    /// Derive from a file path; missing pieces take the defaults
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("output")
            .to_string();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_else(|| ".xlsx".to_string());
        Self { stem, ext }
    }
}

impl Default for TemplateName {
    fn default() -> Self {
        Self {
            stem: "output".to_string(),
            ext: ".xlsx".to_string(),
        }
    }
}

/// Sanitize a string for use in a file name
///
/// Replaces each of `\ / : * ? " < > |` with an underscore, then collapses
/// whitespace runs to a single underscore. No other characters are altered,
/// and applying the rule twice changes nothing.
pub fn sanitize(s: &str) -> String {
    let replaced = regex_replace_all!(r#"[\\/:*?"<>|]"#, s, "_");
    regex_replace_all!(r"\s+", &replaced, "_").into_owned()
}

/// Resolve the output file name for one row
///
/// Resolution order: prefix+column when active and the row has the column;
/// else placeholder substitution over the pattern (exact header match, then
/// case-insensitive via the lookup, unresolved placeholders become empty).
/// Runs of underscores collapse, leading/trailing separators are trimmed,
/// an empty result falls back to `<stem>_row<index+1>`, and the template
/// extension is appended unless the name already ends in one.
pub fn resolve_filename(
    rule: &NamingRule,
    row: &RowRecord,
    lookup: &HeaderLookup,
    index: usize,
    template: &TemplateName,
) -> String {
    let prefix = rule.prefix.trim();
    let mut filled = String::new();

    if !prefix.is_empty() {
        if let Some(column) = rule.name_column.as_deref().filter(|c| !c.is_empty()) {
            if let Some(value) = row.get(column) {
                filled = format!("{}_{}", prefix, sanitize(value));
            }
        }
    }

    if filled.is_empty() && !rule.pattern.is_empty() {
        filled = regex_replace_all!(r"\{([^}]+)\}", &rule.pattern, |_, name: &str| {
            let raw = name.trim();
            row.get(raw)
                .or_else(|| lookup.literal(&raw.to_lowercase()).and_then(|h| row.get(h)))
                .map(sanitize)
                .unwrap_or_default()
        })
        .into_owned();
    }

    let collapsed = regex_replace_all!(r"__+", &filled, "_");
    let trimmed = regex_replace_all!(r"^[_\-.\s]+|[_\-.\s]+$", &collapsed, "");

    let mut name = if trimmed.is_empty() {
        format!("{}_row{}", template.stem, index + 1)
    } else {
        trimmed.into_owned()
    };

    if !regex_is_match!(r"(?i)\.[a-z0-9]+$", &name) {
        name.push_str(&template.ext);
    }
    name
}

/// Resolve every row's file name without generating anything
pub fn preview_filenames(
    rule: &NamingRule,
    table: &MappingTable,
    template: &TemplateName,
) -> Vec<String> {
    table
        .rows()
        .iter()
        .enumerate()
        .map(|(index, row)| resolve_filename(rule, row, table.lookup(), index, template))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rows::parse_mapping_grid;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn table() -> MappingTable {
        let grid: Vec<Vec<String>> = vec![
            vec!["Name".into(), "Amount".into(), "Invoice Nr".into()],
            vec!["Alice".into(), "150".into(), "2024/001".into()],
        ];
        parse_mapping_grid(&grid).unwrap()
    }

    fn resolve(rule: &NamingRule, index: usize) -> String {
        let table = table();
        resolve_filename(
            rule,
            table.row(index).unwrap(),
            table.lookup(),
            index,
            &TemplateName::default(),
        )
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize(r#"a\b/c:d*e?f"g<h>i|j"#), "a_b_c_d_e_f_g_h_i_j");
        assert_eq!(sanitize("two  words\tand more"), "two_words_and_more");
        assert_eq!(sanitize("clean-name.txt"), "clean-name.txt");
    }

    #[test]
    fn test_pattern_substitution() {
        let rule = NamingRule::from_pattern("{Name}_invoice");
        assert_eq!(resolve(&rule, 0), "Alice_invoice.xlsx");
    }

    #[test]
    fn test_pattern_case_insensitive_lookup() {
        let rule = NamingRule::from_pattern("{ name }_{AMOUNT}");
        assert_eq!(resolve(&rule, 0), "Alice_150.xlsx");
    }

    #[test]
    fn test_pattern_unresolved_placeholder_is_empty() {
        let rule = NamingRule::from_pattern("x{Missing}y");
        assert_eq!(resolve(&rule, 0), "xy.xlsx");
    }

    #[test]
    fn test_pattern_values_are_sanitized() {
        let rule = NamingRule::from_pattern("{Invoice Nr}");
        assert_eq!(resolve(&rule, 0), "2024_001.xlsx");
    }

    #[test]
    fn test_prefix_column_wins_over_pattern() {
        let mut rule = NamingRule::from_prefix("inv", "Name");
        rule.pattern = "{Amount}_from_pattern".to_string();
        assert_eq!(resolve(&rule, 0), "inv_Alice.xlsx");
    }

    #[test]
    fn test_prefix_with_missing_column_falls_back_to_pattern() {
        let mut rule = NamingRule::from_prefix("inv", "Missing");
        rule.pattern = "{Name}".to_string();
        assert_eq!(resolve(&rule, 0), "Alice.xlsx");
    }

    #[test]
    fn test_separator_collapse_and_trim() {
        let rule = NamingRule::from_pattern("__{Name}___doc__");
        assert_eq!(resolve(&rule, 0), "Alice_doc.xlsx");
    }

    #[test]
    fn test_empty_result_falls_back_to_row_number() {
        let rule = NamingRule::from_pattern("{Missing}");
        assert_eq!(resolve(&rule, 0), "output_row1.xlsx");

        let template = TemplateName::from_path("invoices.json");
        let table = table();
        let name = resolve_filename(
            &rule,
            table.row(0).unwrap(),
            table.lookup(),
            0,
            &template,
        );
        assert_eq!(name, "invoices_row1.json");
    }

    #[test]
    fn test_existing_extension_not_doubled() {
        let rule = NamingRule::from_pattern("{Name}.json");
        assert_eq!(resolve(&rule, 0), "Alice.json");
    }

    #[test]
    fn test_template_name_from_path() {
        let name = TemplateName::from_path("/tmp/master.xlsx");
        assert_eq!(name.stem, "master");
        assert_eq!(name.ext, ".xlsx");

        let name = TemplateName::from_path("book.json");
        assert_eq!(name.ext, ".json");

        let name = TemplateName::from_path("bare");
        assert_eq!(name.stem, "bare");
        assert_eq!(name.ext, ".xlsx");
    }

    #[test]
    fn test_validate() {
        assert!(NamingRule::from_pattern("{Name}").validate().is_ok());
        assert!(NamingRule::from_prefix("inv", "Name").validate().is_ok());

        assert!(NamingRule::default().validate().is_err());
        // An empty column choice counts as unchosen
        assert!(NamingRule::from_prefix("inv", "").validate().is_err());
        assert!(NamingRule {
            prefix: "inv".into(),
            ..Default::default()
        }
        .validate()
        .is_err());
        assert!(NamingRule {
            name_column: Some("Name".into()),
            ..Default::default()
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_preview_filenames() {
        let grid: Vec<Vec<String>> = vec![
            vec!["Name".into()],
            vec!["Alice".into()],
            vec!["Bob".into()],
        ];
        let table = parse_mapping_grid(&grid).unwrap();
        let rule = NamingRule::from_pattern("{Name}_invoice");

        let names = preview_filenames(&rule, &table, &TemplateName::default());
        assert_eq!(names, vec!["Alice_invoice.xlsx", "Bob_invoice.xlsx"]);
    }

    proptest! {
        #[test]
        fn prop_sanitize_idempotent(s in ".{0,64}") {
            let once = sanitize(&s);
            prop_assert_eq!(sanitize(&once), once);
        }

        #[test]
        fn prop_resolved_name_has_extension(
            pattern in ".{0,24}",
            value in ".{0,24}",
            index in 0usize..500,
        ) {
            let mut row = RowRecord::new();
            row.insert("Name", value);
            let headers = vec!["Name".to_string()];
            let lookup = HeaderLookup::from_headers(&headers);
            let rule = NamingRule::from_pattern(pattern);

            let name = resolve_filename(&rule, &row, &lookup, index, &TemplateName::default());
            prop_assert!(!name.is_empty());
            prop_assert!(regex_is_match!(r"(?i)\.[a-z0-9]+$", &name));
        }
    }
}
