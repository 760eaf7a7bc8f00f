//! Session state for a loaded template

use std::path::{Path, PathBuf};

use rowforge_model::Workbook;

use crate::error::{EngineError, EngineResult};
use crate::naming::{self, NamingRule, TemplateName};
use crate::registry::{default_target_sheet, Target, TargetRegistry};
use crate::rows::{grid_from_sheet, parse_mapping_grid, MappingTable};

/// Mapping state derived from one chosen sheet
///
/// Loading a mapping sheet replaces this wholesale; header targets never
/// survive a reload.
#[derive(Debug, Clone)]
pub struct MappingState {
    sheet_name: String,
    table: MappingTable,
    registry: TargetRegistry,
}

impl MappingState {
    /// Canonical name of the sheet the mapping was parsed from
    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    pub fn table(&self) -> &MappingTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut MappingTable {
        &mut self.table
    }

    pub fn registry(&self) -> &TargetRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut TargetRegistry {
        &mut self.registry
    }
}

/// Everything configured around one loaded template
///
/// The session owns the template workbook, the naming inputs, the chosen
/// output directory, and any mapping state parsed from it. All operations
/// take the session explicitly; nothing lives in ambient globals.
#[derive(Debug, Clone)]
pub struct Session {
    template: Workbook,
    template_name: TemplateName,
    template_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    naming: NamingRule,
    mapping: Option<MappingState>,
}

impl Session {
    /// Start a session from an already loaded template
    pub fn new(template: Workbook) -> Session {
        Session {
            template,
            template_name: TemplateName::default(),
            template_path: None,
            output_dir: None,
            naming: NamingRule::default(),
            mapping: None,
        }
    }

    /// Start a session from a template loaded from `path`
    ///
    /// The path seeds the output naming (base name and extension) and
    /// enables the save-beside-template sink.
    pub fn with_source<P: AsRef<Path>>(template: Workbook, path: P) -> Session {
        let path = path.as_ref();
        Session {
            template,
            template_name: TemplateName::from_path(path),
            template_path: Some(path.to_path_buf()),
            output_dir: None,
            naming: NamingRule::default(),
            mapping: None,
        }
    }

    pub fn template(&self) -> &Workbook {
        &self.template
    }

    pub fn template_name(&self) -> &TemplateName {
        &self.template_name
    }

    pub fn template_path(&self) -> Option<&Path> {
        self.template_path.as_deref()
    }

    /// Replace the template, discarding all mapping state
    ///
    /// Naming inputs and the chosen output directory survive the reload.
    pub fn reset(&mut self, template: Workbook, path: Option<&Path>) {
        self.template = template;
        self.template_name = path.map(TemplateName::from_path).unwrap_or_default();
        self.template_path = path.map(Path::to_path_buf);
        self.mapping = None;
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    pub fn set_output_dir<P: Into<PathBuf>>(&mut self, dir: P) {
        self.output_dir = Some(dir.into());
    }

    pub fn clear_output_dir(&mut self) {
        self.output_dir = None;
    }

    pub fn naming(&self) -> &NamingRule {
        &self.naming
    }

    pub fn naming_mut(&mut self) -> &mut NamingRule {
        &mut self.naming
    }

    pub fn set_naming(&mut self, rule: NamingRule) {
        self.naming = rule;
    }

    /// Parse `sheet_name` as the mapping sheet
    ///
    /// The sheet is looked up tolerantly (exact name first, then trimmed)
    /// and its canonical name is recorded. Any previously loaded mapping,
    /// including its header targets, is replaced.
    pub fn load_mapping(&mut self, sheet_name: &str) -> EngineResult<()> {
        let sheet = self
            .template
            .sheet_by_name_tolerant(sheet_name)
            .ok_or_else(|| EngineError::MappingSheetNotFound(sheet_name.to_string()))?;
        let canonical = sheet.name().to_string();
        let grid = grid_from_sheet(sheet);
        let table = parse_mapping_grid(&grid)?;
        let registry = TargetRegistry::for_headers(table.headers());
        self.mapping = Some(MappingState {
            sheet_name: canonical,
            table,
            registry,
        });
        Ok(())
    }

    pub fn mapping(&self) -> Option<&MappingState> {
        self.mapping.as_ref()
    }

    pub fn mapping_mut(&mut self) -> Option<&mut MappingState> {
        self.mapping.as_mut()
    }

    /// Append a target for `header` with an explicit destination
    pub fn add_target(&mut self, header: &str, target: Target) -> EngineResult<()> {
        let mapping = self.mapping.as_mut().ok_or(EngineError::MappingNotLoaded)?;
        mapping.registry.add_target(header, target)
    }

    /// Append a blank target for `header`, defaulting the sheet
    ///
    /// The default is the first template sheet that is not the mapping
    /// sheet, falling back to the first sheet. The address starts empty.
    pub fn add_default_target(&mut self, header: &str) -> EngineResult<()> {
        let mapping = self.mapping.as_mut().ok_or(EngineError::MappingNotLoaded)?;
        let sheet = default_target_sheet(&self.template, &mapping.sheet_name).unwrap_or_default();
        let target = Target::new(sheet, "");
        mapping.registry.add_target(header, target)
    }

    /// Remove one target of `header` by position
    pub fn remove_target(&mut self, header: &str, index: usize) -> EngineResult<Target> {
        let mapping = self.mapping.as_mut().ok_or(EngineError::MappingNotLoaded)?;
        mapping.registry.remove_target(header, index)
    }

    /// Overwrite one cell value of a parsed row
    pub fn set_row_value(&mut self, row: usize, key: &str, value: &str) -> EngineResult<()> {
        let mapping = self.mapping.as_mut().ok_or(EngineError::MappingNotLoaded)?;
        mapping.table.set_row_value(row, key, value)
    }

    /// Resolve the output filename of every row without generating
    pub fn preview_filenames(&self) -> EngineResult<Vec<String>> {
        let mapping = self.mapping.as_ref().ok_or(EngineError::MappingNotLoaded)?;
        if mapping.table.row_count() == 0 {
            return Err(EngineError::NoRows);
        }
        self.naming.validate()?;
        Ok(naming::preview_filenames(
            &self.naming,
            &mapping.table,
            &self.template_name,
        ))
    }
}
