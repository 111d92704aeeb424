//! File-system host for the extraction workflows
//!
//! The engine only sees text and offsets. Everything that touches the
//! document on disk goes through [`EditorHost`] so the workflows can run
//! against an in-memory host in tests.

use carve_config::{AppConfig, ExtractConfig};
use carve_foundation::{CarveError, CarveResult, EditPlan, SourceText, ValidationType};
use carve_lang_jsx::{
    language_id_for_path, normalize_component_name, parse_document, plan_extract_component,
    plan_extract_to_file, ComponentTemplate, ExtractSettings, Selection,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

/// Operations the workflows need from the editor hosting the document
pub trait EditorHost {
    /// Full text of the active document
    fn document_text(&self) -> CarveResult<String>;

    /// Path of the active document
    fn document_path(&self) -> &Path;

    /// Editor language identifier of the active document
    fn language_id(&self) -> Option<&'static str> {
        language_id_for_path(self.document_path())
    }

    fn file_exists(&self, path: &Path) -> bool;

    fn create_file(&mut self, path: &Path, contents: &str) -> CarveResult<()>;

    /// Replace the text of the active document
    fn write_document(&mut self, text: &str) -> CarveResult<()>;

    /// Run the host's formatter over `path`
    fn format(&mut self, path: &Path) -> CarveResult<()>;

    /// Apply a plan: create its files, then rewrite the document
    ///
    /// All validations run and the edited document is computed before
    /// anything is written, so a failing plan leaves every file untouched.
    fn apply_plan(&mut self, plan: &EditPlan) -> CarveResult<()> {
        for rule in &plan.validations {
            if rule.rule_type != ValidationType::FileAbsent {
                continue;
            }
            if let Some(path) = rule.parameters.get("path").and_then(|p| p.as_str()) {
                if self.file_exists(Path::new(path)) {
                    return Err(CarveError::invalid_input(format!("{} exists", path)));
                }
            }
        }

        let edited = plan.apply_to_source(&self.document_text()?)?;
        if plan
            .validations
            .iter()
            .any(|rule| rule.rule_type == ValidationType::SyntaxCheck)
        {
            parse_document(&edited)?;
        }

        for (path, contents) in plan.created_files() {
            self.create_file(Path::new(path), contents)?;
        }
        self.write_document(&edited)
    }
}

/// Host over a document on the local file system
pub struct FileHost {
    path: PathBuf,
    format_command: Option<Vec<String>>,
}

impl FileHost {
    pub fn new(path: impl Into<PathBuf>, format_command: Option<Vec<String>>) -> Self {
        Self {
            path: path.into(),
            format_command,
        }
    }
}

impl EditorHost for FileHost {
    fn document_text(&self) -> CarveResult<String> {
        Ok(fs::read_to_string(&self.path)?)
    }

    fn document_path(&self) -> &Path {
        &self.path
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_file(&mut self, path: &Path, contents: &str) -> CarveResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;
        debug!(path = %path.display(), "Created file");
        Ok(())
    }

    fn write_document(&mut self, text: &str) -> CarveResult<()> {
        fs::write(&self.path, text)?;
        Ok(())
    }

    fn format(&mut self, path: &Path) -> CarveResult<()> {
        let Some((program, args)) = self
            .format_command
            .as_ref()
            .and_then(|command| command.split_first())
        else {
            return Ok(());
        };

        let status = Command::new(program).args(args).arg(path).status()?;
        if !status.success() {
            // The edits are already written
            warn!(
                command = %program,
                path = %path.display(),
                status = ?status.code(),
                "Format command failed"
            );
        }
        Ok(())
    }
}

/// How the user pointed at the markup to extract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSpec {
    /// 1-based `line:column` pairs, end exclusive
    Range {
        start: (u32, u32),
        end: (u32, u32),
    },
    /// Character offsets
    Offsets { start: usize, end: usize },
}

impl SelectionSpec {
    /// Character offsets of the selection in `text`
    pub fn resolve(&self, text: &str) -> CarveResult<Selection> {
        let selection = match *self {
            SelectionSpec::Offsets { start, end } => Selection::new(start, end),
            SelectionSpec::Range { start, end } => {
                let source = SourceText::new(text);
                let offset = |(line, column): (u32, u32)| {
                    if line == 0 || column == 0 {
                        return Err(CarveError::invalid_input(
                            "Lines and columns start at 1",
                        ));
                    }
                    source.offset_at(line - 1, column - 1)
                };
                Selection::new(offset(start)?, offset(end)?)
            }
        };

        if selection.start >= selection.end {
            return Err(CarveError::invalid_input("Selection is empty"));
        }
        Ok(selection)
    }
}

/// Engine settings from the `[extract]` configuration section
pub fn settings_from_config(config: &ExtractConfig) -> ExtractSettings {
    ExtractSettings {
        template: ComponentTemplate {
            base_component: config.base_component.clone(),
            props_name: config.props_name.clone(),
            ..ComponentTemplate::default()
        }
        .with_indent_width(config.indent_width),
        react_import: config.react_import.clone(),
    }
}

/// One extraction as requested by the user
#[derive(Debug, Clone)]
pub struct ExtractRequest {
    pub selection: SelectionSpec,
    /// Name as typed; normalized before use
    pub name: String,
    pub dry_run: bool,
}

fn prepare(host: &impl EditorHost, request: &ExtractRequest) -> CarveResult<(String, Selection, String)> {
    let text = host.document_text()?;
    let selection = request.selection.resolve(&text)?;
    let name = normalize_component_name(&request.name)?;
    Ok((text, selection, name))
}

/// Replace the selection with a new function component in the same file
pub fn extract_to_function(
    host: &mut impl EditorHost,
    request: &ExtractRequest,
    config: &AppConfig,
) -> CarveResult<EditPlan> {
    let (text, selection, name) = prepare(host, request)?;
    let document = host.document_path().to_string_lossy().into_owned();

    let plan = plan_extract_component(
        &text,
        selection,
        &name,
        &document,
        &settings_from_config(&config.extract),
    )?;

    if !request.dry_run {
        host.apply_plan(&plan)?;
        let path = host.document_path().to_path_buf();
        host.format(&path)?;
        info!(document = %document, component = %name, "Extracted component");
    }
    Ok(plan)
}

/// Move the selection into a class component in a sibling file and import it
pub fn extract_to_file(
    host: &mut impl EditorHost,
    request: &ExtractRequest,
    config: &AppConfig,
) -> CarveResult<EditPlan> {
    let language_id = host.language_id().ok_or_else(|| {
        CarveError::invalid_input(format!(
            "Cannot tell the language of {}",
            host.document_path().display()
        ))
    })?;
    let (text, selection, name) = prepare(host, request)?;
    let document = host.document_path().to_string_lossy().into_owned();

    let plan = plan_extract_to_file(
        &text,
        selection,
        &name,
        &document,
        language_id,
        &settings_from_config(&config.extract),
    )?;

    let created: Vec<PathBuf> = plan
        .created_files()
        .map(|(path, _)| PathBuf::from(path))
        .collect();
    if let Some(existing) = created.iter().find(|path| host.file_exists(path)) {
        return Err(CarveError::invalid_input(format!(
            "{} exists",
            existing.display()
        )));
    }

    if !request.dry_run {
        host.apply_plan(&plan)?;
        for path in &created {
            host.format(path)?;
        }
        let path = host.document_path().to_path_buf();
        host.format(&path)?;
        info!(document = %document, component = %name, "Extracted component to file");
    }
    Ok(plan)
}
