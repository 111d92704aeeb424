//! Extract-to-component refactoring
//!
//! [`extract`] is the pure entry point: text and character offsets in, the
//! replacement element, the new component and its insertion offset out.
//! The `plan_*` functions wrap it into [`EditPlan`]s a host can apply.

use crate::ast::{classify_selection, parse_document, ByteRange, ParsedDocument, SelectionShape};
use crate::ast::{FRAGMENT_CLOSE, FRAGMENT_OPEN};
use crate::imports::{has_react_import, import_statement};
use crate::props::synthesize;
use crate::references::{find_component_member_references, find_owning_component};
use crate::syntax_index::{NodeId, NodeKind, SyntaxIndex};
use crate::transform::{
    generate_class_component, generate_function_component, render_replacement, rewrite_markup,
    ComponentStyle, ComponentTemplate,
};
use carve_foundation::{
    CarveError, CarveResult, EditLocation, EditPlan, EditPlanBuilder, EditType, SourceText,
    TextEdit,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;
use tracing::{debug, info};

/// Outcome of one extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefactorResult {
    /// Element that takes the place of the selection
    pub replacement_text: String,
    /// Source of the new component
    pub new_component_text: String,
    /// Character offset in the original text where the component goes
    pub insert_offset: usize,
}

/// Half-open character range of the selected text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Settings applied to every generated component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractSettings {
    pub template: ComponentTemplate,
    /// Statement prepended to a new component file that lacks a React import
    pub react_import: String,
}

impl Default for ExtractSettings {
    fn default() -> Self {
        Self {
            template: ComponentTemplate::default(),
            react_import: r#"import React from "react";"#.to_string(),
        }
    }
}

/// Extract the markup between `start` and `end` into a component called `name`
///
/// Function form is produced unless `as_new_file` is set, in which case the
/// exported class form is produced.
pub fn extract(
    name: &str,
    source: &str,
    start: usize,
    end: usize,
    as_new_file: bool,
) -> CarveResult<RefactorResult> {
    let style = if as_new_file {
        ComponentStyle::Class
    } else {
        ComponentStyle::Function
    };
    extract_with(
        name,
        source,
        Selection::new(start, end),
        style,
        &ComponentTemplate::default(),
    )
}

/// [`extract`] with an explicit component style and template
pub fn extract_with(
    name: &str,
    source: &str,
    selection: Selection,
    style: ComponentStyle,
    template: &ComponentTemplate,
) -> CarveResult<RefactorResult> {
    let text = SourceText::new(source);
    let selected = text.slice(selection.start, selection.end)?;

    let shape = classify_selection(selected);
    if shape == SelectionShape::NotMarkup {
        return Err(CarveError::invalid_selection(
            "Selection is not a JSX element or fragment",
        ));
    }

    let byte_start = text.byte_offset(selection.start)?;
    let mut byte_end = text.byte_offset(selection.end)?;

    // Adjacent siblings only parse once wrapped; the wrapper becomes the selected node
    let code = match shape {
        SelectionShape::Siblings => {
            let wrapped = format!("{}{}{}", FRAGMENT_OPEN, selected, FRAGMENT_CLOSE);
            byte_end = byte_start + wrapped.len();
            let tail = text.byte_offset(selection.end)?;
            format!("{}{}{}", &source[..byte_start], wrapped, &source[tail..])
        }
        _ => source.to_string(),
    };
    debug!(?shape, wrapped = code.len() != source.len(), "Classified selection");

    let document = parse_document(&code)?;
    let index = SyntaxIndex::build(&document.module, document.start_pos());
    let range = ByteRange::new(byte_start, byte_end);

    let target = index
        .nodes_within(range)
        .find(|id| {
            matches!(
                index.kind(*id),
                NodeKind::MarkupElement | NodeKind::MarkupFragment
            )
        })
        .ok_or_else(|| CarveError::invalid_selection("No JSX element found inside the selection"))?;
    let (component, kind) = find_owning_component(&index, target).ok_or_else(|| {
        CarveError::invalid_component("Selected JSX is not inside a class, function or arrow function component")
    })?;

    let sites = find_component_member_references(&index, component, kind, target, range);
    let synthesis = synthesize(&document, &index, target, &sites)?;

    let body = rewrite_markup(&document, index.range(target), &synthesis, template, style)?;
    let new_component_text = match style {
        ComponentStyle::Function => generate_function_component(name, &body, template),
        ComponentStyle::Class => generate_class_component(name, &body, template),
    };
    let replacement_text = render_replacement(name, &synthesis.props, |expr| document.print(expr))?;

    // The component precedes the selection, so its offset is the same in the unwrapped text
    let insert_offset = text.char_offset(insertion_point(&document, &index, component))?;

    debug!(
        component = %name,
        props = synthesis.props.len(),
        insert_offset,
        "Extracted component"
    );

    Ok(RefactorResult {
        replacement_text,
        new_component_text,
        insert_offset,
    })
}

/// Byte offset in front of the statement declaring `component`, including its leading comments
fn insertion_point(document: &ParsedDocument, index: &SyntaxIndex, component: NodeId) -> usize {
    let mut statement = component;
    while let Some(parent) = index.parent(statement) {
        match index.kind(parent) {
            NodeKind::DeclarationStatement => statement = parent,
            _ => break,
        }
    }

    let span = index.node(statement).span;
    document
        .leading_comment_start(span.lo)
        .map_or_else(|| document.range_of(span).start, |comment| comment.start)
}

/// Plan that replaces the selection and inserts a function component in front of its owner
pub fn plan_extract_component(
    source: &str,
    selection: Selection,
    name: &str,
    file_path: &str,
    settings: &ExtractSettings,
) -> CarveResult<EditPlan> {
    let result = extract_with(
        name,
        source,
        selection,
        ComponentStyle::Function,
        &settings.template,
    )?;
    let text = SourceText::new(source);

    let edits = vec![
        replacement_edit(&text, selection, &result)?,
        TextEdit {
            file_path: None,
            edit_type: EditType::Insert,
            location: EditLocation::point(&text, result.insert_offset),
            original_text: String::new(),
            new_text: format!("{}\n\n", result.new_component_text),
            priority: 100,
            description: format!("Insert component '{}'", name),
        },
    ];
    let edit_count = edits.len();

    let plan = EditPlanBuilder::new(file_path, "extract_component")
        .with_edits(edits)
        .with_syntax_validation("Verify JSX syntax after extraction")
        .with_intent_args(json!({
            "name": name,
            "start": selection.start,
            "end": selection.end,
        }))
        .with_complexity_from_count(edit_count)
        .with_impact_area("components")
        .build();

    info!(file_path, component = %name, "Planned component extraction");
    Ok(plan)
}

/// Plan that moves the selection into a class component in a sibling file
pub fn plan_extract_to_file(
    source: &str,
    selection: Selection,
    name: &str,
    file_path: &str,
    language_id: &str,
    settings: &ExtractSettings,
) -> CarveResult<EditPlan> {
    let extension = extension_for_language(language_id).ok_or_else(|| {
        CarveError::invalid_input(format!("No file extension known for language '{}'", language_id))
    })?;
    let directory = Path::new(file_path).parent().unwrap_or_else(|| Path::new(""));
    let new_file = directory
        .join(format!("{}{}", name, extension))
        .to_string_lossy()
        .into_owned();

    let result = extract_with(
        name,
        source,
        selection,
        ComponentStyle::Class,
        &settings.template,
    )?;
    let text = SourceText::new(source);

    let generated = parse_document(&result.new_component_text)?;
    let contents = if has_react_import(&generated) {
        result.new_component_text.clone()
    } else {
        format!("{}\n{}", settings.react_import, result.new_component_text)
    };

    let edits = vec![
        TextEdit {
            file_path: Some(new_file.clone()),
            edit_type: EditType::Create,
            location: EditLocation::point(&SourceText::new(""), 0),
            original_text: String::new(),
            new_text: contents,
            priority: 100,
            description: format!("Create '{}' for component '{}'", new_file, name),
        },
        replacement_edit(&text, selection, &result)?,
        TextEdit {
            file_path: None,
            edit_type: EditType::AddImport,
            location: EditLocation::point(&text, 0),
            original_text: String::new(),
            new_text: import_statement(name),
            priority: 80,
            description: format!("Import '{}'", name),
        },
    ];
    let edit_count = edits.len();

    let plan = EditPlanBuilder::new(file_path, "extract_component_to_file")
        .with_edits(edits)
        .with_syntax_validation("Verify JSX syntax after extraction")
        .with_file_absent_validation(new_file.clone())
        .with_intent_args(json!({
            "name": name,
            "start": selection.start,
            "end": selection.end,
            "newFile": new_file,
        }))
        .with_complexity_from_count(edit_count)
        .with_impact_area("components")
        .with_impact_area("imports")
        .build();

    info!(file_path, new_file = %new_file, component = %name, "Planned extraction to file");
    Ok(plan)
}

fn replacement_edit(
    text: &SourceText,
    selection: Selection,
    result: &RefactorResult,
) -> CarveResult<TextEdit> {
    Ok(TextEdit {
        file_path: None,
        edit_type: EditType::Replace,
        location: EditLocation::from_offsets(text, selection.start, selection.end),
        original_text: text.slice(selection.start, selection.end)?.to_string(),
        new_text: result.replacement_text.clone(),
        priority: 90,
        description: "Replace selection with the extracted component".to_string(),
    })
}

/// File extension for an editor language identifier
pub fn extension_for_language(language_id: &str) -> Option<&'static str> {
    match language_id {
        "javascript" => Some(".js"),
        "typescript" => Some(".ts"),
        "javascriptreact" => Some(".jsx"),
        "typescriptreact" => Some(".tsx"),
        _ => None,
    }
}

/// Editor language identifier of a file, from its extension
pub fn language_id_for_path(path: &Path) -> Option<&'static str> {
    match path.extension()?.to_str()? {
        "js" | "mjs" | "cjs" => Some("javascript"),
        "ts" | "mts" | "cts" => Some("typescript"),
        "jsx" => Some("javascriptreact"),
        "tsx" => Some("typescriptreact"),
        _ => None,
    }
}

/// A refactoring a host can offer for the current selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeAction {
    pub command: &'static str,
    pub title: &'static str,
}

pub const EXTRACT_TO_FUNCTION: &str = "carve.extractToFunction";
pub const EXTRACT_TO_FILE: &str = "carve.extractToFile";

/// Actions available for `selected_text`; empty unless it is markup
pub fn code_actions(selected_text: &str) -> Vec<CodeAction> {
    if classify_selection(selected_text) == SelectionShape::NotMarkup {
        return Vec::new();
    }
    vec![
        CodeAction {
            command: EXTRACT_TO_FUNCTION,
            title: "Extract JSX to function",
        },
        CodeAction {
            command: EXTRACT_TO_FILE,
            title: "Extract JSX to file",
        },
    ]
}
