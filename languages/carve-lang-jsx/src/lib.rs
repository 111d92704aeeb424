//! JSX extract-to-component refactoring for Carve
//!
//! The engine parses a document with swc, indexes the nodes and scopes it
//! needs, finds every outside value the selected markup reads, turns those
//! into props and produces the replacement element and the new component.
pub mod ast;
pub mod imports;
pub mod naming;
pub mod props;
pub mod references;
pub mod refactoring;
pub mod syntax_index;
pub mod transform;

pub use ast::{classify_selection, is_markup, parse_document, ParsedDocument, SelectionShape};
pub use naming::normalize_component_name;
pub use refactoring::{
    code_actions, extension_for_language, extract, extract_with, language_id_for_path,
    plan_extract_component, plan_extract_to_file, CodeAction, ExtractSettings, RefactorResult,
    Selection, EXTRACT_TO_FILE, EXTRACT_TO_FUNCTION,
};
pub use transform::{ComponentStyle, ComponentTemplate};
