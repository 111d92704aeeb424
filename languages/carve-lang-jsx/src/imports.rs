//! Import statements added when a component moves to its own file

use crate::ast::ParsedDocument;
use swc_ecma_ast::{ModuleDecl, ModuleItem};

/// Module specifier React is imported from
pub const REACT_MODULE: &str = "react";

/// Whether the document already imports from `react`
pub fn has_react_import(document: &ParsedDocument) -> bool {
    document.module.body.iter().any(|item| match item {
        ModuleItem::ModuleDecl(ModuleDecl::Import(import)) => {
            import.src.value == REACT_MODULE
        }
        _ => false,
    })
}

/// `import { Name } from './Name';`
pub fn import_statement(name: &str) -> String {
    format!("import {{ {name} }} from './{name}';\n", name = name)
}
