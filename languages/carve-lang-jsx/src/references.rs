//! Discovery of the outside values a selected subtree reads

use crate::ast::ByteRange;
use crate::syntax_index::{BindingKind, NodeId, NodeKind, SyntaxIndex};

/// Kind of definition that owns the selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Class,
    Function,
    ArrowVariable,
}

/// Nearest enclosing class, function declaration or function-initialized variable
pub fn find_owning_component(index: &SyntaxIndex, node: NodeId) -> Option<(NodeId, ComponentKind)> {
    index.ancestors(node).find_map(|ancestor| {
        let kind = match index.kind(ancestor) {
            NodeKind::ClassDecl { .. } => ComponentKind::Class,
            NodeKind::FunctionDecl { .. } => ComponentKind::Function,
            NodeKind::VariableDeclarator {
                function_init: true,
            } => ComponentKind::ArrowVariable,
            _ => return None,
        };
        Some((ancestor, kind))
    })
}

/// The function node that holds a component's parameters
fn component_function(index: &SyntaxIndex, component: NodeId, kind: ComponentKind) -> Option<NodeId> {
    match kind {
        ComponentKind::Class => None,
        ComponentKind::Function => Some(component),
        ComponentKind::ArrowVariable => index.descendants(component).find(|id| {
            matches!(
                index.kind(*id),
                NodeKind::ArrowFunction | NodeKind::FunctionExpr
            )
        }),
    }
}

/// Outer `this.` member accesses inside `target`
fn instance_member_references(index: &SyntaxIndex, target: NodeId) -> Vec<NodeId> {
    index
        .descendants(target)
        .filter(|id| index.is_outer_member(*id) && index.is_rooted_at_this(*id))
        .collect()
}

/// Reads of the component's first parameter
fn first_param_references(index: &SyntaxIndex, function: NodeId) -> Vec<NodeId> {
    let Some(scope) = index.scope_of(function) else {
        return Vec::new();
    };
    match index.scope(scope).params.first() {
        Some(names) => index.variable_references(scope, names),
        None => Vec::new(),
    }
}

/// Reads of everything bound by the non-module scopes around `target`
fn enclosing_scope_references(index: &SyntaxIndex, target: NodeId) -> Vec<NodeId> {
    let mut sites = Vec::new();
    for scope_id in index.enclosing_scopes(target) {
        let scope = index.scope(scope_id);
        let names: Vec<String> = scope
            .bindings()
            .filter(|binding| binding.kind != BindingKind::Import)
            .map(|binding| binding.name.clone())
            .collect();
        sites.extend(index.variable_references(scope_id, &names));
    }
    sites
}

/// Every read of a value bound outside `target` that occurs inside `selection`
///
/// The result is deduplicated and ordered by start offset, enclosing
/// sites first when two start together.
pub fn find_component_member_references(
    index: &SyntaxIndex,
    component: NodeId,
    kind: ComponentKind,
    target: NodeId,
    selection: ByteRange,
) -> Vec<NodeId> {
    let mut sites = Vec::new();

    if kind == ComponentKind::Class {
        sites.extend(instance_member_references(index, target));
    }
    if let Some(function) = component_function(index, component, kind) {
        sites.extend(first_param_references(index, function));
    }
    sites.extend(enclosing_scope_references(index, target));

    let mut sites: Vec<NodeId> = sites
        .into_iter()
        .filter(|site| selection.contains(index.range(*site)))
        .collect();
    sites.sort_by(|a, b| {
        let (a, b) = (index.range(*a), index.range(*b));
        a.start.cmp(&b.start).then(b.end.cmp(&a.end))
    });
    sites.dedup_by_key(|site| index.range(*site));

    tracing::debug!(
        component_kind = ?kind,
        references = sites.len(),
        "Discovered references inside selection"
    );
    sites
}
