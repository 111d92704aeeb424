//! Turning discovered references into the props of the new component

use crate::ast::{ByteRange, ParsedDocument};
use crate::syntax_index::{NodeId, NodeKind, SyntaxIndex};
use carve_foundation::{CarveError, CarveResult};
use indexmap::IndexMap;
use swc_common::Span;
use swc_ecma_ast::{Expr, JSXAttrValue, JSXExpr, JSXExprContainer};

/// Name of the prop carrying the selection's `key` attribute
pub const KEY_PROP: &str = "key";

/// Aliases of the enclosing component's own props and state, never promoted to containers
const RESERVED_CONTAINERS: &[&str] = &["this.props", "this.state", "props"];

/// Value passed for a prop in the replacement element
#[derive(Debug, Clone)]
pub enum PropValue {
    /// Rendered as `name={expr}`
    Expr(Box<Expr>),
    /// Attribute value copied verbatim, rendered as `name=<raw>`
    Raw(String),
}

#[derive(Debug, Clone)]
pub struct Property {
    pub name: String,
    pub value: PropValue,
    /// Source rendering of the captured value, used to detect collisions
    pub rendered: String,
}

/// Props of the new component in the order they were staged
#[derive(Debug, Clone, Default)]
pub struct PropertySet {
    entries: IndexMap<String, Property>,
}

impl PropertySet {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Property> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.entries.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Name under which `rendered` can be staged
    ///
    /// A free name or a name already holding the same rendering is reused;
    /// otherwise the name is prefixed with `_` until one of those holds.
    pub fn ensure_unique(&self, name: &str, rendered: &str) -> String {
        let mut candidate = name.to_string();
        loop {
            match self.entries.get(&candidate) {
                Some(existing) if existing.rendered != rendered => {
                    candidate = format!("_{}", candidate);
                }
                _ => return candidate,
            }
        }
    }

    /// Stage a property unless its name is already present
    pub fn stage(&mut self, property: Property) {
        self.entries
            .entry(property.name.clone())
            .or_insert(property);
    }
}

/// Shared object prefix promoted to a single prop
#[derive(Debug, Clone)]
pub struct ContainerObject {
    /// Rendered prefix, e.g. `this.props.user`
    pub object: String,
    /// Last path segment of the prefix
    pub property: String,
    expr: Expr,
    staged_as: Option<String>,
}

impl ContainerObject {
    /// Path below the container for a rendered reference, if the reference lies under it
    fn relative_path(&self, rendered: &str) -> Option<Vec<String>> {
        if rendered == self.object {
            return Some(Vec::new());
        }
        let remainder = rendered.strip_prefix(&self.object)?.strip_prefix('.')?;
        if !is_dotted_path(remainder) {
            return None;
        }
        Some(remainder.split('.').map(str::to_string).collect())
    }
}

/// Replacement of one node by `props.<path>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub span: Span,
    pub path: Vec<String>,
    /// Key of a shorthand object property, which must be spelled out
    pub shorthand: Option<String>,
}

/// Outcome of prop synthesis for one selection
#[derive(Debug, Clone, Default)]
pub struct Synthesis {
    pub props: PropertySet,
    pub substitutions: Vec<Substitution>,
    /// `key` attribute removed from the selection root
    pub removed_attr: Option<Span>,
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}

fn is_dotted_path(text: &str) -> bool {
    !text.is_empty() && text.split('.').all(is_identifier)
}

/// `prefix` is a proper path prefix of `text`, on a segment boundary
fn is_path_prefix(prefix: &str, text: &str) -> bool {
    text.strip_prefix(prefix)
        .map_or(false, |rest| rest.starts_with('.'))
}

fn last_segment(path: &str) -> String {
    path.rsplit('.').next().unwrap_or(path).to_string()
}

fn superseded(removed: &[ByteRange], range: ByteRange) -> bool {
    removed.iter().any(|outer| outer.contains(range))
}

/// Detached copy of a node and its rendering
fn capture(
    document: &ParsedDocument,
    index: &SyntaxIndex,
    id: NodeId,
) -> CarveResult<(Expr, String)> {
    let expr = document.clone_expr(index.node(id).span).ok_or_else(|| {
        CarveError::internal(format!(
            "No expression found at {:?}",
            index.range(id)
        ))
    })?;
    let rendered = document.print(&expr)?;
    Ok((expr, rendered))
}

/// Stage the `key` attribute of the selection root and report its span
fn stage_key(
    document: &ParsedDocument,
    index: &SyntaxIndex,
    target: NodeId,
    props: &mut PropertySet,
) -> CarveResult<Option<Span>> {
    if *index.kind(target) != NodeKind::MarkupElement {
        return Ok(None);
    }

    let key_attr = index.descendants(target).find(|id| {
        index.parent(*id) == Some(target)
            && matches!(index.kind(*id), NodeKind::MarkupAttribute { name } if name == KEY_PROP)
    });
    let Some(key_attr) = key_attr else {
        return Ok(None);
    };

    let span = index.node(key_attr).span;
    let attr = document
        .clone_attr(span)
        .ok_or_else(|| CarveError::internal("key attribute vanished from the tree"))?;

    let (value, rendered) = match attr.value {
        Some(JSXAttrValue::JSXExprContainer(JSXExprContainer {
            expr: JSXExpr::Expr(expr),
            ..
        })) => {
            let rendered = document.print(&expr)?;
            (PropValue::Expr(expr), rendered)
        }
        // `key={}` carries nothing to pass on
        Some(JSXAttrValue::JSXExprContainer(_)) | None => return Ok(None),
        Some(_) => {
            let raw = document
                .snippet(span)
                .split_once('=')
                .map(|(_, value)| value.trim().to_string())
                .unwrap_or_default();
            (PropValue::Raw(raw.clone()), raw)
        }
    };

    props.stage(Property {
        name: KEY_PROP.to_string(),
        value,
        rendered,
    });
    Ok(Some(span))
}

/// Group reference sites by their rendered object prefix and keep the shared ones
fn detect_containers(
    document: &ParsedDocument,
    index: &SyntaxIndex,
    sites: &[NodeId],
) -> CarveResult<Vec<ContainerObject>> {
    let mut groups: IndexMap<String, (usize, NodeId)> = IndexMap::new();
    for &site in sites {
        let prefix = match index.kind(site) {
            NodeKind::MemberAccess { .. } => match index.node(site).object {
                Some(object) if *index.kind(object) != NodeKind::This => object,
                _ => continue,
            },
            _ => site,
        };
        let (_, text) = capture(document, index, prefix)?;
        groups.entry(text).or_insert((0, prefix)).0 += 1;
    }

    let kept: Vec<(String, NodeId)> = groups
        .into_iter()
        .filter(|(text, (count, _))| {
            *count > 1 && !RESERVED_CONTAINERS.contains(&text.as_str()) && is_dotted_path(text)
        })
        .map(|(text, (_, node))| (text, node))
        .collect();

    // Only the topmost prefix of a chain becomes a container
    let mut containers = Vec::new();
    for (text, node) in &kept {
        if kept.iter().any(|(other, _)| is_path_prefix(other, text)) {
            continue;
        }
        let (expr, _) = capture(document, index, *node)?;
        containers.push(ContainerObject {
            object: text.clone(),
            property: last_segment(text),
            expr,
            staged_as: None,
        });
    }

    tracing::debug!(containers = containers.len(), "Detected container objects");
    Ok(containers)
}

/// Build the prop set and the substitutions for the selected subtree
///
/// `sites` must be ordered by start offset with enclosing sites first.
pub fn synthesize(
    document: &ParsedDocument,
    index: &SyntaxIndex,
    target: NodeId,
    sites: &[NodeId],
) -> CarveResult<Synthesis> {
    let mut props = PropertySet::default();
    let mut removed = Vec::new();

    let removed_attr = stage_key(document, index, target, &mut props)?;
    if let Some(span) = removed_attr {
        removed.push(document.range_of(span));
    }

    // Sites under the removed key attribute still count towards containers
    let mut containers = detect_containers(document, index, sites)?;

    let mut substitutions = Vec::new();
    for &site in sites {
        if superseded(&removed, index.range(site)) {
            continue;
        }

        let mut node = site;
        let mut container = None;
        let name = if matches!(index.kind(site), NodeKind::MemberAccess { .. }) {
            if index.is_function_binding(site) {
                // `this.handleClick.bind(this)` is passed whole, named after the method
                if let Some(call) = index.parent(site) {
                    node = call;
                }
                index
                    .node(site)
                    .object
                    .and_then(|object| index.reference_name(object))
            } else {
                index.reference_name(site)
            }
        } else {
            index.reference_name(site)
        };
        let name = name.unwrap_or_else(|| "value".to_string());

        let (expr, rendered) = capture(document, index, node)?;
        if node == site {
            container = containers
                .iter_mut()
                .find_map(|c| c.relative_path(&rendered).map(|path| (c, path)));
        }

        let path = match container {
            Some((container, rest)) => {
                let staged = match &container.staged_as {
                    Some(staged) => staged.clone(),
                    None => {
                        let staged = props.ensure_unique(&container.property, &container.object);
                        props.stage(Property {
                            name: staged.clone(),
                            value: PropValue::Expr(Box::new(container.expr.clone())),
                            rendered: container.object.clone(),
                        });
                        container.staged_as = Some(staged.clone());
                        staged
                    }
                };
                std::iter::once(staged).chain(rest).collect()
            }
            None => {
                let candidate = if name == KEY_PROP {
                    format!("_{}", name)
                } else {
                    name
                };
                let unique = props.ensure_unique(&candidate, &rendered);
                props.stage(Property {
                    name: unique.clone(),
                    value: PropValue::Expr(Box::new(expr)),
                    rendered,
                });
                vec![unique]
            }
        };

        let shorthand = match index.kind(node) {
            NodeKind::ShorthandProperty { name } => Some(name.clone()),
            _ => None,
        };
        removed.push(index.range(node));
        substitutions.push(Substitution {
            span: index.node(node).span,
            path,
            shorthand,
        });
    }

    tracing::debug!(
        props = props.len(),
        substitutions = substitutions.len(),
        "Synthesized props"
    );

    Ok(Synthesis {
        props,
        substitutions,
        removed_attr,
    })
}
