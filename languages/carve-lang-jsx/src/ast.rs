//! Parsing, printing and node lookup over swc syntax trees

use carve_foundation::{CarveError, CarveResult, SourceText};
use std::path::PathBuf;
use swc_common::{
    comments::{Comments, SingleThreadedComments},
    sync::Lrc,
    BytePos, FileName, FilePathMapping, SourceMap, Span, Spanned, DUMMY_SP,
};
use swc_ecma_ast::*;
use swc_ecma_codegen::{text_writer::JsWriter, Emitter};
use swc_ecma_parser::{lexer::Lexer, Parser, StringInput, Syntax, TsSyntax};
use swc_ecma_visit::{Visit, VisitWith};

/// Half-open byte range relative to the start of a parsed document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// True when `other` lies entirely inside this range
    pub fn contains(&self, other: ByteRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A parsed document together with the state needed to map spans back to text
pub struct ParsedDocument {
    pub module: Module,
    comments: SingleThreadedComments,
    source_map: Lrc<SourceMap>,
    start_pos: BytePos,
    text: SourceText,
}

impl ParsedDocument {
    pub fn text(&self) -> &SourceText {
        &self.text
    }

    pub fn source_map(&self) -> &Lrc<SourceMap> {
        &self.source_map
    }

    pub fn start_pos(&self) -> BytePos {
        self.start_pos
    }

    /// Byte range of a span, relative to the document start
    pub fn range_of(&self, span: Span) -> ByteRange {
        range_of(span, self.start_pos)
    }

    /// Source text covered by a span
    pub fn snippet(&self, span: Span) -> &str {
        let range = self.range_of(span);
        self.text.as_str().get(range.start..range.end).unwrap_or_default()
    }

    /// Start of the first comment attached in front of `pos`, if any
    pub fn leading_comment_start(&self, pos: BytePos) -> Option<ByteRange> {
        let comments = self.comments.get_leading(pos)?;
        comments
            .iter()
            .map(|comment| self.range_of(comment.span))
            .min_by_key(|range| range.start)
    }

    /// Detached copy of the expression whose span is exactly `span`
    pub fn clone_expr(&self, span: Span) -> Option<Expr> {
        let mut finder = NodeFinder::new(span);
        self.module.visit_with(&mut finder);
        finder.expr
    }

    /// Detached copy of the markup element or fragment at `span`, as an expression
    pub fn clone_markup(&self, span: Span) -> Option<Expr> {
        let mut finder = NodeFinder::new(span);
        self.module.visit_with(&mut finder);
        finder.markup
    }

    /// Detached copy of the JSX attribute at `span`
    pub fn clone_attr(&self, span: Span) -> Option<JSXAttr> {
        let mut finder = NodeFinder::new(span);
        self.module.visit_with(&mut finder);
        finder.attr
    }

    /// Render an expression to source text
    pub fn print(&self, expr: &Expr) -> CarveResult<String> {
        print_expr(&self.source_map, expr)
    }
}

pub(crate) fn range_of(span: Span, start_pos: BytePos) -> ByteRange {
    ByteRange::new(
        span.lo.0.saturating_sub(start_pos.0) as usize,
        span.hi.0.saturating_sub(start_pos.0) as usize,
    )
}

const BOM: char = '\u{feff}';

fn syntax() -> Syntax {
    Syntax::Typescript(TsSyntax {
        tsx: true,
        decorators: true,
        ..Default::default()
    })
}

/// Parse a complete document as a TSX module
pub fn parse_document(text: &str) -> CarveResult<ParsedDocument> {
    parse_named(text, "component.tsx")
}

fn parse_named(text: &str, file_name: &str) -> CarveResult<ParsedDocument> {
    let source_map: Lrc<SourceMap> = Lrc::new(SourceMap::new(FilePathMapping::empty()));
    let file = source_map.new_source_file(
        Lrc::new(FileName::Real(PathBuf::from(file_name))),
        without_bom(text),
    );
    let start_pos = file.start_pos;
    let source = SourceText::new(text);
    let comments = SingleThreadedComments::default();

    let lexer = Lexer::new(
        syntax(),
        Default::default(),
        StringInput::from(&*file),
        Some(&comments),
    );
    let mut parser = Parser::new_from(lexer);

    let parse_error = |error: swc_ecma_parser::error::Error| {
        let range = range_of(error.span(), start_pos);
        CarveError::parse_at(
            format!("{:?}", error.kind()),
            source.position_at_byte(range.start),
        )
    };

    let module = parser.parse_module().map_err(parse_error)?;
    if let Some(error) = parser.take_errors().into_iter().next() {
        return Err(parse_error(error));
    }

    Ok(ParsedDocument {
        module,
        comments,
        source_map,
        start_pos,
        text: source,
    })
}

/// swc strips a leading byte order mark, which would shift every span
/// against the document text. Blank it out with the same number of bytes.
fn without_bom(text: &str) -> String {
    match text.strip_prefix(BOM) {
        Some(rest) => format!("{}{}", " ".repeat(BOM.len_utf8()), rest),
        None => text.to_string(),
    }
}

/// Render an expression to source text
///
/// The expression is printed as a one-statement module and the statement
/// terminator is stripped.
pub fn print_expr(source_map: &Lrc<SourceMap>, expr: &Expr) -> CarveResult<String> {
    let module = Module {
        span: DUMMY_SP,
        body: vec![ModuleItem::Stmt(Stmt::Expr(ExprStmt {
            span: DUMMY_SP,
            expr: Box::new(expr.clone()),
        }))],
        shebang: None,
    };

    let mut buf = vec![];
    {
        let mut emitter = Emitter {
            cfg: Default::default(),
            cm: source_map.clone(),
            comments: None,
            wr: JsWriter::new(source_map.clone(), "\n", &mut buf, None),
        };
        emitter
            .emit_module(&module)
            .map_err(|e| CarveError::internal(format!("Failed to print expression: {}", e)))?;
    }

    let code = String::from_utf8(buf)
        .map_err(|e| CarveError::internal(format!("Printed code is not UTF-8: {}", e)))?;
    let code = code.trim();
    Ok(code.strip_suffix(';').unwrap_or(code).trim_end().to_string())
}

/// Parse `text` on its own and return the markup expression it consists of, if any
fn parse_markup_fragment(text: &str) -> Option<Expr> {
    let document = parse_named(text, "selection.tsx").ok()?;
    let mut items = document.module.body.into_iter();
    let only = items.next()?;
    if items.next().is_some() {
        return None;
    }

    match only {
        ModuleItem::Stmt(Stmt::Expr(ExprStmt { expr, .. })) => {
            let expr = unwrap_parens(*expr);
            match expr {
                Expr::JSXElement(_) | Expr::JSXFragment(_) => Some(expr),
                _ => None,
            }
        }
        _ => None,
    }
}

fn unwrap_parens(expr: Expr) -> Expr {
    match expr {
        Expr::Paren(paren) => unwrap_parens(*paren.expr),
        other => other,
    }
}

/// Whether `text`, parsed on its own, is a single markup element or fragment
///
/// Text that does not parse, or parses to anything else, yields `false`.
pub fn is_markup(text: &str) -> bool {
    parse_markup_fragment(text).is_some()
}

/// Shape of a selected piece of text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionShape {
    /// A single element or fragment
    Markup,
    /// Markup only once wrapped in a fragment (adjacent siblings, trailing expressions)
    Siblings,
    /// Not markup at all
    NotMarkup,
}

/// Opening and closing text of the fragment used to wrap sibling selections
pub const FRAGMENT_OPEN: &str = "<>";
pub const FRAGMENT_CLOSE: &str = "</>";

/// Classify selected text
pub fn classify_selection(text: &str) -> SelectionShape {
    if is_markup(text) {
        return SelectionShape::Markup;
    }

    let wrapped = format!("{}{}{}", FRAGMENT_OPEN, text, FRAGMENT_CLOSE);
    match parse_markup_fragment(&wrapped) {
        Some(Expr::JSXFragment(fragment))
            if fragment.children.iter().any(|child| {
                matches!(
                    child,
                    JSXElementChild::JSXElement(_) | JSXElementChild::JSXFragment(_)
                )
            }) =>
        {
            SelectionShape::Siblings
        }
        _ => SelectionShape::NotMarkup,
    }
}

/// Finds the node with an exact span and clones it out of the tree
struct NodeFinder {
    target: Span,
    expr: Option<Expr>,
    markup: Option<Expr>,
    attr: Option<JSXAttr>,
}

impl NodeFinder {
    fn new(target: Span) -> Self {
        Self {
            target,
            expr: None,
            markup: None,
            attr: None,
        }
    }
}

impl Visit for NodeFinder {
    fn visit_expr(&mut self, expr: &Expr) {
        if self.expr.is_none() && !matches!(expr, Expr::Paren(_)) && expr.span() == self.target {
            self.expr = Some(expr.clone());
        }
        expr.visit_children_with(self);
    }

    fn visit_prop(&mut self, prop: &Prop) {
        if let Prop::Shorthand(ident) = prop {
            if self.expr.is_none() && ident.span == self.target {
                self.expr = Some(Expr::Ident(ident.clone()));
            }
        }
        prop.visit_children_with(self);
    }

    fn visit_jsx_element(&mut self, element: &JSXElement) {
        if self.markup.is_none() && element.span == self.target {
            self.markup = Some(Expr::JSXElement(Box::new(element.clone())));
        }
        element.visit_children_with(self);
    }

    fn visit_jsx_fragment(&mut self, fragment: &JSXFragment) {
        if self.markup.is_none() && fragment.span == self.target {
            self.markup = Some(Expr::JSXFragment(fragment.clone()));
        }
        fragment.visit_children_with(self);
    }

    fn visit_jsx_attr(&mut self, attr: &JSXAttr) {
        if self.attr.is_none() && attr.span == self.target {
            self.attr = Some(attr.clone());
        }
        attr.visit_children_with(self);
    }
}
