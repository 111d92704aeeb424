//! Node arena, parent links and lexical scopes for one parsed document.
//!
//! swc trees have no parent pointers, so a single visitor pass records the
//! nodes the extraction consumes into an arena in preorder. Every node keeps
//! the id of its parent and the role it plays there, which is what ancestor
//! searches and the outer member-access test walk over. Scopes are collected
//! in the same pass and every identifier read is resolved to the innermost
//! binding that declares it.

use crate::ast::{range_of, ByteRange};
use indexmap::IndexMap;
use std::collections::HashMap;
use swc_common::{BytePos, Span, Spanned};
use swc_ecma_ast::*;
use swc_ecma_visit::{Visit, VisitWith};

/// Iteration methods whose receiver ends a member-access chain
const ITERATION_METHODS: &[&str] = &["map", "filter", "reduce"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(usize);

/// Role of a node inside its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildRole {
    /// Object of a member access
    Object,
    /// Callee of a call
    Callee,
    /// Computed property of a member access
    Computed,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Identifier { name: String },
    /// `{ name }` inside an object literal
    ShorthandProperty { name: String },
    This,
    /// `property` is `None` for computed and private members
    MemberAccess { property: Option<String> },
    CallExpression,
    OtherExpression,
    ClassDecl { name: String },
    FunctionDecl { name: String },
    FunctionExpr,
    ArrowFunction,
    Method,
    VariableDeclarator { function_init: bool },
    /// Variable statement or export wrapper around a declaration
    DeclarationStatement,
    BlockStatement,
    /// `for` heads and `catch` clauses
    ScopeStatement,
    MarkupElement,
    MarkupFragment,
    MarkupAttribute { name: String },
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub parent: Option<NodeId>,
    pub role: ChildRole,
    /// Object child of a member access
    pub object: Option<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Module,
    Function,
    Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Var,
    Let,
    Const,
    Param,
    Function,
    Class,
    Import,
    Catch,
}

#[derive(Debug, Clone)]
pub struct Binding {
    pub name: String,
    pub kind: BindingKind,
    pub declared_at: Span,
    /// Read sites, in source order
    pub references: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    pub owner: Option<NodeId>,
    pub parent: Option<ScopeId>,
    /// Names bound by each parameter, in parameter order
    pub params: Vec<Vec<String>>,
    bindings: IndexMap<String, Binding>,
}

impl Scope {
    pub fn binding(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    pub fn bindings(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.values()
    }
}

/// Arena of the nodes and scopes of one module
#[derive(Debug)]
pub struct SyntaxIndex {
    nodes: Vec<Node>,
    scopes: Vec<Scope>,
    node_scopes: HashMap<NodeId, ScopeId>,
    start_pos: BytePos,
}

impl SyntaxIndex {
    pub fn build(module: &Module, start_pos: BytePos) -> Self {
        let mut builder = IndexBuilder {
            nodes: Vec::new(),
            scopes: Vec::new(),
            node_scopes: HashMap::new(),
            stack: Vec::new(),
            scope_stack: Vec::new(),
            next_role: ChildRole::Other,
            function_body: false,
        };
        module.visit_with(&mut builder);

        tracing::debug!(
            nodes = builder.nodes.len(),
            scopes = builder.scopes.len(),
            "Built syntax index"
        );

        Self {
            nodes: builder.nodes,
            scopes: builder.scopes,
            node_scopes: builder.node_scopes,
            start_pos,
        }
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    /// All nodes in preorder
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i), node))
    }

    pub fn range(&self, id: NodeId) -> ByteRange {
        range_of(self.nodes[id.0].span, self.start_pos)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Proper ancestors of a node, innermost first
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |current| self.parent(*current))
    }

    /// Innermost proper ancestor satisfying `predicate`
    pub fn find_ancestor(
        &self,
        id: NodeId,
        predicate: impl Fn(&NodeKind) -> bool,
    ) -> Option<NodeId> {
        self.ancestors(id).find(|ancestor| predicate(self.kind(*ancestor)))
    }

    pub fn is_descendant(&self, id: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(id).any(|candidate| candidate == ancestor)
    }

    /// Nodes strictly inside the subtree of `id`, in preorder
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        (id.0 + 1..self.nodes.len())
            .map(NodeId)
            .take_while(move |candidate| self.is_descendant(*candidate, id))
    }

    /// Nodes lying entirely inside `range`, in preorder
    pub fn nodes_within(&self, range: ByteRange) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes()
            .map(|(id, _)| id)
            .filter(move |id| range.contains(self.range(*id)))
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    /// Scope introduced by a function-like, block or scope-statement node
    pub fn scope_of(&self, id: NodeId) -> Option<ScopeId> {
        self.node_scopes.get(&id).copied()
    }

    /// Non-module scopes enclosing `id`, innermost first
    pub fn enclosing_scopes(&self, id: NodeId) -> Vec<ScopeId> {
        let mut scopes: Vec<ScopeId> = Vec::new();
        for ancestor in self.ancestors(id) {
            if let Some(scope) = self.scope_of(ancestor) {
                if scopes.last() != Some(&scope)
                    && self.scopes[scope.0].kind != ScopeKind::Module
                {
                    scopes.push(scope);
                }
            }
        }
        scopes
    }

    /// The member access whose object is `id` has a name in [`ITERATION_METHODS`] and is called
    pub fn is_iteration_call(&self, id: NodeId) -> bool {
        let node = self.node(id);
        match &node.kind {
            NodeKind::MemberAccess {
                property: Some(property),
            } => node.role == ChildRole::Callee && ITERATION_METHODS.contains(&property.as_str()),
            _ => false,
        }
    }

    /// Outer member-access test
    ///
    /// A member access is outer unless it is itself part of a further member
    /// access, except when that further access is an iteration-method callee.
    pub fn is_outer_member(&self, id: NodeId) -> bool {
        let node = self.node(id);
        if !matches!(node.kind, NodeKind::MemberAccess { .. }) {
            return false;
        }
        match (node.role, node.parent) {
            (ChildRole::Object | ChildRole::Computed, Some(parent)) => {
                self.is_iteration_call(parent)
            }
            _ => true,
        }
    }

    /// Widen a read site to the outer member access it is the root of
    ///
    /// Climbs through member accesses while the node is their object and
    /// stops below an iteration-method callee, so `a.items.map(..)` yields
    /// `a.items`.
    pub fn outer_member(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while self.node(current).role == ChildRole::Object {
            let parent = match self.parent(current) {
                Some(parent) => parent,
                None => break,
            };
            if self.is_iteration_call(parent) {
                break;
            }
            current = parent;
            if self.is_outer_member(current) {
                break;
            }
        }
        current
    }

    /// A member access named `bind` that is being called
    pub fn is_function_binding(&self, id: NodeId) -> bool {
        let node = self.node(id);
        matches!(&node.kind, NodeKind::MemberAccess { property: Some(p) } if p == "bind")
            && node.role == ChildRole::Callee
    }

    /// Member access whose innermost object is `this`
    pub fn is_rooted_at_this(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            match self.kind(current) {
                NodeKind::MemberAccess { .. } => match self.node(current).object {
                    Some(object) => current = object,
                    None => return false,
                },
                NodeKind::This => return current != id,
                _ => return false,
            }
        }
    }

    /// Name a read site would be known by as a property
    ///
    /// Identifiers use their own name, members their property name; computed
    /// members fall back to their object's name.
    pub fn reference_name(&self, id: NodeId) -> Option<String> {
        match self.kind(id) {
            NodeKind::Identifier { name } | NodeKind::ShorthandProperty { name } => {
                Some(name.clone())
            }
            NodeKind::MemberAccess {
                property: Some(property),
            } => Some(property.clone()),
            NodeKind::MemberAccess { property: None } => self
                .node(id)
                .object
                .and_then(|object| self.reference_name(object)),
            _ => None,
        }
    }

    /// Read sites of `names` in `scope`, each widened to its outer member access
    pub fn variable_references(&self, scope: ScopeId, names: &[String]) -> Vec<NodeId> {
        let scope = self.scope(scope);
        names
            .iter()
            .filter_map(|name| scope.binding(name))
            .flat_map(|binding| binding.references.iter())
            .map(|site| self.outer_member(*site))
            .collect()
    }
}

struct IndexBuilder {
    nodes: Vec<Node>,
    scopes: Vec<Scope>,
    node_scopes: HashMap<NodeId, ScopeId>,
    stack: Vec<NodeId>,
    scope_stack: Vec<ScopeId>,
    /// Role assigned to the next recorded node
    next_role: ChildRole,
    /// The next block is a function body and shares the function scope
    function_body: bool,
}

impl IndexBuilder {
    fn enter(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let role = std::mem::replace(&mut self.next_role, ChildRole::Other);
        let id = NodeId(self.nodes.len());
        let parent = self.stack.last().copied();
        if let (Some(parent), ChildRole::Object) = (parent, role) {
            self.nodes[parent.0].object = Some(id);
        }
        self.nodes.push(Node {
            kind,
            span,
            parent,
            role,
            object: None,
        });
        self.stack.push(id);
        id
    }

    fn exit(&mut self) {
        self.stack.pop();
    }

    fn visit_in_role<N: VisitWith<Self> + ?Sized>(&mut self, role: ChildRole, node: &N) {
        self.next_role = role;
        node.visit_with(self);
        self.next_role = ChildRole::Other;
    }

    fn push_scope(&mut self, kind: ScopeKind) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        let owner = self.stack.last().copied();
        self.scopes.push(Scope {
            kind,
            owner,
            parent: self.scope_stack.last().copied(),
            params: Vec::new(),
            bindings: IndexMap::new(),
        });
        if let Some(owner) = owner {
            self.node_scopes.insert(owner, id);
        }
        self.scope_stack.push(id);
        id
    }

    fn pop_scope(&mut self) {
        self.scope_stack.pop();
    }

    fn current_scope(&self) -> Option<ScopeId> {
        self.scope_stack.last().copied()
    }

    fn declare(&mut self, name: String, kind: BindingKind, span: Span) {
        if let Some(scope) = self.current_scope() {
            self.scopes[scope.0]
                .bindings
                .entry(name.clone())
                .or_insert(Binding {
                    name,
                    kind,
                    declared_at: span,
                    references: Vec::new(),
                });
        }
    }

    fn declare_pattern(&mut self, pat: &Pat, kind: BindingKind) {
        let mut names = Vec::new();
        pattern_names(pat, &mut names);
        for (name, span) in names {
            self.declare(name, kind, span);
        }
    }

    fn declare_params<'a>(&mut self, params: impl IntoIterator<Item = &'a Pat>) {
        for pat in params {
            let mut names = Vec::new();
            pattern_names(pat, &mut names);
            if let Some(scope) = self.current_scope() {
                self.scopes[scope.0]
                    .params
                    .push(names.iter().map(|(name, _)| name.clone()).collect());
            }
            for (name, span) in names {
                self.declare(name, BindingKind::Param, span);
            }
        }
    }

    fn declare_var_decl(&mut self, decl: &VarDecl) {
        let kind = match decl.kind {
            VarDeclKind::Var => BindingKind::Var,
            VarDeclKind::Let => BindingKind::Let,
            VarDeclKind::Const => BindingKind::Const,
        };
        for declarator in &decl.decls {
            self.declare_pattern(&declarator.name, kind);
        }
    }

    fn declare_decl(&mut self, decl: &Decl, include_var: bool) {
        match decl {
            Decl::Var(var) if var.kind != VarDeclKind::Var || include_var => {
                self.declare_var_decl(var)
            }
            Decl::Fn(function) => self.declare(
                function.ident.sym.to_string(),
                BindingKind::Function,
                function.ident.span,
            ),
            Decl::Class(class) => self.declare(
                class.ident.sym.to_string(),
                BindingKind::Class,
                class.ident.span,
            ),
            _ => {}
        }
    }

    /// Lexical declarations directly inside a statement list
    fn declare_lexical(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            if let Stmt::Decl(decl) = stmt {
                self.declare_decl(decl, false);
            }
        }
    }

    /// `var` declarations anywhere in a function body, outside nested functions
    fn declare_hoisted<N: VisitWith<VarCollector>>(&mut self, body: &N) {
        let mut collector = VarCollector::default();
        body.visit_with(&mut collector);
        for (name, span) in collector.names {
            self.declare(name, BindingKind::Var, span);
        }
    }

    fn resolve_read(&mut self, name: &str, site: NodeId) {
        for scope in self.scope_stack.iter().rev() {
            if let Some(binding) = self.scopes[scope.0].bindings.get_mut(name) {
                binding.references.push(site);
                return;
            }
        }
    }

    /// Visit a function body, sharing the current function scope
    fn visit_function_body(&mut self, body: &BlockStmt) {
        self.function_body = true;
        body.visit_with(self);
        self.function_body = false;
    }

    fn visit_function_parts<'a>(
        &mut self,
        params: impl IntoIterator<Item = &'a Pat> + Clone,
        body: Option<&BlockStmt>,
    ) {
        self.push_scope(ScopeKind::Function);
        self.declare_params(params.clone());
        if let Some(body) = body {
            self.declare_hoisted(&body.stmts);
            self.declare_lexical(&body.stmts);
        }
        for pat in params {
            pat.visit_with(self);
        }
        if let Some(body) = body {
            self.visit_function_body(body);
        }
        self.pop_scope();
    }
}

impl Visit for IndexBuilder {
    fn visit_module(&mut self, module: &Module) {
        self.push_scope(ScopeKind::Module);
        for item in &module.body {
            match item {
                ModuleItem::ModuleDecl(ModuleDecl::Import(import)) => {
                    for specifier in &import.specifiers {
                        let local = match specifier {
                            ImportSpecifier::Named(named) => &named.local,
                            ImportSpecifier::Default(default) => &default.local,
                            ImportSpecifier::Namespace(namespace) => &namespace.local,
                        };
                        self.declare(local.sym.to_string(), BindingKind::Import, local.span);
                    }
                }
                ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => {
                    self.declare_decl(&export.decl, true)
                }
                ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(export)) => {
                    match &export.decl {
                        DefaultDecl::Class(ClassExpr {
                            ident: Some(ident), ..
                        })
                        | DefaultDecl::Fn(FnExpr {
                            ident: Some(ident), ..
                        }) => {
                            let kind = if matches!(export.decl, DefaultDecl::Class(_)) {
                                BindingKind::Class
                            } else {
                                BindingKind::Function
                            };
                            self.declare(ident.sym.to_string(), kind, ident.span);
                        }
                        _ => {}
                    }
                }
                ModuleItem::Stmt(Stmt::Decl(decl)) => self.declare_decl(decl, true),
                _ => {}
            }
        }
        self.declare_hoisted(&module.body);
        module.body.visit_with(self);
        self.pop_scope();
    }

    fn visit_expr(&mut self, expr: &Expr) {
        match expr {
            // Parentheses are transparent: the role passes to the inner expression
            Expr::Paren(paren) => paren.expr.visit_with(self),
            Expr::Ident(ident) => {
                let id = self.enter(
                    NodeKind::Identifier {
                        name: ident.sym.to_string(),
                    },
                    ident.span,
                );
                self.resolve_read(&ident.sym, id);
                self.exit();
            }
            Expr::This(this) => {
                self.enter(NodeKind::This, this.span);
                self.exit();
            }
            Expr::Member(member) => {
                let property = match &member.prop {
                    MemberProp::Ident(name) => Some(name.sym.to_string()),
                    _ => None,
                };
                self.enter(NodeKind::MemberAccess { property }, member.span);
                self.visit_in_role(ChildRole::Object, &*member.obj);
                if let MemberProp::Computed(computed) = &member.prop {
                    self.visit_in_role(ChildRole::Computed, &*computed.expr);
                }
                self.exit();
            }
            Expr::Call(call) => {
                self.enter(NodeKind::CallExpression, call.span);
                if let Callee::Expr(callee) = &call.callee {
                    self.visit_in_role(ChildRole::Callee, &**callee);
                }
                call.args.visit_with(self);
                self.exit();
            }
            _ => {
                self.enter(NodeKind::OtherExpression, expr.span());
                expr.visit_children_with(self);
                self.exit();
            }
        }
    }

    fn visit_prop(&mut self, prop: &Prop) {
        if let Prop::Shorthand(ident) = prop {
            let id = self.enter(
                NodeKind::ShorthandProperty {
                    name: ident.sym.to_string(),
                },
                ident.span,
            );
            self.resolve_read(&ident.sym, id);
            self.exit();
            return;
        }
        prop.visit_children_with(self);
    }

    fn visit_fn_decl(&mut self, decl: &FnDecl) {
        self.enter(
            NodeKind::FunctionDecl {
                name: decl.ident.sym.to_string(),
            },
            decl.function.span,
        );
        decl.function.visit_with(self);
        self.exit();
    }

    fn visit_fn_expr(&mut self, expr: &FnExpr) {
        self.enter(NodeKind::FunctionExpr, expr.function.span);
        expr.function.visit_with(self);
        self.exit();
    }

    fn visit_function(&mut self, function: &Function) {
        function.decorators.visit_with(self);
        self.visit_function_parts(
            function.params.iter().map(|param| &param.pat),
            function.body.as_ref(),
        );
    }

    fn visit_arrow_expr(&mut self, arrow: &ArrowExpr) {
        self.enter(NodeKind::ArrowFunction, arrow.span);
        match &*arrow.body {
            BlockStmtOrExpr::BlockStmt(block) => {
                self.visit_function_parts(arrow.params.iter(), Some(block));
            }
            BlockStmtOrExpr::Expr(body) => {
                self.push_scope(ScopeKind::Function);
                self.declare_params(arrow.params.iter());
                arrow.params.visit_with(self);
                body.visit_with(self);
                self.pop_scope();
            }
        }
        self.exit();
    }

    fn visit_class_method(&mut self, method: &ClassMethod) {
        method.key.visit_with(self);
        self.enter(NodeKind::Method, method.span);
        method.function.visit_with(self);
        self.exit();
    }

    fn visit_private_method(&mut self, method: &PrivateMethod) {
        self.enter(NodeKind::Method, method.span);
        method.function.visit_with(self);
        self.exit();
    }

    fn visit_method_prop(&mut self, method: &MethodProp) {
        method.key.visit_with(self);
        self.enter(NodeKind::Method, method.function.span);
        method.function.visit_with(self);
        self.exit();
    }

    fn visit_constructor(&mut self, constructor: &Constructor) {
        self.enter(NodeKind::Method, constructor.span);
        let params: Vec<&Pat> = constructor
            .params
            .iter()
            .filter_map(|param| match param {
                ParamOrTsParamProp::Param(param) => Some(&param.pat),
                ParamOrTsParamProp::TsParamProp(_) => None,
            })
            .collect();
        self.visit_function_parts(params.iter().copied(), constructor.body.as_ref());
        self.exit();
    }

    fn visit_block_stmt(&mut self, block: &BlockStmt) {
        let id = self.enter(NodeKind::BlockStatement, block.span);
        if std::mem::take(&mut self.function_body) {
            if let Some(scope) = self.current_scope() {
                self.node_scopes.insert(id, scope);
            }
            block.stmts.visit_with(self);
        } else {
            self.push_scope(ScopeKind::Block);
            self.declare_lexical(&block.stmts);
            block.stmts.visit_with(self);
            self.pop_scope();
        }
        self.exit();
    }

    fn visit_for_stmt(&mut self, stmt: &ForStmt) {
        self.enter(NodeKind::ScopeStatement, stmt.span);
        self.push_scope(ScopeKind::Block);
        if let Some(VarDeclOrExpr::VarDecl(decl)) = &stmt.init {
            if decl.kind != VarDeclKind::Var {
                self.declare_var_decl(decl);
            }
        }
        stmt.visit_children_with(self);
        self.pop_scope();
        self.exit();
    }

    fn visit_for_in_stmt(&mut self, stmt: &ForInStmt) {
        self.enter(NodeKind::ScopeStatement, stmt.span);
        self.push_scope(ScopeKind::Block);
        if let ForHead::VarDecl(decl) = &stmt.left {
            if decl.kind != VarDeclKind::Var {
                self.declare_var_decl(decl);
            }
        }
        stmt.visit_children_with(self);
        self.pop_scope();
        self.exit();
    }

    fn visit_for_of_stmt(&mut self, stmt: &ForOfStmt) {
        self.enter(NodeKind::ScopeStatement, stmt.span);
        self.push_scope(ScopeKind::Block);
        if let ForHead::VarDecl(decl) = &stmt.left {
            if decl.kind != VarDeclKind::Var {
                self.declare_var_decl(decl);
            }
        }
        stmt.visit_children_with(self);
        self.pop_scope();
        self.exit();
    }

    fn visit_catch_clause(&mut self, clause: &CatchClause) {
        self.enter(NodeKind::ScopeStatement, clause.span);
        self.push_scope(ScopeKind::Block);
        if let Some(param) = &clause.param {
            self.declare_pattern(param, BindingKind::Catch);
        }
        clause.visit_children_with(self);
        self.pop_scope();
        self.exit();
    }

    fn visit_class_decl(&mut self, decl: &ClassDecl) {
        self.enter(
            NodeKind::ClassDecl {
                name: decl.ident.sym.to_string(),
            },
            decl.class.span,
        );
        decl.class.visit_with(self);
        self.exit();
    }

    fn visit_var_decl(&mut self, decl: &VarDecl) {
        self.enter(NodeKind::DeclarationStatement, decl.span);
        decl.visit_children_with(self);
        self.exit();
    }

    fn visit_var_declarator(&mut self, declarator: &VarDeclarator) {
        let function_init = matches!(
            declarator.init.as_deref(),
            Some(Expr::Arrow(_)) | Some(Expr::Fn(_))
        );
        self.enter(NodeKind::VariableDeclarator { function_init }, declarator.span);
        declarator.visit_children_with(self);
        self.exit();
    }

    fn visit_export_decl(&mut self, export: &ExportDecl) {
        self.enter(NodeKind::DeclarationStatement, export.span);
        export.visit_children_with(self);
        self.exit();
    }

    fn visit_export_default_decl(&mut self, export: &ExportDefaultDecl) {
        self.enter(NodeKind::DeclarationStatement, export.span);
        match &export.decl {
            // `export default class` and `export default function` declare components too
            DefaultDecl::Class(class) => {
                let name = class
                    .ident
                    .as_ref()
                    .map_or_else(|| "default".to_string(), |ident| ident.sym.to_string());
                self.enter(NodeKind::ClassDecl { name }, class.class.span);
                class.class.visit_with(self);
                self.exit();
            }
            DefaultDecl::Fn(function) => {
                let name = function
                    .ident
                    .as_ref()
                    .map_or_else(|| "default".to_string(), |ident| ident.sym.to_string());
                self.enter(NodeKind::FunctionDecl { name }, function.function.span);
                function.function.visit_with(self);
                self.exit();
            }
            other => other.visit_children_with(self),
        }
        self.exit();
    }

    fn visit_jsx_element(&mut self, element: &JSXElement) {
        self.enter(NodeKind::MarkupElement, element.span);
        element.visit_children_with(self);
        self.exit();
    }

    fn visit_jsx_fragment(&mut self, fragment: &JSXFragment) {
        self.enter(NodeKind::MarkupFragment, fragment.span);
        fragment.visit_children_with(self);
        self.exit();
    }

    fn visit_jsx_attr(&mut self, attr: &JSXAttr) {
        let name = match &attr.name {
            JSXAttrName::Ident(ident) => ident.sym.to_string(),
            JSXAttrName::JSXNamespacedName(namespaced) => {
                format!("{}:{}", namespaced.ns.sym, namespaced.name.sym)
            }
        };
        self.enter(NodeKind::MarkupAttribute { name }, attr.span);
        attr.value.visit_with(self);
        self.exit();
    }
}

/// Collects `var` names, skipping nested functions and classes
#[derive(Default)]
struct VarCollector {
    names: Vec<(String, Span)>,
}

impl Visit for VarCollector {
    fn visit_var_decl(&mut self, decl: &VarDecl) {
        if decl.kind == VarDeclKind::Var {
            for declarator in &decl.decls {
                pattern_names(&declarator.name, &mut self.names);
            }
        }
    }

    fn visit_function(&mut self, _: &Function) {}

    fn visit_arrow_expr(&mut self, _: &ArrowExpr) {}

    fn visit_class(&mut self, _: &Class) {}
}

/// Names bound by a pattern, including nested object/array patterns and rest elements
pub(crate) fn pattern_names(pat: &Pat, out: &mut Vec<(String, Span)>) {
    match pat {
        Pat::Ident(binding) => out.push((binding.id.sym.to_string(), binding.id.span)),
        Pat::Array(array) => {
            for element in array.elems.iter().flatten() {
                pattern_names(element, out);
            }
        }
        Pat::Rest(rest) => pattern_names(&rest.arg, out),
        Pat::Object(object) => {
            for prop in &object.props {
                match prop {
                    ObjectPatProp::KeyValue(key_value) => pattern_names(&key_value.value, out),
                    ObjectPatProp::Assign(assign) => {
                        out.push((assign.key.sym.to_string(), assign.key.span))
                    }
                    ObjectPatProp::Rest(rest) => pattern_names(&rest.arg, out),
                }
            }
        }
        Pat::Assign(assign) => pattern_names(&assign.left, out),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parse_document;
    use pretty_assertions::assert_eq;

    fn index(source: &str) -> SyntaxIndex {
        let document = parse_document(source).unwrap();
        SyntaxIndex::build(&document.module, document.start_pos())
    }

    fn find(index: &SyntaxIndex, source: &str, text: &str, kind: fn(&NodeKind) -> bool) -> NodeId {
        let start = source.find(text).unwrap();
        let target = ByteRange::new(start, start + text.len());
        index
            .nodes()
            .find(|(id, node)| kind(&node.kind) && index.range(*id) == target)
            .map(|(id, _)| id)
            .unwrap_or_else(|| panic!("no node for {}", text))
    }

    fn is_member(kind: &NodeKind) -> bool {
        matches!(kind, NodeKind::MemberAccess { .. })
    }

    fn is_ident(kind: &NodeKind) -> bool {
        matches!(kind, NodeKind::Identifier { .. })
    }

    #[test]
    fn test_outer_member_stops_before_iteration_method() {
        let source = "const x = a.items.map(i => i);";
        let index = index(source);

        let a = find(&index, source, "a", is_ident);
        let items = find(&index, source, "a.items", is_member);
        assert_eq!(index.outer_member(a), items);
        assert!(index.is_outer_member(items));

        let map = find(&index, source, "a.items.map", is_member);
        assert!(index.is_iteration_call(map));
    }

    #[test]
    fn test_outer_member_climbs_full_chain() {
        let source = "f(this.props.user.name);";
        let index = index(source);

        let this_props = find(&index, source, "this.props", is_member);
        let full = find(&index, source, "this.props.user.name", is_member);
        assert!(!index.is_outer_member(this_props));
        assert_eq!(index.outer_member(this_props), full);
        assert!(index.is_rooted_at_this(full));
    }

    #[test]
    fn test_bind_callee_is_function_binding() {
        let source = "g(this.handleClick.bind(this));";
        let index = index(source);

        let bind = find(&index, source, "this.handleClick.bind", is_member);
        assert!(index.is_function_binding(bind));
        assert!(index.is_outer_member(bind));
        let call = index.parent(bind).unwrap();
        assert_eq!(index.kind(call), &NodeKind::CallExpression);
    }

    #[test]
    fn test_reads_resolve_to_innermost_binding() {
        let source = "const item = 1;\nconst f = (item) => item + 1;\nitem;";
        let index = index(source);

        let arrow = index
            .nodes()
            .find(|(_, node)| node.kind == NodeKind::ArrowFunction)
            .map(|(id, _)| id)
            .unwrap();
        let scope = index.scope_of(arrow).unwrap();
        assert_eq!(index.scope(scope).params, vec![vec!["item".to_string()]]);
        let binding = index.scope(scope).binding("item").unwrap();
        assert_eq!(binding.kind, BindingKind::Param);
        assert_eq!(binding.references.len(), 1);
    }

    #[test]
    fn test_destructured_params_and_rest_are_bound() {
        let source = "function Card({ title, meta: { date }, ...rest }, [first, ...others]) {\n  return title;\n}";
        let index = index(source);

        let function = index
            .nodes()
            .find(|(_, node)| matches!(node.kind, NodeKind::FunctionDecl { .. }))
            .map(|(id, _)| id)
            .unwrap();
        let scope = index.scope(index.scope_of(function).unwrap());
        assert_eq!(
            scope.params,
            vec![
                vec!["title".to_string(), "date".to_string(), "rest".to_string()],
                vec!["first".to_string(), "others".to_string()],
            ]
        );
        assert_eq!(scope.binding("title").unwrap().references.len(), 1);
    }

    #[test]
    fn test_function_body_shares_function_scope() {
        let source = "function App() {\n  const a = 1;\n  { let b = a; }\n}";
        let index = index(source);

        let blocks: Vec<NodeId> = index
            .nodes()
            .filter(|(_, node)| node.kind == NodeKind::BlockStatement)
            .map(|(id, _)| id)
            .collect();
        assert_eq!(blocks.len(), 2);
        let function_scope = index.scope_of(blocks[0]).unwrap();
        assert_eq!(index.scope(function_scope).kind, ScopeKind::Function);
        assert!(index.scope(function_scope).binding("a").is_some());

        let inner = index.scope_of(blocks[1]).unwrap();
        assert_eq!(index.scope(inner).kind, ScopeKind::Block);
        assert_eq!(index.scope(inner).parent, Some(function_scope));
        assert_eq!(index.enclosing_scopes(blocks[1]), vec![function_scope]);
    }

    #[test]
    fn test_hoisted_var_is_function_scoped() {
        let source = "function f() {\n  if (x) { var hoisted = 1; }\n  return hoisted;\n}";
        let index = index(source);

        let function = index
            .nodes()
            .find(|(_, node)| matches!(node.kind, NodeKind::FunctionDecl { .. }))
            .map(|(id, _)| id)
            .unwrap();
        let scope = index.scope(index.scope_of(function).unwrap());
        let binding = scope.binding("hoisted").unwrap();
        assert_eq!(binding.kind, BindingKind::Var);
        assert_eq!(binding.references.len(), 1);
    }

    #[test]
    fn test_jsx_names_are_not_reads() {
        let source = "import Item from './Item';\nconst el = <Item title={title} />;";
        let index = index(source);

        let module = index.scope(ScopeId(0));
        assert_eq!(module.binding("Item").unwrap().references.len(), 0);
        assert!(index
            .nodes()
            .any(|(_, node)| node.kind == NodeKind::MarkupAttribute { name: "title".to_string() }));
    }

    #[test]
    fn test_shorthand_property_is_a_read() {
        let source = "const color = 'red';\nconst style = { color };";
        let index = index(source);

        let module = index.scope(ScopeId(0));
        let references = &module.binding("color").unwrap().references;
        assert_eq!(references.len(), 1);
        assert_eq!(
            index.kind(references[0]),
            &NodeKind::ShorthandProperty { name: "color".to_string() }
        );
    }

    #[test]
    fn test_computed_member_takes_object_name() {
        let source = "f(rows[index]);";
        let index = index(source);

        let member = find(&index, source, "rows[index]", is_member);
        assert_eq!(index.reference_name(member), Some("rows".to_string()));
        let index_ident = find(&index, source, "index", is_ident);
        assert_eq!(index.node(index_ident).role, ChildRole::Computed);
        assert_eq!(index.outer_member(index_ident), index_ident);
    }
}
