//! Semantic analysis: scope construction and type checking
//!
//! Walks the AST once, in source order. Declarations insert symbols into
//! the current scope; uses resolve names through the scope chain; every
//! expression gets a type, with [`Type::Null`] standing in when inference
//! failed. Errors accumulate as diagnostics; the pass itself never fails.
//!
//! Scope discipline: the program owns `global`; each class pushes
//! `class:<Name>`, each function or method `func:<name>`, each brace block
//! `block@<line>`. Pushes are paired with pops on all exit paths.

use crate::ast::{
    Block, ClassDecl, ClassMember, Expr, FunctionDecl, LogicalOp, Program, Span, Stmt, TypeAnn,
    UnaryOp,
};
use crate::diagnostics::Diagnostic;
use crate::symtab::{ScopeId, ScopeTree};
use crate::types::{ClassInfo, ClassRegistry, FunctionType, Type, assignable};

/// Everything the later stages need from the semantic pass
#[derive(Debug)]
pub struct Analysis {
    pub diagnostics: Vec<Diagnostic>,
    pub scopes: ScopeTree,
    pub classes: ClassRegistry,
}

impl Analysis {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Resolve a global function signature (builtins included)
    pub fn global_function(&self, name: &str) -> Option<&FunctionType> {
        match &self.scopes.lookup(self.scopes.root(), name)?.ty {
            Type::Function(ft) => Some(ft.as_ref()),
            _ => None,
        }
    }
}

pub struct SemanticAnalyzer {
    scopes: ScopeTree,
    current: ScopeId,
    classes: ClassRegistry,
    diagnostics: Vec<Diagnostic>,
    current_class: Option<String>,
    current_return: Option<Type>,
    in_function: bool,
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        let mut scopes = ScopeTree::new();
        let root = scopes.root();
        // runtime builtins; a `Null` formal accepts any argument type
        scopes.insert(
            root,
            "print",
            Type::function(Type::Void, vec![Type::Null]),
            false,
            None,
            None,
            false,
        );
        scopes.insert(
            root,
            "printInteger",
            Type::function(Type::Int, vec![Type::Int]),
            false,
            None,
            None,
            false,
        );
        scopes.insert(
            root,
            "printString",
            Type::function(Type::Void, vec![Type::Str]),
            false,
            None,
            None,
            false,
        );
        scopes.insert(
            root,
            "toString",
            Type::function(Type::Str, vec![Type::Int]),
            false,
            None,
            None,
            false,
        );
        let current = root;
        SemanticAnalyzer {
            scopes,
            current,
            classes: ClassRegistry::new(),
            diagnostics: Vec::new(),
            current_class: None,
            current_return: None,
            in_function: false,
        }
    }

    /// Run the pass over a program. Any internal panic is caught and
    /// reported as a warning diagnostic; partial results are kept.
    pub fn analyze(program: &Program) -> Analysis {
        let mut analyzer = SemanticAnalyzer::new();
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            for stmt in &program.stmts {
                analyzer.visit_stmt(stmt);
            }
        }));
        if outcome.is_err() {
            tracing::warn!("semantic analysis aborted by internal failure");
            analyzer.diagnostics.push(Diagnostic::warning_unlocated(
                "semantic analysis aborted by an internal failure; results are partial",
            ));
        }
        Analysis {
            diagnostics: analyzer.diagnostics,
            scopes: analyzer.scopes,
            classes: analyzer.classes,
        }
    }

    // ---- helpers ----

    fn error(&mut self, span: Span, message: impl Into<String>) {
        self.diagnostics
            .push(Diagnostic::error(span.line, span.column, message));
    }

    fn push_scope(&mut self, label: String) {
        self.current = self.scopes.push(self.current, label);
    }

    fn pop_scope(&mut self) {
        if let Some(parent) = self.scopes.parent(self.current) {
            self.current = parent;
        }
    }

    /// Resolve a type annotation; `None` when the base name is unknown
    fn resolve_type_ann(&self, ann: &TypeAnn) -> Option<Type> {
        let base = match ann.name.as_str() {
            "integer" => Type::Int,
            "float" => Type::Float,
            "boolean" => Type::Bool,
            "string" => Type::Str,
            "void" => Type::Void,
            name if self.classes.contains(name) => Type::Class(name.to_string()),
            _ => return None,
        };
        let mut ty = base;
        for _ in 0..ann.dims {
            ty = Type::array(ty);
        }
        Some(ty)
    }

    /// Argument compatibility: a `Null` formal is a wildcard, otherwise
    /// normal assignability (identity plus `int -> float`).
    fn arg_compatible(expected: &Type, actual: &Type) -> bool {
        *expected == Type::Null || assignable(expected, actual)
    }

    /// Resolve an identifier read. Falls back to a field of the enclosing
    /// class inside methods, so bare field names type-check the same way
    /// the lowering treats them (`this.<field>`).
    fn lookup_value(&self, name: &str) -> Option<Type> {
        if let Some(sym) = self.scopes.lookup(self.current, name) {
            return Some(sym.ty.clone());
        }
        if self.in_function
            && let Some(class) = &self.current_class
            && let Some(ty) = self.classes.field_type(class, name)
        {
            return Some(ty.clone());
        }
        None
    }

    // ---- statements ----

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Let {
                name,
                ty,
                init,
                is_const,
                span,
            } => self.visit_let(name, ty.as_ref(), init.as_ref(), *is_const, *span),
            Stmt::Assign {
                target,
                value,
                span,
            } => self.visit_assign(target, value, *span),
            Stmt::Expr(e) => {
                self.visit_expr(e);
            }
            Stmt::Block(block) => self.visit_block(block),
            Stmt::If {
                cond,
                then_block,
                else_block,
                span,
            } => {
                let cond_ty = self.visit_expr(cond);
                if cond_ty != Type::Bool {
                    self.error(
                        *span,
                        format!(
                            "The condition of an 'if' must be boolean, but got '{}'.",
                            cond_ty
                        ),
                    );
                }
                self.visit_block(then_block);
                if let Some(eb) = else_block {
                    self.visit_block(eb);
                }
            }
            Stmt::While { cond, body, span } => {
                let cond_ty = self.visit_expr(cond);
                if cond_ty != Type::Bool {
                    self.error(
                        *span,
                        format!(
                            "The condition of a 'while' must be boolean, but got '{}'.",
                            cond_ty
                        ),
                    );
                }
                self.visit_block(body);
            }
            Stmt::DoWhile { body, cond, span } => {
                self.visit_block(body);
                let cond_ty = self.visit_expr(cond);
                if cond_ty != Type::Bool {
                    self.error(
                        *span,
                        format!(
                            "The condition of a 'do-while' must be boolean, but got '{}'.",
                            cond_ty
                        ),
                    );
                }
            }
            Stmt::For {
                init,
                cond,
                step,
                body,
                span,
            } => {
                // the init declaration lives in its own scope around the loop
                self.push_scope(format!("block@{}", span.line));
                if let Some(init) = init {
                    self.visit_stmt(init);
                }
                if let Some(cond) = cond {
                    let cond_ty = self.visit_expr(cond);
                    if cond_ty != Type::Bool {
                        self.error(
                            *span,
                            format!(
                                "The condition of a 'for' must be boolean, but got '{}'.",
                                cond_ty
                            ),
                        );
                    }
                }
                if let Some(step) = step {
                    self.visit_stmt(step);
                }
                self.visit_block(body);
                self.pop_scope();
            }
            Stmt::Switch {
                selector,
                cases,
                default,
                span: _,
            } => {
                let sel_ty = self.visit_expr(selector);
                for case in cases {
                    let case_ty = self.visit_expr(&case.value);
                    let comparable = case_ty == sel_ty
                        || (case_ty.is_numeric() && sel_ty.is_numeric());
                    if !comparable {
                        self.error(
                            case.span,
                            format!(
                                "Switch case value type '{}' does not match selector type '{}'.",
                                case_ty, sel_ty
                            ),
                        );
                    }
                    for s in &case.body {
                        self.visit_stmt(s);
                    }
                }
                if let Some(default) = default {
                    for s in default {
                        self.visit_stmt(s);
                    }
                }
            }
            Stmt::Break(_) | Stmt::Continue(_) => {}
            Stmt::Return { value, span } => self.visit_return(value.as_ref(), *span),
            Stmt::Function(decl) => self.visit_function(decl),
            Stmt::Class(decl) => self.visit_class(decl),
        }
    }

    fn visit_block(&mut self, block: &Block) {
        self.push_scope(format!("block@{}", block.span.line));
        for stmt in &block.stmts {
            self.visit_stmt(stmt);
        }
        self.pop_scope();
    }

    fn visit_let(
        &mut self,
        name: &str,
        ann: Option<&TypeAnn>,
        init: Option<&Expr>,
        is_const: bool,
        span: Span,
    ) {
        if is_const {
            if init.is_none() {
                self.error(span, format!("The constant '{}' must be initialized.", name));
                return;
            }
            if ann.is_none() {
                self.error(
                    span,
                    format!(
                        "The constant '{}' must have an explicit type annotation.",
                        name
                    ),
                );
                return;
            }
        }

        let mut declared = match ann {
            Some(a) => match self.resolve_type_ann(a) {
                Some(t) => Some(t),
                None => {
                    self.error(a.span, format!("Unknown type '{}'.", a.name));
                    return;
                }
            },
            None => None,
        };

        let init_ty = init.map(|e| self.visit_expr(e));
        if let Some(init_ty) = &init_ty {
            match &declared {
                None => declared = Some(init_ty.clone()),
                Some(decl_ty) => {
                    if *init_ty != Type::Null && !assignable(decl_ty, init_ty) {
                        if is_const {
                            self.error(
                                span,
                                format!(
                                    "Incompatible type for constant '{}'. Expected '{}' but got '{}'.",
                                    name, decl_ty, init_ty
                                ),
                            );
                        } else {
                            self.error(
                                span,
                                format!(
                                    "Cannot assign type '{}' to variable of type '{}'.",
                                    init_ty, decl_ty
                                ),
                            );
                        }
                    }
                }
            }
        }

        let Some(declared) = declared else {
            self.error(
                span,
                format!("Could not determine the type of variable '{}'.", name),
            );
            return;
        };

        // same-scope redeclarations are silently renamed inside insert
        self.scopes.insert(
            self.current,
            name,
            declared,
            is_const,
            Some(span.line),
            Some(span.column),
            false,
        );
    }

    fn visit_assign(&mut self, target: &Expr, value: &Expr, span: Span) {
        let target_ty = match target {
            Expr::Ident(name, ispan) => {
                let resolved = self
                    .scopes
                    .lookup(self.current, name)
                    .map(|s| (s.ty.clone(), s.is_const));
                if let Some((ty, is_const)) = resolved {
                    if is_const {
                        self.error(*ispan, format!("Cannot assign to constant '{}'.", name));
                    }
                    ty
                } else if let Some(ty) = self.lookup_value(name) {
                    // bare field name inside a method: assignment goes to this.<name>
                    ty
                } else {
                    self.error(*ispan, format!("'{}' has not been declared.", name));
                    Type::Null
                }
            }
            Expr::Property { .. } | Expr::Index { .. } => self.visit_expr(target),
            other => {
                self.error(other.span(), "invalid assignment target".to_string());
                Type::Null
            }
        };

        let value_ty = self.visit_expr(value);
        if target_ty != Type::Null
            && value_ty != Type::Null
            && !assignable(&target_ty, &value_ty)
        {
            self.error(
                span,
                format!(
                    "Cannot assign type '{}' to variable of type '{}'.",
                    value_ty, target_ty
                ),
            );
        }
    }

    fn visit_return(&mut self, value: Option<&Expr>, span: Span) {
        let Some(expected) = self.current_return.clone() else {
            self.error(span, "'return' statement found outside of a function.");
            return;
        };
        match value {
            Some(expr) => {
                let returned = self.visit_expr(expr);
                if expected == Type::Void {
                    self.error(span, "A 'void' function cannot return a value.");
                } else if returned != Type::Null && !assignable(&expected, &returned) {
                    self.error(
                        span,
                        format!(
                            "Return type mismatch. Expected '{}' but returned '{}'.",
                            expected, returned
                        ),
                    );
                }
            }
            None => {
                if expected != Type::Void {
                    self.error(
                        span,
                        format!("A function of type '{}' must return a value.", expected),
                    );
                }
            }
        }
    }

    /// Build a signature from a declaration's annotations
    fn signature_of(&mut self, decl: &FunctionDecl) -> FunctionType {
        let return_type = decl
            .return_type
            .as_ref()
            .and_then(|a| self.resolve_type_ann(a))
            .unwrap_or(Type::Void);
        let param_types = decl
            .params
            .iter()
            .map(|p| match self.resolve_type_ann(&p.ty) {
                Some(t) => t,
                None => {
                    self.error(p.ty.span, format!("Unknown type '{}'.", p.ty.name));
                    Type::Null
                }
            })
            .collect();
        FunctionType::new(return_type, param_types)
    }

    fn visit_function(&mut self, decl: &FunctionDecl) {
        let sig = self.signature_of(decl);
        self.scopes.insert(
            self.current,
            &decl.name,
            Type::Function(Box::new(sig.clone())),
            false,
            Some(decl.span.line),
            Some(decl.span.column),
            false,
        );
        self.enter_function_body(decl, &sig);
    }

    /// Push the function scope, bind parameters (and `this` for methods),
    /// and check the body.
    fn enter_function_body(&mut self, decl: &FunctionDecl, sig: &FunctionType) {
        let prev_return = self.current_return.replace(sig.return_type.clone());
        let prev_in_function = self.in_function;
        self.in_function = true;

        self.push_scope(format!("func:{}", decl.name));
        if decl.is_method
            && let Some(class) = self.current_class.clone()
        {
            self.scopes.insert(
                self.current,
                "this",
                Type::Class(class),
                false,
                Some(decl.span.line),
                Some(decl.span.column),
                false,
            );
        }
        for (param, ty) in decl.params.iter().zip(&sig.param_types) {
            self.scopes.insert(
                self.current,
                &param.name,
                ty.clone(),
                false,
                Some(param.span.line),
                Some(param.span.column),
                true,
            );
        }
        self.visit_block(&decl.body);
        self.pop_scope();

        self.in_function = prev_in_function;
        self.current_return = prev_return;
    }

    fn visit_class(&mut self, decl: &ClassDecl) {
        if let Some(base) = &decl.base
            && !self.classes.contains(base)
        {
            self.error(
                decl.span,
                format!("Base class '{}' has not been declared.", base),
            );
        }
        if !self.classes.contains(&decl.name) {
            self.classes
                .declare(ClassInfo::new(decl.name.clone(), decl.base.clone()));
        }

        let prev_class = self.current_class.replace(decl.name.clone());
        self.push_scope(format!("class:{}", decl.name));

        for member in &decl.members {
            match member {
                ClassMember::Field { name, ty, span } => {
                    let Some(field_ty) = self.resolve_type_ann(ty) else {
                        self.error(
                            *span,
                            format!("Could not determine the type of field '{}'.", name),
                        );
                        continue;
                    };
                    if let Some(info) = self.classes.get_mut(&decl.name) {
                        info.fields.insert(name.clone(), field_ty.clone());
                    }
                    self.scopes.insert(
                        self.current,
                        name,
                        field_ty,
                        false,
                        Some(span.line),
                        Some(span.column),
                        false,
                    );
                }
                ClassMember::Method(method) => {
                    // no constructor overloads: later ones are dropped whole,
                    // with no symbol and no body visit
                    let already_has_constructor = self
                        .classes
                        .get(&decl.name)
                        .is_some_and(ClassInfo::has_constructor);
                    if method.is_constructor() && already_has_constructor {
                        continue;
                    }

                    let sig = self.signature_of(method);
                    let duplicate = self
                        .classes
                        .get(&decl.name)
                        .is_some_and(|c| c.methods.contains_key(&method.name));
                    if duplicate {
                        self.error(
                            method.span,
                            format!(
                                "Method '{}' has already been declared in this class.",
                                method.name
                            ),
                        );
                    } else {
                        if let Some(info) = self.classes.get_mut(&decl.name) {
                            info.methods.insert(method.name.clone(), sig.clone());
                        }
                        self.scopes.insert(
                            self.current,
                            &method.name,
                            Type::Function(Box::new(sig.clone())),
                            false,
                            Some(method.span.line),
                            Some(method.span.column),
                            false,
                        );
                    }
                    self.enter_function_body(method, &sig);
                }
            }
        }

        self.pop_scope();
        self.current_class = prev_class;
    }

    // ---- expressions ----

    fn visit_expr(&mut self, expr: &Expr) -> Type {
        match expr {
            Expr::Int(..) => Type::Int,
            Expr::Float(..) => Type::Float,
            Expr::Bool(..) => Type::Bool,
            Expr::Str(..) => Type::Str,
            Expr::Null(_) => Type::Null,
            Expr::Array(elems, _) => self.infer_array_literal(elems),
            Expr::Ident(name, span) => match self.lookup_value(name) {
                Some(ty) => ty,
                None => {
                    self.error(*span, format!("'{}' has not been declared.", name));
                    Type::Null
                }
            },
            Expr::This(span) => match &self.current_class {
                Some(class) => Type::Class(class.clone()),
                None => {
                    self.error(*span, "'this' used outside of a class.");
                    Type::Null
                }
            },
            Expr::Unary { op, operand, span } => {
                let ty = self.visit_expr(operand);
                match op {
                    UnaryOp::Neg => {
                        if !ty.is_numeric() {
                            self.error(
                                *span,
                                format!("Unary '-' requires a numeric operand, got '{}'.", ty),
                            );
                            return Type::Null;
                        }
                        ty
                    }
                    UnaryOp::Not => {
                        if ty != Type::Bool {
                            self.error(
                                *span,
                                format!("Unary '!' requires a boolean operand, got '{}'.", ty),
                            );
                        }
                        Type::Bool
                    }
                }
            }
            Expr::Binary { op, lhs, rhs, span } => self.visit_binary(*op, lhs, rhs, *span),
            Expr::Logical { op, terms, span } => {
                let op_text = match op {
                    LogicalOp::And => "&&",
                    LogicalOp::Or => "||",
                };
                for term in terms {
                    let ty = self.visit_expr(term);
                    if ty != Type::Bool {
                        self.error(
                            *span,
                            format!(
                                "Operator '{}' requires boolean operands. Got '{}'.",
                                op_text, ty
                            ),
                        );
                    }
                }
                Type::Bool
            }
            Expr::Call { callee, args, span } => self.visit_call(callee, args, *span),
            Expr::Property {
                object,
                field,
                span,
            } => {
                let recv = self.visit_expr(object);
                match recv {
                    Type::Class(class) => match self.classes.field_type(&class, field) {
                        Some(ty) => ty.clone(),
                        None => {
                            self.error(
                                *span,
                                format!("Field '{}' does not exist in '{}'.", field, class),
                            );
                            Type::Null
                        }
                    },
                    Type::Null => Type::Null,
                    other => {
                        self.error(
                            *span,
                            format!("Cannot access '.{}' on type '{}'.", field, other),
                        );
                        Type::Null
                    }
                }
            }
            Expr::Index {
                object,
                index,
                span,
            } => {
                let obj_ty = self.visit_expr(object);
                let idx_ty = self.visit_expr(index);
                if idx_ty != Type::Int && idx_ty != Type::Null {
                    self.error(
                        *span,
                        format!("Array index must be an integer, got '{}'.", idx_ty),
                    );
                }
                match obj_ty {
                    Type::Array(elem) => *elem,
                    Type::Null => Type::Null,
                    other => {
                        self.error(*span, format!("Cannot index type '{}'.", other));
                        Type::Null
                    }
                }
            }
            Expr::New { class, args, span } => {
                if !self.classes.contains(class) {
                    self.error(*span, format!("Class '{}' has not been declared.", class));
                    return Type::Null;
                }
                if let Some(ctor) = self.classes.method(class, "constructor").cloned() {
                    self.check_args(&format!("{}.constructor", class), &ctor, args, *span);
                } else {
                    for arg in args {
                        self.visit_expr(arg);
                    }
                }
                Type::Class(class.clone())
            }
        }
    }

    fn visit_binary(&mut self, op: crate::ast::BinOp, lhs: &Expr, rhs: &Expr, span: Span) -> Type {
        use crate::ast::BinOp::*;
        let lt = self.visit_expr(lhs);
        let rt = self.visit_expr(rhs);
        match op {
            Add => {
                if lt == Type::Str && rt == Type::Str {
                    return Type::Str;
                }
                if !(lt.is_numeric() && rt.is_numeric()) {
                    self.error(
                        span,
                        format!(
                            "Arithmetic operation ('+') is only valid between numbers. Got '{}' and '{}'.",
                            lt, rt
                        ),
                    );
                    return Type::Null;
                }
                if lt == Type::Float || rt == Type::Float {
                    Type::Float
                } else {
                    Type::Int
                }
            }
            Sub | Mul | Div | Mod => {
                if !(lt.is_numeric() && rt.is_numeric()) {
                    self.error(
                        span,
                        format!(
                            "Arithmetic operation ('{}') is only valid between integers/floats. Got '{}' and '{}'.",
                            op.symbol(),
                            lt,
                            rt
                        ),
                    );
                    return Type::Null;
                }
                if lt == Type::Float || rt == Type::Float {
                    Type::Float
                } else {
                    Type::Int
                }
            }
            Lt | Le | Gt | Ge => {
                if !(lt.is_numeric() && rt.is_numeric()) {
                    self.error(
                        span,
                        format!(
                            "Relational operators (<, <=, >, >=) only apply to numbers. Got '{}' and '{}'.",
                            lt, rt
                        ),
                    );
                }
                Type::Bool
            }
            Eq | Ne => {
                let compatible = lt == rt || (lt.is_numeric() && rt.is_numeric());
                if !compatible {
                    self.error(
                        span,
                        format!(
                            "Comparison '==' or '!=' between incompatible types: '{}' and '{}'.",
                            lt, rt
                        ),
                    );
                }
                Type::Bool
            }
        }
    }

    fn visit_call(&mut self, callee: &Expr, args: &[Expr], span: Span) -> Type {
        match callee {
            Expr::Ident(name, ispan) => {
                let Some(sym) = self.scopes.lookup(self.current, name) else {
                    self.error(*ispan, format!("Function '{}' has not been declared.", name));
                    for arg in args {
                        self.visit_expr(arg);
                    }
                    return Type::Null;
                };
                let Type::Function(sig) = sym.ty.clone() else {
                    self.error(
                        *ispan,
                        format!("'{}' is not a function and cannot be called.", name),
                    );
                    return Type::Null;
                };
                self.check_args(name, &sig, args, span)
            }
            Expr::Property { object, field, .. } => {
                let recv = self.visit_expr(object);
                let class = match recv {
                    Type::Class(c) => c,
                    Type::Null => return Type::Null,
                    other => {
                        self.error(
                            span,
                            format!("Cannot call '{}' on type '{}'.", field, other),
                        );
                        return Type::Null;
                    }
                };
                let sig = match self.classes.method(&class, field).cloned() {
                    Some(sig) => sig,
                    None => {
                        self.error(
                            span,
                            format!("Method '{}' does not exist in '{}'.", field, class),
                        );
                        FunctionType::new(Type::Void, vec![])
                    }
                };
                let label = format!("{}.{}", class, field);
                self.check_args(&label, &sig, args, span)
            }
            other => {
                self.error(other.span(), "invalid call target".to_string());
                Type::Null
            }
        }
    }

    /// Arity and per-argument compatibility; returns the callee return type
    fn check_args(&mut self, name: &str, sig: &FunctionType, args: &[Expr], span: Span) -> Type {
        let sig = sig.clone();
        if sig.param_types.len() != args.len() {
            self.error(
                span,
                format!(
                    "Function '{}' expected {} arguments, but received {}.",
                    name,
                    sig.param_types.len(),
                    args.len()
                ),
            );
            return sig.return_type;
        }
        for (i, (arg, expected)) in args.iter().zip(&sig.param_types).enumerate() {
            let actual = self.visit_expr(arg);
            if actual != Type::Null && !Self::arg_compatible(expected, &actual) {
                self.error(
                    arg.span(),
                    format!(
                        "Argument {} of '{}' is incorrect. Expected '{}', but got '{}'.",
                        i + 1,
                        name,
                        expected,
                        actual
                    ),
                );
            }
        }
        sig.return_type
    }

    /// Element type of an array literal: all-equal wins, a numeric mix
    /// widens to float, anything else collapses to null.
    fn infer_array_literal(&mut self, elems: &[Expr]) -> Type {
        if elems.is_empty() {
            return Type::array(Type::Null);
        }
        let mut elem_ty = self.visit_expr(&elems[0]);
        for e in &elems[1..] {
            let ty = self.visit_expr(e);
            if ty == elem_ty {
                continue;
            }
            if ty.is_numeric() && elem_ty.is_numeric() {
                elem_ty = Type::Float;
            } else {
                elem_ty = Type::Null;
                break;
            }
        }
        Type::array(elem_ty)
    }
}
