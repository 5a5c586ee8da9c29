//! Three-address code generation
//!
//! Walks the AST and emits TAC lines whose execution is semantically
//! equivalent to the input program. Temporaries come from a LIFO pool and
//! are freed right after their last use; n-ary operator chains fold into an
//! in-place accumulator to keep temporary pressure bounded. The emitted
//! text is later re-parsed into quadruples by [`crate::tac`].
//!
//! Conventions:
//! - functions: `FUNC <name>_START:`, `BeginFunc <name> <arity>`,
//!   `ActivationRecord <name>`, parameter loads, body, `EndFunc`
//! - methods reserve the last argument slot for the receiver; the receiver
//!   is pushed as the last `Param` at call sites
//! - constructors store every parameter into its same-named field right
//!   after the parameter loads
//! - statements outside any function are wrapped into a synthetic entry
//!   function so the program has a single well-known entry point

use crate::ast::{
    BinOp, Block, ClassMember, Expr, FunctionDecl, LogicalOp, Program, Stmt, UnaryOp,
};
use crate::semantic::Analysis;
use crate::types::Type;
use std::collections::HashMap;

/// LIFO pool of temporary names `t1, t2, ...`
#[derive(Debug, Default)]
pub struct TempPool {
    free: Vec<usize>,
    next: usize,
}

impl TempPool {
    pub fn new() -> Self {
        TempPool::default()
    }

    /// Top of the free list, or a fresh index
    pub fn alloc(&mut self) -> String {
        match self.free.pop() {
            Some(i) => format!("t{}", i),
            None => {
                self.next += 1;
                format!("t{}", self.next)
            }
        }
    }

    /// Return a temporary to the pool; non-temporaries are ignored
    pub fn free(&mut self, name: &str) {
        if let Some(i) = Self::temp_index(name) {
            if !self.free.contains(&i) {
                self.free.push(i);
            }
        }
    }

    fn temp_index(name: &str) -> Option<usize> {
        let rest = name.strip_prefix('t')?;
        if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        rest.parse().ok()
    }

    pub fn is_temp(name: &str) -> bool {
        Self::temp_index(name).is_some()
    }
}

/// Monotonically increasing label names `L1, L2, ...`
#[derive(Debug, Default)]
pub struct LabelGen {
    next: usize,
}

impl LabelGen {
    pub fn fresh(&mut self) -> String {
        self.next += 1;
        format!("L{}", self.next)
    }
}

pub struct TacGenerator<'a> {
    analysis: &'a Analysis,
    lines: Vec<String>,
    temps: TempPool,
    labels: LabelGen,
    break_stack: Vec<String>,
    continue_stack: Vec<String>,
    /// Per-function map from parameter name to its `p_<name>` alias
    param_aliases: HashMap<String, String>,
    /// Names declared as locals so far in the current function; a bare
    /// identifier that is neither a parameter nor a local but matches a
    /// field of the enclosing class resolves to `this.<name>`
    seen_locals: std::collections::HashSet<String>,
    current_class: Option<String>,
    in_method: bool,
}

impl<'a> TacGenerator<'a> {
    pub fn new(analysis: &'a Analysis) -> Self {
        TacGenerator {
            analysis,
            lines: Vec::new(),
            temps: TempPool::new(),
            labels: LabelGen::default(),
            break_stack: Vec::new(),
            continue_stack: Vec::new(),
            param_aliases: HashMap::new(),
            seen_locals: std::collections::HashSet::new(),
            current_class: None,
            in_method: false,
        }
    }

    /// Generate the full TAC text for a program. Declared functions and
    /// methods come first; remaining top-level statements form the body of
    /// the synthetic entry function.
    pub fn generate(analysis: &'a Analysis, program: &Program, entry: &str) -> String {
        let mut generator = TacGenerator::new(analysis);
        for stmt in &program.stmts {
            match stmt {
                Stmt::Function(decl) => generator.lower_function(decl, None),
                Stmt::Class(decl) => generator.lower_class(decl),
                _ => {}
            }
        }
        generator.lower_entry(program, entry);
        generator.lines.join("\n")
    }

    fn emit(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    fn free_operand(&mut self, op: &str) {
        self.temps.free(op);
    }

    /// `if <src> == 0 goto <label>` when the operand is identifier-shaped,
    /// the `IfZ` spelling otherwise (literals survive both forms).
    fn emit_ifz(&mut self, src: &str, label: &str) {
        let ident_like = src
            .chars()
            .next()
            .is_some_and(|c| c.is_alphabetic() || c == '_')
            && src.chars().all(|c| c.is_alphanumeric() || c == '_');
        if ident_like {
            self.emit(format!("if {} == 0 goto {}", src, label));
        } else {
            self.emit(format!("IfZ {} goto {}", src, label));
        }
    }

    // ---- declarations ----

    fn lower_class(&mut self, decl: &crate::ast::ClassDecl) {
        let prev = self.current_class.replace(decl.name.clone());
        let mut seen_constructor = false;
        for member in &decl.members {
            if let ClassMember::Method(method) = member {
                if method.is_constructor() {
                    // at most one constructor: later ones are dropped whole
                    if seen_constructor {
                        continue;
                    }
                    seen_constructor = true;
                }
                self.lower_function(method, Some(&decl.name));
            }
        }
        self.current_class = prev;
    }

    fn lower_function(&mut self, decl: &FunctionDecl, class: Option<&str>) {
        let prev_aliases = std::mem::take(&mut self.param_aliases);
        let prev_locals = std::mem::take(&mut self.seen_locals);
        let prev_in_method = self.in_method;
        self.in_method = decl.is_method && class.is_some();
        self.temps = TempPool::new();

        let arity = decl.params.len() + usize::from(self.in_method);
        let name = &decl.name;
        self.emit(format!("FUNC {}_START:", name));
        self.emit(format!("BeginFunc {} {}", name, arity));
        self.emit(format!("ActivationRecord {}", name));

        for (i, param) in decl.params.iter().enumerate() {
            let alias = format!("p_{}", param.name);
            self.emit(format!("{} = LoadParam {}", alias, i));
            self.param_aliases.insert(param.name.clone(), alias);
        }
        if self.in_method {
            self.emit(format!("this = LoadParam {}", arity - 1));
        }
        if decl.is_constructor() {
            for param in &decl.params {
                self.emit(format!("setprop this, {}, p_{}", param.name, param.name));
            }
        }

        for stmt in &decl.body.stmts {
            self.lower_stmt(stmt);
        }
        let fell_through = self
            .lines
            .last()
            .is_none_or(|l| !l.trim_start().starts_with("return"));
        if fell_through {
            self.emit("return");
        }
        self.emit("EndFunc");

        self.param_aliases = prev_aliases;
        self.seen_locals = prev_locals;
        self.in_method = prev_in_method;
    }

    fn lower_entry(&mut self, program: &Program, entry: &str) {
        self.param_aliases.clear();
        self.seen_locals.clear();
        self.in_method = false;
        self.temps = TempPool::new();

        self.emit(format!("FUNC {}_START:", entry));
        self.emit(format!("BeginFunc {} 0", entry));
        self.emit(format!("ActivationRecord {}", entry));
        for stmt in &program.stmts {
            if !matches!(stmt, Stmt::Function(_) | Stmt::Class(_)) {
                self.lower_stmt(stmt);
            }
        }
        if self
            .lines
            .last()
            .is_none_or(|l| !l.trim_start().starts_with("return"))
        {
            self.emit("return");
        }
        self.emit("EndFunc");
    }

    // ---- statements ----

    fn lower_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Let { name, init, .. } => {
                self.seen_locals.insert(name.clone());
                if let Some(init) = init {
                    let op = self.lower_expr(init);
                    self.emit(format!("{} = {}", name, op));
                    self.free_operand(&op);
                }
            }
            Stmt::Assign { target, value, .. } => self.lower_assign(target, value),
            Stmt::Expr(e) => {
                let op = self.lower_expr(e);
                self.free_operand(&op);
            }
            Stmt::Block(block) => self.lower_block(block),
            Stmt::If {
                cond,
                then_block,
                else_block,
                ..
            } => self.lower_if(cond, then_block, else_block.as_ref()),
            Stmt::While { cond, body, .. } => self.lower_while(cond, body),
            Stmt::DoWhile { body, cond, .. } => self.lower_do_while(body, cond),
            Stmt::For {
                init,
                cond,
                step,
                body,
                ..
            } => self.lower_for(init.as_deref(), cond.as_ref(), step.as_deref(), body),
            Stmt::Switch {
                selector,
                cases,
                default,
                ..
            } => self.lower_switch(selector, cases, default.as_deref()),
            Stmt::Break(_) => match self.break_stack.last().cloned() {
                Some(label) => self.emit(format!("goto {}", label)),
                None => self.emit("# break outside of a loop"),
            },
            Stmt::Continue(_) => match self.continue_stack.last().cloned() {
                Some(label) => self.emit(format!("goto {}", label)),
                None => self.emit("# continue outside of a loop"),
            },
            Stmt::Return { value, .. } => match value {
                Some(e) => {
                    let op = self.lower_expr(e);
                    self.emit(format!("return {}", op));
                    self.free_operand(&op);
                }
                None => self.emit("return"),
            },
            Stmt::Function(decl) => {
                self.emit(format!("# nested function '{}' not supported", decl.name));
            }
            Stmt::Class(_) => {}
        }
    }

    fn lower_block(&mut self, block: &Block) {
        for stmt in &block.stmts {
            self.lower_stmt(stmt);
        }
    }

    fn lower_assign(&mut self, target: &Expr, value: &Expr) {
        match target {
            Expr::Ident(name, _) => {
                let src = self.lower_expr(value);
                if let Some(alias) = self.param_aliases.get(name).cloned() {
                    self.emit(format!("{} = {}", alias, src));
                } else if !self.seen_locals.contains(name) && self.is_field_of_current_class(name) {
                    // bare field name on the LHS inside a method: this.<f>
                    self.emit(format!("setprop this, {}, {}", name, src));
                } else {
                    self.emit(format!("{} = {}", name, src));
                }
                self.free_operand(&src);
            }
            Expr::Property { object, field, .. } => {
                let obj = self.lower_expr(object);
                let src = self.lower_expr(value);
                self.emit(format!("setprop {}, {}, {}", obj, field, src));
                self.free_operand(&src);
                self.free_operand(&obj);
            }
            Expr::Index { .. } => {
                self.emit("# array element assignment not supported");
            }
            _ => self.emit("# invalid assignment target"),
        }
    }

    fn is_field_of_current_class(&self, name: &str) -> bool {
        self.in_method
            && self
                .current_class
                .as_deref()
                .is_some_and(|c| self.analysis.classes.field_type(c, name).is_some())
    }

    fn lower_if(&mut self, cond: &Expr, then_block: &Block, else_block: Option<&Block>) {
        let c = self.lower_expr(cond);
        match else_block {
            Some(else_block) => {
                let l_else = self.labels.fresh();
                let l_end = self.labels.fresh();
                self.emit_ifz(&c, &l_else);
                self.free_operand(&c);
                self.lower_block(then_block);
                self.emit(format!("goto {}", l_end));
                self.emit(format!("{}:", l_else));
                self.lower_block(else_block);
                self.emit(format!("{}:", l_end));
            }
            None => {
                let l_end = self.labels.fresh();
                self.emit_ifz(&c, &l_end);
                self.free_operand(&c);
                self.lower_block(then_block);
                self.emit(format!("{}:", l_end));
            }
        }
    }

    fn lower_while(&mut self, cond: &Expr, body: &Block) {
        let l_begin = self.labels.fresh();
        let l_end = self.labels.fresh();
        self.emit(format!("{}:", l_begin));
        let c = self.lower_expr(cond);
        self.emit_ifz(&c, &l_end);
        self.free_operand(&c);
        self.break_stack.push(l_end.clone());
        self.continue_stack.push(l_begin.clone());
        self.lower_block(body);
        self.break_stack.pop();
        self.continue_stack.pop();
        self.emit(format!("goto {}", l_begin));
        self.emit(format!("{}:", l_end));
    }

    fn lower_do_while(&mut self, body: &Block, cond: &Expr) {
        let l_begin = self.labels.fresh();
        let l_cond = self.labels.fresh();
        let l_end = self.labels.fresh();
        self.emit(format!("{}:", l_begin));
        self.break_stack.push(l_end.clone());
        self.continue_stack.push(l_cond.clone());
        self.lower_block(body);
        self.break_stack.pop();
        self.continue_stack.pop();
        self.emit(format!("{}:", l_cond));
        // loop back while the condition holds: IfZ on the negation
        let c = self.lower_expr(cond);
        let t = self.temps.alloc();
        self.emit(format!("{} = {} == 0", t, c));
        self.emit_ifz(&t, &l_begin);
        self.temps.free(&t);
        self.free_operand(&c);
        self.emit(format!("{}:", l_end));
    }

    fn lower_for(
        &mut self,
        init: Option<&Stmt>,
        cond: Option<&Expr>,
        step: Option<&Stmt>,
        body: &Block,
    ) {
        if let Some(init) = init {
            self.lower_stmt(init);
        }
        let l_begin = self.labels.fresh();
        let l_inc = self.labels.fresh();
        let l_end = self.labels.fresh();
        self.emit(format!("{}:", l_begin));
        if let Some(cond) = cond {
            let c = self.lower_expr(cond);
            self.emit_ifz(&c, &l_end);
            self.free_operand(&c);
        }
        self.break_stack.push(l_end.clone());
        self.continue_stack.push(l_inc.clone());
        self.lower_block(body);
        self.break_stack.pop();
        self.continue_stack.pop();
        self.emit(format!("{}:", l_inc));
        if let Some(step) = step {
            self.lower_stmt(step);
        }
        self.emit(format!("goto {}", l_begin));
        self.emit(format!("{}:", l_end));
    }

    fn lower_switch(
        &mut self,
        selector: &Expr,
        cases: &[crate::ast::SwitchCase],
        default: Option<&[Stmt]>,
    ) {
        let sel_op = self.lower_expr(selector);
        let sel = if TempPool::is_temp(&sel_op) {
            sel_op
        } else {
            let t = self.temps.alloc();
            self.emit(format!("{} = {}", t, sel_op));
            t
        };

        let case_labels: Vec<String> = cases.iter().map(|_| self.labels.fresh()).collect();
        let l_default = default.map(|_| self.labels.fresh());
        let l_end = self.labels.fresh();

        for (case, label) in cases.iter().zip(&case_labels) {
            let v = self.lower_expr(&case.value);
            let t = self.temps.alloc();
            self.emit(format!("{} = {} != {}", t, sel, v));
            self.emit_ifz(&t, label);
            self.temps.free(&t);
            self.free_operand(&v);
        }
        match &l_default {
            Some(l) => self.emit(format!("goto {}", l)),
            None => self.emit(format!("goto {}", l_end)),
        }

        self.break_stack.push(l_end.clone());
        for (case, label) in cases.iter().zip(&case_labels) {
            self.emit(format!("{}:", label));
            for stmt in &case.body {
                self.lower_stmt(stmt);
            }
            // fall-through into the next case is natural
        }
        if let (Some(label), Some(stmts)) = (&l_default, default) {
            self.emit(format!("{}:", label));
            for stmt in stmts {
                self.lower_stmt(stmt);
            }
        }
        self.break_stack.pop();
        self.emit(format!("{}:", l_end));
        self.temps.free(&sel);
    }

    // ---- expressions ----

    fn lower_expr(&mut self, expr: &Expr) -> String {
        match expr {
            Expr::Int(v, _) => v.to_string(),
            Expr::Float(text, _) => text.clone(),
            Expr::Bool(true, _) => "true".to_string(),
            Expr::Bool(false, _) => "false".to_string(),
            Expr::Str(s, _) => quote(s),
            Expr::Null(_) => "0".to_string(),
            Expr::Array(..) => {
                self.emit("# array literals not supported");
                "0".to_string()
            }
            Expr::Ident(name, _) => {
                if let Some(alias) = self.param_aliases.get(name) {
                    alias.clone()
                } else if !self.seen_locals.contains(name) && self.is_field_of_current_class(name) {
                    // bare field read inside a method: the receiver's field
                    format!("this.{}", name)
                } else {
                    name.clone()
                }
            }
            Expr::This(_) => "this".to_string(),
            Expr::Unary { op, operand, .. } => self.lower_unary(*op, operand),
            Expr::Binary { op, lhs, rhs, .. } => self.lower_binary(*op, lhs, rhs),
            Expr::Logical { op, terms, .. } => self.lower_logical(*op, terms),
            Expr::Call { callee, args, .. } => self.lower_call(callee, args),
            Expr::Property { object, field, .. } => {
                let obj = self.lower_expr(object);
                let t = self.temps.alloc();
                self.emit(format!("{} = getprop {}, {}", t, obj, field));
                self.free_operand(&obj);
                t
            }
            Expr::Index { .. } => {
                self.emit("# array indexing not supported");
                "0".to_string()
            }
            Expr::New { class, args, .. } => self.lower_new(class, args),
        }
    }

    fn lower_unary(&mut self, op: UnaryOp, operand: &Expr) -> String {
        let src = self.lower_expr(operand);
        let acc = self.accumulator_for(&src);
        match op {
            UnaryOp::Neg => self.emit(format!("{} = 0 - {}", acc, acc)),
            UnaryOp::Not => self.emit(format!("{} = {} == 0", acc, acc)),
        }
        acc
    }

    /// Reuse a temporary operand as the accumulator, or copy the operand
    /// into a fresh one.
    fn accumulator_for(&mut self, operand: &str) -> String {
        if TempPool::is_temp(operand) {
            operand.to_string()
        } else {
            let t = self.temps.alloc();
            self.emit(format!("{} = {}", t, operand));
            t
        }
    }

    fn lower_binary(&mut self, op: BinOp, lhs: &Expr, rhs: &Expr) -> String {
        let a = self.lower_expr(lhs);
        let acc = self.accumulator_for(&a);
        let b = self.lower_expr(rhs);
        self.emit(format!("{} = {} {} {}", acc, acc, op.symbol(), b));
        self.free_operand(&b);
        acc
    }

    /// Short-circuit lowering with a single label pair per chain.
    ///
    /// `||` seeds the result with 0 and jumps to `L_true` on the first
    /// non-zero term (branch-if-true is realized as `== 0` plus `IfZ`,
    /// since `IfZ` is the only conditional quad). `&&` is the dual: seed 1,
    /// jump to `L_false` on the first zero term.
    fn lower_logical(&mut self, op: LogicalOp, terms: &[Expr]) -> String {
        let result = self.temps.alloc();
        match op {
            LogicalOp::Or => {
                let l_true = self.labels.fresh();
                let l_end = self.labels.fresh();
                self.emit(format!("{} = 0", result));
                for term in terms {
                    let t = self.lower_expr(term);
                    let neg = self.temps.alloc();
                    self.emit(format!("{} = {} == 0", neg, t));
                    self.emit_ifz(&neg, &l_true);
                    self.temps.free(&neg);
                    self.free_operand(&t);
                }
                self.emit(format!("goto {}", l_end));
                self.emit(format!("{}:", l_true));
                self.emit(format!("{} = 1", result));
                self.emit(format!("{}:", l_end));
            }
            LogicalOp::And => {
                let l_false = self.labels.fresh();
                let l_end = self.labels.fresh();
                self.emit(format!("{} = 1", result));
                for term in terms {
                    let t = self.lower_expr(term);
                    self.emit_ifz(&t, &l_false);
                    self.free_operand(&t);
                }
                self.emit(format!("goto {}", l_end));
                self.emit(format!("{}:", l_false));
                self.emit(format!("{} = 0", result));
                self.emit(format!("{}:", l_end));
            }
        }
        result
    }

    fn lower_call(&mut self, callee: &Expr, args: &[Expr]) -> String {
        match callee {
            Expr::Ident(name, _) => {
                // arguments are evaluated in source order, then passed as a
                // contiguous Param batch so no control flow intervenes
                let ops: Vec<String> = args.iter().map(|a| self.lower_expr(a)).collect();
                for op in &ops {
                    self.emit(format!("Param {}", op));
                }
                let returns_void = self
                    .analysis
                    .global_function(name)
                    .is_some_and(|sig| sig.return_type == Type::Void);
                let result = if returns_void {
                    self.emit(format!("call {}, {}", name, ops.len()));
                    "0".to_string()
                } else {
                    let t = self.temps.alloc();
                    self.emit(format!("{} = call {}, {}", t, name, ops.len()));
                    t
                };
                for op in &ops {
                    self.free_operand(op);
                }
                result
            }
            Expr::Property { object, field, .. } => {
                let recv = self.lower_expr(object);
                let ops: Vec<String> = args.iter().map(|a| self.lower_expr(a)).collect();
                for op in &ops {
                    self.emit(format!("Param {}", op));
                }
                // the receiver rides in the last argument slot
                self.emit(format!("Param {}", recv));
                let t = self.temps.alloc();
                self.emit(format!("{} = call method {}, {}", t, field, ops.len() + 1));
                for op in &ops {
                    self.free_operand(op);
                }
                self.free_operand(&recv);
                t
            }
            other => {
                let _ = other;
                self.emit("# invalid call target");
                "0".to_string()
            }
        }
    }

    fn lower_new(&mut self, class: &str, args: &[Expr]) -> String {
        let obj = self.temps.alloc();
        self.emit(format!("{} = new {}", obj, class));
        let has_constructor = self.analysis.classes.method(class, "constructor").is_some();
        if has_constructor {
            let ops: Vec<String> = args.iter().map(|a| self.lower_expr(a)).collect();
            for op in &ops {
                self.emit(format!("Param {}", op));
            }
            self.emit(format!("Param {}", obj));
            let tmp = self.temps.alloc();
            self.emit(format!(
                "{} = call method constructor, {}",
                tmp,
                ops.len() + 1
            ));
            self.temps.free(&tmp);
            for op in &ops {
                self.free_operand(op);
            }
        }
        obj
    }
}

/// Re-quote a string literal for TAC text, restoring assembler-friendly
/// escapes for the characters the lexer translated.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;
    use crate::semantic::SemanticAnalyzer;

    fn tac_for(source: &str) -> String {
        let program = parse_source(source).expect("parse failed");
        let analysis = SemanticAnalyzer::analyze(&program);
        assert!(
            !analysis.has_errors(),
            "semantic errors: {:?}",
            analysis.diagnostics
        );
        TacGenerator::generate(&analysis, &program, "main")
    }

    #[test]
    fn test_temp_pool_is_lifo() {
        let mut pool = TempPool::new();
        let t1 = pool.alloc();
        let t2 = pool.alloc();
        let t3 = pool.alloc();
        assert_eq!((t1.as_str(), t2.as_str(), t3.as_str()), ("t1", "t2", "t3"));
        pool.free("t2");
        pool.free("t1");
        assert_eq!(pool.alloc(), "t1");
        assert_eq!(pool.alloc(), "t2");
    }

    #[test]
    fn test_label_generator_is_monotonic() {
        let mut labels = LabelGen::default();
        assert_eq!(labels.fresh(), "L1");
        assert_eq!(labels.fresh(), "L2");
    }

    #[test]
    fn test_arithmetic_folds_into_accumulator() {
        let tac = tac_for("let x: integer = 2 + 3 * 4; print(x);");
        assert!(tac.contains("t2 = t2 * 4"), "tac:\n{}", tac);
        assert!(tac.contains("t1 = t1 + t2"), "tac:\n{}", tac);
        assert!(tac.contains("x = t1"), "tac:\n{}", tac);
        assert!(tac.contains("Param x"), "tac:\n{}", tac);
        assert!(tac.contains("call print, 1"), "tac:\n{}", tac);
    }

    #[test]
    fn test_entry_wrapping_and_implicit_return() {
        let tac = tac_for("let x: integer = 1;");
        assert!(tac.contains("FUNC main_START:"));
        assert!(tac.contains("BeginFunc main 0"));
        assert!(tac.contains("ActivationRecord main"));
        assert!(tac.contains("\nreturn\nEndFunc"));
    }

    #[test]
    fn test_short_circuit_or_shape() {
        let tac = tac_for(
            "let a: boolean = true; let b: boolean = false; let x: integer = 0;\n\
             if (a || b) { x = 1; }",
        );
        // one seed, one jump per term, result set on exactly two paths
        assert!(tac.contains("t1 = 0"), "tac:\n{}", tac);
        assert!(tac.contains("t2 = a == 0"), "tac:\n{}", tac);
        assert!(tac.contains("if t2 == 0 goto L1"), "tac:\n{}", tac);
        assert!(tac.contains("t2 = b == 0"), "tac:\n{}", tac);
        assert!(tac.contains("goto L2"), "tac:\n{}", tac);
        assert!(tac.contains("L1:\nt1 = 1\nL2:"), "tac:\n{}", tac);
        assert!(tac.contains("if t1 == 0 goto L3"), "tac:\n{}", tac);
    }

    #[test]
    fn test_short_circuit_and_is_dual() {
        let tac = tac_for("let a: boolean = true; let x: boolean = a && a && a;");
        assert!(tac.contains("t1 = 1"), "tac:\n{}", tac);
        assert_eq!(tac.matches("if a == 0 goto L1").count(), 3, "tac:\n{}", tac);
        assert!(tac.contains("L1:\nt1 = 0\nL2:"), "tac:\n{}", tac);
    }

    #[test]
    fn test_while_loop_shape() {
        let tac = tac_for("let x: integer = 0; while (x < 3) { x = x + 1; }");
        assert!(tac.contains("L1:"), "tac:\n{}", tac);
        assert!(tac.contains("if t1 == 0 goto L2"), "tac:\n{}", tac);
        assert!(tac.contains("goto L1"), "tac:\n{}", tac);
        assert!(tac.contains("L2:"), "tac:\n{}", tac);
    }

    #[test]
    fn test_do_while_tests_at_bottom() {
        let tac = tac_for("let x: integer = 3; do { x = x - 1; } while (x > 0);");
        let begin = tac.find("L1:").expect("begin label");
        let cond = tac.find("L2:").expect("cond label");
        assert!(begin < cond, "tac:\n{}", tac);
        // jump back to L1 while the condition holds
        assert!(tac.contains("== 0\nif"), "tac:\n{}", tac);
        assert!(tac.contains("goto L1") || tac.contains("if t2 == 0 goto L1"), "tac:\n{}", tac);
    }

    #[test]
    fn test_for_loop_continue_targets_step() {
        let tac = tac_for(
            "for (let i: integer = 0; i < 5; i = i + 1) { if (i == 2) { continue; } print(i); }",
        );
        // L1 begin, L2 inc, L3 end; continue jumps to the step label
        assert!(tac.contains("goto L2"), "tac:\n{}", tac);
        assert!(tac.contains("L2:\ni = i + 1") || tac.contains("L2:"), "tac:\n{}", tac);
        assert!(tac.contains("goto L1"), "tac:\n{}", tac);
    }

    #[test]
    fn test_break_targets_loop_end() {
        let tac = tac_for("while (true) { break; }");
        assert!(tac.contains("goto L2"), "tac:\n{}", tac);
    }

    #[test]
    fn test_switch_dispatch_and_fallthrough() {
        let tac = tac_for(
            "let x: integer = 2; let y: integer = 0;\n\
             switch (x) { case 1: y = 1; break; case 2: y = 2; default: y = 9; }",
        );
        // selector copied into a temporary, one comparison per case
        assert!(tac.contains("t1 = x"), "tac:\n{}", tac);
        assert!(tac.contains("!= 1"), "tac:\n{}", tac);
        assert!(tac.contains("!= 2"), "tac:\n{}", tac);
        // case 1 breaks to the end label; case 2 falls through into default
        assert!(tac.contains("goto L4"), "tac:\n{}", tac);
        assert!(tac.contains("L3:\ny = 9"), "tac:\n{}", tac);
    }

    #[test]
    fn test_method_call_pushes_receiver_last() {
        let source = r#"
            class Persona {
              let nombre: string;
              function saludar(veces: integer): void { }
            }
            let p: Persona = new Persona();
            p.saludar(3);
        "#;
        let tac = tac_for(source);
        assert!(
            tac.contains("Param 3\nParam p\nt1 = call method saludar, 2"),
            "tac:\n{}",
            tac
        );
    }

    #[test]
    fn test_function_header_and_param_aliases() {
        let tac = tac_for("function suma(a: integer, b: integer): integer { return a + b; }");
        assert!(tac.contains("FUNC suma_START:"), "tac:\n{}", tac);
        assert!(tac.contains("BeginFunc suma 2"), "tac:\n{}", tac);
        assert!(tac.contains("ActivationRecord suma"), "tac:\n{}", tac);
        assert!(tac.contains("p_a = LoadParam 0"), "tac:\n{}", tac);
        assert!(tac.contains("p_b = LoadParam 1"), "tac:\n{}", tac);
        // body reads go through the p_ aliases
        assert!(tac.contains("t1 = p_a"), "tac:\n{}", tac);
        assert!(tac.contains("t1 = t1 + p_b"), "tac:\n{}", tac);
        assert!(tac.contains("return t1"), "tac:\n{}", tac);
    }

    #[test]
    fn test_method_loads_receiver_in_last_slot() {
        let source = r#"
            class Persona {
              let edad: integer;
              function crecer(delta: integer): void { this.edad = this.edad + delta; }
            }
        "#;
        let tac = tac_for(source);
        assert!(tac.contains("BeginFunc crecer 2"), "tac:\n{}", tac);
        assert!(tac.contains("p_delta = LoadParam 0"), "tac:\n{}", tac);
        assert!(tac.contains("this = LoadParam 1"), "tac:\n{}", tac);
    }

    #[test]
    fn test_constructor_lowering_scenario() {
        let source = r#"
            class Estudiante {
              let nombre: string;
              let edad: integer;
              constructor(nombre: string, edad: integer) { }
            }
            let e: Estudiante = new Estudiante("Ada", 30);
        "#;
        let tac = tac_for(source);
        // inside the constructor: parameter loads then field stores
        assert!(tac.contains("p_nombre = LoadParam 0"), "tac:\n{}", tac);
        assert!(tac.contains("p_edad = LoadParam 1"), "tac:\n{}", tac);
        assert!(tac.contains("this = LoadParam 2"), "tac:\n{}", tac);
        assert!(
            tac.contains("setprop this, nombre, p_nombre\nsetprop this, edad, p_edad"),
            "tac:\n{}",
            tac
        );
        // at the allocation site: new, args, receiver last, constructor call
        assert!(
            tac.contains("t1 = new Estudiante\nParam \"Ada\"\nParam 30\nParam t1\nt2 = call method constructor, 3"),
            "tac:\n{}",
            tac
        );
    }

    #[test]
    fn test_bare_field_assignment_rewrites_to_this() {
        let source = r#"
            class Contador {
              let total: integer;
              function reset(): void { total = 0; }
            }
        "#;
        let tac = tac_for(source);
        assert!(tac.contains("setprop this, total, 0"), "tac:\n{}", tac);
    }

    #[test]
    fn test_property_read_and_write() {
        let source = r#"
            class Persona { let edad: integer; }
            let p: Persona = new Persona();
            p.edad = 20;
            let x: integer = p.edad;
        "#;
        let tac = tac_for(source);
        assert!(tac.contains("setprop p, edad, 20"), "tac:\n{}", tac);
        assert!(tac.contains("t1 = getprop p, edad"), "tac:\n{}", tac);
    }

    #[test]
    fn test_void_call_has_no_destination() {
        let tac = tac_for(r#"printString("hola");"#);
        assert!(tac.contains("Param \"hola\"\ncall printString, 1"), "tac:\n{}", tac);
    }

    #[test]
    fn test_param_count_matches_call_argc() {
        let tac = tac_for(
            "function f(a: integer, b: integer, c: integer): integer { return a; }\n\
             let r: integer = f(1, 2, 3);",
        );
        assert!(tac.contains("Param 1\nParam 2\nParam 3\nt1 = call f, 3"), "tac:\n{}", tac);
    }

    #[test]
    fn test_string_literal_operand_keeps_quotes() {
        let tac = tac_for(r#"let s: string = "hola ";"#);
        assert!(tac.contains("s = \"hola \""), "tac:\n{}", tac);
    }
}
