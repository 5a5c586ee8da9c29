//! Hand-written lexer and recursive-descent parser for Compiscript
//!
//! The parser fails fast on the first syntax error with a structured
//! position, which short-circuits the rest of the pipeline.

use crate::ast::{
    BinOp, Block, ClassDecl, ClassMember, Expr, FunctionDecl, LogicalOp, Param, Program, Span,
    Stmt, SwitchCase, TypeAnn, UnaryOp,
};

/// A structured parse error: `{line, col, message}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub col: usize,
    pub message: String,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}:{} {}", self.line, self.col, self.message)
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Int,
    Float,
    Str,
    Sym,
}

/// A token with source position information
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (0-indexed)
    pub column: usize,
}

impl Token {
    fn new(kind: TokenKind, text: String, line: usize, column: usize) -> Self {
        Token {
            kind,
            text,
            line,
            column,
        }
    }

    pub fn span(&self) -> Span {
        Span::new(self.line, self.column)
    }
}

/// Tokenize source text. Returns an error on unterminated strings or
/// block comments and on unknown characters.
pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    let mut line = 1usize;
    let mut col = 0usize;

    let err = |line: usize, col: usize, msg: &str| ParseError {
        line,
        col,
        message: msg.to_string(),
    };

    while i < chars.len() {
        let c = chars[i];

        if c == '\n' {
            line += 1;
            col = 0;
            i += 1;
            continue;
        }
        if c.is_whitespace() {
            i += 1;
            col += 1;
            continue;
        }

        // line comment
        if c == '/' && i + 1 < chars.len() && chars[i + 1] == '/' {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            continue;
        }
        // block comment
        if c == '/' && i + 1 < chars.len() && chars[i + 1] == '*' {
            let (start_line, start_col) = (line, col);
            i += 2;
            col += 2;
            loop {
                if i >= chars.len() {
                    return Err(err(start_line, start_col, "unterminated block comment"));
                }
                if chars[i] == '\n' {
                    line += 1;
                    col = 0;
                    i += 1;
                } else if chars[i] == '*' && i + 1 < chars.len() && chars[i + 1] == '/' {
                    i += 2;
                    col += 2;
                    break;
                } else {
                    i += 1;
                    col += 1;
                }
            }
            continue;
        }

        // identifier / keyword
        if c.is_alphabetic() || c == '_' {
            let start_col = col;
            let mut text = String::new();
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                text.push(chars[i]);
                i += 1;
                col += 1;
            }
            tokens.push(Token::new(TokenKind::Ident, text, line, start_col));
            continue;
        }

        // number
        if c.is_ascii_digit() {
            let start_col = col;
            let mut text = String::new();
            while i < chars.len() && chars[i].is_ascii_digit() {
                text.push(chars[i]);
                i += 1;
                col += 1;
            }
            let mut kind = TokenKind::Int;
            if i + 1 < chars.len() && chars[i] == '.' && chars[i + 1].is_ascii_digit() {
                kind = TokenKind::Float;
                text.push('.');
                i += 1;
                col += 1;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    text.push(chars[i]);
                    i += 1;
                    col += 1;
                }
            }
            tokens.push(Token::new(kind, text, line, start_col));
            continue;
        }

        // string literal
        if c == '"' {
            let (start_line, start_col) = (line, col);
            i += 1;
            col += 1;
            let mut text = String::new();
            loop {
                if i >= chars.len() || chars[i] == '\n' {
                    return Err(err(start_line, start_col, "unterminated string literal"));
                }
                let ch = chars[i];
                if ch == '"' {
                    i += 1;
                    col += 1;
                    break;
                }
                if ch == '\\' {
                    if i + 1 >= chars.len() {
                        return Err(err(start_line, start_col, "unterminated string literal"));
                    }
                    let esc = chars[i + 1];
                    let translated = match esc {
                        'n' => '\n',
                        't' => '\t',
                        '"' => '"',
                        '\\' => '\\',
                        other => {
                            return Err(err(
                                line,
                                col,
                                &format!("unknown escape sequence '\\{}'", other),
                            ));
                        }
                    };
                    text.push(translated);
                    i += 2;
                    col += 2;
                } else {
                    text.push(ch);
                    i += 1;
                    col += 1;
                }
            }
            tokens.push(Token::new(TokenKind::Str, text, start_line, start_col));
            continue;
        }

        // two-character symbols first
        if i + 1 < chars.len() {
            let pair: String = [c, chars[i + 1]].iter().collect();
            if matches!(pair.as_str(), "==" | "!=" | "<=" | ">=" | "&&" | "||") {
                tokens.push(Token::new(TokenKind::Sym, pair, line, col));
                i += 2;
                col += 2;
                continue;
            }
        }

        if "+-*/%<>=!(){}[],;:.".contains(c) {
            tokens.push(Token::new(TokenKind::Sym, c.to_string(), line, col));
            i += 1;
            col += 1;
            continue;
        }

        return Err(err(line, col, &format!("unexpected character '{}'", c)));
    }

    Ok(tokens)
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let tokens = tokenize(source)?;
        Ok(Parser { tokens, pos: 0 })
    }

    pub fn parse(&mut self) -> Result<Program, ParseError> {
        let mut program = Program::default();
        while !self.is_at_end() {
            program.stmts.push(self.parse_stmt()?);
        }
        Ok(program)
    }

    // ---- token helpers ----

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_text(&self) -> &str {
        self.tokens.get(self.pos).map(|t| t.text.as_str()).unwrap_or("")
    }

    fn check(&self, text: &str) -> bool {
        self.peek().is_some_and(|t| t.text == text)
    }

    fn advance(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn consume(&mut self, text: &str) -> bool {
        if self.check(text) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn current_span(&self) -> Span {
        self.peek()
            .map(Token::span)
            .or_else(|| self.tokens.last().map(Token::span))
            .unwrap_or_default()
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        let span = self.current_span();
        ParseError {
            line: span.line,
            col: span.column,
            message: message.into(),
        }
    }

    fn expect(&mut self, text: &str) -> Result<Token, ParseError> {
        if self.check(text) {
            Ok(self.advance().unwrap())
        } else {
            Err(self.error(format!("expected '{}', got '{}'", text, self.peek_text())))
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<Token, ParseError> {
        match self.peek() {
            Some(t) if t.kind == TokenKind::Ident => Ok(self.advance().unwrap()),
            _ => Err(self.error(format!("expected {}, got '{}'", what, self.peek_text()))),
        }
    }

    // ---- statements ----

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        match self.peek_text() {
            "let" => self.parse_let(false),
            "const" => self.parse_let(true),
            "if" => self.parse_if(),
            "while" => self.parse_while(),
            "do" => self.parse_do_while(),
            "for" => self.parse_for(),
            "switch" => self.parse_switch(),
            "break" => {
                let span = self.advance().unwrap().span();
                self.expect(";")?;
                Ok(Stmt::Break(span))
            }
            "continue" => {
                let span = self.advance().unwrap().span();
                self.expect(";")?;
                Ok(Stmt::Continue(span))
            }
            "return" => self.parse_return(),
            "function" => Ok(Stmt::Function(self.parse_function(false)?)),
            "class" => self.parse_class(),
            "{" => Ok(Stmt::Block(self.parse_block()?)),
            _ => self.parse_expr_or_assign_stmt(),
        }
    }

    fn parse_let(&mut self, is_const: bool) -> Result<Stmt, ParseError> {
        let span = self.advance().unwrap().span(); // let / const
        let name = self.expect_ident("variable name")?.text;
        let ty = if self.consume(":") {
            Some(self.parse_type_ann()?)
        } else {
            None
        };
        let init = if self.consume("=") {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.expect(";")?;
        Ok(Stmt::Let {
            name,
            ty,
            init,
            is_const,
            span,
        })
    }

    fn parse_type_ann(&mut self) -> Result<TypeAnn, ParseError> {
        let tok = self.expect_ident("type name")?;
        let span = tok.span();
        let name = tok.text;
        let mut dims = 0;
        while self.check("[") {
            // only consume as a dimension when immediately closed
            if self.tokens.get(self.pos + 1).is_some_and(|t| t.text == "]") {
                self.pos += 2;
                dims += 1;
            } else {
                break;
            }
        }
        Ok(TypeAnn { name, dims, span })
    }

    fn parse_block(&mut self) -> Result<Block, ParseError> {
        let span = self.expect("{")?.span();
        let mut stmts = Vec::new();
        while !self.check("}") {
            if self.is_at_end() {
                return Err(self.error("unexpected end of file in block"));
            }
            stmts.push(self.parse_stmt()?);
        }
        self.expect("}")?;
        Ok(Block { stmts, span })
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let span = self.advance().unwrap().span();
        self.expect("(")?;
        let cond = self.parse_expr()?;
        self.expect(")")?;
        let then_block = self.parse_block()?;
        let else_block = if self.consume("else") {
            if self.check("if") {
                // else-if chain: wrap the nested if in a synthetic block
                let nested = self.parse_if()?;
                let nested_span = nested.span();
                Some(Block {
                    stmts: vec![nested],
                    span: nested_span,
                })
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };
        Ok(Stmt::If {
            cond,
            then_block,
            else_block,
            span,
        })
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        let span = self.advance().unwrap().span();
        self.expect("(")?;
        let cond = self.parse_expr()?;
        self.expect(")")?;
        let body = self.parse_block()?;
        Ok(Stmt::While { cond, body, span })
    }

    fn parse_do_while(&mut self) -> Result<Stmt, ParseError> {
        let span = self.advance().unwrap().span();
        let body = self.parse_block()?;
        self.expect("while")?;
        self.expect("(")?;
        let cond = self.parse_expr()?;
        self.expect(")")?;
        self.expect(";")?;
        Ok(Stmt::DoWhile { body, cond, span })
    }

    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        let span = self.advance().unwrap().span();
        self.expect("(")?;

        let init = if self.consume(";") {
            None
        } else if self.check("let") || self.check("const") {
            Some(Box::new(self.parse_let(self.check("const"))?))
        } else {
            let stmt = self.parse_assign_or_expr_clause()?;
            self.expect(";")?;
            Some(Box::new(stmt))
        };

        let cond = if self.check(";") {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(";")?;

        let step = if self.check(")") {
            None
        } else {
            Some(Box::new(self.parse_assign_or_expr_clause()?))
        };
        self.expect(")")?;

        let body = self.parse_block()?;
        Ok(Stmt::For {
            init,
            cond,
            step,
            body,
            span,
        })
    }

    /// An assignment or expression without the trailing ';' (for-clauses)
    fn parse_assign_or_expr_clause(&mut self) -> Result<Stmt, ParseError> {
        let expr = self.parse_expr()?;
        if self.check("=") {
            let span = self.advance().unwrap().span();
            self.check_assign_target(&expr)?;
            let value = self.parse_expr()?;
            Ok(Stmt::Assign {
                target: expr,
                value,
                span,
            })
        } else {
            Ok(Stmt::Expr(expr))
        }
    }

    fn parse_switch(&mut self) -> Result<Stmt, ParseError> {
        let span = self.advance().unwrap().span();
        self.expect("(")?;
        let selector = self.parse_expr()?;
        self.expect(")")?;
        self.expect("{")?;

        let mut cases = Vec::new();
        let mut default = None;
        while !self.check("}") {
            if self.is_at_end() {
                return Err(self.error("unexpected end of file in switch"));
            }
            if self.check("case") {
                let case_span = self.advance().unwrap().span();
                let value = self.parse_expr()?;
                self.expect(":")?;
                let body = self.parse_case_body()?;
                cases.push(SwitchCase {
                    value,
                    body,
                    span: case_span,
                });
            } else if self.check("default") {
                self.advance();
                self.expect(":")?;
                default = Some(self.parse_case_body()?);
            } else {
                return Err(self.error(format!(
                    "expected 'case', 'default' or '}}' in switch, got '{}'",
                    self.peek_text()
                )));
            }
        }
        self.expect("}")?;
        Ok(Stmt::Switch {
            selector,
            cases,
            default,
            span,
        })
    }

    fn parse_case_body(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut stmts = Vec::new();
        while !self.check("case") && !self.check("default") && !self.check("}") {
            if self.is_at_end() {
                return Err(self.error("unexpected end of file in switch case"));
            }
            stmts.push(self.parse_stmt()?);
        }
        Ok(stmts)
    }

    fn parse_return(&mut self) -> Result<Stmt, ParseError> {
        let span = self.advance().unwrap().span();
        let value = if self.check(";") {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(";")?;
        Ok(Stmt::Return { value, span })
    }

    fn parse_function(&mut self, is_method: bool) -> Result<FunctionDecl, ParseError> {
        let span = self.expect("function")?.span();
        let name = self.expect_ident("function name")?.text;
        self.parse_function_rest(name, span, is_method)
    }

    /// Parameter list, optional return type, and body
    fn parse_function_rest(
        &mut self,
        name: String,
        span: Span,
        is_method: bool,
    ) -> Result<FunctionDecl, ParseError> {
        self.expect("(")?;
        let mut params = Vec::new();
        if !self.check(")") {
            loop {
                let tok = self.expect_ident("parameter name")?;
                let pspan = tok.span();
                let pname = tok.text;
                self.expect(":")?;
                let ty = self.parse_type_ann()?;
                params.push(Param {
                    name: pname,
                    ty,
                    span: pspan,
                });
                if !self.consume(",") {
                    break;
                }
            }
        }
        self.expect(")")?;
        let return_type = if self.consume(":") {
            Some(self.parse_type_ann()?)
        } else {
            None
        };
        let body = self.parse_block()?;
        Ok(FunctionDecl {
            name,
            params,
            return_type,
            body,
            is_method,
            span,
        })
    }

    fn parse_class(&mut self) -> Result<Stmt, ParseError> {
        let span = self.advance().unwrap().span();
        let name = self.expect_ident("class name")?.text;
        let base = if self.consume(":") {
            Some(self.expect_ident("base class name")?.text)
        } else {
            None
        };
        self.expect("{")?;

        let mut members = Vec::new();
        while !self.check("}") {
            if self.is_at_end() {
                return Err(self.error("unexpected end of file in class body"));
            }
            if self.check("let") || self.check("const") {
                let fspan = self.advance().unwrap().span();
                let fname = self.expect_ident("field name")?.text;
                self.expect(":")?;
                let ty = self.parse_type_ann()?;
                self.expect(";")?;
                members.push(ClassMember::Field {
                    name: fname,
                    ty,
                    span: fspan,
                });
            } else if self.check("function") {
                members.push(ClassMember::Method(self.parse_function(true)?));
            } else if self.check("constructor") {
                let cspan = self.advance().unwrap().span();
                let decl = self.parse_function_rest("constructor".to_string(), cspan, true)?;
                members.push(ClassMember::Method(decl));
            } else {
                return Err(self.error(format!(
                    "expected field, method or constructor in class body, got '{}'",
                    self.peek_text()
                )));
            }
        }
        self.expect("}")?;
        Ok(Stmt::Class(ClassDecl {
            name,
            base,
            members,
            span,
        }))
    }

    fn parse_expr_or_assign_stmt(&mut self) -> Result<Stmt, ParseError> {
        let stmt = self.parse_assign_or_expr_clause()?;
        self.expect(";")?;
        Ok(stmt)
    }

    fn check_assign_target(&self, target: &Expr) -> Result<(), ParseError> {
        match target {
            Expr::Ident(..) | Expr::Property { .. } | Expr::Index { .. } => Ok(()),
            other => {
                let span = other.span();
                Err(ParseError {
                    line: span.line,
                    col: span.column,
                    message: "invalid assignment target".to_string(),
                })
            }
        }
    }

    // ---- expressions ----

    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let first = self.parse_and()?;
        if !self.check("||") {
            return Ok(first);
        }
        let span = first.span();
        let mut terms = vec![first];
        while self.consume("||") {
            terms.push(self.parse_and()?);
        }
        Ok(Expr::Logical {
            op: LogicalOp::Or,
            terms,
            span,
        })
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let first = self.parse_equality()?;
        if !self.check("&&") {
            return Ok(first);
        }
        let span = first.span();
        let mut terms = vec![first];
        while self.consume("&&") {
            terms.push(self.parse_equality()?);
        }
        Ok(Expr::Logical {
            op: LogicalOp::And,
            terms,
            span,
        })
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_relational()?;
        loop {
            let op = match self.peek_text() {
                "==" => BinOp::Eq,
                "!=" => BinOp::Ne,
                _ => break,
            };
            let span = self.advance().unwrap().span();
            let rhs = self.parse_relational()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            };
        }
        Ok(lhs)
    }

    fn parse_relational(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.peek_text() {
                "<" => BinOp::Lt,
                "<=" => BinOp::Le,
                ">" => BinOp::Gt,
                ">=" => BinOp::Ge,
                _ => break,
            };
            let span = self.advance().unwrap().span();
            let rhs = self.parse_additive()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            };
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_text() {
                "+" => BinOp::Add,
                "-" => BinOp::Sub,
                _ => break,
            };
            let span = self.advance().unwrap().span();
            let rhs = self.parse_multiplicative()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            };
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek_text() {
                "*" => BinOp::Mul,
                "/" => BinOp::Div,
                "%" => BinOp::Mod,
                _ => break,
            };
            let span = self.advance().unwrap().span();
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if self.check("-") {
            let span = self.advance().unwrap().span();
            let operand = self.parse_unary()?;
            // fold negative integer literals
            if let Expr::Int(v, _) = operand {
                return Ok(Expr::Int(-v, span));
            }
            return Ok(Expr::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(operand),
                span,
            });
        }
        if self.check("!") {
            let span = self.advance().unwrap().span();
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
                span,
            });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.check("(") {
                let span = self.advance().unwrap().span();
                let args = self.parse_args()?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                    span,
                };
            } else if self.check(".") {
                let span = self.advance().unwrap().span();
                let field = self.expect_ident("property name")?.text;
                expr = Expr::Property {
                    object: Box::new(expr),
                    field,
                    span,
                };
            } else if self.check("[") {
                let span = self.advance().unwrap().span();
                let index = self.parse_expr()?;
                self.expect("]")?;
                expr = Expr::Index {
                    object: Box::new(expr),
                    index: Box::new(index),
                    span,
                };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    /// Comma-separated arguments up to the closing ')'
    fn parse_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if !self.check(")") {
            loop {
                args.push(self.parse_expr()?);
                if !self.consume(",") {
                    break;
                }
            }
        }
        self.expect(")")?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let tok = match self.peek() {
            Some(t) => t.clone(),
            None => return Err(self.error("unexpected end of file in expression")),
        };
        let span = tok.span();

        match tok.kind {
            TokenKind::Int => {
                self.advance();
                let value: i64 = tok
                    .text
                    .parse()
                    .map_err(|_| self.error(format!("integer literal out of range: {}", tok.text)))?;
                Ok(Expr::Int(value, span))
            }
            TokenKind::Float => {
                self.advance();
                Ok(Expr::Float(tok.text, span))
            }
            TokenKind::Str => {
                self.advance();
                Ok(Expr::Str(tok.text, span))
            }
            TokenKind::Ident => match tok.text.as_str() {
                "true" => {
                    self.advance();
                    Ok(Expr::Bool(true, span))
                }
                "false" => {
                    self.advance();
                    Ok(Expr::Bool(false, span))
                }
                "null" => {
                    self.advance();
                    Ok(Expr::Null(span))
                }
                "this" => {
                    self.advance();
                    Ok(Expr::This(span))
                }
                "new" => {
                    self.advance();
                    let class = self.expect_ident("class name after 'new'")?.text;
                    self.expect("(")?;
                    let args = self.parse_args()?;
                    Ok(Expr::New { class, args, span })
                }
                _ => {
                    self.advance();
                    Ok(Expr::Ident(tok.text, span))
                }
            },
            TokenKind::Sym => match tok.text.as_str() {
                "(" => {
                    self.advance();
                    let expr = self.parse_expr()?;
                    self.expect(")")?;
                    Ok(expr)
                }
                "[" => {
                    self.advance();
                    let mut elems = Vec::new();
                    if !self.check("]") {
                        loop {
                            elems.push(self.parse_expr()?);
                            if !self.consume(",") {
                                break;
                            }
                        }
                    }
                    self.expect("]")?;
                    Ok(Expr::Array(elems, span))
                }
                _ => Err(self.error(format!("unexpected token '{}' in expression", tok.text))),
            },
        }
    }
}

/// Parse a whole source text into a program
pub fn parse_source(source: &str) -> Result<Program, ParseError> {
    Parser::new(source)?.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_positions() {
        let tokens = tokenize("let x = 1;\nx = 2;").unwrap();
        assert_eq!(tokens[0].text, "let");
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[0].column, 0);
        let second_x = tokens.iter().filter(|t| t.text == "x").nth(1).unwrap();
        assert_eq!(second_x.line, 2);
        assert_eq!(second_x.column, 0);
    }

    #[test]
    fn test_tokenize_string_escapes() {
        let tokens = tokenize(r#""a\nb\t\"c\"""#).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Str);
        assert_eq!(tokens[0].text, "a\nb\t\"c\"");
    }

    #[test]
    fn test_tokenize_unterminated_string() {
        let err = tokenize("let s = \"oops;").unwrap_err();
        assert!(err.message.contains("unterminated string"));
        assert_eq!(err.line, 1);
    }

    #[test]
    fn test_parse_let_with_annotation() {
        let program = parse_source("let x: integer = 2 + 3 * 4;").unwrap();
        assert_eq!(program.stmts.len(), 1);
        match &program.stmts[0] {
            Stmt::Let { name, ty, init, .. } => {
                assert_eq!(name, "x");
                assert_eq!(ty.as_ref().unwrap().name, "integer");
                assert!(init.is_some());
            }
            other => panic!("expected let, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_precedence() {
        let program = parse_source("let x = 2 + 3 * 4;").unwrap();
        let Stmt::Let { init: Some(e), .. } = &program.stmts[0] else {
            panic!("expected let");
        };
        // + at the top, * nested on the right
        match e {
            Expr::Binary { op: BinOp::Add, rhs, .. } => {
                assert!(matches!(**rhs, Expr::Binary { op: BinOp::Mul, .. }));
            }
            other => panic!("expected addition, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_logical_chain_is_nary() {
        let program = parse_source("let b = a || c || d;").unwrap();
        let Stmt::Let { init: Some(e), .. } = &program.stmts[0] else {
            panic!("expected let");
        };
        match e {
            Expr::Logical { op: LogicalOp::Or, terms, .. } => assert_eq!(terms.len(), 3),
            other => panic!("expected logical or, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_class_with_constructor_and_method() {
        let source = r#"
            class Persona {
              let nombre: string;
              let edad: integer;
              constructor(nombre: string, edad: integer) { this.nombre = nombre; }
              function saludar(veces: integer): void { }
            }
        "#;
        let program = parse_source(source).unwrap();
        let Stmt::Class(class) = &program.stmts[0] else {
            panic!("expected class");
        };
        assert_eq!(class.name, "Persona");
        assert_eq!(class.members.len(), 4);
        let ClassMember::Method(ctor) = &class.members[2] else {
            panic!("expected constructor member");
        };
        assert!(ctor.is_constructor());
        assert!(ctor.is_method);
        let ClassMember::Method(m) = &class.members[3] else {
            panic!("expected method member");
        };
        assert_eq!(m.name, "saludar");
        assert!(m.is_method);
    }

    #[test]
    fn test_parse_method_call_and_new() {
        let program = parse_source(r#"let e = new Estudiante("Ada", 30); e.saludar(3);"#).unwrap();
        let Stmt::Let { init: Some(Expr::New { class, args, .. }), .. } = &program.stmts[0] else {
            panic!("expected new expression");
        };
        assert_eq!(class, "Estudiante");
        assert_eq!(args.len(), 2);
        let Stmt::Expr(Expr::Call { callee, args, .. }) = &program.stmts[1] else {
            panic!("expected call statement");
        };
        assert!(matches!(**callee, Expr::Property { .. }));
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_parse_control_flow_forms() {
        let source = r#"
            if (a || b) { x = 1; } else { x = 2; }
            while (x < 10) { x = x + 1; }
            do { x = x - 1; } while (x > 0);
            for (let i: integer = 0; i < 3; i = i + 1) { print(i); }
            switch (x) { case 1: y = 1; break; default: y = 0; }
        "#;
        let program = parse_source(source).unwrap();
        assert_eq!(program.stmts.len(), 5);
        assert!(matches!(program.stmts[0], Stmt::If { .. }));
        assert!(matches!(program.stmts[1], Stmt::While { .. }));
        assert!(matches!(program.stmts[2], Stmt::DoWhile { .. }));
        assert!(matches!(program.stmts[3], Stmt::For { .. }));
        assert!(matches!(program.stmts[4], Stmt::Switch { .. }));
    }

    #[test]
    fn test_parse_array_type_annotation() {
        let program = parse_source("let xs: integer[][] = [];").unwrap();
        let Stmt::Let { ty: Some(ann), .. } = &program.stmts[0] else {
            panic!("expected let");
        };
        assert_eq!(ann.name, "integer");
        assert_eq!(ann.dims, 2);
    }

    #[test]
    fn test_parse_invalid_assignment_target() {
        let err = parse_source("1 = x;").unwrap_err();
        assert!(err.message.contains("invalid assignment target"));
    }

    #[test]
    fn test_parse_error_position() {
        let err = parse_source("let = 3;").unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.message.contains("expected variable name"));
    }

    #[test]
    fn test_negative_literal_folding() {
        let program = parse_source("let x = -5;").unwrap();
        let Stmt::Let { init: Some(Expr::Int(v, _)), .. } = &program.stmts[0] else {
            panic!("expected folded negative literal");
        };
        assert_eq!(*v, -5);
    }
}
