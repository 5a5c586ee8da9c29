//! Quadruple model, copy coalescing, and the TAC text parser
//!
//! The TAC generator prints text; this module turns that text back into
//! structured quadruples for the MIPS backend. The decoupling lets the
//! emitter work from either direct-emitted TAC or hand-edited text (e.g.
//! from an IDE buffer). Keywords match case-insensitively; identifiers and
//! labels are case-sensitive. The parser is forgiving: unrecognized lines
//! become [`Quad::Raw`] and are rendered as assembler comments downstream,
//! so parsing never aborts.

/// Arithmetic and relational operation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinKind {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinKind::Add => "+",
            BinKind::Sub => "-",
            BinKind::Mul => "*",
            BinKind::Div => "/",
            BinKind::Mod => "%",
            BinKind::Eq => "==",
            BinKind::Ne => "!=",
            BinKind::Lt => "<",
            BinKind::Le => "<=",
            BinKind::Gt => ">",
            BinKind::Ge => ">=",
        }
    }
}

/// One TAC operation. Operand tokens stay as strings: identifiers, numeric
/// literals, quoted string literals (double quotes retained), `this`,
/// `p_<name>` parameter aliases, `t<n>` temporaries, or `obj.field` forms.
#[derive(Debug, Clone, PartialEq)]
pub enum Quad {
    BeginFunc { name: String, local_bytes: usize },
    EndFunc,
    ActivationRecord { name: String },
    Label(String),
    Goto(String),
    /// Branch when `src == 0`
    IfZ { src: String, label: String },
    Assign { dst: String, src: String },
    Bin { op: BinKind, dst: String, a: String, b: String },
    Return { src: Option<String> },
    /// Accumulates into the pending-argument list of the next call
    Param { index: Option<usize>, src: String },
    /// `func` keeps a `method ` prefix when the call is a dispatch
    Call { dst: Option<String>, func: String, argc: usize },
    LoadParam { dst: String, index: usize },
    GetProp { dst: String, obj: String, field: String },
    SetProp { obj: String, field: String, src: String },
    New { dst: String, class: String },
    /// Passthrough annotation, rendered as a MIPS comment
    Raw(String),
}

impl std::fmt::Display for Quad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Quad::BeginFunc { name, local_bytes } => write!(f, "BeginFunc {} {}", name, local_bytes),
            Quad::EndFunc => write!(f, "EndFunc"),
            Quad::ActivationRecord { name } => write!(f, "ActivationRecord {}", name),
            Quad::Label(l) => write!(f, "{}:", l),
            Quad::Goto(l) => write!(f, "goto {}", l),
            Quad::IfZ { src, label } => write!(f, "IfZ {} goto {}", src, label),
            Quad::Assign { dst, src } => write!(f, "{} = {}", dst, src),
            Quad::Bin { op, dst, a, b } => write!(f, "{} = {} {} {}", dst, a, op.symbol(), b),
            Quad::Return { src: Some(s) } => write!(f, "return {}", s),
            Quad::Return { src: None } => write!(f, "return"),
            Quad::Param { index: Some(i), src } => write!(f, "Param {}, {}", i, src),
            Quad::Param { index: None, src } => write!(f, "Param {}", src),
            Quad::Call { dst: Some(d), func, argc } => write!(f, "{} = call {}, {}", d, func, argc),
            Quad::Call { dst: None, func, argc } => write!(f, "call {}, {}", func, argc),
            Quad::LoadParam { dst, index } => write!(f, "{} = LoadParam {}", dst, index),
            Quad::GetProp { dst, obj, field } => write!(f, "{} = getprop {}, {}", dst, obj, field),
            Quad::SetProp { obj, field, src } => write!(f, "setprop {}, {}, {}", obj, field, src),
            Quad::New { dst, class } => write!(f, "{} = new {}", dst, class),
            Quad::Raw(text) => write!(f, "{}", text),
        }
    }
}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

fn eq_kw(token: &str, keyword: &str) -> bool {
    token.eq_ignore_ascii_case(keyword)
}

/// Find a spaced operator (` <op> `) outside string quotes; returns the
/// byte offset of the operator itself.
fn find_op(haystack: &str, op: &str) -> Option<usize> {
    let needle = format!(" {} ", op);
    let bytes = haystack.as_bytes();
    let mut in_string = false;
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        if c == '"' && (i == 0 || bytes[i - 1] as char != '\\') {
            in_string = !in_string;
        }
        if !in_string && haystack[i..].starts_with(&needle) {
            return Some(i + 1);
        }
        i += 1;
    }
    None
}

/// Re-tokenize printed TAC into quadruples. Never fails: anything that
/// does not match a tabulated line shape is preserved as `Raw`.
pub fn parse_tac_text(text: &str) -> Vec<Quad> {
    let mut quads = Vec::new();

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        // annotations kept verbatim
        if line.starts_with("FUNC ")
            || line.starts_with('#')
            || line.starts_with(".frame")
            || line.starts_with(".param")
            || line.starts_with(".endframe")
        {
            quads.push(Quad::Raw(line.to_string()));
            continue;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();

        if tokens.len() == 2 && eq_kw(tokens[0], "ActivationRecord") && is_ident(tokens[1]) {
            quads.push(Quad::ActivationRecord {
                name: tokens[1].to_string(),
            });
            continue;
        }

        // if <id> == 0 goto <L>
        if tokens.len() == 6
            && eq_kw(tokens[0], "if")
            && tokens[2] == "=="
            && tokens[3] == "0"
            && eq_kw(tokens[4], "goto")
            && is_ident(tokens[1])
            && is_ident(tokens[5])
        {
            quads.push(Quad::IfZ {
                src: tokens[1].to_string(),
                label: tokens[5].to_string(),
            });
            continue;
        }

        // labels: `<id>:`, but nothing starting with '.'
        if line.ends_with(':') && !line.starts_with('.') {
            let name = line[..line.len() - 1].trim();
            if is_ident(name) {
                quads.push(Quad::Label(name.to_string()));
                continue;
            }
        }

        if tokens.len() == 3
            && eq_kw(tokens[0], "BeginFunc")
            && is_ident(tokens[1])
            && let Ok(n) = tokens[2].parse::<usize>()
        {
            quads.push(Quad::BeginFunc {
                name: tokens[1].to_string(),
                local_bytes: n,
            });
            continue;
        }

        if tokens.len() == 1 && eq_kw(tokens[0], "EndFunc") {
            quads.push(Quad::EndFunc);
            continue;
        }

        // IfZ <src> goto <L>
        if !tokens.is_empty() && eq_kw(tokens[0], "IfZ") {
            if let Some(goto_pos) = tokens.iter().position(|t| eq_kw(t, "goto"))
                && goto_pos > 1
                && goto_pos + 2 == tokens.len()
            {
                quads.push(Quad::IfZ {
                    src: tokens[1..goto_pos].join(" "),
                    label: tokens[goto_pos + 1].to_string(),
                });
                continue;
            }
            quads.push(Quad::Raw(line.to_string()));
            continue;
        }

        if tokens.len() == 2 && eq_kw(tokens[0], "Goto") && is_ident(tokens[1]) {
            quads.push(Quad::Goto(tokens[1].to_string()));
            continue;
        }

        if !tokens.is_empty() && eq_kw(tokens[0], "return") {
            let rest = line[tokens[0].len()..].trim();
            quads.push(Quad::Return {
                src: if rest.is_empty() {
                    None
                } else {
                    Some(rest.to_string())
                },
            });
            continue;
        }

        // Param [<i>,] <src>
        if !tokens.is_empty() && eq_kw(tokens[0], "Param") {
            let rest = line[tokens[0].len()..].trim();
            if !rest.starts_with('"')
                && let Some((idx_part, src_part)) = rest.split_once(',')
                && let Ok(index) = idx_part.trim().parse::<usize>()
            {
                quads.push(Quad::Param {
                    index: Some(index),
                    src: src_part.trim().to_string(),
                });
                continue;
            }
            if !rest.is_empty() {
                quads.push(Quad::Param {
                    index: None,
                    src: rest.to_string(),
                });
                continue;
            }
        }

        // call [method] <fn>, <argc>   (no destination)
        if !tokens.is_empty()
            && eq_kw(tokens[0], "call")
            && let Some(call) = parse_call(line[tokens[0].len()..].trim(), None)
        {
            quads.push(call);
            continue;
        }

        // <dst> = <rhs>
        if let Some(eq_pos) = find_assign_eq(line) {
            let dst = line[..eq_pos].trim();
            let rhs = line[eq_pos + 1..].trim();
            if is_ident(dst) && !rhs.is_empty() {
                quads.push(parse_rhs(dst, rhs));
                continue;
            }
        }

        // setprop <obj>, <field>, <src>
        if !tokens.is_empty() && eq_kw(tokens[0], "setprop") {
            let rest = line[tokens[0].len()..].trim();
            if let Some((obj, rest)) = rest.split_once(',')
                && let Some((field, src)) = rest.split_once(',')
                && is_ident(obj.trim())
                && is_ident(field.trim())
            {
                quads.push(Quad::SetProp {
                    obj: obj.trim().to_string(),
                    field: field.trim().to_string(),
                    src: src.trim().to_string(),
                });
                continue;
            }
        }

        quads.push(Quad::Raw(line.to_string()));
    }

    quads
}

/// First `=` that is not part of a two-character comparison operator
fn find_assign_eq(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b != b'=' {
            continue;
        }
        let prev = if i > 0 { bytes[i - 1] } else { b' ' };
        let next = if i + 1 < bytes.len() { bytes[i + 1] } else { b' ' };
        if next == b'=' || matches!(prev, b'=' | b'!' | b'<' | b'>') {
            continue;
        }
        return Some(i);
    }
    None
}

/// `[method] <fn>, <argc>` after the `call` keyword
fn parse_call(rest: &str, dst: Option<&str>) -> Option<Quad> {
    let (left, right) = rest.rsplit_once(',')?;
    let argc: usize = right.trim().parse().ok()?;
    let left = left.trim();
    let func = if let Some(name) = left
        .split_once(char::is_whitespace)
        .filter(|(head, _)| eq_kw(head, "method"))
        .map(|(_, tail)| tail.trim())
    {
        if !is_ident(name) {
            return None;
        }
        format!("method {}", name)
    } else {
        if !is_ident(left) {
            return None;
        }
        left.to_string()
    };
    Some(Quad::Call {
        dst: dst.map(str::to_string),
        func,
        argc,
    })
}

fn parse_rhs(dst: &str, rhs: &str) -> Quad {
    let dst = dst.to_string();
    let tokens: Vec<&str> = rhs.split_whitespace().collect();

    if !tokens.is_empty() && eq_kw(tokens[0], "call") {
        if let Some(call) = parse_call(rhs[tokens[0].len()..].trim(), Some(&dst)) {
            return call;
        }
        return Quad::Raw(format!("{} = {}", dst, rhs));
    }

    if tokens.len() == 2
        && eq_kw(tokens[0], "LoadParam")
        && let Ok(index) = tokens[1].parse::<usize>()
    {
        return Quad::LoadParam { dst, index };
    }

    if !tokens.is_empty() && eq_kw(tokens[0], "getprop") {
        let rest = rhs[tokens[0].len()..].trim();
        if let Some((obj, field)) = rest.split_once(',')
            && is_ident(obj.trim())
            && is_ident(field.trim())
        {
            return Quad::GetProp {
                dst,
                obj: obj.trim().to_string(),
                field: field.trim().to_string(),
            };
        }
    }

    // <dst> = this.<field>
    if let Some(field) = rhs.strip_prefix("this.")
        && is_ident(field)
    {
        return Quad::GetProp {
            dst,
            obj: "this".to_string(),
            field: field.to_string(),
        };
    }

    if tokens.len() == 2 && eq_kw(tokens[0], "new") && is_ident(tokens[1]) {
        return Quad::New {
            dst,
            class: tokens[1].to_string(),
        };
    }

    // relational before arithmetic, two-character symbols before one
    const OPS: [(&str, BinKind); 11] = [
        ("<=", BinKind::Le),
        (">=", BinKind::Ge),
        ("==", BinKind::Eq),
        ("!=", BinKind::Ne),
        ("<", BinKind::Lt),
        (">", BinKind::Gt),
        ("+", BinKind::Add),
        ("-", BinKind::Sub),
        ("*", BinKind::Mul),
        ("/", BinKind::Div),
        ("%", BinKind::Mod),
    ];
    for (symbol, op) in OPS {
        if let Some(pos) = find_op(rhs, symbol) {
            let a = rhs[..pos].trim().to_string();
            let b = rhs[pos + symbol.len()..].trim().to_string();
            if !a.is_empty() && !b.is_empty() {
                return Quad::Bin { op, dst, a, b };
            }
        }
    }

    Quad::Assign {
        dst,
        src: rhs.to_string(),
    }
}

// ---- copy coalescing ----

/// Simple operand: identifier, temporary, numeric literal, dotted access,
/// or a quoted string literal.
fn is_simple_operand(s: &str) -> bool {
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        return true;
    }
    !s.is_empty() && !s.contains(' ') && !s.contains(',') && !s.contains('"')
}

fn is_temp_name(s: &str) -> bool {
    s.strip_prefix('t')
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

/// Count whole-word occurrences of `name` outside string quotes
fn count_word(line: &str, name: &str) -> usize {
    find_word_positions(line, name).len()
}

fn find_word_positions(line: &str, name: &str) -> Vec<usize> {
    let bytes = line.as_bytes();
    let nlen = name.len();
    let mut positions = Vec::new();
    let mut in_string = false;
    let mut i = 0;
    let word = |b: u8| (b as char).is_alphanumeric() || b == b'_';
    while i < bytes.len() {
        if bytes[i] == b'"' && (i == 0 || bytes[i - 1] != b'\\') {
            in_string = !in_string;
            i += 1;
            continue;
        }
        if !in_string && line[i..].starts_with(name) {
            let prev_ok = i == 0 || !word(bytes[i - 1]);
            let next_ok = i + nlen >= bytes.len() || !word(bytes[i + nlen]);
            if prev_ok && next_ok {
                positions.push(i);
                i += nlen;
                continue;
            }
        }
        i += 1;
    }
    positions
}

fn replace_word(line: &str, name: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut last = 0;
    for pos in find_word_positions(line, name) {
        out.push_str(&line[last..pos]);
        out.push_str(replacement);
        last = pos + name.len();
    }
    out.push_str(&line[last..]);
    out
}

/// Eliminate single-use temporary copies and self-copies from TAC text.
///
/// A line `tA = <rhs>` with a simple right-hand side is deleted when `tA`
/// appears exactly once elsewhere, and that single use is rewritten to
/// `<rhs>`. Label lines are never rewritten. The pass runs once and is
/// idempotent.
pub fn coalesce_copies(text: &str) -> String {
    let mut lines: Vec<String> = text.lines().map(str::to_string).collect();

    // self-copies vanish outright
    lines.retain(|line| {
        let trimmed = line.trim();
        match trimmed.split_once('=') {
            Some((dst, src)) => {
                let dst = dst.trim();
                let src = src.trim();
                !(is_temp_name(dst) && dst == src)
            }
            None => true,
        }
    });

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i].trim().to_string();
        let Some(eq_pos) = find_assign_eq(&line) else {
            i += 1;
            continue;
        };
        let dst = line[..eq_pos].trim().to_string();
        let rhs = line[eq_pos + 1..].trim().to_string();
        if !is_temp_name(&dst) || !is_simple_operand(&rhs) {
            i += 1;
            continue;
        }

        let mut uses = Vec::new();
        for (j, other) in lines.iter().enumerate() {
            if j == i {
                continue;
            }
            let n = count_word(other, &dst);
            if n > 0 {
                uses.push((j, n));
            }
        }
        let single_use = uses.len() == 1 && uses[0].1 == 1;
        if !single_use {
            i += 1;
            continue;
        }

        let (j, _) = uses[0];
        let use_line = lines[j].trim();
        // never rewrite labels, and never fold into a redefinition of tA
        let is_label = use_line.ends_with(':');
        let redefines = find_assign_eq(use_line)
            .is_some_and(|p| use_line[..p].trim() == dst);
        if is_label || redefines {
            i += 1;
            continue;
        }

        lines[j] = replace_word(&lines[j], &dst, &rhs);
        lines.remove(i);
        // the rewritten line may itself have become a candidate; do not
        // advance so cascades settle in this one pass
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_function_frame_lines() {
        let quads = parse_tac_text("FUNC main_START:\nBeginFunc main 0\nActivationRecord main\nEndFunc");
        assert_eq!(quads[0], Quad::Raw("FUNC main_START:".to_string()));
        assert_eq!(
            quads[1],
            Quad::BeginFunc {
                name: "main".to_string(),
                local_bytes: 0
            }
        );
        assert_eq!(
            quads[2],
            Quad::ActivationRecord {
                name: "main".to_string()
            }
        );
        assert_eq!(quads[3], Quad::EndFunc);
    }

    #[test]
    fn test_parse_branch_forms() {
        let quads = parse_tac_text("if t1 == 0 goto L2\nIfZ x goto L3\ngoto L1\nL1:");
        assert_eq!(
            quads[0],
            Quad::IfZ {
                src: "t1".to_string(),
                label: "L2".to_string()
            }
        );
        assert_eq!(
            quads[1],
            Quad::IfZ {
                src: "x".to_string(),
                label: "L3".to_string()
            }
        );
        assert_eq!(quads[2], Quad::Goto("L1".to_string()));
        assert_eq!(quads[3], Quad::Label("L1".to_string()));
    }

    #[test]
    fn test_parse_keywords_case_insensitive() {
        let quads = parse_tac_text("BEGINFUNC f 2\nendfunc\nGOTO L1\nRETURN t1\nparam 3");
        assert!(matches!(quads[0], Quad::BeginFunc { .. }));
        assert_eq!(quads[1], Quad::EndFunc);
        assert_eq!(quads[2], Quad::Goto("L1".to_string()));
        assert_eq!(
            quads[3],
            Quad::Return {
                src: Some("t1".to_string())
            }
        );
        assert_eq!(
            quads[4],
            Quad::Param {
                index: None,
                src: "3".to_string()
            }
        );
    }

    #[test]
    fn test_parse_call_forms() {
        let quads = parse_tac_text(
            "call print, 1\nt1 = call suma, 2\nt2 = call method saludar, 2\ncall method constructor, 3",
        );
        assert_eq!(
            quads[0],
            Quad::Call {
                dst: None,
                func: "print".to_string(),
                argc: 1
            }
        );
        assert_eq!(
            quads[1],
            Quad::Call {
                dst: Some("t1".to_string()),
                func: "suma".to_string(),
                argc: 2
            }
        );
        // the method marker must survive parsing for receiver reordering
        assert_eq!(
            quads[2],
            Quad::Call {
                dst: Some("t2".to_string()),
                func: "method saludar".to_string(),
                argc: 2
            }
        );
        assert_eq!(
            quads[3],
            Quad::Call {
                dst: None,
                func: "method constructor".to_string(),
                argc: 3
            }
        );
    }

    #[test]
    fn test_parse_indexed_param() {
        let quads = parse_tac_text("Param 2, t4");
        assert_eq!(
            quads[0],
            Quad::Param {
                index: Some(2),
                src: "t4".to_string()
            }
        );
    }

    #[test]
    fn test_parse_property_forms() {
        let quads = parse_tac_text(
            "t1 = getprop p, nombre\nsetprop this, edad, p_edad\nt2 = this.nombre\nt3 = new Persona",
        );
        assert_eq!(
            quads[0],
            Quad::GetProp {
                dst: "t1".to_string(),
                obj: "p".to_string(),
                field: "nombre".to_string()
            }
        );
        assert_eq!(
            quads[1],
            Quad::SetProp {
                obj: "this".to_string(),
                field: "edad".to_string(),
                src: "p_edad".to_string()
            }
        );
        assert_eq!(
            quads[2],
            Quad::GetProp {
                dst: "t2".to_string(),
                obj: "this".to_string(),
                field: "nombre".to_string()
            }
        );
        assert_eq!(
            quads[3],
            Quad::New {
                dst: "t3".to_string(),
                class: "Persona".to_string()
            }
        );
    }

    #[test]
    fn test_parse_binary_and_relational() {
        let quads = parse_tac_text("t1 = t1 + t2\nt3 = a <= b\nt4 = t4 % 2\nt5 = -5 - 3");
        assert_eq!(
            quads[0],
            Quad::Bin {
                op: BinKind::Add,
                dst: "t1".to_string(),
                a: "t1".to_string(),
                b: "t2".to_string()
            }
        );
        assert_eq!(
            quads[1],
            Quad::Bin {
                op: BinKind::Le,
                dst: "t3".to_string(),
                a: "a".to_string(),
                b: "b".to_string()
            }
        );
        assert_eq!(
            quads[2],
            Quad::Bin {
                op: BinKind::Mod,
                dst: "t4".to_string(),
                a: "t4".to_string(),
                b: "2".to_string()
            }
        );
        assert_eq!(
            quads[3],
            Quad::Bin {
                op: BinKind::Sub,
                dst: "t5".to_string(),
                a: "-5".to_string(),
                b: "3".to_string()
            }
        );
    }

    #[test]
    fn test_parse_assign_does_not_split_inside_strings() {
        let quads = parse_tac_text(r#"s = "a + b""#);
        assert_eq!(
            quads[0],
            Quad::Assign {
                dst: "s".to_string(),
                src: r#""a + b""#.to_string()
            }
        );
    }

    #[test]
    fn test_unrecognized_lines_become_raw() {
        let quads = parse_tac_text("whatever this is\n# a comment");
        assert_eq!(quads[0], Quad::Raw("whatever this is".to_string()));
        assert_eq!(quads[1], Quad::Raw("# a comment".to_string()));
    }

    #[test]
    fn test_display_roundtrip() {
        let text = "BeginFunc f 2\np_a = LoadParam 0\nt1 = p_a + 1\nParam t1\nt2 = call method m, 2\nreturn t2\nEndFunc";
        let quads = parse_tac_text(text);
        let printed: Vec<String> = quads.iter().map(|q| q.to_string()).collect();
        let reparsed = parse_tac_text(&printed.join("\n"));
        assert_eq!(quads, reparsed);
    }

    #[test]
    fn test_coalesce_removes_self_copies() {
        let out = coalesce_copies("t1 = t1\nx = 1");
        assert_eq!(out, "x = 1");
    }

    #[test]
    fn test_coalesce_single_use_copy() {
        let out = coalesce_copies("t1 = x\nParam t1\ncall print, 1");
        assert_eq!(out, "Param x\ncall print, 1");
    }

    #[test]
    fn test_coalesce_keeps_multi_use_temporaries() {
        let input = "t1 = 2\nt1 = t1 + t2\nx = t1";
        assert_eq!(coalesce_copies(input), input);
    }

    #[test]
    fn test_coalesce_cascades_in_one_pass() {
        let out = coalesce_copies("t1 = x\nt2 = t1\ny = t2");
        assert_eq!(out, "y = x");
    }

    #[test]
    fn test_coalesce_never_rewrites_labels() {
        let input = "L1:\nt9 = 5\ngoto L1";
        assert_eq!(coalesce_copies(input), input);
    }

    #[test]
    fn test_coalesce_is_idempotent() {
        let input = "t1 = x\nParam t1\nt2 = 3\nt3 = t2 + 1\ny = t3\ncall print, 1";
        let once = coalesce_copies(input);
        let twice = coalesce_copies(&once);
        assert_eq!(once, twice);
    }
}
