//! Compiscript Compiler Library
//!
//! Translates Compiscript source text through three intermediate
//! representations: an AST produced by parsing, a three-address code
//! sequence produced by the semantic/lowering passes, and a MIPS-like
//! assembly listing produced by instruction selection over quadruples.
//!
//! Pipeline: `source -> AST -> S1 (symbol table + type check) ->
//! S2 (TAC text) -> S3 (copy coalescing + quad parsing) -> S4 (MIPS)`.
//! A non-empty semantic error list aborts the pipeline before TAC
//! generation; the later stages never fail, degrading to comments
//! instead. Any panic during compilation is caught at this boundary and
//! reported as a single error diagnostic.

pub mod ast;
pub mod codegen;
pub mod config;
pub mod diagnostics;
pub mod parser;
pub mod semantic;
pub mod symtab;
pub mod tac;
pub mod tacgen;
pub mod types;

pub use codegen::{FieldLayouts, MipsEmitter};
pub use config::CompilerConfig;
pub use diagnostics::{Diagnostic, Severity, Timings};
pub use parser::{ParseError, Parser, parse_source};
pub use semantic::{Analysis, SemanticAnalyzer};
pub use tac::{Quad, coalesce_copies, parse_tac_text};
pub use tacgen::TacGenerator;
pub use types::{ClassRegistry, FunctionType, Type};

use std::time::Instant;

/// Everything a driver or IDE shell needs from one compilation
#[derive(Debug, Default)]
pub struct CompileOutput {
    /// Parse and semantic diagnostics, in source order
    pub diagnostics: Vec<Diagnostic>,
    /// User-visible message block: timing line plus diagnostics or the
    /// success confirmations
    pub messages: String,
    /// Optimized TAC text (empty when the pipeline aborted)
    pub tac_text: String,
    /// MIPS assembly text (empty when the pipeline aborted)
    pub asm_text: String,
    /// Scope tree export for IDE symbol panels
    pub symbol_tree: Option<serde_json::Value>,
    pub timings: Timings,
}

impl CompileOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Compile source text end to end
pub fn compile(source: &str, config: &CompilerConfig) -> CompileOutput {
    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        compile_stages(source, config)
    }));
    match outcome {
        Ok(output) => output,
        Err(_) => {
            tracing::warn!("compilation aborted by an internal failure");
            let diagnostics = vec![Diagnostic::error_unlocated(
                "internal compiler error: compilation aborted",
            )];
            let timings = Timings::default();
            let messages = diagnostics::format_messages(&diagnostics, &timings, false, false);
            CompileOutput {
                diagnostics,
                messages,
                ..CompileOutput::default()
            }
        }
    }
}

fn compile_stages(source: &str, config: &CompilerConfig) -> CompileOutput {
    let mut output = CompileOutput::default();

    // parse
    let t0 = Instant::now();
    let parsed = parse_source(source);
    output.timings.parse_ms = t0.elapsed().as_millis();
    let program = match parsed {
        Ok(program) => program,
        Err(err) => {
            output
                .diagnostics
                .push(Diagnostic::error(err.line, err.col, err.message));
            output.messages =
                diagnostics::format_messages(&output.diagnostics, &output.timings, false, false);
            return output;
        }
    };

    // S1: symbol table + type check
    let t1 = Instant::now();
    let analysis = SemanticAnalyzer::analyze(&program);
    output.timings.semantic_ms = t1.elapsed().as_millis();
    output.symbol_tree = Some(analysis.scopes.to_json());
    output.diagnostics.extend(analysis.diagnostics.clone());
    if output.has_errors() {
        output.messages =
            diagnostics::format_messages(&output.diagnostics, &output.timings, false, false);
        return output;
    }

    // S2 + S3: TAC generation, copy coalescing
    let t2 = Instant::now();
    let raw_tac = TacGenerator::generate(&analysis, &program, &config.entry);
    output.tac_text = coalesce_copies(&raw_tac);
    output.timings.ir_ms = t2.elapsed().as_millis();

    // S4: quad parsing + MIPS emission
    let t3 = Instant::now();
    let quads = parse_tac_text(&output.tac_text);
    let mut emitter = MipsEmitter::new(FieldLayouts::from_classes(&analysis.classes))
        .with_entry(config.entry.clone())
        .with_spill_hint(config.spill_bytes_hint);
    emitter.from_quads(&quads);
    output.asm_text = emitter.build();
    output.timings.asm_ms = t3.elapsed().as_millis();

    output.messages = diagnostics::format_messages(&output.diagnostics, &output.timings, true, true);
    output
}

/// Compile source to optimized TAC text (for tests and tools)
pub fn compile_to_tac(source: &str) -> Result<String, String> {
    let output = compile(source, &CompilerConfig::default());
    if output.has_errors() {
        return Err(output.messages);
    }
    Ok(output.tac_text)
}

/// Compile source to MIPS assembly text
pub fn compile_to_asm(source: &str) -> Result<String, String> {
    let output = compile(source, &CompilerConfig::default());
    if output.has_errors() {
        return Err(output.messages);
    }
    Ok(output.asm_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_arithmetic_and_print_pipeline() {
        let output = compile(
            "let x: integer = 2 + 3 * 4; print(x);",
            &CompilerConfig::default(),
        );
        assert!(!output.has_errors(), "{}", output.messages);

        // TAC: one temporary for the product, in-place addition, the
        // assignment, and the call
        assert!(output.tac_text.contains("t2 = t2 * 4"), "{}", output.tac_text);
        assert!(output.tac_text.contains("t1 = t1 + t2"), "{}", output.tac_text);
        assert!(output.tac_text.contains("x = t1"), "{}", output.tac_text);
        assert!(output.tac_text.contains("Param x"), "{}", output.tac_text);
        assert!(output.tac_text.contains("call print, 1"), "{}", output.tac_text);

        // MIPS: literals, the product, caller saves around the call, and
        // the simulator exit
        assert!(output.asm_text.contains("li   "), "{}", output.asm_text);
        assert!(output.asm_text.contains("mul  "), "{}", output.asm_text);
        assert!(output.asm_text.contains("jal print"), "{}", output.asm_text);
        assert!(output.asm_text.contains("li   $v0, 10\n  syscall"), "{}", output.asm_text);
        assert!(output.messages.contains("TAC generated successfully."));
        assert!(output.messages.contains("MIPS assembly emitted."));
    }

    #[test]
    fn test_string_concat_pipeline() {
        let source = r#"
            class Persona {
              let nombre: string;
              function saluda(): string {
                let s: string = "hola " + nombre;
                return s;
              }
            }
        "#;
        let output = compile(source, &CompilerConfig::default());
        assert!(!output.has_errors(), "{}", output.messages);
        assert!(output.asm_text.contains("jal __strcat_new"), "{}", output.asm_text);
        assert!(
            output.asm_text.contains(".asciiz \"hola \""),
            "{}",
            output.asm_text
        );
        // the field read comes from offset 0 off the receiver
        assert!(output.asm_text.contains("lw   "), "{}", output.asm_text);
        assert!(output.asm_text.contains(", 0($a0)"), "{}", output.asm_text);
    }

    #[test]
    fn test_short_circuit_or_pipeline() {
        let source = "let a: boolean = true; let b: boolean = false; let x: integer = 0;\n\
                      if (a || b) { x = 1; }";
        let output = compile(source, &CompilerConfig::default());
        assert!(!output.has_errors(), "{}", output.messages);
        // exactly one result seed per path and one final test
        assert!(output.tac_text.contains("t1 = 0"), "{}", output.tac_text);
        assert!(output.tac_text.contains("t1 = 1"), "{}", output.tac_text);
        assert!(output.tac_text.contains("if t1 == 0 goto"), "{}", output.tac_text);
    }

    #[test]
    fn test_method_call_pipeline() {
        let source = r#"
            class Persona {
              let nombre: string;
              function saludar(veces: integer): void { }
            }
            let p: Persona = new Persona();
            p.saludar(3);
        "#;
        let output = compile(source, &CompilerConfig::default());
        assert!(!output.has_errors(), "{}", output.messages);
        assert!(
            output.tac_text.contains("Param 3\nParam p\nt1 = call method saludar, 2"),
            "{}",
            output.tac_text
        );
        assert!(output.asm_text.contains("jal saludar"), "{}", output.asm_text);
    }

    #[test]
    fn test_constructor_pipeline() {
        let source = r#"
            class Estudiante {
              let nombre: string;
              let edad: integer;
              constructor(nombre: string, edad: integer) { }
            }
            let e: Estudiante = new Estudiante("Ada", 30);
        "#;
        let output = compile(source, &CompilerConfig::default());
        assert!(!output.has_errors(), "{}", output.messages);
        assert!(
            output
                .tac_text
                .contains("Param \"Ada\"\nParam 30\nParam t1\nt2 = call method constructor, 3"),
            "{}",
            output.tac_text
        );
        assert!(
            output.tac_text.contains("setprop this, nombre, p_nombre"),
            "{}",
            output.tac_text
        );
        // allocation goes through syscall 9 with the computed size
        assert!(output.asm_text.contains("li   $v0, 9"), "{}", output.asm_text);
        assert!(output.asm_text.contains("li   $a0, 8"), "{}", output.asm_text);
    }

    #[test]
    fn test_semantic_errors_abort_before_tac() {
        let output = compile("let x: integer = y;", &CompilerConfig::default());
        assert!(output.has_errors());
        assert_eq!(output.tac_text, "");
        assert_eq!(output.asm_text, "");
        assert!(output.messages.starts_with("ERR "), "{}", output.messages);
        assert!(output.messages.contains("'y' has not been declared"));
    }

    #[test]
    fn test_parse_errors_abort_before_semantic() {
        let output = compile("let = 3;", &CompilerConfig::default());
        assert!(output.has_errors());
        assert!(output.symbol_tree.is_none());
        assert_eq!(output.tac_text, "");
    }

    #[test]
    fn test_symbol_tree_exported() {
        let output = compile(
            "function f(a: integer): void { }",
            &CompilerConfig::default(),
        );
        let tree = output.symbol_tree.expect("symbol tree");
        assert_eq!(tree["scope"], "global");
        let children = tree["children"].as_array().unwrap();
        assert!(children.iter().any(|c| c["scope"] == "func:f"));
    }

    #[test]
    fn test_coalescing_is_idempotent_over_generated_tac() {
        let tac = compile_to_tac(
            "let x: integer = 1 + 2; let y: integer = x * 3; print(y);",
        )
        .unwrap();
        assert_eq!(coalesce_copies(&tac), tac);
    }

    #[test]
    fn test_param_counts_match_call_argc() {
        let tac = compile_to_tac(
            "function f(a: integer, b: integer): integer { return a; }\n\
             let r: integer = f(1, 2); print(r);",
        )
        .unwrap();
        // every call is preceded by exactly argc Param lines
        let lines: Vec<&str> = tac.lines().collect();
        for (i, line) in lines.iter().enumerate() {
            if let Some(pos) = line.find("call ") {
                let argc: usize = line[pos..]
                    .rsplit(',')
                    .next()
                    .unwrap()
                    .trim()
                    .parse()
                    .unwrap();
                let mut count = 0;
                for prev in lines[..i].iter().rev() {
                    if prev.starts_with("Param ") {
                        count += 1;
                    } else {
                        break;
                    }
                }
                assert_eq!(count, argc, "at line {}: {}\n{}", i, line, tac);
            }
        }
    }

    #[test]
    fn test_custom_entry_label() {
        let config = CompilerConfig::new().with_entry("start");
        let output = compile("print(1);", &config);
        assert!(output.tac_text.contains("BeginFunc start 0"), "{}", output.tac_text);
        assert!(output.asm_text.contains(".globl start"), "{}", output.asm_text);
    }
}
