//! Diagnostics and timing reports for the compiler pipeline.
//!
//! Diagnostics carry an optional source position; a position of `None`
//! renders as `-` so the message format stays stable for IDE consumers.

use serde::Serialize;

/// Severity level for compiler diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single diagnostic record: `line <l>:<c> <message>`
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub line: Option<usize>,
    pub col: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    /// Error with a known source position
    pub fn error(line: usize, col: usize, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Error,
            line: Some(line),
            col: Some(col),
            message: message.into(),
        }
    }

    /// Error without a source position (driver-boundary failures)
    pub fn error_unlocated(message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Error,
            line: None,
            col: None,
            message: message.into(),
        }
    }

    /// Warning without a source position
    pub fn warning_unlocated(message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            line: None,
            col: None,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let line = self
            .line
            .map(|l| l.to_string())
            .unwrap_or_else(|| "-".to_string());
        let col = self
            .col
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        write!(f, "line {}:{} {}", line, col, self.message)
    }
}

/// Per-stage wall-clock timings in milliseconds, measured post-hoc
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Timings {
    pub parse_ms: u128,
    pub semantic_ms: u128,
    pub ir_ms: u128,
    pub asm_ms: u128,
}

impl Timings {
    /// One-line summary shown ahead of diagnostics
    pub fn summary_line(&self, ok: bool) -> String {
        let tag = if ok { "OK" } else { "ERR" };
        format!(
            "{} Parse {} ms | Semantic {} ms | IR {} ms | ASM {} ms",
            tag, self.parse_ms, self.semantic_ms, self.ir_ms, self.asm_ms
        )
    }
}

/// Format the user-visible message block: a timing summary first, then
/// either diagnostics or the success confirmation lines.
pub fn format_messages(
    diagnostics: &[Diagnostic],
    timings: &Timings,
    tac_ok: bool,
    asm_ok: bool,
) -> String {
    let has_errors = diagnostics.iter().any(Diagnostic::is_error);
    let head = timings.summary_line(!has_errors && tac_ok);
    if !has_errors {
        let mut out = head;
        if tac_ok {
            out.push_str("\nTAC generated successfully.");
        }
        if asm_ok {
            out.push_str("\nMIPS assembly emitted.");
        }
        if tac_ok {
            out.push_str("\nCompilation finished without errors.");
        }
        return out;
    }
    let body: Vec<String> = diagnostics.iter().map(|d| d.to_string()).collect();
    format!("{}\n{}", head, body.join("\n"))
}
