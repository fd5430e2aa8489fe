use serde::Serialize;
use systf_contracts::SYSTF_CHECK_REPORT_SCHEMA_VERSION;

use crate::host::CallSite;
use crate::signature::ArgPredicate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
        }
    }
}

/// What went wrong with a call's arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiagnosticKind {
    MissingRequiredArgument,
    /// The sequence ran out at `position` (1-based, always >= 2).
    MissingSecondArgument { position: usize },
    WrongArgumentType { position: usize, expected: ArgPredicate },
    ExtraArguments { count: usize },
}

impl DiagnosticKind {
    pub fn code(self) -> &'static str {
        match self {
            DiagnosticKind::MissingRequiredArgument => "SYSTF-ARGS-0001",
            DiagnosticKind::MissingSecondArgument { .. } => "SYSTF-ARGS-0002",
            DiagnosticKind::WrongArgumentType { .. } => "SYSTF-ARGS-0003",
            DiagnosticKind::ExtraArguments { .. } => "SYSTF-ARGS-0004",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: &'static str,
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub routine: String,
    pub file: String,
    pub line: u32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continuation: Option<String>,
}

impl Diagnostic {
    pub fn error(call: &CallSite, kind: DiagnosticKind, message: String) -> Self {
        Diagnostic {
            code: kind.code(),
            severity: Severity::Error,
            kind,
            routine: call.name.clone(),
            file: call.file.clone(),
            line: call.line,
            message,
            continuation: None,
        }
    }

    pub fn with_continuation(mut self, text: String) -> Self {
        self.continuation = Some(text);
        self
    }

    /// `"ERROR: <file> line <line>: "`, including the trailing space.
    pub fn prefix(&self) -> String {
        format!("{}: {} line {}: ", self.severity.label(), self.file, self.line)
    }

    /// The continuation line is indented by exactly the prefix width so its text
    /// starts in the same column as the message body.
    pub fn render_lines(&self) -> Vec<String> {
        let prefix = self.prefix();
        let mut lines = vec![format!("{prefix}{}", self.message)];
        if let Some(text) = &self.continuation {
            lines.push(format!("{}{text}", " ".repeat(prefix.len())));
        }
        lines
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in self.render_lines() {
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub schema_version: String,
    pub ok: bool,
    pub calls_checked: usize,
    pub diagnostics_count: usize,
    pub diagnostics: Vec<Diagnostic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_code: Option<i32>,
}

impl Report {
    pub fn ok() -> Self {
        Self {
            schema_version: SYSTF_CHECK_REPORT_SCHEMA_VERSION.to_string(),
            ok: true,
            calls_checked: 0,
            diagnostics_count: 0,
            diagnostics: Vec::new(),
            finish_code: None,
        }
    }

    /// Orders by file then line. The sort is stable, so diagnostics from one call
    /// site keep the order they were emitted in.
    pub fn with_diagnostics(mut self, mut diagnostics: Vec<Diagnostic>) -> Self {
        diagnostics.sort_by(|a, b| a.file.cmp(&b.file).then_with(|| a.line.cmp(&b.line)));
        self.ok = diagnostics.iter().all(|d| d.severity != Severity::Error);
        self.diagnostics_count = diagnostics.len();
        self.diagnostics = diagnostics;
        self
    }

    pub fn with_calls_checked(mut self, n: usize) -> Self {
        self.calls_checked = n;
        self
    }

    pub fn with_finish_code(mut self, code: Option<i32>) -> Self {
        self.finish_code = code;
        if code.is_some() {
            self.ok = false;
        }
        self
    }
}
