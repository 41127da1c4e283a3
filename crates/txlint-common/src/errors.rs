use serde::Serialize;

use crate::span::Span;

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A related source location providing additional context for a diagnostic.
#[derive(Debug, Clone, Serialize)]
pub struct RelatedSpan {
    pub span: Span,
    pub message: String,
}

/// A single analysis finding.
///
/// Findings are handed to an external sink as-is; the sink owns formatting.
/// `Serialize` covers sinks that want the machine-readable form.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: Option<Span>,
    pub related: Vec<RelatedSpan>,
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            span: None,
            related: Vec::new(),
            suggestion: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            span: None,
            related: Vec::new(),
            suggestion: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_related(mut self, span: Span, message: impl Into<String>) -> Self {
        self.related.push(RelatedSpan {
            span,
            message: message.into(),
        });
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        write!(f, "{}: {}", prefix, self.message)?;
        if let Some(ref span) = self.span {
            write!(f, "\n  --> {}", span)?;
        }
        Ok(())
    }
}

/// Convenience collector for diagnostics produced during one analysis run.
#[derive(Debug, Default)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.is_error())
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Position;

    fn span() -> Span {
        Span::new(
            "db.src",
            Position {
                line: 3,
                column: 5,
                offset: 42,
            },
            Position {
                line: 3,
                column: 10,
                offset: 47,
            },
        )
    }

    #[test]
    fn display_includes_severity_and_location() {
        let diag = Diagnostic::error("tree is malformed").with_span(span());
        assert_eq!(
            diag.to_string(),
            "error: tree is malformed\n  --> db.src:3:5"
        );
    }

    #[test]
    fn bag_distinguishes_warnings_from_errors() {
        let mut bag = DiagnosticBag::new();
        bag.report(Diagnostic::warning("receiver used in transaction").with_span(span()));
        assert!(!bag.has_errors());
        assert_eq!(bag.diagnostics().len(), 1);

        bag.report(Diagnostic::error("tree is malformed"));
        assert!(bag.has_errors());
    }
}
