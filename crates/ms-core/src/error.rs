use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::SourceSpan;

/// Coarse classification of a failure. Callers drive their messaging and
/// rollback decisions from this, the `code` stays the precise reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    Lex,
    Syntax,
    TypeArity,
    Runtime,
    HostFatal,
    Usage,
    Io,
}

impl ErrorKind {
    /// Lex and syntax errors mean the script never started.
    pub fn is_static(self) -> bool {
        matches!(self, Self::Lex | Self::Syntax)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct ModScriptError {
    pub kind: ErrorKind,
    pub code: String,
    pub message: String,
    pub span: Option<SourceSpan>,
}

impl ModScriptError {
    pub fn new(kind: ErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
            span: None,
        }
    }

    pub fn with_span(
        kind: ErrorKind,
        code: impl Into<String>,
        message: impl Into<String>,
        span: SourceSpan,
    ) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
            span: Some(span),
        }
    }

    pub fn lex(code: impl Into<String>, message: impl Into<String>, span: SourceSpan) -> Self {
        Self::with_span(ErrorKind::Lex, code, message, span)
    }

    pub fn syntax(code: impl Into<String>, message: impl Into<String>, span: SourceSpan) -> Self {
        Self::with_span(ErrorKind::Syntax, code, message, span)
    }

    pub fn type_arity(
        code: impl Into<String>,
        message: impl Into<String>,
        span: SourceSpan,
    ) -> Self {
        Self::with_span(ErrorKind::TypeArity, code, message, span)
    }

    pub fn runtime(code: impl Into<String>, message: impl Into<String>, span: SourceSpan) -> Self {
        Self::with_span(ErrorKind::Runtime, code, message, span)
    }

    pub fn usage(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Usage, code, message)
    }

    /// Message with the `line:column` prefix when a position is known.
    pub fn describe(&self) -> String {
        match &self.span {
            Some(span) => format!(
                "{}:{}: {}",
                span.start.line, span.start.column, self.message
            ),
            None => self.message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceLocation;

    #[test]
    fn display_uses_code_and_message() {
        let error = ModScriptError::usage("ENGINE_NO_PENDING_PROMPT", "No prompt is pending.");
        assert_eq!(
            error.to_string(),
            "ENGINE_NO_PENDING_PROMPT: No prompt is pending."
        );
        assert_eq!(error.describe(), "No prompt is pending.");
    }

    #[test]
    fn describe_prefixes_position() {
        let span = SourceSpan::at(SourceLocation { line: 3, column: 7 });
        let error = ModScriptError::syntax("PARSE_EXPECTED", "expected 'endif'", span);
        assert_eq!(error.describe(), "3:7: expected 'endif'");
        assert!(error.kind.is_static());
    }

    #[test]
    fn serializes_kind_in_camel_case() {
        let error = ModScriptError::new(ErrorKind::HostFatal, "HOST_FATAL", "copy failed");
        let json = serde_json::to_value(&error).expect("error should serialize");
        assert_eq!(json["kind"], "hostFatal");
        assert_eq!(json["code"], "HOST_FATAL");
    }
}
