use serde::{Deserialize, Serialize};

use crate::error::ModScriptError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: SourceLocation,
    pub end: SourceLocation,
}

impl SourceSpan {
    pub fn synthetic() -> Self {
        Self::at(SourceLocation { line: 1, column: 1 })
    }

    pub fn at(location: SourceLocation) -> Self {
        Self {
            start: location,
            end: location,
        }
    }

    pub fn to(self, other: SourceSpan) -> Self {
        Self {
            start: self.start,
            end: other.end,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PromptKind {
    YesNo,
    Select,
    Text,
    Notice,
}

/// A user interaction the engine is waiting on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingPrompt {
    pub function: String,
    pub kind: PromptKind,
    pub message: String,
    pub options: Vec<String>,
    pub default_text: Option<String>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExecutionStatus {
    Success,
    Failed,
    AbortedByUser,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warning {
    pub message: String,
    pub function: Option<String>,
    pub span: Option<SourceSpan>,
}

impl Warning {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            function: None,
            span: None,
        }
    }

    pub fn from_call(function: &str, message: impl Into<String>, span: SourceSpan) -> Self {
        Self {
            message: message.into(),
            function: Some(function.to_string()),
            span: Some(span),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub status: ExecutionStatus,
    pub warnings: Vec<Warning>,
    pub error: Option<ModScriptError>,
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EngineOutput {
    Prompt { prompt: PendingPrompt },
    Finished { result: ExecutionResult },
}
