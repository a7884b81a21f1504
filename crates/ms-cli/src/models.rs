use serde::Serialize;

use ms_core::{ExecutionResult, ExecutionStatus, ModScriptError, Warning};

pub(crate) const EXIT_SUCCESS: i32 = 0;
pub(crate) const EXIT_FAILED: i32 = 1;
pub(crate) const EXIT_ABORTED: i32 = 2;

/// Typed at a prompt, or listed in an answers file, to cancel the run.
pub(crate) const CANCEL_COMMAND: &str = ":cancel";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RunReport {
    pub(crate) status: ExecutionStatus,
    pub(crate) warnings: Vec<Warning>,
    pub(crate) installed_files: Vec<String>,
    pub(crate) ini_edits_applied: usize,
    pub(crate) error: Option<ModScriptError>,
}

impl RunReport {
    pub(crate) fn new(
        result: ExecutionResult,
        installed_files: Vec<String>,
        ini_edits_applied: usize,
    ) -> Self {
        Self {
            status: result.status,
            warnings: result.warnings,
            installed_files,
            ini_edits_applied,
            error: result.error,
        }
    }

    pub(crate) fn exit_code(&self) -> i32 {
        match self.status {
            ExecutionStatus::Success => EXIT_SUCCESS,
            ExecutionStatus::Failed => EXIT_FAILED,
            ExecutionStatus::AbortedByUser => EXIT_ABORTED,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CheckFailure {
    pub(crate) script: String,
    pub(crate) error: ModScriptError,
}
