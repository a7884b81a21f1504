use ms_runtime::{FailurePolicy, FunctionKind, FunctionSignature};

use crate::{json_string, print_error_lines, CheckFailure, RunReport};

fn status_name(report: &RunReport) -> String {
    serde_json::to_value(report.status)
        .ok()
        .and_then(|value| value.as_str().map(str::to_string))
        .unwrap_or_default()
}

pub(crate) fn emit_run_report(report: &RunReport) {
    println!("RESULT:OK");
    println!("STATUS:{}", status_name(report));
    for warning in &report.warnings {
        println!(
            "WARNING_JSON:{}",
            serde_json::to_string(warning).unwrap_or_else(|_| json_string(&warning.message))
        );
    }
    for file in &report.installed_files {
        println!("INSTALLED:{}", file);
    }
    println!("INI_EDITS_APPLIED:{}", report.ini_edits_applied);
    if let Some(error) = &report.error {
        print_error_lines(error);
    }
}

pub(crate) fn emit_check_report(checked: &[String], failures: &[CheckFailure]) -> i32 {
    println!("RESULT:{}", if failures.is_empty() { "OK" } else { "ERROR" });
    for script in checked {
        println!("CHECKED:{}", script);
    }
    for failure in failures {
        println!(
            "CHECK_ERROR:{}|{}|{}",
            failure.script,
            failure.error.code,
            json_string(&failure.error.describe())
        );
    }
    i32::from(!failures.is_empty())
}

pub(crate) fn describe_signature(signature: &FunctionSignature) -> String {
    let kind = match signature.kind {
        FunctionKind::Host => "host".to_string(),
        FunctionKind::Prompt(prompt) => format!(
            "prompt:{}",
            serde_json::to_value(prompt)
                .ok()
                .and_then(|value| value.as_str().map(str::to_string))
                .unwrap_or_default()
        ),
    };
    let policy = match signature.on_failure {
        FailurePolicy::Fatal => "fatal",
        FailurePolicy::Recoverable => "recoverable",
    };
    let returns = signature.returns.map(|ty| ty.name()).unwrap_or("void");
    format!(
        "FUNCTION:{}({})|{}|{}|{}",
        signature.name,
        signature.describe_params(),
        returns,
        kind,
        policy
    )
}

#[cfg(test)]
mod report_tests {
    use super::*;
    use ms_core::{ExecutionResult, ExecutionStatus, ValueType};
    use ms_runtime::Param;

    const PARAMS: &[Param] = &[Param::new("message", ValueType::String)];

    #[test]
    fn signatures_render_kind_and_policy() {
        let signature = FunctionSignature {
            name: "AskYesNo",
            params: PARAMS,
            variadic: None,
            returns: Some(ValueType::Bool),
            kind: FunctionKind::Prompt(ms_core::PromptKind::YesNo),
            on_failure: FailurePolicy::Fatal,
        };
        assert_eq!(
            describe_signature(&signature),
            "FUNCTION:AskYesNo(message: string)|boolean|prompt:yesNo|fatal"
        );
    }

    #[test]
    fn check_report_exit_code_follows_failures() {
        assert_eq!(emit_check_report(&["a.modscript".to_string()], &[]), 0);
        let failure = CheckFailure {
            script: "b.modscript".to_string(),
            error: ms_core::ModScriptError::usage("X", "broken"),
        };
        assert_eq!(emit_check_report(&[], &[failure]), 1);
    }

    #[test]
    fn status_names_are_camel_case() {
        let report = RunReport::new(
            ExecutionResult {
                status: ExecutionStatus::AbortedByUser,
                warnings: Vec::new(),
                error: None,
            },
            Vec::new(),
            0,
        );
        assert_eq!(status_name(&report), "abortedByUser");
        assert_eq!(report.exit_code(), 2);
    }
}
