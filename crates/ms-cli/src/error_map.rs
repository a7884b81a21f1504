use std::fmt::Display;

use ms_core::{ErrorKind, ModScriptError};

fn map_error(code: &'static str, error: impl Display) -> ModScriptError {
    ModScriptError::new(ErrorKind::Io, code, error.to_string())
}

pub(crate) fn json_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

pub(crate) fn emit_error(error: ModScriptError) -> i32 {
    println!("RESULT:ERROR");
    print_error_lines(&error);
    1
}

pub(crate) fn print_error_lines(error: &ModScriptError) {
    println!("ERROR_CODE:{}", error.code);
    println!(
        "ERROR_KIND:{}",
        serde_json::to_value(error.kind)
            .ok()
            .and_then(|value| value.as_str().map(str::to_string))
            .unwrap_or_default()
    );
    println!("ERROR_MSG_JSON:{}", json_string(&error.describe()));
}

pub(crate) fn map_prompt_io(error: std::io::Error) -> ModScriptError {
    map_error("CLI_PROMPT_IO", error)
}

pub(crate) fn map_cli_source_path(error: std::io::Error) -> ModScriptError {
    map_error("CLI_SOURCE_PATH", error)
}

pub(crate) fn map_cli_source_scan(error: std::path::StripPrefixError) -> ModScriptError {
    map_error("CLI_SOURCE_SCAN", error)
}

pub(crate) fn map_cli_source_read(error: std::io::Error) -> ModScriptError {
    map_error("CLI_SOURCE_READ", error)
}

pub(crate) fn map_cli_answers_read(error: std::io::Error) -> ModScriptError {
    map_error("CLI_ANSWERS_READ", error)
}

pub(crate) fn map_cli_answers_invalid(error: serde_json::Error) -> ModScriptError {
    map_error("CLI_ANSWERS_INVALID", error)
}
