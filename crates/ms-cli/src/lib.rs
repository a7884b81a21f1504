use std::ffi::OsString;

use clap::Parser;
use ms_api::state_of_decay::StateOfDecay;
use ms_api::DialectId;
use ms_core::ModScriptError;

mod cli_args;
mod commands;
mod error_map;
mod logging;
mod models;
mod prompt_runner;
mod report;
mod session;
mod source_loader;

pub(crate) use cli_args::{CheckArgs, Cli, FormatArgs, FunctionsArgs, Mode, RunArgs};
pub(crate) use error_map::{
    emit_error, json_string, map_cli_answers_invalid, map_cli_answers_read, map_cli_source_path,
    map_cli_source_read, map_cli_source_scan, map_prompt_io, print_error_lines,
};
pub(crate) use models::{CheckFailure, RunReport, CANCEL_COMMAND, EXIT_FAILED, EXIT_SUCCESS};
pub(crate) use prompt_runner::{load_answers, PromptResponder};
pub(crate) use report::{describe_signature, emit_check_report, emit_run_report};
pub(crate) use source_loader::{read_script_file, read_scripts_from_dir, resolve_dir};

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            // `--help` is not a failure.
            return if error.use_stderr() {
                EXIT_FAILED
            } else {
                EXIT_SUCCESS
            };
        }
    };
    logging::init_tracing(cli.log.as_deref());
    match run(cli) {
        Ok(code) => code,
        Err(error) => emit_error(error),
    }
}

fn run(cli: Cli) -> Result<i32, ModScriptError> {
    match cli.command {
        Mode::Check(args) => match args.dialect.parse::<DialectId>()? {
            DialectId::StateOfDecay => commands::check(&StateOfDecay, &args),
        },
        Mode::Format(args) => run_format(args),
        Mode::Functions(args) => run_functions(args),
        Mode::Run(args) => match args.dialect.parse::<DialectId>()? {
            DialectId::StateOfDecay => session::run_state_of_decay(&args),
        },
    }
}

fn run_format(args: FormatArgs) -> Result<i32, ModScriptError> {
    match args.dialect.parse::<DialectId>()? {
        DialectId::StateOfDecay => commands::format(&StateOfDecay, &args.script),
    }
}

fn run_functions(args: FunctionsArgs) -> Result<i32, ModScriptError> {
    match args.dialect.parse::<DialectId>()? {
        DialectId::StateOfDecay => commands::functions(&StateOfDecay),
    }
}

#[cfg(test)]
pub(crate) mod cli_test_support {
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::time::{SystemTime, UNIX_EPOCH};

    pub(crate) fn temp_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time should be monotonic")
            .as_nanos();
        std::env::temp_dir().join(format!("modscript-rs-{}-{}", name, nanos))
    }

    pub(crate) fn write_file(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("parent should be created");
        }
        fs::write(path, content).expect("file should be written");
    }
}
