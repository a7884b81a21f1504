use ms_api::{compile_script, Dialect};
use ms_core::ModScriptError;
use ms_parser::{parse_script, print_script};

use crate::{
    describe_signature, emit_check_report, read_script_file, read_scripts_from_dir, resolve_dir,
    CheckArgs, CheckFailure,
};

pub(crate) fn check<D: Dialect>(dialect: &D, args: &CheckArgs) -> Result<i32, ModScriptError> {
    let mut checked = Vec::new();
    let mut failures = Vec::new();

    let scripts = match (&args.script, &args.scripts_dir) {
        (Some(script), _) => vec![(script.clone(), read_script_file(script)?)],
        (None, Some(dir)) => read_scripts_from_dir(&resolve_dir(dir, "scripts-dir")?)?
            .into_iter()
            .collect(),
        (None, None) => {
            return Err(ModScriptError::usage(
                "CLI_CHECK_NO_INPUT",
                "Either --script or --scripts-dir is required.",
            ))
        }
    };

    for (script, source) in scripts {
        match compile_script(dialect, &source) {
            Ok(_) => checked.push(script),
            Err(error) => {
                tracing::warn!(%script, code = %error.code, "script does not compile");
                failures.push(CheckFailure { script, error });
            }
        }
    }

    Ok(emit_check_report(&checked, &failures))
}

/// Prints the canonical form; comments survive only in dialects that keep them.
pub(crate) fn format<D: Dialect>(dialect: &D, script: &str) -> Result<i32, ModScriptError> {
    let source = read_script_file(script)?;
    let parsed = parse_script(&source, &dialect.grammar())?;
    print!("{}", print_script(&parsed));
    Ok(0)
}

pub(crate) fn functions<D: Dialect>(dialect: &D) -> Result<i32, ModScriptError> {
    println!("RESULT:OK");
    println!("DIALECT:{}", dialect.id());
    for signature in dialect.functions() {
        println!("{}", describe_signature(&signature));
    }
    Ok(0)
}
