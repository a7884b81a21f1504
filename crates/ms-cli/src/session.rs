use std::io;

use ms_api::state_of_decay::{apply_pending_ini_edits, StateOfDecay};
use ms_api::{compile_script, create_engine, DirectoryHost};
use ms_core::ModScriptError;
use ms_runtime::PromptReply;

use crate::{
    emit_run_report, load_answers, read_script_file, resolve_dir, PromptResponder, RunArgs,
    RunReport,
};

/// Runs an install script against real directories. INI edits are written
/// only when the script succeeds.
pub(crate) fn run_state_of_decay(args: &RunArgs) -> Result<i32, ModScriptError> {
    let dialect = StateOfDecay;
    let source = read_script_file(&args.script)?;
    let script = compile_script(&dialect, &source)?;

    let mod_root = resolve_dir(&args.mod_dir, "mod-dir")?;
    let install_root = resolve_dir(&args.install_dir, "install-dir")?;
    let host = DirectoryHost::new(mod_root, install_root, args.game_version.clone());
    let mut engine = create_engine(&dialect, script, dialect.proxy(Box::new(host)))?;

    let answers = load_answers(args.answers.as_deref())?;
    let stdin = io::stdin();
    let mut reader = stdin.lock();
    // Prompts go to stderr so stdout carries only the result lines.
    let mut writer = io::stderr();
    let mut responder = PromptResponder::new(answers, args.assume_yes, &mut reader, &mut writer);

    let mut prompt_error = None;
    let result = engine.run_with(|prompt| match responder.reply(prompt) {
        Ok(reply) => reply,
        Err(error) => {
            prompt_error = Some(error);
            PromptReply::Cancel
        }
    });
    if let Some(error) = prompt_error {
        return Err(error);
    }

    let (mut proxy, context) = engine.into_parts();
    let state = context.into_extension();
    let applied = if result.is_success() {
        apply_pending_ini_edits(&state, proxy.host_mut())?
    } else {
        0
    };

    let report = RunReport::new(result, state.installed_files, applied);
    emit_run_report(&report);
    Ok(report.exit_code())
}
