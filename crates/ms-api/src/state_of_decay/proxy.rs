use std::cmp::Ordering;
use std::io;

use ms_core::{compare_versions, MsValue};
use ms_runtime::{normalize_path, FunctionProxy, HostFailure, InterpreterContext};

use super::context::{IniEdit, SodContextState};
use super::functions::SodFunction;
use crate::host::InstallHost;

/// Performs State of Decay install operations against an [`InstallHost`].
///
/// Source paths resolve against the context's current directory in the mod
/// tree; target paths are relative to the installation root.
pub struct SodFunctionProxy {
    host: Box<dyn InstallHost + Send>,
}

impl SodFunctionProxy {
    pub fn new(host: Box<dyn InstallHost + Send>) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &(dyn InstallHost + Send) {
        self.host.as_ref()
    }

    pub fn host_mut(&mut self) -> &mut (dyn InstallHost + Send) {
        self.host.as_mut()
    }

    pub fn into_host(self) -> Box<dyn InstallHost + Send> {
        self.host
    }
}

type SodContext = InterpreterContext<SodContextState>;

fn text(args: &[MsValue], index: usize) -> &str {
    args.get(index).and_then(MsValue::as_str).unwrap_or_default()
}

fn io_failure(action: &str, path: &str, error: io::Error) -> HostFailure {
    HostFailure::failed(format!("{} \"{}\": {}", action, path, error))
}

fn source_path(context: &SodContext, path: &str) -> Result<String, HostFailure> {
    context.resolve_path(path).map_err(HostFailure::Failed)
}

fn target_path(path: &str) -> Result<String, HostFailure> {
    normalize_path("", path).map_err(HostFailure::Failed)
}

impl FunctionProxy for SodFunctionProxy {
    type Function = SodFunction;
    type Extension = SodContextState;

    fn invoke(
        &mut self,
        function: SodFunction,
        args: &[MsValue],
        context: &mut SodContext,
    ) -> Result<MsValue, HostFailure> {
        let done = Ok(MsValue::Bool(true));
        match function {
            SodFunction::FileExists => {
                let path = source_path(context, text(args, 0))?;
                self.host
                    .source_exists(&path)
                    .map(MsValue::Bool)
                    .map_err(|error| io_failure("Cannot inspect", &path, error))
            }
            SodFunction::TargetFileExists => {
                let path = target_path(text(args, 0))?;
                self.host
                    .target_exists(&path)
                    .map(MsValue::Bool)
                    .map_err(|error| io_failure("Cannot inspect", &path, error))
            }
            SodFunction::Copy | SodFunction::Move => {
                let source = source_path(context, text(args, 0))?;
                let target = target_path(text(args, 1))?;
                let outcome = if function == SodFunction::Copy {
                    self.host.install_file(&source, &target)
                } else {
                    self.host.move_file(&source, &target)
                };
                outcome.map_err(|error| io_failure("Cannot install", &source, error))?;
                tracing::debug!(%source, %target, "installed file");
                context.extension_mut().installed_files.push(target);
                done
            }
            SodFunction::Delete => {
                let path = target_path(text(args, 0))?;
                self.host
                    .delete_target(&path)
                    .map_err(|error| io_failure("Cannot delete", &path, error))?;
                context
                    .extension_mut()
                    .installed_files
                    .retain(|installed| installed != &path);
                done
            }
            SodFunction::CreateDirectory => {
                let path = target_path(text(args, 0))?;
                self.host
                    .create_target_dir(&path)
                    .map_err(|error| io_failure("Cannot create", &path, error))?;
                done
            }
            SodFunction::SetDirectory => {
                let requested = text(args, 0);
                let path = source_path(context, requested)?;
                let exists = self
                    .host
                    .source_dir_exists(&path)
                    .map_err(|error| io_failure("Cannot inspect", &path, error))?;
                if !exists {
                    return Err(HostFailure::failed(format!(
                        "Directory \"{}\" does not exist in the mod.",
                        path
                    )));
                }
                context.set_current_dir(requested).map_err(HostFailure::Failed)?;
                done
            }
            SodFunction::EditIni => {
                let file = target_path(text(args, 0))?;
                let section = text(args, 1).trim();
                let key = text(args, 2).trim();
                if section.is_empty() || key.is_empty() {
                    return Err(HostFailure::failed(
                        "INI section and key must not be empty.",
                    ));
                }
                context.extension_mut().pending_ini_edits.push(IniEdit {
                    file,
                    section: section.to_string(),
                    key: key.to_string(),
                    value: text(args, 3).to_string(),
                });
                done
            }
            SodFunction::GameVersion => self
                .host
                .game_version()
                .map(MsValue::String)
                .map_err(|error| HostFailure::failed(format!("Cannot read game version: {}", error))),
            SodFunction::CompareVersions => {
                let ordering =
                    compare_versions(text(args, 0), text(args, 1)).map_err(HostFailure::Failed)?;
                let number = match ordering {
                    Ordering::Less => -1.0,
                    Ordering::Equal => 0.0,
                    Ordering::Greater => 1.0,
                };
                Ok(MsValue::Number(number))
            }
            SodFunction::Warn => {
                context.warn(text(args, 0));
                done
            }
            SodFunction::Fail => Err(HostFailure::failed(text(args, 0))),
            SodFunction::AskYesNo
            | SodFunction::Select
            | SodFunction::AskText
            | SodFunction::Message => Err(HostFailure::failed(format!(
                "{:?} is answered by the user, not the host.",
                function
            ))),
        }
    }
}
