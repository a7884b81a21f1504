use ms_core::{ErrorKind, ModScriptError};
use serde::{Deserialize, Serialize};

use crate::host::InstallHost;
use crate::ini::set_ini_value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IniEdit {
    pub file: String,
    pub section: String,
    pub key: String,
    pub value: String,
}

/// Game-specific state carried by the interpreter context of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SodContextState {
    /// Queued by `EditIni`; written only once the run has succeeded.
    pub pending_ini_edits: Vec<IniEdit>,
    /// Target paths written by `Copy` and `Move`, in order.
    pub installed_files: Vec<String>,
}

/// Writes the queued INI edits, grouping them per file. Returns the number
/// of edits applied.
pub fn apply_pending_ini_edits(
    state: &SodContextState,
    host: &mut dyn InstallHost,
) -> Result<usize, ModScriptError> {
    let mut files: Vec<&str> = Vec::new();
    for edit in &state.pending_ini_edits {
        if !files.contains(&edit.file.as_str()) {
            files.push(&edit.file);
        }
    }

    for file in files {
        let io_error = |error: std::io::Error| {
            ModScriptError::new(
                ErrorKind::Io,
                "INI_WRITE",
                format!("Failed to update \"{}\": {}", file, error),
            )
        };
        let mut contents = host.read_target(file).map_err(io_error)?.unwrap_or_default();
        for edit in state.pending_ini_edits.iter().filter(|edit| edit.file == file) {
            contents = set_ini_value(&contents, &edit.section, &edit.key, &edit.value);
        }
        host.write_target(file, &contents).map_err(io_error)?;
        tracing::info!(file, "applied ini edits");
    }
    Ok(state.pending_ini_edits.len())
}
