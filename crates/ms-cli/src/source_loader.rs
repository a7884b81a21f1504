use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use ms_core::{ErrorKind, ModScriptError};
use walkdir::WalkDir;

use crate::{map_cli_source_path, map_cli_source_read, map_cli_source_scan};

pub(crate) const SCRIPT_EXTENSION: &str = "modscript";

fn absolute(path: &str) -> Result<PathBuf, ModScriptError> {
    let path = PathBuf::from(path);
    if path.is_absolute() {
        return Ok(path);
    }
    Ok(std::env::current_dir()
        .map_err(map_cli_source_path)?
        .join(path))
}

pub(crate) fn resolve_dir(dir: &str, label: &str) -> Result<PathBuf, ModScriptError> {
    let absolute = absolute(dir)?;

    if !absolute.exists() {
        return Err(ModScriptError::new(
            ErrorKind::Io,
            "CLI_SOURCE_NOT_FOUND",
            format!("{} does not exist: {}", label, absolute.display()),
        ));
    }

    if !absolute.is_dir() {
        return Err(ModScriptError::new(
            ErrorKind::Io,
            "CLI_SOURCE_NOT_DIR",
            format!("{} is not a directory: {}", label, absolute.display()),
        ));
    }

    Ok(absolute)
}

pub(crate) fn read_script_file(script: &str) -> Result<String, ModScriptError> {
    let path = absolute(script)?;
    if !path.is_file() {
        return Err(ModScriptError::new(
            ErrorKind::Io,
            "CLI_SOURCE_NOT_FOUND",
            format!("script does not exist: {}", path.display()),
        ));
    }
    fs::read_to_string(&path).map_err(map_cli_source_read)
}

/// Every `*.modscript` file under `scripts_dir`, keyed by its relative path.
pub(crate) fn read_scripts_from_dir(
    scripts_dir: &Path,
) -> Result<BTreeMap<String, String>, ModScriptError> {
    let mut scripts = BTreeMap::new();

    for entry in WalkDir::new(scripts_dir)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| extension.eq_ignore_ascii_case(SCRIPT_EXTENSION));
        if !matches {
            continue;
        }

        let relative = path
            .strip_prefix(scripts_dir)
            .map_err(map_cli_source_scan)?
            .to_string_lossy()
            .replace('\\', "/");

        let content = fs::read_to_string(path).map_err(map_cli_source_read)?;
        scripts.insert(relative, content);
    }

    if scripts.is_empty() {
        return Err(ModScriptError::new(
            ErrorKind::Io,
            "CLI_SOURCE_EMPTY",
            format!("No .{} files under {}", SCRIPT_EXTENSION, scripts_dir.display()),
        ));
    }

    Ok(scripts)
}

#[cfg(test)]
mod source_loader_tests {
    use super::*;
    use crate::cli_test_support::*;

    #[test]
    fn resolve_dir_validates_existence_and_directory() {
        let missing = temp_path("missing-dir");
        let missing_err = resolve_dir(missing.to_string_lossy().as_ref(), "scripts-dir")
            .expect_err("missing path should fail");
        assert_eq!(missing_err.code, "CLI_SOURCE_NOT_FOUND");
        assert!(missing_err.message.starts_with("scripts-dir does not exist"));

        let file_path = temp_path("plain-file");
        write_file(&file_path, "x");
        let file_err = resolve_dir(file_path.to_string_lossy().as_ref(), "mod-dir")
            .expect_err("file path should fail");
        assert_eq!(file_err.code, "CLI_SOURCE_NOT_DIR");
    }

    #[test]
    fn read_script_file_reports_missing_scripts() {
        let error = read_script_file(temp_path("nope.modscript").to_string_lossy().as_ref())
            .expect_err("missing script");
        assert_eq!(error.code, "CLI_SOURCE_NOT_FOUND");

        let path = temp_path("present.modscript");
        write_file(&path, "Warn(\"x\")");
        assert_eq!(
            read_script_file(path.to_string_lossy().as_ref()).expect("read"),
            "Warn(\"x\")"
        );
    }

    #[test]
    fn read_scripts_from_dir_filters_by_extension() {
        let root = temp_path("scripts-dir");
        write_file(&root.join("install.modscript"), "Warn(\"a\")");
        write_file(&root.join("nested/extra.MODSCRIPT"), "Warn(\"b\")");
        write_file(&root.join("readme.txt"), "ignored");

        let scripts = read_scripts_from_dir(&root).expect("scan should pass");
        assert_eq!(
            scripts.keys().cloned().collect::<Vec<_>>(),
            vec!["install.modscript".to_string(), "nested/extra.MODSCRIPT".to_string()]
        );
    }

    #[test]
    fn read_scripts_from_dir_errors_when_empty() {
        let root = temp_path("empty-scripts-dir");
        write_file(&root.join("readme.txt"), "not source");

        let error = read_scripts_from_dir(&root).expect_err("empty source set should fail");
        assert_eq!(error.code, "CLI_SOURCE_EMPTY");
    }
}
