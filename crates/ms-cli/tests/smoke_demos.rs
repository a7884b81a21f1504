use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn demos_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("demos")
        .join("mods")
}

#[test]
fn run_installs_every_demo_mod() {
    let bin = env!("CARGO_BIN_EXE_modscript");

    let mut directories = fs::read_dir(demos_root())
        .expect("demos root must exist")
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect::<Vec<_>>();
    directories.sort();

    assert!(!directories.is_empty(), "expected demo mods");

    for directory in directories {
        let name = directory.file_name().unwrap_or_default().to_string_lossy().to_string();
        let install_dir = std::env::temp_dir().join(format!(
            "modscript-rs-smoke-{}-{}",
            name,
            std::process::id()
        ));
        fs::create_dir_all(&install_dir).expect("install dir");

        let mut command = Command::new(bin);
        command
            .arg("run")
            .arg("--script")
            .arg(directory.join("install.modscript"))
            .arg("--mod-dir")
            .arg(directory.join("mod"))
            .arg("--install-dir")
            .arg(&install_dir);
        let answers = directory.join("answers.json");
        if answers.exists() {
            command.arg("--answers").arg(&answers);
        } else {
            command.arg("--assume-yes");
        }
        let output = command.output().expect("cli should execute");

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() {
            panic!(
                "demo {} failed\nstdout:\n{}\nstderr:\n{}",
                name,
                stdout,
                String::from_utf8_lossy(&output.stderr)
            );
        }
        assert!(stdout.contains("RESULT:OK"), "stdout missing RESULT:OK for {}", name);
        assert!(stdout.contains("STATUS:success"), "run did not succeed for {}", name);
        assert!(stdout.contains("INSTALLED:"), "nothing installed for {}", name);
    }
}

#[test]
fn check_accepts_every_demo_script() {
    let output = Command::new(env!("CARGO_BIN_EXE_modscript"))
        .arg("check")
        .arg("--scripts-dir")
        .arg(demos_root())
        .output()
        .expect("cli should execute");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "check failed:\n{}", stdout);
    assert!(stdout.starts_with("RESULT:OK"));
    assert_eq!(stdout.matches("CHECKED:").count(), 3);
}

#[test]
fn functions_lists_the_reference_table() {
    let output = Command::new(env!("CARGO_BIN_EXE_modscript"))
        .arg("functions")
        .output()
        .expect("cli should execute");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("DIALECT:state-of-decay"));
    assert!(stdout.contains("FUNCTION:Copy("));
    assert_eq!(stdout.matches("FUNCTION:").count(), 16);
}
