// SPDX-License-Identifier: GPL-3.0-or-later

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use std::error::Error;
use std::path::Path;
use tempfile::tempdir;

/// Creates the command running in the given directory, where the user
/// configuration directories are pointing into the same directory.
fn cctrace(work_dir: &Path) -> Result<Command, Box<dyn Error>> {
    let mut cmd = Command::cargo_bin("cctrace")?;
    cmd.current_dir(work_dir)
        .env("HOME", work_dir)
        .env("XDG_CONFIG_HOME", work_dir)
        .env_remove("RUST_LOG");
    Ok(cmd)
}

fn parse(output: &[u8]) -> Result<Value, Box<dyn Error>> {
    Ok(serde_json::from_slice(output)?)
}

#[test]
fn test_help() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;

    let mut cmd = cctrace(work_dir.path())?;
    cmd.arg("--help");
    cmd.assert().success().stdout(predicate::str::contains("Usage: cctrace"));
    Ok(())
}

#[test]
fn test_missing_command() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;

    let mut cmd = cctrace(work_dir.path())?;
    cmd.args(["-o", "deps.json"]);
    cmd.assert().failure();
    Ok(())
}

#[test]
fn test_link() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;

    let mut cmd = cctrace(work_dir.path())?;
    cmd.args(["--", "gcc", "-O2", "-DNDEBUG", "-o", "prog", "main.o", "util.o", "-lm"]);
    let output = cmd.assert().success().get_output().stdout.clone();

    assert_eq!(parse(&output)?, json!({ "link": { "target": "prog", "dependencies": ["main.o", "util.o"] } }));
    Ok(())
}

#[test]
fn test_link_default_output() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;

    let mut cmd = cctrace(work_dir.path())?;
    cmd.args(["--", "gcc", "a.c", "b.c"]);
    let output = cmd.assert().success().get_output().stdout.clone();

    assert_eq!(parse(&output)?, json!({ "link": { "target": "a.out", "dependencies": ["a.c", "b.c"] } }));
    Ok(())
}

#[test]
fn test_compilations() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;

    let mut cmd = cctrace(work_dir.path())?;
    cmd.args(["--", "cc", "-c", "-Wall", "-I", "include", "src/x.c", "y.c"]);
    let output = cmd.assert().success().get_output().stdout.clone();

    assert_eq!(
        parse(&output)?,
        json!({ "compilations": [
            { "source": "src/x.c", "target": "src/x.o" },
            { "source": "y.c", "target": "y.o" },
        ] })
    );
    Ok(())
}

#[test]
fn test_input_after_compiler_flag_terminator() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;

    let mut cmd = cctrace(work_dir.path())?;
    cmd.args(["--", "gcc", "-c", "--", "-z.c"]);
    let output = cmd.assert().success().get_output().stdout.clone();

    assert_eq!(parse(&output)?, json!({ "compilations": [ { "source": "-z.c", "target": "-z.o" } ] }));
    Ok(())
}

#[test]
fn test_version_query() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;

    let mut cmd = cctrace(work_dir.path())?;
    cmd.args(["--", "gcc", "--version"]);
    let output = cmd.assert().success().get_output().stdout.clone();

    assert_eq!(parse(&output)?, json!("nothing"));
    Ok(())
}

#[test]
fn test_structural_mismatch() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;

    let mut cmd = cctrace(work_dir.path())?;
    cmd.args(["--", "gcc", "-c", "a.c", "b.c", "-o", "out.o"]);
    cmd.assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Structural mismatch"));
    Ok(())
}

#[test]
fn test_unsupported_mode() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;

    let mut cmd = cctrace(work_dir.path())?;
    cmd.args(["--", "gcc", "-S", "x.c"]);
    cmd.assert().code(1).stderr(predicate::str::contains("Unsupported mode: compile"));
    Ok(())
}

#[test]
fn test_unsupported_mode_skipped_by_config() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    std::fs::write(work_dir.path().join("cctrace.yml"), "schema: 1.0\nunsupported_modes: skip\n")?;

    let mut cmd = cctrace(work_dir.path())?;
    cmd.args(["--", "gcc", "-E", "x.c"]);
    let output = cmd.assert().success().get_output().stdout.clone();

    assert_eq!(parse(&output)?, json!("nothing"));
    Ok(())
}

#[test]
fn test_malformed_command_line() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;

    let mut cmd = cctrace(work_dir.path())?;
    cmd.args(["--", "gcc", "main.c", "-o"]);
    cmd.assert().code(2).stderr(predicate::str::contains("Malformed flag syntax"));
    Ok(())
}

#[test]
fn test_invalid_config() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let config = work_dir.path().join("custom.yml");
    std::fs::write(&config, "schema: 2.0\n")?;

    let mut cmd = cctrace(work_dir.path())?;
    cmd.arg("-c").arg(&config).args(["--", "gcc", "main.c"]);
    cmd.assert().failure().stderr(predicate::str::contains("custom.yml"));
    Ok(())
}

#[test]
fn test_file_output() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let destination = work_dir.path().join("deps.json");

    let mut cmd = cctrace(work_dir.path())?;
    cmd.arg("-o").arg(&destination).args(["--", "gcc", "-c", "main.c", "-o", "main.o"]);
    cmd.assert().success().stdout(predicate::str::is_empty());

    let content = std::fs::read(&destination)?;
    assert_eq!(parse(&content)?, json!({ "compilations": [ { "source": "main.c", "target": "main.o" } ] }));
    Ok(())
}

#[test]
#[cfg(unix)]
fn test_clean_paths() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    std::fs::write(work_dir.path().join("cctrace.yml"), "schema: 1.0\npaths: clean\n")?;

    let mut cmd = cctrace(work_dir.path())?;
    cmd.args(["-d", "/work/build", "--", "gcc", "-o", "../bin/prog", "./main.o"]);
    let output = cmd.assert().success().get_output().stdout.clone();

    assert_eq!(
        parse(&output)?,
        json!({ "link": { "target": "/work/bin/prog", "dependencies": ["/work/build/main.o"] } })
    );
    Ok(())
}
