use anyhow::{Context, Result, bail};
use std::path::Path;
use std::process::Command;

/// Run `command` (program followed by its arguments) plus `extra` inside `dir`.
///
/// Output is captured; on failure the child's stderr is included in the error.
pub fn run_in(dir: &Path, command: &[String], extra: &[String]) -> Result<String> {
    let (program, args) = command.split_first().context("empty command")?;
    let output = Command::new(program)
        .args(args)
        .args(extra)
        .current_dir(dir)
        .output()
        .with_context(|| format!("failed to run {program} - is it installed?"))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "{} failed: {}",
            display_command(command, extra),
            stderr.trim()
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Initialise a fresh project in `dir` with the configured toolchain.
pub fn init_project(dir: &Path, init_command: &[String]) -> Result<()> {
    if init_command.is_empty() {
        return Ok(());
    }
    eprintln!("running {}...", display_command(init_command, &[]));
    run_in(dir, init_command, &[])?;
    Ok(())
}

/// Add `libraries` with a single invocation of the configured add command.
pub fn add_libraries(dir: &Path, add_command: &[String], libraries: &[String]) -> Result<()> {
    if add_command.is_empty() || libraries.is_empty() {
        return Ok(());
    }
    eprintln!("running {}...", display_command(add_command, libraries));
    run_in(dir, add_command, libraries)?;
    Ok(())
}

/// Merge config and CLI library lists, keeping the first occurrence of each.
pub fn merge_libraries(configured: &[String], requested: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::new();
    for lib in configured.iter().chain(requested) {
        if !merged.contains(lib) {
            merged.push(lib.clone());
        }
    }
    merged
}

fn display_command(command: &[String], extra: &[String]) -> String {
    command
        .iter()
        .chain(extra)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}
