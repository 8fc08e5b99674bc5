use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

fn settings_path(sandbox: &Path) -> PathBuf {
    sandbox.join(".vscode").join("settings.json")
}

/// Recursively merge `overlay` into `base`. Objects merge key by key; any
/// other value in `overlay` replaces what was there.
fn merge_values(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_obj), Value::Object(overlay_obj)) => {
            for (key, value) in overlay_obj {
                match base_obj.get_mut(key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_obj.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}

/// Write `settings` into `<sandbox>/.vscode/settings.json`, keeping any
/// settings already there (a copied sandbox may bring its own).
pub fn write_settings(sandbox: &Path, settings: &Map<String, Value>) -> Result<()> {
    if settings.is_empty() {
        return Ok(());
    }
    let path = settings_path(sandbox);

    let mut current: Value = if path.exists() {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("could not read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("could not parse {}", path.display()))?
    } else {
        Value::Object(Map::new())
    };
    current
        .as_object()
        .with_context(|| format!("{} root must be an object", path.display()))?;

    merge_values(&mut current, &Value::Object(settings.clone()));

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&current)?;
    fs::write(&path, json + "\n")
        .with_context(|| format!("could not write {}", path.display()))?;
    Ok(())
}

/// Launch `editor` on the sandbox without waiting for it. The editor string
/// may carry arguments, e.g. `"code --new-window"`.
///
/// The editor never gets our stdout: that carries only the sandbox path, and
/// the shell wrapper's `$(...)` would otherwise block until the editor exits.
pub fn open(editor: &str, sandbox: &Path) -> Result<()> {
    let mut parts = editor.split_whitespace();
    let program = parts.next().context("editor command is empty")?;
    eprintln!("opening {} in {}...", sandbox.display(), program);
    Command::new(program)
        .args(parts)
        .arg(sandbox)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .spawn()
        .with_context(|| format!("failed to launch editor '{program}'"))?;
    Ok(())
}
