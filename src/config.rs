use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that points at an alternative config file.
pub const CONFIG_ENV: &str = "SANDPIT_CONFIG";

/// On-disk config. Every key is optional; missing keys fall back to
/// [`Config::default`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub root: Option<PathBuf>,
    pub init_command: Vec<String>,
    pub add_command: Vec<String>,
    pub libraries: Vec<String>,
    pub editor: Option<String>,
    pub open_editor: bool,
    pub editor_settings: serde_json::Map<String, serde_json::Value>,
    pub max_name_attempts: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: None,
            init_command: vec!["cargo".into(), "init".into(), "--quiet".into()],
            add_command: vec!["cargo".into(), "add".into()],
            libraries: Vec::new(),
            editor: None,
            open_editor: false,
            editor_settings: serde_json::Map::new(),
            max_name_attempts: None,
        }
    }
}

/// Values from the command line that take precedence over the file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub root: Option<PathBuf>,
    pub max_name_attempts: Option<u64>,
    pub open_editor: bool,
}

impl Config {
    /// Load from `$SANDPIT_CONFIG` or the default location.
    pub fn load() -> Result<Self> {
        match config_path()? {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("could not read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("invalid config in {}", path.display()))
    }

    pub fn apply(mut self, overrides: Overrides) -> Self {
        if overrides.root.is_some() {
            self.root = overrides.root;
        }
        if overrides.max_name_attempts.is_some() {
            self.max_name_attempts = overrides.max_name_attempts;
        }
        self.open_editor |= overrides.open_editor;
        self
    }

    /// The directory sandboxes live in, with a leading `~/` expanded.
    pub fn root_dir(&self) -> Result<PathBuf> {
        match &self.root {
            Some(root) => expand_home(root),
            None => {
                let home = dirs::home_dir().context("could not determine home directory")?;
                Ok(home.join("sandpits"))
            }
        }
    }

    /// Configured editor, then `$VISUAL`, then `$EDITOR`, then `code`.
    pub fn editor_command(&self) -> String {
        if let Some(editor) = &self.editor {
            return editor.clone();
        }
        ["VISUAL", "EDITOR"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "code".to_string())
    }
}

fn config_path() -> Result<Option<PathBuf>> {
    if let Ok(path) = std::env::var(CONFIG_ENV)
        && !path.is_empty()
    {
        return expand_home(Path::new(&path)).map(Some);
    }
    Ok(dirs::config_dir().map(|dir| dir.join("sandpit").join("config.json")))
}

fn expand_home(path: &Path) -> Result<PathBuf> {
    match path.strip_prefix("~") {
        Ok(rest) => {
            let home = dirs::home_dir().context("could not determine home directory")?;
            Ok(home.join(rest))
        }
        Err(_) => Ok(path.to_path_buf()),
    }
}
