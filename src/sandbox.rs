use anyhow::{Context, Result, bail};
use owo_colors::OwoColorize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::config::Config;
use crate::resolve::{NameRequest, Resolver};
use crate::{editor, toolchain};

/// Everything `sandpit new` was asked to do beyond what the config says.
#[derive(Debug, Default)]
pub struct NewOptions {
    pub name: Option<String>,
    pub copy: Option<PathBuf>,
    pub libraries: Vec<String>,
    pub no_init: bool,
    pub seed: Option<u64>,
}

/// Find the directory a `--copy` argument refers to: a path if it exists,
/// otherwise the name of a sandbox under `root`. Returned canonicalized.
fn resolve_copy_source(root: &Path, source: &Path) -> Result<PathBuf> {
    let candidate = if source.exists() {
        source.to_path_buf()
    } else {
        root.join(source)
    };
    if !candidate.exists() {
        bail!(
            "nothing to copy: '{}' is neither a path nor a sandbox in {}",
            source.display(),
            root.display()
        );
    }
    if !candidate.is_dir() {
        bail!("cannot copy '{}': not a directory", candidate.display());
    }
    let candidate = candidate
        .canonicalize()
        .with_context(|| format!("could not resolve {}", candidate.display()))?;
    let root = root
        .canonicalize()
        .with_context(|| format!("could not resolve {}", root.display()))?;
    // The copy would land inside itself and recurse until paths get too long.
    if root.starts_with(&candidate) {
        bail!(
            "cannot copy '{}': sandbox root {} is inside it",
            candidate.display(),
            root.display()
        );
    }
    Ok(candidate)
}

fn name_request(opts: &NewOptions, copy_source: Option<&Path>) -> Result<NameRequest> {
    if let Some(name) = &opts.name {
        return Ok(NameRequest::Explicit(name.clone()));
    }
    if let Some(source) = copy_source {
        let base = source
            .file_name()
            .context("copy source has no directory name")?
            .to_string_lossy()
            .to_string();
        return Ok(NameRequest::CopyOf(base));
    }
    Ok(NameRequest::Fresh { seed: opts.seed })
}

/// Recursively copy `src` into `dst`, which must not exist yet.
pub fn copy_dir_all(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir(dst).with_context(|| format!("could not create {}", dst.display()))?;
    for entry in fs::read_dir(src).with_context(|| format!("could not read {}", src.display()))? {
        let entry = entry?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            copy_dir_all(&from, &to)?;
        } else if file_type.is_symlink() {
            copy_symlink(&from, &to)?;
        } else {
            fs::copy(&from, &to)
                .with_context(|| format!("could not copy {}", from.display()))?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(from: &Path, to: &Path) -> Result<()> {
    let target = fs::read_link(from)?;
    std::os::unix::fs::symlink(&target, to)
        .with_context(|| format!("could not link {}", to.display()))?;
    Ok(())
}

#[cfg(not(unix))]
fn copy_symlink(from: &Path, to: &Path) -> Result<()> {
    fs::copy(from, to).with_context(|| format!("could not copy {}", from.display()))?;
    Ok(())
}

/// Create a sandbox and return its path.
pub fn new_sandbox(config: &Config, opts: NewOptions) -> Result<PathBuf> {
    let root = config.root_dir()?;
    fs::create_dir_all(&root).with_context(|| format!("could not create {}", root.display()))?;

    let copy_source = opts
        .copy
        .as_deref()
        .map(|src| resolve_copy_source(&root, src))
        .transpose()?;

    let request = name_request(&opts, copy_source.as_deref())?;
    let name = Resolver::new(&root, |p: &Path| p.exists())
        .max_attempts(config.max_name_attempts)
        .resolve(request)?;

    let path = root.join(&name);
    if path.exists() {
        bail!("sandbox '{}' already exists at {}", name, path.display());
    }

    match &copy_source {
        Some(source) => {
            eprintln!("copying {} to sandbox '{}'...", source.display(), name);
            if let Err(err) = copy_dir_all(source, &path) {
                let _ = fs::remove_dir_all(&path);
                return Err(err);
            }
        }
        None => {
            eprintln!("creating sandbox '{}'...", name);
            fs::create_dir(&path).with_context(|| format!("could not create {}", path.display()))?;
            if !opts.no_init {
                toolchain::init_project(&path, &config.init_command)?;
            }
        }
    }

    let libraries = toolchain::merge_libraries(&config.libraries, &opts.libraries);
    toolchain::add_libraries(&path, &config.add_command, &libraries)?;

    editor::write_settings(&path, &config.editor_settings)?;
    if config.open_editor {
        editor::open(&config.editor_command(), &path)?;
    }

    eprintln!("sandbox '{}' created at {}", name, path.display());
    Ok(path)
}

#[derive(Debug)]
pub struct SandboxEntry {
    pub name: String,
    pub path: PathBuf,
    pub last_modified: Option<SystemTime>,
}

/// Sandboxes under `root`, most recently modified first. Hidden directories
/// are skipped.
pub fn list_sandboxes(root: &Path) -> Result<Vec<SandboxEntry>> {
    if !root.exists() {
        return Ok(Vec::new());
    }
    let mut entries = Vec::new();
    for entry in fs::read_dir(root).with_context(|| format!("could not read {}", root.display()))? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }
        let last_modified = fs::metadata(&path).and_then(|m| m.modified()).ok();
        entries.push(SandboxEntry {
            name,
            path,
            last_modified,
        });
    }
    entries.sort_by(|a, b| {
        b.last_modified
            .cmp(&a.last_modified)
            .then_with(|| a.name.cmp(&b.name))
    });
    Ok(entries)
}

pub fn format_time_ago(time: Option<SystemTime>) -> String {
    let Some(time) = time else {
        return "unknown".to_string();
    };
    let Ok(duration) = time.elapsed() else {
        return "just now".to_string();
    };
    let secs = duration.as_secs();
    if secs < 60 {
        return "just now".to_string();
    }
    let mins = secs / 60;
    if mins < 60 {
        return format!("{}m ago", mins);
    }
    let hours = mins / 60;
    if hours < 24 {
        return format!("{}h ago", hours);
    }
    let days = hours / 24;
    if days < 30 {
        return format!("{}d ago", days);
    }
    format!("{}mo ago", days / 30)
}

pub fn print_list(root: &Path, entries: &[SandboxEntry]) {
    if entries.is_empty() {
        eprintln!("no sandboxes in {}", root.display());
        return;
    }
    let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);
    for entry in entries {
        println!(
            "{:<width$}  {:<10}  {}",
            entry.name.bold(),
            format_time_ago(entry.last_modified),
            entry.path.display().dimmed(),
            width = width
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config_in(root: &Path) -> Config {
        Config {
            root: Some(root.to_path_buf()),
            init_command: Vec::new(),
            add_command: Vec::new(),
            ..Default::default()
        }
    }

    #[test]
    fn new_with_explicit_name() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let path = new_sandbox(
            &config,
            NewOptions {
                name: Some("scratch".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(path, dir.path().join("scratch"));
        assert!(path.is_dir());
    }

    #[test]
    fn new_explicit_name_collision_fails() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("taken")).unwrap();
        let err = new_sandbox(
            &config_in(dir.path()),
            NewOptions {
                name: Some("taken".to_string()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn new_creates_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested").join("root");
        let path = new_sandbox(&config_in(&root), NewOptions::default()).unwrap();
        assert!(path.starts_with(&root));
        assert!(path.is_dir());
    }

    #[test]
    fn new_fresh_name_is_seeded() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        let opts = || NewOptions {
            seed: Some(42),
            ..Default::default()
        };
        let pa = new_sandbox(&config_in(a.path()), opts()).unwrap();
        let pb = new_sandbox(&config_in(b.path()), opts()).unwrap();
        assert_eq!(pa.file_name(), pb.file_name());
        assert_eq!(
            pa.file_name().unwrap().to_string_lossy().split('-').count(),
            3
        );
    }

    #[test]
    fn new_copy_of_sandbox_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("foo");
        fs::create_dir_all(original.join("src")).unwrap();
        fs::write(original.join("src").join("main.rs"), "fn main() {}").unwrap();
        fs::create_dir(dir.path().join("foo-copy")).unwrap();

        let path = new_sandbox(
            &config_in(dir.path()),
            NewOptions {
                copy: Some(PathBuf::from("foo")),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(path, dir.path().join("foo-copy-1"));
        assert_eq!(
            fs::read_to_string(path.join("src").join("main.rs")).unwrap(),
            "fn main() {}"
        );
    }

    #[test]
    fn new_copy_with_explicit_name() {
        let dir = tempfile::tempdir().unwrap();
        let external = tempfile::tempdir().unwrap();
        fs::write(external.path().join("notes.txt"), "hi").unwrap();

        let path = new_sandbox(
            &config_in(dir.path()),
            NewOptions {
                name: Some("mine".to_string()),
                copy: Some(external.path().to_path_buf()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(path, dir.path().join("mine"));
        assert_eq!(fs::read_to_string(path.join("notes.txt")).unwrap(), "hi");
    }

    #[test]
    fn new_copy_missing_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = new_sandbox(
            &config_in(dir.path()),
            NewOptions {
                copy: Some(PathBuf::from("ghost")),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("nothing to copy"));
    }

    #[test]
    fn new_copy_refuses_source_containing_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("pits");
        fs::create_dir(&root).unwrap();
        fs::write(dir.path().join("keep.txt"), "x").unwrap();

        let err = new_sandbox(
            &config_in(&root),
            NewOptions {
                copy: Some(dir.path().to_path_buf()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("is inside it"), "got: {err}");
        assert_eq!(fs::read_dir(&root).unwrap().count(), 0);
    }

    #[test]
    fn new_copy_of_root_itself_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let err = new_sandbox(
            &config_in(dir.path()),
            NewOptions {
                copy: Some(dir.path().to_path_buf()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("is inside it"), "got: {err}");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn failed_copy_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let src = tempfile::tempdir().unwrap();
        fs::write(src.path().join("a.txt"), "a").unwrap();
        // Sockets can't be opened for reading, so fs::copy fails on them.
        let _listener = std::os::unix::net::UnixListener::bind(src.path().join("s.sock")).unwrap();

        let result = new_sandbox(
            &config_in(dir.path()),
            NewOptions {
                name: Some("broken".to_string()),
                copy: Some(src.path().to_path_buf()),
                ..Default::default()
            },
        );
        assert!(result.is_err());
        assert!(!dir.path().join("broken").exists());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn editor_does_not_inherit_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let scripts = tempfile::tempdir().unwrap();
        let script = scripts.path().join("fake-editor.sh");
        fs::write(
            &script,
            "echo editor-noise\nreadlink /proc/$$/fd/1 > \"$1/.out.tmp\"\nmv \"$1/.out.tmp\" \"$1/.stdout-target\"\n",
        )
        .unwrap();

        let config = Config {
            editor: Some(format!("sh {}", script.display())),
            open_editor: true,
            ..config_in(dir.path())
        };
        let path = new_sandbox(
            &config,
            NewOptions {
                name: Some("edited".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        let marker = path.join(".stdout-target");
        let deadline = std::time::Instant::now() + Duration::from_secs(10);
        while !marker.exists() && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(20));
        }
        assert_eq!(fs::read_to_string(&marker).unwrap().trim(), "/dev/null");
    }

    #[test]
    fn new_writes_editor_settings() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config
            .editor_settings
            .insert("editor.formatOnSave".to_string(), serde_json::json!(true));
        let path = new_sandbox(
            &config,
            NewOptions {
                name: Some("edited".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        let settings = fs::read_to_string(path.join(".vscode").join("settings.json")).unwrap();
        assert!(settings.contains("editor.formatOnSave"));
    }

    #[cfg(unix)]
    #[test]
    fn new_runs_init_and_add_commands() {
        let dir = tempfile::tempdir().unwrap();
        let to_strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        let config = Config {
            root: Some(dir.path().to_path_buf()),
            init_command: to_strings(&["sh", "-c", "touch initialised"]),
            add_command: to_strings(&["sh", "-c", "echo \"$@\" > libs.txt", "sh"]),
            libraries: to_strings(&["serde"]),
            ..Default::default()
        };
        let path = new_sandbox(
            &config,
            NewOptions {
                name: Some("tooled".to_string()),
                libraries: to_strings(&["rand", "serde"]),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(path.join("initialised").exists());
        assert_eq!(
            fs::read_to_string(path.join("libs.txt")).unwrap().trim(),
            "serde rand"
        );
    }

    #[cfg(unix)]
    #[test]
    fn no_init_skips_init_command() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            root: Some(dir.path().to_path_buf()),
            init_command: vec!["sh".into(), "-c".into(), "touch initialised".into()],
            add_command: Vec::new(),
            ..Default::default()
        };
        let path = new_sandbox(
            &config,
            NewOptions {
                name: Some("bare".to_string()),
                no_init: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert!(!path.join("initialised").exists());
    }

    #[cfg(unix)]
    #[test]
    fn copy_dir_recreates_symlinks() {
        let src = tempfile::tempdir().unwrap();
        fs::write(src.path().join("real.txt"), "data").unwrap();
        std::os::unix::fs::symlink("real.txt", src.path().join("link.txt")).unwrap();
        let dst_parent = tempfile::tempdir().unwrap();
        let dst = dst_parent.path().join("copy");
        copy_dir_all(src.path(), &dst).unwrap();
        assert_eq!(fs::read_link(dst.join("link.txt")).unwrap(), PathBuf::from("real.txt"));
        assert_eq!(fs::read_to_string(dst.join("link.txt")).unwrap(), "data");
    }

    #[test]
    fn list_sorts_newest_first_and_skips_hidden() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("old")).unwrap();
        fs::create_dir(dir.path().join("new")).unwrap();
        fs::create_dir(dir.path().join(".hidden")).unwrap();
        fs::write(dir.path().join("file.txt"), "").unwrap();

        let old_time = SystemTime::now() - Duration::from_secs(3600);
        fs::File::open(dir.path().join("old"))
            .unwrap()
            .set_modified(old_time)
            .unwrap();

        let entries = list_sandboxes(dir.path()).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["new", "old"]);
    }

    #[test]
    fn list_missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_sandboxes(&dir.path().join("nope")).unwrap().is_empty());
    }

    #[test]
    fn time_ago_buckets() {
        let now = SystemTime::now();
        assert_eq!(format_time_ago(None), "unknown");
        assert_eq!(format_time_ago(Some(now)), "just now");
        assert_eq!(format_time_ago(Some(now - Duration::from_secs(300))), "5m ago");
        assert_eq!(format_time_ago(Some(now - Duration::from_secs(7200))), "2h ago");
        assert_eq!(format_time_ago(Some(now - Duration::from_secs(3 * 86400))), "3d ago");
        assert_eq!(format_time_ago(Some(now - Duration::from_secs(65 * 86400))), "2mo ago");
    }
}
