use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Resolve the server home directory.
///
/// - `Some(path)` keeps the given path, expanding a leading `~` against the
///   user's home directory.
/// - `None` falls back to `<platform home>/<default_subdir>`
///   (Windows: `%APPDATA%`, elsewhere: `$HOME`).
///
/// With `create` set, the resolved directory is created if missing.
pub fn resolve_home_dir(
    explicit: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let resolved = match explicit {
        Some(raw) => expand_tilde(&raw)?,
        None => platform_home()?.join(default_subdir),
    };

    if create {
        std::fs::create_dir_all(&resolved)
            .with_context(|| format!("Failed to create home dir '{}'", resolved.display()))?;
    }

    Ok(resolved)
}

fn platform_home() -> Result<PathBuf> {
    #[cfg(target_os = "windows")]
    let var = "APPDATA";
    #[cfg(not(target_os = "windows"))]
    let var = "HOME";

    std::env::var_os(var)
        .map(PathBuf::from)
        .with_context(|| format!("{var} is not set; cannot resolve home dir"))
}

fn expand_tilde(raw: &str) -> Result<PathBuf> {
    if raw == "~" {
        return platform_home();
    }
    if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        return Ok(platform_home()?.join(rest));
    }
    Ok(Path::new(raw).to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn set_home(path: &Path) {
        #[cfg(target_os = "windows")]
        std::env::set_var("APPDATA", path);
        #[cfg(not(target_os = "windows"))]
        std::env::set_var("HOME", path);
    }

    #[test]
    fn explicit_absolute_path_is_kept() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().join("explicit");
        let resolved =
            resolve_home_dir(Some(dir.to_string_lossy().to_string()), ".tradepost", true).unwrap();
        assert_eq!(resolved, dir);
        assert!(dir.exists());
    }

    // Both HOME-dependent cases in one test so the env var is set only once.
    #[test]
    fn tilde_and_default_resolve_against_home() {
        let tmp = tempdir().unwrap();
        set_home(tmp.path());

        let tilde = resolve_home_dir(Some("~/.tp_test".into()), ".tradepost", false).unwrap();
        assert_eq!(tilde, tmp.path().join(".tp_test"));

        let fallback = resolve_home_dir(None, ".tradepost", true).unwrap();
        assert_eq!(fallback, tmp.path().join(".tradepost"));
        assert!(fallback.exists());
    }
}
