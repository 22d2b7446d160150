use anyhow::Result;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Expand a leading `~` against the home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    if path.starts_with('~') {
        if let Some(home) = directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
        {
            let rest = path.strip_prefix('~').unwrap_or(path);
            let rest = rest.strip_prefix('/').unwrap_or(rest);
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// True when `name` is exactly one normal path component, so joining it
/// onto a directory stays inside that directory.
pub fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(part)), None) if part == name
    )
}

/// Ensure `dir` exists and is empty. Parent directories are created, never wiped.
pub fn reset_dir(dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)?;
    fs::remove_dir_all(dir)?;
    fs::create_dir_all(dir)
}

/// Remove a stale file if one is present
pub fn remove_file_if_exists(path: &Path) -> std::io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// True when at least one file or symlink exists anywhere below `dir`
pub fn contains_files(dir: &Path) -> Result<bool> {
    if !dir.is_dir() {
        return Ok(false);
    }

    for entry in walkdir::WalkDir::new(dir) {
        let file_type = entry?.file_type();
        if file_type.is_file() || file_type.is_symlink() {
            return Ok(true);
        }
    }

    Ok(false)
}

/// Make a file executable (Unix only)
#[cfg(unix)]
pub fn make_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_mode(permissions.mode() | 0o111);
    fs::set_permissions(path, permissions)
}

#[cfg(windows)]
pub fn make_executable(_path: &Path) -> std::io::Result<()> {
    // No-op on Windows
    Ok(())
}
