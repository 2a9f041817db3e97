use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Resolve a program name the way `execvp` would.
///
/// Behavior:
/// - Empty name: returns `None`.
/// - Name containing `/`: treated as a path, relative to `current_dir` unless
///   absolute, and returned if it exists.
/// - Bare name: each directory in `search_paths` (PATH syntax) is searched for
///   an executable regular file; the first match wins. An empty PATH entry
///   stands for `current_dir`. If no executable match exists, the first
///   non-executable match is returned so that launching it reports a
///   permission error instead of "not found".
pub fn find_command_path(
    search_paths: Option<&OsStr>,
    current_dir: &Path,
    name: &str,
) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }

    if name.contains('/') {
        let path = current_dir.join(name);
        return path.exists().then_some(path);
    }

    let mut fallback = None;
    for dir in std::env::split_paths(search_paths?) {
        let dir = if dir.as_os_str().is_empty() {
            current_dir.to_path_buf()
        } else {
            current_dir.join(dir)
        };
        let candidate = dir.join(name);
        if !candidate.is_file() {
            continue;
        }
        if is_executable(&candidate) {
            return Some(candidate);
        }
        fallback.get_or_insert(candidate);
    }
    fallback
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
