use std::env as stdenv;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Mutable, per-shell view of the process state that commands run in.
///
/// The environment contains:
/// - `current_dir`: the working directory for child processes and relative paths.
/// - `search_path`: the executable search path (`PATH`) used to resolve program names.
#[derive(Debug, Clone)]
pub struct Environment {
    /// The current working directory for command execution.
    pub current_dir: PathBuf,
    /// Directories searched for programs, in `PATH` syntax.
    pub search_path: Option<OsString>,
}

impl Environment {
    /// Capture the current process state into a new `Environment` instance.
    ///
    /// `current_dir` comes from `std::env::current_dir()` and `search_path`
    /// from the `PATH` variable.
    pub fn new() -> Self {
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            current_dir,
            search_path: stdenv::var_os("PATH"),
        }
    }

    /// Resolves a user-supplied path against the working directory.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.current_dir.join(path)
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
