use crate::interpreter::Interpreter;
use anyhow::Result;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

pub const EXIT_SUCCESS: ExitCode = 0;
pub const EXIT_FAILURE: ExitCode = 1;
/// The program was found but could not be executed.
pub const EXIT_NOT_EXECUTABLE: ExitCode = 126;
/// The program could not be found.
pub const EXIT_NOT_FOUND: ExitCode = 127;

/// Object-safe trait for a command the interpreter runs in-process.
///
/// Built-ins implement this through a blanket impl; they get the whole
/// interpreter because they change its state (`cd`) or re-enter it (`source`).
pub trait ExecutableCommand {
    /// Executes the command.
    fn execute(self: Box<Self>, shell: &mut Interpreter) -> Result<ExitCode>;
}

/// Factory that tries to create a command from a name and its arguments.
///
/// Returns `None` when the factory doesn't recognize the `name`.
pub trait CommandFactory {
    /// Attempt to create a command instance for the provided name and arguments.
    fn try_create(&self, name: &str, args: &[&str]) -> Option<Box<dyn ExecutableCommand>>;
}
