use crate::command::{CommandFactory, EXIT_SUCCESS, ExecutableCommand, ExitCode};
use crate::interpreter::{Factory, Interpreter};
use anyhow::{Context, Result, bail};
use argh::{EarlyExit, FromArgs};
use log::debug;
use std::env;
use std::fs;

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "cd".
    fn name() -> &'static str;

    /// Executes the command against the interpreter that dispatched it.
    ///
    /// Return value should follow shell conventions: 0 for success, non-zero for error.
    fn execute(self, shell: &mut Interpreter) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(self: Box<Self>, shell: &mut Interpreter) -> Result<ExitCode> {
        <T as BuiltinCommand>::execute(*self, shell)
    }
}

/// Result of argument parsing that stopped early.
struct InvalidArgs {
    output: String,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(self: Box<Self>, _shell: &mut Interpreter) -> Result<ExitCode> {
        bail!("{}", self.output.trim_end());
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(&self, name: &str, args: &[&str]) -> Option<Box<dyn ExecutableCommand>> {
        if name != T::name() {
            return None;
        }
        // Every word is an operand, so names like `-d` or `--help` stay reachable.
        let operands: Vec<&str> = std::iter::once("--").chain(args.iter().copied()).collect();
        Some(match T::from_args(&[name], &operands) {
            Ok(cmd) => Box::new(cmd),
            Err(EarlyExit { output, .. }) => Box::new(InvalidArgs { output }),
        })
    }
}

/// First operand of a built-in; the rest are ignored.
fn first_operand(name: &str, operands: Vec<String>) -> Option<String> {
    let mut operands = operands.into_iter();
    let first = operands.next().filter(|op| !op.is_empty());
    let ignored: Vec<String> = operands.collect();
    if !ignored.is_empty() {
        debug!("{name}: ignoring extra operands {ignored:?}");
    }
    first
}

#[derive(FromArgs)]
/// Change the current working directory.
pub struct Cd {
    #[argh(positional, greedy)]
    /// directory to switch to; absolute or relative to the current directory.
    pub operands: Vec<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(self, shell: &mut Interpreter) -> Result<ExitCode> {
        let target =
            first_operand(Self::name(), self.operands).context("cd: expected argument")?;

        let new_dir = shell.env.resolve(&target);
        let canonical =
            fs::canonicalize(&new_dir).with_context(|| format!("cd: {}", target))?;
        if !canonical.is_dir() {
            bail!("cd: {}: Not a directory", target);
        }

        env::set_current_dir(&canonical)
            .with_context(|| format!("cd: can't chdir to {}", canonical.display()))?;
        debug!("working directory is now {}", canonical.display());
        shell.env.current_dir = canonical;
        Ok(EXIT_SUCCESS)
    }
}

#[derive(FromArgs)]
/// Run the commands of a file, one line at a time.
pub struct Source {
    #[argh(positional, greedy)]
    /// script to read; absolute or relative to the current directory.
    pub operands: Vec<String>,
}

impl BuiltinCommand for Source {
    fn name() -> &'static str {
        "source"
    }

    fn execute(self, shell: &mut Interpreter) -> Result<ExitCode> {
        let file =
            first_operand(Self::name(), self.operands).context("source: expected filename")?;
        shell.source(&file)
    }
}
