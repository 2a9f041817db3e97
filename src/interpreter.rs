//! Command dispatch, script inclusion and the interactive read-loop.
//!
//! Each line is routed by its first word: a built-in runs in-process against
//! the [`Interpreter`], anything else becomes a pipeline of external programs.

use crate::command::{CommandFactory, EXIT_FAILURE, EXIT_SUCCESS, ExitCode};
use crate::config::ShellConfig;
use crate::env::Environment;
use crate::lexer;
use crate::parser;
use crate::pipeline::{self, PipelineReport};
use anyhow::{Context, bail};
use log::{debug, info, warn};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};

/// The line that ends the interactive read-loop.
pub const EXIT_COMMAND: &str = "exit";

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports commands defined in this crate, i.e. the built-ins.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// A minimal shell that runs built-ins in-process and everything else as a pipeline.
///
/// The interpreter maintains an [`Environment`] and a list of [`CommandFactory`] objects
/// that are queried for built-ins by name. See [`Default`] for the built-ins included
/// out of the box.
///
/// Example
/// ```no_run
/// use pipeshell::Interpreter;
/// let mut sh = Interpreter::default();
/// let code = sh.execute_line("echo hello | tr a-z A-Z");
/// assert_eq!(code, 0);
/// ```
pub struct Interpreter {
    pub(crate) env: Environment,
    config: ShellConfig,
    builtins: Vec<Box<dyn CommandFactory>>,
    source_depth: usize,
}

impl Interpreter {
    /// Create a new interpreter with a custom set of built-in factories.
    pub fn new(config: ShellConfig, builtins: Vec<Box<dyn CommandFactory>>) -> Self {
        Self {
            env: Environment::new(),
            config,
            builtins,
            source_depth: 0,
        }
    }

    /// Create an interpreter with the default built-ins running in `env`.
    pub fn with_env(config: ShellConfig, env: Environment) -> Self {
        Self {
            env,
            ..Self::with_config(config)
        }
    }

    /// Create an interpreter with the default built-ins and the given settings.
    pub fn with_config(config: ShellConfig) -> Self {
        use crate::builtin::*;
        Self::new(
            config,
            vec![
                Box::new(Factory::<Cd>::default()),
                Box::new(Factory::<Source>::default()),
            ],
        )
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// Run one command line and return its exit status.
    ///
    /// Never fails: errors are reported on stderr and turn into a non-zero status,
    /// so the caller can keep reading lines.
    pub fn execute_line(&mut self, line: &str) -> ExitCode {
        match self.dispatch(line) {
            Ok(code) => code,
            Err(e) => {
                warn!("{e:#}");
                eprintln!("{e:#}");
                EXIT_FAILURE
            }
        }
    }

    /// Route one command line to a built-in or to the pipeline runner.
    ///
    /// Only the first token decides: a built-in name gets the remaining tokens
    /// as arguments; anything else runs the whole line as a pipeline, which is a
    /// single stage when the line has no `|`. Blank lines do nothing.
    pub fn dispatch(&mut self, line: &str) -> anyhow::Result<ExitCode> {
        let tokens = lexer::split_into_tokens(line);
        let Some((name, rest)) = tokens.split_first() else {
            return Ok(EXIT_SUCCESS);
        };

        let args: Vec<&str> = rest.iter().map(String::as_str).collect();
        let builtin = self
            .builtins
            .iter()
            .find_map(|factory| factory.try_create(name, &args));
        if let Some(cmd) = builtin {
            debug!("running built-in {name}");
            return cmd.execute(self);
        }

        Ok(self.run_pipeline(line).exit_code())
    }

    /// Run a line as a pipeline of external programs, bypassing built-ins.
    pub fn run_pipeline(&mut self, line: &str) -> PipelineReport {
        let stages = parser::parse_pipeline(line);
        pipeline::run_pipeline(&stages, &self.env)
    }

    /// Run every line of a script file in order, as if typed one by one.
    ///
    /// Returns the status of the last line. Fails without running anything if the
    /// file cannot be opened or if `source` is already nested
    /// `max_source_depth` levels deep.
    pub fn source(&mut self, path: &str) -> anyhow::Result<ExitCode> {
        if self.source_depth >= self.config.max_source_depth {
            bail!(
                "source: {}: nesting deeper than {} levels",
                path,
                self.config.max_source_depth
            );
        }

        let resolved = self.env.resolve(path);
        let file = File::open(&resolved)
            .with_context(|| format!("source: could not open {}", path))?;
        info!("sourcing {}", resolved.display());

        self.source_depth += 1;
        let result = self.run_script(BufReader::new(file));
        self.source_depth -= 1;

        info!("finished {}", resolved.display());
        result.with_context(|| format!("source: {}", path))
    }

    fn run_script(&mut self, reader: impl BufRead) -> anyhow::Result<ExitCode> {
        let mut code = EXIT_SUCCESS;
        for (number, line) in reader.split(b'\n').enumerate() {
            let line = line?;
            let text = String::from_utf8_lossy(&line);
            if let Cow::Owned(_) = text {
                warn!("line {}: invalid UTF-8 replaced", number + 1);
            }
            code = self.execute_line(&text);
        }
        Ok(code)
    }

    /// Interactive Read-Eval-Print Loop.
    ///
    /// Ends on a line reading `exit`, end of input, or an interrupt.
    pub fn repl(&mut self) -> rustyline::Result<()> {
        let mut rl = DefaultEditor::new()?;

        loop {
            match rl.readline(&self.config.prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed == EXIT_COMMAND {
                        break;
                    }
                    if !trimmed.is_empty() {
                        self.execute_line(&line);
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    debug!("interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    debug!("end of input");
                    break;
                }
                Err(err) => return Err(err),
            }
        }

        Ok(())
    }
}

impl Default for Interpreter {
    /// Create an interpreter with the default configuration and the built-ins
    /// `cd` and `source`.
    fn default() -> Self {
        Self::with_config(ShellConfig::default())
    }
}
